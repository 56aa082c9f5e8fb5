//! Dual-mode Pub/Sub Subsystem (spec §4.G). Both backends subscribe over
//! their own dedicated connection — exactly like ioredis, which forbids
//! issuing regular commands on a connection once it has entered
//! subscriber mode — but differ in how they hand messages back to the
//! caller:
//!
//! - [`native`] delivers messages through synchronous callbacks, the way
//!   ioredis's own `on('message', ...)` API works.
//! - [`resp_binary`] delivers messages as a [`futures_util::Stream`] of
//!   raw bytes, for callers that want binary-safe payloads without the
//!   UTF-8 sentinel encoding the native mode needs.
//!
//! Which backend a [`Client`](crate::client::Client) uses is controlled by
//! [`ClientOptions::enable_event_based_pub_sub`](crate::config::ClientOptions::enable_event_based_pub_sub).

pub mod native;
pub mod resp_binary;

use std::collections::HashSet;
use std::sync::Mutex;

use crate::events::EventName;

/// Unified event shape [`Client`](crate::client::Client)'s pub/sub methods
/// emit (spec §4.G, §6), regardless of which backend actually delivered the
/// message — callers only ever see ioredis's eight event names.
#[derive(Debug, Clone)]
pub enum PubSubEvent {
    Message { channel: String, payload: String },
    MessageBuffer { channel: String, payload: Vec<u8> },
    PMessage { pattern: String, channel: String, payload: String },
    PMessageBuffer { pattern: String, channel: String, payload: Vec<u8> },
    Subscribe { channel: String, count: usize },
    Unsubscribe { channel: String, count: usize },
    PSubscribe { pattern: String, count: usize },
    PUnsubscribe { pattern: String, count: usize },
    SSubscribe { channel: String, count: usize },
    SUnsubscribe { channel: String, count: usize },
}

impl EventName for PubSubEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::Message { .. } => "message",
            Self::MessageBuffer { .. } => "messageBuffer",
            Self::PMessage { .. } => "pmessage",
            Self::PMessageBuffer { .. } => "pmessageBuffer",
            Self::Subscribe { .. } => "subscribe",
            Self::Unsubscribe { .. } => "unsubscribe",
            Self::PSubscribe { .. } => "psubscribe",
            Self::PUnsubscribe { .. } => "punsubscribe",
            Self::SSubscribe { .. } => "ssubscribe",
            Self::SUnsubscribe { .. } => "sunsubscribe",
        }
    }
}

/// Tracks what a subscriber connection is currently subscribed to, shared
/// between both backends so `client.subscriberCount`-style introspection
/// works the same regardless of mode.
#[derive(Default)]
pub struct SubscriptionState {
    channels: Mutex<HashSet<String>>,
    patterns: Mutex<HashSet<String>>,
    shard_channels: Mutex<HashSet<String>>,
}

impl SubscriptionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_channel(&self, channel: impl Into<String>) {
        self.channels.lock().unwrap().insert(channel.into());
    }

    pub fn remove_channel(&self, channel: &str) {
        self.channels.lock().unwrap().remove(channel);
    }

    pub fn add_pattern(&self, pattern: impl Into<String>) {
        self.patterns.lock().unwrap().insert(pattern.into());
    }

    pub fn remove_pattern(&self, pattern: &str) {
        self.patterns.lock().unwrap().remove(pattern);
    }

    pub fn add_shard_channel(&self, channel: impl Into<String>) {
        self.shard_channels.lock().unwrap().insert(channel.into());
    }

    pub fn remove_shard_channel(&self, channel: &str) {
        self.shard_channels.lock().unwrap().remove(channel);
    }

    pub fn channel_count(&self) -> usize {
        self.channels.lock().unwrap().len()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.lock().unwrap().len()
    }

    pub fn shard_channel_count(&self) -> usize {
        self.shard_channels.lock().unwrap().len()
    }

    pub fn is_subscribed_to_anything(&self) -> bool {
        !self.channels.lock().unwrap().is_empty()
            || !self.patterns.lock().unwrap().is_empty()
            || !self.shard_channels.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_channel_membership() {
        let state = SubscriptionState::new();
        assert!(!state.is_subscribed_to_anything());
        state.add_channel("news");
        assert_eq!(state.channel_count(), 1);
        state.remove_channel("news");
        assert_eq!(state.channel_count(), 0);
    }

    /// P2: the count that accompanies a subscribe/unsubscribe event is the
    /// post-change size of the specific set that command touched — channels,
    /// patterns, and shard channels are tracked independently and never
    /// summed together.
    #[test]
    fn channel_and_pattern_counts_are_tracked_independently() {
        let state = SubscriptionState::new();
        state.add_channel("news");
        state.add_channel("sports");
        state.add_pattern("news.*");
        assert_eq!(state.channel_count(), 2);
        assert_eq!(state.pattern_count(), 1);

        state.remove_channel("news");
        assert_eq!(state.channel_count(), 1, "removing a channel must not affect the pattern count");
        assert_eq!(state.pattern_count(), 1);
    }

    #[test]
    fn pubsub_event_names_match_ioredis_event_shapes() {
        assert_eq!(PubSubEvent::Message { channel: "c".into(), payload: "m".into() }.name(), "message");
        assert_eq!(PubSubEvent::MessageBuffer { channel: "c".into(), payload: vec![] }.name(), "messageBuffer");
        assert_eq!(
            PubSubEvent::PMessage { pattern: "p".into(), channel: "c".into(), payload: "m".into() }.name(),
            "pmessage"
        );
        assert_eq!(PubSubEvent::Subscribe { channel: "c".into(), count: 1 }.name(), "subscribe");
        assert_eq!(PubSubEvent::SSubscribe { channel: "c".into(), count: 1 }.name(), "ssubscribe");
    }
}
