//! Native-callback pub/sub backend (spec §4.G mode 1): messages are handed
//! to synchronous callbacks registered per channel, matching ioredis's
//! default `on('message', (channel, message) => ...)` shape.
//!
//! ioredis's wire messages are always binary-safe; this mode's callback
//! signature is not (`message: String`), so a payload that isn't valid
//! UTF-8 is base64-encoded behind a sentinel prefix instead of being
//! silently mangled or dropped. Callers that need guaranteed binary
//! fidelity should use [`resp_binary`](super::resp_binary) instead — this
//! conversion is reported here, not "fixed", per spec §9.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::{mpsc, oneshot};

use crate::config::ClientOptions;
use crate::error::{Error, Result};
use crate::events::{Emitter, EventName};
use crate::pubsub::SubscriptionState;

/// Prefix marking a payload that had to be base64-encoded because it was
/// not valid UTF-8. Matches the literal token spec §4.G mode 1 names for
/// this convention — cooperating publishers on the text side encode with
/// this same prefix so a pure-text transport can still carry raw bytes.
const BINARY_SENTINEL: &str = "__GLIDE_BINARY__:";

/// Encode a raw payload for delivery through [`Emitter<NativeMessage>`].
pub fn encode_payload(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) if !text.starts_with('\u{0}') => text.to_owned(),
        _ => format!("{BINARY_SENTINEL}{}", base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes)),
    }
}

/// Reverse of [`encode_payload`]: detects and strips the sentinel, decoding
/// back to the original bytes, or returns the text as-is when no sentinel
/// is present.
pub fn decode_payload(text: &str) -> Result<Vec<u8>> {
    match text.strip_prefix(BINARY_SENTINEL) {
        Some(encoded) => base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded)
            .map_err(|e| Error::Argument(format!("invalid base64 pub/sub sentinel: {e}"))),
        None => Ok(text.as_bytes().to_vec()),
    }
}

/// Which of the four ioredis event shapes a [`NativeMessage`] represents —
/// text (`message`/`pmessage`) or the binary-safe sibling emitted alongside
/// it (`messageBuffer`/`pmessageBuffer`), per spec §4.G mode 1 point 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageVariant {
    Text,
    Buffer,
}

/// A message delivered through the native-callback backend. Every delivered
/// message is emitted twice — once as [`MessageVariant::Text`] (`payload` is
/// the UTF-8/sentinel-decoded string) and once as [`MessageVariant::Buffer`]
/// (`payload` holds the sentinel-decoded raw bytes as a lossy string so both
/// variants share one struct; callers wanting exact bytes should decode
/// `payload` themselves via [`decode_payload`], or use [`resp_binary`](super::resp_binary)).
#[derive(Debug, Clone)]
pub struct NativeMessage {
    pub channel: String,
    pub payload: String,
    pub payload_bytes: Vec<u8>,
    pub pattern: Option<String>,
    pub variant: MessageVariant,
}

impl EventName for NativeMessage {
    fn name(&self) -> &'static str {
        match (self.pattern.is_some(), self.variant) {
            (false, MessageVariant::Text) => "message",
            (false, MessageVariant::Buffer) => "messageBuffer",
            (true, MessageVariant::Text) => "pmessage",
            (true, MessageVariant::Buffer) => "pmessageBuffer",
        }
    }
}

/// Subscriber connection for native-callback mode. Owns a dedicated
/// connection the way ioredis dedicates a socket to subscriber mode —
/// regular commands cannot be issued on it once subscribed.
pub struct NativeSubscriber {
    state: Arc<SubscriptionState>,
    events: Arc<Emitter<NativeMessage>>,
    sink: redis::aio::PubSub,
}

impl NativeSubscriber {
    pub async fn connect(options: &ClientOptions) -> Result<Self> {
        let client = redis::Client::open(options.to_url()).map_err(Error::from)?;
        let sink = client.get_async_pubsub().await.map_err(Error::from)?;
        Ok(Self { state: Arc::new(SubscriptionState::new()), events: Arc::new(Emitter::new()), sink })
    }

    pub fn on_message(&self, listener: impl Fn(&NativeMessage) + Send + Sync + 'static) {
        self.events.on("message", listener);
    }

    pub fn on_pmessage(&self, listener: impl Fn(&NativeMessage) + Send + Sync + 'static) {
        self.events.on("pmessage", listener);
    }

    pub fn on_message_buffer(&self, listener: impl Fn(&NativeMessage) + Send + Sync + 'static) {
        self.events.on("messageBuffer", listener);
    }

    pub fn on_pmessage_buffer(&self, listener: impl Fn(&NativeMessage) + Send + Sync + 'static) {
        self.events.on("pmessageBuffer", listener);
    }

    pub fn events(&self) -> Arc<Emitter<NativeMessage>> {
        self.events.clone()
    }

    pub async fn subscribe(&mut self, channel: &str) -> Result<()> {
        self.sink.subscribe(channel).await.map_err(Error::from)?;
        self.state.add_channel(channel);
        Ok(())
    }

    pub async fn psubscribe(&mut self, pattern: &str) -> Result<()> {
        self.sink.psubscribe(pattern).await.map_err(Error::from)?;
        self.state.add_pattern(pattern);
        Ok(())
    }

    pub async fn unsubscribe(&mut self, channel: &str) -> Result<()> {
        self.sink.unsubscribe(channel).await.map_err(Error::from)?;
        self.state.remove_channel(channel);
        Ok(())
    }

    pub async fn punsubscribe(&mut self, pattern: &str) -> Result<()> {
        self.sink.punsubscribe(pattern).await.map_err(Error::from)?;
        self.state.remove_pattern(pattern);
        Ok(())
    }

    /// `SSUBSCRIBE`: cluster-only sharded subscribe (spec §4.I), routed by
    /// key slot rather than broadcast to every node.
    pub async fn ssubscribe(&mut self, channel: &str) -> Result<()> {
        self.sink.ssubscribe(channel).await.map_err(Error::from)?;
        self.state.add_shard_channel(channel);
        Ok(())
    }

    pub async fn sunsubscribe(&mut self, channel: &str) -> Result<()> {
        self.sink.sunsubscribe(channel).await.map_err(Error::from)?;
        self.state.remove_shard_channel(channel);
        Ok(())
    }

    pub fn subscription_state(&self) -> Arc<SubscriptionState> {
        self.state.clone()
    }

    /// Drive message delivery. Runs until the connection closes; intended
    /// to be spawned on its own task by the caller. Every delivered message
    /// fires two events, matching spec §4.G mode 1 point 3: the text
    /// variant (`message`/`pmessage`) and its buffer sibling
    /// (`messageBuffer`/`pmessageBuffer`), so callers needing guaranteed
    /// bytes don't have to round-trip through the sentinel encoding
    /// themselves.
    pub async fn run(mut self) -> Result<()> {
        let mut stream = self.sink.on_message();
        while let Some(msg) = stream.next().await {
            let channel: String = msg.get_channel_name().to_owned();
            let pattern: Option<String> = msg.get_pattern::<String>().ok();
            let payload: Vec<u8> = msg.get_payload::<Vec<u8>>().unwrap_or_default();
            let text = encode_payload(&payload);

            let text_event = NativeMessage {
                channel: channel.clone(),
                payload: text,
                payload_bytes: payload.clone(),
                pattern: pattern.clone(),
                variant: MessageVariant::Text,
            };
            self.events.emit(&text_event);

            let buffer_event = NativeMessage {
                channel,
                payload: String::from_utf8_lossy(&payload).into_owned(),
                payload_bytes: payload,
                pattern,
                variant: MessageVariant::Buffer,
            };
            self.events.emit(&buffer_event);
        }
        Ok(())
    }

    /// Drive message delivery while also accepting subscription-change
    /// requests over `commands`, so [`Client`](crate::client::Client) can
    /// mutate subscriptions after the connection is handed off to its own
    /// background task (the server forbids issuing `SUBSCRIBE` on any
    /// connection but the one already in subscriber mode). Each command's
    /// reply carries the post-change size of the affected set, matching
    /// spec §4.G's "count is the size of the set the command just changed".
    pub async fn run_with_commands(mut self, mut commands: mpsc::UnboundedReceiver<(SubscriberCommand, oneshot::Sender<Result<usize>>)>) -> Result<()> {
        loop {
            tokio::select! {
                maybe_msg = self.sink.on_message().next() => {
                    let Some(msg) = maybe_msg else { break };
                    let channel: String = msg.get_channel_name().to_owned();
                    let pattern: Option<String> = msg.get_pattern::<String>().ok();
                    let payload: Vec<u8> = msg.get_payload::<Vec<u8>>().unwrap_or_default();
                    let text = encode_payload(&payload);

                    self.events.emit(&NativeMessage {
                        channel: channel.clone(),
                        payload: text,
                        payload_bytes: payload.clone(),
                        pattern: pattern.clone(),
                        variant: MessageVariant::Text,
                    });
                    self.events.emit(&NativeMessage {
                        channel,
                        payload: String::from_utf8_lossy(&payload).into_owned(),
                        payload_bytes: payload,
                        pattern,
                        variant: MessageVariant::Buffer,
                    });
                }
                Some((cmd, reply)) = commands.recv() => {
                    let result = self.apply_command(cmd).await;
                    let _ = reply.send(result);
                }
            }
        }
        Ok(())
    }

    async fn apply_command(&mut self, cmd: SubscriberCommand) -> Result<usize> {
        match cmd {
            SubscriberCommand::Subscribe(channel) => {
                self.subscribe(&channel).await?;
                Ok(self.state.channel_count())
            }
            SubscriberCommand::PSubscribe(pattern) => {
                self.psubscribe(&pattern).await?;
                Ok(self.state.pattern_count())
            }
            SubscriberCommand::Unsubscribe(channel) => {
                self.unsubscribe(&channel).await?;
                Ok(self.state.channel_count())
            }
            SubscriberCommand::PUnsubscribe(pattern) => {
                self.punsubscribe(&pattern).await?;
                Ok(self.state.pattern_count())
            }
            SubscriberCommand::SSubscribe(channel) => {
                self.ssubscribe(&channel).await?;
                Ok(self.state.shard_channel_count())
            }
            SubscriberCommand::SUnsubscribe(channel) => {
                self.sunsubscribe(&channel).await?;
                Ok(self.state.shard_channel_count())
            }
        }
    }
}

/// A subscription-mutating request sent to [`NativeSubscriber::run_with_commands`].
#[derive(Debug, Clone)]
pub enum SubscriberCommand {
    Subscribe(String),
    PSubscribe(String),
    Unsubscribe(String),
    PUnsubscribe(String),
    SSubscribe(String),
    SUnsubscribe(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_payload_passes_through_unchanged() {
        assert_eq!(encode_payload(b"hello"), "hello");
        assert_eq!(decode_payload("hello").unwrap(), b"hello".to_vec());
    }

    #[test]
    fn binary_payload_round_trips_through_sentinel() {
        let bytes = vec![0xff, 0x00, 0xfe, 0x10];
        let encoded = encode_payload(&bytes);
        assert!(encoded.starts_with(BINARY_SENTINEL));
        assert_eq!(decode_payload(&encoded).unwrap(), bytes);
    }
}
