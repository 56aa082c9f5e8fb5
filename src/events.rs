//! Typed event emitter, the Rust stand-in for ioredis's `EventEmitter`
//! inheritance (Design Notes §9 "Emitter-based events"). Listeners are
//! plain synchronous callbacks registered under an event name; there is no
//! backpressure or queuing — a slow listener blocks whoever emitted.

use std::collections::HashMap;
use std::sync::Mutex;

/// Implemented by an event payload type so the emitter can key its listener
/// registry off a discriminant without requiring `Hash`/`Eq` on the payload
/// itself (payloads often carry non-hashable data like error messages).
pub trait EventName {
    fn name(&self) -> &'static str;
}

type Listener<E> = Box<dyn Fn(&E) + Send + Sync>;

/// Registry of listeners for one event payload type, e.g. the connection
/// lifecycle events a [`Client`](crate::client::Client) emits
/// (`connect`/`ready`/`error`/`close`/`end`/`reconnecting`).
pub struct Emitter<E: EventName> {
    listeners: Mutex<HashMap<&'static str, Vec<Listener<E>>>>,
}

impl<E: EventName> Default for Emitter<E> {
    fn default() -> Self {
        Self { listeners: Mutex::new(HashMap::new()) }
    }
}

impl<E: EventName> Emitter<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `event`. Multiple listeners for the same
    /// event are called in registration order, matching Node's
    /// `EventEmitter`.
    pub fn on(&self, event: &'static str, listener: impl Fn(&E) + Send + Sync + 'static) {
        self.listeners.lock().unwrap().entry(event).or_default().push(Box::new(listener));
    }

    /// Call every listener registered for `payload`'s event name.
    pub fn emit(&self, payload: &E) {
        let guard = self.listeners.lock().unwrap();
        if let Some(listeners) = guard.get(payload.name()) {
            for listener in listeners {
                listener(payload);
            }
        }
    }

    /// Number of listeners currently registered for `event`, mirroring
    /// ioredis's `listenerCount`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.lock().unwrap().get(event).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    enum TestEvent {
        Ping,
        Pong,
    }

    impl EventName for TestEvent {
        fn name(&self) -> &'static str {
            match self {
                TestEvent::Ping => "ping",
                TestEvent::Pong => "pong",
            }
        }
    }

    #[test]
    fn only_matching_listeners_fire() {
        let emitter: Emitter<TestEvent> = Emitter::new();
        let pings = Arc::new(AtomicUsize::new(0));
        let pongs = Arc::new(AtomicUsize::new(0));

        let p1 = pings.clone();
        emitter.on("ping", move |_| {
            p1.fetch_add(1, Ordering::SeqCst);
        });
        let p2 = pongs.clone();
        emitter.on("pong", move |_| {
            p2.fetch_add(1, Ordering::SeqCst);
        });

        emitter.emit(&TestEvent::Ping);
        emitter.emit(&TestEvent::Ping);

        assert_eq!(pings.load(Ordering::SeqCst), 2);
        assert_eq!(pongs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn listener_count_reflects_registrations() {
        let emitter: Emitter<TestEvent> = Emitter::new();
        assert_eq!(emitter.listener_count("ping"), 0);
        emitter.on("ping", |_| {});
        emitter.on("ping", |_| {});
        assert_eq!(emitter.listener_count("ping"), 2);
    }
}
