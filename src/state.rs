//! Connection State Machine (spec §4.C): the status strings ioredis
//! exposes as `client.status`, plus the private `generation` counter this
//! crate uses internally to recognize reconnect attempts without leaking
//! it as part of the public status surface.

use std::sync::Mutex;

use crate::events::EventName;

/// Mirrors ioredis's `Redis#status` values exactly, including the spelling
/// asymmetry between `"connect"` (TCP established) and `"ready"` (usable) —
/// changing these strings would break code that matches on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Lazy-connect clients start here and never call out until first use.
    Wait,
    Connecting,
    /// TCP connection established, `AUTH`/`SELECT`/ready-check still pending.
    Connect,
    /// Fully usable: authenticated, `db` selected, ready-check (if enabled) passed.
    Ready,
    Close,
    Reconnecting,
    /// Terminal. A client in this state never reconnects.
    End,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wait => "wait",
            Self::Connecting => "connecting",
            Self::Connect => "connect",
            Self::Ready => "ready",
            Self::Close => "close",
            Self::Reconnecting => "reconnecting",
            Self::End => "end",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload emitted through the client's [`Emitter`](crate::events::Emitter)
/// whenever [`ConnectionState::transition`] changes the observable status.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionEvent {
    pub status: ConnectionStatus,
    pub previous: ConnectionStatus,
}

impl EventName for ConnectionEvent {
    fn name(&self) -> &'static str {
        self.status.as_str()
    }
}

struct Inner {
    status: ConnectionStatus,
    /// Bumped every time the state machine leaves `Ready`/`Wait` for
    /// `Connecting`; used only to give in-flight reconnect attempts an
    /// identity so a superseded attempt can detect it was superseded. Not
    /// part of the public API (spec §4.C keeps this private).
    generation: u64,
    /// BullMQ-style direct `.status` assignment support (Design Notes §9):
    /// when set, reads of the status observe this value instead of the
    /// real state machine, without disturbing the machine underneath.
    override_status: Option<ConnectionStatus>,
}

/// The connection lifecycle state machine plus the `status` override cell
/// some callers (BullMQ among them) rely on being able to write directly.
pub struct ConnectionState {
    inner: Mutex<Inner>,
}

impl ConnectionState {
    pub fn new(lazy_connect: bool) -> Self {
        let status = if lazy_connect { ConnectionStatus::Wait } else { ConnectionStatus::Connecting };
        Self { inner: Mutex::new(Inner { status, generation: 0, override_status: None }) }
    }

    /// The status a caller reading `client.status` would observe: the
    /// override if one has been set, otherwise the real machine state.
    pub fn status(&self) -> ConnectionStatus {
        let inner = self.inner.lock().unwrap();
        inner.override_status.unwrap_or(inner.status)
    }

    /// Current reconnect generation, used by the client to drop stale
    /// reconnect-loop iterations superseded by a newer attempt.
    pub fn generation(&self) -> u64 {
        self.inner.lock().unwrap().generation
    }

    /// Drive the machine to `status`, returning the event to emit if the
    /// *real* (non-overridden) status actually changed. A no-op transition
    /// (e.g. `Ready` -> `Ready`) returns `None`.
    pub fn transition(&self, status: ConnectionStatus) -> Option<ConnectionEvent> {
        let mut inner = self.inner.lock().unwrap();
        if inner.status == status {
            return None;
        }
        let previous = inner.status;
        if status == ConnectionStatus::Connecting && !matches!(previous, ConnectionStatus::Wait) {
            inner.generation += 1;
        }
        inner.status = status;
        Some(ConnectionEvent { status, previous })
    }

    /// Directly assign the observable status, bypassing the state machine
    /// (the BullMQ quirk — spec §9). The real machine is untouched, so a
    /// later legitimate transition still fires normally once the override
    /// is cleared.
    pub fn set_status_override(&self, status: Option<ConnectionStatus>) {
        self.inner.lock().unwrap().override_status = status;
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.status(), ConnectionStatus::Ready)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status(), ConnectionStatus::End)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lazy_connect_starts_in_wait() {
        let state = ConnectionState::new(true);
        assert_eq!(state.status(), ConnectionStatus::Wait);
    }

    #[test]
    fn eager_connect_starts_connecting() {
        let state = ConnectionState::new(false);
        assert_eq!(state.status(), ConnectionStatus::Connecting);
    }

    #[test]
    fn transition_bumps_generation_on_reconnect() {
        let state = ConnectionState::new(false);
        state.transition(ConnectionStatus::Connect);
        state.transition(ConnectionStatus::Ready);
        assert_eq!(state.generation(), 0);
        state.transition(ConnectionStatus::Close);
        state.transition(ConnectionStatus::Reconnecting);
        state.transition(ConnectionStatus::Connecting);
        assert_eq!(state.generation(), 1);
    }

    #[test]
    fn override_masks_real_status_until_cleared() {
        let state = ConnectionState::new(false);
        state.transition(ConnectionStatus::Connect);
        state.transition(ConnectionStatus::Ready);
        state.set_status_override(Some(ConnectionStatus::Close));
        assert_eq!(state.status(), ConnectionStatus::Close);
        state.set_status_override(None);
        assert_eq!(state.status(), ConnectionStatus::Ready);
    }

    #[test]
    fn same_status_transition_is_a_no_op() {
        let state = ConnectionState::new(false);
        assert!(state.transition(ConnectionStatus::Connecting).is_none());
    }
}
