//! Driver Abstraction (spec §4.A): the thin capability interface this crate
//! builds the ioredis-shaped surface on top of. A real deployment backs
//! [`Driver`] with the GLIDE core; [`redis_driver::RedisDriver`] backs it
//! with the `redis` crate instead (GLIDE's own core is itself a fork of
//! `redis-rs`, so the shapes line up).
//!
//! Nothing above this module knows about RESP framing, socket management,
//! or cluster topology discovery: those all live behind this trait.

pub mod mock;
pub mod redis_driver;

use crate::error::Result;
use crate::value::{PipelineSlot, Value};
use crate::Future;

/// One command as driver-level arguments: command name followed by its
/// arguments, all already-encoded bytes (component B has already run by the
/// time anything reaches the driver).
pub type RawCommand = Vec<Vec<u8>>;

/// A batch of commands submitted together, either as an unordered pipeline
/// or as an atomic transaction (component E). The driver treats both the
/// same way structurally; atomicity is a property of how `exec` is invoked.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub commands: Vec<RawCommand>,
    pub atomic: bool,
}

impl Batch {
    pub fn new(atomic: bool) -> Self {
        Self { commands: Vec::new(), atomic }
    }

    pub fn push(&mut self, command: RawCommand) {
        self.commands.push(command);
    }
}

/// A Lua script handed to `invoke_script`, identified by its SHA1 digest so
/// the driver can try `EVALSHA` before falling back to `EVAL` (component F).
#[derive(Debug, Clone)]
pub struct Script {
    pub sha1: String,
    pub body: String,
}

/// Disambiguates `UNWATCH`'s routing in cluster mode, where the command
/// must be sent to whichever node the preceding `WATCH` calls landed on,
/// versus standalone mode where there is only ever one connection (spec
/// §4.A, §4.I).
#[derive(Debug, Clone, Default)]
pub enum ClusterRoutingHint {
    #[default]
    None,
    Slot(u16),
}

/// Capability interface a concrete driver must provide. Every method is
/// `'a`-scoped so implementations can borrow connection state without
/// cloning it into an owned future.
pub trait Driver: Send + Sync {
    /// Escape hatch for any command not otherwise modeled (`CLIENT`
    /// subcommands the adapter doesn't special-case, module commands, …).
    fn custom_command<'a>(&'a self, args: RawCommand) -> Future<'a, Value>;

    /// Run a Lua script, trying `EVALSHA` first when the driver has reason
    /// to believe the script is already cached (component F decides this;
    /// the driver itself is stateless about script caching).
    fn eval_sha<'a>(&'a self, sha1: &'a str, keys: &'a [Vec<u8>], args: &'a [Vec<u8>]) -> Future<'a, Value>;

    /// Load a script's body into the server's script cache, returning the
    /// SHA1 the server computed (should match the adapter's own digest).
    fn script_load<'a>(&'a self, body: &'a str) -> Future<'a, String>;

    fn eval<'a>(&'a self, body: &'a str, keys: &'a [Vec<u8>], args: &'a [Vec<u8>]) -> Future<'a, Value>;

    /// Run a previously built [`Batch`]. `raise_on_error` mirrors GLIDE's
    /// `exec(batch, raiseOnError)`: when true, the first slot error is
    /// surfaced as the overall result's error instead of being embedded in
    /// the per-slot results.
    ///
    /// Returns `Ok(None)` when the server aborted the batch — real Redis
    /// signals a `WATCH` conflict by replying to `EXEC` with a nil
    /// multi-bulk (`*-1`), not with an `EXECABORT` error (that error is a
    /// distinct failure mode, raised when commands were queued incorrectly
    /// between `MULTI` and `EXEC`). Callers must treat `None` as the only
    /// abort signal.
    fn exec<'a>(&'a self, batch: &'a Batch, raise_on_error: bool) -> Future<'a, Option<Vec<PipelineSlot>>>;

    /// Begin optimistic-locking watches ahead of a transaction.
    fn watch<'a>(&'a self, keys: &'a [Vec<u8>]) -> Future<'a, ()>;

    /// Clear any outstanding watches. `hint` only matters in cluster mode.
    fn unwatch<'a>(&'a self, hint: ClusterRoutingHint) -> Future<'a, ()>;

    /// Tear down the underlying connection(s). Idempotent.
    fn close<'a>(&'a self) -> Future<'a, ()>;
}
