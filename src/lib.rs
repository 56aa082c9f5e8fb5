//! An ioredis-shaped client surface over a Valkey GLIDE-style driver
//! abstraction.
//!
//! This crate does not speak RESP itself and does not discover cluster
//! topology: both are delegated to the [`driver`] layer, which a real
//! deployment backs with the GLIDE core (here stood in for by the `redis`
//! crate, itself GLIDE's upstream). What this crate owns is everything
//! above that line: ioredis's duck-typed command surface, its connection
//! lifecycle and status strings, keyPrefix propagation, pipelines and
//! transactions, `defineCommand` scripts, dual-mode pub/sub, and the
//! blocking-command argument quirks ioredis callers rely on.
//!
//! ```no_run
//! use glide_ioredis::{Client, ClientOptions};
//! use glide_ioredis::commands::StringCommands;
//!
//! # async fn run() -> glide_ioredis::Result<()> {
//! let client = Client::connect(ClientOptions::default()).await?;
//! client.set("foo", "bar").await?;
//! let value: Option<String> = client.get("foo").await?;
//! assert_eq!(value.as_deref(), Some("bar"));
//! # Ok(())
//! # }
//! ```

pub mod blocking;
pub mod client;
pub mod cluster;
pub mod commands;
pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod pubsub;
pub mod scripting;
pub mod state;
pub mod transaction;
pub mod translate;
pub mod value;

#[cfg(test)]
mod tests;

pub use client::Client;
pub use cluster::ClusterClient;
pub use config::ClientOptions;
pub use error::{Error, Result};
pub use pipeline::Pipeline;
pub use pubsub::PubSubEvent;
pub use scripting::ScriptCommand;
pub use state::ConnectionStatus;
pub use transaction::Transaction;
pub use value::Value;

/// Boxed future returned from the command traits, the way a single driver
/// call, a pipelined call, or a transactional call all need to share one
/// return type regardless of which concrete executor issued them.
pub type Future<'a, T> = futures_util::future::BoxFuture<'a, Result<T>>;
