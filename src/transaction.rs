//! Atomic half of the Pipeline/Transaction Engine (spec §4.E): `WATCH` /
//! `MULTI` / `EXEC`, surfaced as a queued builder like [`Pipeline`] but one
//! that can abort as a whole when a watched key changed underneath it.

use crate::client::Client;
use crate::driver::{Batch, ClusterRoutingHint, RawCommand};
use crate::error::Result;
use crate::value::PipelineSlot;

/// A `MULTI`/`EXEC` transaction bound to the [`Client`] that will run it.
/// Call [`Transaction::watch`] before queuing, if this transaction needs
/// optimistic locking; then queue commands the same way as [`Pipeline`].
pub struct Transaction {
    client: Client,
    batch: Batch,
    watched: bool,
}

impl Transaction {
    pub fn new(client: Client) -> Self {
        Self { client, batch: Batch::new(true), watched: false }
    }

    /// Watch `keys` for changes. Must be called before queuing commands,
    /// matching ioredis's requirement that `WATCH` precede `MULTI`.
    pub async fn watch(mut self, keys: &[Vec<u8>]) -> Result<Self> {
        let driver = self.client.ensure_connected().await?;
        driver.watch(keys).await?;
        self.watched = true;
        Ok(self)
    }

    pub fn queue(mut self, args: RawCommand) -> Self {
        self.batch.push(args);
        self
    }

    pub fn len(&self) -> usize {
        self.batch.commands.len()
    }

    /// Run the queued commands atomically. Returns `Ok(None)` when the
    /// server reports the transaction was aborted — a real `WATCH`
    /// conflict replies to `EXEC` with a nil multi-bulk, which the driver
    /// surfaces as `None` rather than as an `EXECABORT` error (that error
    /// is reserved for commands queued incorrectly between `MULTI` and
    /// `EXEC`, a distinct failure mode) — matching ioredis's `exec()`
    /// resolving to `null` rather than rejecting. Returns
    /// `Ok(Some(slots))` with one [`PipelineSlot`] per queued command
    /// otherwise.
    pub async fn exec(self) -> Result<Option<Vec<PipelineSlot>>> {
        let driver = self.client.ensure_connected().await?;
        driver.exec(&self.batch, false).await
    }

    /// Abandon this transaction without running it, clearing any watches
    /// established by [`Transaction::watch`] (ioredis's `discard()`).
    pub async fn discard(self) -> Result<()> {
        if self.watched {
            let driver = self.client.ensure_connected().await?;
            let hint = ClusterRoutingHint::None;
            driver.unwatch(hint).await?;
        }
        Ok(())
    }
}
