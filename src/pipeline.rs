//! Non-atomic half of the Pipeline/Transaction Engine (spec §4.E, P3): queue
//! commands locally, then flush them as one round trip. Unlike
//! [`Transaction`](crate::transaction::Transaction), a pipeline gives no
//! atomicity guarantee — it exists purely to amortize network round trips.

use crate::client::Client;
use crate::driver::{Batch, RawCommand};
use crate::error::Result;
use crate::value::PipelineSlot;

/// A queued batch of commands bound to the [`Client`] that will run it.
/// Builder methods consume and return `Self` so call sites read as a single
/// chain, mirroring ioredis's `pipeline.set(...).get(...).exec()`.
pub struct Pipeline {
    client: Client,
    batch: Batch,
}

impl Pipeline {
    pub fn new(client: Client) -> Self {
        Self { client, batch: Batch::new(false) }
    }

    /// Queue one already-encoded command. Every typed convenience method in
    /// `commands::*` that accepts a `Pipeline` is built on top of this.
    pub fn queue(mut self, args: RawCommand) -> Self {
        self.batch.push(args);
        self
    }

    pub fn len(&self) -> usize {
        self.batch.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.commands.is_empty()
    }

    /// Flush the queued commands as one round trip and return one
    /// [`PipelineSlot`] per queued command, in order (P3): a pipeline never
    /// fails as a whole just because one command in it errored. A
    /// non-atomic pipeline never watches keys, so the driver's abort
    /// signal (`None`) can never legitimately occur here; it is treated as
    /// an empty result rather than unwrapped, since nothing about a
    /// pipeline should ever surface a `WATCH`-conflict null.
    pub async fn exec(self) -> Result<Vec<PipelineSlot>> {
        if self.batch.commands.is_empty() {
            return Ok(Vec::new());
        }
        let driver = self.client.ensure_connected().await?;
        Ok(driver.exec(&self.batch, false).await?.unwrap_or_default())
    }
}
