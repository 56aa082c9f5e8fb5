//! Cluster polymorphism (spec §4.I): a [`ClusterClient`] is a [`Client`]
//! connected to a cluster-aware driver instead of a single node, plus the
//! handful of operations that only make sense in cluster mode (sharded
//! pub/sub, `UNWATCH` routing). Topology discovery and redirection
//! (`MOVED`/`ASK`) are the driver's job, not this crate's (spec §1).

use std::sync::Arc;

use crate::client::Client;
use crate::config::ClientOptions;
use crate::error::{Error, Result};

/// Thin wrapper around [`Client`] that connects through a cluster driver
/// and adds sharded pub/sub (`SSUBSCRIBE`/`SUNSUBSCRIBE`/`SPUBLISH`), which
/// has no meaning against a standalone server.
pub struct ClusterClient {
    client: Client,
}

impl ClusterClient {
    #[cfg(feature = "cluster")]
    pub async fn connect(nodes: &[String], options: ClientOptions) -> Result<Self> {
        use crate::driver::redis_driver::RedisDriver;

        if nodes.is_empty() {
            return Err(Error::Config("cluster client requires at least one seed node".into()));
        }
        let driver = RedisDriver::connect_cluster(nodes).await?;
        let client = Client::with_driver(options, Arc::new(driver) as Arc<dyn crate::driver::Driver>);
        client.mark_cluster();
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// `nodes()` (spec §4.I): the cluster topology as currently known by the
    /// driver. Parses `CLUSTER NODES`' newline-delimited lines (the driver
    /// owns topology discovery; this just surfaces what it already knows,
    /// per spec §1's delegation of cluster-topology discovery to the driver).
    pub async fn nodes(&self) -> Result<Vec<String>> {
        let reply = self.client.call(vec![b"CLUSTER".to_vec(), b"NODES".to_vec()]).await?;
        let text = crate::value::to_utf8_string(&reply)?;
        Ok(text
            .lines()
            .filter(|line| !line.is_empty())
            .filter_map(|line| line.split_whitespace().nth(1).map(|addr| addr.to_owned()))
            .collect())
    }

    /// `SPUBLISH`: publish on a shard channel. Only meaningful against a
    /// cluster (spec §4.G, §4.I) — a standalone client rejects this with
    /// [`Error::ClusterModeRequired`], which is why this lives here rather
    /// than on [`Client`] itself.
    pub async fn spublish(&self, channel: impl AsRef<[u8]>, message: impl AsRef<[u8]>) -> Result<i64> {
        let value = self
            .client
            .call(vec![b"SPUBLISH".to_vec(), channel.as_ref().to_vec(), message.as_ref().to_vec()])
            .await?;
        crate::value::from_value(value)
    }

    /// `SSUBSCRIBE`: subscribe to a shard channel, routed by key slot rather
    /// than broadcast to every node. Only meaningful against a cluster,
    /// which is why this is reached through [`ClusterClient`] rather than
    /// [`Client`] itself — the type system enforces the spec §4.I rule that
    /// a standalone connection has no sharded pub/sub.
    pub async fn ssubscribe(&self, channel: impl Into<String>) -> Result<()> {
        self.client.ssubscribe_impl(channel).await
    }

    pub async fn sunsubscribe(&self, channel: impl Into<String>) -> Result<()> {
        self.client.sunsubscribe_impl(channel).await
    }
}

impl std::ops::Deref for ClusterClient {
    type Target = Client;

    fn deref(&self) -> &Client {
        &self.client
    }
}
