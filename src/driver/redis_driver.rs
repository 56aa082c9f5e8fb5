//! Concrete [`Driver`] backed by the `redis` crate. Stands in for a real
//! GLIDE-core driver: GLIDE's own core is a fork of `redis-rs`, so the wire
//! behavior (RESP3 values, cluster redirection, pipelining) matches what a
//! production driver would hand back.

use redis::aio::MultiplexedConnection;

use crate::driver::{Batch, ClusterRoutingHint, Driver, RawCommand};
use crate::error::{Error, Result};
use crate::value::{PipelineSlot, Value};
use crate::Future;

enum Inner {
    Standalone(MultiplexedConnection),
    #[cfg(feature = "cluster")]
    Cluster(redis::cluster_async::ClusterConnection),
}

pub struct RedisDriver {
    inner: Inner,
}

fn build_cmd(args: &RawCommand) -> redis::Cmd {
    let mut cmd = redis::Cmd::new();
    for arg in args {
        cmd.arg(arg.as_slice());
    }
    cmd
}

impl RedisDriver {
    /// Connect to a single standalone server.
    pub async fn connect_standalone(address: &str) -> Result<Self> {
        let client = redis::Client::open(address).map_err(Error::from)?;
        let conn = client.get_multiplexed_tokio_connection().await.map_err(Error::from)?;
        Ok(Self { inner: Inner::Standalone(conn) })
    }

    #[cfg(feature = "cluster")]
    /// Connect to a cluster, given any subset of its node addresses; the
    /// driver discovers the rest of the topology itself (spec §1/§4.I: this
    /// crate never does its own slot math).
    pub async fn connect_cluster(addresses: &[String]) -> Result<Self> {
        let client = redis::cluster::ClusterClientBuilder::new(addresses.iter().cloned())
            .build()
            .map_err(Error::from)?;
        let conn = client.get_async_connection().await.map_err(Error::from)?;
        Ok(Self { inner: Inner::Cluster(conn) })
    }

    async fn query<T: redis::FromRedisValue>(&self, cmd: redis::Cmd) -> Result<T> {
        match &self.inner {
            Inner::Standalone(conn) => {
                let mut conn = conn.clone();
                cmd.query_async(&mut conn).await.map_err(Error::from)
            }
            #[cfg(feature = "cluster")]
            Inner::Cluster(conn) => {
                let mut conn = conn.clone();
                cmd.query_async(&mut conn).await.map_err(Error::from)
            }
        }
    }

    async fn query_pipe<T: redis::FromRedisValue>(&self, pipe: &redis::Pipeline) -> Result<T> {
        match &self.inner {
            Inner::Standalone(conn) => {
                let mut conn = conn.clone();
                pipe.query_async(&mut conn).await.map_err(Error::from)
            }
            #[cfg(feature = "cluster")]
            Inner::Cluster(conn) => {
                let mut conn = conn.clone();
                pipe.query_async(&mut conn).await.map_err(Error::from)
            }
        }
    }
}

impl Driver for RedisDriver {
    fn custom_command<'a>(&'a self, args: RawCommand) -> Future<'a, Value> {
        Box::pin(async move { self.query(build_cmd(&args)).await })
    }

    fn eval_sha<'a>(&'a self, sha1: &'a str, keys: &'a [Vec<u8>], args: &'a [Vec<u8>]) -> Future<'a, Value> {
        Box::pin(async move {
            let mut cmd = redis::Cmd::new();
            cmd.arg("EVALSHA").arg(sha1).arg(keys.len());
            for key in keys {
                cmd.arg(key.as_slice());
            }
            for arg in args {
                cmd.arg(arg.as_slice());
            }
            self.query(cmd).await
        })
    }

    fn script_load<'a>(&'a self, body: &'a str) -> Future<'a, String> {
        Box::pin(async move {
            let mut cmd = redis::Cmd::new();
            cmd.arg("SCRIPT").arg("LOAD").arg(body);
            self.query(cmd).await
        })
    }

    fn eval<'a>(&'a self, body: &'a str, keys: &'a [Vec<u8>], args: &'a [Vec<u8>]) -> Future<'a, Value> {
        Box::pin(async move {
            let mut cmd = redis::Cmd::new();
            cmd.arg("EVAL").arg(body).arg(keys.len());
            for key in keys {
                cmd.arg(key.as_slice());
            }
            for arg in args {
                cmd.arg(arg.as_slice());
            }
            self.query(cmd).await
        })
    }

    fn exec<'a>(&'a self, batch: &'a Batch, raise_on_error: bool) -> Future<'a, Option<Vec<PipelineSlot>>> {
        Box::pin(async move {
            let mut pipe = redis::pipe();
            if batch.atomic {
                pipe.atomic();
            }
            for command in &batch.commands {
                pipe.add_command(build_cmd(command));
            }
            // A `WATCH`-conflicted `MULTI`/`EXEC` replies with a nil
            // multi-bulk rather than an error; the `redis` crate's own
            // idiom for that is querying as `Option<Vec<Value>>` instead of
            // inventing an error-kind detection path the wire never sends
            // for this case.
            let values = match self.query_pipe::<Option<Vec<Value>>>(&pipe).await? {
                None => return Ok(None),
                Some(values) => values,
            };
            let slots: Vec<PipelineSlot> = values.into_iter().map(PipelineSlot::from_value).collect();
            if raise_on_error {
                if let Some(PipelineSlot::Err(text)) = slots.iter().find(|slot| slot.is_err()) {
                    return Err(Error::Redis(crate::error::RedisError::from(text.0.as_str())));
                }
            }
            Ok(Some(slots))
        })
    }

    fn watch<'a>(&'a self, keys: &'a [Vec<u8>]) -> Future<'a, ()> {
        Box::pin(async move {
            let mut cmd = redis::Cmd::new();
            cmd.arg("WATCH");
            for key in keys {
                cmd.arg(key.as_slice());
            }
            self.query(cmd).await
        })
    }

    fn unwatch<'a>(&'a self, _hint: ClusterRoutingHint) -> Future<'a, ()> {
        // The routing hint matters only in cluster mode, where UNWATCH must
        // reach the same node the preceding WATCH calls did; the cluster
        // connection here routes keyless commands to an arbitrary node,
        // which can leave a stale watch on another node (spec §4.I notes
        // this as an accepted, not silently-fixed, limitation).
        Box::pin(async move {
            let mut cmd = redis::Cmd::new();
            cmd.arg("UNWATCH");
            self.query(cmd).await
        })
    }

    fn close<'a>(&'a self) -> Future<'a, ()> {
        Box::pin(async move { Ok(()) })
    }
}
