//! In-memory [`Driver`] test double. There is no live server in this
//! exercise's test environment, so every unit test above the driver
//! boundary runs against a scripted [`MockDriver`] instead — the role the
//! teacher's integration tests give to a real `redis-server` process, here
//! played by a queue of canned responses.

use std::collections::VecDeque;

use tokio::sync::Mutex;

use crate::driver::{Batch, ClusterRoutingHint, Driver, RawCommand};
use crate::error::{Error, Result};
use crate::value::{PipelineSlot, Value};
use crate::Future;

/// Records every command it was asked to run and replays canned [`Value`]s
/// in the order [`MockDriver::push_response`] queued them, regardless of
/// which trait method consumed the next slot.
#[derive(Default)]
pub struct MockDriver {
    responses: Mutex<VecDeque<Result<Value>>>,
    calls: Mutex<Vec<RawCommand>>,
    watches: Mutex<Vec<Vec<u8>>>,
    abort_next_exec: Mutex<bool>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_response(&self, value: Value) {
        self.responses.lock().await.push_back(Ok(value));
    }

    pub async fn push_error(&self, error: Error) {
        self.responses.lock().await.push_back(Err(error));
    }

    /// Make the next [`Driver::exec`] call resolve to `None`, the way a
    /// real server's `EXEC` replies with a nil multi-bulk (no per-command
    /// replies at all, and no error) once a watched key changed underneath
    /// the transaction — distinct from [`MockDriver::push_error`], which
    /// fails only one queued slot with a real per-command error, and
    /// distinct from `EXECABORT`, which the server raises only when
    /// commands were queued incorrectly between `MULTI` and `EXEC`, not on
    /// a watch conflict.
    pub async fn abort_next_exec(&self) {
        *self.abort_next_exec.lock().await = true;
    }

    pub async fn calls(&self) -> Vec<RawCommand> {
        self.calls.lock().await.clone()
    }

    pub async fn watched_keys(&self) -> Vec<Vec<u8>> {
        self.watches.lock().await.clone()
    }

    async fn record(&self, args: RawCommand) {
        self.calls.lock().await.push(args);
    }

    async fn next_response(&self) -> Result<Value> {
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Value::Nil))
    }
}

impl Driver for MockDriver {
    fn custom_command<'a>(&'a self, args: RawCommand) -> Future<'a, Value> {
        Box::pin(async move {
            self.record(args).await;
            self.next_response().await
        })
    }

    fn eval_sha<'a>(&'a self, sha1: &'a str, keys: &'a [Vec<u8>], args: &'a [Vec<u8>]) -> Future<'a, Value> {
        Box::pin(async move {
            let mut command = vec![b"EVALSHA".to_vec(), sha1.as_bytes().to_vec()];
            command.extend(keys.iter().cloned());
            command.extend(args.iter().cloned());
            self.record(command).await;
            self.next_response().await
        })
    }

    fn script_load<'a>(&'a self, body: &'a str) -> Future<'a, String> {
        Box::pin(async move {
            self.record(vec![b"SCRIPT".to_vec(), b"LOAD".to_vec(), body.as_bytes().to_vec()]).await;
            let sha = {
                use sha1::{Digest, Sha1};
                hex::encode(Sha1::digest(body.as_bytes()))
            };
            match self.next_response().await? {
                Value::Nil => Ok(sha),
                other => crate::value::to_utf8_string(&other),
            }
        })
    }

    fn eval<'a>(&'a self, body: &'a str, keys: &'a [Vec<u8>], args: &'a [Vec<u8>]) -> Future<'a, Value> {
        Box::pin(async move {
            let mut command = vec![b"EVAL".to_vec(), body.as_bytes().to_vec()];
            command.extend(keys.iter().cloned());
            command.extend(args.iter().cloned());
            self.record(command).await;
            self.next_response().await
        })
    }

    fn exec<'a>(&'a self, batch: &'a Batch, raise_on_error: bool) -> Future<'a, Option<Vec<PipelineSlot>>> {
        Box::pin(async move {
            {
                let mut abort = self.abort_next_exec.lock().await;
                if *abort {
                    *abort = false;
                    return Ok(None);
                }
            }
            let mut slots = Vec::with_capacity(batch.commands.len());
            for command in &batch.commands {
                self.record(command.clone()).await;
                match self.next_response().await {
                    Ok(value) => slots.push(PipelineSlot::from_value(value)),
                    Err(e) => slots.push(PipelineSlot::Err(crate::value::RedisErrorText(e.to_string()))),
                }
            }
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
            self.watches.lock().await.extend(keys.iter().cloned());
            self.record(std::iter::once(b"WATCH".to_vec()).chain(keys.iter().cloned()).collect()).await;
            Ok(())
        })
    }

    fn unwatch<'a>(&'a self, _hint: ClusterRoutingHint) -> Future<'a, ()> {
        Box::pin(async move {
            self.watches.lock().await.clear();
            self.record(vec![b"UNWATCH".to_vec()]).await;
            Ok(())
        })
    }

    fn close<'a>(&'a self) -> Future<'a, ()> {
        Box::pin(async move { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_queued_responses_in_order() {
        let driver = MockDriver::new();
        driver.push_response(Value::Int(1)).await;
        driver.push_response(Value::Int(2)).await;

        let first = driver.custom_command(vec![b"INCR".to_vec()]).await.unwrap();
        let second = driver.custom_command(vec![b"INCR".to_vec()]).await.unwrap();

        assert_eq!(first, Value::Int(1));
        assert_eq!(second, Value::Int(2));
        assert_eq!(driver.calls().await.len(), 2);
    }

    #[tokio::test]
    async fn watch_then_unwatch_clears_recorded_keys() {
        let driver = MockDriver::new();
        driver.watch(&[b"foo".to_vec()]).await.unwrap();
        assert_eq!(driver.watched_keys().await, vec![b"foo".to_vec()]);
        driver.unwatch(ClusterRoutingHint::None).await.unwrap();
        assert!(driver.watched_keys().await.is_empty());
    }

    #[tokio::test]
    async fn abort_next_exec_resolves_to_none_once() {
        let driver = MockDriver::new();
        driver.abort_next_exec().await;
        let mut batch = Batch::new(true);
        batch.push(vec![b"INCR".to_vec(), b"x".to_vec()]);
        let aborted = driver.exec(&batch, false).await.unwrap();
        assert!(aborted.is_none(), "a watch conflict must resolve to None, not an error");

        driver.push_response(Value::Int(1)).await;
        let slots = driver.exec(&batch, false).await.unwrap().expect("unaborted exec must return slots");
        assert_eq!(slots.len(), 1);
    }
}
