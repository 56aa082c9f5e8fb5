//! List commands (`LPUSH`/`RPUSH`/`LRANGE`/`BLPOP`/...).

use crate::blocking::resolve_blocking_args;
use crate::client::Client;
use crate::value;
use crate::Future;

/// Result of a blocking pop: which key produced a value, and the value
/// itself — `None` when the timeout elapsed with nothing to pop.
#[derive(Debug, Clone)]
pub struct BlockingPopResult {
    pub key: String,
    pub value: String,
}

pub trait ListCommands {
    fn lpush<'a>(&'a self, key: impl Into<Vec<u8>>, values: Vec<Vec<u8>>) -> Future<'a, i64>;
    fn rpush<'a>(&'a self, key: impl Into<Vec<u8>>, values: Vec<Vec<u8>>) -> Future<'a, i64>;
    fn lpop<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, Option<String>>;
    fn rpop<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, Option<String>>;
    fn lrange<'a>(&'a self, key: impl Into<Vec<u8>>, start: i64, stop: i64) -> Future<'a, Vec<String>>;
    fn llen<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64>;
    fn lrem<'a>(&'a self, key: impl Into<Vec<u8>>, count: i64, value: impl Into<Vec<u8>>) -> Future<'a, i64>;
    fn lindex<'a>(&'a self, key: impl Into<Vec<u8>>, index: i64) -> Future<'a, Option<String>>;
    fn lset<'a>(&'a self, key: impl Into<Vec<u8>>, index: i64, value: impl Into<Vec<u8>>) -> Future<'a, ()>;
    /// `BLPOP`, accepting the timeout in whichever position the caller
    /// passed it (spec §4.H).
    fn blpop<'a>(&'a self, args: Vec<Vec<u8>>) -> Future<'a, Option<BlockingPopResult>>;
    fn brpop<'a>(&'a self, args: Vec<Vec<u8>>) -> Future<'a, Option<BlockingPopResult>>;
    /// `BRPOPLPUSH source destination timeout` (or `timeout source destination`,
    /// per spec §4.H's timeout-position disambiguation): pop the tail of
    /// `source` and push it onto the head of `destination` atomically,
    /// blocking until an element is available or the timeout elapses.
    fn brpoplpush<'a>(&'a self, args: Vec<Vec<u8>>) -> Future<'a, Option<String>>;
}

impl ListCommands for Client {
    fn lpush<'a>(&'a self, key: impl Into<Vec<u8>>, values: Vec<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let mut args = vec![b"LPUSH".to_vec(), key];
            args.extend(values);
            value::from_value(self.call(args).await?)
        })
    }

    fn rpush<'a>(&'a self, key: impl Into<Vec<u8>>, values: Vec<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let mut args = vec![b"RPUSH".to_vec(), key];
            args.extend(values);
            value::from_value(self.call(args).await?)
        })
    }

    fn lpop<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, Option<String>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            value::from_value(self.call(vec![b"LPOP".to_vec(), key]).await?)
        })
    }

    fn rpop<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, Option<String>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            value::from_value(self.call(vec![b"RPOP".to_vec(), key]).await?)
        })
    }

    fn lrange<'a>(&'a self, key: impl Into<Vec<u8>>, start: i64, stop: i64) -> Future<'a, Vec<String>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let args = vec![b"LRANGE".to_vec(), key, start.to_string().into_bytes(), stop.to_string().into_bytes()];
            value::from_value(self.call(args).await?)
        })
    }

    fn llen<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            value::from_value(self.call(vec![b"LLEN".to_vec(), key]).await?)
        })
    }

    fn lrem<'a>(&'a self, key: impl Into<Vec<u8>>, count: i64, value_: impl Into<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        let value_ = value_.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let args = vec![b"LREM".to_vec(), key, count.to_string().into_bytes(), value_];
            value::from_value(self.call(args).await?)
        })
    }

    fn lindex<'a>(&'a self, key: impl Into<Vec<u8>>, index: i64) -> Future<'a, Option<String>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let args = vec![b"LINDEX".to_vec(), key, index.to_string().into_bytes()];
            value::from_value(self.call(args).await?)
        })
    }

    fn lset<'a>(&'a self, key: impl Into<Vec<u8>>, index: i64, value_: impl Into<Vec<u8>>) -> Future<'a, ()> {
        let key = key.into();
        let value_ = value_.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let args = vec![b"LSET".to_vec(), key, index.to_string().into_bytes(), value_];
            self.call(args).await?;
            Ok(())
        })
    }

    fn blpop<'a>(&'a self, args: Vec<Vec<u8>>) -> Future<'a, Option<BlockingPopResult>> {
        Box::pin(async move { blocking_pop(self, "BLPOP", args).await })
    }

    fn brpop<'a>(&'a self, args: Vec<Vec<u8>>) -> Future<'a, Option<BlockingPopResult>> {
        Box::pin(async move { blocking_pop(self, "BRPOP", args).await })
    }

    fn brpoplpush<'a>(&'a self, args: Vec<Vec<u8>>) -> Future<'a, Option<String>> {
        Box::pin(async move {
            let resolved = resolve_blocking_args(&args)?;
            if resolved.keys.len() != 2 {
                return Err(crate::error::Error::Argument(
                    "BRPOPLPUSH requires exactly a source and destination key".into(),
                ));
            }
            let mut command_args = vec![b"BRPOPLPUSH".to_vec()];
            for key in &resolved.keys {
                command_args.push(self.prefixed_key(key.clone())?);
            }
            command_args.push(value::format_score(resolved.timeout_seconds).into_bytes());
            value::from_value(self.call(command_args).await?)
        })
    }
}

async fn blocking_pop(
    client: &Client,
    command: &'static str,
    args: Vec<Vec<u8>>,
) -> crate::error::Result<Option<BlockingPopResult>> {
    let resolved = resolve_blocking_args(&args)?;
    let mut command_args = vec![command.as_bytes().to_vec()];
    for key in &resolved.keys {
        command_args.push(client.prefixed_key(key.clone())?);
    }
    command_args.push(value::format_score(resolved.timeout_seconds).into_bytes());

    let result = client.call(command_args).await?;
    match result {
        crate::value::Value::Nil => Ok(None),
        other => {
            let (key, value): (String, String) = value::from_value(other)?;
            Ok(Some(BlockingPopResult { key, value }))
        }
    }
}
