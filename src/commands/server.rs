//! Server/connection commands (`PING`/`FLUSHDB`/`DBSIZE`/`INFO`/...).

use crate::client::Client;
use crate::value;
use crate::Future;

/// Whether a flush blocks until complete (`SYNC`) or runs in the
/// background (`ASYNC`), mirroring ioredis's `FlushingMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushingMode {
    #[default]
    Sync,
    Async,
}

impl FlushingMode {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Sync => "SYNC",
            Self::Async => "ASYNC",
        }
    }
}

pub trait ServerCommands {
    fn ping<'a>(&'a self, message: Option<String>) -> Future<'a, String>;
    fn flushdb<'a>(&'a self, mode: FlushingMode) -> Future<'a, ()>;
    fn flushall<'a>(&'a self, mode: FlushingMode) -> Future<'a, ()>;
    fn dbsize<'a>(&'a self) -> Future<'a, i64>;
    fn info<'a>(&'a self, section: Option<String>) -> Future<'a, String>;
    fn select<'a>(&'a self, db: i64) -> Future<'a, ()>;
    fn client_set_name<'a>(&'a self, name: impl Into<Vec<u8>>) -> Future<'a, ()>;
    fn client_get_name<'a>(&'a self) -> Future<'a, Option<String>>;
}

impl ServerCommands for Client {
    fn ping<'a>(&'a self, message: Option<String>) -> Future<'a, String> {
        Box::pin(async move {
            let mut args = vec![b"PING".to_vec()];
            if let Some(message) = message {
                args.push(message.into_bytes());
            }
            let result = self.call(args).await?;
            value::to_utf8_string(&result)
        })
    }

    fn flushdb<'a>(&'a self, mode: FlushingMode) -> Future<'a, ()> {
        Box::pin(async move {
            self.call(vec![b"FLUSHDB".to_vec(), mode.as_str().as_bytes().to_vec()]).await?;
            Ok(())
        })
    }

    fn flushall<'a>(&'a self, mode: FlushingMode) -> Future<'a, ()> {
        Box::pin(async move {
            self.call(vec![b"FLUSHALL".to_vec(), mode.as_str().as_bytes().to_vec()]).await?;
            Ok(())
        })
    }

    fn dbsize<'a>(&'a self) -> Future<'a, i64> {
        Box::pin(async move { value::from_value(self.call(vec![b"DBSIZE".to_vec()]).await?) })
    }

    fn info<'a>(&'a self, section: Option<String>) -> Future<'a, String> {
        Box::pin(async move {
            let mut args = vec![b"INFO".to_vec()];
            if let Some(section) = section {
                args.push(section.into_bytes());
            }
            let result = self.call(args).await?;
            value::to_utf8_string(&result)
        })
    }

    fn select<'a>(&'a self, db: i64) -> Future<'a, ()> {
        Box::pin(async move {
            self.call(vec![b"SELECT".to_vec(), db.to_string().into_bytes()]).await?;
            Ok(())
        })
    }

    fn client_set_name<'a>(&'a self, name: impl Into<Vec<u8>>) -> Future<'a, ()> {
        let name = name.into();
        Box::pin(async move {
            self.call(vec![b"CLIENT".to_vec(), b"SETNAME".to_vec(), name]).await?;
            Ok(())
        })
    }

    fn client_get_name<'a>(&'a self) -> Future<'a, Option<String>> {
        Box::pin(async move {
            let result = self.call(vec![b"CLIENT".to_vec(), b"GETNAME".to_vec()]).await?;
            match result {
                crate::value::Value::Nil => Ok(None),
                crate::value::Value::BulkString(bytes) if bytes.is_empty() => Ok(None),
                other => Ok(Some(value::to_utf8_string(&other)?)),
            }
        })
    }
}
