//! String commands (`GET`/`SET`/`INCR`/...).

use crate::client::Client;
use crate::value;
use crate::Future;

/// Options accepted by [`StringCommands::set_with_options`], mirroring
/// ioredis's object-form `set(key, value, options)` call shape (spec §4.B
/// duck-typed argument forms).
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    pub ex_seconds: Option<u64>,
    pub px_millis: Option<u64>,
    /// `EXAT`: expire at a Unix timestamp in seconds, rather than relative to now.
    pub exat_seconds: Option<u64>,
    /// `PXAT`: expire at a Unix timestamp in milliseconds.
    pub pxat_millis: Option<u64>,
    pub nx: bool,
    pub xx: bool,
    pub keep_ttl: bool,
    /// `GET`: return the key's old value as part of the `SET` reply instead
    /// of issuing a separate `GETSET`.
    pub get: bool,
}

pub trait StringCommands {
    fn get<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, Option<String>>;
    fn set<'a>(&'a self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Future<'a, ()>;
    fn set_with_options<'a>(
        &'a self,
        key: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
        options: SetOptions,
    ) -> Future<'a, Option<String>>;
    fn getset<'a>(&'a self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Future<'a, Option<String>>;
    fn getdel<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, Option<String>>;
    fn incr<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64>;
    fn incrby<'a>(&'a self, key: impl Into<Vec<u8>>, delta: i64) -> Future<'a, i64>;
    fn incrbyfloat<'a>(&'a self, key: impl Into<Vec<u8>>, delta: f64) -> Future<'a, f64>;
    fn decr<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64>;
    fn decrby<'a>(&'a self, key: impl Into<Vec<u8>>, delta: i64) -> Future<'a, i64>;
    fn append<'a>(&'a self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Future<'a, i64>;
    fn strlen<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64>;
    fn mget<'a>(&'a self, keys: Vec<Vec<u8>>) -> Future<'a, Vec<Option<String>>>;
    fn mset<'a>(&'a self, pairs: Vec<(Vec<u8>, Vec<u8>)>) -> Future<'a, ()>;
    fn getrange<'a>(&'a self, key: impl Into<Vec<u8>>, start: i64, end: i64) -> Future<'a, String>;
    fn setrange<'a>(&'a self, key: impl Into<Vec<u8>>, offset: i64, value: impl Into<Vec<u8>>) -> Future<'a, i64>;
}

impl StringCommands for Client {
    fn get<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, Option<String>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let value = self.call(vec![b"GET".to_vec(), key]).await?;
            value::from_value(value)
        })
    }

    fn set<'a>(&'a self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Future<'a, ()> {
        let key = key.into();
        let val = value.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            self.call(vec![b"SET".to_vec(), key, val]).await?;
            Ok(())
        })
    }

    fn set_with_options<'a>(
        &'a self,
        key: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
        options: SetOptions,
    ) -> Future<'a, Option<String>> {
        let key = key.into();
        let val = value.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let mut args = vec![b"SET".to_vec(), key, val];
            if let Some(seconds) = options.ex_seconds {
                args.push(b"EX".to_vec());
                args.push(seconds.to_string().into_bytes());
            }
            if let Some(millis) = options.px_millis {
                args.push(b"PX".to_vec());
                args.push(millis.to_string().into_bytes());
            }
            if let Some(seconds) = options.exat_seconds {
                args.push(b"EXAT".to_vec());
                args.push(seconds.to_string().into_bytes());
            }
            if let Some(millis) = options.pxat_millis {
                args.push(b"PXAT".to_vec());
                args.push(millis.to_string().into_bytes());
            }
            if options.nx {
                args.push(b"NX".to_vec());
            }
            if options.xx {
                args.push(b"XX".to_vec());
            }
            if options.keep_ttl {
                args.push(b"KEEPTTL".to_vec());
            }
            if options.get {
                args.push(b"GET".to_vec());
            }
            let result = self.call(args).await?;
            match result {
                crate::value::Value::Nil => Ok(None),
                other => Ok(Some(value::to_utf8_string(&other)?)),
            }
        })
    }

    fn getset<'a>(&'a self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Future<'a, Option<String>> {
        let key = key.into();
        let val = value.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let result = self.call(vec![b"GETSET".to_vec(), key, val]).await?;
            value::from_value(result)
        })
    }

    fn getdel<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, Option<String>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let result = self.call(vec![b"GETDEL".to_vec(), key]).await?;
            value::from_value(result)
        })
    }

    fn incr<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let result = self.call(vec![b"INCR".to_vec(), key]).await?;
            value::from_value(result)
        })
    }

    fn incrby<'a>(&'a self, key: impl Into<Vec<u8>>, delta: i64) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let result = self.call(vec![b"INCRBY".to_vec(), key, delta.to_string().into_bytes()]).await?;
            value::from_value(result)
        })
    }

    fn incrbyfloat<'a>(&'a self, key: impl Into<Vec<u8>>, delta: f64) -> Future<'a, f64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let args = vec![b"INCRBYFLOAT".to_vec(), key, value::format_score(delta).into_bytes()];
            let result = self.call(args).await?;
            let text = value::to_utf8_string(&result)?;
            text.parse::<f64>().map_err(|e| crate::error::Error::Argument(e.to_string()))
        })
    }

    fn decr<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let result = self.call(vec![b"DECR".to_vec(), key]).await?;
            value::from_value(result)
        })
    }

    fn decrby<'a>(&'a self, key: impl Into<Vec<u8>>, delta: i64) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let result = self.call(vec![b"DECRBY".to_vec(), key, delta.to_string().into_bytes()]).await?;
            value::from_value(result)
        })
    }

    fn append<'a>(&'a self, key: impl Into<Vec<u8>>, value_: impl Into<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        let value_ = value_.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let result = self.call(vec![b"APPEND".to_vec(), key, value_]).await?;
            value::from_value(result)
        })
    }

    fn strlen<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let result = self.call(vec![b"STRLEN".to_vec(), key]).await?;
            value::from_value(result)
        })
    }

    fn mget<'a>(&'a self, keys: Vec<Vec<u8>>) -> Future<'a, Vec<Option<String>>> {
        Box::pin(async move {
            let mut args = vec![b"MGET".to_vec()];
            for key in keys {
                args.push(self.prefixed_key(key)?);
            }
            let result = self.call(args).await?;
            value::from_value(result)
        })
    }

    fn mset<'a>(&'a self, pairs: Vec<(Vec<u8>, Vec<u8>)>) -> Future<'a, ()> {
        Box::pin(async move {
            let mut args = vec![b"MSET".to_vec()];
            for (key, val) in pairs {
                args.push(self.prefixed_key(key)?);
                args.push(val);
            }
            self.call(args).await?;
            Ok(())
        })
    }

    fn getrange<'a>(&'a self, key: impl Into<Vec<u8>>, start: i64, end: i64) -> Future<'a, String> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let args = vec![b"GETRANGE".to_vec(), key, start.to_string().into_bytes(), end.to_string().into_bytes()];
            let result = self.call(args).await?;
            value::to_utf8_string(&result)
        })
    }

    fn setrange<'a>(&'a self, key: impl Into<Vec<u8>>, offset: i64, value_: impl Into<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        let value_ = value_.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let args = vec![b"SETRANGE".to_vec(), key, offset.to_string().into_bytes(), value_];
            let result = self.call(args).await?;
            value::from_value(result)
        })
    }
}
