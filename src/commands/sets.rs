//! Set commands (`SADD`/`SMEMBERS`/`SUNION`/...).

use crate::client::Client;
use crate::value;
use crate::Future;

pub trait SetCommands {
    fn sadd<'a>(&'a self, key: impl Into<Vec<u8>>, members: Vec<Vec<u8>>) -> Future<'a, i64>;
    fn srem<'a>(&'a self, key: impl Into<Vec<u8>>, members: Vec<Vec<u8>>) -> Future<'a, i64>;
    fn smembers<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, Vec<String>>;
    fn sismember<'a>(&'a self, key: impl Into<Vec<u8>>, member: impl Into<Vec<u8>>) -> Future<'a, bool>;
    fn scard<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64>;
    fn spop<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, Option<String>>;
    fn sunion<'a>(&'a self, keys: Vec<Vec<u8>>) -> Future<'a, Vec<String>>;
    fn sinter<'a>(&'a self, keys: Vec<Vec<u8>>) -> Future<'a, Vec<String>>;
    fn sdiff<'a>(&'a self, keys: Vec<Vec<u8>>) -> Future<'a, Vec<String>>;
}

impl SetCommands for Client {
    fn sadd<'a>(&'a self, key: impl Into<Vec<u8>>, members: Vec<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let mut args = vec![b"SADD".to_vec(), key];
            args.extend(members);
            value::from_value(self.call(args).await?)
        })
    }

    fn srem<'a>(&'a self, key: impl Into<Vec<u8>>, members: Vec<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let mut args = vec![b"SREM".to_vec(), key];
            args.extend(members);
            value::from_value(self.call(args).await?)
        })
    }

    fn smembers<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, Vec<String>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            value::from_value(self.call(vec![b"SMEMBERS".to_vec(), key]).await?)
        })
    }

    fn sismember<'a>(&'a self, key: impl Into<Vec<u8>>, member: impl Into<Vec<u8>>) -> Future<'a, bool> {
        let key = key.into();
        let member = member.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let result: i64 = value::from_value(self.call(vec![b"SISMEMBER".to_vec(), key, member]).await?)?;
            Ok(result == 1)
        })
    }

    fn scard<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            value::from_value(self.call(vec![b"SCARD".to_vec(), key]).await?)
        })
    }

    fn spop<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, Option<String>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            value::from_value(self.call(vec![b"SPOP".to_vec(), key]).await?)
        })
    }

    fn sunion<'a>(&'a self, keys: Vec<Vec<u8>>) -> Future<'a, Vec<String>> {
        Box::pin(async move {
            let mut args = vec![b"SUNION".to_vec()];
            for key in keys {
                args.push(self.prefixed_key(key)?);
            }
            value::from_value(self.call(args).await?)
        })
    }

    fn sinter<'a>(&'a self, keys: Vec<Vec<u8>>) -> Future<'a, Vec<String>> {
        Box::pin(async move {
            let mut args = vec![b"SINTER".to_vec()];
            for key in keys {
                args.push(self.prefixed_key(key)?);
            }
            value::from_value(self.call(args).await?)
        })
    }

    fn sdiff<'a>(&'a self, keys: Vec<Vec<u8>>) -> Future<'a, Vec<String>> {
        Box::pin(async move {
            let mut args = vec![b"SDIFF".to_vec()];
            for key in keys {
                args.push(self.prefixed_key(key)?);
            }
            value::from_value(self.call(args).await?)
        })
    }
}
