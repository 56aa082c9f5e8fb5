//! Hash commands (`HSET`/`HGET`/`HGETALL`/...).

use std::collections::HashMap;

use crate::client::Client;
use crate::translate;
use crate::value;
use crate::Future;

pub trait HashCommands {
    fn hset<'a>(&'a self, key: impl Into<Vec<u8>>, fields_and_values: Vec<Vec<u8>>) -> Future<'a, i64>;
    fn hget<'a>(&'a self, key: impl Into<Vec<u8>>, field: impl Into<Vec<u8>>) -> Future<'a, Option<String>>;
    fn hdel<'a>(&'a self, key: impl Into<Vec<u8>>, fields: Vec<Vec<u8>>) -> Future<'a, i64>;
    fn hgetall<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, HashMap<String, String>>;
    fn hmget<'a>(&'a self, key: impl Into<Vec<u8>>, fields: Vec<Vec<u8>>) -> Future<'a, Vec<Option<String>>>;
    fn hincrby<'a>(&'a self, key: impl Into<Vec<u8>>, field: impl Into<Vec<u8>>, delta: i64) -> Future<'a, i64>;
    fn hexists<'a>(&'a self, key: impl Into<Vec<u8>>, field: impl Into<Vec<u8>>) -> Future<'a, bool>;
    fn hkeys<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, Vec<String>>;
    fn hvals<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, Vec<String>>;
    fn hlen<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64>;
}

impl HashCommands for Client {
    fn hset<'a>(&'a self, key: impl Into<Vec<u8>>, fields_and_values: Vec<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let pairs = translate::parse_hash_set_pairs(&fields_and_values)?;
            let mut args = vec![b"HSET".to_vec(), key];
            for (field, value) in pairs {
                args.push(field);
                args.push(value);
            }
            value::from_value(self.call(args).await?)
        })
    }

    fn hget<'a>(&'a self, key: impl Into<Vec<u8>>, field: impl Into<Vec<u8>>) -> Future<'a, Option<String>> {
        let key = key.into();
        let field = field.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            value::from_value(self.call(vec![b"HGET".to_vec(), key, field]).await?)
        })
    }

    fn hdel<'a>(&'a self, key: impl Into<Vec<u8>>, fields: Vec<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let mut args = vec![b"HDEL".to_vec(), key];
            args.extend(fields);
            value::from_value(self.call(args).await?)
        })
    }

    fn hgetall<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, HashMap<String, String>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            value::from_value(self.call(vec![b"HGETALL".to_vec(), key]).await?)
        })
    }

    fn hmget<'a>(&'a self, key: impl Into<Vec<u8>>, fields: Vec<Vec<u8>>) -> Future<'a, Vec<Option<String>>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let mut args = vec![b"HMGET".to_vec(), key];
            args.extend(fields);
            value::from_value(self.call(args).await?)
        })
    }

    fn hincrby<'a>(&'a self, key: impl Into<Vec<u8>>, field: impl Into<Vec<u8>>, delta: i64) -> Future<'a, i64> {
        let key = key.into();
        let field = field.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let args = vec![b"HINCRBY".to_vec(), key, field, delta.to_string().into_bytes()];
            value::from_value(self.call(args).await?)
        })
    }

    fn hexists<'a>(&'a self, key: impl Into<Vec<u8>>, field: impl Into<Vec<u8>>) -> Future<'a, bool> {
        let key = key.into();
        let field = field.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let result: i64 = value::from_value(self.call(vec![b"HEXISTS".to_vec(), key, field]).await?)?;
            Ok(result == 1)
        })
    }

    fn hkeys<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, Vec<String>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            value::from_value(self.call(vec![b"HKEYS".to_vec(), key]).await?)
        })
    }

    fn hvals<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, Vec<String>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            value::from_value(self.call(vec![b"HVALS".to_vec(), key]).await?)
        })
    }

    fn hlen<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            value::from_value(self.call(vec![b"HLEN".to_vec(), key]).await?)
        })
    }
}
