//! Generic key commands (`DEL`/`EXISTS`/`EXPIRE`/`TTL`/`TYPE`/`SCAN`/...).

use crate::client::Client;
use crate::value;
use crate::Future;

/// One page of a `SCAN` sweep: the cursor to pass back in for the next
/// page (`0` means the sweep is complete) and the keys found so far.
#[derive(Debug, Clone)]
pub struct ScanPage {
    pub cursor: u64,
    pub keys: Vec<String>,
}

pub trait KeyCommands {
    fn del<'a>(&'a self, keys: Vec<Vec<u8>>) -> Future<'a, i64>;
    fn exists<'a>(&'a self, keys: Vec<Vec<u8>>) -> Future<'a, i64>;
    fn expire<'a>(&'a self, key: impl Into<Vec<u8>>, seconds: i64) -> Future<'a, bool>;
    fn pexpire<'a>(&'a self, key: impl Into<Vec<u8>>, millis: i64) -> Future<'a, bool>;
    fn ttl<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64>;
    fn pttl<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64>;
    fn persist<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, bool>;
    fn key_type<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, String>;
    fn rename<'a>(&'a self, key: impl Into<Vec<u8>>, new_key: impl Into<Vec<u8>>) -> Future<'a, ()>;
    fn renamenx<'a>(&'a self, key: impl Into<Vec<u8>>, new_key: impl Into<Vec<u8>>) -> Future<'a, bool>;
    fn copy<'a>(&'a self, source: impl Into<Vec<u8>>, destination: impl Into<Vec<u8>>) -> Future<'a, bool>;
    fn keys<'a>(&'a self, pattern: impl Into<Vec<u8>>) -> Future<'a, Vec<String>>;
    fn scan<'a>(&'a self, cursor: u64, pattern: Option<String>, count: Option<u64>) -> Future<'a, ScanPage>;
    /// Drives [`KeyCommands::scan`] to completion, accumulating every page
    /// into one `Vec` — the Rust stand-in for ioredis's `scanStream()`,
    /// which hands callers a Node `Readable` that does the same looping
    /// internally (spec §6).
    fn scan_stream<'a>(&'a self, pattern: Option<String>, count: Option<u64>) -> Future<'a, Vec<String>>;
}

impl KeyCommands for Client {
    fn del<'a>(&'a self, keys: Vec<Vec<u8>>) -> Future<'a, i64> {
        Box::pin(async move {
            let mut args = vec![b"DEL".to_vec()];
            for key in keys {
                args.push(self.prefixed_key(key)?);
            }
            value::from_value(self.call(args).await?)
        })
    }

    fn exists<'a>(&'a self, keys: Vec<Vec<u8>>) -> Future<'a, i64> {
        Box::pin(async move {
            let mut args = vec![b"EXISTS".to_vec()];
            for key in keys {
                args.push(self.prefixed_key(key)?);
            }
            value::from_value(self.call(args).await?)
        })
    }

    fn expire<'a>(&'a self, key: impl Into<Vec<u8>>, seconds: i64) -> Future<'a, bool> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let result: i64 = value::from_value(
                self.call(vec![b"EXPIRE".to_vec(), key, seconds.to_string().into_bytes()]).await?,
            )?;
            Ok(result == 1)
        })
    }

    fn pexpire<'a>(&'a self, key: impl Into<Vec<u8>>, millis: i64) -> Future<'a, bool> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let result: i64 = value::from_value(
                self.call(vec![b"PEXPIRE".to_vec(), key, millis.to_string().into_bytes()]).await?,
            )?;
            Ok(result == 1)
        })
    }

    fn ttl<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            value::from_value(self.call(vec![b"TTL".to_vec(), key]).await?)
        })
    }

    fn pttl<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            value::from_value(self.call(vec![b"PTTL".to_vec(), key]).await?)
        })
    }

    fn persist<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, bool> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let result: i64 = value::from_value(self.call(vec![b"PERSIST".to_vec(), key]).await?)?;
            Ok(result == 1)
        })
    }

    fn key_type<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, String> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let result = self.call(vec![b"TYPE".to_vec(), key]).await?;
            value::to_utf8_string(&result)
        })
    }

    fn rename<'a>(&'a self, key: impl Into<Vec<u8>>, new_key: impl Into<Vec<u8>>) -> Future<'a, ()> {
        let key = key.into();
        let new_key = new_key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let new_key = self.prefixed_key(new_key)?;
            self.call(vec![b"RENAME".to_vec(), key, new_key]).await?;
            Ok(())
        })
    }

    fn renamenx<'a>(&'a self, key: impl Into<Vec<u8>>, new_key: impl Into<Vec<u8>>) -> Future<'a, bool> {
        let key = key.into();
        let new_key = new_key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let new_key = self.prefixed_key(new_key)?;
            let result: i64 = value::from_value(self.call(vec![b"RENAMENX".to_vec(), key, new_key]).await?)?;
            Ok(result == 1)
        })
    }

    fn copy<'a>(&'a self, source: impl Into<Vec<u8>>, destination: impl Into<Vec<u8>>) -> Future<'a, bool> {
        let source = source.into();
        let destination = destination.into();
        Box::pin(async move {
            let source = self.prefixed_key(source)?;
            let destination = self.prefixed_key(destination)?;
            let result: i64 = value::from_value(self.call(vec![b"COPY".to_vec(), source, destination]).await?)?;
            Ok(result == 1)
        })
    }

    fn keys<'a>(&'a self, pattern: impl Into<Vec<u8>>) -> Future<'a, Vec<String>> {
        let pattern = pattern.into();
        Box::pin(async move {
            let result = self.call(vec![b"KEYS".to_vec(), pattern]).await?;
            value::from_value(result)
        })
    }

    fn scan<'a>(&'a self, cursor: u64, pattern: Option<String>, count: Option<u64>) -> Future<'a, ScanPage> {
        Box::pin(async move {
            let mut args = vec![b"SCAN".to_vec(), cursor.to_string().into_bytes()];
            if let Some(pattern) = pattern {
                args.push(b"MATCH".to_vec());
                args.push(pattern.into_bytes());
            }
            if let Some(count) = count {
                args.push(b"COUNT".to_vec());
                args.push(count.to_string().into_bytes());
            }
            let result = self.call(args).await?;
            let (cursor_value, keys): (String, Vec<String>) = value::from_value(result)?;
            let cursor = cursor_value
                .parse()
                .map_err(|_| crate::error::Error::Argument("malformed SCAN cursor".into()))?;
            Ok(ScanPage { cursor, keys })
        })
    }

    fn scan_stream<'a>(&'a self, pattern: Option<String>, count: Option<u64>) -> Future<'a, Vec<String>> {
        Box::pin(async move {
            let mut all_keys = Vec::new();
            let mut cursor = 0;
            loop {
                let page = self.scan(cursor, pattern.clone(), count).await?;
                all_keys.extend(page.keys);
                cursor = page.cursor;
                if cursor == 0 {
                    break;
                }
            }
            Ok(all_keys)
        })
    }
}
