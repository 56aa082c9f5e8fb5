//! Bitmap commands (`SETBIT`/`GETBIT`/`BITCOUNT`/`BITOP`).

use crate::client::Client;
use crate::value;
use crate::Future;

/// Bitwise operator accepted by [`BitmapCommands::bitop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOp {
    And,
    Or,
    Xor,
    Not,
}

impl BitOp {
    fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Not => "NOT",
        }
    }
}

pub trait BitmapCommands {
    fn setbit<'a>(&'a self, key: impl Into<Vec<u8>>, offset: u64, value: bool) -> Future<'a, i64>;
    fn getbit<'a>(&'a self, key: impl Into<Vec<u8>>, offset: u64) -> Future<'a, i64>;
    fn bitcount<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64>;
    fn bitop<'a>(&'a self, op: BitOp, destination: impl Into<Vec<u8>>, sources: Vec<Vec<u8>>) -> Future<'a, i64>;
}

impl BitmapCommands for Client {
    fn setbit<'a>(&'a self, key: impl Into<Vec<u8>>, offset: u64, value: bool) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let bit = if value { b"1".to_vec() } else { b"0".to_vec() };
            let args = vec![b"SETBIT".to_vec(), key, offset.to_string().into_bytes(), bit];
            value::from_value(self.call(args).await?)
        })
    }

    fn getbit<'a>(&'a self, key: impl Into<Vec<u8>>, offset: u64) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let args = vec![b"GETBIT".to_vec(), key, offset.to_string().into_bytes()];
            value::from_value(self.call(args).await?)
        })
    }

    fn bitcount<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            value::from_value(self.call(vec![b"BITCOUNT".to_vec(), key]).await?)
        })
    }

    fn bitop<'a>(&'a self, op: BitOp, destination: impl Into<Vec<u8>>, sources: Vec<Vec<u8>>) -> Future<'a, i64> {
        let destination = destination.into();
        Box::pin(async move {
            let destination = self.prefixed_key(destination)?;
            let mut args = vec![b"BITOP".to_vec(), op.as_str().as_bytes().to_vec(), destination];
            for source in sources {
                args.push(self.prefixed_key(source)?);
            }
            value::from_value(self.call(args).await?)
        })
    }
}
