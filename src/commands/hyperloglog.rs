//! HyperLogLog commands (`PFADD`/`PFCOUNT`/`PFMERGE`).

use crate::client::Client;
use crate::value;
use crate::Future;

pub trait HyperLogLogCommands {
    fn pfadd<'a>(&'a self, key: impl Into<Vec<u8>>, elements: Vec<Vec<u8>>) -> Future<'a, bool>;
    fn pfcount<'a>(&'a self, keys: Vec<Vec<u8>>) -> Future<'a, i64>;
    fn pfmerge<'a>(&'a self, destination: impl Into<Vec<u8>>, sources: Vec<Vec<u8>>) -> Future<'a, ()>;
}

impl HyperLogLogCommands for Client {
    fn pfadd<'a>(&'a self, key: impl Into<Vec<u8>>, elements: Vec<Vec<u8>>) -> Future<'a, bool> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let mut args = vec![b"PFADD".to_vec(), key];
            args.extend(elements);
            let result: i64 = value::from_value(self.call(args).await?)?;
            Ok(result == 1)
        })
    }

    fn pfcount<'a>(&'a self, keys: Vec<Vec<u8>>) -> Future<'a, i64> {
        Box::pin(async move {
            let mut args = vec![b"PFCOUNT".to_vec()];
            for key in keys {
                args.push(self.prefixed_key(key)?);
            }
            value::from_value(self.call(args).await?)
        })
    }

    fn pfmerge<'a>(&'a self, destination: impl Into<Vec<u8>>, sources: Vec<Vec<u8>>) -> Future<'a, ()> {
        let destination = destination.into();
        Box::pin(async move {
            let destination = self.prefixed_key(destination)?;
            let mut args = vec![b"PFMERGE".to_vec(), destination];
            for source in sources {
                args.push(self.prefixed_key(source)?);
            }
            self.call(args).await?;
            Ok(())
        })
    }
}
