//! Stream commands (`XADD`/`XLEN`/`XRANGE`/...).

use crate::client::Client;
use crate::value;
use crate::Future;

/// One entry of a stream: its ID plus the flattened field/value pairs.
#[derive(Debug, Clone)]
pub struct StreamEntry {
    pub id: String,
    pub fields: Vec<(String, String)>,
}

pub trait StreamCommands {
    /// `XADD key * field value [field value ...]`. Pass `"*"` as `id` to
    /// let the server assign one, matching ioredis's default.
    fn xadd<'a>(
        &'a self,
        key: impl Into<Vec<u8>>,
        id: impl Into<Vec<u8>>,
        fields_and_values: Vec<Vec<u8>>,
    ) -> Future<'a, String>;
    fn xlen<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64>;
    fn xrange<'a>(
        &'a self,
        key: impl Into<Vec<u8>>,
        start: impl Into<Vec<u8>>,
        end: impl Into<Vec<u8>>,
    ) -> Future<'a, Vec<StreamEntry>>;
    fn xdel<'a>(&'a self, key: impl Into<Vec<u8>>, ids: Vec<Vec<u8>>) -> Future<'a, i64>;
}

impl StreamCommands for Client {
    fn xadd<'a>(
        &'a self,
        key: impl Into<Vec<u8>>,
        id: impl Into<Vec<u8>>,
        fields_and_values: Vec<Vec<u8>>,
    ) -> Future<'a, String> {
        let key = key.into();
        let id = id.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let mut args = vec![b"XADD".to_vec(), key, id];
            args.extend(fields_and_values);
            let result = self.call(args).await?;
            value::to_utf8_string(&result)
        })
    }

    fn xlen<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            value::from_value(self.call(vec![b"XLEN".to_vec(), key]).await?)
        })
    }

    fn xrange<'a>(
        &'a self,
        key: impl Into<Vec<u8>>,
        start: impl Into<Vec<u8>>,
        end: impl Into<Vec<u8>>,
    ) -> Future<'a, Vec<StreamEntry>> {
        let key = key.into();
        let start = start.into();
        let end = end.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let result = self.call(vec![b"XRANGE".to_vec(), key, start, end]).await?;
            let raw: Vec<(String, Vec<String>)> = value::from_value(result)?;
            Ok(raw
                .into_iter()
                .map(|(id, flat)| StreamEntry {
                    id,
                    fields: flat.chunks_exact(2).map(|pair| (pair[0].clone(), pair[1].clone())).collect(),
                })
                .collect())
        })
    }

    fn xdel<'a>(&'a self, key: impl Into<Vec<u8>>, ids: Vec<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let mut args = vec![b"XDEL".to_vec(), key];
            args.extend(ids);
            value::from_value(self.call(args).await?)
        })
    }
}
