//! RedisJSON commands (`JSON.SET`/`JSON.GET`).
//!
//! `JSON.GET` replies with a JSON-encoded array when given a JSONPath
//! query; ioredis callers asking for the common single-field case
//! (`"$.field"`) expect the single unwrapped value back, not a one-element
//! array. This only unwraps a literal `"$."`-prefixed path, not JSONPath
//! roots in general (spec §9 Open Question resolution).

use serde_json::Value as Json;

use crate::client::Client;
use crate::value;
use crate::Future;

pub trait JsonCommands {
    fn json_set<'a>(&'a self, key: impl Into<Vec<u8>>, path: &'a str, value: &'a Json) -> Future<'a, ()>;
    fn json_get<'a>(&'a self, key: impl Into<Vec<u8>>, path: &'a str) -> Future<'a, Option<Json>>;
}

impl JsonCommands for Client {
    fn json_set<'a>(&'a self, key: impl Into<Vec<u8>>, path: &'a str, value: &'a Json) -> Future<'a, ()> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let body = serde_json::to_vec(value)
                .map_err(|e| crate::error::Error::Argument(format!("could not serialize JSON value: {e}")))?;
            self.call(vec![b"JSON.SET".to_vec(), key, path.as_bytes().to_vec(), body]).await?;
            Ok(())
        })
    }

    fn json_get<'a>(&'a self, key: impl Into<Vec<u8>>, path: &'a str) -> Future<'a, Option<Json>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let result = self.call(vec![b"JSON.GET".to_vec(), key, path.as_bytes().to_vec()]).await?;
            let text = match result {
                crate::value::Value::Nil => return Ok(None),
                other => value::to_utf8_string(&other)?,
            };
            let parsed: Json = serde_json::from_str(&text)
                .map_err(|e| crate::error::Error::Argument(format!("malformed JSON reply: {e}")))?;
            if path.starts_with("$.") {
                if let Json::Array(mut items) = parsed {
                    return Ok(items.pop());
                }
            }
            Ok(Some(parsed))
        })
    }
}
