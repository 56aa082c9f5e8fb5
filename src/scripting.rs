//! Dynamic Script Registry (spec §4.F): the Rust counterpart to ioredis's
//! `defineCommand`. Rust has no way to install a same-named instance method
//! at runtime, so `define_command` hands back a [`ScriptCommand`] handle
//! instead (spec §9 Open Question) — call it through
//! [`Client::call_script`](crate::client::Client::call_script).

use std::collections::HashMap;
use std::sync::Mutex;

use sha1::{Digest, Sha1};

use crate::driver::Driver;
use crate::error::Result;
use crate::translate;
use crate::value::Value;

/// A script registered via [`Client::define_command`](crate::client::Client::define_command).
/// Self-contained: the SHA1 digest is computed once at registration time so
/// invocation never has to recompute it.
#[derive(Debug, Clone)]
pub struct ScriptCommand {
    pub name: String,
    pub num_keys: u32,
    pub sha1: String,
    pub(crate) body: String,
}

/// Tracks every script a [`Client`](crate::client::Client) has defined, keyed
/// by name, so redefining the same name with different source is at least
/// observable rather than silently ignored.
#[derive(Default)]
pub struct ScriptRegistry {
    scripts: Mutex<HashMap<String, ScriptCommand>>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&self, name: String, num_keys: u32, lua: String) -> ScriptCommand {
        let sha1 = hex::encode(Sha1::digest(lua.as_bytes()));
        let command = ScriptCommand { name: name.clone(), num_keys, sha1, body: lua };
        if let Some(previous) = self.scripts.lock().unwrap().insert(name.clone(), command.clone()) {
            if previous.body != command.body {
                log::warn!("redefining script command {name:?} with different source");
            }
        }
        command
    }

    pub fn get(&self, name: &str) -> Option<ScriptCommand> {
        self.scripts.lock().unwrap().get(name).cloned()
    }
}

/// Run a defined script, trying `EVALSHA` first and falling back to `EVAL`
/// on `NOSCRIPT` (the server evicted the script, or this is the very first
/// call and nothing has primed its cache yet). `keys` are prefixed the same
/// way any other key argument is (spec §4.B/§4.F: `keyPrefix` must reach
/// into `KEYS`, not just top-level command keys).
pub async fn invoke(
    driver: &dyn Driver,
    handle: &ScriptCommand,
    keys: &[Vec<u8>],
    args: &[Vec<u8>],
    key_prefix: Option<&str>,
) -> Result<Value> {
    let prefixed_keys = keys
        .iter()
        .map(|key| translate::normalize_key(key, key_prefix))
        .collect::<Result<Vec<_>>>()?;

    let result = match driver.eval_sha(&handle.sha1, &prefixed_keys, args).await {
        Ok(value) => Ok(value),
        Err(e) if e.is_noscript() => driver.eval(&handle.body, &prefixed_keys, args).await,
        Err(e) => Err(e),
    }?;

    Ok(remap_empty_table_return(result, &handle.body))
}

/// The server normalizes a script's `return {}` to a nil reply; ioredis
/// callers expect an empty array back instead (spec §4.F point 4, P9).
fn remap_empty_table_return(value: Value, script_body: &str) -> Value {
    match value {
        Value::Nil if script_body.contains("return {}") => Value::Array(Vec::new()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaps_nil_return_to_empty_array_when_source_says_return_empty_table() {
        let remapped = remap_empty_table_return(Value::Nil, "if false then return 1 end\nreturn {}");
        assert!(matches!(remapped, Value::Array(v) if v.is_empty()));
    }

    #[test]
    fn leaves_nil_return_alone_without_the_literal_token() {
        let remapped = remap_empty_table_return(Value::Nil, "return nil");
        assert!(matches!(remapped, Value::Nil));
    }

    #[test]
    fn leaves_non_nil_values_untouched_even_with_the_token_present() {
        let remapped = remap_empty_table_return(Value::Int(5), "return {}");
        assert!(matches!(remapped, Value::Int(5)));
    }

    #[test]
    fn define_computes_sha1_digest() {
        let registry = ScriptRegistry::new();
        let handle = registry.define("myEcho".to_owned(), 1, "return KEYS[1]".to_owned());
        assert_eq!(handle.sha1.len(), 40);
        assert_eq!(registry.get("myEcho").unwrap().sha1, handle.sha1);
    }

    #[test]
    fn redefining_with_same_source_keeps_same_digest() {
        let registry = ScriptRegistry::new();
        let first = registry.define("myEcho".to_owned(), 1, "return KEYS[1]".to_owned());
        let second = registry.define("myEcho".to_owned(), 1, "return KEYS[1]".to_owned());
        assert_eq!(first.sha1, second.sha1);
    }
}
