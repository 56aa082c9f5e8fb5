//! Canonical value model exchanged across the [`Driver`](crate::driver::Driver)
//! boundary, and the conversions needed to hand ioredis-shaped results back to
//! callers (spec §4.B "convertGlideString" / score formatting, §4.E pipeline
//! slot encoding).
//!
//! This crate does not reimplement RESP: [`Value`] is simply the value model
//! of the `redis` crate, which is what a real GLIDE-backed [`Driver`] would
//! also hand back (GLIDE's core is itself a fork of `redis-rs`).

use crate::error::{Error, Result};

/// Driver response value. Re-exported rather than redefined — see module docs.
pub type Value = redis::Value;

/// Convert a driver [`Value`] into a typed result the way command methods do,
/// translating driver errors into [`Error::Redis`] instead of panicking.
pub fn from_value<T: redis::FromRedisValue>(value: Value) -> Result<T> {
    redis::FromRedisValue::from_redis_value(&value).map_err(Error::from)
}

/// Canonicalize a driver string-ish value (bytes or text) to a Rust `String`,
/// used everywhere the adapter needs text instead of raw bytes (channel
/// names, patterns, hash fields, …). See spec §4.B `convertGlideString`.
pub fn to_utf8_string(value: &Value) -> Result<String> {
    match value {
        Value::BulkString(bytes) => String::from_utf8(bytes.clone())
            .map_err(|e| Error::Argument(format!("non-utf8 value: {e}"))),
        Value::SimpleString(s) => Ok(s.clone()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Double(d) => Ok(format_score(*d)),
        Value::Okay => Ok("OK".to_owned()),
        Value::Nil => Ok(String::new()),
        other => Err(Error::Argument(format!("cannot convert {other:?} to string"))),
    }
}

/// Format a score the way ioredis expects: bare decimal for finite values,
/// `"inf"` / `"-inf"` for the infinities — never Rust's `"inf"`-but-also-not
/// `"Infinity"` default formatting mismatch that some languages have (spec
/// §4.B "Score formatting").
pub fn format_score(score: f64) -> String {
    if score.is_infinite() {
        if score.is_sign_positive() { "inf".to_owned() } else { "-inf".to_owned() }
    } else {
        // Matches redis-server's own formatting: shortest round-trippable
        // representation, integral scores rendered without a trailing ".0".
        if score.fract() == 0.0 && score.abs() < 1e17 {
            format!("{}", score as i64)
        } else {
            format!("{score}")
        }
    }
}

/// One slot of a pipeline/transaction result: exactly one of `err`/`value` is
/// populated, mirroring ioredis's `[err, value]` tuple (spec §4.E, P3).
#[derive(Debug, Clone)]
pub enum PipelineSlot {
    Ok(Value),
    Err(RedisErrorText),
}

/// Just the display text of a server error, retained separately from the full
/// [`Error`] enum so pipeline slots stay cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisErrorText(pub String);

impl std::fmt::Display for RedisErrorText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PipelineSlot {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::ServerError(e) => {
                let text = crate::error::RedisError::from(e.to_string().as_str()).to_string();
                PipelineSlot::Err(RedisErrorText(text))
            }
            other => PipelineSlot::Ok(other),
        }
    }

    pub fn is_err(&self) -> bool {
        matches!(self, PipelineSlot::Err(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_finite_scores_without_trailing_zero() {
        assert_eq!(format_score(1.0), "1");
        assert_eq!(format_score(1.5), "1.5");
        assert_eq!(format_score(0.0), "0");
    }

    #[test]
    fn formats_infinities_as_inf_not_infinity() {
        assert_eq!(format_score(f64::INFINITY), "inf");
        assert_eq!(format_score(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn pipeline_slot_roundtrips_ok_value() {
        let slot = PipelineSlot::from_value(Value::Okay);
        assert!(!slot.is_err());
    }
}
