//! Parameter Translator (spec §4.B). Pure functions, no I/O: key/value
//! normalization, keyPrefix application, hash-set argument parsing, and
//! sorted-set score/lex boundary parsing.

use crate::error::{Error, Result};

/// Accepts a string or raw bytes and returns the bytes to send on the wire,
/// prefixing with `prefix` if one is configured. Rejects empty keys, matching
/// commands that require a key (`SET`, …) raising a "wrong number of
/// arguments" style error (spec §4.B.1).
pub fn normalize_key(key: impl AsRef<[u8]>, prefix: Option<&str>) -> Result<Vec<u8>> {
    let key = key.as_ref();
    if key.is_empty() {
        return Err(Error::Argument("wrong number of arguments: key must not be empty".into()));
    }
    Ok(match prefix {
        Some(p) if !p.is_empty() => {
            let mut buf = Vec::with_capacity(p.len() + key.len());
            buf.extend_from_slice(p.as_bytes());
            buf.extend_from_slice(key);
            buf
        }
        _ => key.to_vec(),
    })
}

/// Any value argument: strings/bytes pass through, numbers stringify. Kept
/// as a trait rather than a single function so call sites read naturally
/// (`value.normalize()`) the way the teacher's `Serialize`/`ToArgs` traits do.
pub trait NormalizeValue {
    fn normalize(&self) -> Vec<u8>;
}

impl NormalizeValue for str {
    fn normalize(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl NormalizeValue for String {
    fn normalize(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl NormalizeValue for [u8] {
    fn normalize(&self) -> Vec<u8> {
        self.to_vec()
    }
}

impl NormalizeValue for Vec<u8> {
    fn normalize(&self) -> Vec<u8> {
        self.clone()
    }
}

macro_rules! impl_normalize_value_for_int {
    ($($t:ty),*) => {
        $(impl NormalizeValue for $t {
            fn normalize(&self) -> Vec<u8> {
                self.to_string().into_bytes()
            }
        })*
    };
}
impl_normalize_value_for_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

/// One field/value pair after collapsing either accepted `HSET`/`HMSET` shape
/// (spec §4.B.3): a single mapping argument, or an alternating variadic
/// `field, value, field, value, …` list. Odd-length variadic input is a
/// usage error.
pub fn parse_hash_set_pairs(args: &[Vec<u8>]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
    if args.len() % 2 != 0 {
        return Err(Error::Argument(
            "wrong number of arguments for HSET: expected alternating field/value pairs".into(),
        ));
    }
    Ok(args.chunks_exact(2).map(|pair| (pair[0].clone(), pair[1].clone())).collect())
}

/// Parsed form of a `ZRANGEBYSCORE`/`ZADD GT|LT` style score boundary
/// (spec §4.B.4): `"5"` → inclusive 5, `"(5"` → exclusive 5, `"+inf"`/`"-inf"`
/// → inclusive infinity, `"(+inf"`/`"(-inf"` → exclusive infinity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBoundary {
    pub value: f64,
    pub inclusive: bool,
}

pub fn parse_score_boundary(raw: &str) -> Result<ScoreBoundary> {
    let (exclusive, rest) = match raw.strip_prefix('(') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let value = match rest {
        "+inf" => f64::INFINITY,
        "-inf" => f64::NEG_INFINITY,
        other => other
            .parse::<f64>()
            .map_err(|_| Error::Argument(format!("invalid score boundary: {raw}")))?,
    };
    Ok(ScoreBoundary { value, inclusive: !exclusive })
}

/// Parsed form of a `ZRANGEBYLEX` boundary (spec §4.B.5): `"-"`/`"+"` are
/// unbounded ends, `"["` is inclusive, `"("` is exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum LexBoundary {
    NegInfinity,
    PosInfinity,
    Inclusive(Vec<u8>),
    Exclusive(Vec<u8>),
}

pub fn parse_lex_boundary(raw: &[u8]) -> Result<LexBoundary> {
    match raw {
        b"-" => Ok(LexBoundary::NegInfinity),
        b"+" => Ok(LexBoundary::PosInfinity),
        [b'[', rest @ ..] => Ok(LexBoundary::Inclusive(rest.to_vec())),
        [b'(', rest @ ..] => Ok(LexBoundary::Exclusive(rest.to_vec())),
        _ => Err(Error::Argument(
            "invalid lex boundary: must start with '-', '+', '[' or '('".into(),
        )),
    }
}

impl LexBoundary {
    /// Re-encode back to the RESP token the server expects.
    pub fn to_arg(&self) -> Vec<u8> {
        match self {
            LexBoundary::NegInfinity => b"-".to_vec(),
            LexBoundary::PosInfinity => b"+".to_vec(),
            LexBoundary::Inclusive(v) => {
                let mut out = vec![b'['];
                out.extend_from_slice(v);
                out
            }
            LexBoundary::Exclusive(v) => {
                let mut out = vec![b'('];
                out.extend_from_slice(v);
                out
            }
        }
    }
}

impl ScoreBoundary {
    /// Re-encode back to the RESP token the server expects (mirror of
    /// [`parse_score_boundary`], used when the adapter builds a command from
    /// structured Rust options instead of a raw ioredis-style token string).
    pub fn to_arg(&self) -> String {
        let body = if self.value.is_infinite() {
            if self.value.is_sign_positive() { "+inf".to_owned() } else { "-inf".to_owned() }
        } else {
            crate::value::format_score(self.value)
        };
        if self.inclusive { body } else { format!("({body}") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_prepends_prefix() {
        assert_eq!(normalize_key("foo", Some("app:")).unwrap(), b"app:foo".to_vec());
        assert_eq!(normalize_key("foo", None).unwrap(), b"foo".to_vec());
    }

    #[test]
    fn normalize_key_rejects_empty() {
        assert!(normalize_key("", None).is_err());
    }

    #[test]
    fn parse_hash_set_pairs_rejects_odd_length() {
        let args = vec![b"field".to_vec()];
        assert!(parse_hash_set_pairs(&args).is_err());
    }

    #[test]
    fn parse_hash_set_pairs_accepts_variadic_form() {
        let args = vec![b"f1".to_vec(), b"v1".to_vec(), b"f2".to_vec(), b"v2".to_vec()];
        let pairs = parse_hash_set_pairs(&args).unwrap();
        assert_eq!(pairs, vec![(b"f1".to_vec(), b"v1".to_vec()), (b"f2".to_vec(), b"v2".to_vec())]);
    }

    #[test]
    fn parse_score_boundary_variants() {
        assert_eq!(parse_score_boundary("5").unwrap(), ScoreBoundary { value: 5.0, inclusive: true });
        assert_eq!(parse_score_boundary("(5").unwrap(), ScoreBoundary { value: 5.0, inclusive: false });
        assert_eq!(
            parse_score_boundary("+inf").unwrap(),
            ScoreBoundary { value: f64::INFINITY, inclusive: true }
        );
        assert_eq!(
            parse_score_boundary("(-inf").unwrap(),
            ScoreBoundary { value: f64::NEG_INFINITY, inclusive: false }
        );
    }

    #[test]
    fn parse_lex_boundary_variants() {
        assert_eq!(parse_lex_boundary(b"-").unwrap(), LexBoundary::NegInfinity);
        assert_eq!(parse_lex_boundary(b"+").unwrap(), LexBoundary::PosInfinity);
        assert_eq!(parse_lex_boundary(b"[abc").unwrap(), LexBoundary::Inclusive(b"abc".to_vec()));
        assert_eq!(parse_lex_boundary(b"(abc").unwrap(), LexBoundary::Exclusive(b"abc".to_vec()));
    }
}
