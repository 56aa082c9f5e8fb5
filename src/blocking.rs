//! Blocking-op Argument Resolver (spec §4.H): `BLPOP`/`BRPOP`/`BZPOPMIN`/
//! `BZPOPMAX` all take one or more keys plus a timeout, but callers in the
//! wild pass the timeout either first or last. This module figures out
//! which element is the timeout instead of assuming a fixed position.

use crate::error::{Error, Result};

/// A resolved blocking-command argument list: the keys to block on, in the
/// order given, and the timeout in seconds (`0` means block forever, per
/// Redis convention).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBlockingArgs {
    pub keys: Vec<Vec<u8>>,
    pub timeout_seconds: f64,
}

fn parse_timeout(candidate: &[u8]) -> Option<f64> {
    let text = std::str::from_utf8(candidate).ok()?;
    let value: f64 = text.parse().ok()?;
    (value >= 0.0).then_some(value)
}

/// Resolve `args` into keys + timeout. Tries the timeout-last form first
/// (the native Redis argument order, and the one ioredis documents), then
/// falls back to timeout-first for callers that pass it that way. Returns
/// an error if neither end parses as a non-negative number, or if fewer
/// than two arguments were given (at least one key plus the timeout).
pub fn resolve_blocking_args(args: &[Vec<u8>]) -> Result<ResolvedBlockingArgs> {
    if args.len() < 2 {
        return Err(Error::Argument(
            "blocking command requires at least one key and a timeout".into(),
        ));
    }

    if let Some(timeout_seconds) = parse_timeout(args.last().unwrap()) {
        return Ok(ResolvedBlockingArgs { keys: args[..args.len() - 1].to_vec(), timeout_seconds });
    }

    if let Some(timeout_seconds) = parse_timeout(&args[0]) {
        return Ok(ResolvedBlockingArgs { keys: args[1..].to_vec(), timeout_seconds });
    }

    Err(Error::Argument("could not find a numeric timeout argument".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_timeout_last() {
        let args = vec![b"key1".to_vec(), b"key2".to_vec(), b"5".to_vec()];
        let resolved = resolve_blocking_args(&args).unwrap();
        assert_eq!(resolved.keys, vec![b"key1".to_vec(), b"key2".to_vec()]);
        assert_eq!(resolved.timeout_seconds, 5.0);
    }

    #[test]
    fn resolves_timeout_first_when_last_is_not_numeric() {
        let args = vec![b"2.5".to_vec(), b"key1".to_vec(), b"key2".to_vec()];
        let resolved = resolve_blocking_args(&args).unwrap();
        assert_eq!(resolved.keys, vec![b"key1".to_vec(), b"key2".to_vec()]);
        assert_eq!(resolved.timeout_seconds, 2.5);
    }

    #[test]
    fn rejects_args_with_no_numeric_end() {
        let args = vec![b"key1".to_vec(), b"key2".to_vec()];
        assert!(resolve_blocking_args(&args).is_err());
    }

    #[test]
    fn rejects_too_few_arguments() {
        let args = vec![b"5".to_vec()];
        assert!(resolve_blocking_args(&args).is_err());
    }
}
