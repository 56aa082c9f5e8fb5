//! Sorted set commands (`ZADD`/`ZRANGEBYSCORE`/`BZPOPMIN`/...).

use crate::blocking::resolve_blocking_args;
use crate::client::Client;
use crate::translate::{self, LexBoundary};
use crate::value;
use crate::Future;

/// Result of a blocking sorted-set pop: which key it came from, the
/// member, and its score.
#[derive(Debug, Clone)]
pub struct BlockingZPopResult {
    pub key: String,
    pub member: String,
    pub score: f64,
}

/// `LIMIT offset count` for the `BYSCORE`/`BYLEX` range commands. Only valid
/// alongside an explicit min/max range, never with plain index ranges.
#[derive(Debug, Clone, Copy)]
pub struct RangeLimit {
    pub offset: i64,
    pub count: i64,
}

/// Options shared by `ZRANGEBYSCORE`/`ZREVRANGEBYSCORE` (spec §4.D): whether
/// to include scores in the reply and an optional `LIMIT`, acceptable in any
/// order on the wire the way ioredis itself builds the argument list.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreRangeOptions {
    pub withscores: bool,
    pub limit: Option<RangeLimit>,
}

pub trait SortedSetCommands {
    fn zadd<'a>(&'a self, key: impl Into<Vec<u8>>, members: Vec<(f64, Vec<u8>)>) -> Future<'a, i64>;
    fn zscore<'a>(&'a self, key: impl Into<Vec<u8>>, member: impl Into<Vec<u8>>) -> Future<'a, Option<f64>>;
    fn zrange<'a>(&'a self, key: impl Into<Vec<u8>>, start: i64, stop: i64) -> Future<'a, Vec<String>>;
    /// `ZRANGE key start stop WITHSCORES`, returning the element/score pairs
    /// already paired up instead of the flat `[el, score, el, score, …]` wire
    /// shape (spec §4.D "ZRANGE with WITHSCORES").
    fn zrange_with_scores<'a>(
        &'a self,
        key: impl Into<Vec<u8>>,
        start: i64,
        stop: i64,
    ) -> Future<'a, Vec<(String, f64)>>;
    fn zrangebyscore<'a>(&'a self, key: impl Into<Vec<u8>>, min: &'a str, max: &'a str) -> Future<'a, Vec<String>>;
    /// `ZRANGEBYSCORE` with an optional `LIMIT`/`WITHSCORES`. Returns the flat
    /// wire shape (`[el, score, el, score, …]` when `withscores` is set)
    /// rather than pairing it up, matching ioredis's own flat array reply.
    fn zrangebyscore_with_options<'a>(
        &'a self,
        key: impl Into<Vec<u8>>,
        min: &'a str,
        max: &'a str,
        options: ScoreRangeOptions,
    ) -> Future<'a, Vec<String>>;
    /// `ZREVRANGEBYSCORE key max min`. The driver's own reverse ordering for
    /// score ranges is unreliable (spec §4.D), so this issues the ascending
    /// `ZRANGEBYSCORE min max` form and reverses the reply in Rust instead of
    /// trusting `ZREVRANGEBYSCORE` on the wire.
    fn zrevrangebyscore<'a>(
        &'a self,
        key: impl Into<Vec<u8>>,
        max: &'a str,
        min: &'a str,
        options: ScoreRangeOptions,
    ) -> Future<'a, Vec<String>>;
    fn zrangebylex<'a>(&'a self, key: impl Into<Vec<u8>>, min: Vec<u8>, max: Vec<u8>) -> Future<'a, Vec<String>>;
    fn zrem<'a>(&'a self, key: impl Into<Vec<u8>>, members: Vec<Vec<u8>>) -> Future<'a, i64>;
    fn zcard<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64>;
    fn zincrby<'a>(&'a self, key: impl Into<Vec<u8>>, delta: f64, member: impl Into<Vec<u8>>) -> Future<'a, f64>;
    fn zrank<'a>(&'a self, key: impl Into<Vec<u8>>, member: impl Into<Vec<u8>>) -> Future<'a, Option<i64>>;
    fn bzpopmin<'a>(&'a self, args: Vec<Vec<u8>>) -> Future<'a, Option<BlockingZPopResult>>;
    fn bzpopmax<'a>(&'a self, args: Vec<Vec<u8>>) -> Future<'a, Option<BlockingZPopResult>>;
}

impl SortedSetCommands for Client {
    fn zadd<'a>(&'a self, key: impl Into<Vec<u8>>, members: Vec<(f64, Vec<u8>)>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let mut args = vec![b"ZADD".to_vec(), key];
            for (score, member) in members {
                args.push(value::format_score(score).into_bytes());
                args.push(member);
            }
            value::from_value(self.call(args).await?)
        })
    }

    fn zscore<'a>(&'a self, key: impl Into<Vec<u8>>, member: impl Into<Vec<u8>>) -> Future<'a, Option<f64>> {
        let key = key.into();
        let member = member.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let result = self.call(vec![b"ZSCORE".to_vec(), key, member]).await?;
            match result {
                crate::value::Value::Nil => Ok(None),
                other => {
                    let text = value::to_utf8_string(&other)?;
                    Ok(Some(text.parse().map_err(|_| {
                        crate::error::Error::Argument("malformed score returned by server".into())
                    })?))
                }
            }
        })
    }

    fn zrange<'a>(&'a self, key: impl Into<Vec<u8>>, start: i64, stop: i64) -> Future<'a, Vec<String>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let args = vec![b"ZRANGE".to_vec(), key, start.to_string().into_bytes(), stop.to_string().into_bytes()];
            value::from_value(self.call(args).await?)
        })
    }

    fn zrange_with_scores<'a>(
        &'a self,
        key: impl Into<Vec<u8>>,
        start: i64,
        stop: i64,
    ) -> Future<'a, Vec<(String, f64)>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let args = vec![
                b"ZRANGE".to_vec(),
                key,
                start.to_string().into_bytes(),
                stop.to_string().into_bytes(),
                b"WITHSCORES".to_vec(),
            ];
            let flat: Vec<String> = value::from_value(self.call(args).await?)?;
            pair_up_with_scores(flat)
        })
    }

    fn zrangebyscore<'a>(&'a self, key: impl Into<Vec<u8>>, min: &'a str, max: &'a str) -> Future<'a, Vec<String>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let min_bound = translate::parse_score_boundary(min)?;
            let max_bound = translate::parse_score_boundary(max)?;
            let args = vec![
                b"ZRANGEBYSCORE".to_vec(),
                key,
                min_bound.to_arg().into_bytes(),
                max_bound.to_arg().into_bytes(),
            ];
            value::from_value(self.call(args).await?)
        })
    }

    fn zrangebyscore_with_options<'a>(
        &'a self,
        key: impl Into<Vec<u8>>,
        min: &'a str,
        max: &'a str,
        options: ScoreRangeOptions,
    ) -> Future<'a, Vec<String>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let args = build_byscore_args(b"ZRANGEBYSCORE", key, min, max, options)?;
            value::from_value(self.call(args).await?)
        })
    }

    fn zrevrangebyscore<'a>(
        &'a self,
        key: impl Into<Vec<u8>>,
        max: &'a str,
        min: &'a str,
        options: ScoreRangeOptions,
    ) -> Future<'a, Vec<String>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let args = build_byscore_args(b"ZRANGEBYSCORE", key, min, max, options)?;
            let mut result: Vec<String> = value::from_value(self.call(args).await?)?;
            if options.withscores {
                // Reverse by pair, not by element, so each member stays next to its score.
                let mut pairs: Vec<[String; 2]> = result
                    .chunks_exact(2)
                    .map(|pair| [pair[0].clone(), pair[1].clone()])
                    .collect();
                pairs.reverse();
                result = pairs.into_iter().flatten().collect();
            } else {
                result.reverse();
            }
            Ok(result)
        })
    }

    fn zrangebylex<'a>(&'a self, key: impl Into<Vec<u8>>, min: Vec<u8>, max: Vec<u8>) -> Future<'a, Vec<String>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let min_bound = translate::parse_lex_boundary(&min)?;
            let max_bound = translate::parse_lex_boundary(&max)?;
            let args = vec![b"ZRANGEBYLEX".to_vec(), key, lex_arg(&min_bound), lex_arg(&max_bound)];
            value::from_value(self.call(args).await?)
        })
    }

    fn zrem<'a>(&'a self, key: impl Into<Vec<u8>>, members: Vec<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let mut args = vec![b"ZREM".to_vec(), key];
            args.extend(members);
            value::from_value(self.call(args).await?)
        })
    }

    fn zcard<'a>(&'a self, key: impl Into<Vec<u8>>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            value::from_value(self.call(vec![b"ZCARD".to_vec(), key]).await?)
        })
    }

    fn zincrby<'a>(&'a self, key: impl Into<Vec<u8>>, delta: f64, member: impl Into<Vec<u8>>) -> Future<'a, f64> {
        let key = key.into();
        let member = member.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let args = vec![b"ZINCRBY".to_vec(), key, value::format_score(delta).into_bytes(), member];
            let result = self.call(args).await?;
            let text = value::to_utf8_string(&result)?;
            text.parse().map_err(|_| crate::error::Error::Argument("malformed score returned by server".into()))
        })
    }

    fn zrank<'a>(&'a self, key: impl Into<Vec<u8>>, member: impl Into<Vec<u8>>) -> Future<'a, Option<i64>> {
        let key = key.into();
        let member = member.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            value::from_value(self.call(vec![b"ZRANK".to_vec(), key, member]).await?)
        })
    }

    fn bzpopmin<'a>(&'a self, args: Vec<Vec<u8>>) -> Future<'a, Option<BlockingZPopResult>> {
        Box::pin(async move { blocking_zpop(self, "BZPOPMIN", args).await })
    }

    fn bzpopmax<'a>(&'a self, args: Vec<Vec<u8>>) -> Future<'a, Option<BlockingZPopResult>> {
        Box::pin(async move { blocking_zpop(self, "BZPOPMAX", args).await })
    }
}

fn lex_arg(bound: &LexBoundary) -> Vec<u8> {
    bound.to_arg()
}

/// Builds a `ZRANGEBYSCORE key min max [LIMIT offset count] [WITHSCORES]`
/// argument list. `WITHSCORES` and `LIMIT` are accepted in any order by the
/// server, but this crate always emits `LIMIT` first to keep the wire form
/// deterministic for tests.
fn build_byscore_args(
    command: &'static [u8],
    key: Vec<u8>,
    min: &str,
    max: &str,
    options: ScoreRangeOptions,
) -> crate::error::Result<Vec<Vec<u8>>> {
    let min_bound = translate::parse_score_boundary(min)?;
    let max_bound = translate::parse_score_boundary(max)?;
    let mut args = vec![command.to_vec(), key, min_bound.to_arg().into_bytes(), max_bound.to_arg().into_bytes()];
    if let Some(limit) = options.limit {
        args.push(b"LIMIT".to_vec());
        args.push(limit.offset.to_string().into_bytes());
        args.push(limit.count.to_string().into_bytes());
    }
    if options.withscores {
        args.push(b"WITHSCORES".to_vec());
    }
    Ok(args)
}

/// Pairs up the flat `[el, score, el, score, …]` wire shape `WITHSCORES`
/// returns into `(element, score)` tuples.
fn pair_up_with_scores(flat: Vec<String>) -> crate::error::Result<Vec<(String, f64)>> {
    if flat.len() % 2 != 0 {
        return Err(crate::error::Error::Argument("malformed WITHSCORES reply: odd number of fields".into()));
    }
    flat.chunks_exact(2)
        .map(|pair| {
            let score = pair[1]
                .parse()
                .map_err(|_| crate::error::Error::Argument("malformed score returned by server".into()))?;
            Ok((pair[0].clone(), score))
        })
        .collect()
}

async fn blocking_zpop(
    client: &Client,
    command: &'static str,
    args: Vec<Vec<u8>>,
) -> crate::error::Result<Option<BlockingZPopResult>> {
    let resolved = resolve_blocking_args(&args)?;
    let mut command_args = vec![command.as_bytes().to_vec()];
    for key in &resolved.keys {
        command_args.push(client.prefixed_key(key.clone())?);
    }
    command_args.push(value::format_score(resolved.timeout_seconds).into_bytes());

    let result = client.call(command_args).await?;
    match result {
        crate::value::Value::Nil => Ok(None),
        other => {
            let (key, member, score_text): (String, String, String) = value::from_value(other)?;
            let score = score_text
                .parse()
                .map_err(|_| crate::error::Error::Argument("malformed score returned by server".into()))?;
            Ok(Some(BlockingZPopResult { key, member, score }))
        }
    }
}
