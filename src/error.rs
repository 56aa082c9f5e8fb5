use std::fmt::{Display, Formatter};

/// Kind of error returned by the Redis/Valkey server, parsed from the leading
/// token of the error line (`-ERR …`, `-WRONGTYPE …`, `-MOVED 1234 host:port`, …).
///
/// Kept as an open-ended enum (not `#[non_exhaustive]` matching since callers are
/// expected to match on [`RedisError::to_string`] substrings per the forwarding
/// policy in spec §7) so unknown kinds still round-trip through [`RedisErrorKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedisErrorKind {
    Ask { hash_slot: u16, address: (String, u16) },
    Moved { hash_slot: u16, address: (String, u16) },
    BusyGroup,
    ClusterDown,
    CrossSlot,
    Err,
    ExecAbort,
    IoErr,
    MasterDown,
    MisConf,
    NoAuth,
    NoScript,
    NoPerm,
    NoProto,
    OutOfMemory,
    Readonly,
    TryAgain,
    Unblocked,
    WrongPass,
    WrongType,
    Other(String),
}

impl From<&str> for RedisErrorKind {
    fn from(token: &str) -> Self {
        match token {
            "BUSYGROUP" => Self::BusyGroup,
            "CLUSTERDOWN" => Self::ClusterDown,
            "CROSSSLOT" => Self::CrossSlot,
            "ERR" => Self::Err,
            "EXECABORT" => Self::ExecAbort,
            "IOERR" => Self::IoErr,
            "MASTERDOWN" => Self::MasterDown,
            "MISCONF" => Self::MisConf,
            "NOAUTH" => Self::NoAuth,
            "NOSCRIPT" => Self::NoScript,
            "NOPERM" => Self::NoPerm,
            "NOPROTO" => Self::NoProto,
            "OOM" => Self::OutOfMemory,
            "READONLY" => Self::Readonly,
            "TRYAGAIN" => Self::TryAgain,
            "UNBLOCKED" => Self::Unblocked,
            "WRONGPASS" => Self::WrongPass,
            "WRONGTYPE" => Self::WrongType,
            _ => {
                let mut parts = token.split_whitespace();
                match (parts.next(), parts.next(), parts.next(), parts.next()) {
                    (Some("ASK"), Some(slot), Some(addr), None) => parse_redirect(slot, addr)
                        .map(|(hash_slot, address)| Self::Ask { hash_slot, address })
                        .unwrap_or_else(|| Self::Other(token.to_owned())),
                    (Some("MOVED"), Some(slot), Some(addr), None) => parse_redirect(slot, addr)
                        .map(|(hash_slot, address)| Self::Moved { hash_slot, address })
                        .unwrap_or_else(|| Self::Other(token.to_owned())),
                    _ => Self::Other(token.to_owned()),
                }
            }
        }
    }
}

fn parse_redirect(slot: &str, addr: &str) -> Option<(u16, (String, u16))> {
    let hash_slot = slot.parse::<u16>().ok()?;
    let (host, port) = addr.rsplit_once(':')?;
    let port = port.parse::<u16>().ok()?;
    Some((hash_slot, (host.to_owned(), port)))
}

impl Display for RedisErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ask { hash_slot, address: (host, port) } => {
                write!(f, "ASK {hash_slot} {host}:{port}")
            }
            Self::Moved { hash_slot, address: (host, port) } => {
                write!(f, "MOVED {hash_slot} {host}:{port}")
            }
            Self::BusyGroup => f.write_str("BUSYGROUP"),
            Self::ClusterDown => f.write_str("CLUSTERDOWN"),
            Self::CrossSlot => f.write_str("CROSSSLOT"),
            Self::Err => f.write_str("ERR"),
            Self::ExecAbort => f.write_str("EXECABORT"),
            Self::IoErr => f.write_str("IOERR"),
            Self::MasterDown => f.write_str("MASTERDOWN"),
            Self::MisConf => f.write_str("MISCONF"),
            Self::NoAuth => f.write_str("NOAUTH"),
            Self::NoScript => f.write_str("NOSCRIPT"),
            Self::NoPerm => f.write_str("NOPERM"),
            Self::NoProto => f.write_str("NOPROTO"),
            Self::OutOfMemory => f.write_str("OOM"),
            Self::Readonly => f.write_str("READONLY"),
            Self::TryAgain => f.write_str("TRYAGAIN"),
            Self::Unblocked => f.write_str("UNBLOCKED"),
            Self::WrongPass => f.write_str("WRONGPASS"),
            Self::WrongType => f.write_str("WRONGTYPE"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// Error reported by the server, preserved with its original text so callers
/// can pattern-match on substrings like `NOSCRIPT` or `MOVED` (spec §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisError {
    pub kind: RedisErrorKind,
    pub description: String,
}

impl From<&str> for RedisError {
    fn from(line: &str) -> Self {
        match line.split_once(' ') {
            Some(("ASK" | "MOVED", _)) => Self { kind: line.into(), description: String::new() },
            Some((kind, description)) => {
                Self { kind: kind.into(), description: description.to_owned() }
            }
            None => Self { kind: line.into(), description: String::new() },
        }
    }
}

impl Display for RedisError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.description.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} {}", self.kind, self.description)
        }
    }
}

impl From<redis::RedisError> for RedisError {
    fn from(e: redis::RedisError) -> Self {
        match e.code() {
            Some(_) => {
                let detail = e.detail().unwrap_or_default();
                let full = if let Some(code) = e.code() {
                    format!("{code} {detail}")
                } else {
                    detail.to_owned()
                };
                RedisError::from(full.as_str())
            }
            None => RedisError { kind: RedisErrorKind::Err, description: e.to_string() },
        }
    }
}

/// Library-wide error type.
///
/// Argument-validation errors are raised synchronously at the call site;
/// connect/IO/timeout/shutdown errors are raised asynchronously; server errors
/// forward the original text verbatim inside [`RedisError`] (spec §7).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed arguments caught before anything is sent to the driver
    /// (wrong number of args, odd-length hash pairs, unparsable score boundary, …).
    #[error("argument error: {0}")]
    Argument(String),
    /// Failed to build a [`Config`](crate::config::ClientOptions) from a URL or address.
    #[error("config error: {0}")]
    Config(String),
    /// Error returned by the Redis/Valkey server.
    #[error("{0}")]
    Redis(RedisError),
    /// I/O failure talking to the driver.
    #[error("io error: {0}")]
    Io(String),
    /// A command or connection attempt exceeded its configured timeout.
    #[error("timeout")]
    Timeout,
    /// The client is mid-teardown; no further commands can be issued.
    #[error("client is shutting down")]
    Shutdown,
    /// A sharded pub/sub call was issued against a non-cluster client.
    #[error("Sharded pub/sub is not supported in standalone mode")]
    ClusterModeRequired,
    /// A transaction was aborted (WATCH conflict or explicit DISCARD observed by the server).
    #[error("transaction aborted")]
    Aborted,
    /// Internal channel/oneshot plumbing broke because the other end was dropped.
    #[error("internal channel closed: {0}")]
    Channel(String),
}

impl Error {
    /// True when the server text begins with `NOSCRIPT`, the signal that a cached
    /// `evalsha` call should fall back to `eval` (spec §4.F, §7).
    pub fn is_noscript(&self) -> bool {
        matches!(self, Error::Redis(e) if e.kind == RedisErrorKind::NoScript)
    }

    pub fn is_wrong_type(&self) -> bool {
        matches!(self, Error::Redis(e) if e.kind == RedisErrorKind::WrongType)
    }
}

impl From<redis::RedisError> for Error {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error() {
            Error::Io(e.to_string())
        } else if e.is_timeout() {
            Error::Timeout
        } else {
            Error::Redis(e.into())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::Config(e.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for Error {
    fn from(e: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Error::Channel(e.to_string())
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for Error {
    fn from(e: tokio::sync::oneshot::error::RecvError) -> Self {
        Error::Channel(e.to_string())
    }
}

/// Library-wide result type.
pub type Result<T> = std::result::Result<T, Error>;
