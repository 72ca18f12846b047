//! Activity-window bounds and timestamp parsing
//!
//! Mover and weatherer activity windows accept the literal strings
//! `"-inf"` and `"inf"` as unbounded sentinels alongside ISO-8601
//! timestamps.

use chrono::NaiveDateTime;

/// One end of an activity window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeBound {
    UnboundedPast,
    UnboundedFuture,
    At(NaiveDateTime),
}

impl TimeBound {
    /// Parse the wire form; `None` when the input is neither a sentinel nor
    /// a valid timestamp.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "-inf" => Some(Self::UnboundedPast),
            "inf" => Some(Self::UnboundedFuture),
            _ => parse_timestamp(s).map(Self::At),
        }
    }
}

impl std::fmt::Display for TimeBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnboundedPast => write!(f, "-inf"),
            Self::UnboundedFuture => write!(f, "inf"),
            Self::At(t) => write!(f, "{}", t.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

/// Parse an ISO-8601 timestamp, with or without fractional seconds.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}
