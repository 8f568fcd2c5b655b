use std::time::Duration;

use thiserror::Error;

/// Failures reported by a naming-service handle or connector.
///
/// Every variant is recoverable from the point of view of a tree build: the
/// caller drops the host, pattern or alias concerned and carries on.
#[derive(Debug, Error)]
pub enum NamingError {
    #[error("cannot reach naming service at {host}: {reason}")]
    Connection { host: String, reason: String },

    #[error("query `{pattern}` failed: {reason}")]
    Query { pattern: String, reason: String },

    #[error("alias `{alias}` cannot be resolved: {reason}")]
    Alias { alias: String, reason: String },

    #[error("`{call}` timed out after {limit:?}")]
    Timeout { call: String, limit: Duration },
}

/// Rejections produced while parsing filter expressions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("filter `{expression}` must have exactly 3 `/`-separated segments, found {segments}")]
    Malformed { expression: String, segments: usize },

    #[error("filter segment `{segment}` cannot be compiled: {reason}")]
    Pattern { segment: String, reason: String },
}

/// Rejections produced while parsing a `host[:port]` identifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostAddrError {
    #[error("host identifier is empty")]
    Empty,

    #[error("`{input}` is not a valid host address: {reason}")]
    Syntax { input: String, reason: String },

    #[error("`{input}` has no host part")]
    MissingHost { input: String },

    #[error("`{input}` carries an unexpected {part}")]
    Unexpected { input: String, part: &'static str },
}

/// Rejections produced while parsing a `domain/family/member` path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DevicePathError {
    #[error("device `{input}` must have exactly 3 non-empty `/`-separated segments")]
    Malformed { input: String },
}
