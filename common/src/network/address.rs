//! # Host Address Model
//!
//! Defines the identifier a caller uses to name a naming-service host.
//!
//! Accepted forms:
//! * A bare host name or IPv4 address (e.g., `svc1`, `10.0.0.7`).
//! * A host with port (e.g., `svc1:10000`).
//! * A bracketed IPv6 literal, optionally with port (e.g., `[::1]:10000`).
//!
//! The identifier is validated by reading it as the authority of a
//! `tango://` URL, so anything a URL authority would refuse (spaces, stray
//! delimiters, bad ports) is refused here too.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::HostAddrError;

/// Port assumed when the identifier does not carry one.
pub const DEFAULT_PORT: u16 = 10000;

const SCHEME: &str = "tango";

/// A validated `host[:port]` identifier.
///
/// The original text is kept verbatim: it is what callers see as the host id
/// and what device identifiers are prefixed with.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HostAddr {
    raw: String,
    host: String,
    port: u16,
}

impl HostAddr {
    /// The identifier exactly as supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port`, with the default port filled in when it was omitted.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for HostAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for HostAddr {
    type Err = HostAddrError;

    /// Parses a string into a `HostAddr`.
    ///
    /// Whitespace anywhere in the input is rejected up front, since the URL
    /// parser would otherwise trim it silently from the ends.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(HostAddrError::Empty);
        }

        if s.chars().any(char::is_whitespace) {
            return Err(HostAddrError::Syntax {
                input: s.to_string(),
                reason: "contains whitespace".to_string(),
            });
        }

        let url = Url::parse(&format!("{SCHEME}://{s}")).map_err(|e| HostAddrError::Syntax {
            input: s.to_string(),
            reason: e.to_string(),
        })?;

        reject_extra_parts(s, &url)?;

        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| HostAddrError::MissingHost { input: s.to_string() })?;

        Ok(Self {
            raw: s.to_string(),
            host: host.to_string(),
            port: url.port().unwrap_or(DEFAULT_PORT),
        })
    }
}

/// Only an authority is allowed: no credentials, path, query or fragment.
fn reject_extra_parts(input: &str, url: &Url) -> Result<(), HostAddrError> {
    let unexpected = |part| HostAddrError::Unexpected {
        input: input.to_string(),
        part,
    };

    if !url.username().is_empty() || url.password().is_some() {
        return Err(unexpected("user info"));
    }
    if !url.path().is_empty() && url.path() != "/" {
        return Err(unexpected("path"));
    }
    if input.ends_with('/') {
        return Err(unexpected("path"));
    }
    if url.query().is_some() {
        return Err(unexpected("query"));
    }
    if url.fragment().is_some() {
        return Err(unexpected("fragment"));
    }
    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
