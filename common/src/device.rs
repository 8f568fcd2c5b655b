use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::DevicePathError;

pub const SEPARATOR: char = '/';

/// A fully qualified device name: `domain/family/member`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct DevicePath {
    pub domain: String,
    pub family: String,
    pub member: String,
}

impl DevicePath {
    pub fn new(
        domain: impl Into<String>,
        family: impl Into<String>,
        member: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            family: family.into(),
            member: member.into(),
        }
    }

    /// `host/domain/family/member`
    pub fn device_id(&self, host: &str) -> String {
        format!("{host}{SEPARATOR}{self}")
    }
}

impl fmt::Display for DevicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.domain, self.family, self.member
        )
    }
}

impl FromStr for DevicePath {
    type Err = DevicePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || DevicePathError::Malformed { input: s.to_string() };

        let segments: Vec<&str> = s.split(SEPARATOR).collect();
        let [domain, family, member] = segments.as_slice() else {
            return Err(malformed());
        };
        if [domain, family, member].iter().any(|segment| segment.is_empty()) {
            return Err(malformed());
        }

        Ok(Self::new(*domain, *family, *member))
    }
}

impl TryFrom<String> for DevicePath {
    type Error = DevicePathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
