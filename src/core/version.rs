//! DAC version model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version of a compiled schema model (`major.minor[.build[.revision]]`)
///
/// Ordering is component-wise; an unset build or revision sorts before any set value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DacVersion {
    pub major: u32,
    pub minor: u32,
    pub build: Option<u32>,
    pub revision: Option<u32>,
}

impl DacVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            build: None,
            revision: None,
        }
    }

    pub fn with_build(mut self, build: u32) -> Self {
        self.build = Some(build);
        self
    }

    pub fn with_revision(mut self, revision: u32) -> Self {
        self.revision = Some(revision);
        self
    }
}

impl fmt::Display for DacVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{}", build)?;
            if let Some(revision) = self.revision {
                write!(f, ".{}", revision)?;
            }
        }
        Ok(())
    }
}

/// Error returned when a version string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid DAC version '{0}': expected major.minor[.build[.revision]]")]
pub struct ParseVersionError(String);

impl FromStr for DacVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .trim()
            .split('.')
            .map(|p| p.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseVersionError(s.to_string()))?;

        match parts.as_slice() {
            [major, minor] => Ok(DacVersion::new(*major, *minor)),
            [major, minor, build] => Ok(DacVersion::new(*major, *minor).with_build(*build)),
            [major, minor, build, revision] => Ok(DacVersion::new(*major, *minor)
                .with_build(*build)
                .with_revision(*revision)),
            _ => Err(ParseVersionError(s.to_string())),
        }
    }
}
