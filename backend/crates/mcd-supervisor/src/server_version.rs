use crate::{SupervisorError, SupervisorResult};

use std::fmt;

/// Opaque version tag of a Bedrock server build, e.g. `1.10.0.7`.
///
/// Only equality is meaningful; there is no ordering between versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerVersion(String);

impl ServerVersion {
    /// Accepts a non-empty run of `[0-9A-Za-z._-]` after trimming whitespace.
    pub fn parse(raw: &str) -> SupervisorResult<Self> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(SupervisorError::parse("version string is empty"));
        }

        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        {
            return Err(SupervisorError::parse(format!(
                "version '{trimmed}' contains unexpected character {bad:?}"
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An update is available whenever the remote tag differs from the installed
/// one, downgrades included.
pub fn needs_update(installed: &ServerVersion, remote: &ServerVersion) -> bool {
    installed != remote
}
