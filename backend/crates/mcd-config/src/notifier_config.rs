use crate::{ConfigError, ConfigErrorResult, DEFAULT_NOTIFIER_TIMEOUT_SECS};

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Discord webhook receiving lifecycle events; log-only when unset
    pub discord_webhook_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            discord_webhook_url: None,
            timeout_secs: DEFAULT_NOTIFIER_TIMEOUT_SECS,
        }
    }
}

impl NotifierConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if let Some(ref url) = self.discord_webhook_url
            && !url.starts_with("http")
        {
            return Err(ConfigError::notifier(
                "notifier.discord_webhook_url must be an http(s) URL",
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::notifier(
                "notifier.timeout_secs must be greater than 0",
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
