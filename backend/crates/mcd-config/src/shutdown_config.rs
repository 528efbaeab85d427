use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_COUNTDOWN_NOTICES, DEFAULT_FINAL_NOTICE_DELAY_SECS,
    DEFAULT_NOTICE_INTERVAL_SECS, MAX_COUNTDOWN_NOTICES, MAX_NOTICE_INTERVAL_SECS,
};

use std::time::Duration;

use serde::Deserialize;

/// Timing of the notices written to the server before `stop`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    pub countdown_notices: u32,
    pub notice_interval_secs: u64,
    pub final_notice_delay_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            countdown_notices: DEFAULT_COUNTDOWN_NOTICES,
            notice_interval_secs: DEFAULT_NOTICE_INTERVAL_SECS,
            final_notice_delay_secs: DEFAULT_FINAL_NOTICE_DELAY_SECS,
        }
    }
}

impl ShutdownConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.countdown_notices > MAX_COUNTDOWN_NOTICES {
            return Err(ConfigError::shutdown(format!(
                "shutdown.countdown_notices must be <= {}, got {}",
                MAX_COUNTDOWN_NOTICES, self.countdown_notices
            )));
        }

        if self.notice_interval_secs > MAX_NOTICE_INTERVAL_SECS {
            return Err(ConfigError::shutdown(format!(
                "shutdown.notice_interval_secs must be <= {}, got {}",
                MAX_NOTICE_INTERVAL_SECS, self.notice_interval_secs
            )));
        }

        Ok(())
    }

    pub fn notice_interval(&self) -> Duration {
        Duration::from_secs(self.notice_interval_secs)
    }

    pub fn final_notice_delay(&self) -> Duration {
        Duration::from_secs(self.final_notice_delay_secs)
    }

    /// Seconds announced by the first countdown notice.
    pub fn countdown_secs(&self) -> u64 {
        u64::from(self.countdown_notices) * self.notice_interval_secs
    }
}
