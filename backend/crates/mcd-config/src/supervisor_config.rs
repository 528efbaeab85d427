use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_COMMAND_BUFFER, DEFAULT_LIVENESS_INTERVAL_MS,
    MAX_LIVENESS_INTERVAL_MS, MIN_LIVENESS_INTERVAL_MS,
};

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// How often the liveness waiter checks for a finished shutdown
    pub liveness_interval_ms: u64,
    /// Capacity of the supervisor command channel
    pub command_buffer: usize,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            liveness_interval_ms: DEFAULT_LIVENESS_INTERVAL_MS,
            command_buffer: DEFAULT_COMMAND_BUFFER,
        }
    }
}

impl SupervisorConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !(MIN_LIVENESS_INTERVAL_MS..=MAX_LIVENESS_INTERVAL_MS)
            .contains(&self.liveness_interval_ms)
        {
            return Err(ConfigError::supervisor(format!(
                "supervisor.liveness_interval_ms must be {}-{}, got {}",
                MIN_LIVENESS_INTERVAL_MS, MAX_LIVENESS_INTERVAL_MS, self.liveness_interval_ms
            )));
        }

        if self.command_buffer == 0 {
            return Err(ConfigError::supervisor(
                "supervisor.command_buffer must be greater than 0",
            ));
        }

        Ok(())
    }

    pub fn liveness_interval(&self) -> Duration {
        Duration::from_millis(self.liveness_interval_ms)
    }
}
