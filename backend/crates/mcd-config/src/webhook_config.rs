use crate::{ConfigError, ConfigErrorResult, DEFAULT_WEBHOOK_HOST, DEFAULT_WEBHOOK_PORT};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: String::from(DEFAULT_WEBHOOK_HOST),
            port: DEFAULT_WEBHOOK_PORT,
        }
    }
}

impl WebhookConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !self.enabled {
            return Ok(());
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::webhook("webhook.host cannot be empty"));
        }

        if self.port == 0 {
            return Err(ConfigError::webhook(
                "webhook.port must be non-zero when webhooks are enabled",
            ));
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
