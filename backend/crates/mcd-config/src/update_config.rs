use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_DOWNLOAD_BASE_URL, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT, DEFAULT_VERSION_PAGE_URL,
    MIN_POLL_INTERVAL_SECS,
};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Page scraped for the current download link
    pub version_page_url: String,
    /// Archives are fetched from `<download_base_url>/bedrock-server-<version>.zip`
    pub download_base_url: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            version_page_url: String::from(DEFAULT_VERSION_PAGE_URL),
            download_base_url: String::from(DEFAULT_DOWNLOAD_BASE_URL),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: String::from(DEFAULT_USER_AGENT),
        }
    }
}

impl UpdateConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !self.version_page_url.starts_with("http") {
            return Err(ConfigError::update(format!(
                "update.version_page_url must be an http(s) URL, got '{}'",
                self.version_page_url
            )));
        }

        if !self.download_base_url.starts_with("http") {
            return Err(ConfigError::update(format!(
                "update.download_base_url must be an http(s) URL, got '{}'",
                self.download_base_url
            )));
        }

        if self.poll_interval_secs < MIN_POLL_INTERVAL_SECS {
            return Err(ConfigError::update(format!(
                "update.poll_interval_secs must be >= {}, got {}",
                MIN_POLL_INTERVAL_SECS, self.poll_interval_secs
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::update(
                "update.request_timeout_secs must be greater than 0",
            ));
        }

        Ok(())
    }
}
