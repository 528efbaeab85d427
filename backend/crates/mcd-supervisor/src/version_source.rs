//! Discovery of the latest published server version.

use crate::{ServerVersion, SupervisorError, SupervisorResult};

use mcd_config::UpdateConfig;

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use regex::Regex;

static DOWNLOAD_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https://minecraft\.azureedge\.net/bin-linux/[^"]*"#).unwrap());

static ARCHIVE_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"bedrock-server-(.+)\.zip").unwrap());

/// Answers "what is the current remote version?".
#[async_trait]
pub trait VersionSource: Send + Sync {
    async fn fetch_remote_version(&self) -> SupervisorResult<ServerVersion>;
}

/// Scrapes the Bedrock download page for the Linux archive link.
pub struct BedrockVersionSource {
    client: reqwest::Client,
    page_url: String,
}

impl BedrockVersionSource {
    pub fn new(config: &UpdateConfig) -> SupervisorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SupervisorError::network(&config.version_page_url, e))?;

        Ok(Self {
            client,
            page_url: config.version_page_url.clone(),
        })
    }

    /// Pull the version out of the first Linux archive link on the page.
    pub fn extract_version(body: &str) -> SupervisorResult<ServerVersion> {
        let url = DOWNLOAD_URL
            .find(body)
            .ok_or_else(|| SupervisorError::parse("no Linux download link on the page"))?
            .as_str();

        debug!("Found download link {url}");

        let captured = ARCHIVE_VERSION
            .captures(url)
            .and_then(|c| c.get(1))
            .ok_or_else(|| {
                SupervisorError::parse(format!("download link '{url}' has no version"))
            })?;

        ServerVersion::parse(captured.as_str())
    }
}

#[async_trait]
impl VersionSource for BedrockVersionSource {
    async fn fetch_remote_version(&self) -> SupervisorResult<ServerVersion> {
        info!("Gathering latest minecraft version");

        let response = self
            .client
            .get(&self.page_url)
            .send()
            .await
            .map_err(|e| SupervisorError::network(&self.page_url, e))?;

        if !response.status().is_success() {
            return Err(SupervisorError::network_status(
                &self.page_url,
                response.status().as_u16(),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SupervisorError::network(&self.page_url, e))?;

        let version = Self::extract_version(&body)?;
        info!("Available: {version}");

        Ok(version)
    }
}
