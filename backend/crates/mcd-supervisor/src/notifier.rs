//! Out-of-band lifecycle notifications.
//!
//! Every method is best effort: implementations log their own failures and
//! never report them back to the supervisor.

use crate::ServerVersion;

use mcd_config::NotifierConfig;

use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};
use serde::Serialize;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn on_started(&self, version: &ServerVersion);
    async fn on_stopped(&self);
    async fn on_health_checked(&self, ok: bool);
}

/// Used when no external service is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn on_started(&self, version: &ServerVersion) {
        info!("Notifier: server started ({version})");
    }

    async fn on_stopped(&self) {
        info!("Notifier: server stopped");
    }

    async fn on_health_checked(&self, ok: bool) {
        info!(
            "Notifier: health check {}",
            if ok { "passed" } else { "failed" }
        );
    }
}

#[derive(Debug, Serialize)]
struct DiscordMessage {
    content: String,
    embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    color: u32,
    timestamp: String,
}

const COLOR_GREEN: u32 = 0x2E_CC_71;
const COLOR_RED: u32 = 0xE7_4C_3C;
const COLOR_GREY: u32 = 0x95_A5_A6;

/// Posts lifecycle events to a Discord channel webhook.
pub struct DiscordNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: impl Into<String>, config: &NotifierConfig) -> Option<Self> {
        let client = match reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                warn!("Discord notifier disabled, HTTP client unavailable: {e}");
                return None;
            }
        };

        Some(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }

    async fn post(&self, title: &str, description: String, color: u32) {
        let message = DiscordMessage {
            content: String::new(),
            embeds: vec![DiscordEmbed {
                title: title.to_string(),
                description,
                color,
                timestamp: chrono::Utc::now().to_rfc3339(),
            }],
        };

        match self.client.post(&self.webhook_url).json(&message).send().await {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => warn!("Discord notification '{title}' returned HTTP {}", resp.status()),
            Err(e) => warn!("Failed to send Discord notification '{title}': {e}"),
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn on_started(&self, version: &ServerVersion) {
        self.post(
            "Server started",
            format!("Minecraft Bedrock server {version} is online"),
            COLOR_GREEN,
        )
        .await;
    }

    async fn on_stopped(&self) {
        self.post(
            "Server stopped",
            String::from("Minecraft Bedrock server is offline"),
            COLOR_RED,
        )
        .await;
    }

    async fn on_health_checked(&self, ok: bool) {
        let (description, color) = if ok {
            ("Server is healthy", COLOR_GREY)
        } else {
            ("Server is not running", COLOR_RED)
        };
        self.post("Health check", description.to_string(), color).await;
    }
}

/// Pick the Discord notifier when configured, else log-only.
pub fn from_config(config: &NotifierConfig) -> Arc<dyn Notifier> {
    match config
        .discord_webhook_url
        .as_deref()
        .and_then(|url| DiscordNotifier::new(url, config))
    {
        Some(discord) => Arc::new(discord),
        None => Arc::new(LogNotifier),
    }
}
