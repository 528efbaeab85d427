mod config;
mod error;
mod install_config;
mod log_level;
mod logging_config;
mod notifier_config;
mod shutdown_config;
mod supervisor_config;
mod update_config;
mod webhook_config;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use install_config::InstallConfig;
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use notifier_config::NotifierConfig;
pub use shutdown_config::ShutdownConfig;
pub use supervisor_config::SupervisorConfig;
pub use update_config::UpdateConfig;
pub use webhook_config::WebhookConfig;

pub const CONFIG_FILENAME: &str = "minecraftd.toml";
pub const CONFIG_DIR_ENV: &str = "MCD_CONFIG_DIR";

// Install
const DEFAULT_ROOT_DIR: &str = ".";
const DEFAULT_ARTIFACT_NAME: &str = "bedrock-server";
const DEFAULT_BINARY_NAME: &str = "bedrock_server";
const DEFAULT_VERSION_FILE: &str = "version";
const DEFAULT_DATA_DIR: &str = "/data";
const DEFAULT_DATA_LINKS: [&str; 4] = [
    "worlds",
    "server.properties",
    "permissions.json",
    "whitelist.json",
];

// Update
const DEFAULT_VERSION_PAGE_URL: &str = "https://www.minecraft.net/en-us/download/server/bedrock";
const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://minecraft.azureedge.net/bin-linux";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 6 * 60 * 60;
const MIN_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) minecraftd";

// Shutdown
const DEFAULT_COUNTDOWN_NOTICES: u32 = 6;
const MAX_COUNTDOWN_NOTICES: u32 = 60;
const DEFAULT_NOTICE_INTERVAL_SECS: u64 = 5;
const MAX_NOTICE_INTERVAL_SECS: u64 = 60;
const DEFAULT_FINAL_NOTICE_DELAY_SECS: u64 = 5;

// Supervisor
const DEFAULT_LIVENESS_INTERVAL_MS: u64 = 500;
const MIN_LIVENESS_INTERVAL_MS: u64 = 10;
const MAX_LIVENESS_INTERVAL_MS: u64 = 60_000;
const DEFAULT_COMMAND_BUFFER: usize = 16;

// Webhook
const DEFAULT_WEBHOOK_HOST: &str = "0.0.0.0";
const DEFAULT_WEBHOOK_PORT: u16 = 8090;

// Notifier
const DEFAULT_NOTIFIER_TIMEOUT_SECS: u64 = 5;

// Logging
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
