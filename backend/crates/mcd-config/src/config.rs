use crate::{
    CONFIG_DIR_ENV, CONFIG_FILENAME, ConfigError, ConfigErrorResult, InstallConfig, LoggingConfig,
    NotifierConfig, ShutdownConfig, SupervisorConfig, UpdateConfig, WebhookConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub install: InstallConfig,
    pub update: UpdateConfig,
    pub shutdown: ShutdownConfig,
    pub supervisor: SupervisorConfig,
    pub webhook: WebhookConfig,
    pub notifier: NotifierConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config from the default config directory.
    ///
    /// Loading order:
    /// 1. MCD_CONFIG_DIR env var, else the current directory
    /// 2. minecraftd.toml if it exists, else defaults
    /// 3. MCD_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;
        Self::load_from(&config_dir)
    }

    /// Load config from an explicit directory, still applying env overrides.
    pub fn load_from(config_dir: &Path) -> ConfigErrorResult<Self> {
        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Priority: MCD_CONFIG_DIR env var > current working directory
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.install.validate()?;
        self.update.validate()?;
        self.shutdown.validate()?;
        self.supervisor.validate()?;
        self.webhook.validate()?;
        self.notifier.validate()?;

        Ok(())
    }

    /// Log configuration summary (the Discord URL is a secret).
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  install: {}/{} (binary {}, data {})",
            self.install.root_dir.display(),
            self.install.artifact_name,
            self.install.binary_name,
            self.install.data_dir.display()
        );
        info!("  data links: {}", self.install.data_links.join(", "));
        info!(
            "  update: every {}s from {}",
            self.update.poll_interval_secs, self.update.version_page_url
        );
        info!(
            "  shutdown: {} notices every {}s, final delay {}s",
            self.shutdown.countdown_notices,
            self.shutdown.notice_interval_secs,
            self.shutdown.final_notice_delay_secs
        );
        info!(
            "  supervisor: liveness every {}ms",
            self.supervisor.liveness_interval_ms
        );

        if self.webhook.enabled {
            info!("  webhooks: {}", self.webhook.bind_addr());
        } else {
            info!("  webhooks: disabled");
        }

        info!(
            "  notifier: discord {}",
            if self.notifier.discord_webhook_url.is_some() {
                "configured"
            } else {
                "not configured"
            }
        );
        info!(
            "  logging: {} (colored: {})",
            self.logging.level, self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) {
        // Install
        Self::apply_env_parse("MCD_INSTALL_ROOT_DIR", &mut self.install.root_dir);
        Self::apply_env_string("MCD_ARTIFACT_NAME", &mut self.install.artifact_name);
        Self::apply_env_string("MCD_BINARY_NAME", &mut self.install.binary_name);
        Self::apply_env_parse("MCD_DATA_DIR", &mut self.install.data_dir);
        Self::apply_env_list("MCD_DATA_LINKS", &mut self.install.data_links);

        // Update
        Self::apply_env_string("MCD_VERSION_PAGE_URL", &mut self.update.version_page_url);
        Self::apply_env_string("MCD_DOWNLOAD_BASE_URL", &mut self.update.download_base_url);
        Self::apply_env_parse(
            "MCD_UPDATE_POLL_INTERVAL_SECS",
            &mut self.update.poll_interval_secs,
        );
        Self::apply_env_parse(
            "MCD_UPDATE_REQUEST_TIMEOUT_SECS",
            &mut self.update.request_timeout_secs,
        );
        Self::apply_env_string("MCD_USER_AGENT", &mut self.update.user_agent);

        // Shutdown
        Self::apply_env_parse(
            "MCD_SHUTDOWN_COUNTDOWN_NOTICES",
            &mut self.shutdown.countdown_notices,
        );
        Self::apply_env_parse(
            "MCD_SHUTDOWN_NOTICE_INTERVAL_SECS",
            &mut self.shutdown.notice_interval_secs,
        );
        Self::apply_env_parse(
            "MCD_SHUTDOWN_FINAL_DELAY_SECS",
            &mut self.shutdown.final_notice_delay_secs,
        );

        // Supervisor
        Self::apply_env_parse(
            "MCD_LIVENESS_INTERVAL_MS",
            &mut self.supervisor.liveness_interval_ms,
        );

        // Webhook
        Self::apply_env_bool("MCD_WEBHOOK_ENABLED", &mut self.webhook.enabled);
        Self::apply_env_string("MCD_WEBHOOK_HOST", &mut self.webhook.host);
        Self::apply_env_parse("MCD_WEBHOOK_PORT", &mut self.webhook.port);

        // Notifier
        Self::apply_env_option_string(
            "MCD_DISCORD_WEBHOOK_URL",
            &mut self.notifier.discord_webhook_url,
        );
        Self::apply_env_parse("MCD_NOTIFIER_TIMEOUT_SECS", &mut self.notifier.timeout_secs);

        // Logging
        Self::apply_env_parse("MCD_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("MCD_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("MCD_LOG_FILE", &mut self.logging.file);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }

    /// Helper: Apply environment variable override for comma-separated lists
    fn apply_env_list(var_name: &str, target: &mut Vec<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    }
}
