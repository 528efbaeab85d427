use std::panic::Location;
use std::path::PathBuf;
use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum ConfigError {
    #[error("{category} error: {message} {location}")]
    Generic {
        category: &'static str,
        message: String,
        location: ErrorLocation,
    },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[track_caller]
    fn generic<S: Into<String>>(category: &'static str, message: S) -> Self {
        ConfigError::Generic {
            category,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create a config error
    #[track_caller]
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::generic("Config", message)
    }

    /// Create an install error
    #[track_caller]
    pub fn install<S: Into<String>>(message: S) -> Self {
        Self::generic("Install", message)
    }

    /// Create an update error
    #[track_caller]
    pub fn update<S: Into<String>>(message: S) -> Self {
        Self::generic("Update", message)
    }

    /// Create a shutdown error
    #[track_caller]
    pub fn shutdown<S: Into<String>>(message: S) -> Self {
        Self::generic("Shutdown", message)
    }

    /// Create a supervisor error
    #[track_caller]
    pub fn supervisor<S: Into<String>>(message: S) -> Self {
        Self::generic("Supervisor", message)
    }

    /// Create a webhook error
    #[track_caller]
    pub fn webhook<S: Into<String>>(message: S) -> Self {
        Self::generic("Webhook", message)
    }

    /// Create a notifier error
    #[track_caller]
    pub fn notifier<S: Into<String>>(message: S) -> Self {
        Self::generic("Notifier", message)
    }
}

pub type ConfigErrorResult<T> = StdResult<T, ConfigError>;
