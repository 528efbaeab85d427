use std::panic::Location;
use std::path::{Path, PathBuf};

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Network error requesting {url}: {source} {location}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
        location: ErrorLocation,
    },

    #[error("HTTP {status} from {url} {location}")]
    NetworkStatus {
        url: String,
        status: u16,
        location: ErrorLocation,
    },

    #[error("Failed to parse remote version: {message} {location}")]
    Parse {
        message: String,
        location: ErrorLocation,
    },

    #[error("Failed to provision version {version}: {message} {location}")]
    Provision {
        version: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Failed to spawn {program}: {source} {location}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed waiting for server exit: {source} {location}")]
    Wait {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed writing to server input: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Filesystem error at {path}: {source} {location}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Supervisor is no longer running {location}")]
    ChannelClosed { location: ErrorLocation },

    #[error("Supervisor aborted: {message} {location}")]
    Aborted {
        message: String,
        location: ErrorLocation,
    },
}

impl SupervisorError {
    #[track_caller]
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn network_status(url: impl Into<String>, status: u16) -> Self {
        Self::NetworkStatus {
            url: url.into(),
            status,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn provision(version: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provision {
            version: version.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn spawn(program: &Path, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.to_path_buf(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn wait(source: std::io::Error) -> Self {
        Self::Wait {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn io(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn filesystem(path: &Path, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.to_path_buf(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn channel_closed() -> Self {
        Self::ChannelClosed {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn aborted(message: impl Into<String>) -> Self {
        Self::Aborted {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Whether the update poller may log this and try again next cycle.
    ///
    /// Everything else leaves the server in a state nobody controls.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network { .. }
                | Self::NetworkStatus { .. }
                | Self::Parse { .. }
                | Self::Provision { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SupervisorError>;
