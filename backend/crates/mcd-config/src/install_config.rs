use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_ARTIFACT_NAME, DEFAULT_BINARY_NAME, DEFAULT_DATA_DIR,
    DEFAULT_DATA_LINKS, DEFAULT_ROOT_DIR, DEFAULT_VERSION_FILE,
};

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Directory holding the versioned installs and the stable alias
    pub root_dir: PathBuf,
    /// Name of the stable alias; versioned installs are `<artifact_name>-<version>`
    pub artifact_name: String,
    /// Executable inside the install directory
    pub binary_name: String,
    /// Side file recording the installed version
    pub version_file: String,
    /// Persistent data location; links are skipped when it does not exist
    pub data_dir: PathBuf,
    /// Entries moved into `data_dir` and linked back into the active install
    pub data_links: Vec<String>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            artifact_name: String::from(DEFAULT_ARTIFACT_NAME),
            binary_name: String::from(DEFAULT_BINARY_NAME),
            version_file: String::from(DEFAULT_VERSION_FILE),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            data_links: DEFAULT_DATA_LINKS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl InstallConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        Self::validate_name("install.artifact_name", &self.artifact_name)?;
        Self::validate_name("install.binary_name", &self.binary_name)?;
        Self::validate_name("install.version_file", &self.version_file)?;

        for link in &self.data_links {
            Self::validate_name("install.data_links entry", link)?;
        }

        Ok(())
    }

    fn validate_name(field: &str, value: &str) -> ConfigErrorResult<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::install(format!("{field} cannot be empty")));
        }

        if value.contains('/') || value.contains('\\') || value == "." || value == ".." {
            return Err(ConfigError::install(format!(
                "{field} must be a plain file name, got '{value}'"
            )));
        }

        Ok(())
    }
}
