//! On-disk layout of the server installs.
//!
//! ```text
//! <root>/bedrock-server-1.10.0.7/   versioned install, `version` side file inside
//! <root>/bedrock-server-1.10.0.8/
//! <root>/bedrock-server -> bedrock-server-1.10.0.8   stable alias
//! <data>/worlds, <data>/server.properties, ...       persistent copies
//! ```

use crate::{ServerVersion, SupervisorError, SupervisorResult};

use mcd_config::InstallConfig;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

/// Result of linking one persistent data entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLinkOutcome {
    /// Copied into the data dir on first run, then linked
    Persisted,
    /// Persistent copy already existed; only the link was (re)created
    Relinked,
    /// Link already pointed at the persistent copy
    AlreadyLinked,
    /// No data dir, or nothing to persist yet
    Skipped,
}

#[derive(Debug, Clone)]
pub struct InstallLayout {
    root: PathBuf,
    artifact_name: String,
    binary_name: String,
    version_file: String,
    data_dir: PathBuf,
    data_links: Vec<String>,
}

impl InstallLayout {
    pub fn new(config: &InstallConfig) -> Self {
        Self {
            root: config.root_dir.clone(),
            artifact_name: config.artifact_name.clone(),
            binary_name: config.binary_name.clone(),
            version_file: config.version_file.clone(),
            data_dir: config.data_dir.clone(),
            data_links: config.data_links.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<artifact>-<version>`, relative to the root.
    pub fn versioned_dir_name(&self, version: &ServerVersion) -> String {
        format!("{}-{}", self.artifact_name, version)
    }

    pub fn versioned_dir(&self, version: &ServerVersion) -> PathBuf {
        self.root.join(self.versioned_dir_name(version))
    }

    pub fn alias_path(&self) -> PathBuf {
        self.root.join(&self.artifact_name)
    }

    pub fn binary_name(&self) -> &str {
        &self.binary_name
    }

    /// Absolute working directory for the server: the alias, not its target.
    pub fn working_dir(&self) -> SupervisorResult<PathBuf> {
        let alias = self.alias_path();
        std::path::absolute(&alias).map_err(|e| SupervisorError::filesystem(&alias, e))
    }

    pub fn binary_path(&self) -> SupervisorResult<PathBuf> {
        Ok(self.working_dir()?.join(&self.binary_name))
    }

    pub fn version_file_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.version_file)
    }

    /// Whether the stable alias exists (dangling or not).
    pub fn is_installed(&self) -> bool {
        fs::symlink_metadata(self.alias_path()).is_ok()
    }

    /// Version recorded in the side file of the active install.
    pub fn installed_version(&self) -> SupervisorResult<ServerVersion> {
        let path = self.version_file_in(&self.alias_path());
        let raw = fs::read_to_string(&path).map_err(|e| SupervisorError::filesystem(&path, e))?;
        ServerVersion::parse(&raw)
    }

    /// Version recorded inside a versioned directory, if any.
    pub fn staged_version(&self, version: &ServerVersion) -> Option<ServerVersion> {
        let path = self.version_file_in(&self.versioned_dir(version));
        fs::read_to_string(path)
            .ok()
            .and_then(|raw| ServerVersion::parse(&raw).ok())
    }

    pub fn write_version_file(&self, dir: &Path, version: &ServerVersion) -> SupervisorResult<()> {
        let path = self.version_file_in(dir);
        fs::write(&path, version.as_str()).map_err(|e| SupervisorError::filesystem(&path, e))
    }

    /// Point the stable alias at `version` and re-apply the data links.
    ///
    /// The new link is created beside the alias and renamed over it, so the
    /// alias never disappears and never points at a half-populated directory.
    pub fn activate(&self, version: &ServerVersion) -> SupervisorResult<()> {
        let target_dir = self.versioned_dir(version);
        if !target_dir.is_dir() {
            return Err(SupervisorError::filesystem(
                &target_dir,
                io::Error::new(io::ErrorKind::NotFound, "versioned install is missing"),
            ));
        }

        let alias = self.alias_path();
        if let Ok(meta) = fs::symlink_metadata(&alias)
            && !meta.file_type().is_symlink()
        {
            return Err(SupervisorError::filesystem(
                &alias,
                io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "stable alias exists and is not a symlink",
                ),
            ));
        }

        let staging = self.root.join(format!(".{}.next", self.artifact_name));
        if fs::symlink_metadata(&staging).is_ok() {
            fs::remove_file(&staging).map_err(|e| SupervisorError::filesystem(&staging, e))?;
        }

        symlink_dir(Path::new(&self.versioned_dir_name(version)), &staging)
            .map_err(|e| SupervisorError::filesystem(&staging, e))?;
        fs::rename(&staging, &alias).map_err(|e| SupervisorError::filesystem(&alias, e))?;

        info!(
            "{} now points at {}",
            alias.display(),
            self.versioned_dir_name(version)
        );

        self.make_binary_executable()?;
        self.apply_data_links()?;

        Ok(())
    }

    #[cfg(unix)]
    fn make_binary_executable(&self) -> SupervisorResult<()> {
        use std::os::unix::fs::PermissionsExt;

        let binary = self.alias_path().join(&self.binary_name);
        if !binary.exists() {
            warn!("Server binary {} not found in install", binary.display());
            return Ok(());
        }

        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755))
            .map_err(|e| SupervisorError::filesystem(&binary, e))
    }

    #[cfg(not(unix))]
    fn make_binary_executable(&self) -> SupervisorResult<()> {
        Ok(())
    }

    /// Link every configured data entry. Safe to call repeatedly.
    pub fn apply_data_links(&self) -> SupervisorResult<Vec<(String, DataLinkOutcome)>> {
        let mut outcomes = Vec::with_capacity(self.data_links.len());

        for name in &self.data_links {
            let outcome = self.link_data(name)?;
            debug!("Data link {name}: {outcome:?}");
            outcomes.push((name.clone(), outcome));
        }

        Ok(outcomes)
    }

    /// Persist `<alias>/<name>` into the data dir (first run only) and replace
    /// it with a link to the persistent copy.
    pub fn link_data(&self, name: &str) -> SupervisorResult<DataLinkOutcome> {
        if !self.data_dir.is_dir() {
            return Ok(DataLinkOutcome::Skipped);
        }

        let app = self.alias_path().join(name);
        let data = self.data_dir.join(name);
        let app_meta = fs::symlink_metadata(&app).ok();

        if let Some(ref meta) = app_meta
            && meta.file_type().is_symlink()
            && fs::read_link(&app).is_ok_and(|target| target == data)
        {
            return Ok(DataLinkOutcome::AlreadyLinked);
        }

        let outcome = if fs::symlink_metadata(&data).is_ok() {
            DataLinkOutcome::Relinked
        } else {
            if app_meta.is_none() {
                return Ok(DataLinkOutcome::Skipped);
            }
            copy_recursive(&app, &data).map_err(|e| SupervisorError::filesystem(&data, e))?;
            info!("Persisted {} to {}", app.display(), data.display());
            DataLinkOutcome::Persisted
        };

        if let Some(meta) = app_meta {
            let removed = if meta.is_dir() {
                fs::remove_dir_all(&app)
            } else {
                fs::remove_file(&app)
            };
            removed.map_err(|e| SupervisorError::filesystem(&app, e))?;
        }

        let linked = if data.is_dir() {
            symlink_dir(&data, &app)
        } else {
            symlink_file(&data, &app)
        };
        linked.map_err(|e| SupervisorError::filesystem(&app, e))?;

        Ok(outcome)
    }
}

fn copy_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    if !fs::metadata(src)?.is_dir() {
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, dst)?;
        return Ok(());
    }

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(unix)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(windows)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
