//! Staging of versioned server installs.

use crate::{InstallLayout, ServerVersion, SupervisorError, SupervisorResult};

use mcd_config::UpdateConfig;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use tokio::io::AsyncWriteExt;

/// Makes the files of a server version exist on disk.
///
/// Implementations are idempotent per version and leave nothing behind for a
/// version whose provisioning failed.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Returns the versioned install directory.
    async fn provision(&self, version: &ServerVersion) -> SupervisorResult<PathBuf>;
}

/// Downloads and unpacks the official Linux archive.
pub struct BedrockProvisioner {
    client: reqwest::Client,
    layout: InstallLayout,
    download_base_url: String,
}

impl BedrockProvisioner {
    pub fn new(config: &UpdateConfig, layout: InstallLayout) -> SupervisorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SupervisorError::network(&config.download_base_url, e))?;

        Ok(Self {
            client,
            layout,
            download_base_url: config.download_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn archive_name(version: &ServerVersion) -> String {
        format!("bedrock-server-{version}.zip")
    }

    pub fn download_url(&self, version: &ServerVersion) -> String {
        format!("{}/{}", self.download_base_url, Self::archive_name(version))
    }

    async fn download(&self, version: &ServerVersion, archive: &Path) -> SupervisorResult<()> {
        let url = self.download_url(version);
        info!("Downloading Minecraft Bedrock version {version} from {url}");

        let mut response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SupervisorError::network(&url, e))?;

        if !response.status().is_success() {
            return Err(SupervisorError::network_status(
                &url,
                response.status().as_u16(),
            ));
        }

        let mut file = tokio::fs::File::create(archive)
            .await
            .map_err(|e| SupervisorError::filesystem(archive, e))?;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| SupervisorError::network(&url, e))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| SupervisorError::filesystem(archive, e))?;
        }

        file.flush()
            .await
            .map_err(|e| SupervisorError::filesystem(archive, e))?;

        Ok(())
    }

    async fn stage(
        &self,
        version: &ServerVersion,
        archive: &Path,
        target: &Path,
    ) -> SupervisorResult<()> {
        self.download(version, archive).await?;

        info!("Unzipping Minecraft Bedrock version {version}");
        let archive_owned = archive.to_path_buf();
        let target_owned = target.to_path_buf();
        let label = version.to_string();

        tokio::task::spawn_blocking(move || extract_archive(&archive_owned, &target_owned, &label))
            .await
            .map_err(|e| SupervisorError::provision(version.as_str(), e.to_string()))??;

        self.layout.write_version_file(target, version)?;

        Ok(())
    }
}

#[async_trait]
impl Provisioner for BedrockProvisioner {
    async fn provision(&self, version: &ServerVersion) -> SupervisorResult<PathBuf> {
        let target = self.layout.versioned_dir(version);

        if self.layout.staged_version(version).as_ref() == Some(version) {
            info!("Version {version} already staged at {}", target.display());
            return Ok(target);
        }

        if target.exists() {
            warn!("Removing incomplete install at {}", target.display());
            std::fs::remove_dir_all(&target).map_err(|e| {
                staging_failure(version, SupervisorError::filesystem(&target, e))
            })?;
        }

        let archive = self.layout.root().join(Self::archive_name(version));

        match self.stage(version, &archive, &target).await {
            Ok(()) => {
                if let Err(e) = std::fs::remove_file(&archive) {
                    warn!("Failed to remove {}: {e}", archive.display());
                }
                info!("Completed downloading Minecraft Bedrock server version {version}");
                Ok(target)
            }
            Err(e) => {
                if target.exists()
                    && let Err(cleanup) = std::fs::remove_dir_all(&target)
                {
                    warn!("Failed to remove {}: {cleanup}", target.display());
                }
                if archive.exists()
                    && let Err(cleanup) = std::fs::remove_file(&archive)
                {
                    warn!("Failed to remove {}: {cleanup}", archive.display());
                }
                Err(staging_failure(version, e))
            }
        }
    }
}

/// Disk trouble while staging leaves the active install untouched, so it is
/// reported as a failed provision rather than a filesystem fault.
fn staging_failure(version: &ServerVersion, e: SupervisorError) -> SupervisorError {
    match e {
        SupervisorError::Filesystem { .. } => {
            SupervisorError::provision(version.as_str(), e.to_string())
        }
        other => other,
    }
}

fn extract_archive(archive: &Path, target: &Path, version: &str) -> SupervisorResult<()> {
    let fail = |message: String| SupervisorError::provision(version, message);

    let file = File::open(archive).map_err(|e| SupervisorError::filesystem(archive, e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| fail(format!("invalid archive: {e}")))?;

    std::fs::create_dir_all(target).map_err(|e| SupervisorError::filesystem(target, e))?;

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| fail(format!("unreadable archive entry {index}: {e}")))?;

        let relative = entry
            .enclosed_name()
            .ok_or_else(|| fail(format!("archive entry '{}' escapes the install", entry.name())))?;
        let out_path = target.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)
                .map_err(|e| SupervisorError::filesystem(&out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SupervisorError::filesystem(parent, e))?;
        }

        let mut out = File::create(&out_path).map_err(|e| SupervisorError::filesystem(&out_path, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| SupervisorError::filesystem(&out_path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            if let Some(mode) = entry.unix_mode()
                && mode & 0o777 != 0
            {
                std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode & 0o777))
                    .map_err(|e| SupervisorError::filesystem(&out_path, e))?;
            }
        }
    }

    Ok(())
}
