#![allow(dead_code)]

use mcd_config::{InstallConfig, ShutdownConfig, SupervisorConfig};
use mcd_server::{AppState, ShutdownSignal, build_router};
use mcd_supervisor::{
    Collaborators, InstallLayout, LogNotifier, ProcessLauncher, Provisioner, ServerProcess,
    ServerVersion, Supervisor, SupervisorHandle, SupervisorResult, VersionSource,
};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use tempfile::TempDir;
use tokio::sync::watch;

pub const VERSION: &str = "1.21.0.3";

/// Lines written to the fake server's input.
#[derive(Clone, Default)]
pub struct Lines(Arc<Mutex<Vec<String>>>);

impl Lines {
    pub fn snapshot(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Runs until it is sent `stop`.
struct FakeProcess {
    lines: Lines,
    stopped: watch::Sender<bool>,
}

#[async_trait]
impl ServerProcess for FakeProcess {
    fn id(&self) -> Option<u32> {
        Some(1)
    }

    async fn write_line(&mut self, line: &str) -> SupervisorResult<()> {
        self.lines.0.lock().unwrap().push(line.to_string());
        if line == "stop" {
            self.stopped.send_replace(true);
        }
        Ok(())
    }

    async fn wait_for_exit(&mut self) -> SupervisorResult<Option<i32>> {
        let mut stopped = self.stopped.subscribe();
        let _ = stopped.wait_for(|stopped| *stopped).await;
        Ok(Some(0))
    }

    fn has_exited(&mut self) -> SupervisorResult<bool> {
        Ok(*self.stopped.borrow())
    }

    fn close(&mut self) {}
}

struct FakeLauncher {
    lines: Lines,
}

impl ProcessLauncher for FakeLauncher {
    fn launch(&self, _program: &Path, _working_dir: &Path) -> SupervisorResult<Box<dyn ServerProcess>> {
        Ok(Box::new(FakeProcess {
            lines: self.lines.clone(),
            stopped: watch::Sender::new(false),
        }))
    }
}

struct FixedVersionSource;

#[async_trait]
impl VersionSource for FixedVersionSource {
    async fn fetch_remote_version(&self) -> SupervisorResult<ServerVersion> {
        ServerVersion::parse(VERSION)
    }
}

struct LocalProvisioner {
    layout: InstallLayout,
}

#[async_trait]
impl Provisioner for LocalProvisioner {
    async fn provision(&self, version: &ServerVersion) -> SupervisorResult<PathBuf> {
        let dir = self.layout.versioned_dir(version);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("bedrock_server"), "").unwrap();
        self.layout.write_version_file(&dir, version)?;
        Ok(dir)
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub handle: SupervisorHandle,
    pub shutdown: ShutdownSignal,
    pub lines: Lines,
    _temp: TempDir,
}

/// Webhook router over a supervisor driving an in-memory server.
pub fn create_test_app() -> TestApp {
    let temp = TempDir::new().unwrap();
    let install = InstallConfig {
        root_dir: temp.path().to_path_buf(),
        data_dir: temp.path().join("no-data"),
        ..InstallConfig::default()
    };
    let shutdown_config = ShutdownConfig {
        countdown_notices: 1,
        notice_interval_secs: 0,
        final_notice_delay_secs: 0,
    };

    let layout = InstallLayout::new(&install);
    let lines = Lines::default();
    let collaborators = Collaborators {
        version_source: Arc::new(FixedVersionSource),
        provisioner: Arc::new(LocalProvisioner {
            layout: layout.clone(),
        }),
        launcher: Arc::new(FakeLauncher {
            lines: lines.clone(),
        }),
        notifier: Arc::new(LogNotifier),
    };

    let (supervisor, handle) = Supervisor::new(
        layout,
        shutdown_config,
        &SupervisorConfig::default(),
        collaborators,
    );
    tokio::spawn(supervisor.run());

    let shutdown = ShutdownSignal::new();
    let state = AppState {
        handle: handle.clone(),
        shutdown: shutdown.clone(),
        countdown_secs: 30,
    };

    let server = TestServer::builder()
        .build(build_router(state))
        .expect("Failed to create test server");

    TestApp {
        server,
        handle,
        shutdown,
        lines,
        _temp: temp,
    }
}
