mod version_source;

use crate::{
    Collaborators, InstallLayout, Notifier, ProcessLauncher, Provisioner, ServerProcess,
    ServerVersion, Supervisor, SupervisorError, SupervisorHandle, SupervisorResult,
    UpdatePoller, VersionSource,
};

use mcd_config::{InstallConfig, ShutdownConfig, SupervisorConfig};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub const V7: &str = "1.10.0.7";
pub const V8: &str = "1.10.0.8";

pub fn version(raw: &str) -> ServerVersion {
    ServerVersion::parse(raw).unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Provisioned(String),
    Launched(String),
    Line(String),
    Exited,
    Closed,
    Started(String),
    Stopped,
    Health(bool),
}

/// Everything the fakes observed, in order, with the (paused) clock reading.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<(Instant, Event)>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push((Instant::now(), event));
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().iter().map(|(_, e)| e.clone()).collect()
    }

    /// Lines written to the server, with seconds elapsed since the first one.
    pub fn lines(&self) -> Vec<(u64, String)> {
        let entries = self.0.lock().unwrap();
        let lines: Vec<_> = entries
            .iter()
            .filter_map(|(at, e)| match e {
                Event::Line(line) => Some((*at, line.clone())),
                _ => None,
            })
            .collect();

        let Some((first, _)) = lines.first().cloned() else {
            return Vec::new();
        };

        lines
            .into_iter()
            .map(|(at, line)| ((at - first).as_secs(), line))
            .collect()
    }

    pub fn count(&self, wanted: &Event) -> usize {
        self.events().iter().filter(|e| *e == wanted).count()
    }

    /// Most servers alive at once, given how many were alive before the log
    /// started, and how many are alive at the end.
    pub fn live_servers(&self, initially: usize) -> (usize, usize) {
        let mut live = initially;
        let mut most = initially;

        for event in self.events() {
            match event {
                Event::Launched(_) => live += 1,
                Event::Exited => live -= 1,
                _ => continue,
            }
            most = most.max(live);
        }

        (most, live)
    }
}

/// Exits when told `stop`, or when crashed from the outside.
pub struct FakeProcess {
    log: EventLog,
    exited: Arc<watch::Sender<bool>>,
    reaped: bool,
    closed: bool,
}

#[async_trait]
impl ServerProcess for FakeProcess {
    fn id(&self) -> Option<u32> {
        Some(4242)
    }

    async fn write_line(&mut self, line: &str) -> SupervisorResult<()> {
        if *self.exited.borrow() {
            return Err(SupervisorError::io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "server is gone",
            )));
        }

        self.log.push(Event::Line(line.to_string()));
        if line == "stop" {
            self.exited.send_replace(true);
        }
        Ok(())
    }

    async fn wait_for_exit(&mut self) -> SupervisorResult<Option<i32>> {
        let mut exited = self.exited.subscribe();
        let _ = exited.wait_for(|gone| *gone).await;

        if !self.reaped {
            self.reaped = true;
            self.log.push(Event::Exited);
        }
        Ok(Some(0))
    }

    fn has_exited(&mut self) -> SupervisorResult<bool> {
        Ok(*self.exited.borrow())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.log.push(Event::Closed);
        }
    }
}

/// Launches [`FakeProcess`]es and records which install they ran from.
pub struct FakeLauncher {
    log: EventLog,
    pub fail: AtomicBool,
    current: Mutex<Option<Arc<watch::Sender<bool>>>>,
}

impl FakeLauncher {
    /// Make the most recently launched server exit on its own.
    pub fn crash(&self) {
        if let Some(exited) = self.current.lock().unwrap().as_ref() {
            exited.send_replace(true);
        }
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(
        &self,
        program: &Path,
        working_dir: &Path,
    ) -> SupervisorResult<Box<dyn ServerProcess>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SupervisorError::spawn(
                program,
                io::Error::new(io::ErrorKind::PermissionDenied, "not executable"),
            ));
        }

        let running = fs::read_to_string(working_dir.join("version")).unwrap_or_default();
        self.log.push(Event::Launched(running.trim().to_string()));

        let exited = Arc::new(watch::Sender::new(false));
        *self.current.lock().unwrap() = Some(Arc::clone(&exited));

        Ok(Box::new(FakeProcess {
            log: self.log.clone(),
            exited,
            reaped: false,
            closed: false,
        }))
    }
}

#[derive(Default)]
pub struct FakeVersionSource {
    remote: Mutex<Option<String>>,
}

impl FakeVersionSource {
    pub fn set(&self, remote: Option<&str>) {
        *self.remote.lock().unwrap() = remote.map(str::to_string);
    }
}

#[async_trait]
impl VersionSource for FakeVersionSource {
    async fn fetch_remote_version(&self) -> SupervisorResult<ServerVersion> {
        let remote = self.remote.lock().unwrap().clone();
        match remote {
            Some(raw) => ServerVersion::parse(&raw),
            None => Err(SupervisorError::network_status("http://versions.test", 503)),
        }
    }
}

/// Builds a minimal install tree instead of downloading one.
pub struct FakeProvisioner {
    layout: InstallLayout,
    log: EventLog,
    failing: Mutex<Option<String>>,
}

impl FakeProvisioner {
    pub fn fail_for(&self, version: Option<&str>) {
        *self.failing.lock().unwrap() = version.map(str::to_string);
    }

    pub fn stage(&self, version: &ServerVersion) -> PathBuf {
        let dir = self.layout.versioned_dir(version);
        if self.layout.staged_version(version).as_ref() == Some(version) {
            return dir;
        }

        fs::create_dir_all(dir.join("worlds")).unwrap();
        fs::write(dir.join("worlds").join("level.dat"), version.as_str()).unwrap();
        fs::write(dir.join("bedrock_server"), "#!/bin/sh\n").unwrap();
        self.layout.write_version_file(&dir, version).unwrap();

        self.log.push(Event::Provisioned(version.to_string()));
        dir
    }
}

#[async_trait]
impl Provisioner for FakeProvisioner {
    async fn provision(&self, version: &ServerVersion) -> SupervisorResult<PathBuf> {
        if self.failing.lock().unwrap().as_deref() == Some(version.as_str()) {
            return Err(SupervisorError::provision(
                version.as_str(),
                "download interrupted",
            ));
        }
        Ok(self.stage(version))
    }
}

pub struct RecordingNotifier {
    log: EventLog,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn on_started(&self, version: &ServerVersion) {
        self.log.push(Event::Started(version.to_string()));
    }

    async fn on_stopped(&self) {
        self.log.push(Event::Stopped);
    }

    async fn on_health_checked(&self, ok: bool) {
        self.log.push(Event::Health(ok));
    }
}

pub fn install_config(temp: &TempDir) -> InstallConfig {
    let root_dir = temp.path().join("servers");
    let data_dir = temp.path().join("data");
    fs::create_dir_all(&root_dir).unwrap();
    fs::create_dir_all(&data_dir).unwrap();

    InstallConfig {
        root_dir,
        data_dir,
        data_links: vec![String::from("worlds")],
        ..InstallConfig::default()
    }
}

/// A supervisor task wired to fakes, rooted in a temp dir.
pub struct Harness {
    pub handle: SupervisorHandle,
    pub task: JoinHandle<SupervisorResult<()>>,
    pub layout: InstallLayout,
    pub log: EventLog,
    pub version_source: Arc<FakeVersionSource>,
    pub provisioner: Arc<FakeProvisioner>,
    pub launcher: Arc<FakeLauncher>,
    pub temp: TempDir,
}

impl Harness {
    /// Nothing installed; the version source advertises `remote`.
    pub fn new(remote: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let layout = InstallLayout::new(&install_config(&temp));
        let log = EventLog::default();

        let version_source = Arc::new(FakeVersionSource::default());
        version_source.set(Some(remote));

        let provisioner = Arc::new(FakeProvisioner {
            layout: layout.clone(),
            log: log.clone(),
            failing: Mutex::new(None),
        });
        let launcher = Arc::new(FakeLauncher {
            log: log.clone(),
            fail: AtomicBool::new(false),
            current: Mutex::new(None),
        });
        let notifier = Arc::new(RecordingNotifier { log: log.clone() });

        let collaborators = Collaborators {
            version_source: version_source.clone(),
            provisioner: provisioner.clone(),
            launcher: launcher.clone(),
            notifier,
        };

        let (supervisor, handle) = Supervisor::new(
            layout.clone(),
            ShutdownConfig::default(),
            &SupervisorConfig::default(),
            collaborators,
        );
        let task = tokio::spawn(supervisor.run());

        Self {
            handle,
            task,
            layout,
            log,
            version_source,
            provisioner,
            launcher,
            temp,
        }
    }

    /// `installed` is already on disk and active; the remote advertises the same.
    pub fn with_installed(installed: &str) -> Self {
        let harness = Self::new(installed);
        harness.provisioner.stage(&version(installed));
        harness.layout.activate(&version(installed)).unwrap();
        harness.log.clear();
        harness
    }

    /// Start the server and forget the events that took.
    pub async fn started(installed: &str) -> Self {
        let harness = Self::with_installed(installed);
        harness.handle.start().await.unwrap();
        harness.log.clear();
        harness
    }

    pub fn poller(&self) -> UpdatePoller {
        UpdatePoller::new(
            self.handle.clone(),
            self.layout.clone(),
            self.version_source.clone(),
            self.provisioner.clone(),
            Duration::from_secs(3600),
        )
    }

    pub async fn wait_until_finished(&self) {
        let mut status = self.handle.subscribe();
        status.wait_for(|s| s.is_finished()).await.unwrap();
    }
}
