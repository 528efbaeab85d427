//! The live server child process and its input stream.

use crate::{SupervisorError, SupervisorResult};

use std::io;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};

/// Log target for lines the server prints.
pub const SERVER_LOG_TARGET: &str = "bedrock_server";

/// A running server owned by the supervisor.
#[async_trait]
pub trait ServerProcess: Send {
    fn id(&self) -> Option<u32>;

    /// Write one newline-terminated line to the server's input.
    async fn write_line(&mut self, line: &str) -> SupervisorResult<()>;

    /// Block until the operating system reports the process gone.
    /// Returns the exit code when there is one.
    ///
    /// Must be cancel safe: the supervisor races it against incoming commands.
    async fn wait_for_exit(&mut self) -> SupervisorResult<Option<i32>>;

    /// Whether the process has already exited, without blocking.
    fn has_exited(&mut self) -> SupervisorResult<bool>;

    /// Release the input stream. Idempotent.
    fn close(&mut self);
}

/// Starts server processes.
pub trait ProcessLauncher: Send + Sync {
    fn launch(
        &self,
        program: &Path,
        working_dir: &Path,
    ) -> SupervisorResult<Box<dyn ServerProcess>>;
}

/// Spawns real child processes with piped stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChildLauncher;

impl ProcessLauncher for ChildLauncher {
    fn launch(
        &self,
        program: &Path,
        working_dir: &Path,
    ) -> SupervisorResult<Box<dyn ServerProcess>> {
        Ok(Box::new(ChildProcess::start(program, working_dir)?))
    }
}

pub struct ChildProcess {
    child: Child,
    stdin: Option<ChildStdin>,
}

impl ChildProcess {
    pub fn start(program: &Path, working_dir: &Path) -> SupervisorResult<Self> {
        info!("Starting {}...", program.display());

        let mut child = Command::new(program)
            .current_dir(working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SupervisorError::spawn(program, e))?;

        let Some(stdin) = child.stdin.take() else {
            let _ = child.start_kill();
            return Err(SupervisorError::spawn(
                program,
                io::Error::new(io::ErrorKind::BrokenPipe, "server input was not captured"),
            ));
        };

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_output(stdout, false));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_output(stderr, true));
        }

        debug!("Spawned server with PID {:?}", child.id());

        Ok(Self {
            child,
            stdin: Some(stdin),
        })
    }
}

#[async_trait]
impl ServerProcess for ChildProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn write_line(&mut self, line: &str) -> SupervisorResult<()> {
        let stdin = self.stdin.as_mut().ok_or_else(|| {
            SupervisorError::io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "server input is closed",
            ))
        })?;

        stdin
            .write_all(format!("{line}\n").as_bytes())
            .await
            .map_err(SupervisorError::io)?;
        stdin.flush().await.map_err(SupervisorError::io)
    }

    async fn wait_for_exit(&mut self) -> SupervisorResult<Option<i32>> {
        let status = self.child.wait().await.map_err(SupervisorError::wait)?;
        Ok(status.code())
    }

    fn has_exited(&mut self) -> SupervisorResult<bool> {
        let status = self.child.try_wait().map_err(SupervisorError::wait)?;
        Ok(status.is_some())
    }

    fn close(&mut self) {
        self.stdin.take();
    }
}

/// Log everything the server prints. The pipe is drained until EOF whatever
/// the bytes are; a server blocked on a full or closed pipe stops responding.
async fn forward_output<R>(stream: R, is_stderr: bool)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\r', '\n']);
                if is_stderr {
                    warn!(target: SERVER_LOG_TARGET, "{line}");
                } else {
                    info!(target: SERVER_LOG_TARGET, "{line}");
                }
            }
            Err(e) => {
                warn!("Stopped logging server output: {e}");
                if let Err(e) = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await {
                    warn!("Failed to drain server output: {e}");
                }
                break;
            }
        }
    }
}
