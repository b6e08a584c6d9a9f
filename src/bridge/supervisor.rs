//! Reasoning process supervisor.
//!
//! The backend is hosted by a shell so that its startup line (for example
//! `java -Xmx1024m -jar opennars.jar`) can be typed into it like a user would.
//! On unix the shell leads its own process group, which lets
//! [`ReasoningProcess::terminate`] signal the backend together with the shell
//! and close both pipes.

use std::fmt;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::watch;

use crate::dialect::DialectProfile;
use crate::utilities::config::ShellConfig;
use crate::utilities::errors::{BridgeError, Result};

/// Lifecycle of a supervised backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessState {
    Launching,
    Running,
    Terminating,
    Terminated,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Launching => write!(f, "launching"),
            ProcessState::Running => write!(f, "running"),
            ProcessState::Terminating => write!(f, "terminating"),
            ProcessState::Terminated => write!(f, "terminated"),
        }
    }
}

/// Pipe halves handed to the writer and reader loops.
#[derive(Debug)]
pub struct ProcessStreams {
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
}

/// Owns the backend's process handle.
pub struct ReasoningProcess {
    backend: String,
    command: String,
    pid: Option<u32>,
    child: Option<Child>,
    state: Arc<watch::Sender<ProcessState>>,
}

impl ReasoningProcess {
    /// Spawn the host shell with piped stdin/stdout.
    ///
    /// Startup lines are not written here: they go through the command queue
    /// like every other line so ordering is preserved. Must be called from
    /// within a tokio runtime.
    pub fn launch(profile: &DialectProfile, shell: &ShellConfig) -> Result<(Self, ProcessStreams)> {
        let (state, _) = watch::channel(ProcessState::Launching);
        let command = shell.command_line();

        let mut cmd = Command::new(&shell.program);
        cmd.args(&shell.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|source| BridgeError::Launch {
            command: command.clone(),
            source,
        })?;

        let streams = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => ProcessStreams { stdin, stdout },
            _ => {
                let _ = child.start_kill();
                return Err(BridgeError::Launch {
                    command,
                    source: std::io::Error::new(
                        std::io::ErrorKind::BrokenPipe,
                        "standard streams were not captured",
                    ),
                });
            }
        };

        let pid = child.id();
        state.send_replace(ProcessState::Running);
        log::info!(
            "[{}] reasoning process started via '{}' (pid {:?})",
            profile.name(),
            command,
            pid
        );

        let process = Self {
            backend: profile.name().to_string(),
            command,
            pid,
            child: Some(child),
            state: Arc::new(state),
        };
        Ok((process, streams))
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn state(&self) -> ProcessState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions.
    pub fn subscribe(&self) -> watch::Receiver<ProcessState> {
        self.state.subscribe()
    }

    /// Resolve once the process has been reaped.
    pub async fn wait_terminated(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|s| *s == ProcessState::Terminated).await;
    }

    /// Interrupt, then kill, then drop the handle.
    ///
    /// Safe to call repeatedly; errors (for example signalling a process that
    /// already died) are logged and swallowed. The transition to
    /// `Terminated` happens once the exit is observed by a reaper task.
    pub fn terminate(&mut self) {
        let Some(mut child) = self.child.take() else {
            log::debug!("[{}] terminate: no live process", self.backend);
            return;
        };
        self.state.send_replace(ProcessState::Terminating);

        self.signal_group();
        if let Err(e) = child.start_kill() {
            log::debug!("[{}] kill failed: {}", self.backend, e);
        }

        let state = Arc::clone(&self.state);
        let backend = self.backend.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    match child.wait().await {
                        Ok(status) => log::info!("[{}] reasoning process exited: {}", backend, status),
                        Err(e) => log::warn!("[{}] waiting for reasoning process failed: {}", backend, e),
                    }
                    state.send_replace(ProcessState::Terminated);
                });
            }
            Err(_) => {
                if let Err(e) = child.try_wait() {
                    log::warn!("[{}] reaping reasoning process failed: {}", backend, e);
                }
                state.send_replace(ProcessState::Terminated);
            }
        }
    }

    #[cfg(unix)]
    fn signal_group(&self) {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        let Some(pid) = self.pid else {
            return;
        };
        let group = Pid::from_raw(pid as i32);
        if let Err(e) = killpg(group, Signal::SIGINT) {
            log::debug!("[{}] SIGINT to process group {} failed: {}", self.backend, pid, e);
        }
        if let Err(e) = killpg(group, Signal::SIGKILL) {
            log::debug!("[{}] SIGKILL to process group {} failed: {}", self.backend, pid, e);
        }
    }

    #[cfg(not(unix))]
    fn signal_group(&self) {}
}

impl Drop for ReasoningProcess {
    fn drop(&mut self) {
        self.terminate();
    }
}

impl fmt::Debug for ReasoningProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReasoningProcess")
            .field("backend", &self.backend)
            .field("command", &self.command)
            .field("pid", &self.pid)
            .field("state", &self.state())
            .finish()
    }
}
