//! Game server child process and the session directory it writes into.

use anyhow::{Context, Result};
use multiadmin::log_debug;
use multiadmin::relay::{ChildRelay, ProcessRelay};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Env var the server reads to find the session directory.
pub(crate) const SESSION_DIR_ENV: &str = "MULTIADMIN_SESSION_DIR";

const EXIT_GRACE: Duration = Duration::from_secs(2);
const EXIT_POLL: Duration = Duration::from_millis(50);

/// Session directory, removed on drop when this process created it.
pub(crate) struct SessionDir {
    path: PathBuf,
    owned: bool,
}

impl SessionDir {
    /// Use `requested` when given, otherwise a fresh per-process temp directory.
    pub(crate) fn prepare(requested: Option<&Path>) -> Result<Self> {
        match requested {
            Some(path) => Ok(Self {
                path: path.to_path_buf(),
                owned: false,
            }),
            None => {
                let path = env::temp_dir().join(format!("multiadmin-session-{}", std::process::id()));
                fs::create_dir_all(&path)
                    .with_context(|| format!("failed to create session dir {}", path.display()))?;
                Ok(Self { path, owned: true })
            }
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SessionDir {
    fn drop(&mut self) {
        if self.owned {
            if let Err(err) = fs::remove_dir_all(&self.path) {
                log_debug(&format!(
                    "failed to remove session dir {}: {err}",
                    self.path.display()
                ));
            }
        }
    }
}

/// Running server plus the relay that owns its stdin.
pub(crate) struct ServerProcess {
    child: Child,
    relay: Arc<ChildRelay>,
}

impl ServerProcess {
    pub(crate) fn spawn(argv: &[String], session_dir: &Path) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .context("server command line is empty")?;
        let mut child = Command::new(program)
            .args(args)
            .env(SESSION_DIR_ENV, session_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to start server {program}"))?;
        let stdin = child
            .stdin
            .take()
            .context("failed to capture server stdin")?;
        log_debug(&format!("server started (pid {})", child.id()));
        tracing::info!(pid = child.id(), program = %program, "server started");
        Ok(Self {
            child,
            relay: Arc::new(ChildRelay::new(stdin)),
        })
    }

    pub(crate) fn relay(&self) -> Arc<dyn ProcessRelay> {
        self.relay.clone()
    }

    /// Close the server's stdin, give it a moment to exit, then kill it.
    pub(crate) fn shutdown(mut self) {
        drop(self.relay.close());
        let deadline = Instant::now() + EXIT_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    log_debug(&format!("server exited: {status}"));
                    return;
                }
                Ok(None) if Instant::now() < deadline => thread::sleep(EXIT_POLL),
                Ok(None) => break,
                Err(err) => {
                    log_debug(&format!("server wait failed: {err}"));
                    break;
                }
            }
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
        log_debug("server killed after exit grace period");
    }
}
