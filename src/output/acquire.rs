use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Backoff after an access-denied fault.
pub const DENIED_BACKOFF: Duration = Duration::from_millis(8);
/// Backoff after any other fault.
pub const FAULT_BACKOFF: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquirePhase {
    Open,
    Read,
    Delete,
}

impl AcquirePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Read => "read",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for AcquirePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every attempt at a phase failed.
#[derive(Debug)]
pub struct AcquireError {
    pub path: PathBuf,
    pub phase: AcquirePhase,
    pub attempts: u32,
    pub source: io::Error,
}

impl fmt::Display for AcquireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not {} {:?} after {} attempt(s): {}",
            self.phase,
            self.path.display().to_string(),
            self.attempts,
            self.source
        )
    }
}

impl std::error::Error for AcquireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Filesystem operations the reader needs; swapped out in tests to simulate
/// lock contention.
pub trait SignalFs: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    /// Open for reading while denying every other reader and writer.
    fn open_exclusive(&self, path: &Path) -> io::Result<Box<dyn Read>>;
    fn remove(&self, path: &Path) -> io::Result<()>;
}

pub trait Backoff: Send + Sync {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadBackoff;

impl Backoff for ThreadBackoff {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdSignalFs;

impl SignalFs for StdSignalFs {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    #[cfg(unix)]
    fn open_exclusive(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        use std::os::unix::io::AsRawFd;

        let file = std::fs::File::open(path)?;
        // SAFETY: the fd belongs to `file`, which outlives the call. The lock is
        // released when `file` is closed.
        let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Box::new(file))
    }

    #[cfg(windows)]
    fn open_exclusive(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        use std::os::windows::fs::OpenOptionsExt;

        let file = std::fs::OpenOptions::new()
            .read(true)
            .share_mode(0)
            .open(path)?;
        Ok(Box::new(file))
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// Payload of a consumed signal file.
#[derive(Debug)]
pub struct Acquired {
    pub content: String,
    /// Set when the content was read but the file could not be deleted.
    pub leftover: Option<AcquireError>,
}

/// Open exclusively, read and delete `path`, retrying the whole sequence up to
/// `attempts` times. `Ok(None)` means the file was already gone.
pub fn acquire(
    fs: &dyn SignalFs,
    backoff: &dyn Backoff,
    path: &Path,
    attempts: u32,
) -> Result<Option<Acquired>, AcquireError> {
    let attempts = attempts.max(1);
    let mut content: Option<String> = None;
    let mut last_fault: Option<(AcquirePhase, io::Error)> = None;

    for attempt in 1..=attempts {
        if !fs.exists(path) {
            return Ok(content.map(|content| Acquired {
                content,
                leftover: None,
            }));
        }
        match attempt_once(fs, path) {
            Ok(text) => {
                return Ok(Some(Acquired {
                    content: text,
                    leftover: None,
                }))
            }
            Err((phase, err, read)) => {
                crate::log_debug(&format!(
                    "signal file {} attempt {attempt}/{attempts}: {phase} failed: {err}",
                    path.display()
                ));
                if read.is_some() {
                    content = read;
                }
                let pause = if err.kind() == io::ErrorKind::PermissionDenied {
                    DENIED_BACKOFF
                } else {
                    FAULT_BACKOFF
                };
                last_fault = Some((phase, err));
                if attempt < attempts {
                    backoff.sleep(pause);
                }
            }
        }
    }

    let (phase, source) = last_fault
        .unwrap_or_else(|| (AcquirePhase::Open, io::Error::other("no attempt was made")));
    let error = AcquireError {
        path: path.to_path_buf(),
        phase,
        attempts,
        source,
    };
    match content {
        Some(content) => Ok(Some(Acquired {
            content,
            leftover: Some(error),
        })),
        None => Err(error),
    }
}

type AttemptFault = (AcquirePhase, io::Error, Option<String>);

fn attempt_once(fs: &dyn SignalFs, path: &Path) -> Result<String, AttemptFault> {
    let text = {
        let mut reader = fs
            .open_exclusive(path)
            .map_err(|err| (AcquirePhase::Open, err, None))?;
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|err| (AcquirePhase::Read, err, None))?;
        text
    };
    match fs.remove(path) {
        Ok(()) => Ok(text),
        Err(err) => Err((AcquirePhase::Delete, err, Some(text))),
    }
}
