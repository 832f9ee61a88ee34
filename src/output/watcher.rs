use anyhow::{Context, Result};
use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender, TryRecvError};
use crossterm::style::Color;
use notify::event::ModifyKind;
use notify::{Config, Event, EventKind as FsEventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::OutputReader;

const SIGNAL_PREFIX: &str = "sl";
const SIGNAL_EXTENSION: &str = "mapi";

/// `sl<alnum>.mapi`, e.g. `sl12.mapi`.
pub fn is_signal_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    let Some(stem) = name
        .strip_prefix(SIGNAL_PREFIX)
        .and_then(|rest| rest.strip_suffix(SIGNAL_EXTENSION))
        .and_then(|rest| rest.strip_suffix('.'))
    else {
        return false;
    };
    !stem.is_empty() && stem.chars().all(|ch| ch.is_ascii_alphanumeric())
}

/// Signal files already present in `dir`, sorted by name.
pub fn pending_signal_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| is_signal_file(path))
            .collect(),
        Err(err) => {
            crate::log_debug(&format!("session dir scan failed: {err}"));
            Vec::new()
        }
    };
    files.sort();
    files
}

/// Watches the session directory and feeds new signal files to the reader on
/// a dedicated thread, one file at a time.
pub struct SignalWatcher {
    watcher: Option<RecommendedWatcher>,
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
    dir: Option<PathBuf>,
}

impl SignalWatcher {
    /// Start watching `dir`. A missing directory prints a warning and yields
    /// an idle watcher.
    pub fn start(dir: Option<&Path>, reader: Arc<OutputReader>) -> Result<Self> {
        let Some(dir) = dir.filter(|dir| dir.is_dir()) else {
            let shown = dir.map_or_else(|| "null".to_string(), |dir| dir.display().to_string());
            tracing::warn!(session_dir = %shown, "session directory missing");
            reader.console().write_status(
                &format!(
                    "Missing session directory! Output is not being watched... (SessionDirectory = \"{shown}\")"
                ),
                Color::Red,
            );
            return Ok(Self::idle());
        };

        let (event_tx, event_rx) = unbounded::<notify::Result<Event>>();
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = event_tx.send(res);
            },
            Config::default(),
        )
        .context("failed to create session directory watcher")?;
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", dir.display()))?;

        let startup_dir = dir.to_path_buf();
        let worker = thread::Builder::new()
            .name("signal-watcher".into())
            .spawn(move || run_worker(&startup_dir, &reader, &event_rx, &stop_rx))
            .context("failed to spawn signal watcher thread")?;

        tracing::info!(session_dir = %dir.display(), "watching session directory");
        Ok(Self {
            watcher: Some(watcher),
            stop_tx: Some(stop_tx),
            worker: Some(worker),
            dir: Some(dir.to_path_buf()),
        })
    }

    fn idle() -> Self {
        Self {
            watcher: None,
            stop_tx: None,
            worker: None,
            dir: None,
        }
    }

    pub fn is_watching(&self) -> bool {
        self.worker.is_some()
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Stop watching and wait for the file in progress to finish.
    pub fn shutdown(&mut self) {
        self.watcher = None;
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                crate::log_debug("signal watcher thread panicked");
            }
        }
    }
}

impl Drop for SignalWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(
    dir: &Path,
    reader: &OutputReader,
    event_rx: &Receiver<notify::Result<Event>>,
    stop_rx: &Receiver<()>,
) {
    for path in pending_signal_files(dir) {
        if stop_requested(stop_rx) {
            return;
        }
        process(reader, &path);
    }

    loop {
        select! {
            recv(stop_rx) -> _ => return,
            recv(event_rx) -> message => {
                match message {
                    Ok(Ok(event)) if is_arrival(&event.kind) => {
                        for path in event.paths.iter().filter(|path| is_signal_file(path)) {
                            process(reader, path);
                        }
                    }
                    Ok(Ok(_)) => {}
                    Ok(Err(err)) => {
                        tracing::warn!(error = %err, "session directory watch error");
                        crate::log_debug(&format!("watch error: {err}"));
                    }
                    Err(_) => return,
                }
            }
        }
    }
}

fn stop_requested(stop_rx: &Receiver<()>) -> bool {
    !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty))
}

/// Creation, or a rename into the directory.
fn is_arrival(kind: &FsEventKind) -> bool {
    matches!(
        kind,
        FsEventKind::Create(_) | FsEventKind::Modify(ModifyKind::Name(_))
    )
}

fn process(reader: &OutputReader, path: &Path) {
    if !path.exists() {
        return;
    }
    let outcome = reader.process_file(path);
    tracing::debug!(path = %path.display(), outcome = ?outcome, "signal file processed");
}
