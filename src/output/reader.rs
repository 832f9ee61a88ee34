use crossterm::style::Color;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use super::acquire::{acquire, Backoff, SignalFs, StdSignalFs, ThreadBackoff};
use super::classify::{classify, DisplayForm};
use super::server_mod::ServerMod;
use super::EventKind;
use crate::console::{ColoredMessage, Console, MarkupDecorator, RichTextDecorator};
use crate::handlers::HandlerRegistry;
use crate::lock_or_recover;
use crate::relay::ProcessRelay;

/// Directive sent when a player joined before the level finished loading.
pub const ROUND_RESTART_DIRECTIVE: &str = "ROUNDRESTART";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Dispatched,
    AlreadyConsumed,
    Abandoned,
}

#[derive(Debug)]
struct ReaderState {
    loading: bool,
    fix_bugged_players: bool,
    server_mod: Option<ServerMod>,
}

/// Consumes signal files one at a time and turns them into console output
/// and handler dispatches.
pub struct OutputReader {
    fs: Arc<dyn SignalFs>,
    backoff: Arc<dyn Backoff>,
    attempts: u32,
    console: Arc<Console>,
    handlers: Arc<HandlerRegistry>,
    relay: Arc<dyn ProcessRelay>,
    decorator: Arc<dyn MarkupDecorator>,
    /// Held for a whole file so payloads are handled one at a time.
    processing: Mutex<()>,
    /// Only held for short reads and writes, never across a handler call.
    state: Mutex<ReaderState>,
}

impl OutputReader {
    pub fn new(
        console: Arc<Console>,
        handlers: Arc<HandlerRegistry>,
        relay: Arc<dyn ProcessRelay>,
        attempts: u32,
    ) -> Self {
        Self {
            fs: Arc::new(StdSignalFs),
            backoff: Arc::new(ThreadBackoff),
            attempts,
            console,
            handlers,
            relay,
            decorator: Arc::new(RichTextDecorator),
            processing: Mutex::new(()),
            state: Mutex::new(ReaderState {
                loading: true,
                fix_bugged_players: false,
                server_mod: None,
            }),
        }
    }

    pub fn with_fs(mut self, fs: Arc<dyn SignalFs>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_backoff(mut self, backoff: Arc<dyn Backoff>) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_decorator(mut self, decorator: Arc<dyn MarkupDecorator>) -> Self {
        self.decorator = decorator;
        self
    }

    pub fn console(&self) -> &Arc<Console> {
        &self.console
    }

    /// `true` until the server reports it is waiting for players.
    pub fn is_loading(&self) -> bool {
        lock_or_recover(&self.state, "OutputReader::is_loading").loading
    }

    pub fn server_mod(&self) -> Option<ServerMod> {
        lock_or_recover(&self.state, "OutputReader::server_mod")
            .server_mod
            .clone()
    }

    pub fn round_restart_pending(&self) -> bool {
        lock_or_recover(&self.state, "OutputReader::round_restart_pending").fix_bugged_players
    }

    /// Acquire, classify and dispatch one signal file. Files are processed one
    /// at a time so dispatch order follows processing order.
    pub fn process_file(&self, path: &Path) -> FileOutcome {
        let _processing = lock_or_recover(&self.processing, "OutputReader::process_file");
        match acquire(self.fs.as_ref(), self.backoff.as_ref(), path, self.attempts) {
            Ok(Some(acquired)) => {
                if let Some(err) = &acquired.leftover {
                    tracing::warn!(path = %path.display(), error = %err, "signal file left behind");
                    crate::log_debug(&format!("signal file left behind: {err}"));
                }
                self.dispatch_payload(&acquired.content);
                FileOutcome::Dispatched
            }
            Ok(None) => FileOutcome::AlreadyConsumed,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "signal file abandoned");
                self.console.write_line(&[ColoredMessage::plain(format!(
                    "Message printer warning: Could not {} \"{}\". Make sure that MultiAdmin has all necessary read-write permissions\nSkipping...",
                    err.phase,
                    path.display()
                ))]);
                FileOutcome::Abandoned
            }
        }
    }

    /// Classify and dispatch a payload that did not come from a file.
    pub fn handle_payload(&self, payload: &str) {
        let _processing = lock_or_recover(&self.processing, "OutputReader::handle_payload");
        self.dispatch_payload(payload);
    }

    fn state(&self) -> MutexGuard<'_, ReaderState> {
        lock_or_recover(&self.state, "OutputReader::state")
    }

    fn dispatch_payload(&self, payload: &str) {
        let classification = classify(payload);

        for event in &classification.events {
            match event.kind {
                EventKind::WaitingForPlayers => self.state().loading = false,
                EventKind::PlayerConnect => crate::log_debug("player connect event"),
                EventKind::PlayerDisconnect => crate::log_debug("player disconnect event"),
                _ => {}
            }
            self.handlers.dispatch(event);
            if event.kind == EventKind::WaitingForPlayers && self.take_round_restart() {
                if let Err(err) = self.relay.send_line(ROUND_RESTART_DIRECTIVE) {
                    tracing::warn!(error = %err, "round restart directive failed");
                }
            }
        }

        if let Some(detected) = classification.server_mod {
            tracing::info!(server_mod = %detected, "server mod detected");
            self.state().server_mod = Some(detected);
        }
        if classification.bugged_player {
            self.state().fix_bugged_players = true;
        }

        match classification.display {
            DisplayForm::Decorate => {
                let segments = self.decorate(&classification.body, classification.color);
                self.console.write_line(&segments);
            }
            DisplayForm::Segments(segments) => self.console.write_line(&segments),
            DisplayForm::Hidden => {}
        }
    }

    fn take_round_restart(&self) -> bool {
        std::mem::take(&mut self.state().fix_bugged_players)
    }

    fn decorate(&self, body: &str, color: Color) -> Vec<ColoredMessage> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.decorator.decorate(body, color))) {
            Ok(segments) => segments,
            Err(_) => {
                crate::log_debug("markup decorator panicked; printing raw text");
                vec![ColoredMessage::new(body, color)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::test_support::RecordingTerminal;
    use crate::output::SignalEvent;
    use crate::output::acquire::test_support::{FakeFs, RecordingBackoff};
    use crate::relay::test_support::RecordingRelay;
    use anyhow::Result;
    use std::io;
    use std::path::PathBuf;

    struct Harness {
        reader: OutputReader,
        terminal: RecordingTerminal,
        relay: RecordingRelay,
        handlers: Arc<HandlerRegistry>,
        fired: Arc<Mutex<Vec<(EventKind, String)>>>,
    }

    fn harness(fs: FakeFs, attempts: u32) -> (Harness, Arc<FakeFs>) {
        let terminal = RecordingTerminal::with_width(120);
        let console = Arc::new(Console::new(Box::new(terminal.clone())));
        let handlers = Arc::new(HandlerRegistry::new());
        let relay = RecordingRelay::default();
        let fired = Arc::new(Mutex::new(Vec::new()));
        for kind in EventKind::ALL {
            let fired = Arc::clone(&fired);
            handlers.register(
                kind,
                Arc::new(move |event: &SignalEvent| -> Result<()> {
                    fired
                        .lock()
                        .unwrap()
                        .push((event.kind, event.payload.clone()));
                    Ok(())
                }),
            );
        }
        let fs = Arc::new(fs);
        let reader = OutputReader::new(
            console,
            Arc::clone(&handlers),
            Arc::new(relay.clone()),
            attempts,
        )
        .with_fs(fs.clone())
        .with_backoff(Arc::new(RecordingBackoff::default()));
        (
            Harness {
                reader,
                terminal,
                relay,
                handlers,
                fired,
            },
            fs,
        )
    }

    fn kinds(h: &Harness) -> Vec<EventKind> {
        h.fired.lock().unwrap().iter().map(|(kind, _)| *kind).collect()
    }

    fn signal_path() -> PathBuf {
        PathBuf::from("/session/sl42.mapi")
    }

    #[test]
    fn locked_file_dispatched_once_on_last_attempt() {
        let fs = FakeFs::with_file(&signal_path(), "Waiting for players\n")
            .fail_opens(2, io::ErrorKind::WouldBlock);
        let (h, fs) = harness(fs, 3);
        assert_eq!(h.reader.process_file(&signal_path()), FileOutcome::Dispatched);
        assert_eq!(
            kinds(&h),
            vec![EventKind::WaitingForPlayers]
        );
        assert!(!fs.contains(&signal_path()));
        assert!(!h.reader.is_loading());
        assert_eq!(h.terminal.written(), vec!["Waiting for players"]);
    }

    #[test]
    fn exhausted_attempts_print_warning_and_skip() {
        let fs = FakeFs::with_file(&signal_path(), "lost").fail_opens(10, io::ErrorKind::PermissionDenied);
        let (h, fs) = harness(fs, 4);
        assert_eq!(h.reader.process_file(&signal_path()), FileOutcome::Abandoned);
        assert!(kinds(&h).is_empty());
        let written = h.terminal.written();
        assert_eq!(written.len(), 1);
        assert!(written[0].starts_with("Message printer warning: Could not open \"/session/sl42.mapi\""));
        assert!(written[0].ends_with("Skipping..."));
        assert!(fs.contains(&signal_path()));
    }

    #[test]
    fn missing_file_is_quietly_skipped() {
        let (h, _fs) = harness(FakeFs::default(), 3);
        assert_eq!(
            h.reader.process_file(&signal_path()),
            FileOutcome::AlreadyConsumed
        );
        assert!(h.terminal.ops().is_empty());
    }

    #[test]
    fn undeletable_file_is_still_dispatched() {
        let fs = FakeFs::with_file(&signal_path(), "Server full").fail_deletes(10);
        let (h, fs) = harness(fs, 2);
        assert_eq!(h.reader.process_file(&signal_path()), FileOutcome::Dispatched);
        assert_eq!(kinds(&h), vec![EventKind::ServerFull]);
        assert!(fs.contains(&signal_path()));
    }

    #[test]
    fn structured_payload_prints_segments() {
        let (h, _fs) = harness(FakeFs::default(), 1);
        h.reader.handle_payload("[WARN] [courtney.exampleplugin] Something happened");
        assert_eq!(kinds(&h), vec![EventKind::Formatted]);
        assert_eq!(
            h.terminal.written(),
            vec!["[WARN] [courtney.exampleplugin] Something happened"]
        );
    }

    #[test]
    fn player_connect_is_not_displayed() {
        let (h, _fs) = harness(FakeFs::default(), 1);
        h.reader.handle_payload("Player connect: Alice");
        assert_eq!(
            *h.fired.lock().unwrap(),
            vec![(EventKind::PlayerConnect, ": Alice".to_string())]
        );
        assert!(h.terminal.written().is_empty());
    }

    #[test]
    fn bugged_player_triggers_round_restart_on_next_wait() {
        let (h, _fs) = harness(FakeFs::default(), 1);
        h.reader.handle_payload("Player has connected before load is complete");
        assert!(h.reader.round_restart_pending());
        assert!(h.relay.lines().is_empty());

        h.reader.handle_payload("Waiting for players");
        assert_eq!(h.relay.lines(), vec![ROUND_RESTART_DIRECTIVE]);
        assert!(!h.reader.round_restart_pending());

        h.reader.handle_payload("Waiting for players");
        assert_eq!(h.relay.lines().len(), 1);
    }

    #[test]
    fn server_mod_banner_is_remembered() {
        let (h, _fs) = harness(FakeFs::default(), 1);
        h.reader.handle_payload("ServerMod - Version 3.4.0-PluginLoaderSL");
        let detected = h.reader.server_mod().expect("server mod");
        assert_eq!(detected.to_string(), "PluginLoaderSL 3.4.0");
        assert_eq!(
            h.terminal.written(),
            vec!["Detected server mod: PluginLoaderSL 3.4.0"]
        );
        assert_eq!(kinds(&h), vec![EventKind::ModDetected]);
    }

    #[test]
    fn rich_text_is_decorated_before_display() {
        let (h, _fs) = harness(FakeFs::default(), 1);
        h.reader.handle_payload("<color=red>Nuke</color> detonated LOGTYPE-8");
        assert_eq!(h.terminal.written(), vec!["Nuke detonated"]);
        assert!(kinds(&h).is_empty());
    }

    #[test]
    fn waiting_for_players_fires_exactly_one_event() {
        let (h, _fs) = harness(FakeFs::default(), 1);
        h.reader.handle_payload("Waiting for players");
        assert_eq!(
            *h.fired.lock().unwrap(),
            vec![(EventKind::WaitingForPlayers, "Waiting for players".to_string())]
        );
        assert_eq!(h.terminal.written(), vec!["Waiting for players"]);
    }

    #[test]
    fn handlers_may_query_reader_state() {
        let (h, _fs) = harness(FakeFs::default(), 1);
        let reader = Arc::new(h.reader);
        let weak = Arc::downgrade(&reader);
        let (seen_tx, seen_rx) = crossbeam_channel::bounded(4);
        for kind in [EventKind::ServerFull, EventKind::WaitingForPlayers] {
            let weak = weak.clone();
            let seen_tx = seen_tx.clone();
            h.handlers.register(
                kind,
                Arc::new(move |_: &SignalEvent| -> Result<()> {
                    if let Some(reader) = weak.upgrade() {
                        let _ = seen_tx.send((
                            reader.is_loading(),
                            reader.round_restart_pending(),
                            reader.server_mod().is_none(),
                        ));
                    }
                    Ok(())
                }),
            );
        }

        let worker = Arc::clone(&reader);
        let handle = std::thread::spawn(move || {
            worker.handle_payload("Server full");
            worker.handle_payload("Waiting for players");
        });
        let timeout = std::time::Duration::from_secs(3);
        assert_eq!(
            seen_rx.recv_timeout(timeout).expect("server full handler ran"),
            (true, false, true)
        );
        assert_eq!(
            seen_rx.recv_timeout(timeout).expect("waiting handler ran"),
            (false, false, true)
        );
        handle.join().expect("reader thread");
    }

    #[test]
    fn panicking_decorator_falls_back_to_raw_text() {
        struct Broken;
        impl MarkupDecorator for Broken {
            fn decorate(&self, _text: &str, _base: Color) -> Vec<ColoredMessage> {
                panic!("bad markup");
            }
        }
        let (h, _fs) = harness(FakeFs::default(), 1);
        let reader = h.reader.with_decorator(Arc::new(Broken));
        reader.handle_payload("<b>raw</b>");
        assert_eq!(h.terminal.written(), vec!["<b>raw</b>"]);
        assert!(h.fired.lock().unwrap().is_empty());
    }
}
