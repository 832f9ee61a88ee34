//! MultiAdmin supervisor console entrypoint.
//!
//! # Architecture
//!
//! - Main thread: line editor (or plain stdin reads) feeding the dispatcher
//! - Signal watcher: consumes `sl*.mapi` files from the session directory
//! - Console: one serialized writer shared by both, keeps the input row below output

mod lifecycle;
mod server;

use anyhow::Result;
use crossterm::style::Color;
use multiadmin::commands::{info_banner, CommandRegistry};
use multiadmin::config::{AppConfig, ConfigFile, ConsoleSettings};
use multiadmin::console::{Console, CrosstermTerminal};
use multiadmin::handlers::HandlerRegistry;
use multiadmin::input::{CrosstermKeys, InputSession, LineDispatcher};
use multiadmin::output::{OutputReader, SignalWatcher};
use multiadmin::relay::{NullRelay, ProcessRelay};
use multiadmin::terminal_restore::{install_terminal_panic_hook, TerminalRestoreGuard};
use multiadmin::{init_logging, init_tracing, log_debug, log_file_path};
use std::io::{self, IsTerminal};
use std::sync::Arc;

use crate::lifecycle::register_default_handlers;
use crate::server::{ServerProcess, SessionDir};

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    let config_file = ConfigFile::load(&config.config_path)?;
    let settings = ConsoleSettings::from_source(&config_file);
    settings.validate()?;

    if config.print_settings {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    init_logging(&config);
    init_tracing(&config);
    install_terminal_panic_hook();
    log_debug("=== MultiAdmin Started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    let session_dir = SessionDir::prepare(config.session_dir.as_deref())?;
    let server = match config.server_argv()? {
        Some(argv) => Some(ServerProcess::spawn(&argv, session_dir.path())?),
        None => {
            log_debug("no --server-cmd given; console lines are dropped");
            None
        }
    };
    let relay: Arc<dyn ProcessRelay> = match &server {
        Some(server) => server.relay(),
        None => Arc::new(NullRelay),
    };

    let interactive =
        !config.headless && settings.use_new_input_system && io::stdin().is_terminal();
    let sink = Box::new(CrosstermTerminal::stdout());
    let console = Arc::new(if interactive {
        Console::new(sink)
    } else {
        Console::headless(sink)
    });
    console.write_status(&info_banner(), Color::DarkMagenta);

    let handlers = Arc::new(HandlerRegistry::new());
    register_default_handlers(&handlers);
    let reader = Arc::new(OutputReader::new(
        Arc::clone(&console),
        handlers,
        Arc::clone(&relay),
        settings.output_read_attempts,
    ));
    let mut watcher = SignalWatcher::start(Some(session_dir.path()), reader)?;

    let dispatcher = LineDispatcher::new(
        Arc::clone(&console),
        Arc::new(CommandRegistry::with_builtins()),
        relay,
    );
    let mut session = InputSession::new(&settings);
    let result = if interactive {
        run_interactive(&console, &mut session, &dispatcher)
    } else {
        run_plain(&mut session, &dispatcher)
    };

    watcher.shutdown();
    if let Some(server) = server {
        server.shutdown();
    }
    log_debug("=== MultiAdmin Exiting ===");
    result
}

fn run_interactive(
    console: &Console,
    session: &mut InputSession,
    dispatcher: &LineDispatcher,
) -> Result<()> {
    let terminal_guard = TerminalRestoreGuard::new();
    terminal_guard.enable_raw_mode()?;
    let mut keys = CrosstermKeys;
    while let Some(line) = session.read_line(console, &mut keys)? {
        dispatcher.dispatch(&line);
    }
    Ok(())
}

fn run_plain(session: &mut InputSession, dispatcher: &LineDispatcher) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    while let Some(line) = session.read_line_plain(&mut input)? {
        dispatcher.dispatch(&line);
    }
    Ok(())
}
