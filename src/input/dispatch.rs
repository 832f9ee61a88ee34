use crossterm::style::Color;
use std::sync::Arc;

use crate::commands::{CommandContext, CommandRegistry};
use crate::console::Console;
use crate::relay::ProcessRelay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Empty or whitespace-only line.
    Ignored,
    /// Sent to the server (possibly after a local command ran).
    Forwarded,
    /// Consumed by a local command.
    Handled,
}

/// Routes submitted console lines to local commands and the server.
pub struct LineDispatcher {
    console: Arc<Console>,
    commands: Arc<CommandRegistry>,
    relay: Arc<dyn ProcessRelay>,
}

impl LineDispatcher {
    pub fn new(
        console: Arc<Console>,
        commands: Arc<CommandRegistry>,
        relay: Arc<dyn ProcessRelay>,
    ) -> Self {
        Self {
            console,
            commands,
            relay,
        }
    }

    pub fn dispatch(&self, line: &str) -> DispatchOutcome {
        if line.is_empty() {
            return DispatchOutcome::Ignored;
        }
        self.console
            .write_status(&format!(">>> {line}"), Color::DarkMagenta);

        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((first, args)) = words.split_first() else {
            return DispatchOutcome::Ignored;
        };

        let mut pass_to_game = true;
        if let Some(command) = self.commands.get(first) {
            let ctx = CommandContext {
                console: &self.console,
                commands: &self.commands,
            };
            if let Err(err) = command.on_call(&ctx, args) {
                tracing::warn!(command = command.name(), error = %err, "console command failed");
                self.console.write_status(
                    &format!("Command {} failed: {err:#}", command.name()),
                    Color::Red,
                );
            }
            pass_to_game = command.pass_to_game();
        }

        if !pass_to_game {
            return DispatchOutcome::Handled;
        }
        crate::log_debug_content(&format!("console line: {line}"));
        if let Err(err) = self.relay.send_line(line) {
            tracing::warn!(error = %err, "failed to forward console line");
            self.console
                .write_status(&format!("Failed to send to server: {err:#}"), Color::Red);
        }
        DispatchOutcome::Forwarded
    }
}
