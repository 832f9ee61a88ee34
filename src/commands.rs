//! Console commands handled by the supervisor itself.

use anyhow::Result;
use crossterm::style::Color;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::console::{ColoredMessage, Console};

pub const PRODUCT_NAME: &str = "MultiAdmin";

pub fn info_banner() -> String {
    format!(
        "{PRODUCT_NAME} v{} ({})\nReleased under MIT License",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_NAME")
    )
}

pub struct CommandContext<'a> {
    pub console: &'a Console,
    pub commands: &'a CommandRegistry,
}

pub trait Command: Send + Sync {
    /// Upper-case name shown in HELP; lookup is case-insensitive.
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn usage(&self) -> &str {
        ""
    }
    /// Whether the typed line is still forwarded to the server afterwards.
    fn pass_to_game(&self) -> bool;
    fn on_call(&self, ctx: &CommandContext<'_>, args: &[&str]) -> Result<()>;
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(HelpCommand));
        registry.register(Arc::new(InfoCommand));
        registry
    }

    /// Register `command`, replacing any command with the same name.
    pub fn register(&mut self, command: Arc<dyn Command>) -> Option<Arc<dyn Command>> {
        self.commands
            .insert(command.name().trim().to_lowercase(), command)
    }

    pub fn get(&self, word: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(&word.trim().to_lowercase()).cloned()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// `NAME usage: description` for every command, sorted.
    pub fn help_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .commands
            .iter()
            .map(|(key, command)| {
                let usage = command.usage();
                let usage = if usage.is_empty() {
                    String::new()
                } else {
                    format!(" {usage}")
                };
                format!("{}{usage}: {}", key.to_uppercase(), command.description())
            })
            .collect();
        lines.sort();
        lines
    }
}

pub struct HelpCommand;

impl Command for HelpCommand {
    fn name(&self) -> &str {
        "HELP"
    }

    fn description(&self) -> &str {
        "Prints out available commands and their function"
    }

    fn pass_to_game(&self) -> bool {
        true
    }

    fn on_call(&self, ctx: &CommandContext<'_>, _args: &[&str]) -> Result<()> {
        ctx.console
            .write_line(&[ColoredMessage::plain("Commands from MultiAdmin:")]);
        for line in ctx.commands.help_lines() {
            ctx.console.write_status(&line, Color::Green);
        }
        ctx.console
            .write_line(&[ColoredMessage::plain("Commands from game:")]);
        Ok(())
    }
}

pub struct InfoCommand;

impl Command for InfoCommand {
    fn name(&self) -> &str {
        "INFO"
    }

    fn description(&self) -> &str {
        "Prints MultiAdmin license and version information"
    }

    fn pass_to_game(&self) -> bool {
        false
    }

    fn on_call(&self, ctx: &CommandContext<'_>, _args: &[&str]) -> Result<()> {
        ctx.console.write_status(&info_banner(), Color::DarkMagenta);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::test_support::RecordingTerminal;

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = CommandRegistry::with_builtins();
        assert!(registry.get("help").is_some());
        assert!(registry.get(" Info ").is_some());
        assert!(registry.get("players").is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn help_lists_sorted_commands() {
        let registry = CommandRegistry::with_builtins();
        let terminal = RecordingTerminal::with_width(80);
        let console = Console::new(Box::new(terminal.clone()));
        let ctx = CommandContext {
            console: &console,
            commands: &registry,
        };
        registry
            .get("HELP")
            .expect("help")
            .on_call(&ctx, &[])
            .expect("help runs");
        assert_eq!(
            terminal.written(),
            vec![
                "Commands from MultiAdmin:".to_string(),
                "HELP: Prints out available commands and their function".to_string(),
                "INFO: Prints MultiAdmin license and version information".to_string(),
                "Commands from game:".to_string(),
            ]
        );
    }

    #[test]
    fn info_is_not_passed_to_game() {
        let registry = CommandRegistry::with_builtins();
        let info = registry.get("info").expect("info");
        assert!(!info.pass_to_game());
        assert!(registry.get("help").expect("help").pass_to_game());
        assert!(info_banner().starts_with("MultiAdmin v"));
    }

    #[test]
    fn register_replaces_same_name() {
        struct Quiet;
        impl Command for Quiet {
            fn name(&self) -> &str {
                "help"
            }
            fn description(&self) -> &str {
                "quiet help"
            }
            fn usage(&self) -> &str {
                "[topic]"
            }
            fn pass_to_game(&self) -> bool {
                false
            }
            fn on_call(&self, _ctx: &CommandContext<'_>, _args: &[&str]) -> Result<()> {
                Ok(())
            }
        }
        let mut registry = CommandRegistry::with_builtins();
        assert!(registry.register(Arc::new(Quiet)).is_some());
        assert_eq!(registry.len(), 2);
        assert!(registry
            .help_lines()
            .contains(&"HELP [topic]: quiet help".to_string()));
    }
}
