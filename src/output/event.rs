use crossterm::style::Color;
use std::fmt;

use crate::console::ColoredMessage;

/// Kind of a classified signal, used as the handler-registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Log,
    RoundStart,
    RoundEnd,
    ServerStart,
    ServerFull,
    WaitingForPlayers,
    PlayerConnect,
    PlayerDisconnect,
    AdminAction,
    ModDetected,
    Formatted,
}

impl EventKind {
    pub const ALL: [EventKind; 11] = [
        EventKind::Log,
        EventKind::RoundStart,
        EventKind::RoundEnd,
        EventKind::ServerStart,
        EventKind::ServerFull,
        EventKind::WaitingForPlayers,
        EventKind::PlayerConnect,
        EventKind::PlayerDisconnect,
        EventKind::AdminAction,
        EventKind::ModDetected,
        EventKind::Formatted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::RoundStart => "round_start",
            Self::RoundEnd => "round_end",
            Self::ServerStart => "server_start",
            Self::ServerFull => "server_full",
            Self::WaitingForPlayers => "waiting_for_players",
            Self::PlayerConnect => "player_connect",
            Self::PlayerDisconnect => "player_disconnect",
            Self::AdminAction => "admin_action",
            Self::ModDetected => "mod_detected",
            Self::Formatted => "formatted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified unit of server output. `segments` is only filled for
/// pre-formatted (`[LEVEL] [tag] message`) payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalEvent {
    pub kind: EventKind,
    pub payload: String,
    pub color: Color,
    pub segments: Vec<ColoredMessage>,
}

impl SignalEvent {
    pub fn new(kind: EventKind, payload: impl Into<String>, color: Color) -> Self {
        Self {
            kind,
            payload: payload.into(),
            color,
            segments: Vec::new(),
        }
    }

    pub fn formatted(payload: impl Into<String>, segments: Vec<ColoredMessage>) -> Self {
        Self {
            kind: EventKind::Formatted,
            payload: payload.into(),
            color: super::classify::DEFAULT_COLOR,
            segments,
        }
    }
}
