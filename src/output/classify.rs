//! Pure classification of one signal payload into events and a display form.

use crossterm::style::Color;
use regex::Regex;
use std::sync::OnceLock;

use super::server_mod::{ServerMod, BANNER_MARKER};
use super::{EventKind, SignalEvent};
use crate::console::ColoredMessage;

pub const DEFAULT_COLOR: Color = Color::Cyan;

const LOGTYPE_MARKER: &str = "LOGTYPE";
const ADMIN_ACTION_MARKER: &str = "Mod Log:";
const ROUND_RESTART_MARKER: &str = "Round restarting";
const WAITING_MARKER: &str = "Waiting for players";
const NEW_ROUND_MARKER: &str = "New round has been started";
const LEVEL_LOADED_MARKER: &str = "Level loaded. Creating match...";
const SERVER_FULL_MARKER: &str = "Server full";
const PLAYER_CONNECT_MARKER: &str = "Player connect";
const PLAYER_DISCONNECT_MARKER: &str = "Player disconnect";
const BUGGED_PLAYER_MARKER: &str = "Player has connected before load is complete";

fn structured_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)\[([A-Za-z]+)\] (\[.*?\]) (.*)").expect("structured log regex")
    })
}

/// How the payload should appear on the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayForm {
    /// Run `body` through the markup decorator with `color`.
    Decorate,
    /// Already split into colored segments.
    Segments(Vec<ColoredMessage>),
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub body: String,
    pub color: Color,
    /// Events in dispatch order.
    pub events: Vec<SignalEvent>,
    pub server_mod: Option<ServerMod>,
    /// The payload reported a player joining before the level finished loading.
    pub bugged_player: bool,
    pub display: DisplayForm,
}

impl Classification {
    fn new(body: String, color: Color) -> Self {
        Self {
            body,
            color,
            events: Vec::new(),
            server_mod: None,
            bugged_player: false,
            display: DisplayForm::Decorate,
        }
    }

    pub fn has_event(&self, kind: EventKind) -> bool {
        self.events.iter().any(|event| event.kind == kind)
    }

    fn push(&mut self, kind: EventKind, payload: impl Into<String>) {
        self.events.push(SignalEvent::new(kind, payload, self.color));
    }
}

/// `LOGTYPE02` green, `LOGTYPE-8` dark red, `LOGTYPE14` magenta.
pub fn logtype_color(marker: &str) -> Color {
    match marker {
        "LOGTYPE02" => Color::Green,
        "LOGTYPE-8" => Color::DarkRed,
        "LOGTYPE14" => Color::Magenta,
        _ => DEFAULT_COLOR,
    }
}

/// Colors for the level and message parts of a `[LEVEL] [tag] message` line.
pub fn level_colors(level: &str) -> (Color, Color) {
    match level {
        "DEBUG" => (Color::Grey, Color::White),
        "INFO" => (Color::Green, Color::White),
        "WARN" => (Color::DarkYellow, Color::White),
        "ERROR" => (Color::Red, Color::Red),
        "FATAL" => (Color::DarkRed, Color::Red),
        _ => (DEFAULT_COLOR, Color::White),
    }
}

fn strip_line_terminator(payload: &str) -> &str {
    payload
        .strip_suffix("\r\n")
        .or_else(|| payload.strip_suffix('\n'))
        .unwrap_or(payload)
}

fn after_colon(body: &str) -> Option<&str> {
    body.find(':').map(|index| &body[index..])
}

pub fn classify(payload: &str) -> Classification {
    let body = strip_line_terminator(payload);

    if let Some(index) = body.find(LOGTYPE_MARKER) {
        let color = logtype_color(body[index..].trim());
        let body = body[..index].trim().to_string();
        return scan_markers(Classification::new(body, color));
    }

    if let Some(caps) = structured_pattern().captures(body) {
        let level = &caps[1];
        let (level_color, message_color) = level_colors(level);
        let segments = vec![
            ColoredMessage::new(format!("[{level}] "), level_color),
            ColoredMessage::new(format!("{} ", &caps[2]), Color::Yellow),
            ColoredMessage::new(&caps[3], message_color),
        ];
        let mut classification = Classification::new(body.to_string(), DEFAULT_COLOR);
        classification
            .events
            .push(SignalEvent::formatted(body, segments.clone()));
        classification.display = DisplayForm::Segments(segments);
        return classification;
    }

    scan_markers(Classification::new(body.to_string(), DEFAULT_COLOR))
}

fn scan_markers(mut out: Classification) -> Classification {
    let body = out.body.clone();

    if body.contains(ADMIN_ACTION_MARKER) {
        out.push(EventKind::AdminAction, body.replace(ADMIN_ACTION_MARKER, ""));
    }

    if body.contains(BANNER_MARKER) {
        if let Some(detected) = ServerMod::from_banner(&body) {
            let label = detected.to_string();
            out.push(EventKind::ModDetected, label.clone());
            out.display = DisplayForm::Segments(vec![
                ColoredMessage::new("Detected server mod: ", Color::Green),
                ColoredMessage::new(label, Color::White),
            ]);
            out.server_mod = Some(detected);
        }
        return out;
    }

    if body.contains(ROUND_RESTART_MARKER) {
        out.push(EventKind::RoundEnd, body.as_str());
    }
    if body.contains(WAITING_MARKER) {
        out.push(EventKind::WaitingForPlayers, body.as_str());
    }
    if body.contains(NEW_ROUND_MARKER) {
        out.push(EventKind::RoundStart, body.as_str());
    }
    if body.contains(LEVEL_LOADED_MARKER) {
        out.push(EventKind::ServerStart, body.as_str());
    }
    if body.contains(SERVER_FULL_MARKER) {
        out.push(EventKind::ServerFull, body.as_str());
    }
    if body.contains(PLAYER_CONNECT_MARKER) {
        out.display = DisplayForm::Hidden;
        if let Some(name) = after_colon(&body) {
            out.push(EventKind::PlayerConnect, name);
        }
    }
    if body.contains(PLAYER_DISCONNECT_MARKER) {
        out.display = DisplayForm::Hidden;
        if let Some(name) = after_colon(&body) {
            out.push(EventKind::PlayerDisconnect, name);
        }
    }
    if body.contains(BUGGED_PLAYER_MARKER) {
        out.bugged_player = true;
    }
    out
}
