use crossterm::style::Color;
use regex::Regex;
use std::sync::OnceLock;

use super::ColoredMessage;

/// Turns raw server log text into colored segments.
pub trait MarkupDecorator: Send + Sync {
    fn decorate(&self, text: &str, base: Color) -> Vec<ColoredMessage>;
}

const NAMED_COLORS: &[(&str, u32)] = &[
    ("aqua", 0x00ffff),
    ("black", 0x000000),
    ("blue", 0x0000ff),
    ("brown", 0xa52a2a),
    ("cyan", 0x00ffff),
    ("darkblue", 0x0000a0),
    ("fuchsia", 0xff00ff),
    ("green", 0x008000),
    ("grey", 0x808080),
    ("lightblue", 0xadd8e6),
    ("lime", 0x00ff00),
    ("magenta", 0xff00ff),
    ("maroon", 0x800000),
    ("navy", 0x000080),
    ("olive", 0x808000),
    ("orange", 0xffa500),
    ("purple", 0x800080),
    ("red", 0xff0000),
    ("silver", 0xc0c0c0),
    ("teal", 0x008080),
    ("white", 0xffffff),
    ("yellow", 0xffff00),
];

fn open_tag() -> &'static Regex {
    static OPEN: OnceLock<Regex> = OnceLock::new();
    OPEN.get_or_init(|| {
        Regex::new(r"(?i)^<(color|size|b|i|material|quad)=?([^>]*)>").expect("open tag regex")
    })
}

fn close_tag() -> &'static Regex {
    static CLOSE: OnceLock<Regex> = OnceLock::new();
    CLOSE.get_or_init(|| {
        Regex::new(r"(?i)^</(color|size|b|i|material|quad)>").expect("close tag regex")
    })
}

/// Unity-style rich text: `<color=red>..</color>` and `<color=#rrggbb>` change
/// the segment color (nested via a stack); size/b/i/material/quad are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct RichTextDecorator;

impl MarkupDecorator for RichTextDecorator {
    fn decorate(&self, text: &str, base: Color) -> Vec<ColoredMessage> {
        let text = strip_ansi_escapes::strip_str(text);
        let mut segments = Vec::new();
        let mut stack = vec![base];
        let mut current = String::new();
        let mut rest = text.as_str();

        while let Some(ch) = rest.chars().next() {
            if ch == '<' {
                if let Some(caps) = open_tag().captures(rest) {
                    let matched = caps.get(0).map_or(1, |m| m.end());
                    if caps[1].eq_ignore_ascii_case("color") {
                        flush(&mut segments, &mut current, stack.last().copied());
                        let top = stack.last().copied().unwrap_or(base);
                        stack.push(parse_color(&caps[2]).unwrap_or(top));
                    }
                    rest = &rest[matched..];
                    continue;
                }
                if let Some(caps) = close_tag().captures(rest) {
                    let matched = caps.get(0).map_or(1, |m| m.end());
                    if caps[1].eq_ignore_ascii_case("color") {
                        flush(&mut segments, &mut current, stack.last().copied());
                        if stack.len() > 1 {
                            stack.pop();
                        }
                    }
                    rest = &rest[matched..];
                    continue;
                }
            }
            current.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
        flush(&mut segments, &mut current, stack.last().copied());
        segments
    }
}

fn flush(segments: &mut Vec<ColoredMessage>, current: &mut String, color: Option<Color>) {
    if current.is_empty() {
        return;
    }
    segments.push(ColoredMessage {
        text: std::mem::take(current),
        color,
    });
}

fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim().to_ascii_lowercase();
    let rgb = NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, rgb)| *rgb)
        .or_else(|| {
            let hex = value.trim_start_matches('#');
            match hex.len() {
                6 => u32::from_str_radix(hex, 16).ok(),
                // #rrggbbaa: alpha is ignored on a terminal.
                8 => hex.get(..6).and_then(|rgb| u32::from_str_radix(rgb, 16).ok()),
                _ => None,
            }
        })?;
    Some(Color::Rgb {
        r: ((rgb >> 16) & 0xff) as u8,
        g: ((rgb >> 8) & 0xff) as u8,
        b: (rgb & 0xff) as u8,
    })
}
