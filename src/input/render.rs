use crossterm::style::Color;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};

use super::editor::RenderedInput;
use super::{DisplaySection, EditorState, LineSections};
use crate::config::ConsoleSettings;
use crate::console::ColoredMessage;

/// Console palette the input colors are drawn from.
const INPUT_PALETTE: [Color; 16] = [
    Color::Black,
    Color::DarkBlue,
    Color::DarkGreen,
    Color::DarkCyan,
    Color::DarkRed,
    Color::DarkMagenta,
    Color::DarkYellow,
    Color::Grey,
    Color::DarkGrey,
    Color::Blue,
    Color::Green,
    Color::Cyan,
    Color::Red,
    Color::Magenta,
    Color::Yellow,
    Color::White,
];

/// Prefix, continuation markers and colors of the input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLayout {
    pub prefix: String,
    pub left_marker: String,
    pub right_marker: String,
    pub marker_color: Color,
    pub text_color: Color,
}

impl Default for InputLayout {
    fn default() -> Self {
        Self::from_settings(&ConsoleSettings::default())
    }
}

impl InputLayout {
    pub fn from_settings(settings: &ConsoleSettings) -> Self {
        Self {
            prefix: settings.input_prefix.clone(),
            left_marker: settings.input_left_indicator.clone(),
            right_marker: settings.input_right_indicator.clone(),
            marker_color: Color::Yellow,
            text_color: Color::White,
        }
    }

    /// Text color from the low bits of `seed`, prefix and marker color from the
    /// next byte.
    pub fn randomize_colors(&mut self, seed: u64) {
        let pick = |bits: u64| INPUT_PALETTE[(bits % INPUT_PALETTE.len() as u64) as usize];
        self.text_color = pick(seed & 0xff);
        self.marker_color = pick((seed >> 8) & 0xff);
    }

    pub fn prefix_len(&self) -> usize {
        self.prefix.chars().count()
    }

    pub fn marker_len(&self) -> usize {
        self.left_marker.chars().count() + self.right_marker.chars().count()
    }

    /// Columns left for line text after the prefix, keeping the last column free.
    pub fn section_width(&self, terminal_width: u16) -> usize {
        usize::from(terminal_width).saturating_sub(1 + self.prefix_len())
    }

    /// Cursor jump for page up/down: one section's worth of text.
    pub fn page_step(&self, terminal_width: u16) -> usize {
        self.section_width(terminal_width)
            .saturating_sub(self.marker_len())
            .max(1)
    }

    fn raw_segments(&self, text: String) -> Vec<ColoredMessage> {
        vec![
            ColoredMessage::new(self.prefix.clone(), self.marker_color),
            ColoredMessage::new(text, self.text_color),
        ]
    }

    fn section_segments(&self, section: &DisplaySection) -> Vec<ColoredMessage> {
        let mut segments = vec![ColoredMessage::new(self.prefix.clone(), self.marker_color)];
        if let Some(marker) = &section.left_marker {
            segments.push(ColoredMessage::new(marker.clone(), self.marker_color));
        }
        segments.push(ColoredMessage::new(section.text.clone(), self.text_color));
        if let Some(marker) = &section.right_marker {
            segments.push(ColoredMessage::new(marker.clone(), self.marker_color));
        }
        segments
    }

    fn column(&self, offset: usize) -> u16 {
        u16::try_from(self.prefix_len() + offset).unwrap_or(u16::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderAction {
    Unchanged,
    MoveCursor(u16),
    Redraw {
        segments: Vec<ColoredMessage>,
        cursor: u16,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    pub action: RenderAction,
    /// Shown as a status line when sectioning failed and the raw line was used.
    pub warning: Option<String>,
}

impl RenderPlan {
    fn action(action: RenderAction) -> Self {
        Self {
            action,
            warning: None,
        }
    }
}

/// Decide the cheapest terminal update for the current editor state and record
/// it as rendered. A text or width change repaints; a cursor move within the
/// same section only repositions the cursor.
pub fn plan_render(
    state: &mut EditorState,
    layout: &InputLayout,
    terminal_width: u16,
) -> RenderPlan {
    let width = layout.section_width(terminal_width);
    let text = state.text();
    let cursor = state.cursor();

    let text_changed = state
        .rendered
        .as_ref()
        .map_or(true, |rendered| rendered.text != text || rendered.width != width);

    if text_changed {
        let plan = plan_full_redraw(state, layout, &text, cursor, width);
        state.rendered = Some(RenderedInput {
            text,
            cursor,
            width,
        });
        return plan;
    }

    let cursor_moved = state
        .rendered
        .as_ref()
        .is_some_and(|rendered| rendered.cursor != cursor);
    if !cursor_moved {
        return RenderPlan::action(RenderAction::Unchanged);
    }
    if let Some(rendered) = state.rendered.as_mut() {
        rendered.cursor = cursor;
    }

    let Some(sections) = state.sections.as_ref() else {
        return RenderPlan::action(RenderAction::MoveCursor(layout.column(cursor)));
    };
    match sections.locate_section(cursor.saturating_sub(1)) {
        Some((index, section)) => {
            let column = layout.column(LineSections::relative_index(section, cursor));
            if index == state.section_index {
                RenderPlan::action(RenderAction::MoveCursor(column))
            } else {
                let segments = layout.section_segments(section);
                state.section_index = index;
                RenderPlan::action(RenderAction::Redraw {
                    segments,
                    cursor: column,
                })
            }
        }
        None => RenderPlan {
            action: RenderAction::MoveCursor(layout.column(cursor)),
            warning: Some("Error while processing input string: no section for cursor".into()),
        },
    }
}

/// Per-process random seed for [`InputLayout::randomize_colors`].
pub fn random_color_seed() -> u64 {
    RandomState::new().build_hasher().finish()
}

fn plan_full_redraw(
    state: &mut EditorState,
    layout: &InputLayout,
    text: &str,
    cursor: usize,
    width: usize,
) -> RenderPlan {
    state.sections = None;
    state.section_index = 0;
    let mut warning = None;

    if state.len() > width {
        match LineSections::build(text, width, &layout.left_marker, &layout.right_marker) {
            Ok(sections) => {
                if let Some((index, section)) = sections.locate_section(cursor.saturating_sub(1)) {
                    let action = RenderAction::Redraw {
                        segments: layout.section_segments(section),
                        cursor: layout.column(LineSections::relative_index(section, cursor)),
                    };
                    state.section_index = index;
                    state.sections = Some(sections);
                    return RenderPlan::action(action);
                }
                warning = Some("Error while processing input string: no section for cursor".into());
            }
            Err(err) => {
                crate::log_debug(&format!("input sectioning failed: {err}"));
                warning = Some(format!("Error while processing input string: {err}"));
            }
        }
    }

    RenderPlan {
        action: RenderAction::Redraw {
            segments: layout.raw_segments(text.to_string()),
            cursor: layout.column(cursor),
        },
        warning,
    }
}
