//! Color constants and themes for the terminal user interface.

use ratatui::style::Color;

use crate::fields::NoteColor;

pub const INDIGO: Color = Color::Rgb(99, 102, 241);
pub const GREEN: Color = Color::Rgb(34, 197, 94);
pub const PURPLE: Color = Color::Rgb(168, 85, 247);
pub const ROSE: Color = Color::Rgb(244, 63, 94);
pub const AMBER: Color = Color::Rgb(245, 158, 11);
pub const CYAN: Color = Color::Rgb(6, 182, 212);
pub const GRAY: Color = Color::Rgb(107, 114, 128);

/// Map a lookup-table color name onto a terminal color.
pub fn named_color(name: &str) -> Color {
    match name {
        "indigo" => INDIGO,
        "green" => GREEN,
        "purple" => PURPLE,
        "rose" => ROSE,
        "amber" => AMBER,
        "cyan" => CYAN,
        _ => GRAY,
    }
}

/// Sticky-note background.
pub fn note_color(color: NoteColor) -> Color {
    match color {
        NoteColor::Yellow => Color::Rgb(254, 240, 138),
        NoteColor::Pink => Color::Rgb(251, 207, 232),
        NoteColor::Blue => Color::Rgb(191, 219, 254),
        NoteColor::Green => Color::Rgb(187, 247, 208),
        NoteColor::Purple => Color::Rgb(233, 213, 255),
        NoteColor::Orange => Color::Rgb(254, 215, 170),
    }
}

/// Foreground/background pairs for the dark and light modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub bar_fg: Color,
}

pub const DARK: Theme = Theme {
    bg: Color::Rgb(17, 24, 39),
    fg: Color::Rgb(243, 244, 246),
    muted: Color::Rgb(107, 114, 128),
    accent: PURPLE,
    bar_fg: Color::White,
};

pub const LIGHT: Theme = Theme {
    bg: Color::Rgb(249, 250, 251),
    fg: Color::Rgb(17, 24, 39),
    muted: Color::Rgb(156, 163, 175),
    accent: INDIGO,
    bar_fg: Color::White,
};

pub fn theme(dark: bool) -> Theme {
    if dark {
        DARK
    } else {
        LIGHT
    }
}
