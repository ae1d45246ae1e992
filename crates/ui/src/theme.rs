use ratatui::style::Color;

/// Iceberg-derived color theme for the session view
#[derive(Debug, Clone, Copy)]
pub struct Theme;

impl Theme {
    /// Primary background: deep blue-black (fills terminal)
    pub const BG: Color = Color::Rgb(22, 24, 33);

    /// Foreground: light blue-gray (primary text)
    pub const FG: Color = Color::Rgb(198, 200, 209);

    /// Secondary background: panels, control bar, composer
    pub const PANEL_BG: Color = Color::Rgb(30, 33, 50);

    /// Bubble fill for the local participant's messages
    pub const LOCAL_BUBBLE: Color = Color::Rgb(39, 44, 66);

    /// Bubble fill for remote messages
    pub const REMOTE_BUBBLE: Color = Color::Rgb(30, 33, 50);

    pub const BLUE: Color = Color::Rgb(132, 160, 198);
    pub const CYAN: Color = Color::Rgb(137, 184, 194);
    pub const PURPLE: Color = Color::Rgb(160, 147, 199);
    pub const GREEN: Color = Color::Rgb(180, 190, 130);
    pub const YELLOW: Color = Color::Rgb(226, 164, 120);
    pub const RED: Color = Color::Rgb(226, 120, 120);

    /// Muted text: timestamps, hints, disabled controls
    pub const MUTED: Color = Color::Rgb(107, 112, 137);

    pub const BORDER: Color = Color::Rgb(60, 65, 90);

    /// Palette handed to renderers
    pub fn palette() -> ThemePalette {
        ThemePalette {
            bg: Self::BG,
            fg: Self::FG,
            panel_bg: Self::PANEL_BG,
            local_bubble: Self::LOCAL_BUBBLE,
            remote_bubble: Self::REMOTE_BUBBLE,
            accent: Self::BLUE,
            assistant: Self::CYAN,
            own: Self::PURPLE,
            live: Self::GREEN,
            warning: Self::YELLOW,
            error: Self::RED,
            muted: Self::MUTED,
            border: Self::BORDER,
        }
    }
}

/// Resolved colors used while drawing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub bg: Color,
    pub fg: Color,
    pub panel_bg: Color,
    pub local_bubble: Color,
    pub remote_bubble: Color,
    pub accent: Color,
    pub assistant: Color,
    pub own: Color,
    pub live: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
    pub border: Color,
}

/// Interpolate between two colors; `t` is clamped to `0.0..=1.0`
///
/// Terminals have no opacity, so fades are drawn by pulling the foreground
/// toward the background. Non-RGB colors snap at the halfway point.
pub fn blend(from: Color, to: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    match (from, to) {
        (Color::Rgb(r1, g1, b1), Color::Rgb(r2, g2, b2)) => {
            let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
            Color::Rgb(mix(r1, r2), mix(g1, g2), mix(b1, b2))
        }
        _ if t < 0.5 => from,
        _ => to,
    }
}
