//! ANSI SGR sequences used by the renderer.

/// Resets all styling.
pub const RESET: &str = "\x1b[0m";

/// Faint intensity, used for the time segment and attribute keys.
pub const FAINT: &str = "\x1b[2m";

/// Back to normal intensity while keeping the active color; used between a
/// highlighted key and its value.
pub const UNFAINT: &str = "\x1b[22m";

/// Foreground parameter for the INF mnemonic (bright green).
pub const GREEN: &str = "92";
/// Foreground parameter for the WRN mnemonic (yellow).
pub const YELLOW: &str = "33";
/// Foreground parameter for the ERR mnemonic and error fields (bright red).
pub const RED: &str = "91";

/// Returns the SGR foreground parameter for a color index: `30-37` for the
/// basic colors, `90-97` for the bright ones, `38;5;n` beyond.
#[must_use]
pub fn fg_params(color: u8) -> String {
    match color {
        0..=7 => (30 + u16::from(color)).to_string(),
        8..=15 => (82 + u16::from(color)).to_string(),
        _ => format!("38;5;{color}"),
    }
}
