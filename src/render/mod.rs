pub mod canvas;
pub mod font;
pub mod halfblock;
pub mod stage;
pub mod title;
pub mod wheel;

pub use canvas::Canvas;
pub use stage::Stage;

use serde::Deserialize;

/// How to render sub-cell pixels to terminal characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// Half-block characters ▀ (1x2 pixels per cell, colored wheel)
    HalfBlock,
    /// Plain ASCII characters with density mapping
    Ascii,
}

impl RenderMode {
    /// Pixels per terminal cell as (columns, rows)
    pub fn cell_pixels(self) -> (usize, usize) {
        match self {
            RenderMode::HalfBlock => (1, 2),
            RenderMode::Ascii => (1, 1),
        }
    }

    /// Height of one pixel relative to its width, assuming cells twice as
    /// tall as they are wide.
    pub fn pixel_aspect(self) -> f64 {
        match self {
            RenderMode::HalfBlock => 1.0,
            RenderMode::Ascii => 2.0,
        }
    }
}

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
    /// No color, monochrome
    Mono,
    /// ANSI 16 colors
    Ansi16,
    /// 256-color palette
    Ansi256,
    /// 24-bit true color (RGB)
    TrueColor,
}

/// Write `text` at a 1-based terminal cell, in the given SGR style, and reset.
pub fn overlay_text(out: &mut String, row: usize, col: usize, sgr: &str, text: &str) {
    out.push_str(&format!("\x1b[{};{}H", row, col));
    if !sgr.is_empty() {
        out.push_str("\x1b[");
        out.push_str(sgr);
        out.push('m');
    }
    out.push_str(text);
    out.push_str("\x1b[0m");
}

/// Truncate to at most `max` characters, marking the cut with '…'.
pub fn clip(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut s: String = text.chars().take(max - 1).collect();
    s.push('…');
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_marks_truncation() {
        assert_eq!(clip("alexandria", 5), "alex…");
        assert_eq!(clip("bo", 5), "bo");
        assert_eq!(clip("bo", 0), "");
    }

    #[test]
    fn test_overlay_positions_and_resets() {
        let mut out = String::new();
        overlay_text(&mut out, 3, 7, "1;33", "hi");
        assert_eq!(out, "\x1b[3;7H\x1b[1;33mhi\x1b[0m");
    }
}
