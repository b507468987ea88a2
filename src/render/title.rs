use super::font::GlyphFont;
use super::{Canvas, ColorMode, clip, overlay_text};

const GOLD: (u8, u8, u8) = (255, 215, 0);
const OUTLINE: (u8, u8, u8) = (110, 70, 0);

/// Share of the canvas the card text may cover.
const MAX_WIDTH_FRAC: f64 = 0.92;
const MAX_HEIGHT_FRAC: f64 = 0.8;

/// How the winner card will be drawn on a given canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum CardLayout {
    /// Bitmap text at an integer scale, one or two lines
    Glyphs {
        lines: Vec<String>,
        scale: usize,
        scale_y: usize,
    },
    /// A single line of ordinary terminal text
    Plain(String),
}

/// "<name> WINS!" card shown after the wheel stops.
pub struct TitleCard {
    font: Option<GlyphFont>,
    winner: String,
}

impl TitleCard {
    pub fn new(font: Option<GlyphFont>, winner: &str) -> Self {
        TitleCard {
            font,
            winner: winner.to_string(),
        }
    }

    pub fn text(&self) -> String {
        format!("{} WINS!", self.winner)
    }

    /// One line if it fits at any scale, otherwise name and "WINS!" on two
    /// lines, otherwise plain text.
    pub fn layout(&self, canvas: &Canvas) -> CardLayout {
        let Some(font) = &self.font else {
            return CardLayout::Plain(self.text());
        };
        let aspect = canvas.render_mode.pixel_aspect();
        let candidates = [
            vec![self.text()],
            vec![self.winner.clone(), "WINS!".to_string()],
        ];

        candidates
            .into_iter()
            .find_map(|lines| {
                fit_scale(font, &lines, canvas.width, canvas.height, aspect).map(
                    |(scale, scale_y)| CardLayout::Glyphs {
                        lines,
                        scale,
                        scale_y,
                    },
                )
            })
            .unwrap_or_else(|| CardLayout::Plain(self.text()))
    }

    /// Draw the card. Glyph layouts go into the canvas; the returned string
    /// is a terminal overlay, empty unless the card fell back to plain text.
    pub fn paint(&self, canvas: &mut Canvas) -> String {
        match (self.layout(canvas), &self.font) {
            (
                CardLayout::Glyphs {
                    lines,
                    scale,
                    scale_y,
                },
                Some(font),
            ) => {
                let line_h = font.height() * scale_y;
                let gap = scale_y;
                let block_h = lines.len() * line_h + (lines.len() - 1) * gap;
                let mut y = (canvas.height as i64 - block_h as i64) / 2;
                let nudge = (scale / 3).max(1) as i64;
                let nudge_y = (scale_y / 3).max(1) as i64;

                for line in &lines {
                    let w = font.text_width(line) * scale;
                    let x = (canvas.width as i64 - w as i64) / 2;
                    for (dx, dy) in [(-1, -1), (-1, 1), (1, -1), (1, 1), (-1, 0), (1, 0), (0, -1), (0, 1)] {
                        font.draw(canvas, x + dx * nudge, y + dy * nudge_y, scale, scale_y, line, OUTLINE);
                    }
                    font.draw(canvas, x, y, scale, scale_y, line, GOLD);
                    y += (line_h + gap) as i64;
                }
                String::new()
            }
            (layout, _) => {
                let text = match layout {
                    CardLayout::Plain(t) => t,
                    CardLayout::Glyphs { .. } => self.text(),
                };
                let (cols, rows) = canvas.term_size();
                let text = clip(&text, cols);
                let len = text.chars().count();
                let mut out = String::new();
                let sgr = match canvas.color_mode {
                    ColorMode::Mono => "1".to_string(),
                    ColorMode::TrueColor => format!("1;38;2;{};{};{}", GOLD.0, GOLD.1, GOLD.2),
                    _ => "1;93".to_string(),
                };
                overlay_text(&mut out, rows / 2 + 1, (cols - len) / 2 + 1, &sgr, &text);
                out
            }
        }
    }
}

/// Largest integer scale at which `lines` fit the canvas, with the vertical
/// scale adjusted for pixel aspect. `None` if even scale 1 is too big.
fn fit_scale(
    font: &GlyphFont,
    lines: &[String],
    width: usize,
    height: usize,
    aspect: f64,
) -> Option<(usize, usize)> {
    let text_w = lines.iter().map(|l| font.text_width(l)).max()?;
    if text_w == 0 || font.height() == 0 {
        return None;
    }
    let max_w = width as f64 * MAX_WIDTH_FRAC;
    let max_h = height as f64 * MAX_HEIGHT_FRAC;
    let n = lines.len();

    let mut scale = (max_w / text_w as f64).floor() as usize;
    while scale >= 1 {
        let scale_y = ((scale as f64 / aspect).round() as usize).max(1);
        let block_h = n * font.height() * scale_y + (n - 1) * scale_y;
        if block_h as f64 <= max_h {
            return Some((scale, scale_y));
        }
        scale -= 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderMode;

    fn half_block(cols: usize, rows: usize) -> Canvas {
        Canvas::new(cols, rows, RenderMode::HalfBlock, ColorMode::TrueColor)
    }

    #[test]
    fn test_short_name_fits_on_one_line() {
        let card = TitleCard::new(Some(GlyphFont::builtin()), "Bo");
        let c = half_block(80, 24);
        match card.layout(&c) {
            CardLayout::Glyphs { lines, scale, scale_y } => {
                assert_eq!(lines, vec!["Bo WINS!"]);
                assert!(scale >= 1);
                assert_eq!(scale, scale_y);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_long_name_wraps_before_giving_up() {
        let card = TitleCard::new(Some(GlyphFont::builtin()), "Maximilian");
        // "Maximilian WINS!" is 93 px wide in the block font, "Maximilian" alone 59
        let c = half_block(70, 24);
        match card.layout(&c) {
            CardLayout::Glyphs { lines, .. } => assert_eq!(lines.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_falls_back_to_plain_text() {
        let tiny = half_block(10, 4);
        let card = TitleCard::new(Some(GlyphFont::builtin()), "Bartholomew");
        assert_eq!(card.layout(&tiny), CardLayout::Plain("Bartholomew WINS!".into()));

        let fontless = TitleCard::new(None, "Al");
        let mut c = half_block(40, 10);
        let overlay = fontless.paint(&mut c);
        assert!(overlay.contains("Al WINS!"));
        assert!(overlay.starts_with("\x1b[6;"));
        assert!(c.pixels.iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_glyph_card_draws_gold_pixels() {
        let card = TitleCard::new(Some(GlyphFont::builtin()), "Al");
        let mut c = half_block(80, 24);
        let overlay = card.paint(&mut c);
        assert!(overlay.is_empty());
        assert!(c.colors.iter().zip(&c.pixels).any(|(&rgb, &p)| p > 0.0 && rgb == GOLD));
        assert!(c.colors.iter().zip(&c.pixels).any(|(&rgb, &p)| p > 0.0 && rgb == OUTLINE));
    }

    #[test]
    fn test_ascii_mode_squashes_vertical_scale() {
        let card = TitleCard::new(Some(GlyphFont::builtin()), "Al");
        let c = Canvas::new(120, 40, RenderMode::Ascii, ColorMode::Mono);
        match card.layout(&c) {
            CardLayout::Glyphs { scale, scale_y, .. } => {
                assert!(scale > 1);
                assert_eq!(scale_y, ((scale as f64 / 2.0).round() as usize).max(1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
