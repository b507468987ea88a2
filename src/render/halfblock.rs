use super::ColorMode;
use super::canvas::{Canvas, color_to_fg};
use crossterm::style::Color;

fn color_to_bg(color: Color) -> String {
    // Background SGR codes are the foreground ones shifted by 10.
    let fg = color_to_fg(color);
    match fg.split_once(';') {
        Some(("38", rest)) => format!("48;{}", rest),
        _ => match fg.parse::<u8>() {
            Ok(code) => (code + 10).to_string(),
            Err(_) => "40".into(),
        },
    }
}

/// Pixel brightness below which a half is treated as background.
const DARK_THRESHOLD: f64 = 0.02;

/// Tracks the active SGR state so repeated colors cost nothing.
#[derive(Default)]
struct Pen {
    fg: String,
    bg: String,
    active: bool,
}

impl Pen {
    fn set(&mut self, out: &mut String, fg: String, bg: Option<String>) {
        let bg = bg.unwrap_or_else(|| "49".into());
        let mut params: Vec<&str> = Vec::with_capacity(2);
        if fg != self.fg {
            params.push(&fg);
        }
        if bg != self.bg {
            params.push(&bg);
        }
        if !params.is_empty() {
            out.push_str("\x1b[");
            out.push_str(&params.join(";"));
            out.push('m');
        }
        self.fg = fg;
        self.bg = bg;
        self.active = true;
    }

    fn reset(&mut self, out: &mut String) {
        if self.active {
            out.push_str("\x1b[0m");
            *self = Pen::default();
        }
    }
}

pub fn render(canvas: &Canvas) -> String {
    let (term_cols, term_rows) = canvas.term_size();
    let mut out = String::with_capacity(term_cols * term_rows * 12);
    let mut pen = Pen::default();

    let shade = |idx: usize| -> Option<Color> {
        let v = canvas.pixels[idx];
        if v < DARK_THRESHOLD {
            return None;
        }
        let (r, g, b) = canvas.colors[idx];
        let s = |c: u8| (c as f64 * v.clamp(0.0, 1.0)) as u8;
        Some(canvas.map_color(s(r), s(g), s(b)))
    };

    for row in 0..term_rows {
        for col in 0..term_cols {
            let top_idx = row * 2 * canvas.width + col;
            let bot_idx = top_idx + canvas.width;

            if canvas.color_mode == ColorMode::Mono {
                let top = canvas.pixels[top_idx] >= DARK_THRESHOLD;
                let bot = canvas.pixels[bot_idx] >= DARK_THRESHOLD;
                out.push(match (top, bot) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                });
                continue;
            }

            match (shade(top_idx), shade(bot_idx)) {
                (None, None) => {
                    pen.reset(&mut out);
                    out.push(' ');
                }
                (Some(top), bot) => {
                    pen.set(&mut out, color_to_fg(top), bot.map(color_to_bg));
                    out.push('▀');
                }
                (None, Some(bot)) => {
                    pen.set(&mut out, color_to_fg(bot), None);
                    out.push('▄');
                }
            }
        }
        pen.reset(&mut out);
        out.push_str(&format!("\x1b[{};1H", row + 2));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderMode;

    #[test]
    fn test_background_codes() {
        assert_eq!(color_to_bg(Color::Rgb { r: 1, g: 2, b: 3 }), "48;2;1;2;3");
        assert_eq!(color_to_bg(Color::AnsiValue(200)), "48;5;200");
        assert_eq!(color_to_bg(Color::DarkRed), "41");
        assert_eq!(color_to_bg(Color::White), "107");
    }

    #[test]
    fn test_top_and_bottom_halves_pick_glyphs() {
        let mut c = Canvas::new(3, 1, RenderMode::HalfBlock, ColorMode::Mono);
        c.set_colored(0, 0, 1.0, 255, 255, 255);
        c.set_colored(1, 1, 1.0, 255, 255, 255);
        c.set_colored(2, 0, 1.0, 255, 255, 255);
        c.set_colored(2, 1, 1.0, 255, 255, 255);
        let out = render(&c);
        assert!(out.starts_with("▀▄█"));
    }

    #[test]
    fn test_repeated_color_is_not_reemitted() {
        let mut c = Canvas::new(4, 1, RenderMode::HalfBlock, ColorMode::TrueColor);
        for x in 0..4 {
            c.set_colored(x, 0, 1.0, 10, 20, 30);
        }
        let out = render(&c);
        assert_eq!(out.matches("38;2;10;20;30").count(), 1);
    }
}
