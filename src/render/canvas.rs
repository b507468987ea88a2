use super::{ColorMode, RenderMode};
use crossterm::style::Color;

/// A pixel-level canvas that gets rendered to terminal characters.
/// Coordinates are in "sub-cell" pixel space.
pub struct Canvas {
    /// Width in pixels (sub-cell)
    pub width: usize,
    /// Height in pixels (sub-cell)
    pub height: usize,
    /// Pixel data: brightness 0.0..=1.0
    pub pixels: Vec<f64>,
    /// Per-pixel color
    pub colors: Vec<(u8, u8, u8)>,
    pub render_mode: RenderMode,
    pub color_mode: ColorMode,
    /// Color quantization step (0 = off, 4/8/16 = round RGB to nearest N).
    pub color_quant: u8,
}

impl Canvas {
    pub fn new(
        term_cols: usize,
        term_rows: usize,
        render_mode: RenderMode,
        color_mode: ColorMode,
    ) -> Self {
        let (cw, ch) = render_mode.cell_pixels();
        let (px_w, px_h) = (term_cols * cw, term_rows * ch);
        let size = px_w * px_h;
        Canvas {
            width: px_w,
            height: px_h,
            pixels: vec![0.0; size],
            colors: vec![(255, 255, 255); size],
            render_mode,
            color_mode,
            color_quant: 0,
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0.0);
        self.colors.fill((255, 255, 255));
    }

    /// Set a pixel with color. Bounds-checked.
    #[inline]
    pub fn set_colored(&mut self, x: usize, y: usize, brightness: f64, r: u8, g: u8, b: u8) {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            self.pixels[idx] = brightness;
            self.colors[idx] = (r, g, b);
        }
    }

    /// Signed-coordinate variant of [`Canvas::set_colored`]; off-canvas points are dropped.
    #[inline]
    pub fn plot(&mut self, x: i64, y: i64, rgb: (u8, u8, u8)) {
        if x >= 0 && y >= 0 {
            self.set_colored(x as usize, y as usize, 1.0, rgb.0, rgb.1, rgb.2);
        }
    }

    #[cfg(test)]
    pub fn get(&self, x: usize, y: usize) -> Option<(f64, (u8, u8, u8))> {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            Some((self.pixels[idx], self.colors[idx]))
        } else {
            None
        }
    }

    /// Terminal dimensions covered by this canvas
    pub fn term_size(&self) -> (usize, usize) {
        let (cw, ch) = self.render_mode.cell_pixels();
        (self.width / cw, self.height / ch)
    }

    /// Terminal cell (0-based column, row) holding pixel (x, y)
    pub fn cell_of(&self, x: f64, y: f64) -> (i64, i64) {
        let (cw, ch) = self.render_mode.cell_pixels();
        (
            (x / cw as f64).floor() as i64,
            (y / ch as f64).floor() as i64,
        )
    }

    /// Render the canvas to a string buffer for output
    pub fn render(&self) -> String {
        match self.render_mode {
            RenderMode::HalfBlock => super::halfblock::render(self),
            RenderMode::Ascii => self.render_ascii(),
        }
    }

    fn render_ascii(&self) -> String {
        const CHARS: &[u8] = b" .:-=+*#%@";
        let (cols, rows) = self.term_size();
        let mut out = String::with_capacity(cols * rows * 10);
        let use_color = self.color_mode != ColorMode::Mono;
        let mut last_fg = String::new();

        for row in 0..rows {
            for col in 0..cols {
                let idx = row * self.width + col;
                let v = self.pixels[idx].clamp(0.0, 1.0);
                let ch = CHARS[(v * (CHARS.len() - 1) as f64) as usize] as char;

                if use_color && ch != ' ' {
                    let (r, g, b) = self.colors[idx];
                    let fg = color_to_fg(self.map_color(r, g, b));
                    if fg != last_fg {
                        out.push_str("\x1b[");
                        out.push_str(&fg);
                        out.push('m');
                        last_fg = fg;
                    }
                }
                out.push(ch);
            }
            out.push_str("\x1b[0m\x1b[");
            out.push_str(&(row + 2).to_string());
            out.push_str(";1H");
            last_fg.clear();
        }
        out
    }

    /// Scale every pixel's brightness by `intensity` (1.0 = unchanged, 0.0 = black).
    pub fn fade(&mut self, intensity: f64) {
        if (intensity - 1.0).abs() > 1e-10 {
            let k = intensity.clamp(0.0, 1.0);
            for p in &mut self.pixels {
                *p *= k;
            }
        }
    }

    pub fn map_color(&self, r: u8, g: u8, b: u8) -> Color {
        let (r, g, b) = if self.color_quant > 1 {
            let q = self.color_quant as u16;
            (
                ((r as u16 + q / 2) / q * q).min(255) as u8,
                ((g as u16 + q / 2) / q * q).min(255) as u8,
                ((b as u16 + q / 2) / q * q).min(255) as u8,
            )
        } else {
            (r, g, b)
        };
        match self.color_mode {
            ColorMode::Mono => Color::White,
            ColorMode::TrueColor => Color::Rgb { r, g, b },
            ColorMode::Ansi256 => {
                let idx = 16 + (36 * (r as u16 / 51)) + (6 * (g as u16 / 51)) + (b as u16 / 51);
                Color::AnsiValue(idx as u8)
            }
            ColorMode::Ansi16 => nearest_ansi16(r, g, b),
        }
    }
}

fn nearest_ansi16(r: u8, g: u8, b: u8) -> Color {
    let brightness = (r as u16 + g as u16 + b as u16) / 3;
    if brightness < 40 {
        return Color::Black;
    }
    // Dominant channels pick the hue; two close channels give the mixed hues
    // (yellow, cyan, magenta) that slice palettes lean on.
    let hi = r.max(g).max(b) as i16;
    let bright = hi > 200;
    let near = |c: u8| hi - c as i16 <= 40;
    match (near(r), near(g), near(b)) {
        (true, true, true) => {
            if bright {
                Color::White
            } else {
                Color::Grey
            }
        }
        (true, true, false) => pick(bright, Color::Yellow, Color::DarkYellow),
        (false, true, true) => pick(bright, Color::Cyan, Color::DarkCyan),
        (true, false, true) => pick(bright, Color::Magenta, Color::DarkMagenta),
        (true, false, false) => pick(bright, Color::Red, Color::DarkRed),
        (false, true, false) => pick(bright, Color::Green, Color::DarkGreen),
        _ => pick(bright, Color::Blue, Color::DarkBlue),
    }
}

fn pick(bright: bool, light: Color, dark: Color) -> Color {
    if bright { light } else { dark }
}

pub fn color_to_fg(color: Color) -> String {
    match color {
        Color::Rgb { r, g, b } => format!("38;2;{};{};{}", r, g, b),
        Color::AnsiValue(v) => format!("38;5;{}", v),
        Color::Black => "30".into(),
        Color::DarkRed => "31".into(),
        Color::DarkGreen => "32".into(),
        Color::DarkYellow => "33".into(),
        Color::DarkBlue => "34".into(),
        Color::DarkMagenta => "35".into(),
        Color::DarkCyan => "36".into(),
        Color::Grey => "37".into(),
        Color::DarkGrey => "90".into(),
        Color::Red => "91".into(),
        Color::Green => "92".into(),
        Color::Yellow => "93".into(),
        Color::Blue => "94".into(),
        Color::Magenta => "95".into(),
        Color::Cyan => "96".into(),
        Color::White => "97".into(),
        _ => "37".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_block_doubles_rows() {
        let c = Canvas::new(40, 12, RenderMode::HalfBlock, ColorMode::TrueColor);
        assert_eq!((c.width, c.height), (40, 24));
        assert_eq!(c.term_size(), (40, 12));
        assert_eq!(c.cell_of(5.0, 7.0), (5, 3));
    }

    #[test]
    fn test_out_of_bounds_writes_are_ignored() {
        let mut c = Canvas::new(4, 4, RenderMode::Ascii, ColorMode::Mono);
        c.set_colored(10, 10, 1.0, 1, 2, 3);
        c.plot(-1, 2, (9, 9, 9));
        assert!(c.pixels.iter().all(|&p| p == 0.0));
        assert!(c.get(10, 0).is_none());
    }

    #[test]
    fn test_fade_scales_brightness() {
        let mut c = Canvas::new(2, 1, RenderMode::Ascii, ColorMode::Mono);
        c.set_colored(0, 0, 0.8, 255, 0, 0);
        c.fade(0.5);
        assert!((c.pixels[0] - 0.4).abs() < 1e-12);
        c.fade(-1.0);
        assert_eq!(c.pixels[0], 0.0);
    }

    #[test]
    fn test_ascii_render_has_one_line_per_row() {
        let mut c = Canvas::new(3, 2, RenderMode::Ascii, ColorMode::Mono);
        c.set_colored(1, 0, 1.0, 255, 255, 255);
        let out = c.render();
        assert!(out.starts_with(" @ "));
        assert!(out.contains("\x1b[3;1H"));
    }

    #[test]
    fn test_ansi16_recognises_mixed_hues() {
        let c = Canvas::new(1, 1, RenderMode::Ascii, ColorMode::Ansi16);
        assert_eq!(c.map_color(255, 215, 0), Color::Yellow);
        assert_eq!(c.map_color(10, 10, 10), Color::Black);
        assert_eq!(c.map_color(220, 40, 40), Color::Red);
    }
}
