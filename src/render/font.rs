//! Glyph fonts for the winner card.
//!
//! The renderer never goes looking for fonts itself; it is handed a
//! [`FontResolver`] and takes whatever that yields. `None` means "no font",
//! and the card falls back to plain terminal text.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::Canvas;

/// One bitmap glyph. Bit `x` of `rows[y]` is the pixel at column `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub advance: usize,
    pub rows: Vec<u64>,
}

impl Glyph {
    #[inline]
    pub fn lit(&self, x: usize, y: usize) -> bool {
        x < 64 && self.rows.get(y).is_some_and(|&r| (r >> x) & 1 == 1)
    }
}

/// A fixed-height bitmap font.
#[derive(Debug, Clone)]
pub struct GlyphFont {
    name: String,
    height: usize,
    glyphs: HashMap<char, Glyph>,
    /// Columns left blank between glyphs
    spacing: usize,
}

impl GlyphFont {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Glyph for `c`, falling back to its uppercase form and then '?'.
    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs
            .get(&c)
            .or_else(|| c.to_uppercase().next().and_then(|u| self.glyphs.get(&u)))
            .or_else(|| self.glyphs.get(&'?'))
    }

    /// Unscaled width of `text` in pixels.
    pub fn text_width(&self, text: &str) -> usize {
        let glyphs: Vec<usize> = text
            .chars()
            .map(|c| self.glyph(c).map_or(0, |g| g.advance))
            .collect();
        let gaps = glyphs.len().saturating_sub(1) * self.spacing;
        glyphs.iter().sum::<usize>() + gaps
    }

    /// Draw `text` with its top-left corner at (x, y), each font pixel
    /// becoming a `scale`×`scale` block (`scale_y` tall on stretched pixels).
    pub fn draw(
        &self,
        canvas: &mut Canvas,
        x: i64,
        y: i64,
        scale: usize,
        scale_y: usize,
        text: &str,
        rgb: (u8, u8, u8),
    ) {
        let mut pen_x = x;
        for c in text.chars() {
            let Some(g) = self.glyph(c) else { continue };
            for gy in 0..self.height {
                for gx in 0..g.advance {
                    if !g.lit(gx, gy) {
                        continue;
                    }
                    for sy in 0..scale_y {
                        for sx in 0..scale {
                            canvas.plot(
                                pen_x + (gx * scale + sx) as i64,
                                y + (gy * scale_y + sy) as i64,
                                rgb,
                            );
                        }
                    }
                }
            }
            pen_x += ((g.advance + self.spacing) * scale) as i64;
        }
    }

    /// The embedded 5×7 block font: digits, uppercase letters, a little punctuation.
    pub fn builtin() -> Self {
        let mut glyphs = HashMap::new();
        for &(c, rows) in BLOCK_GLYPHS {
            glyphs.insert(c, glyph_from_pattern(&rows));
        }
        glyphs.insert(
            ' ',
            Glyph {
                advance: 3,
                rows: vec![0; 7],
            },
        );
        GlyphFont {
            name: "block 5x7".into(),
            height: 7,
            glyphs,
            spacing: 1,
        }
    }

    /// Parse a BDF bitmap font. Glyphs are placed on the font bounding box so
    /// every glyph shares one baseline.
    pub fn from_bdf(name: &str, text: &str) -> io::Result<Self> {
        let bad = |msg: String| io::Error::new(io::ErrorKind::InvalidData, msg);
        let nums = |rest: &str| -> io::Result<Vec<i64>> {
            rest.split_whitespace()
                .map(|t| t.parse::<i64>().map_err(|e| bad(format!("bad number {:?}: {}", t, e))))
                .collect()
        };

        let mut lines = text.lines();
        let Some(first) = lines.next() else {
            return Err(bad("empty font file".into()));
        };
        if !first.starts_with("STARTFONT") {
            return Err(bad(format!("not a BDF font: {}", first)));
        }

        let mut bbox: Option<(i64, i64, i64, i64)> = None;
        let mut glyphs = HashMap::new();

        while let Some(line) = lines.next() {
            let (key, rest) = line.split_once(' ').unwrap_or((line, ""));
            match key {
                "FONTBOUNDINGBOX" => {
                    let v = nums(rest)?;
                    if v.len() != 4 {
                        return Err(bad("FONTBOUNDINGBOX needs 4 values".into()));
                    }
                    bbox = Some((v[0], v[1], v[2], v[3]));
                }
                "STARTCHAR" => {
                    let (_, fbb_h, fbb_x, fbb_y) =
                        bbox.ok_or_else(|| bad("STARTCHAR before FONTBOUNDINGBOX".into()))?;
                    let mut encoding: i64 = -1;
                    let mut advance: i64 = 0;
                    let mut bbx = (0, 0, 0, 0);
                    let mut rows = vec![0u64; fbb_h.max(0) as usize];

                    while let Some(line) = lines.next() {
                        let (key, rest) = line.split_once(' ').unwrap_or((line, ""));
                        match key {
                            "ENCODING" => encoding = nums(rest)?.first().copied().unwrap_or(-1),
                            "DWIDTH" => advance = nums(rest)?.first().copied().unwrap_or(0),
                            "BBX" => {
                                let v = nums(rest)?;
                                if v.len() != 4 {
                                    return Err(bad("BBX needs 4 values".into()));
                                }
                                bbx = (v[0], v[1], v[2], v[3]);
                            }
                            "BITMAP" => {
                                let (_, h, xoff, yoff) = bbx;
                                // Row of the glyph's top edge inside the font box.
                                let top = (fbb_h + fbb_y) - (yoff + h);
                                let shift = xoff - fbb_x;
                                for i in 0..h {
                                    let hex = lines
                                        .next()
                                        .ok_or_else(|| bad("truncated BITMAP".into()))?
                                        .trim();
                                    let bits = u64::from_str_radix(hex, 16)
                                        .map_err(|e| bad(format!("bad bitmap row {:?}: {}", hex, e)))?;
                                    let nbits = hex.len() as i64 * 4;
                                    let y = top + i;
                                    if y < 0 || y >= fbb_h {
                                        continue;
                                    }
                                    let mut row = 0u64;
                                    for col in 0..nbits.min(64) {
                                        if (bits >> (nbits - 1 - col)) & 1 == 1 {
                                            let x = col + shift;
                                            if (0..64).contains(&x) {
                                                row |= 1u64 << x;
                                            }
                                        }
                                    }
                                    rows[y as usize] |= row;
                                }
                            }
                            "ENDCHAR" => break,
                            _ => {}
                        }
                    }

                    let advance = if advance > 0 { advance } else { bbx.0 };
                    if let Some(c) = u32::try_from(encoding).ok().and_then(char::from_u32) {
                        glyphs.insert(
                            c,
                            Glyph {
                                advance: advance.clamp(0, 64) as usize,
                                rows,
                            },
                        );
                    }
                }
                _ => {}
            }
        }

        let (_, fbb_h, _, _) = bbox.ok_or_else(|| bad("missing FONTBOUNDINGBOX".into()))?;
        if glyphs.is_empty() {
            return Err(bad("font has no glyphs".into()));
        }
        Ok(GlyphFont {
            name: name.to_string(),
            height: fbb_h.max(0) as usize,
            glyphs,
            spacing: 0,
        })
    }

    pub fn load_bdf<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_bdf(&path.display().to_string(), &text)
    }
}

fn glyph_from_pattern(rows: &[&str]) -> Glyph {
    let advance = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let rows = rows
        .iter()
        .map(|r| {
            r.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'#')
                .fold(0u64, |acc, (x, _)| acc | (1u64 << x))
        })
        .collect();
    Glyph { advance, rows }
}

/// Supplies the title font, if one is available.
pub trait FontResolver {
    fn resolve(&self) -> Option<GlyphFont>;
}

/// Always the embedded block font.
pub struct BuiltinFont;

impl FontResolver for BuiltinFont {
    fn resolve(&self) -> Option<GlyphFont> {
        Some(GlyphFont::builtin())
    }
}

/// Never a font: the card is drawn as plain text.
pub struct NoFont;

impl FontResolver for NoFont {
    fn resolve(&self) -> Option<GlyphFont> {
        None
    }
}

/// First BDF file in `paths` that exists and parses.
pub struct BdfSearch {
    pub paths: Vec<PathBuf>,
}

impl FontResolver for BdfSearch {
    fn resolve(&self) -> Option<GlyphFont> {
        for path in &self.paths {
            let path = expand_home(path);
            if !path.is_file() {
                continue;
            }
            match GlyphFont::load_bdf(&path) {
                Ok(font) => return Some(font),
                Err(e) => log::warn!("Skipping font {}: {}", path.display(), e),
            }
        }
        None
    }
}

/// Tries each resolver in order.
pub struct FontChain(pub Vec<Box<dyn FontResolver>>);

impl FontResolver for FontChain {
    fn resolve(&self) -> Option<GlyphFont> {
        self.0.iter().find_map(|r| r.resolve())
    }
}

/// Font policy selectable from config and CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FontChoice {
    /// A BDF font from the search paths, else the block font
    #[default]
    Auto,
    /// The embedded block font
    Block,
    /// No font, plain text
    Plain,
}

pub fn resolver_for(choice: FontChoice, paths: &[PathBuf]) -> Box<dyn FontResolver> {
    match choice {
        FontChoice::Auto => Box::new(FontChain(vec![
            Box::new(BdfSearch {
                paths: paths.to_vec(),
            }),
            Box::new(BuiltinFont),
        ])),
        FontChoice::Block => Box::new(BuiltinFont),
        FontChoice::Plain => Box::new(NoFont),
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[rustfmt::skip]
const BLOCK_GLYPHS: &[(char, [&str; 7])] = &[
    ('A', [".###.", "#...#", "#...#", "#####", "#...#", "#...#", "#...#"]),
    ('B', ["####.", "#...#", "#...#", "####.", "#...#", "#...#", "####."]),
    ('C', [".###.", "#...#", "#....", "#....", "#....", "#...#", ".###."]),
    ('D', ["####.", "#...#", "#...#", "#...#", "#...#", "#...#", "####."]),
    ('E', ["#####", "#....", "#....", "####.", "#....", "#....", "#####"]),
    ('F', ["#####", "#....", "#....", "####.", "#....", "#....", "#...."]),
    ('G', [".###.", "#...#", "#....", "#.###", "#...#", "#...#", ".####"]),
    ('H', ["#...#", "#...#", "#...#", "#####", "#...#", "#...#", "#...#"]),
    ('I', [".###.", "..#..", "..#..", "..#..", "..#..", "..#..", ".###."]),
    ('J', ["..###", "...#.", "...#.", "...#.", "...#.", "#..#.", ".##.."]),
    ('K', ["#...#", "#..#.", "#.#..", "##...", "#.#..", "#..#.", "#...#"]),
    ('L', ["#....", "#....", "#....", "#....", "#....", "#....", "#####"]),
    ('M', ["#...#", "##.##", "#.#.#", "#.#.#", "#...#", "#...#", "#...#"]),
    ('N', ["#...#", "#...#", "##..#", "#.#.#", "#..##", "#...#", "#...#"]),
    ('O', [".###.", "#...#", "#...#", "#...#", "#...#", "#...#", ".###."]),
    ('P', ["####.", "#...#", "#...#", "####.", "#....", "#....", "#...."]),
    ('Q', [".###.", "#...#", "#...#", "#...#", "#.#.#", "#..#.", ".##.#"]),
    ('R', ["####.", "#...#", "#...#", "####.", "#.#..", "#..#.", "#...#"]),
    ('S', [".####", "#....", "#....", ".###.", "....#", "....#", "####."]),
    ('T', ["#####", "..#..", "..#..", "..#..", "..#..", "..#..", "..#.."]),
    ('U', ["#...#", "#...#", "#...#", "#...#", "#...#", "#...#", ".###."]),
    ('V', ["#...#", "#...#", "#...#", "#...#", "#...#", ".#.#.", "..#.."]),
    ('W', ["#...#", "#...#", "#...#", "#.#.#", "#.#.#", "#.#.#", ".#.#."]),
    ('X', ["#...#", "#...#", ".#.#.", "..#..", ".#.#.", "#...#", "#...#"]),
    ('Y', ["#...#", "#...#", ".#.#.", "..#..", "..#..", "..#..", "..#.."]),
    ('Z', ["#####", "....#", "...#.", "..#..", ".#...", "#....", "#####"]),
    ('0', [".###.", "#...#", "#..##", "#.#.#", "##..#", "#...#", ".###."]),
    ('1', ["..#..", ".##..", "..#..", "..#..", "..#..", "..#..", ".###."]),
    ('2', [".###.", "#...#", "....#", "...#.", "..#..", ".#...", "#####"]),
    ('3', ["####.", "....#", "....#", ".###.", "....#", "....#", "####."]),
    ('4', ["...#.", "..##.", ".#.#.", "#..#.", "#####", "...#.", "...#."]),
    ('5', ["#####", "#....", "####.", "....#", "....#", "#...#", ".###."]),
    ('6', ["..##.", ".#...", "#....", "####.", "#...#", "#...#", ".###."]),
    ('7', ["#####", "....#", "...#.", "..#..", ".#...", ".#...", ".#..."]),
    ('8', [".###.", "#...#", "#...#", ".###.", "#...#", "#...#", ".###."]),
    ('9', [".###.", "#...#", "#...#", ".####", "....#", "...#.", ".##.."]),
    ('!', ["..#..", "..#..", "..#..", "..#..", "..#..", ".....", "..#.."]),
    ('?', [".###.", "#...#", "....#", "...#.", "..#..", ".....", "..#.."]),
    ('.', [".....", ".....", ".....", ".....", ".....", ".##..", ".##.."]),
    (',', [".....", ".....", ".....", ".....", ".##..", "..#..", ".#..."]),
    (':', [".....", ".##..", ".##..", ".....", ".##..", ".##..", "....."]),
    ('-', [".....", ".....", ".....", ".###.", ".....", ".....", "....."]),
    ('_', [".....", ".....", ".....", ".....", ".....", ".....", "#####"]),
    ('\'', ["..#..", "..#..", ".#...", ".....", ".....", ".....", "....."]),
    ('&', [".##..", "#..#.", "#.#..", ".#...", "#.#.#", "#..#.", ".##.#"]),
    ('@', [".###.", "#...#", "#.###", "#.#.#", "#.###", "#....", ".###."]),
    ('#', [".#.#.", ".#.#.", "#####", ".#.#.", "#####", ".#.#.", ".#.#."]),
];
