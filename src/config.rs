use crate::render::font::FontChoice;
use crate::render::{ColorMode, RenderMode};
use crate::spin::{Easing, SpinParams};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_LABELS_FILE: &str = "usernames.txt";
pub const DEFAULT_FPS: u32 = 30;
pub const DEFAULT_SPIN_DURATION: f64 = 6.0;
pub const DEFAULT_HOLD_DURATION: f64 = 2.0;
pub const DEFAULT_WINNER_DURATION: f64 = 4.0;
pub const DEFAULT_FADE_OUT: f64 = 0.6;
pub const DEFAULT_FULL_TURNS: u32 = 4;
/// Longest any single phase (spin, hold, winner card, fade) may run, in seconds.
pub const MAX_PHASE_SECONDS: f64 = 3600.0;
/// Top of the screen: 0 deg is 3 o'clock and angles grow counter-clockwise.
pub const DEFAULT_REFERENCE_ANGLE: f64 = 90.0;

/// User configuration loaded from config file.
/// All fields are optional. CLI flags override config, config overrides defaults.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Names file, one label per line
    pub labels: Option<PathBuf>,
    /// Render mode
    pub render: Option<RenderMode>,
    /// Color mode
    pub color: Option<ColorMode>,
    /// Frames per second (1-120)
    pub fps: Option<u32>,
    /// Seconds the wheel spins before stopping
    pub spin_duration: Option<f64>,
    /// Seconds the stopped wheel stays on screen
    pub hold_duration: Option<f64>,
    /// Seconds the winner card stays on screen
    pub winner_duration: Option<f64>,
    /// Seconds of fade at the end of the hold
    pub fade_out: Option<f64>,
    /// Whole extra rotations before stopping
    pub full_turns: Option<u32>,
    /// Pointer position in degrees (0 = right, 90 = top)
    pub reference_angle: Option<f64>,
    pub easing: Option<Easing>,
    /// Draw names next to their slices
    pub show_labels: Option<bool>,
    /// Hide status bar
    pub clean: Option<bool>,
    /// Color quantization step (0 = off, 4/8/16 = coarser colors for less output)
    pub color_quant: Option<u8>,
    /// Title card font: auto, block, plain
    pub font: Option<FontChoice>,
    /// BDF fonts to try, in order, when font = "auto"
    pub font_paths: Option<Vec<PathBuf>>,
}

impl Config {
    /// Layer `over` on top of `self`; any field set in `over` wins.
    pub fn overlay(self, over: Config) -> Config {
        Config {
            labels: over.labels.or(self.labels),
            render: over.render.or(self.render),
            color: over.color.or(self.color),
            fps: over.fps.or(self.fps),
            spin_duration: over.spin_duration.or(self.spin_duration),
            hold_duration: over.hold_duration.or(self.hold_duration),
            winner_duration: over.winner_duration.or(self.winner_duration),
            fade_out: over.fade_out.or(self.fade_out),
            full_turns: over.full_turns.or(self.full_turns),
            reference_angle: over.reference_angle.or(self.reference_angle),
            easing: over.easing.or(self.easing),
            show_labels: over.show_labels.or(self.show_labels),
            clean: over.clean.or(self.clean),
            color_quant: over.color_quant.or(self.color_quant),
            font: over.font.or(self.font),
            font_paths: over.font_paths.or(self.font_paths),
        }
    }
}

/// Fully resolved settings handed to the renderer. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub labels_path: PathBuf,
    pub render_mode: RenderMode,
    pub color_mode: ColorMode,
    pub color_quant: u8,
    pub fps: u32,
    pub spin_duration: f64,
    pub hold_duration: f64,
    pub winner_duration: f64,
    pub fade_out: f64,
    pub full_turns: u32,
    pub reference_angle: f64,
    pub easing: Easing,
    pub show_labels: bool,
    pub clean: bool,
    pub font: FontChoice,
    pub font_paths: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from_config(&Config::default())
    }
}

impl Settings {
    /// Fill every unset field with its default and clamp ranges.
    /// The spin duration only gets an upper bound; the planner rejects
    /// zero, negative and NaN values.
    pub fn from_config(c: &Config) -> Self {
        Settings {
            labels_path: c
                .labels
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LABELS_FILE)),
            render_mode: c.render.unwrap_or(RenderMode::HalfBlock),
            color_mode: c.color.unwrap_or(ColorMode::TrueColor),
            color_quant: c.color_quant.unwrap_or(0),
            fps: c.fps.unwrap_or(DEFAULT_FPS).clamp(1, 120),
            spin_duration: at_most_max_phase(c.spin_duration.unwrap_or(DEFAULT_SPIN_DURATION)),
            hold_duration: non_negative(c.hold_duration.unwrap_or(DEFAULT_HOLD_DURATION)),
            winner_duration: non_negative(c.winner_duration.unwrap_or(DEFAULT_WINNER_DURATION)),
            fade_out: non_negative(c.fade_out.unwrap_or(DEFAULT_FADE_OUT)),
            full_turns: c.full_turns.unwrap_or(DEFAULT_FULL_TURNS),
            reference_angle: c.reference_angle.unwrap_or(DEFAULT_REFERENCE_ANGLE),
            easing: c.easing.unwrap_or_default(),
            show_labels: c.show_labels.unwrap_or(true),
            clean: c.clean.unwrap_or(false),
            font: c.font.unwrap_or_default(),
            font_paths: c.font_paths.clone().unwrap_or_else(default_font_paths),
        }
    }

    pub fn spin_params(&self) -> SpinParams {
        SpinParams {
            full_turns: self.full_turns,
            reference_angle: self.reference_angle,
            duration: self.spin_duration,
            easing: self.easing,
        }
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, MAX_PHASE_SECONDS) } else { 0.0 }
}

fn at_most_max_phase(v: f64) -> f64 {
    if v > MAX_PHASE_SECONDS { MAX_PHASE_SECONDS } else { v }
}

/// BDF fonts searched when no `font_paths` are configured.
pub fn default_font_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = config_dir() {
        paths.push(dir.join("font.bdf"));
    }
    paths.push(PathBuf::from("/usr/share/fonts/misc/spleen-12x24.bdf"));
    paths.push(PathBuf::from("/usr/local/share/fonts/spinwheel.bdf"));
    paths
}

fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("spinwheel"))
}

/// Get the config file path: ~/.config/spinwheel/config.toml
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Parse config text. Errors are logged and yield the default config.
pub fn parse_config(contents: &str, origin: &str) -> Config {
    match toml::from_str(contents) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Failed to parse {}: {}", origin, e);
            Config::default()
        }
    }
}

/// Load config from file. Returns default config if file doesn't exist.
pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let Ok(contents) = std::fs::read_to_string(&path) else {
        log::debug!("No config at {}", path.display());
        return Config::default();
    };
    log::info!("Using config {}", path.display());
    parse_config(&contents, &path.display().to_string())
}

/// Generate a default config file with all options commented out
pub fn default_config_string() -> String {
    r#"# spinwheel configuration
# Use --show-config to see the active config file path.
# CLI flags override these settings.

# Names file, one name per line
# labels = "usernames.txt"

# Render mode: half-block, ascii
# render = "half-block"

# Color mode: mono, ansi16, ansi256, true-color
# color = "true-color"

# Frames per second (1-120)
# fps = 30

# Seconds the wheel spins (fast -> slow -> stop)
# spin_duration = 6.0

# Seconds the stopped wheel stays visible
# hold_duration = 2.0

# Seconds the winner card is shown
# winner_duration = 4.0

# Seconds of fade before the winner card
# fade_out = 0.6

# Full rotations before stopping
# full_turns = 4

# Pointer position in degrees: 0 = right, 90 = top, 180 = left, 270 = bottom
# reference_angle = 90.0

# Deceleration curve: cubic-out, quad-out, quint-out, linear
# easing = "cubic-out"

# Draw names next to their slices
# show_labels = true

# Hide status bar
# clean = false

# Color quantization step (0 = off, 4/8/16 = coarser colors, less output)
# color_quant = 0

# Winner card font: auto (BDF from font_paths, then block), block, plain
# font = "auto"
# font_paths = ["~/.config/spinwheel/font.bdf"]
"#
    .to_string()
}
