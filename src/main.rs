mod config;
mod error;
mod labels;
mod record;
mod render;
mod spin;
mod timeline;

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor, execute, terminal,
    event::{self, Event, KeyCode, KeyEvent},
};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::Serialize;

use config::{Config, Settings};
use error::{Error, Result};
use render::font::{self, FontChoice};
use render::{ColorMode, RenderMode, Stage};
use spin::{Easing, SpinPlan};

#[derive(Parser)]
#[command(name = "spinwheel", version, about = "Spin a wheel of names and pick a winner")]
struct Cli {
    /// Names file, one per line (default: usernames.txt)
    labels: Option<PathBuf>,

    /// Render mode
    #[arg(short, long, value_enum)]
    render: Option<RenderMode>,

    /// Color mode
    #[arg(short, long, value_enum)]
    color: Option<ColorMode>,

    /// Frames per second (1-120)
    #[arg(short, long)]
    fps: Option<u32>,

    /// Seconds the wheel spins before stopping
    #[arg(short, long)]
    duration: Option<f64>,

    /// Seconds the stopped wheel stays on screen
    #[arg(long)]
    hold: Option<f64>,

    /// Seconds the winner card stays on screen
    #[arg(long)]
    winner_duration: Option<f64>,

    /// Full rotations before stopping
    #[arg(short, long)]
    turns: Option<u32>,

    /// Pointer position in degrees (0 = right, 90 = top)
    #[arg(long, allow_hyphen_values = true)]
    reference_angle: Option<f64>,

    /// Deceleration curve
    #[arg(short, long, value_enum)]
    easing: Option<Easing>,

    /// Winner card font
    #[arg(long, value_enum)]
    font: Option<FontChoice>,

    /// Don't draw names next to slices
    #[arg(long)]
    no_labels: bool,

    /// Hide the status bar
    #[arg(long)]
    clean: bool,

    /// Seed for the winner draw; reuse a printed seed to replay a spin
    #[arg(short, long)]
    seed: Option<u64>,

    /// Pick this slice (0-based) instead of drawing one
    #[arg(short, long)]
    winner: Option<usize>,

    /// Render headlessly to a .wheelanim recording instead of playing
    #[arg(long)]
    record: Option<PathBuf>,

    /// Play back a .wheelanim recording
    #[arg(long)]
    play: Option<PathBuf>,

    /// Frame size in terminal cells, e.g. 80x24 (default: terminal size)
    #[arg(long, value_parser = parse_size)]
    size: Option<(usize, usize)>,

    /// Print the wheel at rest and exit
    #[arg(long)]
    preview: bool,

    /// Print the planned spin as JSON and exit
    #[arg(long)]
    print_plan: bool,

    /// Print the config file path and exit
    #[arg(long)]
    show_config: bool,

    /// Write a commented default config file and exit
    #[arg(long)]
    init_config: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Flags that were actually given, as a config layer.
    fn overrides(&self) -> Config {
        Config {
            labels: self.labels.clone(),
            render: self.render,
            color: self.color,
            fps: self.fps,
            spin_duration: self.duration,
            hold_duration: self.hold,
            winner_duration: self.winner_duration,
            full_turns: self.turns,
            reference_angle: self.reference_angle,
            easing: self.easing,
            font: self.font,
            show_labels: self.no_labels.then_some(false),
            clean: self.clean.then_some(true),
            ..Config::default()
        }
    }
}

fn parse_size(s: &str) -> std::result::Result<(usize, usize), String> {
    let (c, r) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected COLSxROWS, got {:?}", s))?;
    let cols: usize = c.trim().parse().map_err(|_| format!("bad column count {:?}", c))?;
    let rows: usize = r.trim().parse().map_err(|_| format!("bad row count {:?}", r))?;
    if cols < 10 || rows < 5 {
        return Err("size must be at least 10x5".into());
    }
    Ok((cols, rows))
}

#[derive(Serialize)]
struct PlanReport<'a> {
    seed: u64,
    winner: &'a str,
    #[serde(flatten)]
    plan: &'a SpinPlan,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("spinwheel: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if cli.show_config {
        match config::config_path() {
            Some(p) => println!("{}", p.display()),
            None => return Err(Error::NoConfigDir),
        }
        return Ok(());
    }
    if cli.init_config {
        return init_config();
    }

    // Playback mode
    if let Some(ref path) = cli.play {
        let player = record::Player::load(path)?;
        log::info!(
            "Playing {} frames at {} fps ({} wins)",
            player.frame_count(),
            player.fps(),
            player.winner()
        );
        return Ok(player.play()?);
    }

    let settings = Settings::from_config(&config::load_config().overlay(cli.overrides()));
    let labels = labels::load_labels(&settings.labels_path)?;

    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    let params = settings.spin_params();
    let plan = match cli.winner {
        Some(index) => SpinPlan::with_winner(labels.len(), index, &params)?,
        None => SpinPlan::new(&labels, &mut rng, &params)?,
    };
    let winner = labels[plan.winner_index()].clone();
    log::info!(
        "Seed {} picked {:?} (slice {} of {})",
        seed,
        winner,
        plan.winner_index(),
        labels.len()
    );
    log::debug!(
        "Total rotation {:.2} deg over {:.2}s ({:?}), {} slices, pointer at {:.1} deg",
        plan.total_rotation_degrees(),
        plan.duration_seconds(),
        plan.easing(),
        plan.slice_count(),
        plan.reference_angle()
    );

    if cli.print_plan {
        let report = PlanReport {
            seed,
            winner: &winner,
            plan: &plan,
        };
        println!("{}", serde_json::to_string_pretty(&report).map_err(io::Error::from)?);
        return Ok(());
    }

    let (cols, rows) = cli.size.unwrap_or_else(|| {
        terminal::size()
            .map(|(c, r)| (c as usize, r as usize))
            .unwrap_or((80, 24))
    });
    let fonts = font::resolver_for(settings.font, &settings.font_paths);
    let clean = settings.clean;

    if cli.preview {
        let mut stage = Stage::new(settings, labels, plan, cols, rows.saturating_sub(1), fonts.as_ref());
        let mut stdout = io::stdout();
        write!(stdout, "\x1b[2J\x1b[H{}\x1b[{};1H", stage.render_still(0.0), rows)?;
        stdout.flush()?;
        return Ok(());
    }

    if let Some(ref path) = cli.record {
        let mut stage = Stage::new(settings, labels, plan, cols, rows, fonts.as_ref());
        let mut rec = record::Recorder::new(stage.timeline().fps(), stage.winner());
        for frame in 0..stage.timeline().len() {
            let ts = stage.timeline().timestamp_ms(frame);
            rec.capture(ts, &stage.render_frame(frame));
        }
        rec.save(path)?;
        log::info!("Recording written to {}", path.display());
        println!("Saved {} frames to {}", rec.frame_count(), path.display());
        println!("Winner: {} (seed {})", winner, seed);
        return Ok(());
    }

    // Reserve 1 row for status bar
    let display_rows = if clean { rows } else { rows.saturating_sub(1) };
    let mut stage = Stage::new(settings, labels, plan, cols, display_rows, fonts.as_ref());

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    let mut writer = BufWriter::with_capacity(256 * 1024, stdout);
    let result = run_loop(&mut writer, &mut stage, seed);

    // Cleanup
    execute!(writer, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    let finished = result?;
    if !finished {
        println!("Spin skipped.");
    }
    println!("Winner: {} (seed {})", winner, seed);
    Ok(())
}

fn init_config() -> Result<()> {
    let path = config::config_path().ok_or(Error::NoConfigDir)?;
    if path.exists() {
        return Err(Error::ConfigExists(path));
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&path, config::default_config_string())?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Play every frame of the stage's timeline. Returns `false` if the user quit early.
fn run_loop(stdout: &mut BufWriter<io::Stdout>, stage: &mut Stage, seed: u64) -> io::Result<bool> {
    if stage.timeline().is_empty() {
        return Ok(true);
    }
    let total = stage.timeline().len();
    let clean = stage.settings().clean;
    let (mut cols, mut rows) = terminal::size()?;
    let start = Instant::now();

    for frame in 0..total {
        // Handle input (non-blocking)
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Resize(w, h) if w >= 10 && h >= 5 => {
                    cols = w;
                    rows = h;
                    let display_rows = if clean { h } else { h.saturating_sub(1) };
                    stage.resize(w as usize, display_rows as usize);
                    write!(stdout, "\x1b[2J\x1b[H")?;
                }
                Event::Key(KeyEvent {
                    code: KeyCode::Char('q') | KeyCode::Esc,
                    ..
                }) => return Ok(false),
                _ => {}
            }
        }

        let content = stage.render_frame(frame);
        stdout.write_all(b"\x1b[H")?;
        stdout.write_all(content.as_bytes())?;

        if !clean {
            let status = format!(
                " spinwheel | ▼ {} | seed {} | {}/{} | [q] quit ",
                stage.pointer_label(frame),
                seed,
                frame + 1,
                total,
            );
            let w = cols as usize;
            let truncated: String = status.chars().take(w).collect();
            let padded = format!("{:<width$}", truncated, width = w);
            write!(stdout, "\x1b[{};1H\x1b[7m{}\x1b[0m", rows, padded)?;
        }

        // Single flush per frame
        stdout.flush()?;

        // Sleep until the next frame is due
        let due = Duration::from_millis(stage.timeline().timestamp_ms(frame + 1));
        let elapsed = start.elapsed();
        if elapsed < due {
            std::thread::sleep(due - elapsed);
        }
    }
    Ok(true)
}
