use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use crossterm::{cursor, execute, terminal};

const MAGIC: &str = "WHEELANIM v1";

/// A single recorded frame with its timestamp.
#[derive(Debug, Clone, PartialEq)]
struct Frame {
    timestamp_ms: u64,
    content: String,
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

/// Collects rendered frames of a spin for later playback.
pub struct Recorder {
    fps: u32,
    winner: String,
    frames: Vec<Frame>,
}

impl Recorder {
    pub fn new(fps: u32, winner: &str) -> Self {
        Recorder {
            fps,
            winner: winner.to_string(),
            frames: Vec::new(),
        }
    }

    /// Record a rendered frame shown at `timestamp_ms`.
    pub fn capture(&mut self, timestamp_ms: u64, content: &str) {
        self.frames.push(Frame {
            timestamp_ms,
            content: content.to_string(),
        });
    }

    /// Number of frames recorded.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Write the recording.
    ///
    /// Format:
    /// ```text
    /// WHEELANIM v1
    /// FPS <fps>
    /// WINNER <winner label (base64)>
    /// FRAMES <count>
    /// ---
    /// T <timestamp_ms>
    /// <frame content (base64)>
    /// ---
    /// ...
    /// ```
    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "{}", MAGIC)?;
        writeln!(w, "FPS {}", self.fps)?;
        writeln!(w, "WINNER {}", B64.encode(self.winner.as_bytes()))?;
        writeln!(w, "FRAMES {}", self.frames.len())?;
        for frame in &self.frames {
            writeln!(w, "---")?;
            writeln!(w, "T {}", frame.timestamp_ms)?;
            writeln!(w, "{}", B64.encode(frame.content.as_bytes()))?;
        }
        w.flush()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }
}

/// Plays back a recorded spin.
pub struct Player {
    fps: u32,
    winner: String,
    frames: Vec<Frame>,
}

fn header_field(line: Option<io::Result<String>>, key: &str) -> io::Result<String> {
    let line = line.ok_or_else(|| invalid(format!("Missing {}", key.trim())))??;
    line.strip_prefix(key)
        .map(str::to_string)
        .ok_or_else(|| invalid(format!("Expected {}, got: {}", key.trim(), line)))
}

fn decode_text(encoded: &str) -> io::Result<String> {
    let bytes = B64
        .decode(encoded.trim())
        .map_err(|e| invalid(format!("Base64 decode error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| invalid(format!("UTF-8 error: {}", e)))
}

impl Player {
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Self::read_from(BufReader::new(File::open(path)?))
    }

    pub fn read_from<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut lines = reader.lines();

        let header = lines.next().ok_or_else(|| invalid("Missing header"))??;
        if header != MAGIC {
            return Err(invalid(format!("Invalid header: {}", header)));
        }
        let fps: u32 = header_field(lines.next(), "FPS ")?
            .parse()
            .map_err(|_| invalid("Invalid FPS"))?;
        let winner = decode_text(&header_field(lines.next(), "WINNER ")?)?;
        let expected: usize = header_field(lines.next(), "FRAMES ")?
            .parse()
            .map_err(|_| invalid("Invalid frame count"))?;

        let mut frames = Vec::with_capacity(expected.min(4096));
        while let Some(line) = lines.next() {
            if line? != "---" {
                continue;
            }
            let timestamp_ms: u64 = header_field(lines.next(), "T ")?
                .parse()
                .map_err(|_| invalid("Invalid timestamp"))?;
            let encoded = lines
                .next()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "Missing frame content"))??;
            frames.push(Frame {
                timestamp_ms,
                content: decode_text(&encoded)?,
            });
        }

        if frames.len() != expected {
            return Err(invalid(format!(
                "Expected {} frames, found {}",
                expected,
                frames.len()
            )));
        }
        Ok(Player { fps, winner, frames })
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn winner(&self) -> &str {
        &self.winner
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Play back the recording to the terminal. `q`/`Esc` stops early.
    pub fn play(&self) -> io::Result<()> {
        if self.frames.is_empty() {
            println!("No frames to play.");
            return Ok(());
        }

        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.play_frames(&mut stdout);

        execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;
        result?;

        println!(
            "Playback complete: {} frames, {:.1}s. Winner: {}",
            self.frames.len(),
            self.frames.last().map_or(0, |f| f.timestamp_ms) as f64 / 1000.0,
            self.winner
        );
        Ok(())
    }

    fn play_frames(&self, stdout: &mut io::Stdout) -> io::Result<()> {
        let start = Instant::now();
        for frame in &self.frames {
            let target = Duration::from_millis(frame.timestamp_ms);
            let elapsed = start.elapsed();
            if target > elapsed {
                std::thread::sleep(target - elapsed);
            }

            if crossterm::event::poll(Duration::ZERO)?
                && let crossterm::event::Event::Key(key) = crossterm::event::read()?
                && matches!(
                    key.code,
                    crossterm::event::KeyCode::Char('q') | crossterm::event::KeyCode::Esc
                )
            {
                break;
            }

            execute!(stdout, cursor::MoveTo(0, 0))?;
            stdout.write_all(frame.content.as_bytes())?;
            stdout.flush()?;
        }
        Ok(())
    }
}
