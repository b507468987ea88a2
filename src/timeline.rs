use crate::config::Settings;
use crate::spin::SpinPlan;

/// What a single output frame shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Wheel in motion at `rotation`, dimmed by `fade` (1.0 = full brightness)
    Spin { rotation: f64, fade: f64 },
    /// Wheel stopped on the winner
    Hold { rotation: f64, fade: f64 },
    /// Winner card
    Winner,
}

impl Phase {
    pub fn rotation(&self) -> Option<f64> {
        match *self {
            Phase::Spin { rotation, .. } | Phase::Hold { rotation, .. } => Some(rotation),
            Phase::Winner => None,
        }
    }
}

/// Frame-by-frame schedule of one spin: spin, hold, fade, winner card.
#[derive(Debug, Clone)]
pub struct Timeline {
    fps: u32,
    spin_frames: usize,
    hold_frames: usize,
    winner_frames: usize,
    fade_frames: usize,
    plan: SpinPlan,
}

fn frames_for(seconds: f64, fps: u32) -> usize {
    (seconds * fps as f64).round().max(0.0) as usize
}

impl Timeline {
    pub fn new(settings: &Settings, plan: &SpinPlan) -> Self {
        let fps = settings.fps.max(1);
        let spin_frames = frames_for(plan.duration_seconds(), fps).max(1);
        let hold_frames = frames_for(settings.hold_duration, fps);
        let fade_frames = frames_for(settings.fade_out, fps).min(spin_frames.saturating_add(hold_frames));
        Timeline {
            fps,
            spin_frames,
            hold_frames,
            winner_frames: frames_for(settings.winner_duration, fps),
            fade_frames,
            plan: plan.clone(),
        }
    }

    /// Total number of frames.
    pub fn len(&self) -> usize {
        self.spin_frames
            .saturating_add(self.hold_frames)
            .saturating_add(self.winner_frames)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn spin_frames(&self) -> usize {
        self.spin_frames
    }

    /// Presentation time of `frame` in milliseconds.
    pub fn timestamp_ms(&self, frame: usize) -> u64 {
        (frame as u64 * 1000) / self.fps as u64
    }

    fn fade_at(&self, frame: usize) -> f64 {
        let wheel_frames = self.spin_frames.saturating_add(self.hold_frames);
        let remaining = wheel_frames.saturating_sub(frame + 1);
        if self.fade_frames == 0 || remaining >= self.fade_frames {
            1.0
        } else {
            remaining as f64 / self.fade_frames as f64
        }
    }

    /// Phase shown at `frame`, or `None` past the end.
    ///
    /// Spin frames sample the plan at evenly spaced progress values with the
    /// last one at exactly 1.0, so the final spin frame already rests on the
    /// winner.
    pub fn phase(&self, frame: usize) -> Option<Phase> {
        if frame < self.spin_frames {
            let p = if self.spin_frames > 1 {
                frame as f64 / (self.spin_frames - 1) as f64
            } else {
                1.0
            };
            Some(Phase::Spin {
                rotation: self.plan.angle_at_progress(p),
                fade: self.fade_at(frame),
            })
        } else if frame < self.spin_frames.saturating_add(self.hold_frames) {
            Some(Phase::Hold {
                rotation: self.plan.total_rotation_degrees(),
                fade: self.fade_at(frame),
            })
        } else if frame < self.len() {
            Some(Phase::Winner)
        } else {
            None
        }
    }
}
