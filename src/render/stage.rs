use super::font::FontResolver;
use super::title::TitleCard;
use super::wheel::WheelPainter;
use super::Canvas;
use crate::config::Settings;
use crate::spin::{SpinPlan, slice_under};
use crate::timeline::{Phase, Timeline};

/// Turns frame numbers into finished terminal frames.
///
/// Owns everything a frame needs: the settings it was built with, the plan,
/// the canvas and the painters. Nothing here reads global state.
pub struct Stage {
    settings: Settings,
    labels: Vec<String>,
    plan: SpinPlan,
    timeline: Timeline,
    canvas: Canvas,
    wheel: WheelPainter,
    card: TitleCard,
}

impl Stage {
    pub fn new(
        settings: Settings,
        labels: Vec<String>,
        plan: SpinPlan,
        cols: usize,
        rows: usize,
        fonts: &dyn FontResolver,
    ) -> Self {
        let font = fonts.resolve();
        match &font {
            Some(f) => log::info!("Winner card font: {}", f.name()),
            None => log::info!("No winner card font, using plain text"),
        }
        let winner = labels
            .get(plan.winner_index())
            .cloned()
            .unwrap_or_default();
        let mut canvas = Canvas::new(cols, rows, settings.render_mode, settings.color_mode);
        canvas.color_quant = settings.color_quant;
        Stage {
            timeline: Timeline::new(&settings, &plan),
            wheel: WheelPainter::new(labels.clone(), plan.reference_angle(), settings.show_labels),
            card: TitleCard::new(font, &winner),
            canvas,
            labels,
            plan,
            settings,
        }
    }

    /// Rebuild the canvas for a new terminal size.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        let mut canvas = Canvas::new(cols, rows, self.settings.render_mode, self.settings.color_mode);
        canvas.color_quant = self.settings.color_quant;
        self.canvas = canvas;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn winner(&self) -> &str {
        self.labels
            .get(self.plan.winner_index())
            .map_or("", String::as_str)
    }

    /// Label currently under the pointer at `frame`.
    pub fn pointer_label(&self, frame: usize) -> &str {
        match self.timeline.phase(frame).and_then(|p| p.rotation()) {
            Some(rotation) => {
                let i = slice_under(self.labels.len(), rotation, self.plan.reference_angle());
                self.labels.get(i).map_or("", String::as_str)
            }
            None => self.winner(),
        }
    }

    /// Wheel at an arbitrary rotation, full brightness.
    pub fn render_still(&mut self, rotation: f64) -> String {
        self.render_wheel(rotation, 1.0)
    }

    fn render_wheel(&mut self, rotation: f64, fade: f64) -> String {
        self.canvas.clear();
        self.wheel.paint(&mut self.canvas, rotation);
        self.canvas.fade(fade);
        let mut out = self.canvas.render();
        out.push_str(&self.wheel.label_overlay(&self.canvas, rotation, fade));
        out
    }

    /// Finished frame `frame` of the timeline. Past the end, the last frame repeats.
    pub fn render_frame(&mut self, frame: usize) -> String {
        let last = self.timeline.len().saturating_sub(1);
        match self.timeline.phase(frame.min(last)) {
            Some(Phase::Spin { rotation, fade }) | Some(Phase::Hold { rotation, fade }) => {
                self.render_wheel(rotation, fade)
            }
            Some(Phase::Winner) | None => {
                self.canvas.clear();
                let overlay = self.card.paint(&mut self.canvas);
                let mut out = self.canvas.render();
                out.push_str(&overlay);
                out
            }
        }
    }
}
