//! Wheel rasterizer.
//!
//! Screen angles: 0 deg points right, angles grow counter-clockwise, so 90 deg
//! is straight up. A wheel rotated by `r` shows local angle `a` at screen
//! angle `a + r`.

use super::{Canvas, ColorMode, canvas::color_to_fg, clip, overlay_text};
use crate::spin::{FULL_TURN, slice_center, slice_span};

const RIM_COLOR: (u8, u8, u8) = (230, 230, 230);
const SEPARATOR_COLOR: (u8, u8, u8) = (240, 240, 240);
const HUB_COLOR: (u8, u8, u8) = (250, 250, 250);
const POINTER_COLOR: (u8, u8, u8) = (220, 40, 40);

/// Labels are only drawn when they have a chance of not overlapping.
const MAX_LABELED_SLICES: usize = 24;
const MAX_LABEL_CHARS: usize = 14;

/// Fill color of slice `i`; neighbours always differ.
pub fn slice_color(i: usize) -> (u8, u8, u8) {
    (
        ((70 + i * 45) % 256) as u8,
        ((110 + i * 85) % 256) as u8,
        ((160 + i * 55) % 256) as u8,
    )
}

/// Wheel placement on a canvas, in aspect-corrected units where one unit is
/// one pixel width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    /// Pixel height in units
    pub aspect: f64,
}

impl Geometry {
    pub fn fit(canvas: &Canvas, with_labels: bool) -> Self {
        let aspect = canvas.render_mode.pixel_aspect();
        let w = canvas.width as f64;
        let h = canvas.height as f64 * aspect;
        let frac = if with_labels { 0.34 } else { 0.42 };
        Geometry {
            cx: w / 2.0,
            cy: h / 2.0,
            radius: (w.min(h) * frac).max(1.0),
            aspect,
        }
    }

    /// Polar coordinates (distance, screen angle in degrees) of pixel (x, y)'s center.
    #[inline]
    pub fn polar(&self, x: usize, y: usize) -> (f64, f64) {
        let dx = x as f64 + 0.5 - self.cx;
        let dy = self.cy - (y as f64 + 0.5) * self.aspect;
        (
            (dx * dx + dy * dy).sqrt(),
            dy.atan2(dx).to_degrees().rem_euclid(FULL_TURN),
        )
    }

    /// Canvas pixel coordinates of the point at `dist` along screen angle `deg`.
    pub fn point(&self, dist: f64, deg: f64) -> (f64, f64) {
        let a = deg.to_radians();
        (
            self.cx + a.cos() * dist,
            (self.cy - a.sin() * dist) / self.aspect,
        )
    }
}

/// Draws the wheel, its pointer and (optionally) slice labels.
pub struct WheelPainter {
    labels: Vec<String>,
    reference_angle: f64,
    show_labels: bool,
}

impl WheelPainter {
    pub fn new(labels: Vec<String>, reference_angle: f64, show_labels: bool) -> Self {
        WheelPainter {
            labels,
            reference_angle,
            show_labels,
        }
    }

    fn labels_visible(&self) -> bool {
        self.show_labels && self.labels.len() <= MAX_LABELED_SLICES
    }

    pub fn geometry(&self, canvas: &Canvas) -> Geometry {
        Geometry::fit(canvas, self.labels_visible())
    }

    /// Rasterize the wheel turned by `rotation` degrees.
    pub fn paint(&self, canvas: &mut Canvas, rotation: f64) {
        let n = self.labels.len().max(1);
        let span = slice_span(n);
        let geo = self.geometry(canvas);
        let r = geo.radius;
        let hub = (r * 0.08).max(0.8);
        let rim = (r * 0.04).clamp(0.8, 3.0);
        let seam = (r * 0.015).clamp(0.45, 1.5);

        for y in 0..canvas.height {
            for x in 0..canvas.width {
                let (dist, screen) = geo.polar(x, y);
                if dist > r + rim {
                    continue;
                }
                if dist > r {
                    canvas.set_colored(x, y, 1.0, RIM_COLOR.0, RIM_COLOR.1, RIM_COLOR.2);
                    continue;
                }
                if dist < hub {
                    canvas.set_colored(x, y, 1.0, HUB_COLOR.0, HUB_COLOR.1, HUB_COLOR.2);
                    continue;
                }

                let local = (screen - rotation).rem_euclid(FULL_TURN);
                let slice = ((local / span) as usize).min(n - 1);
                let into = local - slice as f64 * span;
                let to_seam = into.min(span - into).to_radians() * dist;

                let (cr, cg, cb) = if n > 1 && to_seam < seam {
                    SEPARATOR_COLOR
                } else {
                    slice_color(slice)
                };
                // Slightly darker toward the rim to read as a disc.
                let shade = 1.0 - 0.2 * (dist / r);
                canvas.set_colored(x, y, shade, cr, cg, cb);
            }
        }

        self.paint_pointer(canvas, &geo);
    }

    /// Red triangle just outside the rim at the reference angle, tip inward.
    fn paint_pointer(&self, canvas: &mut Canvas, geo: &Geometry) {
        let r = geo.radius;
        let tip = r * 0.9;
        let base = r * 1.15 + 1.5;
        let half_w = (r * 0.1).max(1.5);
        let a = self.reference_angle.to_radians();
        let (ux, uy) = (a.cos(), a.sin());

        for y in 0..canvas.height {
            for x in 0..canvas.width {
                let dx = x as f64 + 0.5 - geo.cx;
                let dy = geo.cy - (y as f64 + 0.5) * geo.aspect;
                let along = dx * ux + dy * uy;
                if along < tip || along > base {
                    continue;
                }
                let across = (dx * -uy + dy * ux).abs();
                if across <= half_w * (along - tip) / (base - tip) {
                    canvas.set_colored(x, y, 1.0, POINTER_COLOR.0, POINTER_COLOR.1, POINTER_COLOR.2);
                }
            }
        }
    }

    /// Terminal escape sequence drawing every label beside its slice.
    /// `intensity` dims the text along with a fading wheel.
    pub fn label_overlay(&self, canvas: &Canvas, rotation: f64, intensity: f64) -> String {
        let mut out = String::new();
        if !self.labels_visible() || intensity < 0.25 {
            return out;
        }
        let n = self.labels.len();
        let geo = self.geometry(canvas);
        let (cols, rows) = canvas.term_size();
        let dist = geo.radius * 1.12 + 1.0;

        for (i, label) in self.labels.iter().enumerate() {
            let deg = slice_center(n, i) + rotation;
            let (px, py) = geo.point(dist, deg);
            let (col, row) = canvas.cell_of(px, py);
            if row < 0 || row >= rows as i64 {
                continue;
            }

            let text = clip(label, MAX_LABEL_CHARS.min(cols));
            let len = text.chars().count() as i64;
            let cos = deg.to_radians().cos();
            let start = if cos > 0.3 {
                col
            } else if cos < -0.3 {
                col - len + 1
            } else {
                col - len / 2
            };
            let start = start.clamp(0, (cols as i64 - len).max(0));

            let sgr = label_sgr(canvas, slice_color(i), intensity);
            overlay_text(&mut out, row as usize + 1, start as usize + 1, &sgr, &text);
        }
        out
    }
}

fn label_sgr(canvas: &Canvas, rgb: (u8, u8, u8), intensity: f64) -> String {
    if canvas.color_mode == ColorMode::Mono {
        return "1".into();
    }
    // Lift the slice color toward white so text stays readable on black.
    let lift = |c: u8| ((c as f64 * 0.5 + 127.0) * intensity.clamp(0.0, 1.0)) as u8;
    let color = canvas.map_color(lift(rgb.0), lift(rgb.1), lift(rgb.2));
    format!("1;{}", color_to_fg(color))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderMode;
    use crate::spin::{SpinParams, SpinPlan};

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("n{}", i)).collect()
    }

    fn canvas() -> Canvas {
        Canvas::new(60, 30, RenderMode::HalfBlock, ColorMode::TrueColor)
    }

    /// Color of the slice pixel just inside the pointer tip.
    fn color_under_pointer(painter: &WheelPainter, c: &Canvas, reference: f64) -> (u8, u8, u8) {
        let geo = painter.geometry(c);
        let (x, y) = geo.point(geo.radius * 0.6, reference);
        c.get(x as usize, y as usize).unwrap().1
    }

    #[test]
    fn test_slice_colors_match_palette() {
        assert_eq!(slice_color(0), (70, 110, 160));
        assert_eq!(slice_color(1), (115, 195, 215));
        assert_ne!(slice_color(2), slice_color(3));
    }

    #[test]
    fn test_geometry_round_trips_points() {
        let c = canvas();
        let geo = Geometry::fit(&c, false);
        let (x, y) = geo.point(10.0, 90.0);
        assert!((x - geo.cx).abs() < 1e-9);
        assert!(y < c.height as f64 / 2.0, "90 deg should be above center");
        let (d, a) = geo.polar(x.floor() as usize, y.floor() as usize);
        assert!((d - 10.0).abs() < 1.0);
        assert!((a - 90.0).abs() < 10.0);
    }

    #[test]
    fn test_unrotated_wheel_starts_slice_zero_at_three_oclock() {
        let painter = WheelPainter::new(names(4), 90.0, false);
        let mut c = canvas();
        painter.paint(&mut c, 0.0);
        // 45 deg is the middle of slice 0, 135 deg the middle of slice 1
        let geo = painter.geometry(&c);
        let (x, y) = geo.point(geo.radius * 0.6, 45.0);
        assert_eq!(c.get(x as usize, y as usize).unwrap().1, slice_color(0));
        let (x, y) = geo.point(geo.radius * 0.6, 135.0);
        assert_eq!(c.get(x as usize, y as usize).unwrap().1, slice_color(1));
    }

    #[test]
    fn test_planned_rest_shows_winner_under_pointer() {
        for winner in 0..5 {
            let plan = SpinPlan::with_winner(5, winner, &SpinParams::default()).unwrap();
            let painter = WheelPainter::new(names(5), plan.reference_angle(), false);
            let mut c = canvas();
            painter.paint(&mut c, plan.total_rotation_degrees());
            assert_eq!(
                color_under_pointer(&painter, &c, plan.reference_angle()),
                slice_color(winner),
                "winner {}",
                winner
            );
        }
    }

    #[test]
    fn test_pointer_is_drawn_at_reference() {
        let painter = WheelPainter::new(names(3), 90.0, false);
        let mut c = canvas();
        painter.paint(&mut c, 0.0);
        let geo = painter.geometry(&c);
        let (x, y) = geo.point(geo.radius * 1.1, 90.0);
        assert_eq!(c.get(x as usize, y as usize).unwrap().1, POINTER_COLOR);
    }

    #[test]
    fn test_labels_follow_rotation_and_stay_on_screen() {
        let painter = WheelPainter::new(names(6), 90.0, true);
        let c = canvas();
        let a = painter.label_overlay(&c, 0.0, 1.0);
        let b = painter.label_overlay(&c, 30.0, 1.0);
        assert_eq!(a.matches("\x1b[0m").count(), 6);
        assert_ne!(a, b);
        assert!(!a.contains("\x1b[0;"), "rows are 1-based");
    }

    #[test]
    fn test_labels_hidden_for_crowded_wheels_or_dark_frames() {
        let crowded = WheelPainter::new(names(40), 90.0, true);
        assert!(crowded.label_overlay(&canvas(), 0.0, 1.0).is_empty());
        let faded = WheelPainter::new(names(3), 90.0, true);
        assert!(faded.label_overlay(&canvas(), 0.0, 0.1).is_empty());
    }
}
