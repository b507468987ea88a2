use serde::{Deserialize, Serialize};

/// Time-warping curve applied to spin progress.
///
/// Every variant maps `[0, 1]` onto `[0, 1]` monotonically with `e(0) = 0`
/// and `e(1) = 1`. The ease-out family front-loads the angular velocity and
/// decelerates to zero at the end, which is what makes the wheel look like it
/// is coasting to a stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    /// `1 - (1 - p)^3`
    #[default]
    CubicOut,
    /// `1 - (1 - p)^2`
    QuadOut,
    /// `1 - (1 - p)^5`, longest crawl before stopping
    QuintOut,
    /// Constant speed, stops abruptly
    Linear,
}

impl Easing {
    /// Eased progress for normalized progress `p`. Input is clamped to `[0, 1]`.
    #[inline]
    pub fn apply(self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);
        let inv = 1.0 - p;
        match self {
            Easing::CubicOut => 1.0 - inv * inv * inv,
            Easing::QuadOut => 1.0 - inv * inv,
            Easing::QuintOut => 1.0 - inv.powi(5),
            Easing::Linear => p,
        }
    }
}
