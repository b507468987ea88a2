//! Spin planning: pick a winning slice, solve for the rotation that brings it
//! under the pointer, and sample that rotation over time.
//!
//! Angles are in degrees. The planner only assumes that a rotation of `r`
//! moves a point at local angle `a` to `a + r`; which screen direction that
//! is belongs to the renderer.

pub mod easing;

pub use easing::Easing;

use rand::RngExt;
use serde::Serialize;

use crate::error::InvalidInputError;

pub const FULL_TURN: f64 = 360.0;

/// Angular width of one slice on a wheel of `n` slices.
#[inline]
pub fn slice_span(n: usize) -> f64 {
    FULL_TURN / n as f64
}

/// Local angle of the middle of slice `index`.
#[inline]
pub fn slice_center(n: usize, index: usize) -> f64 {
    let span = slice_span(n);
    index as f64 * span + span / 2.0
}

/// Draw one uniformly random index into `labels`.
pub fn select_winner<T, R>(labels: &[T], rng: &mut R) -> Result<usize, InvalidInputError>
where
    R: RngExt + ?Sized,
{
    if labels.is_empty() {
        return Err(InvalidInputError::EmptyLabels);
    }
    Ok(rng.random_range(0..labels.len()))
}

/// Total rotation that spins `full_turns` times and then parks the center of
/// slice `winner_index` at `reference_angle_deg`.
///
/// The partial turn is kept in `(-360, 360)`, so the result may be smaller
/// than `full_turns * 360` when the winner sits past the reference.
pub fn plan_rotation(
    n: usize,
    winner_index: usize,
    full_turns: u32,
    reference_angle_deg: f64,
) -> Result<f64, InvalidInputError> {
    if n < 1 {
        return Err(InvalidInputError::NoSlices);
    }
    if winner_index >= n {
        return Err(InvalidInputError::WinnerOutOfRange {
            index: winner_index,
            count: n,
        });
    }
    if !reference_angle_deg.is_finite() {
        return Err(InvalidInputError::NonFiniteAngle(reference_angle_deg));
    }

    let offset = (reference_angle_deg - slice_center(n, winner_index)) % FULL_TURN;
    Ok(full_turns as f64 * FULL_TURN + offset)
}

/// Rotation reached at time `t` of a spin lasting `duration_seconds`.
///
/// `t` is clamped into `[0, duration_seconds]`: before the start the wheel has
/// not moved, after the end it stays at rest. A NaN `t` counts as the start.
pub fn angle_at(
    t: f64,
    duration_seconds: f64,
    total_rotation_degrees: f64,
    easing: Easing,
) -> Result<f64, InvalidInputError> {
    check_duration(duration_seconds)?;
    Ok(sample(t, duration_seconds, total_rotation_degrees, easing))
}

fn check_duration(duration_seconds: f64) -> Result<(), InvalidInputError> {
    if duration_seconds > 0.0 && duration_seconds.is_finite() {
        Ok(())
    } else {
        Err(InvalidInputError::NonPositiveDuration(duration_seconds))
    }
}

#[inline]
fn sample(t: f64, duration: f64, total: f64, easing: Easing) -> f64 {
    let p = if t.is_nan() { 0.0 } else { (t / duration).clamp(0.0, 1.0) };
    easing.apply(p) * total
}

/// Which slice lies under `reference_angle_deg` once the wheel has turned by
/// `rotation_deg`. Display only; the winner of a plan is chosen up front.
pub fn slice_under(n: usize, rotation_deg: f64, reference_angle_deg: f64) -> usize {
    let n = n.max(1);
    let local = (reference_angle_deg - rotation_deg).rem_euclid(FULL_TURN);
    ((local / slice_span(n)) as usize).min(n - 1)
}

/// Knobs shared by every spin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinParams {
    /// Extra whole rotations before stopping
    pub full_turns: u32,
    /// Where the winner comes to rest (the pointer position)
    pub reference_angle: f64,
    /// Seconds from start to stop
    pub duration: f64,
    pub easing: Easing,
}

impl Default for SpinParams {
    fn default() -> Self {
        SpinParams {
            full_turns: 4,
            reference_angle: 90.0,
            duration: 6.0,
            easing: Easing::CubicOut,
        }
    }
}

/// One fully planned spin. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpinPlan {
    winner_index: usize,
    slice_count: usize,
    total_rotation_degrees: f64,
    duration_seconds: f64,
    reference_angle: f64,
    easing: Easing,
}

impl SpinPlan {
    /// Pick a winner from `labels` with `rng` and plan the spin onto it.
    pub fn new<T, R>(labels: &[T], rng: &mut R, params: &SpinParams) -> Result<Self, InvalidInputError>
    where
        R: RngExt + ?Sized,
    {
        check_duration(params.duration)?;
        let winner = select_winner(labels, rng)?;
        Self::with_winner(labels.len(), winner, params)
    }

    /// Plan a spin onto a winner chosen elsewhere.
    pub fn with_winner(
        slice_count: usize,
        winner_index: usize,
        params: &SpinParams,
    ) -> Result<Self, InvalidInputError> {
        check_duration(params.duration)?;
        let total = plan_rotation(
            slice_count,
            winner_index,
            params.full_turns,
            params.reference_angle,
        )?;
        Ok(SpinPlan {
            winner_index,
            slice_count,
            total_rotation_degrees: total,
            duration_seconds: params.duration,
            reference_angle: params.reference_angle,
            easing: params.easing,
        })
    }

    pub fn winner_index(&self) -> usize {
        self.winner_index
    }

    pub fn slice_count(&self) -> usize {
        self.slice_count
    }

    pub fn total_rotation_degrees(&self) -> f64 {
        self.total_rotation_degrees
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    pub fn reference_angle(&self) -> f64 {
        self.reference_angle
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Wheel rotation at `t` seconds into the spin (clamped like [`angle_at`]).
    pub fn angle_at(&self, t: f64) -> f64 {
        // The duration was checked when the plan was built.
        angle_at(t, self.duration_seconds, self.total_rotation_degrees, self.easing)
            .unwrap_or(self.total_rotation_degrees)
    }

    /// Rotation at normalized progress `p` in `[0, 1]`.
    pub fn angle_at_progress(&self, p: f64) -> f64 {
        self.angle_at(p * self.duration_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const EPS: f64 = 1e-6;

    /// Shortest distance between two angles, in degrees.
    fn angular_distance(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(FULL_TURN);
        d.min(FULL_TURN - d)
    }

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("name{}", i)).collect()
    }

    #[test]
    fn test_select_winner_rejects_empty_labels() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty: Vec<String> = Vec::new();
        assert_eq!(
            select_winner(&empty, &mut rng),
            Err(InvalidInputError::EmptyLabels)
        );
    }

    #[test]
    fn test_select_winner_is_reproducible_with_seed() {
        let names = labels(7);
        let mut a = StdRng::seed_from_u64(0xC0FFEE);
        let mut b = StdRng::seed_from_u64(0xC0FFEE);
        let run_a: Vec<usize> = (0..100).map(|_| select_winner(&names, &mut a).unwrap()).collect();
        let run_b: Vec<usize> = (0..100).map(|_| select_winner(&names, &mut b).unwrap()).collect();
        assert_eq!(run_a, run_b);
        assert!(run_a.iter().all(|&i| i < 7));
    }

    #[test]
    fn test_select_winner_is_roughly_uniform() {
        let names = labels(5);
        let mut rng = StdRng::seed_from_u64(2024);
        let trials = 10_000;
        let mut counts = [0u32; 5];
        for _ in 0..trials {
            counts[select_winner(&names, &mut rng).unwrap()] += 1;
        }
        let expected = trials as f64 / 5.0;
        let chi2: f64 = counts
            .iter()
            .map(|&c| {
                let d = c as f64 - expected;
                d * d / expected
            })
            .sum();
        // 4 degrees of freedom, p = 0.001
        assert!(chi2 < 18.467, "chi2 = {} counts = {:?}", chi2, counts);
    }

    #[test]
    fn test_single_slice_always_wins() {
        let names = labels(1);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            assert_eq!(select_winner(&names, &mut rng).unwrap(), 0);
        }
        let total = plan_rotation(1, 0, 3, 90.0).unwrap();
        assert!(angular_distance(slice_center(1, 0) + total, 90.0) < EPS);
        assert_eq!(slice_under(1, total, 90.0), 0);
    }

    #[test]
    fn test_four_slices_winner_two_lands_under_pointer() {
        let total = plan_rotation(4, 2, 5, 90.0).unwrap();
        assert!((total - 1665.0).abs() < EPS);

        let rest = angle_at(3.0, 3.0, total, Easing::CubicOut).unwrap();
        assert!((rest - 1665.0).abs() < EPS);
        assert!((rest.rem_euclid(FULL_TURN) - 225.0).abs() < EPS);

        // Slice 2 covers [180, 270) locally; after a net 225 deg turn its
        // middle sits at 450 == 90, right under the pointer.
        assert_eq!(slice_under(4, rest, 90.0), 2);
        assert!(angular_distance(225.0 + rest, 90.0) < EPS);
        // Its neighbours are a quarter turn away on either side.
        assert!((angular_distance(slice_center(4, 1) + rest, 90.0) - 90.0).abs() < EPS);
        assert!((angular_distance(slice_center(4, 3) + rest, 90.0) - 90.0).abs() < EPS);
    }

    #[test]
    fn test_plan_rotation_rejects_bad_counts() {
        assert_eq!(plan_rotation(0, 0, 4, 90.0), Err(InvalidInputError::NoSlices));
        assert_eq!(
            plan_rotation(3, 3, 4, 90.0),
            Err(InvalidInputError::WinnerOutOfRange { index: 3, count: 3 })
        );
        assert!(matches!(
            plan_rotation(3, 0, 4, f64::NAN),
            Err(InvalidInputError::NonFiniteAngle(_))
        ));
    }

    #[test]
    fn test_partial_turn_stays_within_one_revolution() {
        for n in 1..40 {
            for i in 0..n {
                let total = plan_rotation(n, i, 0, 90.0).unwrap();
                assert!(total > -FULL_TURN && total < FULL_TURN, "n={} i={} total={}", n, i, total);
            }
        }
    }

    #[test]
    fn test_angle_at_rejects_non_positive_duration() {
        assert_eq!(
            angle_at(0.0, 0.0, 100.0, Easing::CubicOut),
            Err(InvalidInputError::NonPositiveDuration(0.0))
        );
        assert!(angle_at(0.0, -1.0, 100.0, Easing::CubicOut).is_err());
        assert!(angle_at(0.0, f64::INFINITY, 100.0, Easing::CubicOut).is_err());
    }

    #[test]
    fn test_angle_at_clamps_outside_duration() {
        assert_eq!(angle_at(-2.0, 6.0, 1000.0, Easing::CubicOut).unwrap(), 0.0);
        assert_eq!(angle_at(60.0, 6.0, 1000.0, Easing::CubicOut).unwrap(), 1000.0);
        assert_eq!(angle_at(f64::NAN, 6.0, 1000.0, Easing::CubicOut).unwrap(), 0.0);
    }

    #[test]
    fn test_plan_rejects_invalid_input_before_drawing() {
        let names = labels(3);
        let mut rng = StdRng::seed_from_u64(5);
        let params = SpinParams {
            duration: 0.0,
            ..SpinParams::default()
        };
        assert_eq!(
            SpinPlan::new(&names, &mut rng, &params),
            Err(InvalidInputError::NonPositiveDuration(0.0))
        );
        assert!(SpinPlan::with_winner(3, 5, &SpinParams::default()).is_err());
    }

    #[test]
    fn test_plan_samples_from_zero_to_total() {
        let names = labels(6);
        let mut rng = StdRng::seed_from_u64(77);
        let plan = SpinPlan::new(&names, &mut rng, &SpinParams::default()).unwrap();
        assert!(plan.winner_index() < 6);
        assert_eq!(plan.angle_at(0.0), 0.0);
        assert_eq!(plan.angle_at(plan.duration_seconds()), plan.total_rotation_degrees());
        assert_eq!(plan.angle_at_progress(1.0), plan.total_rotation_degrees());
        let t = plan.duration_seconds() * 0.3;
        assert_eq!(
            plan.angle_at(t),
            angle_at(t, plan.duration_seconds(), plan.total_rotation_degrees(), plan.easing()).unwrap()
        );
        assert_eq!(
            slice_under(6, plan.total_rotation_degrees(), plan.reference_angle()),
            plan.winner_index()
        );
    }

    #[test]
    fn test_plan_serializes_to_json() {
        let plan = SpinPlan::with_winner(4, 2, &SpinParams::default()).unwrap();
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["winner_index"], 2);
        assert_eq!(json["easing"], "cubic-out");
    }

    proptest! {
        #[test]
        fn prop_winner_rests_at_reference(
            n in 1usize..256,
            pick in 0.0f64..1.0,
            turns in 0u32..12,
            reference in -720.0f64..720.0,
        ) {
            let idx = ((n as f64 * pick) as usize).min(n - 1);
            let total = plan_rotation(n, idx, turns, reference).unwrap();
            prop_assert!(angular_distance(slice_center(n, idx) + total, reference) < EPS);
            prop_assert_eq!(slice_under(n, total, reference), idx);
        }

        #[test]
        fn prop_angle_endpoints(
            duration in 0.01f64..60.0,
            total in -5000.0f64..5000.0,
        ) {
            prop_assert_eq!(angle_at(0.0, duration, total, Easing::CubicOut).unwrap(), 0.0);
            let end = angle_at(duration, duration, total, Easing::CubicOut).unwrap();
            prop_assert!((end - total).abs() < EPS);
        }

        #[test]
        fn prop_angle_monotonic_for_positive_rotation(
            duration in 0.01f64..60.0,
            total in 0.0f64..5000.0,
            a in 0.0f64..1.0,
            b in 0.0f64..1.0,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let x = angle_at(lo * duration, duration, total, Easing::CubicOut).unwrap();
            let y = angle_at(hi * duration, duration, total, Easing::CubicOut).unwrap();
            prop_assert!(x <= y);
        }
    }
}
