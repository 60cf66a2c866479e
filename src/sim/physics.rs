//! Edge policies and random sampling shared by every moving entity
//!
//! All positions live in `[SMIDGE, max - SMIDGE]`; the helpers here keep them
//! there (wrap/constrain) or report when they have left (clip).

use rand::Rng;

use crate::consts::SMIDGE;

/// Uniform sample in `[0, 1)`
#[inline]
pub fn frnd(rng: &mut impl Rng) -> f64 {
    rng.random::<f64>()
}

/// Uniform sample in `[-0.5, 0.5)`
#[inline]
pub fn crnd(rng: &mut impl Rng) -> f64 {
    rng.random::<f64>() - 0.5
}

/// Sample a speed in `[min, max]` biased toward `max`.
///
/// Faster objects sweep more area per tick, so the chance that an object
/// crossed into view during a tick grows with its speed. Sampling the square
/// uniformly reproduces that weighting.
pub fn weighted_random_range(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    (min * min + frnd(rng) * (max * max - min * min)).sqrt()
}

/// Wrap `value` into `[SMIDGE, max - SMIDGE]`.
///
/// Only corrects by one period, so `value` must not stray further than
/// `max - 2 * SMIDGE` outside the range.
#[inline]
pub fn wrap(mut value: f64, max: f64) -> f64 {
    let upper = max - SMIDGE;
    let range = upper - SMIDGE;
    if value > upper {
        value -= range;
    }
    if value < SMIDGE {
        value += range;
    }
    value
}

/// True when `value` lies outside `[SMIDGE, max - SMIDGE]`
#[inline]
pub fn clip(value: f64, max: f64) -> bool {
    value < SMIDGE || value > max - SMIDGE
}

/// Clamp into `[SMIDGE, max - SMIDGE]`
#[inline]
pub fn constrain(value: f64, max: f64) -> f64 {
    constrain_range(value, 0.0, max)
}

/// Clamp into `[min + SMIDGE, max - SMIDGE]`
#[inline]
pub fn constrain_range(value: f64, min: f64, max: f64) -> f64 {
    let min = min + SMIDGE;
    let max = max - SMIDGE;
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_clip_boundaries() {
        let max = 640.0;
        let delta = 1e-6;
        assert!(clip(SMIDGE - delta, max));
        assert!(!clip(SMIDGE, max));
        assert!(!clip(max - SMIDGE, max));
        assert!(clip(max - SMIDGE + delta, max));
    }

    #[test]
    fn test_constrain() {
        assert_eq!(constrain(-5.0, 100.0), SMIDGE);
        assert_eq!(constrain(105.0, 100.0), 100.0 - SMIDGE);
        assert_eq!(constrain(42.0, 100.0), 42.0);
        assert_eq!(constrain_range(-80.0, -50.0, 50.0), -50.0 + SMIDGE);
        assert_eq!(constrain_range(80.0, -50.0, 50.0), 50.0 - SMIDGE);
    }

    #[test]
    fn test_wrap_moves_by_one_period() {
        let max = 100.0;
        let wrapped = wrap(101.0, max);
        assert!((wrapped - (101.0 - (max - 2.0 * SMIDGE))).abs() < 1e-9);
        let wrapped = wrap(-3.0, max);
        assert!((wrapped - (-3.0 + (max - 2.0 * SMIDGE))).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_random_range_bias() {
        let mut rng = Pcg32::seed_from_u64(7);
        let (min, max) = (1.0, 9.0);
        let n = 20_000;
        let mean: f64 =
            (0..n).map(|_| weighted_random_range(&mut rng, min, max)).sum::<f64>() / n as f64;
        let uniform_mean = (min + max) / 2.0;
        assert!(mean > uniform_mean, "mean {mean} should exceed {uniform_mean}");
        assert!((max - mean) < (max - uniform_mean));
    }

    #[test]
    fn test_weighted_random_range_degenerate() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(weighted_random_range(&mut rng, 0.0, 0.0), 0.0);
        let v = weighted_random_range(&mut rng, 3.0, 3.0);
        assert!((v - 3.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_wrap_lands_in_range(max in 10.0f64..2000.0, offset in -0.99f64..1.99) {
            let x = offset * (max - 2.0 * SMIDGE);
            let w = wrap(x, max);
            prop_assert!(w >= SMIDGE - 1e-9 && w <= max - SMIDGE + 1e-9);
        }

        #[test]
        fn prop_wrap_idempotent(max in 10.0f64..2000.0, offset in -0.99f64..1.99) {
            let x = offset * (max - 2.0 * SMIDGE);
            let once = wrap(x, max);
            prop_assert_eq!(wrap(once, max), once);
        }
    }
}
