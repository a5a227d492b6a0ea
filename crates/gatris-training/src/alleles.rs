//! Allele value operations shared by initialization and mutation.
//!
//! - [`random`] draws initial allele values uniformly within [`AlleleBounds`]
//! - [`mutate`] applies bounded Gaussian mutation in place

use rand::Rng;
use rand_distr::Normal;

/// Closed interval every allele value is kept in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlleleBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for AlleleBounds {
    fn default() -> Self {
        Self::new(-1.0, 1.0)
    }
}

impl AlleleBounds {
    /// # Panics
    ///
    /// Panics if `min > max` or either bound is not finite.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        assert!(
            min.is_finite() && max.is_finite() && min <= max,
            "invalid allele bounds [{min}, {max}]"
        );
        Self { min, max }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Generates `len` allele values uniformly distributed in `bounds`.
pub fn random<R>(rng: &mut R, bounds: AlleleBounds, len: usize) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    (0..len)
        .map(|_| rng.random_range(bounds.min..=bounds.max))
        .collect()
}

/// Applies Gaussian mutation in place.
///
/// Each value is mutated with probability `rate`: noise drawn from `N(0, sigma)` and
/// scaled by the width of `bounds` is added, and the result is clamped into `bounds`.
/// Returns whether any value was mutated.
///
/// # Panics
///
/// Panics if `sigma` is negative or not finite, or `rate` is outside `[0, 1]`.
pub fn mutate<R>(
    values: &mut [f64],
    sigma: f64,
    bounds: AlleleBounds,
    rate: f64,
    rng: &mut R,
) -> bool
where
    R: Rng + ?Sized,
{
    let normal = Normal::new(0.0, sigma).expect("mutation sigma must be finite and non-negative");
    let mut mutated = false;
    for value in values {
        if rng.random_bool(rate) {
            *value = bounds.clamp(*value + rng.sample(normal) * bounds.width());
            mutated = true;
        }
    }
    mutated
}
