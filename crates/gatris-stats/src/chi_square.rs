//! Pearson's chi-square goodness-of-fit test.
//!
//! Compares observed category counts with the counts expected under a hypothesised
//! distribution:
//!
//! ```text
//! χ² = Σ (observed_i - expected_i)² / expected_i,   expected_i = N * p_i
//! ```
//!
//! A large statistic relative to the chi-square distribution with `k - 1` degrees of
//! freedom means the observations are unlikely to come from the hypothesised
//! distribution.

/// Result of a goodness-of-fit comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquare {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
}

impl ChiSquare {
    /// Compares `observed` counts against `expected_probabilities`.
    ///
    /// Returns `None` if the slices differ in length, are empty, or any expected
    /// probability is not positive. The probabilities are used as given, so they
    /// should sum to 1.
    ///
    /// # Examples
    ///
    /// ```
    /// # use gatris_stats::chi_square::ChiSquare;
    /// let fair = ChiSquare::goodness_of_fit(&[25, 25, 25, 25], &[0.25; 4]).unwrap();
    /// assert_eq!(fair.statistic, 0.0);
    /// assert_eq!(fair.degrees_of_freedom, 3);
    /// ```
    #[must_use]
    pub fn goodness_of_fit(observed: &[u64], expected_probabilities: &[f64]) -> Option<Self> {
        if observed.is_empty() || observed.len() != expected_probabilities.len() {
            return None;
        }
        if expected_probabilities.iter().any(|&p| p <= 0.0 || p.is_nan()) {
            return None;
        }
        Some(Self {
            statistic: statistic(observed, expected_probabilities),
            degrees_of_freedom: observed.len() - 1,
        })
    }
}

/// The chi-square statistic of `observed` counts under `expected_probabilities`.
///
/// # Panics
///
/// Panics if the slices differ in length.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn statistic(observed: &[u64], expected_probabilities: &[f64]) -> f64 {
    assert_eq!(
        observed.len(),
        expected_probabilities.len(),
        "one expected probability per category"
    );
    let total = observed.iter().sum::<u64>() as f64;
    observed
        .iter()
        .zip(expected_probabilities)
        .map(|(&o, &p)| {
            let expected = total * p;
            (o as f64 - expected).powi(2) / expected
        })
        .sum()
}
