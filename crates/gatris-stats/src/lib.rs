//! Small statistics toolkit used by training reports and distribution tests.
//!
//! - [`descriptive`]: min, max, mean, median and spread of a dataset
//! - [`chi_square`]: Pearson's chi-square goodness-of-fit statistic
//!
//! ```
//! use gatris_stats::descriptive::DescriptiveStats;
//!
//! let stats = DescriptiveStats::new([1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```

pub mod chi_square;
pub mod descriptive;
