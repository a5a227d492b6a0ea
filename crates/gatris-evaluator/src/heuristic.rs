//! Board features and the weighted heuristic score of a placement.
//!
//! Three features of the resulting board are each weighted by a small linear function
//! of the stack height:
//!
//! ```text
//! rows  = (w0 * maxHeight + w1 * heightRange + w2) * rowsCleared * |rowsCleared| / 5
//! holes = (w3 * maxHeight + w4 * heightRange + w5) * holes / 10
//! bump  = (w6 * maxHeight + w7 * heightRange + w8) * bumpiness / 1000
//! score = rows + holes + bump
//! ```
//!
//! `maxHeight` and `heightRange` are taken from the board *before* the move by default
//! ([`HeightSource::PreMove`]); holes and bumpiness always come from the board after it.

use std::fmt;

use gatris_engine::Board;
use serde::{Deserialize, Serialize};

use crate::move_simulator::SimulatedMove;

/// Number of coefficients in a [`WeightVector`].
pub const WEIGHT_COUNT: usize = 9;

/// A slice with the wrong number of coefficients for a [`WeightVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("weight vector needs 9 coefficients, got {actual}")]
pub struct WeightCountError {
    pub actual: usize,
}

/// Nine heuristic coefficients: three triples for rows cleared, holes and bumpiness,
/// each weighting (max height, height range, constant).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct WeightVector([f64; WEIGHT_COUNT]);

impl WeightVector {
    pub const ZERO: Self = Self([0.0; WEIGHT_COUNT]);

    #[must_use]
    pub const fn new(weights: [f64; WEIGHT_COUNT]) -> Self {
        Self(weights)
    }

    #[must_use]
    pub const fn as_array(&self) -> &[f64; WEIGHT_COUNT] {
        &self.0
    }

    fn triple(&self, feature: usize) -> [f64; 3] {
        let base = feature * 3;
        [self.0[base], self.0[base + 1], self.0[base + 2]]
    }
}

impl TryFrom<&[f64]> for WeightVector {
    type Error = WeightCountError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        let weights = values.try_into().map_err(|_| WeightCountError {
            actual: values.len(),
        })?;
        Ok(Self(weights))
    }
}

impl TryFrom<Vec<f64>> for WeightVector {
    type Error = WeightCountError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::try_from(values.as_slice())
    }
}

impl From<WeightVector> for Vec<f64> {
    fn from(weights: WeightVector) -> Self {
        weights.0.to_vec()
    }
}

impl fmt::Display for WeightVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, w) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{w}")?;
        }
        Ok(())
    }
}

/// Which board the height factors of the score are measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeightSource {
    /// Heights of the board before the move, as the tuned weights expect.
    #[default]
    PreMove,
    /// Heights of the board after the move and its row clears.
    PostMove,
}

/// Raw feature values of one simulated placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementFeatures {
    pub rows_cleared: i32,
    pub holes: usize,
    pub bumpiness: usize,
    pub max_height: usize,
    pub height_range: usize,
}

impl PlacementFeatures {
    #[must_use]
    pub fn extract(before: &Board, simulated: &SimulatedMove<'_>, heights: HeightSource) -> Self {
        let after = simulated.board();
        let height_board = match heights {
            HeightSource::PreMove => before,
            HeightSource::PostMove => after,
        };
        let max_height = height_board.max_height();
        Self {
            rows_cleared: simulated.rows_cleared(),
            holes: count_holes(after),
            bumpiness: bumpiness(after),
            max_height,
            height_range: max_height - height_board.min_height(),
        }
    }
}

/// Empty cells with at least one occupied cell above them in the same column.
#[must_use]
pub fn count_holes(board: &Board) -> usize {
    let mut covered = 0u32;
    let mut holes = 0;
    for row in board.bit_rows().iter().rev() {
        covered |= row.bits();
        holes += (covered & !row.bits()).count_ones() as usize;
    }
    holes
}

/// Sum of squared height differences between neighbouring columns.
#[must_use]
pub fn bumpiness(board: &Board) -> usize {
    board
        .top()
        .windows(2)
        .map(|pair| pair[0].abs_diff(pair[1]).pow(2))
        .sum()
}

/// Scores placements as a weighted sum of board features.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeuristicScorer {
    weights: WeightVector,
    heights: HeightSource,
}

impl HeuristicScorer {
    #[must_use]
    pub const fn new(weights: WeightVector, heights: HeightSource) -> Self {
        Self { weights, heights }
    }

    #[must_use]
    pub const fn weights(&self) -> &WeightVector {
        &self.weights
    }

    #[must_use]
    pub const fn heights(&self) -> HeightSource {
        self.heights
    }

    /// Extracts the features of `simulated` against `before` and scores them.
    #[must_use]
    pub fn score_move(&self, before: &Board, simulated: &SimulatedMove<'_>) -> f64 {
        self.score(&PlacementFeatures::extract(before, simulated, self.heights))
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn score(&self, features: &PlacementFeatures) -> f64 {
        let max_height = features.max_height as f64;
        let height_range = features.height_range as f64;
        let factor = |feature| {
            let [w_max, w_range, w_const] = self.weights.triple(feature);
            w_max * max_height + w_range * height_range + w_const
        };

        let rows = f64::from(features.rows_cleared);
        factor(0) * rows * rows.abs() / 5.0
            + factor(1) * features.holes as f64 / 10.0
            + factor(2) * features.bumpiness as f64 / 1000.0
    }
}
