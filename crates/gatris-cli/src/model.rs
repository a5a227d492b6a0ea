use std::path::Path;

use chrono::{DateTime, Utc};
use gatris_evaluator::heuristic::WeightVector;
use serde::{Deserialize, Serialize};

use crate::util;

/// Best weight vector of a training run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeightModel {
    pub trained_at: DateTime<Utc>,
    pub fitness: f64,
    pub weights: WeightVector,
}

impl WeightModel {
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        util::read_json_file("weight model", path)
    }
}
