use std::path::PathBuf;

use anyhow::Context as _;
use gatris_evaluator::{
    fitness::{FitnessEvaluator, GameRecord},
    heuristic::WeightVector,
};

use super::GameArg;
use crate::model::WeightModel;

#[derive(Debug, Clone, clap::Args)]
#[group(required = true, multiple = false)]
struct WeightSourceArg {
    /// Comma-separated weight coefficients w0,..,w8
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    weights: Option<Vec<f64>>,
    /// Model file written by `train`
    #[arg(long)]
    model: Option<PathBuf>,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    #[clap(flatten)]
    source: WeightSourceArg,
    #[clap(flatten)]
    game: GameArg,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg { source, game } = arg;
    let weights = match (&source.weights, &source.model) {
        (Some(weights), _) => WeightVector::try_from(weights.as_slice())
            .context("Invalid --weights argument")?,
        (None, Some(path)) => WeightModel::open(path)?.weights,
        (None, None) => anyhow::bail!("either --weights or --model is required"),
    };

    let evaluator = FitnessEvaluator::new(game.fitness_config(), game.random_games());
    eprintln!("Evaluating [{weights}]");
    let records = evaluator.play_games(&weights);
    for (index, record) in records.iter().enumerate() {
        eprintln!(
            "  game {index:2}: {:>8} rows, {:>8} pieces",
            record.rows_cleared, record.pieces_played
        );
    }
    let fitness: f64 = records.iter().map(GameRecord::score).sum();
    println!("{fitness:.3}");

    Ok(())
}
