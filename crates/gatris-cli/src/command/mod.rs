use clap::{Parser, Subcommand};
use gatris_engine::PieceSeed;
use gatris_evaluator::{
    fitness::{FitnessConfig, RandomGames},
    heuristic::HeightSource,
};

use self::{evaluate::EvaluateArg, train::TrainArg};

mod evaluate;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Tune heuristic weights with the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Play games with one weight vector and report its fitness
    Evaluate(#[clap(flatten)] EvaluateArg),
}

pub fn run() -> anyhow::Result<()> {
    let CommandArgs { mode } = CommandArgs::parse();
    match mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
    }
    Ok(())
}

/// Game settings shared by every mode that plays games.
#[derive(Debug, Clone, clap::Args)]
struct GameArg {
    /// Games played per fitness evaluation
    #[arg(long, default_value_t = 10)]
    games: usize,
    /// Maximum pieces per game
    #[arg(long, default_value_t = 200_000)]
    piece_limit: usize,
    /// Piece sequence seed as 32 hex digits (random when omitted)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Measure the height factors on the board after the move
    #[arg(long)]
    post_move_heights: bool,
}

impl GameArg {
    fn fitness_config(&self) -> FitnessConfig {
        FitnessConfig {
            games: self.games,
            piece_limit: self.piece_limit,
            heights: if self.post_move_heights {
                HeightSource::PostMove
            } else {
                HeightSource::PreMove
            },
        }
    }

    fn random_games(&self) -> RandomGames {
        self.seed.map_or_else(RandomGames::new, RandomGames::with_seed)
    }
}
