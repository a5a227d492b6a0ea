//! Fitness of a weight vector: play several full games and add up their scores.
//!
//! A game is played greedily: for every piece, [`MoveSearch`] picks the best placement
//! and only that placement is applied to the authoritative [`GameState`]. A game ends
//! when it is lost (a placement topped out, or the piece had no legal move) or when
//! the piece limit is reached. Its score is
//!
//! ```text
//! rows_cleared + pieces_played / 1000
//! ```
//!
//! so clearing rows dominates and survival breaks ties. The move that tops out is
//! counted as played.

use gatris_engine::{GameState, PieceSeed, PieceSource, RandomPieces};

use crate::{
    heuristic::{HeightSource, HeuristicScorer, WeightVector},
    move_search::MoveSearch,
};

/// Settings of a [`FitnessEvaluator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitnessConfig {
    /// Independent games per evaluation.
    pub games: usize,
    /// Maximum pieces per game.
    pub piece_limit: usize,
    pub heights: HeightSource,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            games: 10,
            piece_limit: 200_000,
            heights: HeightSource::PreMove,
        }
    }
}

/// Outcome of one simulated game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRecord {
    pub rows_cleared: usize,
    pub pieces_played: usize,
}

impl GameRecord {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn score(&self) -> f64 {
        self.rows_cleared as f64 + self.pieces_played as f64 / 1000.0
    }
}

/// Produces the fresh game each evaluation round starts from.
///
/// Implemented by [`RandomGames`] and by any `Fn(usize) -> GameState` closure, which
/// receives the index of the game within the evaluation.
pub trait GameFactory<'a> {
    type Source: PieceSource;

    fn new_game(&self, index: usize) -> GameState<'a, Self::Source>;
}

impl<'a, F, S> GameFactory<'a> for F
where
    F: Fn(usize) -> GameState<'a, S>,
    S: PieceSource,
{
    type Source = S;

    fn new_game(&self, index: usize) -> GameState<'a, S> {
        self(index)
    }
}

/// Standard 21×10 games with uniformly random tetrominoes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGames {
    seed: Option<PieceSeed>,
}

impl RandomGames {
    /// Every game draws a fresh seed from the thread-local entropy generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { seed: None }
    }

    /// Game `i` of every evaluation uses `seed.for_game(i)`, so repeated evaluations
    /// of the same weights see the same piece sequences.
    #[must_use]
    pub const fn with_seed(seed: PieceSeed) -> Self {
        Self { seed: Some(seed) }
    }

    #[must_use]
    pub const fn seed(&self) -> Option<PieceSeed> {
        self.seed
    }
}

impl GameFactory<'static> for RandomGames {
    type Source = RandomPieces;

    fn new_game(&self, index: usize) -> GameState<'static, RandomPieces> {
        match self.seed {
            Some(seed) => GameState::standard_with_seed(seed.for_game(index as u64)),
            None => GameState::standard(),
        }
    }
}

/// Plays `game` with `search` until it is lost or `piece_limit` pieces were placed.
pub fn play_game<S>(
    game: &mut GameState<'_, S>,
    search: &mut MoveSearch,
    piece_limit: usize,
) -> GameRecord
where
    S: PieceSource,
{
    let mut pieces_played = 0;
    while !game.has_lost() && pieces_played < piece_limit {
        // no legal move for this piece ends the game like a top-out
        let Some(best) = search.select_move(game) else {
            break;
        };
        game.make_move(best.mv)
            .expect("selected move comes from the game's legal moves");
        pieces_played += 1;
    }
    GameRecord {
        rows_cleared: game.rows_cleared(),
        pieces_played,
    }
}

/// Scores weight vectors by playing games with them.
///
/// # Example
///
/// ```
/// use gatris_evaluator::{
///     fitness::{FitnessConfig, FitnessEvaluator, RandomGames},
///     heuristic::WeightVector,
/// };
///
/// let config = FitnessConfig { games: 2, piece_limit: 50, ..FitnessConfig::default() };
/// let evaluator = FitnessEvaluator::new(config, RandomGames::new());
/// let fitness = evaluator.evaluate(&WeightVector::ZERO);
/// assert!(fitness > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct FitnessEvaluator<G> {
    config: FitnessConfig,
    games: G,
}

impl<'a, G> FitnessEvaluator<G>
where
    G: GameFactory<'a>,
{
    pub fn new(config: FitnessConfig, games: G) -> Self {
        Self { config, games }
    }

    #[must_use]
    pub fn config(&self) -> &FitnessConfig {
        &self.config
    }

    /// Sum of the scores of `config.games` independent games.
    #[must_use]
    pub fn evaluate(&self, weights: &WeightVector) -> f64 {
        self.play_games(weights).iter().map(GameRecord::score).sum()
    }

    /// Plays every game of one evaluation and returns the per-game records.
    #[must_use]
    pub fn play_games(&self, weights: &WeightVector) -> Vec<GameRecord> {
        let scorer = HeuristicScorer::new(*weights, self.config.heights);
        (0..self.config.games)
            .map(|index| {
                let mut game = self.games.new_game(index);
                let mut search = MoveSearch::new(game.dims(), scorer);
                let record = play_game(&mut game, &mut search, self.config.piece_limit);
                log::debug!(
                    "game {index}: {} rows cleared, {} pieces played",
                    record.rows_cleared,
                    record.pieces_played
                );
                record
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use gatris_engine::{BoardDims, CyclicPieces, PieceKind, PieceSet, PieceShape, PieceType};

    use super::*;
    use crate::{heuristic::PlacementFeatures, move_simulator::MoveSimulator};

    fn block_set() -> PieceSet {
        let block = PieceShape::new(&[0], &[1]).unwrap();
        PieceSet::new(vec![PieceType::new('.', vec![block]).unwrap()]).unwrap()
    }

    fn block_game(set: &PieceSet) -> GameState<'_, CyclicPieces> {
        GameState::new(
            set,
            BoardDims::new(4, 3).unwrap(),
            CyclicPieces::repeat(PieceKind::new(0)),
        )
    }

    // rewards cleared rows, penalises bumpiness
    const CLEARING_WEIGHTS: WeightVector =
        WeightVector::new([0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, -1.0]);

    #[test]
    fn test_zero_weights_regression() {
        let set = block_set();
        let evaluator =
            FitnessEvaluator::new(FitnessConfig::default(), |_: usize| block_game(&set));
        // every game stacks column 0: three pieces lock and the fourth tops out
        let records = evaluator.play_games(&WeightVector::ZERO);
        let expected = GameRecord {
            rows_cleared: 0,
            pieces_played: 4,
        };
        assert_eq!(records, vec![expected; 10]);
        let fitness = evaluator.evaluate(&WeightVector::ZERO);
        assert!((fitness - 0.04).abs() < 1e-12, "fitness = {fitness}");
    }

    #[test]
    fn test_third_drop_clears_a_row_without_holes() {
        let set = block_set();
        let mut game = block_game(&set);
        let scorer = HeuristicScorer::new(CLEARING_WEIGHTS, HeightSource::PreMove);
        let mut search = MoveSearch::new(game.dims(), scorer);

        let mut chosen = vec![];
        for _ in 0..3 {
            let best = search.select_move(&game).unwrap();
            chosen.push(best.mv.column);
            if chosen.len() == 3 {
                let mut simulator = MoveSimulator::new(game.dims());
                let simulated =
                    simulator.simulate(game.board(), &set, game.next_piece(), best.mv);
                let features =
                    PlacementFeatures::extract(game.board(), &simulated, HeightSource::PreMove);
                assert_eq!(features.rows_cleared, 1);
                assert_eq!(features.holes, 0);
            }
            game.make_move(best.mv).unwrap();
        }
        assert_eq!(chosen, [0, 1, 2]);
        assert_eq!(game.rows_cleared(), 1);
        assert_eq!(game.board().occupied_count(), 0);
    }

    #[test]
    fn test_piece_limit_stops_endless_games() {
        let set = block_set();
        let config = FitnessConfig {
            games: 2,
            piece_limit: 30,
            ..FitnessConfig::default()
        };
        let evaluator = FitnessEvaluator::new(config, |_: usize| block_game(&set));
        let records = evaluator.play_games(&CLEARING_WEIGHTS);
        assert_eq!(
            records,
            [GameRecord {
                rows_cleared: 10,
                pieces_played: 30
            }; 2]
        );
        let fitness = evaluator.evaluate(&CLEARING_WEIGHTS);
        assert!((fitness - 20.06).abs() < 1e-9, "fitness = {fitness}");
    }

    #[test]
    fn test_no_legal_moves_ends_the_game() {
        // the O piece is two cells wide and never fits a single column
        let mut game = GameState::new(
            PieceSet::standard(),
            BoardDims::new(5, 1).unwrap(),
            CyclicPieces::repeat(PieceKind::new(0)),
        );
        let mut search = MoveSearch::new(game.dims(), HeuristicScorer::default());
        let record = play_game(&mut game, &mut search, 100);
        assert_eq!(
            record,
            GameRecord {
                rows_cleared: 0,
                pieces_played: 0
            }
        );
    }

    #[test]
    fn test_seeded_random_games_are_reproducible() {
        let config = FitnessConfig {
            games: 3,
            piece_limit: 40,
            ..FitnessConfig::default()
        };
        let seed = PieceSeed::from_bytes([42; 16]);
        let weights = WeightVector::new([0.0, 0.0, 1.0, 0.0, 0.0, -1.0, 0.0, 0.0, -1.0]);
        let a = FitnessEvaluator::new(config, RandomGames::with_seed(seed));
        let b = FitnessEvaluator::new(config, RandomGames::with_seed(seed));
        let records = a.play_games(&weights);
        assert_eq!(records.len(), 3);
        assert_eq!(records, b.play_games(&weights));
        assert!(records.iter().all(|r| r.pieces_played > 0));
    }

    #[test]
    fn test_score_weights_rows_over_pieces() {
        let record = GameRecord {
            rows_cleared: 3,
            pieces_played: 2500,
        };
        assert!((record.score() - 5.5).abs() < 1e-12);
    }
}
