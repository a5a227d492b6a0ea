//! Greedy one-piece lookahead: simulate every legal move, keep the best score.

use gatris_engine::{Board, BoardDims, GameState, Move, PieceKind, PieceSet, PieceSource};

use crate::{heuristic::HeuristicScorer, move_simulator::MoveSimulator};

/// A move together with the heuristic score of its placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: f64,
}

/// Picks the highest-scoring placement for the next piece.
///
/// Candidates are visited in legal-move order (rotation-major, columns ascending) and
/// a later candidate replaces the current best only if its score is strictly greater,
/// so ties go to the first move enumerated. Game-over placements are scored like any
/// other move and can be selected when nothing better exists.
#[derive(Debug, Clone)]
pub struct MoveSearch {
    simulator: MoveSimulator,
    scorer: HeuristicScorer,
}

impl MoveSearch {
    #[must_use]
    pub fn new(dims: BoardDims, scorer: HeuristicScorer) -> Self {
        Self {
            simulator: MoveSimulator::new(dims),
            scorer,
        }
    }

    #[must_use]
    pub fn scorer(&self) -> &HeuristicScorer {
        &self.scorer
    }

    /// Selects a move for the game's next piece, or `None` if it has no legal moves.
    pub fn select_move<S>(&mut self, game: &GameState<'_, S>) -> Option<ScoredMove>
    where
        S: PieceSource,
    {
        self.select_among(
            game.board(),
            game.pieces(),
            game.next_piece(),
            game.legal_moves(),
        )
    }

    /// Selects the best of `moves` for `kind` dropped onto `board`.
    ///
    /// If no candidate scores above `f64::MIN` (all scores NaN or -inf) the first
    /// candidate is returned.
    pub fn select_among(
        &mut self,
        board: &Board,
        pieces: &PieceSet,
        kind: PieceKind,
        moves: &[Move],
    ) -> Option<ScoredMove> {
        let mut first = None;
        let mut best_score = f64::MIN;
        let mut best = None;

        for &mv in moves {
            let simulated = self.simulator.simulate(board, pieces, kind, mv);
            let score = self.scorer.score_move(board, &simulated);
            let candidate = ScoredMove { mv, score };
            first.get_or_insert(candidate);
            if score > best_score {
                best_score = score;
                best = Some(candidate);
            }
        }

        best.or(first)
    }
}
