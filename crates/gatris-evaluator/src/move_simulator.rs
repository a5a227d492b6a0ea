//! Applies one candidate placement to a private scratch board.

use gatris_engine::{Board, BoardDims, DropOutcome, Move, PieceKind, PieceSet};

/// Rows-cleared value reported for a placement that tops out.
///
/// It feeds the rows term of the heuristic score like any other count, so losing
/// moves score as if they had "un-cleared" ten rows.
pub const GAME_OVER_ROWS_CLEARED: i32 = -10;

/// Result of [`MoveSimulator::simulate`].
#[derive(Debug, Clone, Copy)]
pub struct SimulatedMove<'a> {
    rows_cleared: i32,
    board: &'a Board,
}

impl<'a> SimulatedMove<'a> {
    /// Rows removed by the placement, or [`GAME_OVER_ROWS_CLEARED`].
    #[must_use]
    pub fn rows_cleared(&self) -> i32 {
        self.rows_cleared
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.rows_cleared == GAME_OVER_ROWS_CLEARED
    }

    /// Board after the placement. Equal to the input board for a game-over move.
    #[must_use]
    pub fn board(&self) -> &'a Board {
        self.board
    }
}

/// Simulates placements without touching the board it is given.
///
/// Owns one scratch board that is overwritten on every call, so a search over all
/// candidate moves performs no allocation after the first call.
#[derive(Debug, Clone)]
pub struct MoveSimulator {
    scratch: Board,
}

impl MoveSimulator {
    #[must_use]
    pub fn new(dims: BoardDims) -> Self {
        Self {
            scratch: Board::new(dims),
        }
    }

    /// Copies `board` into the scratch board and drops `kind` there with `mv`.
    ///
    /// # Panics
    ///
    /// Panics if `mv` is not a legal move for `kind` on a board of this width.
    pub fn simulate(
        &mut self,
        board: &Board,
        pieces: &PieceSet,
        kind: PieceKind,
        mv: Move,
    ) -> SimulatedMove<'_> {
        let Some(shape) = pieces.shape(kind, mv.rotation) else {
            panic!(
                "rotation {} out of range for piece {kind} ({} rotations)",
                mv.rotation,
                pieces.rotations(kind).len()
            );
        };

        self.scratch.clone_from(board);
        let rows_cleared = match self.scratch.drop_piece(shape, mv.column) {
            DropOutcome::Placed { rows_cleared, .. } => {
                i32::try_from(rows_cleared).expect("rows cleared fits in i32")
            }
            DropOutcome::ToppedOut => GAME_OVER_ROWS_CLEARED,
        };
        SimulatedMove {
            rows_cleared,
            board: &self.scratch,
        }
    }
}
