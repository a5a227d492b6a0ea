//! Board, piece geometry and game state for heuristic Tetris simulation.
//!
//! The engine is the authoritative side of a simulated game:
//!
//! - [`PieceSet`] / [`PieceShape`] - immutable per-(type, rotation) geometry tables
//! - [`Board`] - occupancy grid with a tight per-column `top` array
//! - [`GameState`] - live board, legal moves and piece sequencing
//!
//! Placement mechanics (landing row, filling, row clearing) live on [`Board`] so that
//! the authoritative game and the evaluator's private simulations share one rule set.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Board dimensions outside the supported range.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DimsError {
    #[display("board must have at least one row")]
    NoRows,
    #[display("board width must be between 1 and {max}, got {cols}")]
    BadWidth { cols: usize, max: usize },
}

/// Piece geometry rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeError {
    #[display("piece width must be between 1 and {max}, got {width}")]
    BadWidth { width: usize, max: usize },
    #[display("bottom and top offsets differ in length ({bottom} != {top})")]
    OffsetLengthMismatch { bottom: usize, top: usize },
    #[display("column {column} is empty (bottom {bottom} >= top {top})")]
    EmptyColumn {
        column: usize,
        bottom: usize,
        top: usize,
    },
    #[display("lowest cell must sit at offset 0")]
    Floating,
    #[display("piece type has no rotations")]
    NoRotations,
    #[display("piece set is empty")]
    EmptySet,
    #[display("piece set has too many types ({count})")]
    TooManyTypes { count: usize },
}

/// A move that cannot be applied to the current piece on the current board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("illegal move {mv} for piece {kind}")]
pub struct IllegalMoveError {
    pub kind: PieceKind,
    pub mv: Move,
}
