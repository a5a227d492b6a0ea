use crate::{
    Board, BoardDims, DropOutcome, GameStats, IllegalMoveError, Move, PieceKind, PieceSeed,
    PieceSet, PieceSource, RandomPieces,
};

/// Authoritative state of one simulated game.
///
/// Holds the live board, the piece about to be placed and the legal moves for it.
/// There is no falling piece and no gravity: a move is a (rotation, column) choice
/// and is applied as a hard drop.
///
/// The piece geometry is borrowed, so many games can share one [`PieceSet`].
#[derive(Debug, Clone)]
pub struct GameState<'a, S = RandomPieces> {
    pieces: &'a PieceSet,
    board: Board,
    // indexed by PieceKind; moves depend only on kind and board width
    legal_moves: Vec<Vec<Move>>,
    source: S,
    next_piece: PieceKind,
    stats: GameStats,
    turn: usize,
    lost: bool,
}

impl GameState<'static, RandomPieces> {
    /// A standard 21×10 game with the seven tetrominoes drawn uniformly at random.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(PieceSet::standard(), BoardDims::STANDARD, RandomPieces::new())
    }

    /// Like [`Self::standard`], with a reproducible piece sequence.
    #[must_use]
    pub fn standard_with_seed(seed: PieceSeed) -> Self {
        Self::new(
            PieceSet::standard(),
            BoardDims::STANDARD,
            RandomPieces::with_seed(seed),
        )
    }
}

impl<'a, S> GameState<'a, S>
where
    S: PieceSource,
{
    pub fn new(pieces: &'a PieceSet, dims: BoardDims, mut source: S) -> Self {
        let legal_moves = pieces
            .kinds()
            .map(|kind| pieces.legal_moves(kind, dims.cols()).collect())
            .collect();
        let next_piece = source.next_piece(pieces);
        Self {
            pieces,
            board: Board::new(dims),
            legal_moves,
            source,
            next_piece,
            stats: GameStats::new(),
            turn: 0,
            lost: false,
        }
    }

    #[must_use]
    pub fn pieces(&self) -> &'a PieceSet {
        self.pieces
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn dims(&self) -> BoardDims {
        self.board.dims()
    }

    /// The piece the next [`Self::make_move`] places.
    #[must_use]
    pub fn next_piece(&self) -> PieceKind {
        self.next_piece
    }

    /// Legal moves for [`Self::next_piece`], rotation-major with columns ascending.
    ///
    /// Empty when no rotation of the piece fits the board width.
    #[must_use]
    pub fn legal_moves(&self) -> &[Move] {
        &self.legal_moves[self.next_piece.index()]
    }

    #[must_use]
    pub fn has_lost(&self) -> bool {
        self.lost
    }

    #[must_use]
    pub fn rows_cleared(&self) -> usize {
        self.stats.total_cleared_rows()
    }

    /// Number of moves made so far, including the one that topped out.
    #[must_use]
    pub fn turn(&self) -> usize {
        self.turn
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Drops the next piece with `mv` and draws a new piece.
    ///
    /// A move that would stick out of the top of the board ends the game: the board
    /// is left unchanged and [`DropOutcome::ToppedOut`] is returned. Once the game is
    /// lost every further move tops out as well.
    pub fn make_move(&mut self, mv: Move) -> Result<DropOutcome, IllegalMoveError> {
        let kind = self.next_piece;
        let shape = self
            .pieces
            .shape(kind, mv.rotation)
            .filter(|shape| mv.column + shape.width() <= self.board.dims().cols())
            .ok_or(IllegalMoveError { kind, mv })?;
        if self.lost {
            return Ok(DropOutcome::ToppedOut);
        }

        self.turn += 1;
        let outcome = self.board.drop_piece(shape, mv.column);
        match outcome {
            DropOutcome::ToppedOut => self.lost = true,
            DropOutcome::Placed { rows_cleared, .. } => {
                self.stats.complete_piece_drop(rows_cleared);
                self.next_piece = self.source.next_piece(self.pieces);
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use crate::{CyclicPieces, PieceShape, PieceType};

    use super::*;

    fn single_block_set() -> PieceSet {
        let block = PieceShape::new(&[0], &[1]).unwrap();
        PieceSet::new(vec![PieceType::new('.', vec![block]).unwrap()]).unwrap()
    }

    #[test]
    fn test_standard_game_starts_empty() {
        let game = GameState::standard_with_seed(PieceSeed::from_bytes([1; 16]));
        assert_eq!(game.dims(), BoardDims::STANDARD);
        assert!(!game.has_lost());
        assert_eq!(game.rows_cleared(), 0);
        assert_eq!(game.board().max_height(), 0);
        assert!(!game.legal_moves().is_empty());
    }

    #[test]
    fn test_seeded_games_replay_identically() {
        let seed = PieceSeed::from_bytes([9; 16]);
        let mut a = GameState::standard_with_seed(seed);
        let mut b = GameState::standard_with_seed(seed);
        for _ in 0..10 {
            assert_eq!(a.next_piece(), b.next_piece());
            let mv = a.legal_moves()[0];
            assert_eq!(a.make_move(mv), b.make_move(mv));
        }
        assert_eq!(a.board(), b.board());
    }

    #[test]
    fn test_illegal_moves_are_rejected() {
        let set = PieceSet::standard();
        let o_piece = PieceKind::new(0);
        let mut game = GameState::new(set, BoardDims::STANDARD, CyclicPieces::repeat(o_piece));

        let bad_rotation = Move::new(1, 0);
        assert_eq!(
            game.make_move(bad_rotation),
            Err(IllegalMoveError {
                kind: o_piece,
                mv: bad_rotation
            })
        );
        assert!(game.make_move(Move::new(0, 9)).is_err());
        assert!(game.make_move(Move::new(0, 8)).is_ok());
        assert_eq!(game.turn(), 1);
    }

    #[test]
    fn test_rows_cleared_accumulate() {
        let set = single_block_set();
        let dims = BoardDims::new(4, 3).unwrap();
        let mut game = GameState::new(&set, dims, CyclicPieces::repeat(PieceKind::new(0)));
        for column in [0, 1, 2, 0, 1, 2] {
            game.make_move(Move::new(0, column)).unwrap();
        }
        assert_eq!(game.rows_cleared(), 2);
        assert_eq!(game.stats().completed_pieces(), 6);
        assert_eq!(game.board().occupied_count(), 0);
    }

    #[test]
    fn test_topping_out_loses_the_game() {
        let set = single_block_set();
        let dims = BoardDims::new(4, 3).unwrap();
        let mut game = GameState::new(&set, dims, CyclicPieces::repeat(PieceKind::new(0)));
        let mv = Move::new(0, 0);
        for _ in 0..3 {
            assert!(!game.make_move(mv).unwrap().is_topped_out());
        }
        let before = game.board().clone();
        assert_eq!(game.make_move(mv), Ok(DropOutcome::ToppedOut));
        assert!(game.has_lost());
        assert_eq!(game.turn(), 4);
        assert_eq!(game.board(), &before);

        // further moves keep reporting the loss without counting turns
        assert_eq!(game.make_move(mv), Ok(DropOutcome::ToppedOut));
        assert_eq!(game.turn(), 4);
    }

    #[test]
    fn test_piece_wider_than_board_has_no_moves() {
        let set = PieceSet::standard();
        let dims = BoardDims::new(10, 1).unwrap();
        let game = GameState::new(set, dims, CyclicPieces::repeat(PieceKind::new(0)));
        assert!(game.legal_moves().is_empty());
    }
}
