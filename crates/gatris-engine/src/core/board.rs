use std::fmt;

use crate::{DimsError, core::piece::PieceShape};

/// Board size in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardDims {
    rows: usize,
    cols: usize,
}

impl BoardDims {
    /// 21 rows by 10 columns.
    pub const STANDARD: Self = Self { rows: 21, cols: 10 };
    pub const MAX_COLS: usize = u32::BITS as usize;

    pub fn new(rows: usize, cols: usize) -> Result<Self, DimsError> {
        if rows == 0 {
            return Err(DimsError::NoRows);
        }
        if cols == 0 || cols > Self::MAX_COLS {
            return Err(DimsError::BadWidth {
                cols,
                max: Self::MAX_COLS,
            });
        }
        Ok(Self { rows, cols })
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }
}

impl Default for BoardDims {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Single board row stored as a bitmask, bit `c` set when column `c` is occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitRow {
    bits: u32,
}

impl BitRow {
    pub const EMPTY: Self = Self { bits: 0 };

    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.bits
    }

    #[inline]
    #[must_use]
    pub const fn is_cell_occupied(self, col: usize) -> bool {
        self.bits & (1 << col) != 0
    }

    #[inline]
    #[must_use]
    pub const fn occupied_count(self) -> u32 {
        self.bits.count_ones()
    }

    #[inline]
    fn occupy_cell(&mut self, col: usize) {
        self.bits |= 1 << col;
    }
}

/// Result of dropping a piece onto a [`Board`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The piece locked in place; `rows_cleared` full rows were removed.
    Placed {
        landing_row: usize,
        rows_cleared: usize,
    },
    /// The piece would stick out of the top of the board. The board is unchanged.
    ToppedOut,
}

impl DropOutcome {
    #[must_use]
    pub const fn is_topped_out(&self) -> bool {
        matches!(self, Self::ToppedOut)
    }
}

/// Occupancy grid with a per-column height array.
///
/// Row 0 is the bottom row. `top[c]` is one above the highest occupied cell of
/// column `c` (0 for an empty column). Every cell at or above `top[c]` is empty;
/// cells below it may be empty too (holes). All mutations keep `top` tight: the cell
/// at `top[c] - 1` is always occupied.
#[derive(Debug, PartialEq, Eq)]
pub struct Board {
    dims: BoardDims,
    full_row: u32,
    rows: Vec<BitRow>,
    top: Vec<usize>,
}

impl Clone for Board {
    fn clone(&self) -> Self {
        Self {
            dims: self.dims,
            full_row: self.full_row,
            rows: self.rows.clone(),
            top: self.top.clone(),
        }
    }

    // reuses the row and top buffers; simulators copy a board per candidate move
    fn clone_from(&mut self, source: &Self) {
        self.dims = source.dims;
        self.full_row = source.full_row;
        self.rows.clone_from(&source.rows);
        self.top.clone_from(&source.top);
    }
}

impl Board {
    #[must_use]
    pub fn new(dims: BoardDims) -> Self {
        let full_row = if dims.cols == BoardDims::MAX_COLS {
            u32::MAX
        } else {
            (1 << dims.cols) - 1
        };
        Self {
            dims,
            full_row,
            rows: vec![BitRow::EMPTY; dims.rows],
            top: vec![0; dims.cols],
        }
    }

    #[must_use]
    pub fn dims(&self) -> BoardDims {
        self.dims
    }

    /// Rows from bottom (index 0) to top.
    #[must_use]
    pub fn bit_rows(&self) -> &[BitRow] {
        &self.rows
    }

    #[must_use]
    pub fn top(&self) -> &[usize] {
        &self.top
    }

    #[must_use]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.rows[row].is_cell_occupied(col)
    }

    #[must_use]
    pub fn is_row_full(&self, row: usize) -> bool {
        self.rows[row].bits == self.full_row
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.rows.iter().map(|r| r.occupied_count() as usize).sum()
    }

    #[must_use]
    pub fn max_height(&self) -> usize {
        self.top.iter().copied().max().unwrap_or(0)
    }

    #[must_use]
    pub fn min_height(&self) -> usize {
        self.top.iter().copied().min().unwrap_or(0)
    }

    /// Row the piece's lowest cell comes to rest on when dropped at `column`.
    ///
    /// The collision test only looks at column heights: terrain below `top` may
    /// contain holes but never protrudes above it.
    ///
    /// # Panics
    ///
    /// Panics if the piece does not fit horizontally at `column`.
    #[must_use]
    pub fn landing_row(&self, shape: &PieceShape, column: usize) -> usize {
        assert!(
            column + shape.width() <= self.dims.cols,
            "piece of width {} does not fit at column {} of a {}-column board",
            shape.width(),
            column,
            self.dims.cols
        );
        // at least one column has bottom offset 0, so saturation never wins the max
        shape
            .bottom()
            .iter()
            .zip(&self.top[column..])
            .map(|(bottom, top)| top.saturating_sub(*bottom))
            .max()
            .unwrap_or(0)
    }

    /// Drops a piece at `column`, locks it, and removes completed rows.
    ///
    /// # Panics
    ///
    /// Panics if the piece does not fit horizontally at `column`.
    pub fn drop_piece(&mut self, shape: &PieceShape, column: usize) -> DropOutcome {
        let landing_row = self.landing_row(shape, column);
        if landing_row + shape.height() >= self.dims.rows {
            return DropOutcome::ToppedOut;
        }

        self.fill_piece(shape, column, landing_row);
        let rows_cleared = self.clear_rows(landing_row, landing_row + shape.height());
        DropOutcome::Placed {
            landing_row,
            rows_cleared,
        }
    }

    fn fill_piece(&mut self, shape: &PieceShape, column: usize, landing_row: usize) {
        for (c, (bottom, top)) in shape.bottom().iter().zip(shape.top()).enumerate() {
            let col = column + c;
            for row in &mut self.rows[landing_row + bottom..landing_row + top] {
                row.occupy_cell(col);
            }
            self.top[col] = landing_row + top;
        }
    }

    /// Removes full rows within `lowest..end`, scanning from the top down.
    ///
    /// Only rows touched by the last piece can have become full.
    fn clear_rows(&mut self, lowest: usize, end: usize) -> usize {
        let mut cleared = 0;
        for r in (lowest..end).rev() {
            if !self.is_row_full(r) {
                continue;
            }
            cleared += 1;
            self.rows.remove(r);
            self.rows.push(BitRow::EMPTY);
            for col in 0..self.dims.cols {
                self.top[col] -= 1;
                while self.top[col] >= 1 && !self.rows[self.top[col] - 1].is_cell_occupied(col) {
                    self.top[col] -= 1;
                }
            }
        }
        cleared
    }

    /// Builds a board from ASCII art, mainly for tests.
    ///
    /// `#` is an occupied cell and `.` an empty one. Rows are given top to bottom and
    /// are aligned to the bottom of the board; missing upper rows are empty.
    ///
    /// # Panics
    ///
    /// Panics if a row is not exactly `dims.cols()` cells wide or there are more rows
    /// than the board holds.
    #[must_use]
    pub fn from_ascii(dims: BoardDims, art: &str) -> Self {
        let mut board = Self::new(dims);
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= dims.rows,
            "board holds {} rows, got {}",
            dims.rows,
            lines.len()
        );

        for (i, line) in lines.iter().rev().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            assert_eq!(
                cells.len(),
                dims.cols,
                "Each row must have exactly {} cells, got {} at row {}",
                dims.cols,
                cells.len(),
                i
            );
            for (col, &ch) in cells.iter().enumerate() {
                if ch == '#' {
                    board.rows[i].occupy_cell(col);
                    board.top[col] = i + 1;
                }
            }
        }
        board
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows.iter().rev() {
            for col in 0..self.dims.cols {
                let ch = if row.is_cell_occupied(col) { '#' } else { '.' };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
