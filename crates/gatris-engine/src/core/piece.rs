use std::{fmt, sync::LazyLock};

use arrayvec::ArrayVec;

use crate::ShapeError;

/// Widest piece a [`PieceShape`] can describe.
pub const MAX_PIECE_WIDTH: usize = 4;

/// Geometry of one rotation of one piece type.
///
/// The shape is described column by column, left to right. For every column `c`
/// the piece occupies rows `bottom[c]..top[c]` relative to the piece's landing row.
/// The lowest cell of the piece always sits at offset 0.
///
/// ```text
/// T pointing down:      bottom = [1, 0, 1]
///   # # #               top    = [2, 2, 2]
///     #                 height = 2
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceShape {
    bottom: ArrayVec<usize, MAX_PIECE_WIDTH>,
    top: ArrayVec<usize, MAX_PIECE_WIDTH>,
    height: usize,
}

impl PieceShape {
    /// Builds a shape from per-column bottom and top offsets.
    pub fn new(bottom: &[usize], top: &[usize]) -> Result<Self, ShapeError> {
        if bottom.len() != top.len() {
            return Err(ShapeError::OffsetLengthMismatch {
                bottom: bottom.len(),
                top: top.len(),
            });
        }
        if bottom.is_empty() || bottom.len() > MAX_PIECE_WIDTH {
            return Err(ShapeError::BadWidth {
                width: bottom.len(),
                max: MAX_PIECE_WIDTH,
            });
        }
        for (column, (&b, &t)) in bottom.iter().zip(top).enumerate() {
            if b >= t {
                return Err(ShapeError::EmptyColumn {
                    column,
                    bottom: b,
                    top: t,
                });
            }
        }
        if bottom.iter().min() != Some(&0) {
            return Err(ShapeError::Floating);
        }

        let height = top.iter().copied().max().unwrap_or(0);
        Ok(Self {
            bottom: bottom.iter().copied().collect(),
            top: top.iter().copied().collect(),
            height,
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.bottom.len()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Offset of the lowest occupied cell in each column.
    #[must_use]
    pub fn bottom(&self) -> &[usize] {
        &self.bottom
    }

    /// Offset one above the highest occupied cell in each column.
    #[must_use]
    pub fn top(&self) -> &[usize] {
        &self.top
    }

    /// Number of cells the piece occupies.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.bottom.iter().zip(&self.top).map(|(b, t)| t - b).sum()
    }
}

/// Index of a piece type within a [`PieceSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceKind(u8);

impl PieceKind {
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A placement choice: which rotation, and which column the piece's left edge lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub rotation: usize,
    pub column: usize,
}

impl Move {
    #[must_use]
    pub const fn new(rotation: usize, column: usize) -> Self {
        Self { rotation, column }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}@{}", self.rotation, self.column)
    }
}

/// One piece type with all of its distinct rotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceType {
    name: char,
    rotations: Vec<PieceShape>,
}

impl PieceType {
    pub fn new(name: char, rotations: Vec<PieceShape>) -> Result<Self, ShapeError> {
        if rotations.is_empty() {
            return Err(ShapeError::NoRotations);
        }
        Ok(Self { name, rotations })
    }

    #[must_use]
    pub fn name(&self) -> char {
        self.name
    }

    #[must_use]
    pub fn rotations(&self) -> &[PieceShape] {
        &self.rotations
    }
}

/// Immutable geometry tables for every piece type of a game.
///
/// The standard seven tetrominoes are built once per process and shared through
/// [`PieceSet::standard`]. Other sets (for instance a single 1×1 block) can be built
/// with [`PieceSet::new`] and borrowed by games the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceSet {
    types: Vec<PieceType>,
}

static STANDARD: LazyLock<PieceSet> = LazyLock::new(build_standard);

impl PieceSet {
    pub fn new(types: Vec<PieceType>) -> Result<Self, ShapeError> {
        if types.is_empty() {
            return Err(ShapeError::EmptySet);
        }
        if types.len() > usize::from(u8::MAX) {
            return Err(ShapeError::TooManyTypes { count: types.len() });
        }
        Ok(Self { types })
    }

    /// The seven tetrominoes in the order O, I, L, J, T, S, Z.
    #[must_use]
    pub fn standard() -> &'static PieceSet {
        &STANDARD
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    #[expect(clippy::cast_possible_truncation)]
    pub fn kinds(&self) -> impl Iterator<Item = PieceKind> + use<> {
        (0..self.types.len()).map(|i| PieceKind::new(i as u8))
    }

    #[must_use]
    pub fn piece_type(&self, kind: PieceKind) -> &PieceType {
        &self.types[kind.index()]
    }

    #[must_use]
    pub fn rotations(&self, kind: PieceKind) -> &[PieceShape] {
        self.piece_type(kind).rotations()
    }

    #[must_use]
    pub fn shape(&self, kind: PieceKind, rotation: usize) -> Option<&PieceShape> {
        self.rotations(kind).get(rotation)
    }

    /// Every move that fits a board `cols` wide, rotation-major, columns ascending.
    ///
    /// This order is the tie-break order of move search and must stay stable.
    pub fn legal_moves(&self, kind: PieceKind, cols: usize) -> impl Iterator<Item = Move> + '_ {
        self.rotations(kind)
            .iter()
            .enumerate()
            .flat_map(move |(rotation, shape)| {
                let last = (cols + 1).saturating_sub(shape.width());
                (0..last).map(move |column| Move::new(rotation, column))
            })
    }
}

fn build_standard() -> PieceSet {
    // (name, [(bottom, top)]) per rotation
    const TABLE: &[(char, &[(&[usize], &[usize])])] = &[
        ('O', &[(&[0, 0], &[2, 2])]),
        ('I', &[(&[0], &[4]), (&[0, 0, 0, 0], &[1, 1, 1, 1])]),
        (
            'L',
            &[
                (&[0, 0], &[3, 1]),
                (&[0, 1, 1], &[2, 2, 2]),
                (&[2, 0], &[3, 3]),
                (&[0, 0, 0], &[1, 1, 2]),
            ],
        ),
        (
            'J',
            &[
                (&[0, 0], &[1, 3]),
                (&[0, 0, 0], &[2, 1, 1]),
                (&[0, 2], &[3, 3]),
                (&[1, 1, 0], &[2, 2, 2]),
            ],
        ),
        (
            'T',
            &[
                (&[0, 1], &[3, 2]),
                (&[1, 0, 1], &[2, 2, 2]),
                (&[1, 0], &[2, 3]),
                (&[0, 0, 0], &[1, 2, 1]),
            ],
        ),
        ('S', &[(&[0, 0, 1], &[1, 2, 2]), (&[1, 0], &[3, 2])]),
        ('Z', &[(&[1, 0, 0], &[2, 2, 1]), (&[0, 1], &[2, 3])]),
    ];

    let types = TABLE
        .iter()
        .map(|(name, rotations)| {
            let rotations = rotations
                .iter()
                .map(|(bottom, top)| PieceShape::new(bottom, top))
                .collect::<Result<Vec<_>, _>>()?;
            PieceType::new(*name, rotations)
        })
        .collect::<Result<Vec<_>, _>>()
        .expect("standard piece table is well-formed");
    PieceSet::new(types).expect("standard piece table is non-empty")
}
