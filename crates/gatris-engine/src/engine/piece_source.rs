use std::{fmt::Write as _, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{PieceKind, PieceSet};

/// Supplies the sequence of pieces a [`GameState`](crate::GameState) plays.
pub trait PieceSource {
    /// Draws the next piece kind from `pieces`.
    fn next_piece(&mut self, pieces: &PieceSet) -> PieceKind;
}

/// Uniformly random piece choice, driven by a seedable PCG generator.
///
/// Each piece kind of the set is drawn independently with equal probability.
///
/// # Example
///
/// ```
/// use gatris_engine::{PieceSet, PieceSource as _, RandomPieces, PieceSeed};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let mut a = RandomPieces::with_seed(seed);
/// let mut b = RandomPieces::with_seed(seed);
///
/// let set = PieceSet::standard();
/// for _ in 0..16 {
///     assert_eq!(a.next_piece(set), b.next_piece(set));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RandomPieces {
    rng: Pcg32,
}

impl Default for RandomPieces {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPieces {
    /// Creates a source seeded from the thread-local entropy generator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
        }
    }
}

impl PieceSource for RandomPieces {
    #[expect(clippy::cast_possible_truncation)]
    fn next_piece(&mut self, pieces: &PieceSet) -> PieceKind {
        // PieceSet guarantees at most u8::MAX kinds
        PieceKind::new(self.rng.random_range(0..pieces.len()) as u8)
    }
}

/// Replays a fixed sequence of pieces, wrapping around at the end.
///
/// Used for deterministic games, for example a single-piece set in tests.
#[derive(Debug, Clone)]
pub struct CyclicPieces {
    sequence: Vec<PieceKind>,
    position: usize,
}

impl CyclicPieces {
    /// # Panics
    ///
    /// Panics if `sequence` is empty.
    #[must_use]
    pub fn new(sequence: Vec<PieceKind>) -> Self {
        assert!(!sequence.is_empty(), "piece sequence must not be empty");
        Self {
            sequence,
            position: 0,
        }
    }

    /// A source that always yields the same piece.
    #[must_use]
    pub fn repeat(kind: PieceKind) -> Self {
        Self::new(vec![kind])
    }
}

impl PieceSource for CyclicPieces {
    fn next_piece(&mut self, pieces: &PieceSet) -> PieceKind {
        let kind = self.sequence[self.position];
        debug_assert!(kind.index() < pieces.len(), "{kind} is not in the piece set");
        self.position = (self.position + 1) % self.sequence.len();
        kind
    }
}

/// 128-bit seed for deterministic piece sequences.
///
/// Serialized as a 32-character lowercase hex string, and parsed from the same form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

/// A seed string that is not 32 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid piece seed {input:?}: expected 32 hex characters")]
pub struct ParseSeedError {
    input: String,
}

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Derives an independent seed for the `index`-th game of a batch.
    ///
    /// Index 0 yields the seed itself.
    #[must_use]
    pub fn for_game(self, index: u64) -> Self {
        // odd 128-bit constant derived from the golden ratio
        const SPREAD: u128 = 0x9e37_79b9_7f4a_7c15_f39c_c060_5ced_c835;
        let mixed = u128::from_be_bytes(self.0) ^ u128::from(index).wrapping_mul(SPREAD);
        Self(mixed.to_be_bytes())
    }
}

impl FromStr for PieceSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| err())?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl std::fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{self}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}
