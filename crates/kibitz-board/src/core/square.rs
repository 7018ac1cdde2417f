use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{ParseSquareError, core::piece::Color};

/// A square on the 8x8 board.
///
/// Squares are indexed `a1 = 0, b1 = 1, ..., h8 = 63`, so `index = rank * 8 + file`
/// with both file and rank in `0..8`.
///
/// # Example
///
/// ```
/// use kibitz_board::Square;
///
/// let e4: Square = "e4".parse().unwrap();
/// assert_eq!(e4.file(), 4);
/// assert_eq!(e4.rank(), 3);
/// assert_eq!(e4.offset(1, 1).unwrap().to_string(), "f5");
/// assert!(Square::new(0, 0).unwrap().offset(-1, 0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub const COUNT: usize = 64;

    #[must_use]
    pub const fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Self(rank * 8 + file))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        if (index as usize) < Self::COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    #[must_use]
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    #[inline]
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.0 / 8
    }

    /// Rank counted from `color`'s own side (0 = home rank, 7 = promotion rank).
    #[must_use]
    pub const fn relative_rank(self, color: Color) -> u8 {
        match color {
            Color::White => self.rank(),
            Color::Black => 7 - self.rank(),
        }
    }

    /// Returns the square `df` files and `dr` ranks away, or `None` off the board.
    #[must_use]
    pub fn offset(self, df: i8, dr: i8) -> Option<Self> {
        let file = i8::try_from(self.file()).ok()? + df;
        let rank = i8::try_from(self.rank()).ok()? + dr;
        Self::new(u8::try_from(file).ok()?, u8::try_from(rank).ok()?)
    }

    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        self.offset(direction.df, direction.dr)
    }

    /// Light squares are those where file + rank is odd (`a1` is dark).
    #[must_use]
    pub const fn is_light(self) -> bool {
        (self.file() + self.rank()) % 2 == 1
    }

    /// Chebyshev (king-move) distance.
    #[must_use]
    pub fn distance(self, other: Self) -> u8 {
        u8::max(
            self.file().abs_diff(other.file()),
            self.rank().abs_diff(other.rank()),
        )
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..64).map(Self)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = char::from(b'a' + self.file());
        let rank = char::from(b'1' + self.rank());
        write!(f, "{file}{rank}")
    }
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSquareError { name: s.to_owned() };
        let &[file, rank] = s.as_bytes() else {
            return Err(err());
        };
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(err());
        }
        Self::new(file - b'a', rank - b'1').ok_or_else(err)
    }
}

impl Serialize for Square {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A set of squares stored as a 64-bit mask (bit N = square index N).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SquareSet(u64);

impl SquareSet {
    pub const EMPTY: Self = Self(0);

    #[inline]
    #[must_use]
    pub const fn contains(self, square: Square) -> bool {
        self.0 & (1 << square.0) != 0
    }

    #[inline]
    pub fn insert(&mut self, square: Square) {
        self.0 |= 1 << square.0;
    }

    #[inline]
    pub fn remove(&mut self, square: Square) {
        self.0 &= !(1 << square.0);
    }

    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Square> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            #[expect(clippy::cast_possible_truncation)]
            let index = bits.trailing_zeros() as u8;
            bits &= bits - 1;
            Some(Square(index))
        })
    }
}

impl FromIterator<Square> for SquareSet {
    fn from_iter<T: IntoIterator<Item = Square>>(iter: T) -> Self {
        let mut set = Self::EMPTY;
        for square in iter {
            set.insert(square);
        }
        set
    }
}

/// A unit step on the board (file delta, rank delta).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
    pub df: i8,
    pub dr: i8,
}

impl Direction {
    pub const NORTH: Self = Self::new(0, 1);
    pub const SOUTH: Self = Self::new(0, -1);
    pub const EAST: Self = Self::new(1, 0);
    pub const WEST: Self = Self::new(-1, 0);
    pub const NORTH_EAST: Self = Self::new(1, 1);
    pub const NORTH_WEST: Self = Self::new(-1, 1);
    pub const SOUTH_EAST: Self = Self::new(1, -1);
    pub const SOUTH_WEST: Self = Self::new(-1, -1);

    pub const ORTHOGONAL: [Self; 4] = [Self::NORTH, Self::SOUTH, Self::EAST, Self::WEST];
    pub const DIAGONAL: [Self; 4] = [
        Self::NORTH_EAST,
        Self::NORTH_WEST,
        Self::SOUTH_EAST,
        Self::SOUTH_WEST,
    ];
    pub const ALL: [Self; 8] = [
        Self::NORTH,
        Self::SOUTH,
        Self::EAST,
        Self::WEST,
        Self::NORTH_EAST,
        Self::NORTH_WEST,
        Self::SOUTH_EAST,
        Self::SOUTH_WEST,
    ];
    pub const KNIGHT_JUMPS: [Self; 8] = [
        Self::new(1, 2),
        Self::new(2, 1),
        Self::new(2, -1),
        Self::new(1, -2),
        Self::new(-1, -2),
        Self::new(-2, -1),
        Self::new(-2, 1),
        Self::new(-1, 2),
    ];

    #[must_use]
    pub const fn new(df: i8, dr: i8) -> Self {
        Self { df, dr }
    }

    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        self.df != 0 && self.dr != 0
    }
}
