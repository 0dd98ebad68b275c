//! Grid coordinates, the six cardinal directions, and per-side bit masks.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CellPos
// ---------------------------------------------------------------------------

/// A cell on the 3D world grid. Ordered so position-keyed maps iterate
/// deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The adjacent cell in the given direction, or `None` past the edge of
    /// the coordinate range.
    pub fn offset(self, dir: Direction) -> Option<Self> {
        let (dx, dy, dz) = dir.offset();
        Some(Self::new(
            self.x.checked_add(dx)?,
            self.y.checked_add(dy)?,
            self.z.checked_add(dz)?,
        ))
    }

    /// The face-adjacent cells that exist, in [`Direction::ALL`] order.
    pub fn neighbors(self) -> impl Iterator<Item = (Direction, CellPos)> {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.offset(dir).map(|next| (dir, next)))
    }

    /// Manhattan distance to another position. Saturates at `u32::MAX`.
    pub fn manhattan_distance(&self, other: &CellPos) -> u32 {
        self.x
            .abs_diff(other.x)
            .saturating_add(self.y.abs_diff(other.y))
            .saturating_add(self.z.abs_diff(other.z))
    }
}

impl std::fmt::Display for CellPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// The six face directions of a cell. The discriminant is the index into
/// per-side arrays and masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Down = 0,
    Up = 1,
    North = 2,
    South = 3,
    West = 4,
    East = 5,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    /// Unit offset `(dx, dy, dz)`. Y is up, north is -Z.
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Direction::Down => (0, -1, 0),
            Direction::Up => (0, 1, 0),
            Direction::North => (0, 0, -1),
            Direction::South => (0, 0, 1),
            Direction::West => (-1, 0, 0),
            Direction::East => (1, 0, 0),
        }
    }
}

// ---------------------------------------------------------------------------
// SideMask
// ---------------------------------------------------------------------------

/// A set of sides, one bit per [`Direction`]. Serialized as its bits; bits
/// above the sixth are dropped when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct SideMask(u8);

impl From<u8> for SideMask {
    fn from(bits: u8) -> Self {
        Self::from_bits(bits)
    }
}

impl From<SideMask> for u8 {
    fn from(mask: SideMask) -> Self {
        mask.bits()
    }
}

impl SideMask {
    pub const NONE: SideMask = SideMask(0);
    pub const ALL: SideMask = SideMask(0b11_1111);

    /// Build a mask from raw bits. Bits above the sixth are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, dir: Direction) -> bool {
        self.0 & (1 << dir.index()) != 0
    }

    /// Set or clear a single side.
    pub fn set(&mut self, dir: Direction, on: bool) {
        if on {
            self.0 |= 1 << dir.index();
        } else {
            self.0 &= !(1 << dir.index());
        }
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Sides in the mask, in [`Direction::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }

    /// Two opposite sides are both set (a straight run).
    pub fn has_straight(self) -> bool {
        self.iter().any(|d| self.contains(d.opposite()))
    }

    /// Exactly two sides set and they are not opposite.
    pub fn is_corner(self) -> bool {
        self.count() == 2 && !self.has_straight()
    }

    /// Three or more sides set.
    pub fn is_intersection(self) -> bool {
        self.count() >= 3
    }
}

impl FromIterator<Direction> for SideMask {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut mask = SideMask::NONE;
        for dir in iter {
            mask.set(dir, true);
        }
        mask
    }
}
