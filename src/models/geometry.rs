//! Grid coordinates, offsets and quarter-turn rotations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer grid cell coordinate. (0,0) is the top-left cell; y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift by an offset, saturating at the `i32` range.
    pub const fn offset_by(self, offset: Offset) -> Self {
        Self::new(self.x.saturating_add(offset.x), self.y.saturating_add(offset.y))
    }

    /// Shift by the negated offset, saturating at the `i32` range.
    pub const fn offset_back(self, offset: Offset) -> Self {
        Self::new(self.x.saturating_sub(offset.x), self.y.saturating_sub(offset.y))
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Displacement between an item's logical cell and where it is encoded/drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A rotation in 90 degree steps, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::Deg0, Rotation::Deg90, Rotation::Deg180, Rotation::Deg270];

    /// Parse an exact angle. Only 0, 90, 180 and 270 are accepted.
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// Normalize any multiple of 90 (including negatives) into [0, 360).
    ///
    /// Angles that are not multiples of 90 snap down to the previous quarter turn.
    pub fn normalized(degrees: i32) -> Self {
        match degrees.rem_euclid(360) / 90 {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }

    pub const fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Quarter turns clockwise (0..=3).
    pub const fn quarter_turns(self) -> u8 {
        (self.degrees() / 90) as u8
    }

    pub fn rotated_cw(self) -> Self {
        Self::normalized(self.degrees() as i32 + 90)
    }

    pub fn rotated_ccw(self) -> Self {
        Self::normalized(self.degrees() as i32 - 90)
    }

    /// The rotation modulo 180, used by rotationally symmetric items.
    pub fn symmetric(self) -> Self {
        Self::normalized((self.degrees() % 180) as i32)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.degrees())
    }
}

impl Serialize for Rotation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.degrees())
    }
}

impl<'de> Deserialize<'de> for Rotation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let degrees = u16::deserialize(deserializer)?;
        Rotation::from_degrees(degrees).ok_or_else(|| {
            serde::de::Error::custom(format!("rotation must be 0, 90, 180 or 270, got {}", degrees))
        })
    }
}
