//! Fundamental grid and geometric types.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

/// Integer grid coordinate. x grows to the right, y grows downward in
/// screen space (the same axes as the parent frame before rotation).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const ORIGIN: Cell = Cell { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The four edge-sharing neighbours (E, W, S, N).
    pub fn neighbors(self) -> [Cell; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }
}

/// One of four quarter-turn orientations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Wraps any number of quarter turns into the four orientations.
    pub fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Self::R0,
            1 => Self::R90,
            2 => Self::R180,
            _ => Self::R270,
        }
    }

    pub fn quarter_turns(self) -> u8 {
        match self {
            Self::R0 => 0,
            Self::R90 => 1,
            Self::R180 => 2,
            Self::R270 => 3,
        }
    }

    /// Odd rotations swap a footprint's width and height.
    pub fn is_odd(self) -> bool {
        self.quarter_turns() % 2 == 1
    }

    /// Next orientation clockwise (R270 wraps to R0).
    pub fn rotated_cw(self) -> Self {
        Self::from_quarter_turns(self.quarter_turns() + 1)
    }

    pub fn radians(self) -> f64 {
        self.quarter_turns() as f64 * FRAC_PI_2
    }
}

impl TryFrom<u8> for Rotation {
    type Error = String;

    fn try_from(turns: u8) -> Result<Self, Self::Error> {
        if turns < 4 {
            Ok(Self::from_quarter_turns(turns))
        } else {
            Err(format!("rotation must be 0..=3 quarter turns, got {turns}"))
        }
    }
}

impl From<Rotation> for u8 {
    fn from(rotation: Rotation) -> Self {
        rotation.quarter_turns()
    }
}

/// Width × height in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    pub const UNIT: Footprint = Footprint {
        width: 1,
        height: 1,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Footprint after a rotation: odd quarter turns swap the axes.
    pub fn rotated(self, rotation: Rotation) -> Self {
        if rotation.is_odd() {
            Self::new(self.height, self.width)
        } else {
            self
        }
    }

    pub fn area(self) -> u32 {
        self.width * self.height
    }

    /// Every cell covered when the footprint's top-left corner sits on `origin`.
    pub fn cells(self, origin: Cell) -> impl Iterator<Item = Cell> {
        let (w, h) = (self.width as i32, self.height as i32);
        (0..w).flat_map(move |i| (0..h).map(move |j| origin.offset(i, j)))
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Stable handle of a mounted part. Handles are never reused within one
/// assembly, so they also order parts by insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl InstanceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
