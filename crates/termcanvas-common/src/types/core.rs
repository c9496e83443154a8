use serde::{Deserialize, Serialize};
use std::fmt;

use super::color::ColorRef;

/// Canvas coordinate. Ordered row-major so iteration walks the canvas
/// top-to-bottom, left-to-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Rectangle given by two corners in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl Region {
    pub const fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Swap corners so that `x1 <= x2` and `y1 <= y2`.
    pub fn normalized(self) -> Self {
        Self {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }

    /// Zero width or zero height.
    pub fn is_degenerate(&self) -> bool {
        self.x1 == self.x2 || self.y1 == self.y2
    }

    /// Inclusive containment test on the normalized rectangle.
    pub fn contains(&self, point: Point) -> bool {
        let r = self.normalized();
        (r.x1..=r.x2).contains(&point.x) && (r.y1..=r.y2).contains(&point.y)
    }

    /// Smallest row touched by the region.
    pub fn top(&self) -> u16 {
        self.y1.min(self.y2)
    }

    /// Number of cells covered, corners included.
    pub fn area(&self) -> u64 {
        let r = self.normalized();
        (u64::from(r.x2 - r.x1) + 1) * (u64::from(r.y2 - r.y1) + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Style {
    pub fg: ColorRef,
    pub bg: ColorRef,
}

impl Style {
    pub const fn new(fg: ColorRef, bg: ColorRef) -> Self {
        Self { fg, bg }
    }

    pub const fn fg(fg: ColorRef) -> Self {
        Self {
            fg,
            bg: ColorRef::Reset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Cell {
    pub const fn new(ch: char, style: Style) -> Self {
        Self { ch, style }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::default(),
        }
    }
}
