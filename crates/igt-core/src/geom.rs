use core::fmt;

use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle, half-open on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle from row bounds `y0..y1` and column bounds `x0..x1`.
    ///
    /// Reversed bounds collapse to an empty extent.
    pub const fn from_bounds(y0: usize, y1: usize, x0: usize, x1: usize) -> Self {
        Self {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }

    pub const fn right(&self) -> usize {
        self.x + self.width
    }

    pub const fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        self.x <= width
            && self.y <= height
            && self.width <= width - self.x
            && self.height <= height - self.y
    }

    /// Moves the rectangle by a signed offset; `None` if it would leave the
    /// non-negative quadrant.
    pub fn offset(&self, dx: isize, dy: isize) -> Option<Self> {
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Self { x, y, ..*self })
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[x {}..{}, y {}..{}]",
            self.x,
            self.right(),
            self.y,
            self.bottom()
        )
    }
}
