// src/world_map/rect.rs
//! Half-open view rectangles in grid-cell units.

use serde::{Deserialize, Serialize};

use super::error::RectIssue;

/// Hard cap on a view's width and height; bounds the per-frame scan.
pub const MAX_VIEW_EXTENT: i32 = 1000;

/// Integer grid coordinate of one tile (`y` is world Z).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle `(x, y, width, height)`.
///
/// A cell `(cx, cy)` is covered iff `x <= cx < x + width` and
/// `y <= cy < y + height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ViewRect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Number of covered cells (zero for degenerate rects).
    pub fn area(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    #[inline]
    pub fn contains(&self, cell: TileCoord) -> bool {
        // i64 so that rects touching i32::MAX don't overflow
        let (x, y) = (cell.x as i64, cell.y as i64);
        x >= self.x as i64
            && x < self.x as i64 + self.width as i64
            && y >= self.y as i64
            && y < self.y as i64 + self.height as i64
    }

    /// Checks the rect against `max_extent` without modifying it.
    pub fn check(&self, max_extent: i32) -> Result<(), RectIssue> {
        if self.width < 1 || self.height < 1 {
            return Err(RectIssue::NonPositive);
        }
        if self.width > max_extent || self.height > max_extent {
            return Err(RectIssue::TooLarge { max: max_extent });
        }
        if self.x.checked_add(self.width).is_none() || self.y.checked_add(self.height).is_none() {
            return Err(RectIssue::Overflow);
        }
        Ok(())
    }

    /// Shrinks width/height down to `max_extent`, keeping the origin.
    pub fn clamped(self, max_extent: i32) -> Self {
        Self {
            width: self.width.min(max_extent),
            height: self.height.min(max_extent),
            ..self
        }
    }

    /// Covered cells in row-major order (`y` outer, `x` inner).
    pub fn cells(&self) -> impl Iterator<Item = TileCoord> {
        let (x0, y0) = (self.x, self.y);
        let (w, h) = (self.width.max(0), self.height.max(0));
        (0..h).flat_map(move |dy| (0..w).map(move |dx| TileCoord::new(x0 + dx, y0 + dy)))
    }

    /// Cells covered by `self` but not by `old`, in row-major order.
    /// `None` stands for the empty sentinel rect.
    pub fn cells_not_in(&self, old: Option<ViewRect>) -> Vec<TileCoord> {
        match old {
            None => self.cells().collect(),
            Some(old) => self.cells().filter(|c| !old.contains(*c)).collect(),
        }
    }
}
