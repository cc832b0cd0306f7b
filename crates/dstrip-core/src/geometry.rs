//! Geometric primitives for strip layout and cursor hit testing.
//!
//! Coordinates are `i32`: reconciliation passes transiently push positions
//! below zero before a later pass floors them, and graceful overflow lets an
//! occupied span end past the strip's visible length.

use serde::{Deserialize, Serialize};

/// Axis a strip lays its slots along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Slots run left to right; the major axis is `x`.
    #[default]
    Horizontal,
    /// Slots run top to bottom; the major axis is `y`.
    Vertical,
}

impl Orientation {
    /// Project a display point onto the major axis.
    #[inline]
    #[must_use]
    pub const fn major(self, point: Point) -> i32 {
        match self {
            Self::Horizontal => point.x,
            Self::Vertical => point.y,
        }
    }

    /// Project a display point onto the minor (cross) axis.
    #[inline]
    #[must_use]
    pub const fn minor(self, point: Point) -> i32 {
        match self {
            Self::Horizontal => point.y,
            Self::Vertical => point.x,
        }
    }
}

/// A point on the display, in the same units as strip coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A half-open 1D interval `[start, start + len)` along a strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Left edge (inclusive).
    pub start: i32,
    /// Occupied length; always positive for a live slot.
    pub len: i32,
}

impl Span {
    /// Create a new span.
    #[inline]
    #[must_use]
    pub const fn new(start: i32, len: i32) -> Self {
        Self { start, len }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn end(&self) -> i32 {
        self.start + self.len
    }

    /// Whether a coordinate falls inside the span.
    #[inline]
    #[must_use]
    pub const fn contains(&self, pos: i32) -> bool {
        pos >= self.start && pos < self.end()
    }

    /// Whether two spans share any coordinate.
    #[inline]
    #[must_use]
    pub const fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// Free distance between this span and one to its right.
    ///
    /// Negative when the spans overlap.
    #[inline]
    #[must_use]
    pub const fn gap_to(&self, right: &Span) -> i32 {
        right.start - self.end()
    }
}

/// An axis-aligned rectangle on the display.
///
/// Half-open on both axes, like the 1D spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Whether the rectangle has zero area.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether a point is inside the rectangle.
    #[inline]
    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Grow the rectangle by `margin` on every side.
    ///
    /// Used for the drag overlap tolerance: a cursor slightly past a strip's
    /// edge still counts as inside it.
    #[must_use]
    pub const fn inflate(&self, margin: i32) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + 2 * margin,
            height: self.height + 2 * margin,
        }
    }
}
