// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Axis-aligned rectangles in pixel coordinates.

/// A rectangle of whole pixels, anchored at its top-left corner.
///
/// Coordinates are unsigned, an image always starts at `(0, 0)`. The exclusive edges are given by
/// [`Rect::right`] and [`Rect::bottom`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Column of the left-most pixel.
    pub x: usize,
    /// Row of the top-most pixel.
    pub y: usize,
    /// Number of pixel columns.
    pub w: usize,
    /// Number of pixel rows.
    pub h: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, w: usize, h: usize) -> Self {
        Rect { x, y, w, h }
    }

    /// A rectangle at the origin, such as the full extent of an image.
    pub const fn with_size(w: usize, h: usize) -> Self {
        Rect { x: 0, y: 0, w, h }
    }

    /// The first column past the rectangle.
    pub const fn right(&self) -> usize {
        self.x.saturating_add(self.w)
    }

    /// The first row past the rectangle.
    pub const fn bottom(&self) -> usize {
        self.y.saturating_add(self.h)
    }

    /// The number of pixels covered.
    pub const fn area(&self) -> usize {
        self.w.saturating_mul(self.h)
    }

    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Check if `other` lies entirely within this rectangle.
    ///
    /// An empty rectangle is contained when its anchor is within the closed extent of `self`.
    /// Edges that overflow `usize` are never contained.
    pub fn contains(&self, other: &Rect) -> bool {
        let (Some(right), Some(bottom)) = (other.x.checked_add(other.w), other.y.checked_add(other.h))
        else {
            return false;
        };

        other.x >= self.x && other.y >= self.y && right <= self.right() && bottom <= self.bottom()
    }

    pub const fn contains_point(&self, x: usize, y: usize) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }

    /// The common part of two rectangles, if they overlap at all.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }
}
