// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Cursors over the pixels of a rectangular area.
//!
//! Both iterators walk their area left-to-right, top-to-bottom. When the cursor passes the right
//! edge of the *area*, not of the image, it continues at the left edge of the area one row further
//! down. The end position is the left edge of the first row below the area.
use core::fmt;
use core::iter::FusedIterator;

use crate::format::PixelFormat;
use crate::rect::Rect;

/// A pixel coordinate reached by a cursor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

/// Shared address bookkeeping of both iterators.
struct Cursor<F: PixelFormat> {
    area: Rect,
    stride: usize,
    x: usize,
    y: usize,
    row: F::Address,
    address: F::Address,
}

impl<F: PixelFormat> Cursor<F> {
    fn begin(stride: usize, area: Rect) -> Self {
        if area.is_empty() {
            Self::end(stride, area)
        } else {
            Self::at(stride, area, area.y)
        }
    }

    fn end(stride: usize, area: Rect) -> Self {
        Self::at(stride, area, area.bottom())
    }

    fn at(stride: usize, area: Rect, y: usize) -> Self {
        let row = F::address_of(stride, area.x, y);
        Cursor {
            area,
            stride,
            x: area.x,
            y,
            row,
            address: row,
        }
    }

    fn position(&self) -> Position {
        Position {
            x: self.x,
            y: self.y,
        }
    }

    fn is_end(&self) -> bool {
        self.y >= self.area.bottom()
    }

    fn advance(&mut self) {
        assert!(!self.is_end(), "advancing a pixel iterator past its end");

        self.x += 1;
        if self.x == self.area.right() {
            self.x = self.area.x;
            self.y += 1;
            self.row = F::next_row(self.row, self.stride);
            self.address = self.row;
        } else {
            self.address = F::next_pixel(self.address);
        }
    }

    fn remaining(&self) -> usize {
        if self.is_end() {
            return 0;
        }

        let full_rows = self.area.bottom() - self.y - 1;
        full_rows * self.area.w + (self.area.right() - self.x)
    }
}

impl<F: PixelFormat> Clone for Cursor<F> {
    fn clone(&self) -> Self {
        Cursor { ..*self }
    }
}

impl<F: PixelFormat> Copy for Cursor<F> {}

/// Reads the pixels of an area.
///
/// This is both a cursor, with explicit [`get`](PixelIter::get) and
/// [`advance`](PixelIter::advance), and an [`Iterator`] over the pixel values. Two iterators over
/// the same area compare equal when they point at the same pixel, so a view's `begin()` can be
/// stepped until it equals its `end()`.
pub struct PixelIter<'a, F: PixelFormat> {
    bytes: &'a [u8],
    cursor: Cursor<F>,
}

/// Reads and writes the pixels of an area.
///
/// Mutable cursors can not be duplicated, compare their [`position`](PixelIterMut::position) with
/// the end position of the view or use [`is_end`](PixelIterMut::is_end) instead.
pub struct PixelIterMut<'a, F: PixelFormat> {
    bytes: &'a mut [u8],
    cursor: Cursor<F>,
}

impl<'a, F: PixelFormat> PixelIter<'a, F> {
    pub(crate) fn begin(bytes: &'a [u8], stride: usize, area: Rect) -> Self {
        PixelIter {
            bytes,
            cursor: Cursor::begin(stride, area),
        }
    }

    pub(crate) fn end(bytes: &'a [u8], stride: usize, area: Rect) -> Self {
        PixelIter {
            bytes,
            cursor: Cursor::end(stride, area),
        }
    }

    pub fn x(&self) -> usize {
        self.cursor.x
    }

    pub fn y(&self) -> usize {
        self.cursor.y
    }

    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    /// The address of the current pixel within the image bytes.
    pub fn address(&self) -> F::Address {
        self.cursor.address
    }

    pub fn is_end(&self) -> bool {
        self.cursor.is_end()
    }

    /// The value of the current pixel.
    ///
    /// # Panics
    ///
    /// When the iterator is at its end.
    pub fn get(&self) -> F::Pixel {
        assert!(!self.is_end(), "reading a pixel iterator at its end");
        F::get(self.bytes, self.cursor.address)
    }

    /// Step to the next pixel.
    ///
    /// # Panics
    ///
    /// When the iterator is already at its end.
    pub fn advance(&mut self) {
        self.cursor.advance();
    }
}

impl<'a, F: PixelFormat> PixelIterMut<'a, F> {
    pub(crate) fn begin(bytes: &'a mut [u8], stride: usize, area: Rect) -> Self {
        PixelIterMut {
            bytes,
            cursor: Cursor::begin(stride, area),
        }
    }

    pub fn x(&self) -> usize {
        self.cursor.x
    }

    pub fn y(&self) -> usize {
        self.cursor.y
    }

    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    pub fn address(&self) -> F::Address {
        self.cursor.address
    }

    pub fn is_end(&self) -> bool {
        self.cursor.is_end()
    }

    /// # Panics
    ///
    /// When the iterator is at its end.
    pub fn get(&self) -> F::Pixel {
        assert!(!self.is_end(), "reading a pixel iterator at its end");
        F::get(self.bytes, self.cursor.address)
    }

    /// Overwrite the current pixel.
    ///
    /// # Panics
    ///
    /// When the iterator is at its end.
    pub fn put(&mut self, pixel: F::Pixel) {
        assert!(!self.is_end(), "writing a pixel iterator at its end");
        F::put(self.bytes, self.cursor.address, pixel);
    }

    /// # Panics
    ///
    /// When the iterator is already at its end.
    pub fn advance(&mut self) {
        self.cursor.advance();
    }

    /// A read-only iterator starting at the current pixel.
    pub fn as_iter(&self) -> PixelIter<'_, F> {
        PixelIter {
            bytes: &*self.bytes,
            cursor: self.cursor,
        }
    }
}

impl<F: PixelFormat> Iterator for PixelIter<'_, F> {
    type Item = F::Pixel;

    fn next(&mut self) -> Option<F::Pixel> {
        if self.is_end() {
            return None;
        }

        let pixel = self.get();
        self.advance();
        Some(pixel)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining();
        (remaining, Some(remaining))
    }
}

impl<F: PixelFormat> ExactSizeIterator for PixelIter<'_, F> {}

impl<F: PixelFormat> FusedIterator for PixelIter<'_, F> {}

impl<F: PixelFormat> Clone for PixelIter<'_, F> {
    fn clone(&self) -> Self {
        PixelIter { ..*self }
    }
}

impl<F: PixelFormat> PartialEq for PixelIter<'_, F> {
    fn eq(&self, other: &Self) -> bool {
        self.position() == other.position()
    }
}

impl<F: PixelFormat> PartialEq<Position> for PixelIter<'_, F> {
    fn eq(&self, other: &Position) -> bool {
        self.position() == *other
    }
}

impl<F: PixelFormat> PartialEq<Position> for PixelIterMut<'_, F> {
    fn eq(&self, other: &Position) -> bool {
        self.position() == *other
    }
}

impl<F: PixelFormat> fmt::Debug for PixelIter<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PixelIter")
            .field("area", &self.cursor.area)
            .field("position", &self.position())
            .field("address", &self.cursor.address)
            .finish()
    }
}

impl<F: PixelFormat> fmt::Debug for PixelIterMut<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PixelIterMut")
            .field("area", &self.cursor.area)
            .field("position", &self.position())
            .field("address", &self.cursor.address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{BitAddress, Bitmap, Indexed};

    #[test]
    fn wraps_at_area_edge() {
        let bytes = [0u8; 100];
        let mut iter = PixelIter::<Indexed>::begin(&bytes, 10, Rect::new(2, 2, 4, 4));

        for _ in 0..3 {
            iter.advance();
        }
        assert_eq!(iter.position(), Position { x: 5, y: 2 });
        assert_eq!(iter.address(), 25);

        iter.advance();
        assert_eq!(iter.position(), Position { x: 2, y: 3 });
        assert_eq!(iter.address(), 32);
        assert_eq!(iter.len(), 12);
    }

    #[test]
    fn bit_cursor_keeps_column_bit() {
        let bytes = [0u8; 8];
        let mut iter = PixelIter::<Bitmap>::begin(&bytes, 2, Rect::new(6, 0, 4, 2));

        let mut addresses = vec![];
        while !iter.is_end() {
            addresses.push(iter.address());
            iter.advance();
        }

        let bit = |byte, bit| BitAddress { byte, bit };
        assert_eq!(
            addresses,
            [
                bit(0, 6),
                bit(0, 7),
                bit(1, 0),
                bit(1, 1),
                bit(2, 6),
                bit(2, 7),
                bit(3, 0),
                bit(3, 1),
            ]
        );
    }

    #[test]
    fn empty_area_starts_at_end() {
        let bytes = [0u8; 4];
        let area = Rect::new(1, 0, 0, 2);
        let begin = PixelIter::<Indexed>::begin(&bytes, 2, area);

        assert!(begin.is_end());
        assert_eq!(begin, PixelIter::end(&bytes, 2, area));
        assert_eq!(begin.count(), 0);
    }

    #[test]
    #[should_panic(expected = "past its end")]
    fn advance_past_end() {
        let bytes = [0u8; 1];
        let mut iter = PixelIter::<Indexed>::begin(&bytes, 1, Rect::with_size(1, 1));
        iter.advance();
        iter.advance();
    }
}
