// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Bounds-checked views of a rectangular region of an image.
//!
//! A view never owns pixels, it borrows an [`Image`] and remembers the region it exposes. All
//! constructors validate that the region lies within the image and that the image is stored in
//! the format the view was typed with. A violation of either is a bug in the caller and panics.
//!
//! Views come in two flavours, following the borrow they hold. A [`PixelView`] shares the image
//! and only reads, a [`PixelViewMut`] has it exclusively and may write.
//!
//! # Usage
//!
//! Sum up the palette indices of the center of an image:
//!
//! ```
//! use sprite_raster::{Image, Indexed, PixelFormatKind, PixelView, Rect};
//!
//! let mut image = Image::new(PixelFormatKind::Indexed, 4, 4)?;
//! image.clear::<Indexed>(2);
//!
//! let view = PixelView::<Indexed>::new(&image, Rect::new(1, 1, 2, 2));
//! let total: u32 = view.iter().map(u32::from).sum();
//! assert_eq!(total, 8);
//! # Ok::<(), sprite_raster::ImageError>(())
//! ```
use core::fmt;
use core::marker::PhantomData;

use crate::format::PixelFormat;
use crate::image::{Image, LockType};
use crate::iter::{PixelIter, PixelIterMut, Position};
use crate::rect::Rect;

/// A read-only view of a region of an image.
pub struct PixelView<'a, F: PixelFormat> {
    image: Option<&'a Image>,
    bounds: Rect,
    /// Whether this view owns a read mark on the image.
    marked: bool,
    format: PhantomData<F>,
}

/// A writeable view of a region of an image.
pub struct PixelViewMut<'a, F: PixelFormat> {
    image: Option<&'a mut Image>,
    bounds: Rect,
    /// Whether this view owns the write mark on the image.
    marked: bool,
    format: PhantomData<F>,
}

fn check_bounds<F: PixelFormat>(image: &Image, bounds: Rect) {
    assert_eq!(
        image.pixel_format(),
        F::KIND,
        "pixel view format does not match the image"
    );
    assert!(
        image.bounds().contains(&bounds),
        "view bounds {:?} are not within the image bounds {:?}",
        bounds,
        image.bounds()
    );
}

fn check_area(bounds: Rect, area: Rect) {
    assert!(
        bounds.contains(&area),
        "area {area:?} is not within the view bounds {bounds:?}",
    );
}

fn released() -> ! {
    panic!("pixel view used after it was unlocked")
}

impl<'a, F: PixelFormat> PixelView<'a, F> {
    /// View a region without marking the image.
    ///
    /// # Panics
    ///
    /// If `bounds` is not within the image or the image is not stored as `F`.
    pub fn new(image: &'a Image, bounds: Rect) -> Self {
        check_bounds::<F>(image, bounds);
        PixelView {
            image: Some(image),
            bounds,
            marked: false,
            format: PhantomData,
        }
    }

    pub(crate) fn locked(image: &'a Image, bounds: Rect) -> Self {
        let mut view = Self::new(image, bounds);
        image.mark_read();
        view.marked = true;
        view
    }

    /// The viewed image, `None` after [`unlock`](Self::unlock).
    pub fn image(&self) -> Option<&'a Image> {
        self.image
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Whether this view still holds a mark on its image.
    pub fn is_locked(&self) -> bool {
        self.marked
    }

    /// Iterate the whole view.
    pub fn begin(&self) -> PixelIter<'a, F> {
        let image = self.live();
        PixelIter::begin(image.as_bytes(), image.row_stride(), self.bounds)
    }

    pub fn end(&self) -> PixelIter<'a, F> {
        let image = self.live();
        PixelIter::end(image.as_bytes(), image.row_stride(), self.bounds)
    }

    /// Iterate a part of the view.
    ///
    /// # Panics
    ///
    /// If `area` is not within the bounds of the view.
    pub fn begin_area(&self, area: Rect) -> PixelIter<'a, F> {
        check_area(self.bounds, area);
        let image = self.live();
        PixelIter::begin(image.as_bytes(), image.row_stride(), area)
    }

    /// # Panics
    ///
    /// If `area` is not within the bounds of the view.
    pub fn end_area(&self, area: Rect) -> PixelIter<'a, F> {
        check_area(self.bounds, area);
        let image = self.live();
        PixelIter::end(image.as_bytes(), image.row_stride(), area)
    }

    /// The pixel values of the whole view, in row-major order.
    pub fn iter(&self) -> PixelIter<'a, F> {
        self.begin()
    }

    /// The pixel values of a part of the view, see [`begin_area`](Self::begin_area).
    pub fn iter_area(&self, area: Rect) -> PixelIter<'a, F> {
        self.begin_area(area)
    }

    /// Release the view.
    ///
    /// Clears the mark this view holds on the image, if any, and detaches from the image. Calling
    /// this again does nothing.
    pub fn unlock(&mut self) {
        if let Some(image) = self.image.take() {
            if self.marked {
                image.unmark(LockType::Read);
                self.marked = false;
            }
        }
    }

    fn live(&self) -> &'a Image {
        match self.image {
            Some(image) => image,
            None => released(),
        }
    }
}

impl<'a, F: PixelFormat> PixelViewMut<'a, F> {
    /// View a region for writing without marking the image.
    ///
    /// # Panics
    ///
    /// If `bounds` is not within the image or the image is not stored as `F`.
    pub fn new(image: &'a mut Image, bounds: Rect) -> Self {
        check_bounds::<F>(image, bounds);
        PixelViewMut {
            image: Some(image),
            bounds,
            marked: false,
            format: PhantomData,
        }
    }

    pub(crate) fn locked(image: &'a mut Image, bounds: Rect) -> Self {
        check_bounds::<F>(image, bounds);
        image.mark_write();
        PixelViewMut {
            image: Some(image),
            bounds,
            marked: true,
            format: PhantomData,
        }
    }

    pub fn image(&self) -> Option<&Image> {
        self.image.as_deref()
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn is_locked(&self) -> bool {
        self.marked
    }

    /// A read-only view of the same region.
    ///
    /// The returned view does not mark the image, the write mark of `self` covers it.
    pub fn as_view(&self) -> PixelView<'_, F> {
        PixelView {
            image: Some(self.live()),
            bounds: self.bounds,
            marked: false,
            format: PhantomData,
        }
    }

    /// Iterate the whole view for writing.
    pub fn begin(&mut self) -> PixelIterMut<'_, F> {
        let bounds = self.bounds;
        let image = self.live_mut();
        let stride = image.row_stride();
        PixelIterMut::begin(image.as_bytes_mut(), stride, bounds)
    }

    /// The position an iterator from [`begin`](Self::begin) reaches after the last pixel.
    pub fn end(&self) -> Position {
        self.live();
        end_position(self.bounds)
    }

    /// # Panics
    ///
    /// If `area` is not within the bounds of the view.
    pub fn begin_area(&mut self, area: Rect) -> PixelIterMut<'_, F> {
        check_area(self.bounds, area);
        let image = self.live_mut();
        let stride = image.row_stride();
        PixelIterMut::begin(image.as_bytes_mut(), stride, area)
    }

    /// # Panics
    ///
    /// If `area` is not within the bounds of the view.
    pub fn end_area(&self, area: Rect) -> Position {
        check_area(self.bounds, area);
        self.live();
        end_position(area)
    }

    /// Visit every pixel with its coordinates, writing back what the closure leaves.
    pub fn for_each_mut(&mut self, mut shade: impl FnMut(usize, usize, &mut F::Pixel)) {
        let mut iter = self.begin();
        while !iter.is_end() {
            let mut pixel = iter.get();
            shade(iter.x(), iter.y(), &mut pixel);
            iter.put(pixel);
            iter.advance();
        }
    }

    /// Set every pixel of the view to the same value.
    pub fn fill(&mut self, pixel: F::Pixel) {
        let mut iter = self.begin();
        while !iter.is_end() {
            iter.put(pixel);
            iter.advance();
        }
    }

    /// Release the view, see [`PixelView::unlock`].
    pub fn unlock(&mut self) {
        if let Some(image) = self.image.take() {
            if self.marked {
                image.unmark(LockType::Write);
                self.marked = false;
            }
        }
    }

    fn live(&self) -> &Image {
        match &self.image {
            Some(image) => &**image,
            None => released(),
        }
    }

    fn live_mut(&mut self) -> &mut Image {
        match &mut self.image {
            Some(image) => &mut **image,
            None => released(),
        }
    }
}

fn end_position(area: Rect) -> Position {
    Position {
        x: area.x,
        y: area.bottom(),
    }
}

impl<'a, F: PixelFormat> IntoIterator for &'_ PixelView<'a, F> {
    type Item = F::Pixel;
    type IntoIter = PixelIter<'a, F>;

    fn into_iter(self) -> PixelIter<'a, F> {
        self.begin()
    }
}

/// Copies the region, the copy holds no mark of its own.
impl<F: PixelFormat> Clone for PixelView<'_, F> {
    fn clone(&self) -> Self {
        PixelView {
            image: self.image,
            bounds: self.bounds,
            marked: false,
            format: PhantomData,
        }
    }
}

impl<F: PixelFormat> fmt::Debug for PixelView<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PixelView")
            .field("format", &F::KIND)
            .field("bounds", &self.bounds)
            .field("released", &self.image.is_none())
            .field("marked", &self.marked)
            .finish()
    }
}

impl<F: PixelFormat> fmt::Debug for PixelViewMut<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PixelViewMut")
            .field("format", &F::KIND)
            .field("bounds", &self.bounds)
            .field("released", &self.image.is_none())
            .field("marked", &self.marked)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{Grayscale, Indexed, PixelFormatKind, Rgba};

    fn numbered(width: usize, height: usize) -> Image {
        let mut image = Image::new(PixelFormatKind::Indexed, width, height).unwrap();
        let bounds = image.bounds();
        PixelViewMut::<Indexed>::new(&mut image, bounds)
            .for_each_mut(|x, y, pixel| *pixel = (y * width + x) as u8);
        image
    }

    #[test]
    fn full_extent_is_row_major() {
        let image = numbered(10, 10);
        let view = PixelView::<Indexed>::new(&image, image.bounds());

        let seen: Vec<u8> = view.iter().collect();
        assert_eq!(seen, (0..100).collect::<Vec<u8>>());
    }

    #[test]
    fn begin_reaches_end() {
        let image = numbered(3, 2);
        let view = PixelView::<Indexed>::new(&image, image.bounds());

        let (mut iter, end) = (view.begin(), view.end());
        let mut steps = 0;
        while iter != end {
            assert_eq!(usize::from(iter.get()), iter.y() * 3 + iter.x());
            iter.advance();
            steps += 1;
        }
        assert_eq!(steps, 6);
    }

    #[test]
    fn sub_rectangle_skips_outer_columns() {
        let image = numbered(10, 10);
        let view = PixelView::<Indexed>::new(&image, Rect::new(2, 2, 4, 4));

        let mut iter = view.begin();
        let mut visited = vec![];
        while iter != view.end() {
            visited.push((iter.x(), iter.y()));
            assert_eq!(usize::from(iter.get()), iter.y() * 10 + iter.x());
            iter.advance();
        }

        assert_eq!(visited.len(), 16);
        assert!(visited.iter().all(|&(x, y)| (2..=5).contains(&x) && (2..=5).contains(&y)));
        assert_eq!(&visited[3..5], &[(5, 2), (2, 3)]);
    }

    #[test]
    fn sub_area_of_view() {
        let image = numbered(10, 10);
        let view = PixelView::<Indexed>::new(&image, Rect::new(2, 2, 4, 4));
        let area = Rect::new(3, 4, 2, 2);

        let mut iter = view.begin_area(area);
        let end = view.end_area(area);
        let mut seen = vec![];
        while iter != end {
            seen.push(iter.get());
            iter.advance();
        }
        assert_eq!(seen, [43, 44, 53, 54]);
        assert!(view.iter_area(area).eq(seen));
    }

    #[test]
    #[should_panic(expected = "not within the image bounds")]
    fn bounds_past_right_edge() {
        let image = numbered(10, 10);
        let _ = PixelView::<Indexed>::new(&image, Rect::new(8, 0, 3, 1));
    }

    #[test]
    #[should_panic(expected = "not within the view bounds")]
    fn area_outside_view() {
        let image = numbered(10, 10);
        let view = PixelView::<Indexed>::new(&image, Rect::new(2, 2, 4, 4));
        let _ = view.begin_area(Rect::new(1, 2, 2, 2));
    }

    #[test]
    #[should_panic(expected = "format does not match")]
    fn view_of_wrong_format() {
        let image = Image::new(PixelFormatKind::Rgb, 2, 2).unwrap();
        let _ = PixelView::<Grayscale>::new(&image, image.bounds());
    }

    #[test]
    fn writes_stay_within_bounds() {
        let mut image = Image::new(PixelFormatKind::Rgb, 4, 3).unwrap();
        PixelViewMut::<Rgba>::new(&mut image, Rect::new(1, 1, 2, 1)).fill(7);

        let written: Vec<u32> = PixelView::<Rgba>::new(&image, image.bounds())
            .iter()
            .collect();
        assert_eq!(written, [0, 0, 0, 0, 0, 7, 7, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn unlock_is_idempotent() {
        let image = numbered(2, 2);
        let mut view = image.lock_bits::<Indexed>(image.bounds());
        assert_eq!(image.lock_mode(), Some(LockType::Read));

        view.unlock();
        assert!(!view.is_locked());
        assert!(view.image().is_none());
        assert_eq!(image.lock_mode(), None);

        view.unlock();
        assert_eq!(image.lock_mode(), None);
    }

    #[test]
    fn write_mark_lasts_until_unlock() {
        let mut image = numbered(2, 2);
        let bounds = image.bounds();
        let mut view = image.lock_bits_mut::<Indexed>(bounds);
        assert_eq!(view.image().and_then(Image::lock_mode), Some(LockType::Write));
        view.fill(9);
        view.unlock();

        assert_eq!(image.lock_mode(), None);
        assert_eq!(image.as_bytes(), &[9; 4]);
    }

    #[test]
    #[should_panic(expected = "used after it was unlocked")]
    fn begin_after_unlock() {
        let image = numbered(2, 2);
        let mut view = image.lock_bits::<Indexed>(image.bounds());
        view.unlock();
        let _ = view.begin();
    }
}
