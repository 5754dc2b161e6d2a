// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Views that hold the image mark for exactly their own scope.
//!
//! Both wrappers mark the image on construction and clear the mark when dropped, which includes
//! early returns and unwinding. They dereference to the plain view they wrap.
//!
//! ```
//! use sprite_raster::{Image, PixelFormatKind, Rgba, ScopedPixelViewMut};
//!
//! let mut image = Image::new(PixelFormatKind::Rgb, 8, 8)?;
//! {
//!     let mut bits = ScopedPixelViewMut::<Rgba>::new(&mut image);
//!     bits.fill(0xff00_00ff);
//! }
//!
//! assert!(!image.is_locked());
//! # Ok::<(), sprite_raster::ImageError>(())
//! ```
use core::fmt;
use core::ops::{Deref, DerefMut};

use crate::format::PixelFormat;
use crate::image::Image;
use crate::rect::Rect;
use crate::view::{PixelView, PixelViewMut};

/// A read view, marking the image while in scope.
pub struct ScopedPixelView<'a, F: PixelFormat> {
    bits: PixelView<'a, F>,
}

/// A write view, marking the image while in scope.
pub struct ScopedPixelViewMut<'a, F: PixelFormat> {
    bits: PixelViewMut<'a, F>,
}

impl<'a, F: PixelFormat> ScopedPixelView<'a, F> {
    /// Read the whole image.
    ///
    /// # Panics
    ///
    /// If the image is not stored as `F`.
    pub fn new(image: &'a Image) -> Self {
        Self::with_bounds(image, image.bounds())
    }

    /// Read a region of the image.
    ///
    /// # Panics
    ///
    /// If `bounds` is not within the image or the image is not stored as `F`.
    pub fn with_bounds(image: &'a Image, bounds: Rect) -> Self {
        ScopedPixelView {
            bits: image.lock_bits(bounds),
        }
    }
}

impl<'a, F: PixelFormat> ScopedPixelViewMut<'a, F> {
    /// Write the whole image.
    ///
    /// # Panics
    ///
    /// If the image is not stored as `F`.
    pub fn new(image: &'a mut Image) -> Self {
        let bounds = image.bounds();
        Self::with_bounds(image, bounds)
    }

    /// Write a region of the image.
    ///
    /// # Panics
    ///
    /// If `bounds` is not within the image or the image is not stored as `F`.
    pub fn with_bounds(image: &'a mut Image, bounds: Rect) -> Self {
        ScopedPixelViewMut {
            bits: image.lock_bits_mut(bounds),
        }
    }
}

impl<'a, F: PixelFormat> Deref for ScopedPixelView<'a, F> {
    type Target = PixelView<'a, F>;

    fn deref(&self) -> &PixelView<'a, F> {
        &self.bits
    }
}

impl<'a, F: PixelFormat> Deref for ScopedPixelViewMut<'a, F> {
    type Target = PixelViewMut<'a, F>;

    fn deref(&self) -> &PixelViewMut<'a, F> {
        &self.bits
    }
}

// An early `unlock` through this is fine, unlocking twice is a no-op.
impl<'a, F: PixelFormat> DerefMut for ScopedPixelViewMut<'a, F> {
    fn deref_mut(&mut self) -> &mut PixelViewMut<'a, F> {
        &mut self.bits
    }
}

impl<F: PixelFormat> Drop for ScopedPixelView<'_, F> {
    fn drop(&mut self) {
        self.bits.unlock();
    }
}

impl<F: PixelFormat> Drop for ScopedPixelViewMut<'_, F> {
    fn drop(&mut self) {
        self.bits.unlock();
    }
}

impl<F: PixelFormat> fmt::Debug for ScopedPixelView<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ScopedPixelView").field(&self.bits).finish()
    }
}

impl<F: PixelFormat> fmt::Debug for ScopedPixelViewMut<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ScopedPixelViewMut").field(&self.bits).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{Grayscale, PixelFormatKind};
    use crate::image::LockType;

    #[test]
    fn readers_share_the_mark() {
        let image = Image::new(PixelFormatKind::Grayscale, 3, 3).unwrap();

        let a = ScopedPixelView::<Grayscale>::new(&image);
        let b = ScopedPixelView::<Grayscale>::with_bounds(&image, Rect::new(1, 1, 1, 1));
        assert_eq!(image.read_views(), 2);
        assert_eq!(b.iter().count(), 1);

        drop(a);
        assert_eq!(image.lock_mode(), Some(LockType::Read));
        drop(b);
        assert_eq!(image.lock_mode(), None);
    }

    #[test]
    fn early_unlock_then_drop() {
        let mut image = Image::new(PixelFormatKind::Grayscale, 3, 3).unwrap();
        {
            let mut bits = ScopedPixelViewMut::<Grayscale>::new(&mut image);
            bits.fill(0x0102);
            bits.unlock();
            assert!(!bits.is_locked());
        }
        assert_eq!(image.lock_mode(), None);
        assert_eq!(image.get_pixel::<Grayscale>(2, 2), 0x0102);
    }
}
