// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Selection masks.
use crate::format::{Bitmap, PixelFormatKind};
use crate::image::{Image, ImageError};
use crate::rect::Rect;

/// A selection, one bit per pixel over the rectangle it covers.
///
/// The bitmap is stored relative to the top-left corner of `bounds`. A mask without a bitmap
/// selects nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mask {
    bounds: Rect,
    bitmap: Option<Image>,
}

impl Mask {
    /// A mask selecting nothing.
    pub fn new() -> Self {
        Mask::default()
    }

    /// Select every pixel of a rectangle.
    pub fn from_rect(bounds: Rect) -> Result<Self, ImageError> {
        if bounds.is_empty() {
            return Ok(Mask::new());
        }

        let mut bitmap = Image::new(PixelFormatKind::Bitmap, bounds.w, bounds.h)?;
        bitmap.clear::<Bitmap>(true);
        Ok(Mask {
            bounds,
            bitmap: Some(bitmap),
        })
    }

    /// Select the set bits of a bitmap placed at `(x, y)`.
    ///
    /// # Panics
    ///
    /// If `bitmap` is not stored in the [`Bitmap`] format.
    pub fn from_bitmap(x: usize, y: usize, bitmap: Image) -> Self {
        assert_eq!(
            bitmap.pixel_format(),
            PixelFormatKind::Bitmap,
            "mask bitmap must be a bitmap image"
        );

        Mask {
            bounds: Rect::new(x, y, bitmap.width(), bitmap.height()),
            bitmap: Some(bitmap),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bitmap.is_none()
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn bitmap(&self) -> Option<&Image> {
        self.bitmap.as_ref()
    }

    pub fn bitmap_mut(&mut self) -> Option<&mut Image> {
        self.bitmap.as_mut()
    }

    /// Whether the pixel at `(x, y)`, in image coordinates, is selected.
    pub fn contains_point(&self, x: usize, y: usize) -> bool {
        match &self.bitmap {
            Some(bitmap) if self.bounds.contains_point(x, y) => {
                bitmap.get_pixel::<Bitmap>(x - self.bounds.x, y - self.bounds.y)
            }
            _ => false,
        }
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        *self = Mask::new();
    }
}
