// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! # Raster
//!
//! Pixel buffers of a sprite editor and bounds-checked views into them.
//!
//! An [`Image`] owns the bytes of one pixel matrix in one of four formats: packed RGBA, packed
//! grayscale with alpha, 8-bit palette indices and single-bit bitmaps. Code that works on pixels
//! is written once, generic over a [`PixelFormat`], and only ever sees pixels through a view:
//!
//! - [`PixelView`] and [`PixelViewMut`] expose a rectangle of the image and check on
//!   construction that it lies within the image.
//! - [`PixelIter`] and [`PixelIterMut`] walk such a rectangle row by row. The format supplies
//!   the address arithmetic, so sub-byte formats advance bit by bit.
//! - [`ScopedPixelView`] and [`ScopedPixelViewMut`] additionally mark the image as exposed for
//!   as long as they live. The mark is what [`Image::lock_mode`] reports.
//!
//! ## Usage
//!
//! ```
//! use sprite_raster::{rgba, Image, PixelFormatKind, Rect, Rgba, ScopedPixelViewMut};
//!
//! let mut image = Image::new(PixelFormatKind::Rgb, 16, 16)?;
//!
//! // Paint a horizontal gradient into the center.
//! let mut bits = ScopedPixelViewMut::<Rgba>::with_bounds(&mut image, Rect::new(4, 4, 8, 8));
//! bits.for_each_mut(|x, _, pixel| *pixel = rgba(x as u8 * 16, 0, 0, 0xff));
//! drop(bits);
//!
//! assert_eq!(image.get_pixel::<Rgba>(5, 5), rgba(80, 0, 0, 0xff));
//! assert_eq!(image.get_pixel::<Rgba>(3, 5), 0);
//! # Ok::<(), sprite_raster::ImageError>(())
//! ```
#![deny(unsafe_code)]

mod format;
mod image;
mod iter;
mod mask;
mod rect;
mod scoped;
mod view;

pub use self::format::{
    graya, graya_a, graya_v, rgba, rgba_a, rgba_b, rgba_g, rgba_r, BitAddress, Bitmap, Grayscale,
    Indexed, PixelFormat, PixelFormatKind, Rgba,
};
pub use self::image::{Image, ImageError, ImageSpec, LockType};
pub use self::iter::{PixelIter, PixelIterMut, Position};
pub use self::mask::Mask;
pub use self::rect::Rect;
pub use self::scoped::{ScopedPixelView, ScopedPixelViewMut};
pub use self::view::{PixelView, PixelViewMut};
