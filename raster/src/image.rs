// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Defines the `Image` container and its buffer-local lock marker.
//!
//! An image owns the bytes of a single pixel matrix, tagged with the [`PixelFormatKind`] of its
//! pixels. Access to whole regions goes through views, see [`Image::lock_bits`]. A view obtained
//! that way marks the image as exposed until it is unlocked again, which lets the owner ask
//! whether some pixel view is still outstanding independent of any document-level locking.
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;
use tracing::{error, trace};

use crate::format::{PixelFormat, PixelFormatKind};
use crate::rect::Rect;
use crate::view::{PixelView, PixelViewMut};

/// The intent with which pixels are accessed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LockType {
    /// Shared, read-only access.
    Read,
    /// Exclusive access that may modify pixels.
    Write,
}

/// Format and dimensions of an image, before allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageSpec {
    pub format: PixelFormatKind,
    pub width: usize,
    pub height: usize,
}

/// An error which indicates that an image of the given spec can not be allocated.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ImageError {
    #[error("Given size {width}x{height} is not valid for an image: Width and Height must both be greater than 0")]
    EmptySize { width: usize, height: usize },
    #[error("An image of size {width}x{height} in {format:?} format does not fit into memory")]
    TooLarge {
        format: PixelFormatKind,
        width: usize,
        height: usize,
    },
}

/// An owned matrix of pixels of one format.
///
/// Rows are stored top to bottom without gaps between them, each row starting on a byte boundary.
/// The byte length of a row is the [`row_stride`](Image::row_stride).
///
/// ## Examples
///
/// Draw a diagonal into an indexed image:
///
/// ```
/// use sprite_raster::{Image, Indexed, PixelFormatKind};
///
/// let mut image = Image::new(PixelFormatKind::Indexed, 4, 4)?;
/// for i in 0..4 {
///     image.put_pixel::<Indexed>(i, i, 1);
/// }
///
/// assert_eq!(image.get_pixel::<Indexed>(2, 2), 1);
/// assert_eq!(image.get_pixel::<Indexed>(2, 1), 0);
/// # Ok::<(), sprite_raster::ImageError>(())
/// ```
pub struct Image {
    format: PixelFormatKind,
    width: usize,
    height: usize,
    stride: usize,
    bytes: Vec<u8>,
    marker: BitsMarker,
}

/// Records which views of an image are outstanding.
///
/// Holds the number of read views, or `WRITE` while a write view exists.
struct BitsMarker(AtomicUsize);

impl BitsMarker {
    const UNLOCKED: usize = 0;
    const WRITE: usize = usize::MAX;

    fn new() -> Self {
        BitsMarker(AtomicUsize::new(Self::UNLOCKED))
    }

    fn mode(&self) -> Option<LockType> {
        match self.0.load(Ordering::Acquire) {
            Self::UNLOCKED => None,
            Self::WRITE => Some(LockType::Write),
            _ => Some(LockType::Read),
        }
    }
}

impl Image {
    /// Allocate a zeroed image.
    pub fn new(format: PixelFormatKind, width: usize, height: usize) -> Result<Self, ImageError> {
        Self::with_spec(ImageSpec {
            format,
            width,
            height,
        })
    }

    pub fn with_spec(spec: ImageSpec) -> Result<Self, ImageError> {
        let ImageSpec {
            format,
            width,
            height,
        } = spec;

        if width == 0 || height == 0 {
            return Err(ImageError::EmptySize { width, height });
        }

        let too_large = ImageError::TooLarge {
            format,
            width,
            height,
        };
        let stride = format.row_stride(width).ok_or(too_large)?;
        let len = stride.checked_mul(height).ok_or(too_large)?;

        Ok(Image {
            format,
            width,
            height,
            stride,
            bytes: vec![0; len],
            marker: BitsMarker::new(),
        })
    }

    pub fn spec(&self) -> ImageSpec {
        ImageSpec {
            format: self.format,
            width: self.width,
            height: self.height,
        }
    }

    pub fn pixel_format(&self) -> PixelFormatKind {
        self.format
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The full extent of the image.
    pub fn bounds(&self) -> Rect {
        Rect::with_size(self.width, self.height)
    }

    /// The number of bytes from one row to the next.
    pub fn row_stride(&self) -> usize {
        self.stride
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Read a single pixel.
    ///
    /// # Panics
    ///
    /// If `F` is not the format of this image or the coordinate is outside the image.
    pub fn get_pixel<F: PixelFormat>(&self, x: usize, y: usize) -> F::Pixel {
        self.check_pixel::<F>(x, y);
        F::get(&self.bytes, F::address_of(self.stride, x, y))
    }

    /// Overwrite a single pixel.
    ///
    /// # Panics
    ///
    /// If `F` is not the format of this image or the coordinate is outside the image.
    pub fn put_pixel<F: PixelFormat>(&mut self, x: usize, y: usize, pixel: F::Pixel) {
        self.check_pixel::<F>(x, y);
        F::put(&mut self.bytes, F::address_of(self.stride, x, y), pixel);
    }

    /// Set every pixel to the same value.
    ///
    /// # Panics
    ///
    /// If `F` is not the format of this image.
    pub fn clear<F: PixelFormat>(&mut self, pixel: F::Pixel) {
        let bounds = self.bounds();
        PixelViewMut::<F>::new(self, bounds).fill(pixel);
    }

    /// Expose a region for reading and mark the image as read-locked.
    ///
    /// The mark stays until [`PixelView::unlock`] is called on the returned view. Prefer
    /// [`ScopedPixelView`](crate::ScopedPixelView), which unlocks on every exit path.
    ///
    /// # Panics
    ///
    /// If the bounds are not within the image or `F` is not its format.
    pub fn lock_bits<F: PixelFormat>(&self, bounds: Rect) -> PixelView<'_, F> {
        PixelView::locked(self, bounds)
    }

    /// Expose a region for writing and mark the image as write-locked.
    ///
    /// The mark stays until [`PixelViewMut::unlock`] is called on the returned view.
    ///
    /// # Panics
    ///
    /// If the bounds are not within the image or `F` is not its format.
    pub fn lock_bits_mut<F: PixelFormat>(&mut self, bounds: Rect) -> PixelViewMut<'_, F> {
        PixelViewMut::locked(self, bounds)
    }

    /// The strongest kind of view currently outstanding, if any.
    pub fn lock_mode(&self) -> Option<LockType> {
        self.marker.mode()
    }

    pub fn is_locked(&self) -> bool {
        self.lock_mode().is_some()
    }

    /// The number of outstanding read views.
    pub fn read_views(&self) -> usize {
        match self.marker.0.load(Ordering::Acquire) {
            BitsMarker::WRITE => 0,
            readers => readers,
        }
    }

    pub(crate) fn mark_read(&self) {
        let marked = self.marker.0.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
            match n {
                // With `&self` no write view can be alive, the mark was left by a view that was
                // never unlocked.
                BitsMarker::WRITE => Some(1),
                n => n.checked_add(1).filter(|&n| n != BitsMarker::WRITE),
            }
        });

        match marked {
            Ok(BitsMarker::WRITE) => misuse("read view requested while a stale write mark is set"),
            Ok(previous) => trace!(readers = previous + 1, "image marked for reading"),
            Err(_) => misuse("too many read views of one image"),
        }
    }

    pub(crate) fn mark_write(&mut self) {
        let marker = self.marker.0.get_mut();
        let stale = *marker;
        *marker = BitsMarker::WRITE;

        if stale == BitsMarker::UNLOCKED {
            trace!("image marked for writing");
        } else {
            misuse("write view requested while a stale mark is set");
        }
    }

    /// Clear the mark of one view.
    pub(crate) fn unmark(&self, lock: LockType) {
        let cleared = self.marker.0.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
            match (lock, n) {
                (LockType::Write, BitsMarker::WRITE) => Some(BitsMarker::UNLOCKED),
                (LockType::Read, BitsMarker::UNLOCKED | BitsMarker::WRITE) => None,
                (LockType::Read, n) => Some(n - 1),
                (LockType::Write, _) => None,
            }
        });

        match cleared {
            Ok(_) => trace!(?lock, "image mark cleared"),
            Err(_) => misuse("unlocking a view whose mark is not set"),
        }
    }

    fn check_pixel<F: PixelFormat>(&self, x: usize, y: usize) {
        assert_eq!(
            self.format,
            F::KIND,
            "pixel format does not match the image"
        );
        assert!(
            self.bounds().contains_point(x, y),
            "pixel ({x}, {y}) outside of {}x{} image",
            self.width,
            self.height
        );
    }
}

/// Report a broken calling contract around the lock marker.
///
/// Fatal in debug builds, logged otherwise. The marker is bookkeeping only, so continuing is
/// memory safe.
fn misuse(what: &str) {
    error!(what, "image lock marker misuse");
    if cfg!(debug_assertions) && !std::thread::panicking() {
        panic!("image lock marker misuse: {what}");
    }
}

/// Copies the pixels, the copy starts out without any view.
impl Clone for Image {
    fn clone(&self) -> Self {
        Image {
            format: self.format,
            width: self.width,
            height: self.height,
            stride: self.stride,
            bytes: self.bytes.clone(),
            marker: BitsMarker::new(),
        }
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.spec() == other.spec() && self.bytes == other.bytes
    }
}

impl Eq for Image {}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Image")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("lock", &self.lock_mode())
            .finish()
    }
}
