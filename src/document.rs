// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! The `Document` container, its selection and its scratch cel.
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, TryLockError};

use sprite_raster::{Image, ImageError, LockType, Mask, PixelFormatKind};

use crate::guard::{misuse, AccessGuard, LockState};
use crate::transformation::Transformation;

/// An open sprite, shared between the interactive thread and background workers.
///
/// The sprite content `S` is only reachable through a [`DocumentReader`] or [`DocumentWriter`],
/// which hold the document lock for as long as they live. The lock itself is also available as
/// plain operations for collaborators that only need to keep others out for a while and do not
/// touch the content.
///
/// A document must be unlocked when it is dropped.
///
/// [`DocumentReader`]: crate::DocumentReader
/// [`DocumentWriter`]: crate::DocumentWriter
pub struct Document<S> {
    filename: String,
    associated_to_file: bool,
    extra_cel: Option<ExtraCel>,
    mask: Mask,
    mask_visible: bool,
    transformation: Transformation,
    pub(crate) guard: AccessGuard,
    pub(crate) sprite: RwLock<S>,
}

/// A temporary cel drawn on top of the sprite, such as a brush preview or pixels being moved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtraCel {
    pub x: i32,
    pub y: i32,
    pub opacity: u8,
    image: Image,
}

impl ExtraCel {
    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut Image {
        &mut self.image
    }
}

impl<S> Document<S> {
    /// The name new documents get until they are saved.
    pub const DEFAULT_NAME: &'static str = "Sprite";

    pub fn new(sprite: S) -> Self {
        Self::with_name(Self::DEFAULT_NAME, sprite)
    }

    pub fn with_name(filename: impl Into<String>, sprite: S) -> Self {
        Document {
            filename: filename.into(),
            associated_to_file: false,
            extra_cel: None,
            mask: Mask::new(),
            mask_visible: true,
            transformation: Transformation::default(),
            guard: AccessGuard::new(),
            sprite: RwLock::new(sprite),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = filename.into();
    }

    /// Whether the document was loaded from or saved to its file.
    pub fn is_associated_to_file(&self) -> bool {
        self.associated_to_file
    }

    pub fn mark_as_saved(&mut self) {
        self.associated_to_file = true;
    }

    /// Try to lock the document for reading or writing, see [`AccessGuard::acquire`].
    pub fn lock(&self, mode: LockType) -> bool {
        self.guard.acquire(mode)
    }

    /// Upgrade the caller's sole read lock, see [`AccessGuard::upgrade_to_write`].
    pub fn lock_to_write(&self) -> bool {
        self.guard.upgrade_to_write()
    }

    /// Downgrade the caller's write lock, see [`AccessGuard::downgrade_to_read`].
    pub fn unlock_to_read(&self) {
        self.guard.downgrade_to_read();
    }

    /// Release the caller's lock, see [`AccessGuard::release`].
    pub fn unlock(&self) {
        self.guard.release();
    }

    pub fn lock_state(&self) -> LockState {
        self.guard.state()
    }

    /// Direct access to the content, the exclusive borrow proves nobody else holds it.
    pub fn sprite_mut(&mut self) -> &mut S {
        self.sprite
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Set up the extra cel, reusing its image if format and size did not change.
    pub fn prepare_extra_cel(
        &mut self,
        format: PixelFormatKind,
        (x, y): (i32, i32),
        (w, h): (usize, usize),
        opacity: u8,
    ) -> Result<&mut ExtraCel, ImageError> {
        let reusable = self.extra_cel.as_ref().is_some_and(|cel| {
            let spec = cel.image.spec();
            (spec.format, spec.width, spec.height) == (format, w, h)
        });

        let cel = match self.extra_cel.take() {
            Some(mut cel) if reusable => {
                cel.x = x;
                cel.y = y;
                cel.opacity = opacity;
                cel
            }
            _ => ExtraCel {
                x,
                y,
                opacity,
                image: Image::new(format, w, h)?,
            },
        };

        Ok(self.extra_cel.insert(cel))
    }

    pub fn extra_cel(&self) -> Option<&ExtraCel> {
        self.extra_cel.as_ref()
    }

    pub fn extra_cel_mut(&mut self) -> Option<&mut ExtraCel> {
        self.extra_cel.as_mut()
    }

    pub fn destroy_extra_cel(&mut self) {
        self.extra_cel = None;
    }

    /// The current selection, possibly empty.
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Replace the selection and show it.
    ///
    /// Any transformation in progress is reset to the bounds of the new selection.
    pub fn set_mask(&mut self, mask: Mask) {
        self.mask = mask;
        self.mask_visible = true;
        self.reset_transformation();
    }

    /// Whether there is a selection to show: not hidden by the user and not empty.
    pub fn is_mask_visible(&self) -> bool {
        self.mask_visible && !self.mask.is_empty()
    }

    pub fn set_mask_visible(&mut self, visible: bool) {
        self.mask_visible = visible;
    }

    pub fn transformation(&self) -> Transformation {
        self.transformation
    }

    pub fn set_transformation(&mut self, transformation: Transformation) {
        self.transformation = transformation;
    }

    /// Drop any rotation or move of the selection.
    pub fn reset_transformation(&mut self) {
        self.transformation = if self.mask.is_empty() {
            Transformation::default()
        } else {
            Transformation::new(self.mask.bounds())
        };
    }

    pub(crate) fn try_read_sprite(&self) -> Option<RwLockReadGuard<'_, S>> {
        match self.sprite.try_read() {
            Ok(sprite) => Some(sprite),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

impl<S: Default> Default for Document<S> {
    fn default() -> Self {
        Document::new(S::default())
    }
}

impl<S> Drop for Document<S> {
    fn drop(&mut self) {
        let state = self.guard.state();
        if state != LockState::Unlocked {
            misuse("drop", state);
        }
    }
}

impl<S> fmt::Debug for Document<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Document")
            .field("filename", &self.filename)
            .field("associated_to_file", &self.associated_to_file)
            .field("lock", &self.guard.state())
            .field("extra_cel", &self.extra_cel)
            .field("mask", &self.mask)
            .field("mask_visible", &self.mask_visible)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprite_raster::Rect;

    #[test]
    fn file_association() {
        let mut document = Document::new(());
        assert_eq!(document.filename(), "Sprite");
        assert!(!document.is_associated_to_file());

        document.set_filename("walk.ase");
        document.mark_as_saved();
        assert_eq!(document.filename(), "walk.ase");
        assert!(document.is_associated_to_file());
    }

    #[test]
    fn plain_lock_operations() {
        let document = Document::new(());
        assert!(document.lock(LockType::Read));
        assert!(document.lock_to_write());
        assert!(!document.lock(LockType::Read));

        document.unlock_to_read();
        assert_eq!(document.lock_state().readers(), 1);
        document.unlock();
        assert_eq!(document.lock_state(), LockState::Unlocked);
    }

    #[test]
    fn extra_cel_reuses_matching_image() {
        let mut document = Document::new(());
        let cel = document
            .prepare_extra_cel(PixelFormatKind::Indexed, (1, 2), (4, 4), 255)
            .unwrap();
        cel.image_mut().put_pixel::<sprite_raster::Indexed>(3, 3, 7);

        let cel = document
            .prepare_extra_cel(PixelFormatKind::Indexed, (-3, 0), (4, 4), 128)
            .unwrap();
        assert_eq!((cel.x, cel.y, cel.opacity), (-3, 0, 128));
        assert_eq!(cel.image().get_pixel::<sprite_raster::Indexed>(3, 3), 7);

        let cel = document
            .prepare_extra_cel(PixelFormatKind::Indexed, (0, 0), (5, 4), 128)
            .unwrap();
        assert_eq!(cel.image().get_pixel::<sprite_raster::Indexed>(3, 3), 0);

        document.destroy_extra_cel();
        assert!(document.extra_cel().is_none());
    }

    #[test]
    fn extra_cel_of_invalid_size() {
        let mut document = Document::new(());
        let err = document
            .prepare_extra_cel(PixelFormatKind::Rgb, (0, 0), (0, 4), 255)
            .unwrap_err();
        assert_eq!(
            err,
            ImageError::EmptySize {
                width: 0,
                height: 4
            }
        );
        assert!(document.extra_cel_mut().is_none());
    }

    #[test]
    fn empty_mask_is_not_visible() {
        let mut document = Document::new(());
        assert!(document.mask().is_empty());
        assert!(!document.is_mask_visible());

        document.set_mask(Mask::new());
        assert!(!document.is_mask_visible());
        assert_eq!(document.transformation(), Transformation::default());
    }

    #[test]
    fn hidden_mask() {
        let mut document = Document::new(());
        document.set_mask(Mask::from_rect(Rect::new(1, 1, 4, 4)).unwrap());
        assert!(document.is_mask_visible());

        document.set_mask_visible(false);
        assert!(!document.is_mask_visible());
        assert!(!document.mask().is_empty());

        // A new selection is shown again.
        document.set_mask(Mask::from_rect(Rect::new(0, 0, 2, 2)).unwrap());
        assert!(document.is_mask_visible());
    }

    #[test]
    fn new_mask_resets_transformation() {
        let mut document = Document::new(());
        let bounds = Rect::new(2, 2, 6, 4);
        document.set_mask(Mask::from_rect(bounds).unwrap());

        let mut moved = document.transformation();
        moved.bounds.x += 10;
        moved.angle = 1.5;
        document.set_transformation(moved);
        assert_eq!(document.transformation().angle, 1.5);

        let bounds = Rect::new(3, 0, 2, 2);
        document.set_mask(Mask::from_rect(bounds).unwrap());
        assert_eq!(document.transformation(), Transformation::new(bounds));

        document.set_transformation(moved);
        document.reset_transformation();
        assert_eq!(document.transformation().bounds, bounds);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "`drop` in state WriteLocked")]
    fn dropped_while_locked() {
        let document = Document::new(());
        assert!(document.lock(LockType::Write));
    }
}
