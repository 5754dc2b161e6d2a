// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Handles that hold a document lock for their lifetime.
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{PoisonError, RwLockReadGuard, RwLockWriteGuard, TryLockError};

use sprite_raster::LockType;
use thiserror::Error;
use tracing::debug;

use crate::document::Document;

/// A document lock that could not be granted right now.
///
/// None of these are permanent: the holder that is in the way will eventually let go, and the
/// caller decides whether to retry, to queue the work, or to tell the user.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockError {
    #[error("the document is being modified and can not be read")]
    CannotRead,
    #[error("the document is in use and can not be modified")]
    CannotWrite,
    #[error("the document is shared with other readers and can not be upgraded")]
    CannotUpgrade,
}

// Handles list their content guard before the lock they hold, fields drop in declaration order
// so that nobody granted the document lock finds the content still taken.

/// Shared access to a document's sprite.
pub struct DocumentReader<'d, S> {
    /// Only `None` while a [`DocumentUpgrade`] borrows this reader.
    sprite: Option<RwLockReadGuard<'d, S>>,
    held: Held<'d, S>,
}

/// Exclusive access to a document's sprite.
pub struct DocumentWriter<'d, S> {
    sprite: RwLockWriteGuard<'d, S>,
    held: Held<'d, S>,
}

/// A reader temporarily promoted to writer. Dropping it goes back to reading.
pub struct DocumentUpgrade<'r, 'd, S> {
    sprite: RwLockWriteGuard<'d, S>,
    _downgrade: Upgraded<'r, 'd, S>,
}

/// Releases the document lock when dropped.
struct Held<'d, S> {
    document: &'d Document<S>,
}

/// Downgrades the document lock when dropped and hands the content back to the reader.
struct Upgraded<'r, 'd, S> {
    reader: &'r mut DocumentReader<'d, S>,
}

impl<S> Document<S> {
    /// Lock the document for reading.
    ///
    /// Fails at once if a writer holds it.
    pub fn read(&self) -> Result<DocumentReader<'_, S>, LockError> {
        if !self.guard.acquire(LockType::Read) {
            return Err(LockError::CannotRead);
        }

        match self.try_read_sprite() {
            Some(sprite) => Ok(DocumentReader {
                sprite: Some(sprite),
                held: Held { document: self },
            }),
            None => {
                debug!("sprite content busy outside of the document lock");
                self.guard.release();
                Err(LockError::CannotRead)
            }
        }
    }

    /// Lock the document for writing.
    ///
    /// Fails at once if anybody else holds it, reader or writer.
    pub fn write(&self) -> Result<DocumentWriter<'_, S>, LockError> {
        if !self.guard.acquire(LockType::Write) {
            return Err(LockError::CannotWrite);
        }

        match try_write(self) {
            Some(sprite) => Ok(DocumentWriter {
                sprite,
                held: Held { document: self },
            }),
            None => {
                debug!("sprite content busy outside of the document lock");
                self.guard.release();
                Err(LockError::CannotWrite)
            }
        }
    }
}

fn try_write<S>(document: &Document<S>) -> Option<RwLockWriteGuard<'_, S>> {
    match document.sprite.try_write() {
        Ok(sprite) => Some(sprite),
        Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    }
}

/// Take the content back after a write, nobody but the caller can hold it exclusively.
fn read_back<S>(document: &Document<S>) -> RwLockReadGuard<'_, S> {
    document
        .sprite
        .read()
        .unwrap_or_else(PoisonError::into_inner)
}

impl<'d, S> DocumentReader<'d, S> {
    pub fn document(&self) -> &'d Document<S> {
        self.held.document
    }

    /// Become the writer, if this is the only reader.
    ///
    /// The reader is borrowed by the returned handle, and becomes usable again as a reader once
    /// that handle is dropped.
    pub fn upgrade(&mut self) -> Result<DocumentUpgrade<'_, 'd, S>, LockError> {
        let document = self.held.document;
        if !document.guard.upgrade_to_write() {
            return Err(LockError::CannotUpgrade);
        }

        drop(self.sprite.take());
        match try_write(document) {
            Some(sprite) => Ok(DocumentUpgrade {
                sprite,
                _downgrade: Upgraded { reader: self },
            }),
            None => {
                debug!("sprite content busy outside of the document lock");
                document.guard.downgrade_to_read();
                self.sprite = Some(read_back(document));
                Err(LockError::CannotUpgrade)
            }
        }
    }
}

impl<'d, S> DocumentWriter<'d, S> {
    pub fn document(&self) -> &'d Document<S> {
        self.held.document
    }
}

/// # Panics
///
/// If an upgrade of this reader was leaked with [`mem::forget`](std::mem::forget). The content
/// never comes back to the reader then, and the document stays locked for writing.
impl<S> Deref for DocumentReader<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        match &self.sprite {
            Some(sprite) => &**sprite,
            None => panic!("document reader left without content after a leaked upgrade"),
        }
    }
}

impl<S> Deref for DocumentWriter<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.sprite
    }
}

impl<S> DerefMut for DocumentWriter<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.sprite
    }
}

impl<S> Deref for DocumentUpgrade<'_, '_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.sprite
    }
}

impl<S> DerefMut for DocumentUpgrade<'_, '_, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.sprite
    }
}

impl<S> Drop for Held<'_, S> {
    fn drop(&mut self) {
        self.document.guard.release();
    }
}

impl<S> Drop for Upgraded<'_, '_, S> {
    fn drop(&mut self) {
        let document = self.reader.held.document;
        document.guard.downgrade_to_read();
        self.reader.sprite = Some(read_back(document));
    }
}

impl<S: fmt::Debug> fmt::Debug for DocumentReader<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("DocumentReader").field(&**self).finish()
    }
}

impl<S: fmt::Debug> fmt::Debug for DocumentWriter<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("DocumentWriter").field(&**self).finish()
    }
}

impl<S: fmt::Debug> fmt::Debug for DocumentUpgrade<'_, '_, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("DocumentUpgrade").field(&**self).finish()
    }
}
