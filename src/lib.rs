// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! # Sprite document
//!
//! A sprite opened in the editor, shared between the interactive thread and background work such
//! as thumbnail rendering, autosave or export.
//!
//! A [`Document`] is guarded by a non-blocking reader/writer lock, the [`AccessGuard`]. Any number
//! of readers may hold it at once, or a single writer. A request that can not be granted fails
//! immediately instead of waiting, so the interactive thread never stalls behind a worker.
//!
//! ## Usage
//!
//! ```
//! use sprite_document::{Document, LockError};
//!
//! let document = Document::new(vec![0u8; 16]);
//!
//! let mut reader = document.read()?;
//! assert_eq!(reader.len(), 16);
//!
//! // A second reader is fine, a writer has to wait its turn.
//! let thumbnail = document.read()?;
//! assert_eq!(document.write().unwrap_err(), LockError::CannotWrite);
//! drop(thumbnail);
//!
//! // As the sole reader we may become the writer for a moment.
//! reader.upgrade()?[0] = 0xff;
//! assert_eq!(reader[0], 0xff);
//! # Ok::<(), LockError>(())
//! ```
#![deny(unsafe_code)]

mod access;
mod document;
mod guard;
mod transformation;

pub use sprite_raster as raster;
pub use sprite_raster::LockType;

pub use self::access::{DocumentReader, DocumentUpgrade, DocumentWriter, LockError};
pub use self::document::{Document, ExtraCel};
pub use self::guard::{AccessGuard, LockState};
pub use self::transformation::Transformation;
