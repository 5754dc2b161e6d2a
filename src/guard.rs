// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! The reader/writer state machine guarding a document.
//!
//! [`AccessGuard`] is a non-blocking gate: every operation inspects and updates the
//! [`LockState`] under a mutex held only for that check and returns at once. A request that can
//! not be granted right now simply fails. Nothing queues, so there is no fairness between readers
//! and writers and a writer may starve while readers keep coming. Callers retry or give up.
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use sprite_raster::LockType;
use tracing::{debug, error, trace};

/// Who currently holds a document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LockState {
    #[default]
    Unlocked,
    /// Shared by this many readers.
    ReadLocked(NonZeroUsize),
    /// Held by exactly one writer.
    WriteLocked,
}

impl LockState {
    const ONE_READER: LockState = LockState::ReadLocked(NonZeroUsize::MIN);

    /// The number of readers holding the lock.
    pub fn readers(self) -> usize {
        match self {
            LockState::ReadLocked(n) => n.get(),
            _ => 0,
        }
    }

    pub fn is_write_locked(self) -> bool {
        self == LockState::WriteLocked
    }

    /// The state after granting `mode`, if it can be granted.
    pub fn acquire(self, mode: LockType) -> Option<LockState> {
        match (mode, self) {
            (LockType::Read, LockState::Unlocked) => Some(Self::ONE_READER),
            (LockType::Read, LockState::ReadLocked(n)) => {
                n.checked_add(1).map(LockState::ReadLocked)
            }
            (LockType::Write, LockState::Unlocked) => Some(LockState::WriteLocked),
            (_, _) => None,
        }
    }

    /// The state after the sole reader became the writer.
    pub fn upgrade(self) -> Option<LockState> {
        match self {
            LockState::ReadLocked(n) if n.get() == 1 => Some(LockState::WriteLocked),
            _ => None,
        }
    }

    /// The state after the writer became the sole reader.
    pub fn downgrade(self) -> Option<LockState> {
        match self {
            LockState::WriteLocked => Some(Self::ONE_READER),
            _ => None,
        }
    }

    /// The state after one holder let go.
    pub fn release(self) -> Option<LockState> {
        match self {
            LockState::Unlocked => None,
            LockState::ReadLocked(n) => Some(
                NonZeroUsize::new(n.get() - 1).map_or(LockState::Unlocked, LockState::ReadLocked),
            ),
            LockState::WriteLocked => Some(LockState::Unlocked),
        }
    }
}

/// A single-writer, multiple-reader lock that never blocks.
///
/// # Usage
///
/// ```
/// use sprite_document::{AccessGuard, LockState};
/// use sprite_document::raster::LockType;
///
/// let guard = AccessGuard::new();
/// assert!(guard.acquire(LockType::Read));
///
/// // The only reader may become the writer, without letting anyone in between.
/// assert!(guard.upgrade_to_write());
/// assert!(!guard.acquire(LockType::Read));
///
/// guard.downgrade_to_read();
/// guard.release();
/// assert_eq!(guard.state(), LockState::Unlocked);
/// ```
#[derive(Debug, Default)]
pub struct AccessGuard {
    state: Mutex<LockState>,
}

impl AccessGuard {
    pub fn new() -> Self {
        AccessGuard::default()
    }

    /// Try to become a reader or the writer.
    ///
    /// Reading is granted unless there is a writer, writing only when nobody holds the lock.
    /// Returns `false` and changes nothing if the lock is not available.
    pub fn acquire(&self, mode: LockType) -> bool {
        let mut state = self.lock();
        match state.acquire(mode) {
            Some(next) => {
                trace!(?mode, from = ?*state, to = ?next, "document lock acquired");
                *state = next;
                true
            }
            None => {
                debug!(?mode, state = ?*state, "document lock contended");
                false
            }
        }
    }

    /// Turn the caller's read lock into the write lock.
    ///
    /// Only succeeds if the caller is the one and only reader. Otherwise returns `false` and the
    /// caller keeps its read lock.
    pub fn upgrade_to_write(&self) -> bool {
        let mut state = self.lock();
        match state.upgrade() {
            Some(next) => {
                trace!(from = ?*state, "document lock upgraded to write");
                *state = next;
                true
            }
            None => {
                debug!(state = ?*state, "document lock can not be upgraded");
                false
            }
        }
    }

    /// Turn the caller's write lock into a read lock, without releasing in between.
    ///
    /// Calling this without holding the write lock is a bug: it panics in debug builds and is
    /// ignored otherwise.
    pub fn downgrade_to_read(&self) {
        self.transition("downgrade_to_read", LockState::downgrade);
    }

    /// Give up the caller's read or write lock.
    ///
    /// Calling this on an unlocked guard is a bug: it panics in debug builds and is ignored
    /// otherwise.
    pub fn release(&self) {
        self.transition("release", LockState::release);
    }

    pub fn state(&self) -> LockState {
        *self.lock()
    }

    pub fn is_unlocked(&self) -> bool {
        self.state() == LockState::Unlocked
    }

    fn transition(&self, operation: &'static str, step: fn(LockState) -> Option<LockState>) {
        let mut state = self.lock();
        let current = *state;

        if let Some(next) = step(current) {
            trace!(operation, from = ?current, to = ?next, "document lock changed");
            *state = next;
            return;
        }

        // Report after unlocking, the panic must not poison the guard.
        drop(state);
        misuse(operation, current);
    }

    // The state is a `Copy` value replaced in one step, a poisoned lock still holds a valid one.
    fn lock(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Report an operation that the current state does not permit.
pub(crate) fn misuse(operation: &str, state: LockState) {
    error!(operation, ?state, "document lock misuse");
    if cfg!(debug_assertions) && !std::thread::panicking() {
        panic!("document lock misuse: `{operation}` in state {state:?}");
    }
}
