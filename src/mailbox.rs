//! Latest-wins pose snapshot slot.
//!
//! The perception callback writes solved snapshots at its own cadence; the
//! update tick reads whatever is newest. There is no queue: a write replaces
//! the previous snapshot whether or not it was read, so the tick never
//! replays stale frames. The critical section is a pointer swap, so the
//! writer and the reader never wait on each other for longer than that.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::pose::PoseSnapshot;

#[derive(Debug, Default)]
struct Slot {
    snapshot: Mutex<Option<Arc<PoseSnapshot>>>,
    generation: AtomicU64,
}

/// Shared single-slot mailbox. Clones refer to the same slot.
#[derive(Debug, Clone, Default)]
pub struct PoseMailbox {
    slot: Arc<Slot>,
}

/// A snapshot read from the mailbox together with its write generation.
#[derive(Debug, Clone)]
pub struct Delivered {
    pub snapshot: Arc<PoseSnapshot>,
    /// Incremented on every publish; equal generations mean the same write.
    pub generation: u64,
}

impl PoseMailbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the slot content. Returns the new generation.
    pub fn publish(&self, snapshot: PoseSnapshot) -> u64 {
        let snapshot = Arc::new(snapshot);
        let mut slot = self.slot.snapshot.lock();
        *slot = Some(snapshot);
        // Bumped under the lock so a reader never pairs a snapshot with
        // another write's generation.
        self.slot.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Copies out the newest snapshot without consuming it.
    #[must_use]
    pub fn latest(&self) -> Option<Delivered> {
        let slot = self.slot.snapshot.lock();
        let snapshot = slot.as_ref()?.clone();
        Some(Delivered {
            snapshot,
            generation: self.slot.generation.load(Ordering::Acquire),
        })
    }

    /// Empties the slot. The generation keeps counting.
    pub fn clear(&self) {
        *self.slot.snapshot.lock() = None;
    }

    /// Number of publishes so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.slot.generation.load(Ordering::Acquire)
    }
}
