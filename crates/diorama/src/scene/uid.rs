//! Unique-id issue for scene entities
//!
//! One monotonic counter per entity kind, process-wide. Ids are only
//! meaningful within a single run; persisted documents use them for
//! cross-reference resolution, so loading a document must observe its ids
//! to keep later allocations collision-free.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-lifetime unique identifier
pub type Uid = u64;

/// Monotonically increasing id issuer
pub struct UidCounter(AtomicU64);

impl UidCounter {
    /// Create a counter starting at 1 (0 is never issued)
    pub const fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    /// Issue the next id
    pub fn next(&self) -> Uid {
        self.0.fetch_add(1, Ordering::Relaxed)
    }

    /// Record an id read from a document so future issues never collide
    pub fn observe(&self, uid: Uid) {
        self.0.fetch_max(uid.saturating_add(1), Ordering::Relaxed);
    }
}

static TRANSFORM_IDS: UidCounter = UidCounter::new();
static GAME_OBJECT_IDS: UidCounter = UidCounter::new();
static COMPONENT_IDS: UidCounter = UidCounter::new();

/// Issue a transform id
pub fn next_transform_uid() -> Uid {
    TRANSFORM_IDS.next()
}

/// Issue a game-object id
pub fn next_game_object_uid() -> Uid {
    GAME_OBJECT_IDS.next()
}

/// Issue a component id
pub fn next_component_uid() -> Uid {
    COMPONENT_IDS.next()
}

/// Observe a persisted transform id
pub fn observe_transform_uid(uid: Uid) {
    TRANSFORM_IDS.observe(uid);
}

/// Observe a persisted game-object id
pub fn observe_game_object_uid(uid: Uid) {
    GAME_OBJECT_IDS.observe(uid);
}

/// Observe a persisted component id
pub fn observe_component_uid(uid: Uid) {
    COMPONENT_IDS.observe(uid);
}
