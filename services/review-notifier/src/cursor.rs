//! The poll cursor: the last-seen server timestamp

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Unix timestamp in seconds. The API is asked for changes at or after it.
pub type Cursor = i64;

/// Current wall-clock time as a cursor value
pub fn now_unix() -> Cursor {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as Cursor
}

/// Where the poll loop keeps its cursor between iterations
pub trait CursorStore: Send + Sync + std::fmt::Debug {
    fn load(&self) -> Cursor;

    fn save(&self, cursor: Cursor);
}

/// Cursor held in memory only; a restart starts over from a fresh value
#[derive(Debug)]
pub struct MemoryCursorStore {
    value: AtomicI64,
}

impl MemoryCursorStore {
    pub fn new(initial: Cursor) -> Self {
        Self {
            value: AtomicI64::new(initial),
        }
    }
}

impl Default for MemoryCursorStore {
    fn default() -> Self {
        Self::new(now_unix())
    }
}

impl CursorStore for MemoryCursorStore {
    fn load(&self) -> Cursor {
        self.value.load(Ordering::SeqCst)
    }

    fn save(&self, cursor: Cursor) {
        self.value.store(cursor, Ordering::SeqCst);
    }
}
