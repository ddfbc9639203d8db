//! Bounded, most-recent-first snapshot history
//!
//! Capacity is [`MAX_HISTORY_ITEMS`]; the oldest entry is evicted once the
//! bound is exceeded. Lookup is a linear scan, bounded by capacity.

use crate::core::state::{Snapshot, MAX_HISTORY_ITEMS};

/// Prepend a snapshot, evicting the oldest entry past capacity.
pub fn record(history: &mut Vec<Snapshot>, snapshot: Snapshot) {
    history.insert(0, snapshot);
    history.truncate(MAX_HISTORY_ITEMS);
}

/// Find a snapshot by exact timestamp match.
pub fn find_by_timestamp<'a>(history: &'a [Snapshot], timestamp: &str) -> Option<&'a Snapshot> {
    history.iter().find(|s| s.timestamp == timestamp)
}
