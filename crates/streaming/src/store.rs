use std::collections::BTreeMap;

use crate::rows::{bin_rows, EmissionRow, GeoPoint};
use crate::source::DataError;

/// A load that has been requested but not yet completed.
///
/// The generation is captured at request time; completions whose generation
/// no longer matches the store's current one are memoized but not surfaced
/// as the active snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub key: String,
    pub generation: u64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Snapshot already memoized; `get` returns it immediately.
    Cached,
    /// A load was queued (or an in-flight one retagged to this generation).
    Pending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompleteOutcome {
    /// Snapshot memoized and current: safe to apply to the renderer.
    Applied,
    /// Snapshot memoized, but the viewer has moved on; do not apply.
    Stale,
    /// Fetch failed; nothing changed.
    Failed(DataError),
}

/// Memoized snapshot store with generation-tagged loads.
///
/// Snapshots are keyed by file key and derived once: rows are binned on
/// completion and the binned form is what the store hands out. The current
/// generation advances whenever the active step (or its active dataset)
/// changes, which is how late-arriving loads for abandoned steps are kept
/// from overwriting the active view.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    generation: u64,
    snapshots: BTreeMap<String, Vec<GeoPoint>>,
    pending: Vec<PendingLoad>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Marks a new active view; loads requested before this point complete
    /// as `Stale`.
    pub fn advance_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn request(&mut self, key: &str) -> RequestOutcome {
        if self.snapshots.contains_key(key) {
            return RequestOutcome::Cached;
        }
        match self.pending.iter_mut().find(|p| p.key == key) {
            Some(pending) => {
                // Re-requested while in flight: the result is wanted again.
                pending.generation = self.generation;
            }
            None => self.pending.push(PendingLoad {
                key: key.to_string(),
                generation: self.generation,
            }),
        }
        RequestOutcome::Pending
    }

    /// Hands the next queued load to the host for fetching.
    pub fn take_pending(&mut self) -> Option<PendingLoad> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn complete(
        &mut self,
        load: &PendingLoad,
        result: Result<Vec<EmissionRow>, DataError>,
    ) -> CompleteOutcome {
        match result {
            Err(err) => CompleteOutcome::Failed(err),
            Ok(rows) => {
                // Memoize regardless of staleness: a later re-request of the
                // same key re-derives from cache without another fetch.
                self.snapshots.insert(load.key.clone(), bin_rows(&rows));
                if load.generation == self.generation {
                    CompleteOutcome::Applied
                } else {
                    CompleteOutcome::Stale
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[GeoPoint]> {
        self.snapshots.get(key).map(|v| v.as_slice())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.snapshots.contains_key(key)
    }
}
