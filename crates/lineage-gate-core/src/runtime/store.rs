// crates/lineage-gate-core/src/runtime/store.rs
// ============================================================================
// Module: In-Memory Stores
// Description: Process-local archive sink and tracking store.
// Purpose: Back tests and local runs without external storage.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Both stores keep their contents behind a shared mutex and count every
//! write attempt, which lets callers assert that filtered or invalid events
//! never reach storage.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::identifiers::RecordKey;
use crate::core::naming::ObjectLocation;
use crate::core::tracking::TrackingRecord;
use crate::interfaces::ArchiveError;
use crate::interfaces::ArchiveSink;
use crate::interfaces::InsertOutcome;
use crate::interfaces::TrackingStore;
use crate::interfaces::TrackingStoreError;

// ============================================================================
// SECTION: In-Memory Archive
// ============================================================================

/// Archived object held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedObject {
    /// Raw payload bytes.
    pub bytes: Vec<u8>,
    /// Content type recorded at write time.
    pub content_type: String,
}

/// Mutable state of the in-memory archive.
#[derive(Debug, Default)]
struct ArchiveState {
    /// Objects keyed by `container/name`.
    objects: BTreeMap<String, ArchivedObject>,
    /// Number of `put` calls observed.
    put_calls: usize,
}

/// In-memory archive sink for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArchive {
    /// Shared archive state.
    state: Arc<Mutex<ArchiveState>>,
}

impl InMemoryArchive {
    /// Creates an empty archive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the object stored at `location`, if any.
    #[must_use]
    pub fn get(&self, location: &ObjectLocation) -> Option<ArchivedObject> {
        self.state.lock().ok()?.objects.get(&location.to_string()).cloned()
    }

    /// Returns the number of `put` calls observed.
    #[must_use]
    pub fn put_calls(&self) -> usize {
        self.state.lock().map_or(0, |state| state.put_calls)
    }

    /// Returns the number of distinct stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().map_or(0, |state| state.objects.len())
    }

    /// Returns true when nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArchiveSink for InMemoryArchive {
    fn put(
        &self,
        location: &ObjectLocation,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), ArchiveError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| ArchiveError::Io("archive mutex poisoned".to_string()))?;
        guard.put_calls += 1;
        guard.objects.insert(
            location.to_string(),
            ArchivedObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        drop(guard);
        Ok(())
    }
}

// ============================================================================
// SECTION: In-Memory Tracking Store
// ============================================================================

/// Mutable state of the in-memory tracking store.
#[derive(Debug, Default)]
struct TrackingState {
    /// Records keyed by record key.
    records: BTreeMap<RecordKey, TrackingRecord>,
    /// Number of `insert` calls observed.
    insert_calls: usize,
}

/// In-memory tracking store for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTrackingStore {
    /// Shared store state.
    state: Arc<Mutex<TrackingState>>,
}

impl InMemoryTrackingStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all records in key order.
    #[must_use]
    pub fn records(&self) -> Vec<TrackingRecord> {
        self.state.lock().map_or_else(|_| Vec::new(), |state| state.records.values().cloned().collect())
    }

    /// Returns the number of `insert` calls observed.
    #[must_use]
    pub fn insert_calls(&self) -> usize {
        self.state.lock().map_or(0, |state| state.insert_calls)
    }
}

impl TrackingStore for InMemoryTrackingStore {
    fn insert(&self, record: &TrackingRecord) -> Result<InsertOutcome, TrackingStoreError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| TrackingStoreError::Store("tracking mutex poisoned".to_string()))?;
        guard.insert_calls += 1;
        if guard.records.contains_key(&record.record_key) {
            return Ok(InsertOutcome::AlreadyPresent);
        }
        guard.records.insert(record.record_key.clone(), record.clone());
        drop(guard);
        Ok(InsertOutcome::Inserted)
    }

    fn get(&self, record_key: &RecordKey) -> Result<Option<TrackingRecord>, TrackingStoreError> {
        let guard = self
            .state
            .lock()
            .map_err(|_| TrackingStoreError::Store("tracking mutex poisoned".to_string()))?;
        Ok(guard.records.get(record_key).cloned())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
