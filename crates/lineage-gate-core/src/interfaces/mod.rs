// crates/lineage-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Lineage Gate Interfaces
// Description: Backend-agnostic interfaces for artifact archiving and tracking.
// Purpose: Define the storage surfaces the ingestion gateway writes through.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The gateway performs exactly two external writes per accepted event: the
//! raw payload into an object store and one tracking record into a structured
//! record store. Both are reached through the traits below so hosts can pick
//! backends (S3, filesystem, `SQLite`, in-memory) without touching the core.
//! Writes are append-only; no interface here updates or deletes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::RecordKey;
use crate::core::naming::ObjectLocation;
use crate::core::tracking::TrackingRecord;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Content type recorded on archived lineage payloads.
pub const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// SECTION: Archive Sink
// ============================================================================

/// Archive sink errors.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Location rejected by the backend.
    #[error("archive location invalid: {0}")]
    Invalid(String),
    /// Backend I/O failure.
    #[error("archive io error: {0}")]
    Io(String),
    /// Backend service returned an error.
    #[error("archive backend error: {0}")]
    Backend(String),
}

/// Write-once object store for raw lineage payloads.
pub trait ArchiveSink: Send + Sync {
    /// Writes `bytes` at `location` with the given content type.
    ///
    /// The write is unconditional; no existence check is performed.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError`] when the backend rejects or fails the write.
    fn put(
        &self,
        location: &ObjectLocation,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), ArchiveError>;
}

// ============================================================================
// SECTION: Tracking Store
// ============================================================================

/// Tracking store errors.
#[derive(Debug, Error)]
pub enum TrackingStoreError {
    /// Store I/O error.
    #[error("tracking store io error: {0}")]
    Io(String),
    /// Stored data failed validation.
    #[error("tracking store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("tracking store error: {0}")]
    Store(String),
}

/// Result of inserting a tracking record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new record was written.
    Inserted,
    /// A record with the same key already existed and was left untouched.
    AlreadyPresent,
}

/// Structured record store for tracking records.
pub trait TrackingStore: Send + Sync {
    /// Inserts a tracking record keyed by its record key.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingStoreError`] when the insert fails.
    fn insert(&self, record: &TrackingRecord) -> Result<InsertOutcome, TrackingStoreError>;

    /// Loads a tracking record by key.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingStoreError`] when loading fails.
    fn get(&self, record_key: &RecordKey) -> Result<Option<TrackingRecord>, TrackingStoreError>;
}
