// crates/lineage-gate-core/src/lib.rs
// ============================================================================
// Module: Lineage Gate Core Library
// Description: Public API surface for the Lineage Gate core.
// Purpose: Expose classification, naming, tracking types, interfaces, and the gateway.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Lineage Gate core decides which job-completion notifications emitted by a
//! data-processing engine describe schema- or table-mutating operations, names
//! the archived payload deterministically, and builds the tracking record a
//! downstream lineage consumer picks up. It performs no I/O itself; archive and
//! tracking persistence are reached through explicit interfaces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::ArchiveError;
pub use interfaces::ArchiveSink;
pub use interfaces::InsertOutcome;
pub use interfaces::JSON_CONTENT_TYPE;
pub use interfaces::TrackingStore;
pub use interfaces::TrackingStoreError;
pub use runtime::ArchiveTarget;
pub use runtime::ArchivedObject;
pub use runtime::GatewaySettings;
pub use runtime::InMemoryArchive;
pub use runtime::InMemoryTrackingStore;
pub use runtime::FailureContext;
pub use runtime::IngestError;
pub use runtime::IngestFailure;
pub use runtime::IngestOutcome;
pub use runtime::IngestReport;
pub use runtime::IngestRequest;
pub use runtime::IngestionGateway;
pub use runtime::StoredEvent;
