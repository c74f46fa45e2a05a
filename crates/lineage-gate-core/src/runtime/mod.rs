// crates/lineage-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Lineage Gate Runtime
// Description: Ingestion orchestration and in-memory store implementations.
// Purpose: Run the per-request pipeline over pluggable storage.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime wires classification, naming, and tracking-record construction
//! to the storage interfaces. Hosts supply the stores and a clock.

pub mod gateway;
pub mod store;

pub use gateway::ArchiveTarget;
pub use gateway::GatewaySettings;
pub use gateway::FailureContext;
pub use gateway::IngestError;
pub use gateway::IngestFailure;
pub use gateway::IngestOutcome;
pub use gateway::IngestReport;
pub use gateway::IngestRequest;
pub use gateway::IngestionGateway;
pub use gateway::StoredEvent;
pub use store::ArchivedObject;
pub use store::InMemoryArchive;
pub use store::InMemoryTrackingStore;
