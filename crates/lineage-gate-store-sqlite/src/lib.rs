// crates/lineage-gate-store-sqlite/src/lib.rs
// ============================================================================
// Module: Lineage Gate SQLite Store Library
// Description: SQLite-backed tracking record store.
// Purpose: Persist one tracking record per archived lineage artifact.
// Dependencies: lineage-gate-core, rusqlite
// ============================================================================

//! ## Overview
//! `lineage-gate-store-sqlite` implements [`lineage_gate_core::TrackingStore`]
//! over a single `SQLite` database file. Records are keyed by their record key
//! and never updated by the gateway.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
pub use store::SqliteTrackingStore;
