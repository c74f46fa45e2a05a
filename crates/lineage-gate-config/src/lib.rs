// crates/lineage-gate-config/src/lib.rs
// ============================================================================
// Module: Lineage Gate Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for lineage-gate.toml semantics.
// Dependencies: lineage-gate-core, lineage-gate-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `lineage-gate-config` defines the configuration model for the lineage
//! ingestion gateway. Values come from a TOML file, with the archive
//! connection string and container overridable from the process environment.
//! Validation is strict and fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
