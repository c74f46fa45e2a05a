// crates/lineage-gate-core/src/core/mod.rs
// ============================================================================
// Module: Lineage Gate Core Types
// Description: Lineage event classification, artifact naming, and tracking records.
// Purpose: Provide the pure decision logic of the ingestion path.
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! Core types cover the whole decision surface of the gateway: tolerant payload
//! navigation, the relevance predicate, the deterministic artifact key, and the
//! initial tracking record. Every function here is pure; clocks are injected.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod clock;
pub mod event;
pub mod identifiers;
pub mod naming;
pub mod payload;
pub mod tracking;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use event::COMPLETE_EVENT_TYPE;
pub use event::Classification;
pub use event::Decision;
pub use event::ExtractionWarning;
pub use event::InvalidEvent;
pub use event::LOGICAL_PLAN_FACETS;
pub use event::RejectReason;
pub use event::RejectedEvent;
pub use event::RelevantEvent;
pub use event::RunEventType;
pub use event::SCHEMA_MUTATING_OPERATIONS;
pub use event::ValidationError;
pub use event::classify;
pub use event::is_schema_mutating;
pub use identifiers::JobName;
pub use identifiers::QualifierName;
pub use identifiers::RecordKey;
pub use identifiers::RunId;
pub use naming::ArtifactName;
pub use naming::CaptureTimestamp;
pub use naming::ObjectLocation;
pub use naming::normalize_notebook_name;
pub use payload::MissingHop;
pub use payload::PathSegment;
pub use payload::lookup;
pub use payload::lookup_str;
pub use tracking::DEFAULT_IS_ARCHIVED;
pub use tracking::DEFAULT_RETRY_COUNT;
pub use tracking::QualifierRule;
pub use tracking::TrackingDefaults;
pub use tracking::TrackingRecord;
pub use tracking::TrackingStatus;
pub use tracking::build_tracking_record;
