// crates/lineage-gate-core/src/core/tracking.rs
// ============================================================================
// Module: Tracking Records
// Description: Tracking record layout, lifecycle states, and initial construction.
// Purpose: Produce the row a downstream lineage consumer processes with retries.
// Dependencies: crate::core::{identifiers, naming}, serde
// ============================================================================

//! ## Overview
//! One tracking record is created per accepted lineage event, after its raw
//! payload has been archived. The gateway only ever creates records in
//! [`TrackingStatus::Unprocessed`]; later transitions and retry-budget
//! decrements belong to the downstream consumer and are described here only so
//! both sides share one definition.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::JobName;
use crate::core::identifiers::QualifierName;
use crate::core::identifiers::RecordKey;
use crate::core::naming::ObjectLocation;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default retry budget assigned to new tracking records.
pub const DEFAULT_RETRY_COUNT: u32 = 3;
/// Default archived flag assigned to new tracking records.
pub const DEFAULT_IS_ARCHIVED: bool = true;

// ============================================================================
// SECTION: Lifecycle
// ============================================================================

/// Processing state of a tracking record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingStatus {
    /// Waiting for the downstream consumer.
    Unprocessed,
    /// Claimed by the downstream consumer.
    Processing,
    /// Lineage graph updated.
    Processed,
    /// Retry budget exhausted.
    Failed,
}

impl TrackingStatus {
    /// Returns the stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unprocessed => "UNPROCESSED",
            Self::Processing => "PROCESSING",
            Self::Processed => "PROCESSED",
            Self::Failed => "FAILED",
        }
    }

    /// Parses a stored label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "UNPROCESSED" => Some(Self::Unprocessed),
            "PROCESSING" => Some(Self::Processing),
            "PROCESSED" => Some(Self::Processed),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns true when no further transitions are allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Processed | Self::Failed)
    }

    /// Returns true when `next` is a legal successor state.
    ///
    /// `Processing -> Unprocessed` releases a claim for another retry.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Unprocessed, Self::Processing)
                | (Self::Processing, Self::Processed | Self::Failed | Self::Unprocessed)
        )
    }
}

// ============================================================================
// SECTION: Qualifier Rule
// ============================================================================

/// Rule deriving a tracking qualifier from a normalized job name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QualifierRule {
    /// Qualifier equals the normalized job name.
    #[default]
    Identity,
    /// Qualifier is the prefix followed by the normalized job name.
    Prefix(String),
}

impl QualifierRule {
    /// Applies the rule to a normalized job name.
    #[must_use]
    pub fn qualify(&self, job_name: &JobName) -> QualifierName {
        match self {
            Self::Identity => QualifierName::new(job_name.as_str()),
            Self::Prefix(prefix) => QualifierName::new(format!("{prefix}{job_name}")),
        }
    }
}

// ============================================================================
// SECTION: Tracking Record
// ============================================================================

/// Initial values applied to new tracking records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingDefaults {
    /// Retry budget for the downstream consumer.
    pub retry_count: u32,
    /// Whether the raw artifact is already archived.
    pub is_archived: bool,
}

impl Default for TrackingDefaults {
    fn default() -> Self {
        Self {
            retry_count: DEFAULT_RETRY_COUNT,
            is_archived: DEFAULT_IS_ARCHIVED,
        }
    }
}

/// Tracking record handed to the downstream consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRecord {
    /// Qualified job identity.
    pub qualifier_name: QualifierName,
    /// Key shared with the archived artifact.
    pub record_key: RecordKey,
    /// Lifecycle state.
    pub status: TrackingStatus,
    /// Remaining retry budget.
    pub retry_count: u32,
    /// Whether the raw artifact has been archived.
    pub is_archived: bool,
    /// Archived artifact locator (`container/fileName`).
    pub file_path: String,
}

/// Builds the initial tracking record for an archived artifact.
#[must_use]
pub fn build_tracking_record(
    record_key: RecordKey,
    qualifier_name: QualifierName,
    location: &ObjectLocation,
    defaults: TrackingDefaults,
) -> TrackingRecord {
    TrackingRecord {
        qualifier_name,
        record_key,
        status: TrackingStatus::Unprocessed,
        retry_count: defaults.retry_count,
        is_archived: defaults.is_archived,
        file_path: location.to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "Test-only assertions."
    )]

    use serde_json::json;

    use super::*;

    #[test]
    fn build_sets_initial_state() {
        let location = ObjectLocation::new("lineage", "r1_job_20240102030405.json");
        let record = build_tracking_record(
            RecordKey::new("r1_job_20240102030405"),
            QualifierName::new("job"),
            &location,
            TrackingDefaults::default(),
        );
        assert_eq!(record.status, TrackingStatus::Unprocessed);
        assert_eq!(record.retry_count, DEFAULT_RETRY_COUNT);
        assert!(record.is_archived);
        assert_eq!(record.file_path, "lineage/r1_job_20240102030405.json");
    }

    #[test]
    fn record_serializes_with_consumer_field_names() {
        let record = build_tracking_record(
            RecordKey::new("k"),
            QualifierName::new("q"),
            &ObjectLocation::new("c", "k.json"),
            TrackingDefaults {
                retry_count: 5,
                is_archived: false,
            },
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "qualifierName": "q",
                "recordKey": "k",
                "status": "UNPROCESSED",
                "retryCount": 5,
                "isArchived": false,
                "filePath": "c/k.json"
            })
        );
    }

    #[test]
    fn status_labels_round_trip() {
        for status in [
            TrackingStatus::Unprocessed,
            TrackingStatus::Processing,
            TrackingStatus::Processed,
            TrackingStatus::Failed,
        ] {
            assert_eq!(TrackingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TrackingStatus::parse("unprocessed"), None);
    }

    #[test]
    fn lifecycle_transitions_follow_consumer_flow() {
        use TrackingStatus::*;
        assert!(Unprocessed.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Processed));
        assert!(Processing.can_transition_to(Failed));
        assert!(Processing.can_transition_to(Unprocessed));
        assert!(!Unprocessed.can_transition_to(Processed));
        assert!(!Processed.can_transition_to(Processing));
        assert!(Processed.is_terminal() && Failed.is_terminal());
        assert!(!Unprocessed.is_terminal());
    }

    #[test]
    fn qualifier_rule_prefixes_job_name() {
        let job = JobName::new("etl_job");
        assert_eq!(QualifierRule::Identity.qualify(&job).as_str(), "etl_job");
        assert_eq!(QualifierRule::Prefix("spark://".to_string()).qualify(&job).as_str(), "spark://etl_job");
    }
}
