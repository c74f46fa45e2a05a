// crates/lineage-gate-core/tests/gateway.rs
// ============================================================================
// Module: Ingestion Gateway Tests
// Description: End-to-end tests for the per-request ingestion pipeline.
// ============================================================================
//! ## Overview
//! Validates store-call counts, derived keys, tracking records, and error
//! classification across the accept, skip, and failure paths.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;

use lineage_gate_core::ArchiveError;
use lineage_gate_core::ArchiveSink;
use lineage_gate_core::ArchiveTarget;
use lineage_gate_core::FixedClock;
use lineage_gate_core::GatewaySettings;
use lineage_gate_core::InMemoryArchive;
use lineage_gate_core::InMemoryTrackingStore;
use lineage_gate_core::IngestError;
use lineage_gate_core::IngestOutcome;
use lineage_gate_core::IngestRequest;
use lineage_gate_core::IngestionGateway;
use lineage_gate_core::InsertOutcome;
use lineage_gate_core::JobName;
use lineage_gate_core::ObjectLocation;
use lineage_gate_core::QualifierRule;
use lineage_gate_core::RecordKey;
use lineage_gate_core::RunId;
use lineage_gate_core::StoredEvent;
use lineage_gate_core::TrackingDefaults;
use lineage_gate_core::TrackingRecord;
use lineage_gate_core::TrackingStatus;
use lineage_gate_core::TrackingStore;
use lineage_gate_core::TrackingStoreError;
use lineage_gate_core::ValidationError;
use time::macros::datetime;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const CONTAINER: &str = "lineage";

const RELEVANT_BODY: &str = r#"{"eventType":"COMPLETE","run":{"runId":"r1","facets":{"logicalPlan":{"plan":[{"@class":"org.apache.spark.sql.execution.datasources.CreateTable"}]}}},"job":{"name":"etl_job.py"}}"#;

struct Harness {
    archive: InMemoryArchive,
    tracking: InMemoryTrackingStore,
    gateway: IngestionGateway,
}

fn harness() -> Harness {
    harness_with(GatewaySettings::default(), true)
}

fn harness_with(settings: GatewaySettings, configured: bool) -> Harness {
    let archive = InMemoryArchive::new();
    let tracking = InMemoryTrackingStore::new();
    let target = configured.then(|| ArchiveTarget::new(CONTAINER, Arc::new(archive.clone())));
    let gateway = IngestionGateway::new(
        target,
        Arc::new(tracking.clone()),
        Arc::new(FixedClock::new(datetime!(2024-01-02 03:04:05 UTC))),
        settings,
    );
    Harness {
        archive,
        tracking,
        gateway,
    }
}

fn request(body: &str) -> IngestRequest<'_> {
    IngestRequest {
        body: body.as_bytes(),
        event_type_override: None,
    }
}

fn expect_stored(outcome: IngestOutcome) -> StoredEvent {
    match outcome {
        IngestOutcome::Stored(stored) => *stored,
        IngestOutcome::Skipped(rejected) => panic!("expected stored, got skip: {}", rejected.reason),
    }
}

struct FailingArchive;

impl ArchiveSink for FailingArchive {
    fn put(&self, _: &ObjectLocation, _: &[u8], _: &str) -> Result<(), ArchiveError> {
        Err(ArchiveError::Backend("service unavailable".to_string()))
    }
}

struct FailingTracking;

impl TrackingStore for FailingTracking {
    fn insert(&self, _: &TrackingRecord) -> Result<InsertOutcome, TrackingStoreError> {
        Err(TrackingStoreError::Store("table unavailable".to_string()))
    }

    fn get(&self, _: &RecordKey) -> Result<Option<TrackingRecord>, TrackingStoreError> {
        Ok(None)
    }
}

// ============================================================================
// SECTION: Accept Path
// ============================================================================

#[test]
fn relevant_event_is_archived_and_tracked_once() {
    let h = harness();
    let report = h.gateway.ingest(request(RELEVANT_BODY)).unwrap();
    let stored = expect_stored(report.outcome);

    assert_eq!(h.archive.put_calls(), 1);
    assert_eq!(h.tracking.insert_calls(), 1);
    assert_eq!(stored.artifact.record_key.as_str(), "r1_etl_job_20240102030405");
    assert_eq!(stored.location.to_string(), "lineage/r1_etl_job_20240102030405.json");
    assert_eq!(stored.insert, InsertOutcome::Inserted);

    let object = h.archive.get(&stored.location).unwrap();
    assert_eq!(object.bytes, RELEVANT_BODY.as_bytes());
    assert_eq!(object.content_type, "application/json");

    let record = h.tracking.get(&stored.artifact.record_key).unwrap().unwrap();
    assert_eq!(record.status, TrackingStatus::Unprocessed);
    assert_eq!(record.retry_count, 3);
    assert!(record.is_archived);
    assert_eq!(record.qualifier_name.as_str(), "etl_job");
    assert_eq!(record.file_path, "lineage/r1_etl_job_20240102030405.json");
}

#[test]
fn settings_shape_the_tracking_record() {
    let settings = GatewaySettings {
        tracking: TrackingDefaults {
            retry_count: 7,
            is_archived: false,
        },
        qualifier: QualifierRule::Prefix("notebook:".to_string()),
    };
    let h = harness_with(settings, true);
    let stored = expect_stored(h.gateway.ingest(request(RELEVANT_BODY)).unwrap().outcome);
    assert_eq!(stored.record.retry_count, 7);
    assert!(!stored.record.is_archived);
    assert_eq!(stored.record.qualifier_name.as_str(), "notebook:etl_job");
}

#[test]
fn same_second_duplicates_share_one_key() {
    let h = harness();
    let first = expect_stored(h.gateway.ingest(request(RELEVANT_BODY)).unwrap().outcome);
    let second = expect_stored(h.gateway.ingest(request(RELEVANT_BODY)).unwrap().outcome);
    assert_eq!(first.artifact, second.artifact);
    assert_eq!(second.insert, InsertOutcome::AlreadyPresent);
    assert_eq!(h.archive.put_calls(), 2);
    assert_eq!(h.archive.len(), 1);
    assert_eq!(h.tracking.records().len(), 1);
}

#[test]
fn leading_dot_job_name_is_stored_with_warning() {
    let h = harness();
    let body = RELEVANT_BODY.replace("etl_job.py", ".hidden");
    let report = h.gateway.ingest(request(&body)).unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].field, "job_name");
    let stored = expect_stored(report.outcome);
    assert_eq!(stored.artifact.record_key.as_str(), "r1__20240102030405");
}

// ============================================================================
// SECTION: Skip Path
// ============================================================================

#[test]
fn start_event_is_skipped_without_store_calls() {
    let h = harness();
    let body = RELEVANT_BODY.replace("COMPLETE", "START");
    let report = h.gateway.ingest(request(&body)).unwrap();
    assert!(matches!(report.outcome, IngestOutcome::Skipped(_)));
    assert_eq!(h.archive.put_calls(), 0);
    assert_eq!(h.tracking.insert_calls(), 0);
}

#[test]
fn untracked_class_is_skipped_without_store_calls() {
    let h = harness();
    let body = RELEVANT_BODY.replace("datasources.CreateTable", "datasources.DropTable");
    let report = h.gateway.ingest(request(&body)).unwrap();
    assert!(matches!(report.outcome, IngestOutcome::Skipped(_)));
    assert_eq!(h.archive.put_calls(), 0);
    assert_eq!(h.tracking.insert_calls(), 0);
}

#[test]
fn skip_does_not_require_archive_configuration() {
    let h = harness_with(GatewaySettings::default(), false);
    let body = RELEVANT_BODY.replace("COMPLETE", "RUNNING");
    let report = h.gateway.ingest(request(&body)).unwrap();
    assert!(matches!(report.outcome, IngestOutcome::Skipped(_)));
}

#[test]
fn override_controls_relevance() {
    let h = harness();
    let report = h
        .gateway
        .ingest(IngestRequest {
            body: RELEVANT_BODY.as_bytes(),
            event_type_override: Some("START"),
        })
        .unwrap();
    assert!(matches!(report.outcome, IngestOutcome::Skipped(_)));
    assert_eq!(h.archive.put_calls(), 0);
}

// ============================================================================
// SECTION: Failure Paths
// ============================================================================

#[test]
fn input_errors_map_to_400_without_store_calls() {
    let h = harness();
    let missing_run = RELEVANT_BODY.replace("\"runId\":\"r1\",", "");
    for body in ["", "{oops", missing_run.as_str()] {
        let err = h.gateway.ingest(request(body)).unwrap_err().error;
        assert!(matches!(err, IngestError::Input(_)), "body {body:?}");
        assert_eq!(err.status_code(), 400);
    }
    assert_eq!(h.archive.put_calls(), 0);
    assert_eq!(h.tracking.insert_calls(), 0);
}

#[test]
fn missing_archive_configuration_maps_to_500_without_store_calls() {
    let h = harness_with(GatewaySettings::default(), false);
    let err = h.gateway.ingest(request(RELEVANT_BODY)).unwrap_err().error;
    assert!(matches!(err, IngestError::Configuration(_)));
    assert_eq!(err.status_code(), 500);
    assert!(!h.gateway.has_archive());
    assert_eq!(h.tracking.insert_calls(), 0);
}

#[test]
fn blank_container_counts_as_unconfigured() {
    let tracking = InMemoryTrackingStore::new();
    let gateway = IngestionGateway::new(
        Some(ArchiveTarget::new("  ", Arc::new(InMemoryArchive::new()))),
        Arc::new(tracking.clone()),
        Arc::new(FixedClock::new(datetime!(2024-01-02 03:04:05 UTC))),
        GatewaySettings::default(),
    );
    let err = gateway.ingest(request(RELEVANT_BODY)).unwrap_err().error;
    assert_eq!(err.kind(), "configuration");
    assert_eq!(tracking.insert_calls(), 0);
}

#[test]
fn archive_failure_stops_before_tracking() {
    let tracking = InMemoryTrackingStore::new();
    let gateway = IngestionGateway::new(
        Some(ArchiveTarget::new(CONTAINER, Arc::new(FailingArchive))),
        Arc::new(tracking.clone()),
        Arc::new(FixedClock::new(datetime!(2024-01-02 03:04:05 UTC))),
        GatewaySettings::default(),
    );
    let err = gateway.ingest(request(RELEVANT_BODY)).unwrap_err().error;
    assert!(matches!(err, IngestError::Archive(_)));
    assert_eq!(err.status_code(), 500);
    assert_eq!(tracking.insert_calls(), 0);
}

#[test]
fn tracking_failure_reports_orphaned_artifact() {
    let archive = InMemoryArchive::new();
    let gateway = IngestionGateway::new(
        Some(ArchiveTarget::new(CONTAINER, Arc::new(archive.clone()))),
        Arc::new(FailingTracking),
        Arc::new(FixedClock::new(datetime!(2024-01-02 03:04:05 UTC))),
        GatewaySettings::default(),
    );
    let failure = gateway.ingest(request(RELEVANT_BODY)).unwrap_err();
    assert_eq!(
        failure.context.record_key,
        Some(RecordKey::new("r1_etl_job_20240102030405"))
    );
    assert_eq!(failure.context.run_id.as_ref().map(RunId::as_str), Some("r1"));
    let err = failure.error;
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.kind(), "tracking_write");
    let IngestError::Tracking {
        location, ..
    } = err
    else {
        panic!("expected tracking error");
    };
    assert_eq!(location.to_string(), "lineage/r1_etl_job_20240102030405.json");
    assert!(archive.get(&location).is_some());
}

#[test]
fn validation_error_is_preserved_in_input_variant() {
    let h = harness();
    let err = h.gateway.ingest(request("")).unwrap_err().error;
    assert!(matches!(err, IngestError::Input(ValidationError::EmptyBody)));
}

#[test]
fn configuration_failure_keeps_job_name_warning() {
    let h = harness_with(GatewaySettings::default(), false);
    let body = RELEVANT_BODY.replace("etl_job.py", ".hidden");
    let failure = h.gateway.ingest(request(&body)).unwrap_err();
    assert!(matches!(failure.error, IngestError::Configuration(_)));
    assert_eq!(failure.warnings.len(), 1);
    assert_eq!(failure.warnings[0].field, "job_name");
    assert_eq!(failure.context.job_name.as_ref().map(JobName::as_str), Some(".hidden"));
    assert_eq!(
        failure.context.operation_class.as_deref(),
        Some("org.apache.spark.sql.execution.datasources.CreateTable")
    );
    assert_eq!(failure.context.record_key, None);
}

#[test]
fn input_failure_keeps_extracted_fields_and_warnings() {
    let h = harness();
    let failure = h.gateway.ingest(request(r#"{"job":{"name":"nb"}}"#)).unwrap_err();
    assert!(matches!(failure.error, IngestError::Input(_)));
    assert_eq!(failure.context.run_id, None);
    assert_eq!(failure.context.job_name.as_ref().map(JobName::as_str), Some("nb"));
    assert_eq!(failure.warnings.len(), 1);
    assert_eq!(failure.warnings[0].field, "operation_class");
}
