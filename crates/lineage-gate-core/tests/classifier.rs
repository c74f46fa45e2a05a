// crates/lineage-gate-core/tests/classifier.rs
// ============================================================================
// Module: Classifier Tests
// Description: Tests for field extraction and the relevance predicate.
// ============================================================================
//! ## Overview
//! Validates required-field handling, event-type resolution, and facet lookup.

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

use lineage_gate_core::Decision;
use lineage_gate_core::JobName;
use lineage_gate_core::RejectReason;
use lineage_gate_core::RunEventType;
use lineage_gate_core::SCHEMA_MUTATING_OPERATIONS;
use lineage_gate_core::ValidationError;
use lineage_gate_core::classify;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const CREATE_TABLE: &str = "org.apache.spark.sql.execution.datasources.CreateTable";

fn event(event_type: &str, facet: &str, class_name: &str) -> Value {
    json!({
        "eventType": event_type,
        "run": {
            "runId": "r1",
            "facets": {
                facet: { "plan": [ { "@class": class_name } ] }
            }
        },
        "job": { "name": "etl_job.py" }
    })
}

fn bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}

// ============================================================================
// SECTION: Input Validation
// ============================================================================

#[test]
fn empty_body_is_rejected() {
    assert_eq!(classify(b"", None).unwrap_err().error, ValidationError::EmptyBody);
}

#[test]
fn malformed_body_is_rejected() {
    let err = classify(b"{not json", None).unwrap_err().error;
    assert!(matches!(err, ValidationError::MalformedBody(_)));
}

#[test]
fn missing_run_id_fails_even_when_relevant() {
    let mut payload = event("COMPLETE", "spark.logicalPlan", CREATE_TABLE);
    payload["run"].as_object_mut().unwrap().remove("runId");
    let err = classify(&bytes(&payload), None).unwrap_err().error;
    assert_eq!(
        err,
        ValidationError::MissingRequiredFields {
            run_id_missing: true,
            job_name_missing: false,
        }
    );
}

#[test]
fn missing_job_name_fails_even_when_irrelevant() {
    let mut payload = event("START", "spark.logicalPlan", "not.Tracked");
    payload["job"] = json!({});
    let err = classify(&bytes(&payload), None).unwrap_err().error;
    assert_eq!(
        err,
        ValidationError::MissingRequiredFields {
            run_id_missing: false,
            job_name_missing: true,
        }
    );
}

#[test]
fn empty_and_non_string_required_fields_count_as_missing() {
    let mut payload = event("COMPLETE", "spark.logicalPlan", CREATE_TABLE);
    payload["run"]["runId"] = json!("");
    payload["job"]["name"] = json!(42);
    let err = classify(&bytes(&payload), None).unwrap_err().error;
    assert_eq!(
        err,
        ValidationError::MissingRequiredFields {
            run_id_missing: true,
            job_name_missing: true,
        }
    );
}

#[test]
fn non_object_root_reports_missing_fields() {
    let err = classify(b"[1, 2, 3]", None).unwrap_err().error;
    assert!(matches!(err, ValidationError::MissingRequiredFields { .. }));
}

#[test]
fn missing_fields_keep_extracted_values_and_warnings() {
    let invalid = classify(br#"{"job":{"name":"j"}}"#, None).unwrap_err();
    assert_eq!(
        invalid.error,
        ValidationError::MissingRequiredFields {
            run_id_missing: true,
            job_name_missing: false,
        }
    );
    assert_eq!(invalid.run_id, None);
    assert_eq!(invalid.job_name.as_ref().map(JobName::as_str), Some("j"));
    assert_eq!(invalid.warnings.len(), 1);
    assert_eq!(invalid.warnings[0].field, "operation_class");
}

// ============================================================================
// SECTION: Relevance
// ============================================================================

#[test]
fn every_allow_listed_class_is_relevant() {
    for class_name in SCHEMA_MUTATING_OPERATIONS {
        let payload = event("COMPLETE", "spark.logicalPlan", class_name);
        let classification = classify(&bytes(&payload), None).unwrap();
        let Decision::Relevant(relevant) = classification.decision else {
            panic!("expected relevant for {class_name}");
        };
        assert_eq!(relevant.operation_class, class_name);
        assert_eq!(relevant.run_id.as_str(), "r1");
        assert_eq!(relevant.job_name.as_str(), "etl_job.py");
        assert!(classification.warnings.is_empty());
    }
}

#[test]
fn bare_logical_plan_facet_is_accepted() {
    let payload = event("COMPLETE", "logicalPlan", CREATE_TABLE);
    let classification = classify(&bytes(&payload), None).unwrap();
    assert!(matches!(classification.decision, Decision::Relevant(_)));
}

#[test]
fn non_complete_event_is_skipped_with_event_type_reason() {
    let payload = event("START", "spark.logicalPlan", CREATE_TABLE);
    let classification = classify(&bytes(&payload), None).unwrap();
    let Decision::Rejected(rejected) = classification.decision else {
        panic!("expected rejection");
    };
    assert_eq!(
        rejected.reason,
        RejectReason::EventType {
            observed: Some(RunEventType::Start),
        }
    );
}

#[test]
fn event_type_match_is_case_sensitive() {
    let payload = event("complete", "spark.logicalPlan", CREATE_TABLE);
    let classification = classify(&bytes(&payload), None).unwrap();
    assert!(matches!(classification.decision, Decision::Rejected(_)));
}

#[test]
fn class_match_is_exact() {
    let payload = event("COMPLETE", "spark.logicalPlan", &format!("{CREATE_TABLE}Extra"));
    let classification = classify(&bytes(&payload), None).unwrap();
    let Decision::Rejected(rejected) = classification.decision else {
        panic!("expected rejection");
    };
    assert!(matches!(rejected.reason, RejectReason::OperationClass { observed: Some(_) }));
}

#[test]
fn missing_plan_yields_warning_and_skip() {
    let mut payload = event("COMPLETE", "spark.logicalPlan", CREATE_TABLE);
    payload["run"]["facets"] = json!({ "spark.logicalPlan": { "plan": [] } });
    let classification = classify(&bytes(&payload), None).unwrap();
    assert_eq!(classification.warnings.len(), 1);
    assert_eq!(classification.warnings[0].field, "operation_class");
    assert!(classification.warnings[0].detail.contains("[\"plan\"][0]"));
    let Decision::Rejected(rejected) = classification.decision else {
        panic!("expected rejection");
    };
    assert_eq!(
        rejected.reason,
        RejectReason::OperationClass {
            observed: None,
        }
    );
}

#[test]
fn first_present_facet_wins_even_when_its_plan_is_empty() {
    let mut payload = event("COMPLETE", "logicalPlan", CREATE_TABLE);
    payload["run"]["facets"]["spark.logicalPlan"] = json!({ "plan": [] });
    let classification = classify(&bytes(&payload), None).unwrap();
    assert_eq!(classification.warnings.len(), 1);
    assert!(classification.warnings[0].detail.contains("spark.logicalPlan"));
    let Decision::Rejected(rejected) = classification.decision else {
        panic!("expected rejection");
    };
    assert_eq!(
        rejected.reason,
        RejectReason::OperationClass {
            observed: None,
        }
    );
}

#[test]
fn absent_plan_facets_name_both_candidates() {
    let mut payload = event("COMPLETE", "logicalPlan", CREATE_TABLE);
    payload["run"]["facets"] = json!({ "other": {} });
    let classification = classify(&bytes(&payload), None).unwrap();
    assert_eq!(classification.warnings.len(), 1);
    let detail = &classification.warnings[0].detail;
    assert!(detail.contains("spark.logicalPlan") && detail.contains("\"logicalPlan\""));
    assert!(detail.ends_with("is absent"));
}

// ============================================================================
// SECTION: Event-Type Override
// ============================================================================

#[test]
fn query_override_wins_over_payload() {
    let payload = event("START", "spark.logicalPlan", CREATE_TABLE);
    let classification = classify(&bytes(&payload), Some("COMPLETE")).unwrap();
    assert!(matches!(classification.decision, Decision::Relevant(_)));

    let payload = event("COMPLETE", "spark.logicalPlan", CREATE_TABLE);
    let classification = classify(&bytes(&payload), Some("FAIL")).unwrap();
    assert!(matches!(classification.decision, Decision::Rejected(_)));
}

#[test]
fn empty_override_still_takes_precedence() {
    let payload = event("COMPLETE", "spark.logicalPlan", CREATE_TABLE);
    let classification = classify(&bytes(&payload), Some("")).unwrap();
    let Decision::Rejected(rejected) = classification.decision else {
        panic!("expected rejection");
    };
    assert_eq!(
        rejected.reason,
        RejectReason::EventType {
            observed: Some(RunEventType::Other(String::new())),
        }
    );
}

#[test]
fn absent_event_type_is_skipped() {
    let mut payload = event("COMPLETE", "spark.logicalPlan", CREATE_TABLE);
    payload.as_object_mut().unwrap().remove("eventType");
    let classification = classify(&bytes(&payload), None).unwrap();
    let Decision::Rejected(rejected) = classification.decision else {
        panic!("expected rejection");
    };
    assert_eq!(
        rejected.reason,
        RejectReason::EventType {
            observed: None,
        }
    );
}
