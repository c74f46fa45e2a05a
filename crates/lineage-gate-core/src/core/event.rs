// crates/lineage-gate-core/src/core/event.rs
// ============================================================================
// Module: Lineage Event Classifier
// Description: Field extraction and the relevance predicate for lineage events.
// Purpose: Decide which job-completion notifications are worth archiving.
// Dependencies: crate::core::{identifiers, payload}, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A lineage event is relevant when its event type is exactly `COMPLETE` and
//! the first logical-plan node names a schema- or table-mutating operation
//! from [`SCHEMA_MUTATING_OPERATIONS`]. Run identifier and job name are
//! mandatory regardless of relevance. Optional fields that cannot be reached
//! degrade to "absent" and surface as [`ExtractionWarning`]s.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::JobName;
use crate::core::identifiers::RunId;
use crate::core::payload::MissingHop;
use crate::core::payload::PathSegment;
use crate::core::payload::PathSegment::Index;
use crate::core::payload::PathSegment::Key;
use crate::core::payload::lookup;
use crate::core::payload::lookup_str;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Wire value of the only event type considered relevant.
pub const COMPLETE_EVENT_TYPE: &str = "COMPLETE";

/// Fully-qualified operation classes treated as schema- or table-mutating.
pub const SCHEMA_MUTATING_OPERATIONS: [&str; 6] = [
    "org.apache.spark.sql.execution.datasources.CreateTable",
    "org.apache.spark.sql.catalyst.plans.logical.CreateViewStatement",
    "org.apache.spark.sql.catalyst.plans.logical.CreateTableAsSelectStatement",
    "org.apache.spark.sql.catalyst.plans.logical.InsertIntoStatement",
    "org.apache.spark.sql.execution.datasources.SaveIntoDataSourceCommand",
    "org.apache.spark.sql.catalyst.plans.logical.MergeIntoTable",
];

/// Run facet keys holding the logical plan, in lookup order.
pub const LOGICAL_PLAN_FACETS: [&str; 2] = ["spark.logicalPlan", "logicalPlan"];

/// Payload path to the run identifier.
const RUN_ID_PATH: [PathSegment<'static>; 2] = [Key("run"), Key("runId")];
/// Payload path to the job name.
const JOB_NAME_PATH: [PathSegment<'static>; 2] = [Key("job"), Key("name")];
/// Payload path to the event type.
const EVENT_TYPE_PATH: [PathSegment<'static>; 1] = [Key("eventType")];

/// Returns true when `class_name` is an allow-listed operation class.
///
/// Membership is exact and case-sensitive.
#[must_use]
pub fn is_schema_mutating(class_name: &str) -> bool {
    SCHEMA_MUTATING_OPERATIONS.contains(&class_name)
}

// ============================================================================
// SECTION: Event Types
// ============================================================================

/// Lineage run event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum RunEventType {
    /// Run started.
    Start,
    /// Run still in progress.
    Running,
    /// Run completed.
    Complete,
    /// Run aborted.
    Abort,
    /// Run failed.
    Fail,
    /// Any other value, kept verbatim.
    Other(String),
}

impl RunEventType {
    /// Parses a wire value with exact, case-sensitive matching.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "START" => Self::Start,
            "RUNNING" => Self::Running,
            COMPLETE_EVENT_TYPE => Self::Complete,
            "ABORT" => Self::Abort,
            "FAIL" => Self::Fail,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Start => "START",
            Self::Running => "RUNNING",
            Self::Complete => COMPLETE_EVENT_TYPE,
            Self::Abort => "ABORT",
            Self::Fail => "FAIL",
            Self::Other(value) => value,
        }
    }
}

impl fmt::Display for RunEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RunEventType> for String {
    fn from(value: RunEventType) -> Self {
        value.as_str().to_string()
    }
}

// ============================================================================
// SECTION: Classification Results
// ============================================================================

/// Event accepted for archiving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelevantEvent {
    /// Run identifier.
    pub run_id: RunId,
    /// Job name as emitted (not normalized).
    pub job_name: JobName,
    /// Allow-listed operation class.
    pub operation_class: String,
    /// Resolved event type.
    pub event_type: RunEventType,
}

/// Event filtered out by the relevance predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedEvent {
    /// Run identifier.
    pub run_id: RunId,
    /// Job name as emitted (not normalized).
    pub job_name: JobName,
    /// Why the event was filtered.
    pub reason: RejectReason,
}

/// Reason an event failed the relevance predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    /// Event type was not `COMPLETE` (or absent).
    EventType {
        /// Event type observed, if any.
        observed: Option<RunEventType>,
    },
    /// Operation class was absent or not allow-listed.
    OperationClass {
        /// Operation class observed, if any.
        observed: Option<String>,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EventType {
                observed: Some(event_type),
            } => write!(f, "event type {event_type} is not {COMPLETE_EVENT_TYPE}"),
            Self::EventType {
                observed: None,
            } => f.write_str("event type is missing"),
            Self::OperationClass {
                observed: Some(class_name),
            } => write!(f, "operation class {class_name} is not tracked"),
            Self::OperationClass {
                observed: None,
            } => f.write_str("operation class is missing"),
        }
    }
}

/// Relevance decision for a classified event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Event should be archived and tracked.
    Relevant(RelevantEvent),
    /// Event should be skipped.
    Rejected(RejectedEvent),
}

/// Non-fatal issue found while extracting optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionWarning {
    /// Field that could not be extracted.
    pub field: &'static str,
    /// Human-readable detail.
    pub detail: String,
}

impl ExtractionWarning {
    /// Creates a new extraction warning.
    #[must_use]
    pub fn new(field: &'static str, detail: impl Into<String>) -> Self {
        Self {
            field,
            detail: detail.into(),
        }
    }
}

/// Classifier output: the decision plus any advisory warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Relevance decision.
    pub decision: Decision,
    /// Advisory extraction warnings.
    pub warnings: Vec<ExtractionWarning>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Input errors that stop classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Request body was empty.
    #[error("request body is empty")]
    EmptyBody,
    /// Request body was not valid JSON.
    #[error("invalid JSON format: {0}")]
    MalformedBody(String),
    /// Run identifier or job name was missing.
    #[error("missing required fields: runId or job.name")]
    MissingRequiredFields {
        /// Run identifier was missing or empty.
        run_id_missing: bool,
        /// Job name was missing or empty.
        job_name_missing: bool,
    },
}

/// Rejected input plus whatever was extracted before the rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct InvalidEvent {
    /// Why the input was rejected.
    pub error: ValidationError,
    /// Run identifier, when present.
    pub run_id: Option<RunId>,
    /// Job name, when present.
    pub job_name: Option<JobName>,
    /// Extraction warnings collected before the rejection.
    pub warnings: Vec<ExtractionWarning>,
}

impl From<ValidationError> for InvalidEvent {
    fn from(error: ValidationError) -> Self {
        Self {
            error,
            run_id: None,
            job_name: None,
            warnings: Vec::new(),
        }
    }
}

// ============================================================================
// SECTION: Classifier
// ============================================================================

/// Classifies a raw lineage event body.
///
/// `event_type_override` is the query-supplied event type; when present (even
/// empty) it wins over the payload's `eventType` field.
///
/// # Errors
///
/// Returns [`InvalidEvent`] when the body is empty, is not JSON, or lacks a
/// run identifier or job name. Warnings and identifiers extracted before the
/// rejection travel with it.
pub fn classify(
    body: &[u8],
    event_type_override: Option<&str>,
) -> Result<Classification, InvalidEvent> {
    if body.is_empty() {
        return Err(ValidationError::EmptyBody.into());
    }
    let payload: Value = serde_json::from_slice(body)
        .map_err(|err| InvalidEvent::from(ValidationError::MalformedBody(err.to_string())))?;
    let mut warnings = Vec::new();

    let event_type = match event_type_override {
        Some(value) => Some(RunEventType::parse(value)),
        None => lookup_str(&payload, &EVENT_TYPE_PATH).ok().map(RunEventType::parse),
    };
    let run_id = lookup_str(&payload, &RUN_ID_PATH).ok().filter(|value| !value.is_empty());
    let job_name = lookup_str(&payload, &JOB_NAME_PATH).ok().filter(|value| !value.is_empty());
    let operation_class = match extract_operation_class(&payload) {
        Ok(class_name) => Some(class_name.to_string()),
        Err(hop) => {
            warnings.push(ExtractionWarning::new("operation_class", hop.to_string()));
            None
        }
    };

    let (Some(run_id), Some(job_name)) = (run_id, job_name) else {
        return Err(InvalidEvent {
            error: ValidationError::MissingRequiredFields {
                run_id_missing: run_id.is_none(),
                job_name_missing: job_name.is_none(),
            },
            run_id: run_id.map(RunId::new),
            job_name: job_name.map(JobName::new),
            warnings,
        });
    };
    let run_id = RunId::new(run_id);
    let job_name = JobName::new(job_name);

    let decision = if event_type != Some(RunEventType::Complete) {
        Decision::Rejected(RejectedEvent {
            run_id,
            job_name,
            reason: RejectReason::EventType {
                observed: event_type,
            },
        })
    } else {
        match operation_class {
            Some(class_name) if is_schema_mutating(&class_name) => {
                Decision::Relevant(RelevantEvent {
                    run_id,
                    job_name,
                    operation_class: class_name,
                    event_type: RunEventType::Complete,
                })
            }
            observed => Decision::Rejected(RejectedEvent {
                run_id,
                job_name,
                reason: RejectReason::OperationClass {
                    observed,
                },
            }),
        }
    };
    Ok(Classification {
        decision,
        warnings,
    })
}

/// Extracts `run.facets[<logical plan>].plan[0]["@class"]`.
///
/// The first facet key present is the only one consulted.
fn extract_operation_class(payload: &Value) -> Result<&str, MissingHop> {
    let facets = lookup(payload, &[Key("run"), Key("facets")])?;
    let Some(facet) = LOGICAL_PLAN_FACETS.into_iter().find(|facet| facets.get(*facet).is_some())
    else {
        let candidates: Vec<String> =
            LOGICAL_PLAN_FACETS.iter().map(|facet| format!("\"{facet}\"")).collect();
        return Err(MissingHop {
            path: format!("$[\"run\"][\"facets\"][{}]", candidates.join(" | ")),
            found: "absent",
        });
    };
    lookup_str(facets, &[Key(facet), Key("plan"), Index(0), Key("@class")]).map_err(|hop| {
        MissingHop {
            path: format!("$[\"run\"][\"facets\"]{}", hop.path.trim_start_matches('$')),
            found: hop.found,
        }
    })
}
