// crates/lineage-gate-server/src/audit.rs
// ============================================================================
// Module: Ingest Audit Logging
// Description: Structured audit events for lineage ingestion requests.
// Purpose: Emit JSON-line request and extraction-warning events.
// Dependencies: lineage-gate-core, serde
// ============================================================================

//! ## Overview
//! Audit events are plain serializable structs written as JSON lines through
//! an [`AuditSink`]. One `lineage_ingest` event is emitted per request and one
//! `extraction_warning` event per advisory warning. Payload bytes are never
//! logged; only identifiers, sizes, and outcome labels.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use lineage_gate_core::ExtractionWarning;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Request outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestAuditOutcome {
    /// Payload archived and tracked.
    Stored,
    /// Event filtered out.
    Skipped,
    /// Request rejected or failed.
    Error,
}

/// Per-request audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct IngestAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request outcome.
    pub outcome: IngestAuditOutcome,
    /// HTTP status returned.
    pub status: u16,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Error message when the request failed.
    pub error_message: Option<String>,
    /// Run identifier when extracted.
    pub run_id: Option<String>,
    /// Job name as emitted, when extracted.
    pub job_name: Option<String>,
    /// Operation class when relevant.
    pub operation_class: Option<String>,
    /// Skip reason when filtered.
    pub skip_reason: Option<String>,
    /// Derived record key when stored.
    pub record_key: Option<String>,
    /// Archived payload location (`container/name`).
    pub file_path: Option<String>,
    /// Whether the tracking store already held the key.
    pub tracking_duplicate: Option<bool>,
    /// Request body size in bytes.
    pub request_bytes: usize,
}

/// Inputs required to construct an ingest audit event.
#[derive(Debug, Clone)]
pub struct IngestAuditEventParams {
    /// Request outcome.
    pub outcome: IngestAuditOutcome,
    /// HTTP status returned.
    pub status: u16,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Error message when the request failed.
    pub error_message: Option<String>,
    /// Run identifier when extracted.
    pub run_id: Option<String>,
    /// Job name when extracted.
    pub job_name: Option<String>,
    /// Operation class when relevant.
    pub operation_class: Option<String>,
    /// Skip reason when filtered.
    pub skip_reason: Option<String>,
    /// Derived record key when stored.
    pub record_key: Option<String>,
    /// Archived payload location.
    pub file_path: Option<String>,
    /// Whether the tracking store already held the key.
    pub tracking_duplicate: Option<bool>,
    /// Request body size in bytes.
    pub request_bytes: usize,
}

impl IngestAuditEventParams {
    /// Creates params with only the outcome, status, and size populated.
    #[must_use]
    pub const fn new(outcome: IngestAuditOutcome, status: u16, request_bytes: usize) -> Self {
        Self {
            outcome,
            status,
            error_kind: None,
            error_message: None,
            run_id: None,
            job_name: None,
            operation_class: None,
            skip_reason: None,
            record_key: None,
            file_path: None,
            tracking_duplicate: None,
            request_bytes,
        }
    }
}

/// Advisory extraction warning event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionWarningEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Run identifier when extracted.
    pub run_id: Option<String>,
    /// Field that could not be extracted.
    pub field: &'static str,
    /// Extraction detail.
    pub detail: String,
}

impl IngestAuditEvent {
    /// Creates a new ingest audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: IngestAuditEventParams) -> Self {
        Self {
            event: "lineage_ingest",
            timestamp_ms: timestamp_ms(),
            outcome: params.outcome,
            status: params.status,
            error_kind: params.error_kind,
            error_message: params.error_message,
            run_id: params.run_id,
            job_name: params.job_name,
            operation_class: params.operation_class,
            skip_reason: params.skip_reason,
            record_key: params.record_key,
            file_path: params.file_path,
            tracking_duplicate: params.tracking_duplicate,
            request_bytes: params.request_bytes,
        }
    }
}

impl ExtractionWarningEvent {
    /// Creates a warning event for one extraction issue.
    #[must_use]
    pub fn new(run_id: Option<String>, warning: &ExtractionWarning) -> Self {
        Self {
            event: "extraction_warning",
            timestamp_ms: timestamp_ms(),
            run_id,
            field: warning.field,
            detail: warning.detail.clone(),
        }
    }
}

/// Milliseconds since the Unix epoch, zero if the clock is before it.
fn timestamp_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for ingestion events.
pub trait AuditSink: Send + Sync {
    /// Record a per-request event.
    fn record(&self, event: &IngestAuditEvent);

    /// Record an extraction warning.
    fn record_warning(&self, _event: &ExtractionWarningEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &IngestAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }

    fn record_warning(&self, event: &ExtractionWarningEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Writes one serialized line under the file lock.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &IngestAuditEvent) {
        self.append(event);
    }

    fn record_warning(&self, event: &ExtractionWarningEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &IngestAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
