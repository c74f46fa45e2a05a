// crates/lineage-gate-core/src/runtime/gateway.rs
// ============================================================================
// Module: Ingestion Gateway
// Description: Per-request orchestration of classify, name, archive, and track.
// Purpose: Turn one lineage notification into a stored or skipped outcome.
// Dependencies: crate::{core, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! [`IngestionGateway::ingest`] runs the full accept path for one request:
//! classify the payload, normalize the job name, derive the artifact key,
//! archive the raw bytes, then insert the tracking record. The gateway keeps
//! no state between requests and never retries; the first failure ends the
//! request. A tracking failure after a successful archive is reported with
//! the location of the already-written artifact so operators can reconcile it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::core::clock::Clock;
use crate::core::event::Classification;
use crate::core::event::Decision;
use crate::core::event::ExtractionWarning;
use crate::core::event::InvalidEvent;
use crate::core::event::RejectedEvent;
use crate::core::event::RelevantEvent;
use crate::core::event::ValidationError;
use crate::core::event::classify;
use crate::core::identifiers::JobName;
use crate::core::identifiers::RecordKey;
use crate::core::identifiers::RunId;
use crate::core::naming::ArtifactName;
use crate::core::naming::CaptureTimestamp;
use crate::core::naming::ObjectLocation;
use crate::core::naming::normalize_notebook_name;
use crate::core::tracking::QualifierRule;
use crate::core::tracking::TrackingDefaults;
use crate::core::tracking::TrackingRecord;
use crate::core::tracking::build_tracking_record;
use crate::interfaces::ArchiveError;
use crate::interfaces::ArchiveSink;
use crate::interfaces::InsertOutcome;
use crate::interfaces::JSON_CONTENT_TYPE;
use crate::interfaces::TrackingStore;
use crate::interfaces::TrackingStoreError;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Archive container paired with the sink that writes into it.
#[derive(Clone)]
pub struct ArchiveTarget {
    /// Container (bucket) receiving archived payloads.
    pub container: String,
    /// Object-store sink.
    pub sink: Arc<dyn ArchiveSink>,
}

impl ArchiveTarget {
    /// Creates a new archive target.
    #[must_use]
    pub fn new(container: impl Into<String>, sink: Arc<dyn ArchiveSink>) -> Self {
        Self {
            container: container.into(),
            sink,
        }
    }
}

/// Tracking-record settings applied by the gateway.
#[derive(Debug, Clone, Default)]
pub struct GatewaySettings {
    /// Initial retry budget and archived flag.
    pub tracking: TrackingDefaults,
    /// Qualifier derivation rule.
    pub qualifier: QualifierRule,
}

// ============================================================================
// SECTION: Requests and Outcomes
// ============================================================================

/// One inbound lineage notification.
#[derive(Debug, Clone, Copy)]
pub struct IngestRequest<'a> {
    /// Raw request body.
    pub body: &'a [u8],
    /// Query-supplied event type, if present.
    pub event_type_override: Option<&'a str>,
}

/// Artifacts produced for an accepted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredEvent {
    /// Classified event.
    pub event: RelevantEvent,
    /// Job name after normalization.
    pub normalized_job_name: JobName,
    /// Derived key and file name.
    pub artifact: ArtifactName,
    /// Location of the archived payload.
    pub location: ObjectLocation,
    /// Tracking record handed to the store.
    pub record: TrackingRecord,
    /// Whether the store wrote a new record.
    #[serde(skip)]
    pub insert: InsertOutcome,
}

/// Terminal outcome of a successful request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Payload archived and tracking record written.
    Stored(Box<StoredEvent>),
    /// Event filtered out; nothing written.
    Skipped(RejectedEvent),
}

/// Outcome plus advisory extraction warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Terminal outcome.
    pub outcome: IngestOutcome,
    /// Non-fatal extraction warnings.
    pub warnings: Vec<ExtractionWarning>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Request failures surfaced to the caller.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Empty, malformed, or incomplete input.
    #[error("invalid input: {0}")]
    Input(#[from] ValidationError),
    /// Archive storage is not configured.
    #[error("storage configuration missing: {0}")]
    Configuration(String),
    /// Archive write failed; nothing was persisted.
    #[error("archive write failed: {0}")]
    Archive(#[source] ArchiveError),
    /// Tracking write failed after the payload was archived.
    #[error("tracking write failed; artifact archived at {location}: {source}")]
    Tracking {
        /// Location of the archived payload left without a tracking record.
        location: ObjectLocation,
        /// Underlying store error.
        #[source]
        source: TrackingStoreError,
    },
}

impl IngestError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Input(_) => 400,
            Self::Configuration(_) | Self::Archive(_) | Self::Tracking { .. } => 500,
        }
    }

    /// Returns a stable label for logs and response bodies.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Input(_) => "invalid_input",
            Self::Configuration(_) => "configuration",
            Self::Archive(_) => "archive_write",
            Self::Tracking { .. } => "tracking_write",
        }
    }
}

/// Identifiers known at the point a request failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureContext {
    /// Run identifier, when extracted.
    pub run_id: Option<RunId>,
    /// Job name as emitted, when extracted.
    pub job_name: Option<JobName>,
    /// Allow-listed operation class, when classified relevant.
    pub operation_class: Option<String>,
    /// Derived tracking record key, when naming completed.
    pub record_key: Option<RecordKey>,
    /// Archive location, when naming completed.
    pub location: Option<ObjectLocation>,
}

impl FailureContext {
    /// Context for an event that passed classification.
    fn relevant(event: &RelevantEvent) -> Self {
        Self {
            run_id: Some(event.run_id.clone()),
            job_name: Some(event.job_name.clone()),
            operation_class: Some(event.operation_class.clone()),
            record_key: None,
            location: None,
        }
    }
}

/// Failed request: the error plus the context and warnings gathered so far.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct IngestFailure {
    /// Terminal error.
    pub error: IngestError,
    /// Identifiers extracted before the failure.
    pub context: FailureContext,
    /// Non-fatal extraction warnings collected before the failure.
    pub warnings: Vec<ExtractionWarning>,
}

impl IngestFailure {
    /// Creates a failure record.
    #[must_use]
    pub const fn new(
        error: IngestError,
        context: FailureContext,
        warnings: Vec<ExtractionWarning>,
    ) -> Self {
        Self {
            error,
            context,
            warnings,
        }
    }
}

impl From<InvalidEvent> for IngestFailure {
    fn from(invalid: InvalidEvent) -> Self {
        let InvalidEvent {
            error,
            run_id,
            job_name,
            warnings,
        } = invalid;
        let context = FailureContext {
            run_id,
            job_name,
            ..FailureContext::default()
        };
        Self::new(IngestError::Input(error), context, warnings)
    }
}

// ============================================================================
// SECTION: Gateway
// ============================================================================

/// Stateless ingestion gateway.
#[derive(Clone)]
pub struct IngestionGateway {
    /// Archive target; `None` when storage is not configured.
    archive: Option<ArchiveTarget>,
    /// Tracking record store.
    tracking: Arc<dyn TrackingStore>,
    /// Capture-time source.
    clock: Arc<dyn Clock>,
    /// Tracking-record settings.
    settings: GatewaySettings,
}

impl IngestionGateway {
    /// Creates a gateway over the given stores.
    #[must_use]
    pub fn new(
        archive: Option<ArchiveTarget>,
        tracking: Arc<dyn TrackingStore>,
        clock: Arc<dyn Clock>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            archive,
            tracking,
            clock,
            settings,
        }
    }

    /// Returns true when an archive target is configured.
    #[must_use]
    pub fn has_archive(&self) -> bool {
        self.archive.as_ref().is_some_and(|target| !target.container.trim().is_empty())
    }

    /// Processes one lineage notification.
    ///
    /// # Errors
    ///
    /// Returns [`IngestFailure`] when input is invalid, storage is
    /// unconfigured, or either storage write fails. The failure carries the
    /// identifiers and warnings gathered before the error.
    pub fn ingest(&self, request: IngestRequest<'_>) -> Result<IngestReport, IngestFailure> {
        let Classification {
            decision,
            mut warnings,
        } = classify(request.body, request.event_type_override)?;
        let event = match decision {
            Decision::Rejected(rejected) => {
                return Ok(IngestReport {
                    outcome: IngestOutcome::Skipped(rejected),
                    warnings,
                });
            }
            Decision::Relevant(event) => event,
        };
        let mut context = FailureContext::relevant(&event);

        let normalized_job_name = normalize_notebook_name(event.job_name.as_str());
        if normalized_job_name.as_str().is_empty() {
            warnings.push(ExtractionWarning::new(
                "job_name",
                format!("job name {} normalizes to an empty name", event.job_name),
            ));
        }
        let Some(archive) =
            self.archive.as_ref().filter(|target| !target.container.trim().is_empty())
        else {
            let error =
                IngestError::Configuration("archive container is not configured".to_string());
            return Err(IngestFailure::new(error, context, warnings));
        };

        let captured_at = CaptureTimestamp::new(self.clock.now_utc());
        let artifact = ArtifactName::derive(&event.run_id, &normalized_job_name, captured_at);
        let location = ObjectLocation::new(archive.container.clone(), artifact.file_name.clone());
        context.record_key = Some(artifact.record_key.clone());
        context.location = Some(location.clone());
        if let Err(err) = archive.sink.put(&location, request.body, JSON_CONTENT_TYPE) {
            return Err(IngestFailure::new(IngestError::Archive(err), context, warnings));
        }

        let record = build_tracking_record(
            artifact.record_key.clone(),
            self.settings.qualifier.qualify(&normalized_job_name),
            &location,
            self.settings.tracking,
        );
        let insert = match self.tracking.insert(&record) {
            Ok(insert) => insert,
            Err(source) => {
                let error = IngestError::Tracking {
                    location: location.clone(),
                    source,
                };
                return Err(IngestFailure::new(error, context, warnings));
            }
        };

        Ok(IngestReport {
            outcome: IngestOutcome::Stored(Box::new(StoredEvent {
                event,
                normalized_job_name,
                artifact,
                location,
                record,
                insert,
            })),
            warnings,
        })
    }
}
