// crates/lineage-gate-server/src/server.rs
// ============================================================================
// Module: Lineage Ingest Server
// Description: HTTP entry point for lineage event notifications.
// Purpose: Route GET/POST requests through the ingestion gateway.
// Dependencies: lineage-gate-core, lineage-gate-config, axum, tokio
// ============================================================================

//! ## Overview
//! [`LineageServer`] wires configuration into an [`IngestionGateway`] and
//! exposes it on one configured route for `GET` and `POST`. The optional
//! `eventType` query parameter overrides the payload's event type. Accepted
//! events answer `200` with a plain-text confirmation, filtered events answer
//! `200` with a skip notice, and failures answer with a JSON error body naming
//! the failure kind. Bodies over `max_body_bytes` are rejected with `413`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::Query;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use lineage_gate_config::ArchiveConfig;
use lineage_gate_config::ArchiveProvider;
use lineage_gate_config::CONNECTION_STRING_ENV_VAR;
use lineage_gate_config::CONTAINER_NAME_ENV_VAR;
use lineage_gate_config::LineageGateConfig;
use lineage_gate_config::S3ConnectionSettings;
use lineage_gate_config::ServerAuditConfig;
use lineage_gate_config::TrackingConfig;
use lineage_gate_config::TrackingStoreType;
use lineage_gate_core::ArchiveSink;
use lineage_gate_core::ArchiveTarget;
use lineage_gate_core::ExtractionWarning;
use lineage_gate_core::InMemoryTrackingStore;
use lineage_gate_core::IngestError;
use lineage_gate_core::IngestFailure;
use lineage_gate_core::IngestOutcome;
use lineage_gate_core::IngestReport;
use lineage_gate_core::IngestRequest;
use lineage_gate_core::IngestionGateway;
use lineage_gate_core::InsertOutcome;
use lineage_gate_core::SystemClock;
use lineage_gate_core::TrackingStore;
use lineage_gate_core::ValidationError;
use lineage_gate_store_sqlite::SqliteTrackingStore;
use serde::Deserialize;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::runtime::RuntimeFlavor;

use crate::archive_file::FilesystemArchiveSink;
use crate::audit::AuditSink;
use crate::audit::ExtractionWarningEvent;
use crate::audit::FileAuditSink;
use crate::audit::IngestAuditEvent;
use crate::audit::IngestAuditEventParams;
use crate::audit::IngestAuditOutcome;
use crate::audit::NoopAuditSink;
use crate::audit::StderrAuditSink;
use crate::object_store::S3ArchiveSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Response body for an archived and tracked event.
pub const UPLOADED_MESSAGE: &str = "File uploaded successfully.";
/// Response body for a filtered event.
pub const SKIPPED_MESSAGE: &str = "Event Type is not COMPLETE or ClassName not matched.";

// ============================================================================
// SECTION: Server
// ============================================================================

/// Lineage ingest server instance.
pub struct LineageServer {
    /// Listen address.
    bind: SocketAddr,
    /// Ingest route path.
    route: String,
    /// Shared handler state.
    state: Arc<ServerState>,
}

impl LineageServer {
    /// Builds a server from configuration.
    ///
    /// A missing archive configuration is not fatal: the server starts, warns
    /// once, and answers `500` for every relevant event.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration is invalid or a store cannot
    /// be initialized.
    pub fn from_config(mut config: LineageGateConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let bind = config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let audit = build_audit_sink(&config.server.audit)?;
        let archive = build_archive_target(&config.archive)?;
        if archive.is_none() {
            emit_missing_archive_warning();
        }
        let tracking = build_tracking_store(&config.tracking)?;
        let gateway = IngestionGateway::new(
            archive,
            tracking,
            Arc::new(SystemClock),
            config.gateway_settings(),
        );
        Ok(Self {
            bind,
            route: config.server.route,
            state: Arc::new(ServerState::new(gateway, audit, config.server.max_body_bytes)),
        })
    }

    /// Returns the configured listen address.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind
    }

    /// Returns true when archive storage is configured.
    #[must_use]
    pub fn has_archive(&self) -> bool {
        self.state.gateway.has_archive()
    }

    /// Returns the axum router for this server.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(&self.route, Arc::clone(&self.state))
    }

    /// Serves requests until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(self.bind)
            .await
            .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
        axum::serve(listener, app)
            .await
            .map_err(|_| ServerError::Transport("http server failed".to_string()))
    }
}

/// Shared state for the ingest handler.
pub struct ServerState {
    /// Ingestion gateway.
    gateway: IngestionGateway,
    /// Audit sink for request and warning events.
    audit: Arc<dyn AuditSink>,
    /// Maximum accepted request body size.
    max_body_bytes: usize,
}

impl ServerState {
    /// Creates handler state.
    #[must_use]
    pub fn new(
        gateway: IngestionGateway,
        audit: Arc<dyn AuditSink>,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            gateway,
            audit,
            max_body_bytes,
        }
    }
}

/// Builds the ingest router for `route`.
///
/// # Panics
///
/// Panics when `route` is not a literal absolute path; configuration
/// validation rejects such routes before this is reached.
#[must_use]
pub fn build_router(route: &str, state: Arc<ServerState>) -> Router {
    let limit = state.max_body_bytes;
    Router::new()
        .route(route, get(handle_ingest).post(handle_ingest))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

// ============================================================================
// SECTION: Store Wiring
// ============================================================================

/// Builds the audit sink selected by configuration.
fn build_audit_sink(config: &ServerAuditConfig) -> Result<Arc<dyn AuditSink>, ServerError> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match config.path.as_deref() {
        Some(path) => {
            let sink = FileAuditSink::new(std::path::Path::new(path))
                .map_err(|err| ServerError::Init(format!("audit log: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

/// Builds the archive target, or `None` when storage is not configured.
fn build_archive_target(config: &ArchiveConfig) -> Result<Option<ArchiveTarget>, ServerError> {
    let Some(resolved) = config.resolved() else {
        return Ok(None);
    };
    let sink: Arc<dyn ArchiveSink> = match resolved.provider {
        ArchiveProvider::S3 => {
            let settings = S3ConnectionSettings::parse(resolved.connection_string)
                .map_err(|err| ServerError::Config(err.to_string()))?;
            Arc::new(S3ArchiveSink::new(&settings).map_err(|err| ServerError::Init(err.to_string()))?)
        }
        ArchiveProvider::Filesystem => Arc::new(
            FilesystemArchiveSink::new(resolved.connection_string)
                .map_err(|err| ServerError::Init(err.to_string()))?,
        ),
    };
    Ok(Some(ArchiveTarget::new(resolved.container, sink)))
}

/// Builds the tracking store selected by configuration.
fn build_tracking_store(config: &TrackingConfig) -> Result<Arc<dyn TrackingStore>, ServerError> {
    match config.store {
        TrackingStoreType::Memory => Ok(Arc::new(InMemoryTrackingStore::new())),
        TrackingStoreType::Sqlite => {
            let sqlite_config = config.sqlite_config().ok_or_else(|| {
                ServerError::Config("sqlite tracking store requires path".to_string())
            })?;
            let store = SqliteTrackingStore::new(sqlite_config)
                .map_err(|err| ServerError::Init(err.to_string()))?;
            Ok(Arc::new(store))
        }
    }
}

/// Warns once at startup that relevant events will fail.
fn emit_missing_archive_warning() {
    let _ = writeln!(
        std::io::stderr(),
        "lineage-gate: WARNING: archive storage is not configured; set \
         {CONNECTION_STRING_ENV_VAR} and {CONTAINER_NAME_ENV_VAR} (or [archive] in the config \
         file). Relevant events will be answered with 500."
    );
}

// ============================================================================
// SECTION: Request Handling
// ============================================================================

/// Query parameters accepted by the ingest route.
#[derive(Debug, Default, Deserialize)]
struct IngestQuery {
    /// Event type override.
    #[serde(rename = "eventType")]
    event_type: Option<String>,
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Stable error kind label.
    error: &'static str,
    /// Human-readable message.
    message: String,
    /// Archived payload location left without a tracking record.
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

/// Handles one lineage notification.
async fn handle_ingest(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<IngestQuery>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let bytes = match body {
        Ok(bytes) => bytes,
        Err(rejection) => return reject_body(&state, &rejection),
    };
    if bytes.len() > state.max_body_bytes {
        return payload_too_large(&state, bytes.len());
    }
    let request = IngestRequest {
        body: bytes.as_ref(),
        event_type_override: query.event_type.as_deref(),
    };
    let (response, params, warnings) = match ingest_with_blocking(&state.gateway, request) {
        Ok(report) => report_response(report, bytes.len()),
        Err(failure) => error_response(failure, bytes.len()),
    };
    for warning in &warnings {
        state.audit.record_warning(&ExtractionWarningEvent::new(params.run_id.clone(), warning));
    }
    state.audit.record(&IngestAuditEvent::new(params));
    response
}

/// Runs the gateway, shifting to a blocking context when available.
fn ingest_with_blocking(
    gateway: &IngestionGateway,
    request: IngestRequest<'_>,
) -> Result<IngestReport, IngestFailure> {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| gateway.ingest(request))
        }
        _ => gateway.ingest(request),
    }
}

/// Maps a successful report to a response and audit params.
fn report_response(
    report: IngestReport,
    request_bytes: usize,
) -> (Response, IngestAuditEventParams, Vec<ExtractionWarning>) {
    let IngestReport {
        outcome,
        warnings,
    } = report;
    match outcome {
        IngestOutcome::Stored(stored) => {
            let mut params =
                IngestAuditEventParams::new(IngestAuditOutcome::Stored, 200, request_bytes);
            params.run_id = Some(stored.event.run_id.to_string());
            params.job_name = Some(stored.event.job_name.to_string());
            params.operation_class = Some(stored.event.operation_class.clone());
            params.record_key = Some(stored.record.record_key.to_string());
            params.file_path = Some(stored.location.to_string());
            params.tracking_duplicate = Some(stored.insert == InsertOutcome::AlreadyPresent);
            ((StatusCode::OK, UPLOADED_MESSAGE).into_response(), params, warnings)
        }
        IngestOutcome::Skipped(rejected) => {
            let mut params =
                IngestAuditEventParams::new(IngestAuditOutcome::Skipped, 200, request_bytes);
            params.run_id = Some(rejected.run_id.to_string());
            params.job_name = Some(rejected.job_name.to_string());
            params.skip_reason = Some(rejected.reason.to_string());
            ((StatusCode::OK, SKIPPED_MESSAGE).into_response(), params, warnings)
        }
    }
}

/// Maps a gateway failure to a response and audit params.
fn error_response(
    failure: IngestFailure,
    request_bytes: usize,
) -> (Response, IngestAuditEventParams, Vec<ExtractionWarning>) {
    let IngestFailure {
        error: err,
        context,
        warnings,
    } = failure;
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let location = match &err {
        IngestError::Tracking {
            location, ..
        } => Some(location.to_string()),
        _ => None,
    };
    let message = match &err {
        IngestError::Input(validation) => input_message(validation).to_string(),
        other => other.to_string(),
    };
    let mut params =
        IngestAuditEventParams::new(IngestAuditOutcome::Error, status.as_u16(), request_bytes);
    params.error_kind = Some(err.kind());
    params.error_message = Some(err.to_string());
    params.run_id = context.run_id.map(|run_id| run_id.to_string());
    params.job_name = context.job_name.map(|job_name| job_name.to_string());
    params.operation_class = context.operation_class;
    params.record_key = context.record_key.map(|record_key| record_key.to_string());
    params.file_path = context.location.map(|location| location.to_string());
    let body = ErrorBody {
        error: err.kind(),
        message,
        location,
    };
    ((status, Json(body)).into_response(), params, warnings)
}

/// Client-facing message for an input error.
const fn input_message(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::EmptyBody => "Request body is empty.",
        ValidationError::MalformedBody(_) => "Invalid JSON format.",
        ValidationError::MissingRequiredFields {
            ..
        } => "Missing required fields: runId or job.name.",
    }
}

/// Responds to a body the transport layer refused to read.
fn reject_body(state: &ServerState, rejection: &BytesRejection) -> Response {
    let status = rejection.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return payload_too_large(state, 0);
    }
    let message = rejection.body_text();
    let mut params = IngestAuditEventParams::new(IngestAuditOutcome::Error, status.as_u16(), 0);
    params.error_kind = Some("invalid_input");
    params.error_message = Some(message.clone());
    state.audit.record(&IngestAuditEvent::new(params));
    let body = ErrorBody {
        error: "invalid_input",
        message,
        location: None,
    };
    (status, Json(body)).into_response()
}

/// Responds to a body over the configured size limit.
fn payload_too_large(state: &ServerState, request_bytes: usize) -> Response {
    let mut params = IngestAuditEventParams::new(
        IngestAuditOutcome::Error,
        StatusCode::PAYLOAD_TOO_LARGE.as_u16(),
        request_bytes,
    );
    params.error_kind = Some("payload_too_large");
    state.audit.record(&IngestAuditEvent::new(params));
    let body = ErrorBody {
        error: "payload_too_large",
        message: format!("Request body exceeds {} bytes.", state.max_body_bytes),
        location: None,
    };
    (StatusCode::PAYLOAD_TOO_LARGE, Json(body)).into_response()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Lineage server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
