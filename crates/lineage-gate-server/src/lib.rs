// crates/lineage-gate-server/src/lib.rs
// ============================================================================
// Module: Lineage Gate Server Library
// Description: HTTP transport, archive backends, and audit logging.
// Purpose: Expose the ingestion gateway over HTTP with durable storage.
// Dependencies: lineage-gate-core, lineage-gate-config, axum, aws-sdk-s3
// ============================================================================

//! ## Overview
//! This crate hosts the HTTP entry point for lineage notifications and the
//! storage backends it wires into the core gateway: an S3-compatible archive
//! sink, a filesystem archive sink, and JSON-line audit sinks. Tracking
//! records go to the in-memory store or `lineage-gate-store-sqlite`.

pub mod archive_file;
pub mod audit;
pub mod object_store;
pub mod server;

pub use archive_file::FilesystemArchiveSink;
pub use audit::AuditSink;
pub use audit::ExtractionWarningEvent;
pub use audit::FileAuditSink;
pub use audit::IngestAuditEvent;
pub use audit::IngestAuditEventParams;
pub use audit::IngestAuditOutcome;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use object_store::ObjectStoreError;
pub use object_store::S3ArchiveSink;
pub use server::LineageServer;
pub use server::SKIPPED_MESSAGE;
pub use server::ServerError;
pub use server::ServerState;
pub use server::UPLOADED_MESSAGE;
pub use server::build_router;
