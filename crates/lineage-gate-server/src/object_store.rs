// crates/lineage-gate-server/src/object_store.rs
// ============================================================================
// Module: Object Store Archive
// Description: S3-compatible archive sink for raw lineage payloads.
// Purpose: Persist accepted payloads in durable object storage with strict
//          key validation.
// Dependencies: lineage-gate-core, lineage-gate-config, aws-sdk-s3, tokio
// ============================================================================

//! ## Overview
//! [`S3ArchiveSink`] implements [`ArchiveSink`] over an S3-compatible object
//! store. The location container is the bucket and the location name is the
//! object key. Bucket names and keys are validated before any network call;
//! the store itself is treated as untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::path::Component;
use std::path::Path;
use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use lineage_gate_config::S3ConnectionSettings;
use lineage_gate_core::ArchiveError;
use lineage_gate_core::ArchiveSink;
use lineage_gate_core::ObjectLocation;
use tokio::runtime::Handle;
use tokio::runtime::Runtime;
use tokio::runtime::RuntimeFlavor;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a single path segment on disk.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total relative path length on disk.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum S3 object key length in bytes.
const MAX_OBJECT_KEY_LENGTH: usize = 1024;
/// Provider name attached to connection-string credentials.
const CREDENTIALS_PROVIDER_NAME: &str = "lineage-gate-connection-string";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Object-store errors for archive storage.
#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    /// Invalid configuration or key input.
    #[error("object store invalid: {0}")]
    Invalid(String),
    /// Backend I/O failure.
    #[error("object store io error: {0}")]
    Io(String),
    /// Backend returned an error.
    #[error("object store backend error: {0}")]
    Backend(String),
}

impl From<ObjectStoreError> for ArchiveError {
    fn from(err: ObjectStoreError) -> Self {
        match err {
            ObjectStoreError::Invalid(message) => Self::Invalid(message),
            ObjectStoreError::Io(message) => Self::Io(message),
            ObjectStoreError::Backend(message) => Self::Backend(message),
        }
    }
}

// ============================================================================
// SECTION: Runtime Helpers
// ============================================================================

/// Blocks on an object-store future using a compatible runtime.
fn block_on_with_runtime<F, T>(runtime: &Runtime, future: F) -> Result<T, ObjectStoreError>
where
    F: Future<Output = Result<T, ObjectStoreError>> + Send + 'static,
    T: Send + 'static,
{
    if let Ok(handle) = Handle::try_current() {
        if matches!(handle.runtime_flavor(), RuntimeFlavor::MultiThread) {
            return tokio::task::block_in_place(|| handle.block_on(future));
        }
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        std::thread::spawn(move || {
            let result = Runtime::new()
                .map_err(|err| ObjectStoreError::Io(err.to_string()))
                .and_then(|runtime| runtime.block_on(future));
            let _ = tx.send(result);
        });
        return rx
            .recv()
            .unwrap_or_else(|_| Err(ObjectStoreError::Io("object store thread join failed".to_string())));
    }

    runtime.block_on(future)
}

// ============================================================================
// SECTION: Object Store Client
// ============================================================================

/// Minimal object-store client abstraction.
pub(crate) trait ObjectStoreClient: Send + Sync {
    /// Writes a single object to storage.
    fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ObjectStoreError>;
}

/// S3-backed object-store client.
struct S3ObjectStoreClient {
    /// Underlying S3 client.
    client: Client,
    /// Tokio runtime for blocking S3 operations.
    runtime: Option<Arc<Runtime>>,
}

impl Drop for S3ObjectStoreClient {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let _ = std::thread::spawn(move || drop(runtime));
        }
    }
}

impl S3ObjectStoreClient {
    /// Builds a new S3-backed client from connection-string settings.
    fn new(settings: &S3ConnectionSettings) -> Result<Self, ObjectStoreError> {
        let runtime = Runtime::new().map_err(|err| ObjectStoreError::Io(err.to_string()))?;
        let region = settings.region.clone();
        let endpoint = settings.endpoint.clone();
        let credentials = match (&settings.access_key_id, &settings.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Some(Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                CREDENTIALS_PROVIDER_NAME,
            )),
            _ => None,
        };
        let shared_config = block_on_with_runtime(&runtime, async move {
            let mut loader = aws_config::defaults(BehaviorVersion::latest());
            if let Some(region) = region {
                loader = loader.region(Region::new(region));
            }
            if let Some(endpoint) = endpoint {
                loader = loader.endpoint_url(endpoint);
            }
            if let Some(credentials) = credentials {
                loader = loader.credentials_provider(credentials);
            }
            Ok(loader.load().await)
        })?;
        let mut s3_builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if settings.force_path_style {
            s3_builder = s3_builder.force_path_style(true);
        }
        Ok(Self {
            client: Client::from_conf(s3_builder.build()),
            runtime: Some(Arc::new(runtime)),
        })
    }

    /// Returns the runtime or an error if shutdown.
    fn runtime(&self) -> Result<&Runtime, ObjectStoreError> {
        self.runtime
            .as_ref()
            .map(AsRef::as_ref)
            .ok_or_else(|| ObjectStoreError::Io("object store runtime closed".to_string()))
    }
}

impl ObjectStoreClient for S3ObjectStoreClient {
    fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        let bucket = bucket.to_string();
        let key = key.to_string();
        let content_type = content_type.to_string();
        let client = self.client.clone();
        block_on_with_runtime(self.runtime()?, async move {
            client
                .put_object()
                .bucket(bucket)
                .key(key)
                .content_type(content_type)
                .body(ByteStream::from(bytes))
                .send()
                .await
                .map_err(|err| ObjectStoreError::Backend(err.to_string()))?;
            Ok(())
        })
    }
}

// ============================================================================
// SECTION: Archive Sink
// ============================================================================

/// Archive sink writing payloads to an S3-compatible object store.
pub struct S3ArchiveSink {
    /// Object-store client implementation.
    client: Arc<dyn ObjectStoreClient>,
}

impl S3ArchiveSink {
    /// Creates a sink from parsed connection-string settings.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError`] when the client cannot be initialized.
    pub fn new(settings: &S3ConnectionSettings) -> Result<Self, ObjectStoreError> {
        let client = S3ObjectStoreClient::new(settings)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Creates a sink over a custom object-store client (tests only).
    #[cfg(test)]
    pub(crate) fn from_client(client: Arc<dyn ObjectStoreClient>) -> Self {
        Self {
            client,
        }
    }
}

impl ArchiveSink for S3ArchiveSink {
    fn put(
        &self,
        location: &ObjectLocation,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), ArchiveError> {
        validate_segment(&location.container)?;
        validate_object_key(&location.name)?;
        // The client takes ownership so the upload future can be 'static.
        self.client.put(&location.container, &location.name, bytes.to_vec(), content_type)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Key Validation
// ============================================================================

/// Validates an object name for on-disk storage under a container directory.
pub(crate) fn validate_relative_path(path: &str) -> Result<(), ObjectStoreError> {
    validate_key_shape(path, MAX_TOTAL_PATH_LENGTH, Some(MAX_PATH_COMPONENT_LENGTH))
}

/// Validates an S3 object key. Only the total key length is bounded.
pub(crate) fn validate_object_key(key: &str) -> Result<(), ObjectStoreError> {
    validate_key_shape(key, MAX_OBJECT_KEY_LENGTH, None)
}

/// Rejects empty, absolute, and traversing keys plus over-length input.
fn validate_key_shape(
    path: &str,
    max_total: usize,
    max_segment: Option<usize>,
) -> Result<(), ObjectStoreError> {
    if path.is_empty() {
        return Err(ObjectStoreError::Invalid("path must be set".to_string()));
    }
    if path.contains('\\') {
        return Err(ObjectStoreError::Invalid("path must not contain backslashes".to_string()));
    }
    if path.len() > max_total {
        return Err(ObjectStoreError::Invalid("path exceeds length limit".to_string()));
    }
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        return Err(ObjectStoreError::Invalid("path must be relative".to_string()));
    }
    for component in candidate.components() {
        match component {
            Component::Normal(value)
                if max_segment.is_some_and(|limit| value.len() > limit) =>
            {
                return Err(ObjectStoreError::Invalid("segment exceeds length limit".to_string()));
            }
            Component::Normal(_) => {}
            _ => {
                return Err(ObjectStoreError::Invalid(
                    "path must be relative without traversal".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Validates a single path segment or container name.
pub(crate) fn validate_segment(value: &str) -> Result<(), ObjectStoreError> {
    if value.is_empty() || value == "." || value == ".." {
        return Err(ObjectStoreError::Invalid("segment is invalid".to_string()));
    }
    if value.len() > MAX_PATH_COMPONENT_LENGTH {
        return Err(ObjectStoreError::Invalid("segment exceeds length limit".to_string()));
    }
    if value.contains(['/', '\\']) {
        return Err(ObjectStoreError::Invalid("segment contains invalid characters".to_string()));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
