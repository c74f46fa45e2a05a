// crates/lineage-gate-server/src/archive_file.rs
// ============================================================================
// Module: Filesystem Archive
// Description: Directory-backed archive sink for raw lineage payloads.
// Purpose: Support local runs and tests without an object store.
// Dependencies: lineage-gate-core
// ============================================================================

//! ## Overview
//! [`FilesystemArchiveSink`] writes each payload to `root/container/name`.
//! Container and object names pass the same validation as object-store keys,
//! and the resolved parent directory must stay under the root.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use lineage_gate_core::ArchiveError;
use lineage_gate_core::ArchiveSink;
use lineage_gate_core::ObjectLocation;

use crate::object_store::ObjectStoreError;
use crate::object_store::validate_relative_path;
use crate::object_store::validate_segment;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a single root path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total root path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Sink
// ============================================================================

/// Archive sink that stores payloads under a root directory.
#[derive(Debug, Clone)]
pub struct FilesystemArchiveSink {
    /// Root directory; containers are direct children.
    root: PathBuf,
}

impl FilesystemArchiveSink {
    /// Creates a sink rooted at `root`, creating the directory when missing.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError`] when the root path is invalid or cannot be
    /// created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ObjectStoreError> {
        let root = root.into();
        validate_root(&root)?;
        fs::create_dir_all(&root).map_err(|err| ObjectStoreError::Io(err.to_string()))?;
        Ok(Self {
            root,
        })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves the on-disk path for a location, creating parent directories.
    fn resolve(&self, location: &ObjectLocation) -> Result<PathBuf, ObjectStoreError> {
        validate_segment(&location.container)?;
        validate_relative_path(&location.name)?;
        let root = self
            .root
            .canonicalize()
            .map_err(|_| ObjectStoreError::Io("unable to resolve archive root".to_string()))?;
        let joined = root.join(&location.container).join(&location.name);
        let parent = joined
            .parent()
            .ok_or_else(|| ObjectStoreError::Invalid("archive path missing parent".to_string()))?;
        fs::create_dir_all(parent).map_err(|err| ObjectStoreError::Io(err.to_string()))?;
        let parent = parent
            .canonicalize()
            .map_err(|_| ObjectStoreError::Io("unable to resolve archive path".to_string()))?;
        if !parent.starts_with(&root) {
            return Err(ObjectStoreError::Invalid("archive path escapes root".to_string()));
        }
        let file_name = joined
            .file_name()
            .ok_or_else(|| ObjectStoreError::Invalid("archive path missing filename".to_string()))?;
        Ok(parent.join(file_name))
    }
}

impl ArchiveSink for FilesystemArchiveSink {
    fn put(
        &self,
        location: &ObjectLocation,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<(), ArchiveError> {
        let path = self.resolve(location)?;
        fs::write(&path, bytes).map_err(|err| ArchiveError::Io(err.to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates the root directory path against length constraints.
fn validate_root(path: &Path) -> Result<(), ObjectStoreError> {
    if path.as_os_str().is_empty() {
        return Err(ObjectStoreError::Invalid("archive root must be set".to_string()));
    }
    if path.to_string_lossy().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ObjectStoreError::Invalid("archive root exceeds length limit".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ObjectStoreError::Invalid("archive root component too long".to_string()));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use std::fs;

    use lineage_gate_core::ArchiveError;
    use lineage_gate_core::ArchiveSink;
    use lineage_gate_core::JSON_CONTENT_TYPE;
    use lineage_gate_core::ObjectLocation;
    use tempfile::TempDir;

    use super::FilesystemArchiveSink;

    #[test]
    fn put_writes_under_container_directory() {
        let temp = TempDir::new().unwrap();
        let sink = FilesystemArchiveSink::new(temp.path().join("archive")).unwrap();
        let location = ObjectLocation::new("lineage", "r1_etl_job_20240102030405.json");
        sink.put(&location, b"{\"eventType\":\"COMPLETE\"}", JSON_CONTENT_TYPE).unwrap();

        let written =
            fs::read(temp.path().join("archive/lineage/r1_etl_job_20240102030405.json")).unwrap();
        assert_eq!(written, b"{\"eventType\":\"COMPLETE\"}");
    }

    #[test]
    fn put_overwrites_same_name() {
        let temp = TempDir::new().unwrap();
        let sink = FilesystemArchiveSink::new(temp.path()).unwrap();
        let location = ObjectLocation::new("lineage", "k.json");
        sink.put(&location, b"first", JSON_CONTENT_TYPE).unwrap();
        sink.put(&location, b"second", JSON_CONTENT_TYPE).unwrap();
        assert_eq!(fs::read(temp.path().join("lineage/k.json")).unwrap(), b"second");
    }

    #[test]
    fn put_rejects_traversal() {
        let temp = TempDir::new().unwrap();
        let sink = FilesystemArchiveSink::new(temp.path().join("archive")).unwrap();
        let err = sink
            .put(&ObjectLocation::new("lineage", "../../escape.json"), b"{}", JSON_CONTENT_TYPE)
            .unwrap_err();
        assert!(matches!(err, ArchiveError::Invalid(_)));
        assert!(!temp.path().join("escape.json").exists());
    }

    #[test]
    fn new_creates_missing_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("nested/archive");
        let sink = FilesystemArchiveSink::new(&root).unwrap();
        assert_eq!(sink.root(), root.as_path());
        assert!(sink.root().is_dir());
    }

    #[test]
    fn put_rejects_segment_over_filesystem_limit() {
        let temp = TempDir::new().unwrap();
        let sink = FilesystemArchiveSink::new(temp.path()).unwrap();
        let location = ObjectLocation::new("lineage", format!("{}.json", "n".repeat(260)));
        let err = sink.put(&location, b"{}", JSON_CONTENT_TYPE).unwrap_err();
        assert!(matches!(err, ArchiveError::Invalid(_)));
    }

    #[test]
    fn new_rejects_empty_root() {
        assert!(FilesystemArchiveSink::new("").is_err());
    }
}
