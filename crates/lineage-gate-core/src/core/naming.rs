// crates/lineage-gate-core/src/core/naming.rs
// ============================================================================
// Module: Artifact Naming
// Description: Notebook name normalization and deterministic artifact keys.
// Purpose: Make archived payloads locatable from run id, job name, and capture time.
// Dependencies: crate::core::identifiers, serde, time
// ============================================================================

//! ## Overview
//! Archived payloads are addressed by `{runId}_{jobName}_{timestamp}` where the
//! job name is normalized (text before the first `.`) and the timestamp is the
//! UTC capture instant rendered as `YYYYMMDDHHMMSS`. The key has second
//! resolution and no uniqueness component: two captures of the same run and
//! job within one second derive the same key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use time::OffsetDateTime;
use time::UtcOffset;

use crate::core::identifiers::JobName;
use crate::core::identifiers::RecordKey;
use crate::core::identifiers::RunId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File extension applied to archived artifacts.
const ARTIFACT_EXTENSION: &str = ".json";

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Returns the job name truncated before its first `.`, or unchanged.
#[must_use]
pub fn normalize_notebook_name(name: &str) -> JobName {
    let normalized = name.split_once('.').map_or(name, |(head, _)| head);
    JobName::new(normalized)
}

// ============================================================================
// SECTION: Capture Timestamp
// ============================================================================

/// UTC capture instant with second-resolution rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTimestamp(OffsetDateTime);

impl CaptureTimestamp {
    /// Wraps an instant, converting it to UTC.
    #[must_use]
    pub fn new(instant: OffsetDateTime) -> Self {
        Self(instant.to_offset(UtcOffset::UTC))
    }

    /// Returns the wrapped UTC instant.
    #[must_use]
    pub const fn instant(&self) -> OffsetDateTime {
        self.0
    }
}

impl fmt::Display for CaptureTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let instant = self.0;
        write!(
            f,
            "{:04}{:02}{:02}{:02}{:02}{:02}",
            instant.year(),
            u8::from(instant.month()),
            instant.day(),
            instant.hour(),
            instant.minute(),
            instant.second()
        )
    }
}

// ============================================================================
// SECTION: Artifact Name
// ============================================================================

/// Key and file name derived for one archived artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactName {
    /// Composite key shared by the artifact and its tracking record.
    pub record_key: RecordKey,
    /// Object name of the archived artifact (`{key}.json`).
    pub file_name: String,
}

impl ArtifactName {
    /// Derives the artifact key and file name.
    ///
    /// `job_name` is expected to be normalized already.
    #[must_use]
    pub fn derive(run_id: &RunId, job_name: &JobName, captured_at: CaptureTimestamp) -> Self {
        let record_key = RecordKey::new(format!("{run_id}_{job_name}_{captured_at}"));
        let file_name = format!("{record_key}{ARTIFACT_EXTENSION}");
        Self {
            record_key,
            file_name,
        }
    }
}

// ============================================================================
// SECTION: Object Location
// ============================================================================

/// Container-qualified location of an archived artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectLocation {
    /// Container (bucket) name.
    pub container: String,
    /// Object name within the container.
    pub name: String,
}

impl ObjectLocation {
    /// Creates a new object location.
    #[must_use]
    pub fn new(container: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.name)
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

    use time::macros::datetime;

    use super::ArtifactName;
    use super::CaptureTimestamp;
    use super::normalize_notebook_name;
    use crate::core::identifiers::RunId;

    #[test]
    fn normalize_strips_from_first_dot() {
        assert_eq!(normalize_notebook_name("etl_job.py").as_str(), "etl_job");
        assert_eq!(normalize_notebook_name("a.b.c").as_str(), "a");
    }

    #[test]
    fn normalize_leaves_undotted_name() {
        assert_eq!(normalize_notebook_name("etl_job").as_str(), "etl_job");
    }

    #[test]
    fn normalize_leading_dot_yields_empty() {
        assert_eq!(normalize_notebook_name(".hidden").as_str(), "");
    }

    #[test]
    fn capture_timestamp_is_fixed_width_utc() {
        let stamp = CaptureTimestamp::new(datetime!(2024-03-05 07:08:09 +02:00));
        assert_eq!(stamp.to_string(), "20240305050809");
    }

    #[test]
    fn derive_builds_key_and_file_name() {
        let stamp = CaptureTimestamp::new(datetime!(2024-01-02 03:04:05 UTC));
        let name = ArtifactName::derive(
            &RunId::new("r1"),
            &normalize_notebook_name("etl_job.py"),
            stamp,
        );
        assert_eq!(name.record_key.as_str(), "r1_etl_job_20240102030405");
        assert_eq!(name.file_name, "r1_etl_job_20240102030405.json");
    }

    #[test]
    fn derive_ignores_sub_second_precision() {
        let first = CaptureTimestamp::new(datetime!(2024-01-02 03:04:05.001 UTC));
        let second = CaptureTimestamp::new(datetime!(2024-01-02 03:04:05.999 UTC));
        let run_id = RunId::new("r1");
        let job = normalize_notebook_name("job");
        assert_eq!(
            ArtifactName::derive(&run_id, &job, first),
            ArtifactName::derive(&run_id, &job, second)
        );
    }
}
