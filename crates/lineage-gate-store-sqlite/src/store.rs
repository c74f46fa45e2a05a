// crates/lineage-gate-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Tracking Store
// Description: Durable TrackingStore backed by SQLite.
// Purpose: Persist tracking records for the downstream lineage consumer.
// Dependencies: lineage-gate-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`TrackingStore`] using `SQLite`. Each
//! accepted lineage event inserts one row into `tracking_records`, keyed by
//! its record key. A repeated key leaves the existing row untouched and is
//! reported as [`InsertOutcome::AlreadyPresent`]. Rows read back are
//! validated and fail closed on unknown status labels or out-of-range counts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use lineage_gate_core::InsertOutcome;
use lineage_gate_core::QualifierName;
use lineage_gate_core::RecordKey;
use lineage_gate_core::TrackingRecord;
use lineage_gate_core::TrackingStatus;
use lineage_gate_core::TrackingStore;
use lineage_gate_core::TrackingStoreError;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode.
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` tracking store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Returns a config for `path` with default pragmas.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for TrackingStoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) | SqliteStoreError::VersionMismatch(message) => {
                Self::Store(message)
            }
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed tracking record store.
#[derive(Clone)]
pub struct SqliteTrackingStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared `SQLite` connection.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteTrackingStore {
    /// Opens an `SQLite`-backed tracking store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the database path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Verifies the store can execute a simple SQL statement.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the mutex is poisoned or the query fails.
    pub fn readiness(&self) -> Result<(), SqliteStoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite mutex poisoned".to_string()))?;
        guard
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Lists records in a given status, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails or a row is invalid.
    pub fn list_by_status(
        &self,
        status: TrackingStatus,
        limit: usize,
    ) -> Result<Vec<TrackingRecord>, SqliteStoreError> {
        let limit = i64::try_from(limit)
            .map_err(|_| SqliteStoreError::Invalid("list limit too large".to_string()))?;
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite mutex poisoned".to_string()))?;
        let mut statement = guard
            .prepare(
                "SELECT record_key, qualifier_name, status, retry_count, is_archived, file_path
                 FROM tracking_records WHERE status = ?1
                 ORDER BY created_at ASC, record_key ASC LIMIT ?2",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![status.as_str(), limit], map_tracking_row)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut records = Vec::new();
        for row in rows {
            let row = row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            records.push(row.into_record()?);
        }
        Ok(records)
    }

    /// Inserts a record, leaving any existing row with the same key untouched.
    fn insert_record(&self, record: &TrackingRecord) -> Result<InsertOutcome, SqliteStoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite mutex poisoned".to_string()))?;
        let changed = guard
            .execute(
                "INSERT INTO tracking_records (
                    record_key, qualifier_name, status, retry_count, is_archived, file_path,
                    created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(record_key) DO NOTHING",
                params![
                    record.record_key.as_str(),
                    record.qualifier_name.as_str(),
                    record.status.as_str(),
                    i64::from(record.retry_count),
                    record.is_archived,
                    record.file_path,
                    unix_millis(),
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        if changed == 0 { Ok(InsertOutcome::AlreadyPresent) } else { Ok(InsertOutcome::Inserted) }
    }

    /// Loads one record by key.
    fn load_record(&self, record_key: &RecordKey) -> Result<Option<TrackingRecord>, SqliteStoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite mutex poisoned".to_string()))?;
        let row = guard
            .query_row(
                "SELECT record_key, qualifier_name, status, retry_count, is_archived, file_path
                 FROM tracking_records WHERE record_key = ?1",
                params![record_key.as_str()],
                map_tracking_row,
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        row.map(TrackingRow::into_record).transpose()
    }
}

impl TrackingStore for SqliteTrackingStore {
    fn insert(&self, record: &TrackingRecord) -> Result<InsertOutcome, TrackingStoreError> {
        self.insert_record(record).map_err(TrackingStoreError::from)
    }

    fn get(&self, record_key: &RecordKey) -> Result<Option<TrackingRecord>, TrackingStoreError> {
        self.load_record(record_key).map_err(TrackingStoreError::from)
    }
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Raw tracking row as stored.
struct TrackingRow {
    /// Record key column.
    record_key: String,
    /// Qualifier column.
    qualifier_name: String,
    /// Status label column.
    status: String,
    /// Retry budget column.
    retry_count: i64,
    /// Archived flag column.
    is_archived: bool,
    /// Artifact locator column.
    file_path: String,
}

impl TrackingRow {
    /// Validates the row and converts it into a [`TrackingRecord`].
    fn into_record(self) -> Result<TrackingRecord, SqliteStoreError> {
        let status = TrackingStatus::parse(&self.status).ok_or_else(|| {
            SqliteStoreError::Invalid(format!("unknown tracking status: {}", self.status))
        })?;
        let retry_count = u32::try_from(self.retry_count).map_err(|_| {
            SqliteStoreError::Invalid(format!("retry_count out of range: {}", self.retry_count))
        })?;
        Ok(TrackingRecord {
            qualifier_name: QualifierName::new(self.qualifier_name),
            record_key: RecordKey::new(self.record_key),
            status,
            retry_count,
            is_archived: self.is_archived,
            file_path: self.file_path,
        })
    }
}

/// Maps a `SELECT` row into a [`TrackingRow`].
fn map_tracking_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TrackingRow> {
    Ok(TrackingRow {
        record_key: row.get(0)?,
        qualifier_name: row.get(1)?,
        status: row.get(2)?,
        retry_count: row.get(3)?,
        is_archived: row.get(4)?,
        file_path: row.get(5)?,
    })
}

// ============================================================================
// SECTION: Connection Setup
// ============================================================================

/// Creates the parent directory for the database file.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    if path.display().to_string().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with the configured pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS tracking_records (
                    record_key TEXT NOT NULL PRIMARY KEY,
                    qualifier_name TEXT NOT NULL,
                    status TEXT NOT NULL,
                    retry_count INTEGER NOT NULL,
                    is_archived INTEGER NOT NULL,
                    file_path TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_tracking_records_status
                    ON tracking_records (status, created_at);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
