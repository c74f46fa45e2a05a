// crates/lineage-gate-config/src/config.rs
// ============================================================================
// Module: Lineage Gate Configuration
// Description: Configuration loading, environment overlay, and validation.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: lineage-gate-core, lineage-gate-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! When no path is given and the default file is absent, built-in defaults
//! apply. The archive connection string and container may be supplied through
//! the `ConnectionString` and `ContainerName` environment values, which win
//! over the file. An archive left without either value is not an error here:
//! the gateway starts and answers accepted events with a configuration error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use lineage_gate_core::DEFAULT_IS_ARCHIVED;
use lineage_gate_core::DEFAULT_RETRY_COUNT;
use lineage_gate_core::GatewaySettings;
use lineage_gate_core::QualifierRule;
use lineage_gate_core::TrackingDefaults;
use lineage_gate_store_sqlite::SqliteStoreConfig;
use lineage_gate_store_sqlite::SqliteStoreMode;
use lineage_gate_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "lineage-gate.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "LINEAGE_GATE_CONFIG";
/// Environment value holding the archive connection string.
pub const CONNECTION_STRING_ENV_VAR: &str = "ConnectionString";
/// Environment value holding the archive container name.
pub const CONTAINER_NAME_ENV_VAR: &str = "ContainerName";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default bind address for the HTTP listener.
const DEFAULT_BIND: &str = "127.0.0.1:7071";
/// Default ingestion route.
const DEFAULT_ROUTE: &str = "/api/1/lineage";
/// Default maximum request body size in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;
/// Hard upper bound for `max_body_bytes`.
const MAX_BODY_BYTES_LIMIT: usize = 64 * 1024 * 1024;
/// Default `SQLite` busy timeout in milliseconds.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum container name length.
const MAX_CONTAINER_LENGTH: usize = 255;
/// Maximum qualifier prefix length.
const MAX_QUALIFIER_PREFIX_LENGTH: usize = 256;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Lineage gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineageGateConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Archive (object store) configuration.
    #[serde(default)]
    pub archive: ArchiveConfig,
    /// Tracking record store configuration.
    #[serde(default)]
    pub tracking: TrackingConfig,
}

impl LineageGateConfig {
    /// Loads configuration using the default resolution rules and the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| env::var(key).ok())
    }

    /// Loads configuration, reading overlay values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolved = resolve_path(path, &lookup)?;
        validate_path(&resolved.path)?;
        let mut config = if !resolved.explicit && !resolved.path.exists() {
            Self::default()
        } else {
            Self::from_file(&resolved.path)?
        };
        config.archive.apply_env_overlay(&lookup);
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document without applying the environment overlay.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a config file with size and encoding checks.
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.archive.validate()?;
        self.tracking.validate()?;
        Ok(())
    }

    /// Returns the gateway settings derived from `[tracking]`.
    #[must_use]
    pub fn gateway_settings(&self) -> GatewaySettings {
        self.tracking.gateway_settings()
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Route serving lineage notifications.
    #[serde(default = "default_route")]
    pub route: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: ServerAuditConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            route: default_route(),
            max_body_bytes: default_max_body_bytes(),
            audit: ServerAuditConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the bind address is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind.trim().parse().map_err(|_| {
            ConfigError::Invalid(format!("server.bind is not a socket address: {}", self.bind))
        })
    }

    /// Validates server configuration and stores the trimmed route.
    fn validate(&mut self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        let route = self.route.trim();
        if !route.starts_with('/') {
            return Err(ConfigError::Invalid("server.route must start with '/'".to_string()));
        }
        if route.contains(['?', '#', '{', '}', '*']) {
            return Err(ConfigError::Invalid(
                "server.route must be a literal path without query or wildcards".to_string(),
            ));
        }
        if route.split('/').any(|segment| segment.starts_with(':')) {
            return Err(ConfigError::Invalid(
                "server.route segments must not start with ':'".to_string(),
            ));
        }
        self.route = route.to_string();
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes exceeds limit {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        self.audit.validate()
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerAuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for ServerAuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl ServerAuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("server.audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Archive
// ============================================================================

/// Supported archive providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveProvider {
    /// Amazon S3 compatible object storage.
    #[default]
    S3,
    /// Local directory tree (one subdirectory per container).
    Filesystem,
}

/// Archive configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Provider selection.
    #[serde(default)]
    pub provider: ArchiveProvider,
    /// Provider connection string.
    #[serde(default)]
    pub connection_string: Option<String>,
    /// Container (bucket) receiving archived payloads.
    #[serde(default)]
    pub container: Option<String>,
}

/// Archive settings with both required values present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArchive<'a> {
    /// Provider selection.
    pub provider: ArchiveProvider,
    /// Non-blank connection string.
    pub connection_string: &'a str,
    /// Non-blank container name.
    pub container: &'a str,
}

impl ArchiveConfig {
    /// Overrides file values with non-empty environment values.
    fn apply_env_overlay<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(CONNECTION_STRING_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            self.connection_string = Some(value);
        }
        if let Some(value) = lookup(CONTAINER_NAME_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            self.container = Some(value);
        }
    }

    /// Returns the archive settings when both required values are present.
    #[must_use]
    pub fn resolved(&self) -> Option<ResolvedArchive<'_>> {
        let connection_string =
            self.connection_string.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        let container = self.container.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        Some(ResolvedArchive {
            provider: self.provider,
            connection_string,
            container,
        })
    }

    /// Validates archive values that are present.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(container) = self.container.as_deref().map(str::trim).filter(|v| !v.is_empty())
        {
            validate_container(container)?;
        }
        let Some(connection_string) =
            self.connection_string.as_deref().map(str::trim).filter(|v| !v.is_empty())
        else {
            return Ok(());
        };
        match self.provider {
            ArchiveProvider::S3 => S3ConnectionSettings::parse(connection_string).map(|_| ()),
            ArchiveProvider::Filesystem => {
                validate_path_string("archive.connection_string", connection_string)
            }
        }
    }
}

/// S3 settings parsed from a `Key=Value;` connection string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct S3ConnectionSettings {
    /// Optional region (defaults to the environment).
    pub region: Option<String>,
    /// Optional S3-compatible endpoint.
    pub endpoint: Option<String>,
    /// Force path-style addressing.
    pub force_path_style: bool,
    /// Static access key id.
    pub access_key_id: Option<String>,
    /// Static secret access key.
    pub secret_access_key: Option<String>,
    /// Allow non-TLS endpoints.
    pub allow_http: bool,
}

impl S3ConnectionSettings {
    /// Parses a connection string such as
    /// `Region=us-east-1;Endpoint=https://s3.local;ForcePathStyle=true`.
    ///
    /// Keys are case-insensitive; empty segments are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on unknown keys, malformed pairs,
    /// non-boolean flags, non-HTTP endpoints, or half-specified credentials.
    pub fn parse(connection_string: &str) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        for segment in connection_string.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let Some((key, value)) = segment.split_once('=') else {
                return Err(ConfigError::Invalid(
                    "archive connection string segments must be Key=Value".to_string(),
                ));
            };
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "region" => settings.region = non_empty(value),
                "endpoint" => settings.endpoint = non_empty(value),
                "forcepathstyle" => settings.force_path_style = parse_flag("ForcePathStyle", value)?,
                "accesskeyid" => settings.access_key_id = non_empty(value),
                "secretaccesskey" => settings.secret_access_key = non_empty(value),
                "allowhttp" => settings.allow_http = parse_flag("AllowHttp", value)?,
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "archive connection string has unknown key: {other}"
                    )));
                }
            }
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Validates cross-field constraints.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(endpoint) = &self.endpoint {
            if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
                return Err(ConfigError::Invalid(
                    "archive endpoint must include http:// or https://".to_string(),
                ));
            }
            if endpoint.starts_with("http://") && !self.allow_http {
                return Err(ConfigError::Invalid(
                    "archive endpoint uses http:// without AllowHttp=true".to_string(),
                ));
            }
        }
        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(ConfigError::Invalid(
                "archive AccessKeyId and SecretAccessKey must be set together".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Tracking
// ============================================================================

/// Tracking store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStoreType {
    /// Use the in-memory store.
    #[default]
    Memory,
    /// Use the `SQLite` store.
    Sqlite,
}

/// Tracking record store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackingConfig {
    /// Store backend type.
    #[serde(default)]
    pub store: TrackingStoreType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Initial retry budget on new records.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    /// Initial archived flag on new records.
    #[serde(default = "default_is_archived")]
    pub is_archived: bool,
    /// Optional prefix prepended to the normalized job name.
    #[serde(default)]
    pub qualifier_prefix: Option<String>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            store: TrackingStoreType::default(),
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            retry_count: default_retry_count(),
            is_archived: default_is_archived(),
            qualifier_prefix: None,
        }
    }
}

impl TrackingConfig {
    /// Returns the `SQLite` store config when the sqlite backend is selected.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        match self.store {
            TrackingStoreType::Memory => None,
            TrackingStoreType::Sqlite => self.path.as_ref().map(|path| SqliteStoreConfig {
                path: path.clone(),
                busy_timeout_ms: self.busy_timeout_ms,
                journal_mode: self.journal_mode,
                sync_mode: self.sync_mode,
            }),
        }
    }

    /// Returns the gateway settings for new tracking records.
    #[must_use]
    pub fn gateway_settings(&self) -> GatewaySettings {
        let qualifier = match self.qualifier_prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => QualifierRule::Prefix(prefix.to_string()),
            _ => QualifierRule::Identity,
        };
        GatewaySettings {
            tracking: TrackingDefaults {
                retry_count: self.retry_count,
                is_archived: self.is_archived,
            },
            qualifier,
        }
    }

    /// Validates tracking configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store {
            TrackingStoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid(
                        "memory tracking store must not set path".to_string(),
                    ));
                }
            }
            TrackingStoreType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite tracking store requires path".to_string())
                })?;
                validate_store_path(path)?;
            }
        }
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "tracking.busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(prefix) = &self.qualifier_prefix
            && prefix.len() > MAX_QUALIFIER_PREFIX_LENGTH
        {
            return Err(ConfigError::Invalid(
                "tracking.qualifier_prefix exceeds max length".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Config path plus whether the caller asked for it explicitly.
struct ResolvedPath {
    /// Resolved path.
    path: PathBuf,
    /// False when falling back to the default file name.
    explicit: bool,
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path<F>(path: Option<&Path>, lookup: &F) -> Result<ResolvedPath, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = path {
        return Ok(ResolvedPath {
            path: path.to_path_buf(),
            explicit: true,
        });
    }
    if let Some(env_path) = lookup(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ResolvedPath {
            path: PathBuf::from(env_path),
            explicit: true,
        });
    }
    Ok(ResolvedPath {
        path: PathBuf::from(DEFAULT_CONFIG_NAME),
        explicit: false,
    })
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates tracking store paths against security limits.
fn validate_store_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("tracking.path must be non-empty".to_string()));
    }
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("tracking.path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("tracking.path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a container name as a single object-store path segment.
fn validate_container(container: &str) -> Result<(), ConfigError> {
    if container.len() > MAX_CONTAINER_LENGTH {
        return Err(ConfigError::Invalid("archive.container exceeds max length".to_string()));
    }
    if container == "." || container == ".." {
        return Err(ConfigError::Invalid("archive.container must not be . or ..".to_string()));
    }
    if container.contains(['/', '\\']) {
        return Err(ConfigError::Invalid(
            "archive.container must not contain path separators".to_string(),
        ));
    }
    Ok(())
}

/// Returns `Some(value)` when non-empty.
fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() { None } else { Some(value.to_string()) }
}

/// Parses a boolean connection-string flag.
fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid(format!("archive {key} must be a boolean"))),
    }
}

/// Returns the default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Returns the default ingestion route.
fn default_route() -> String {
    DEFAULT_ROUTE.to_string()
}

/// Returns the default maximum body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Returns the default audit enablement.
const fn default_audit_enabled() -> bool {
    true
}

/// Returns the default `SQLite` busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default retry budget.
const fn default_retry_count() -> u32 {
    DEFAULT_RETRY_COUNT
}

/// Returns the default archived flag.
const fn default_is_archived() -> bool {
    DEFAULT_IS_ARCHIVED
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

    use super::*;

    #[test]
    fn parse_flag_accepts_common_spellings() {
        assert!(parse_flag("F", "TRUE").unwrap());
        assert!(!parse_flag("F", "0").unwrap());
        assert!(parse_flag("F", "maybe").is_err());
    }

    #[test]
    fn container_rejects_separators() {
        assert!(validate_container("lineage").is_ok());
        assert!(validate_container("a/b").is_err());
        assert!(validate_container("..").is_err());
    }

    #[test]
    fn resolve_path_falls_back_to_default_name() {
        let resolved = resolve_path(None, &|_: &str| None).unwrap();
        assert_eq!(resolved.path, PathBuf::from(DEFAULT_CONFIG_NAME));
        assert!(!resolved.explicit);
    }
}
