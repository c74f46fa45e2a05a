// crates/lineage-gate-cli/src/main.rs
// ============================================================================
// Module: Lineage Gate CLI Entry Point
// Description: Command dispatcher for the lineage ingest server and tools.
// Purpose: Serve the ingest endpoint, validate config, classify offline.
// Dependencies: clap, lineage-gate-config, lineage-gate-core,
//               lineage-gate-server, serde, thiserror, tokio.
// ============================================================================

//! ## Overview
//! The `lineage-gate` binary runs the HTTP ingest server, validates
//! configuration files, and runs the event classifier against a payload on
//! disk so operators can check why an event was accepted or skipped.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use lineage_gate_config::LineageGateConfig;
use lineage_gate_core::Classification;
use lineage_gate_core::Decision;
use lineage_gate_core::ExtractionWarning;
use lineage_gate_core::RejectedEvent;
use lineage_gate_core::RelevantEvent;
use lineage_gate_core::classify;
use lineage_gate_server::LineageServer;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum payload size accepted by `classify`.
const MAX_CLASSIFY_INPUT_BYTES: usize = 64 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "lineage-gate", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the lineage ingest server.
    Serve(ServeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Classify a lineage event payload without storing it.
    Classify(ClassifyCommand),
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to lineage-gate.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to lineage-gate.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `classify`.
#[derive(Args, Debug)]
struct ClassifyCommand {
    /// Path to a lineage event JSON payload.
    #[arg(long, value_name = "FILE")]
    input: PathBuf,
    /// Event type override, as if passed in the `eventType` query parameter.
    #[arg(long = "event-type", value_name = "TYPE")]
    event_type: Option<String>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("lineage-gate {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = cli.command else {
        return Err(CliError::new(
            "no command given; expected serve, config validate, or classify".to_string(),
        ));
    };
    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Classify(command) => command_classify(&command),
    }
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = LineageGateConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let route = config.server.route.clone();
    let server = LineageServer::from_config(config)
        .map_err(|err| CliError::new(format!("failed to start server: {err}")))?;
    write_stderr_line(&format!("lineage-gate: listening on http://{}{route}", server.bind_addr()))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = LineageGateConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Classify Command
// ============================================================================

/// JSON report printed by `classify`.
#[derive(Debug, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
enum ClassifyReport {
    /// Event would be archived and tracked.
    Relevant {
        /// Classified event.
        event: RelevantEvent,
        /// Advisory extraction warnings.
        warnings: Vec<ExtractionWarning>,
    },
    /// Event would be skipped.
    Skipped {
        /// Filtered event with its reason.
        event: RejectedEvent,
        /// Advisory extraction warnings.
        warnings: Vec<ExtractionWarning>,
    },
}

impl From<Classification> for ClassifyReport {
    fn from(classification: Classification) -> Self {
        let Classification {
            decision,
            warnings,
        } = classification;
        match decision {
            Decision::Relevant(event) => Self::Relevant {
                event,
                warnings,
            },
            Decision::Rejected(event) => Self::Skipped {
                event,
                warnings,
            },
        }
    }
}

/// Executes the `classify` command.
fn command_classify(command: &ClassifyCommand) -> CliResult<ExitCode> {
    let bytes = read_bytes_with_limit(&command.input, MAX_CLASSIFY_INPUT_BYTES).map_err(|err| {
        CliError::new(format!("failed to read {}: {err}", command.input.display()))
    })?;
    let classification = match classify(&bytes, command.event_type.as_deref()) {
        Ok(classification) => classification,
        Err(err) => return Ok(emit_error(&format!("invalid lineage event: {err}"))),
    };
    let report = ClassifyReport::from(classification);
    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|err| CliError::new(format!("failed to render report: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors raised while reading bounded input files.
#[derive(Debug, Error)]
enum ReadLimitError {
    /// I/O failure while reading.
    #[error("{0}")]
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
