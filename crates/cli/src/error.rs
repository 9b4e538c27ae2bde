//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: engine error (bad lattice, rejected scene config, frame failure)
//! - 11: I/O error (reading a scene file, writing PNG or OBJ)
//! - 12: input error (bad JSON in `--config` or `--params`)
//! - 13: serialization error

use liquid_metal_core::EngineError;
use std::fmt;
use std::path::Path;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
pub enum CliError {
    Engine(EngineError),
    Io(String),
    /// Malformed user input, caught before any scene is built.
    Input(String),
    Serialization(String),
}

impl CliError {
    /// I/O failure on `path`, reported with the path first.
    pub fn io_at(path: &Path, err: std::io::Error) -> Self {
        CliError::Io(format!("{}: {err}", path.display()))
    }

    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Engine(e) => write!(f, "{e}"),
            CliError::Io(msg) => write!(f, "{msg}"),
            CliError::Input(msg) => write!(f, "{msg}"),
            CliError::Serialization(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(msg) => CliError::Io(msg),
            other => CliError::Engine(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
