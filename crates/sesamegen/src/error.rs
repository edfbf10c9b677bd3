//! CLI error types with miette diagnostics.
//!
//! Wraps the configuration and core errors into user-facing diagnostics
//! with help text and exit codes.

use miette::Diagnostic;
use thiserror::Error;

use sesamegen_config::ConfigError;
use sesamegen_core::CoreError;

/// Exit codes.
#[allow(dead_code)]
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    /// Configuration failed validation or module resolution.
    pub const INVALID_CONFIG: i32 = 64;
    /// The input document could not be read.
    pub const NO_INPUT: i32 = 65;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input / output ───────────────────────────────────────────────
    #[error("cannot read '{path}'")]
    #[diagnostic(
        code(sesamegen::no_input),
        help("Check that the file exists and is readable.")
    )]
    ReadInput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write '{path}'")]
    #[diagnostic(code(sesamegen::output))]
    WriteOutput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(sesamegen::invalid_config),
        help("Fix the named field and re-run 'sesamegen validate'.")
    )]
    Config(#[from] ConfigError),

    // ── Module resolution / generation ───────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(sesamegen::resolution))]
    Core(CoreError),
}

// Configuration errors wrapped by the core layer keep their
// field-level messages and the config diagnostic code.
impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config(inner) => Self::Config(inner),
            other => Self::Core(other),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ReadInput { .. } => exit_code::NO_INPUT,
            Self::Config(_) | Self::Core(_) => exit_code::INVALID_CONFIG,
            Self::WriteOutput { .. } => exit_code::GENERAL,
        }
    }
}
