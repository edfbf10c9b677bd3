//! Clap derive structures for the `sesamegen` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sesamegen -- configuration validator and code generator for the
/// sesame_server BLE lock-bridge component
#[derive(Debug, Parser)]
#[command(
    name = "sesamegen",
    version,
    about = "Validate sesame_server configurations and generate registration code",
    long_about = "Validates a YAML configuration document for the sesame_server\n\
        smart-lock BLE bridge component and emits the registration script\n\
        consumed by the downstream native build.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a configuration document without generating code
    #[command(alias = "check")]
    Validate(ValidateArgs),

    /// Validate and emit the registration script
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Path to the YAML configuration document
    pub config: PathBuf,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Path to the YAML configuration document
    pub config: PathBuf,

    /// Write the script to FILE instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', default_value = "cpp")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

// ── Output Format ────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// C++-flavoured registration script (default)
    Cpp,
    /// JSON-serialized codegen unit
    Json,
}
