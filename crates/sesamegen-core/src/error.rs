// ── Core error types ──
//
// Resolution and generation failures. Configuration-schema errors pass
// through untouched so the exact field-level messages survive to the
// user.

use thiserror::Error;

use sesamegen_config::ConfigError;

/// Unified error type for module resolution and code generation.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Module resolution ────────────────────────────────────────────
    #[error("component '{component}' conflicts with '{conflict}'")]
    Conflict { component: String, conflict: String },

    #[error("component '{component}' requires '{dependency}', which is not configured")]
    MissingDependency {
        component: String,
        dependency: String,
    },

    #[error("no generator registered for component '{component}'")]
    UnknownComponent { component: String },

    // ── Generation ───────────────────────────────────────────────────
    #[error("duplicate id '{id}'")]
    DuplicateId { id: String },

    // ── Configuration (passed through) ───────────────────────────────
    #[error(transparent)]
    Config(#[from] ConfigError),
}
