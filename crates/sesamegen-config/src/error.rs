// ── Configuration error types ──
//
// Every variant is a configuration-time abort with a message naming the
// offending field and constraint. Nothing here is recoverable; the whole
// pass stops at the first error.

use thiserror::Error;

/// Unified error type for configuration parsing and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    // ── Cross-field invariants ───────────────────────────────────────
    #[error("Either 'uuid' or 'address' is required")]
    UuidOrAddressRequired,

    // ── Range errors ─────────────────────────────────────────────────
    #[error("'{field}' must be in range [{min}, {max}], got {got}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        got: i64,
    },

    // ── Format errors ────────────────────────────────────────────────
    #[error("'{field}' must be a {len} bytes hex string")]
    InvalidHexString { field: &'static str, len: usize },

    #[error("invalid MAC address '{value}': expected six colon-separated hex octets")]
    InvalidMacAddress { value: String },

    // ── Document shape errors ────────────────────────────────────────
    #[error("no '{component}' block in the configuration document")]
    MissingComponent { component: &'static str },

    #[error("invalid configuration document: {0}")]
    Schema(#[from] serde_yaml::Error),
}
