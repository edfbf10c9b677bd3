//! Configuration schema for the sesame_server component.
//!
//! YAML document parsing, the typed configuration model, and the
//! validation pipeline. Validation is a fail-fast sequence of plain
//! functions over the immutable record — no partial graph ever escapes
//! a failed pass.

pub mod error;
pub mod model;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::ConfigError;
pub use model::{
    COMPONENT_NAME, Document, EntityConfig, EventType, LockConfig, MacAddress, ServerConfig,
    TriggerConfig,
};
pub use validate::{is_hex_string, validate_server};
