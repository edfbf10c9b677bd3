// sesamegen-core: host-framework model between the configuration schema
// and the emitted registration script.

pub mod error;
pub mod ir;
pub mod registry;
pub mod sesame_server;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use ir::{CodegenUnit, EntityKind, Expr, Library, Statement};
pub use registry::{ComponentManifest, registry, resolve_modules};
pub use sesame_server::generate;
