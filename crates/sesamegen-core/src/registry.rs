// ── Component registry ──
//
// Static read-only table mapping logical component names to their
// manifests and generator functions. Initialized once at first use;
// no mutable global state beyond that.

use std::sync::LazyLock;

use indexmap::{IndexMap, IndexSet};

use sesamegen_config::Document;

use crate::error::CoreError;
use crate::ir::CodegenUnit;
use crate::sesame_server;

/// A generator turns one component block of the document into emitted
/// registration statements.
pub type GeneratorFn = fn(&Document, &mut CodegenUnit) -> Result<(), CoreError>;

/// Declared relationships of a component with the rest of the platform.
pub struct ComponentManifest {
    pub name: &'static str,
    /// Modules that must be present after auto-loading.
    pub dependencies: &'static [&'static str],
    /// Modules pulled in automatically when this component is configured.
    pub auto_load: &'static [&'static str],
    /// Modules that must not be configured alongside this component.
    pub conflicts_with: &'static [&'static str],
    pub generate: GeneratorFn,
}

static REGISTRY: LazyLock<IndexMap<&'static str, ComponentManifest>> = LazyLock::new(|| {
    let mut table = IndexMap::new();
    table.insert(
        sesame_server::COMPONENT,
        ComponentManifest {
            name: sesame_server::COMPONENT,
            dependencies: sesame_server::DEPENDENCIES,
            auto_load: sesame_server::AUTO_LOAD,
            conflicts_with: sesame_server::CONFLICTS_WITH,
            generate: sesame_server::generate,
        },
    );
    table
});

/// The component manifest table.
pub fn registry() -> &'static IndexMap<&'static str, ComponentManifest> {
    &REGISTRY
}

/// Resolve the configured module set: reject conflicts, pull in
/// auto-loaded modules, then require every dependency to be present.
///
/// Returns the final module list in document order with auto-loaded
/// modules appended.
pub fn resolve_modules<'a, I>(configured: I) -> Result<Vec<String>, CoreError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut resolved: IndexSet<String> = configured.into_iter().map(str::to_owned).collect();
    let initial: Vec<String> = resolved.iter().cloned().collect();

    for name in &initial {
        let Some(manifest) = REGISTRY.get(name.as_str()) else {
            continue;
        };
        for conflict in manifest.conflicts_with {
            if resolved.contains(*conflict) {
                return Err(CoreError::Conflict {
                    component: name.clone(),
                    conflict: (*conflict).to_owned(),
                });
            }
        }
        for auto in manifest.auto_load {
            if resolved.insert((*auto).to_owned()) {
                tracing::debug!(component = name.as_str(), module = *auto, "auto-loading module");
            }
        }
        for dependency in manifest.dependencies {
            if !resolved.contains(*dependency) {
                return Err(CoreError::MissingDependency {
                    component: name.clone(),
                    dependency: (*dependency).to_owned(),
                });
            }
        }
    }

    Ok(resolved.into_iter().collect())
}
