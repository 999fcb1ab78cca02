//! Host modules and the context they initialize against.
//!
//! A [`HostContext`] owns every registry a module may read or write. It is
//! passed explicitly to each module's entry point instead of being reached
//! through process-wide state.

use std::collections::BTreeSet;

use crate::arch::CallingConventionCatalog;
use crate::error::{HostError, Result};
use crate::registry::{DefaultPlatformTable, DuplicatePolicy, PlatformRegistry};

/// A dependency a module declares on another module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Name of the module depended on.
    pub name: String,
    /// Optional dependencies are advisory: loading proceeds without them.
    pub optional: bool,
}

impl Dependency {
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: true,
        }
    }

    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
        }
    }
}

/// A loadable unit that contributes registrations to the host.
pub trait HostModule {
    /// Module name, unique among loaded modules.
    fn name(&self) -> &str;

    /// Modules this one depends on.
    fn dependencies(&self) -> Vec<Dependency> {
        Vec::new()
    }

    /// Initialization entry point. Returns `false` on failure.
    fn init(&self, host: &mut HostContext) -> bool;
}

/// Registries owned by the host, plus the set of loaded module names.
#[derive(Debug, Default)]
pub struct HostContext {
    pub catalog: CallingConventionCatalog,
    pub platforms: PlatformRegistry,
    pub default_platforms: DefaultPlatformTable,
    loaded: BTreeSet<String>,
}

impl HostContext {
    /// Create an empty host context.
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            platforms: PlatformRegistry::new(policy),
            ..Self::default()
        }
    }

    /// Whether a module with this name has been loaded.
    pub fn is_loaded(&self, module: &str) -> bool {
        self.loaded.contains(module)
    }

    /// Loaded module names, sorted.
    pub fn loaded_modules(&self) -> impl Iterator<Item = &str> {
        self.loaded.iter().map(String::as_str)
    }

    /// Record a module as loaded without running an entry point.
    ///
    /// Used for modules whose registrations were applied directly, such as
    /// architecture modules built from a host description.
    pub fn mark_loaded(&mut self, module: &str) -> Result<()> {
        if !self.loaded.insert(module.to_string()) {
            return Err(HostError::ModuleAlreadyLoaded {
                module: module.to_string(),
            });
        }
        Ok(())
    }

    /// Check dependencies, run the module's entry point, and record it.
    pub fn load(&mut self, module: &dyn HostModule) -> Result<()> {
        let name = module.name().to_string();
        if self.is_loaded(&name) {
            return Err(HostError::ModuleAlreadyLoaded { module: name });
        }

        for dep in module.dependencies() {
            if self.is_loaded(&dep.name) {
                continue;
            }
            if dep.optional {
                log::warn!("{name}: optional dependency '{}' is not loaded", dep.name);
            } else {
                return Err(HostError::MissingDependency {
                    module: name,
                    dependency: dep.name,
                });
            }
        }

        if !module.init(self) {
            log::error!("module {name} did not initialize");
            return Err(HostError::ModuleInitFailed { module: name });
        }
        log::info!("loaded module {name}");
        self.loaded.insert(name);
        Ok(())
    }
}
