//! Host module wrapper for the Windows platforms.

use std::cell::RefCell;

use winplat_host::{Dependency, HostContext, HostModule};

use crate::init::{initialize, InitReport};

/// Architecture modules whose presence adds Windows platforms.
pub const OPTIONAL_DEPENDENCIES: &[&str] = &["arch_x86", "arch_armv7", "arch_arm64"];

/// The `platform_windows` host module.
#[derive(Debug, Default)]
pub struct WindowsModule {
    report: RefCell<Option<InitReport>>,
}

impl WindowsModule {
    pub const NAME: &'static str = "platform_windows";

    pub fn new() -> Self {
        Self::default()
    }

    /// Report from the last successful initialization, if any.
    pub fn take_report(&self) -> Option<InitReport> {
        self.report.borrow_mut().take()
    }
}

impl HostModule for WindowsModule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn dependencies(&self) -> Vec<Dependency> {
        OPTIONAL_DEPENDENCIES
            .iter()
            .map(|name| Dependency::optional(*name))
            .collect()
    }

    fn init(&self, host: &mut HostContext) -> bool {
        match initialize(host) {
            Ok(report) => {
                log::info!(
                    "{}: {} platforms published, {} skipped",
                    Self::NAME,
                    report.built.len(),
                    report.skipped.len()
                );
                *self.report.borrow_mut() = Some(report);
                true
            }
            Err(e) => {
                log::error!("{}: {e}", Self::NAME);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winplat_host::HostError;

    #[test]
    fn dependencies_are_all_optional() {
        let deps = WindowsModule::new().dependencies();
        assert_eq!(deps.len(), 3);
        assert!(deps.iter().all(|d| d.optional));
    }

    #[test]
    fn loads_without_any_architecture() {
        let mut host = HostContext::default();
        let module = WindowsModule::new();
        host.load(&module).unwrap();
        assert!(host.is_loaded(WindowsModule::NAME));
        let report = module.take_report().unwrap();
        assert_eq!(report.published().count(), 0);
        assert!(module.take_report().is_none());
    }

    #[test]
    fn publication_conflict_fails_init() {
        let mut host = HostContext::default();
        let x86 = host
            .catalog
            .register_architecture(winplat_host::Architecture::new("x86", 4))
            .unwrap();
        host.platforms
            .register("windows", winplat_host::Platform::new(x86, "windows-x86"))
            .unwrap();

        let module = WindowsModule::new();
        assert!(!module.init(&mut host));
        let err = host.load(&module).unwrap_err();
        assert!(matches!(err, HostError::ModuleInitFailed { .. }));
        assert!(module.take_report().is_none());
    }
}
