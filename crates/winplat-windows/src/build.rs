//! Platform construction from the role table.

use std::sync::Arc;

use serde::Serialize;
use winplat_host::{Architecture, CallingConventionCatalog, Platform, Result, Role};

use crate::roles::ArchFamily;

/// Whether a convention lookup found anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookupStatus {
    Found,
    Missing,
}

/// The result of one convention lookup during construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LookupOutcome {
    pub convention: String,
    pub status: LookupStatus,
    /// Whether the table made this convention the default.
    pub default: bool,
    /// Roles the table binds this convention to.
    pub roles: Vec<Role>,
}

/// What happened while building one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildReport {
    pub platform: String,
    pub architecture: String,
    pub family: ArchFamily,
    pub lookups: Vec<LookupOutcome>,
}

impl BuildReport {
    /// Conventions that were found and registered.
    pub fn found(&self) -> impl Iterator<Item = &str> {
        self.lookups_with(LookupStatus::Found)
    }

    /// Conventions the catalog did not provide.
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.lookups_with(LookupStatus::Missing)
    }

    /// Whether every lookup succeeded.
    pub fn is_complete(&self) -> bool {
        self.missing().next().is_none()
    }

    fn lookups_with(&self, status: LookupStatus) -> impl Iterator<Item = &str> {
        self.lookups
            .iter()
            .filter(move |l| l.status == status)
            .map(|l| l.convention.as_str())
    }
}

/// Build a platform for `arch`, filling conventions from `family`'s table.
///
/// Conventions absent from the catalog are skipped; the platform is still
/// built with whatever was found.
pub fn build_platform(
    catalog: &CallingConventionCatalog,
    arch: Arc<Architecture>,
    name: &str,
    family: ArchFamily,
) -> Result<(Platform, BuildReport)> {
    let mut platform = Platform::new(Arc::clone(&arch), name);
    let mut lookups = Vec::new();

    for rule in family.conventions() {
        let status = match catalog.lookup_calling_convention(&arch, rule.name) {
            Some(cc) => {
                let cc = platform.register_calling_convention(cc)?;
                if rule.default {
                    platform.set_default_calling_convention(Arc::clone(&cc))?;
                }
                for role in rule.roles {
                    platform.set_role(*role, Arc::clone(&cc))?;
                }
                LookupStatus::Found
            }
            None => {
                log::debug!("{name}: calling convention '{}' not available on {arch}", rule.name);
                LookupStatus::Missing
            }
        };
        lookups.push(LookupOutcome {
            convention: rule.name.to_string(),
            status,
            default: rule.default,
            roles: rule.roles.to_vec(),
        });
    }

    let report = BuildReport {
        platform: name.to_string(),
        architecture: arch.name.clone(),
        family,
        lookups,
    };
    Ok((platform, report))
}
