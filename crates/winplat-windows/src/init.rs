//! Startup registration of the Windows platforms.
//!
//! Each target is built only when its architecture is loaded. Mode-sibling
//! pairs (ARMv7 and Thumb-2) are built, linked, and published together, or
//! not at all.

use std::sync::Arc;

use serde::Serialize;
use winplat_host::{HostContext, Platform, Result};

use crate::build::{build_platform, BuildReport};
use crate::roles::ArchFamily;

/// Namespace the Windows platforms are published under.
pub const NAMESPACE: &str = "windows";

/// Container format whose loader gets a default platform per architecture.
pub const PE_FORMAT: &str = "PE";

/// One platform to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformTarget {
    /// Architecture name looked up in the host.
    pub arch: &'static str,
    /// Published platform name.
    pub name: &'static str,
    pub family: ArchFamily,
    /// Whether this platform becomes the PE loader default for `arch`.
    pub format_default: bool,
}

/// A unit of the startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetGroup {
    Single(PlatformTarget),
    /// Two encodings of one processor. Each platform links to the other.
    ModeSiblings {
        primary: PlatformTarget,
        alternate: PlatformTarget,
    },
}

/// The Windows platforms, in registration order.
pub const WINDOWS_TARGETS: &[TargetGroup] = &[
    TargetGroup::Single(PlatformTarget {
        arch: "x86",
        name: "windows-x86",
        family: ArchFamily::X86,
        format_default: true,
    }),
    TargetGroup::Single(PlatformTarget {
        arch: "x86_64",
        name: "windows-x86_64",
        family: ArchFamily::X86_64,
        format_default: true,
    }),
    TargetGroup::ModeSiblings {
        primary: PlatformTarget {
            arch: "armv7",
            name: "windows-armv7",
            family: ArchFamily::Arm,
            format_default: true,
        },
        alternate: PlatformTarget {
            arch: "thumb2",
            name: "windows-thumb2",
            family: ArchFamily::Arm,
            format_default: false,
        },
    },
    TargetGroup::Single(PlatformTarget {
        arch: "aarch64",
        name: "windows-aarch64",
        family: ArchFamily::Aarch64,
        format_default: true,
    }),
];

/// Why a target was not built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum Skip {
    /// The architecture is not loaded.
    MissingArchitecture { architecture: String },
    /// The architecture is loaded but its mode sibling is not.
    SiblingNotReady { architecture: String, sibling: String },
}

impl Skip {
    /// The architecture whose platform was not built.
    pub fn architecture(&self) -> &str {
        match self {
            Skip::MissingArchitecture { architecture } => architecture,
            Skip::SiblingNotReady { architecture, .. } => architecture,
        }
    }
}

/// Outcome of a startup run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct InitReport {
    /// Platforms built and published, in publication order.
    pub built: Vec<BuildReport>,
    pub skipped: Vec<Skip>,
}

impl InitReport {
    /// Names of the published platforms.
    pub fn published(&self) -> impl Iterator<Item = &str> {
        self.built.iter().map(|b| b.platform.as_str())
    }
}

/// Build and publish every Windows platform the host can support.
pub fn initialize(host: &mut HostContext) -> Result<InitReport> {
    initialize_targets(host, WINDOWS_TARGETS)
}

/// Build and publish `targets` into `host`.
///
/// Missing architectures and incomplete sibling pairs are recorded in the
/// report and skipped. Only a publication failure is an error.
pub fn initialize_targets(host: &mut HostContext, targets: &[TargetGroup]) -> Result<InitReport> {
    let mut report = InitReport::default();

    for group in targets {
        match *group {
            TargetGroup::Single(target) => {
                let Some(arch) = host.catalog.lookup_architecture(target.arch) else {
                    log::warn!("{}: architecture {} not loaded", target.name, target.arch);
                    report.skipped.push(Skip::MissingArchitecture {
                        architecture: target.arch.to_string(),
                    });
                    continue;
                };

                let (platform, built) =
                    build_platform(&host.catalog, arch, target.name, target.family)?;
                publish(host, vec![(target, platform)])?;
                report.built.push(built);
            }
            TargetGroup::ModeSiblings { primary, alternate } => {
                let primary_arch = host.catalog.lookup_architecture(primary.arch);
                let alternate_arch = host.catalog.lookup_architecture(alternate.arch);
                let (primary_arch, alternate_arch) = match (primary_arch, alternate_arch) {
                    (Some(p), Some(a)) => (p, a),
                    (p, a) => {
                        report.skipped.extend(sibling_skips(
                            (primary, p.is_some()),
                            (alternate, a.is_some()),
                        ));
                        continue;
                    }
                };

                let (mut primary_platform, primary_built) =
                    build_platform(&host.catalog, primary_arch, primary.name, primary.family)?;
                let (mut alternate_platform, alternate_built) = build_platform(
                    &host.catalog,
                    alternate_arch,
                    alternate.name,
                    alternate.family,
                )?;
                Platform::link_mode_siblings(&mut primary_platform, &mut alternate_platform)?;

                publish(
                    host,
                    vec![(primary, primary_platform), (alternate, alternate_platform)],
                )?;
                report.built.push(primary_built);
                report.built.push(alternate_built);
            }
        }
    }

    Ok(report)
}

/// Skip entries for a sibling pair that is not fully present.
fn sibling_skips(
    (primary, primary_present): (PlatformTarget, bool),
    (alternate, alternate_present): (PlatformTarget, bool),
) -> Vec<Skip> {
    let mut skips = Vec::new();
    for (target, present, other) in [
        (primary, primary_present, alternate),
        (alternate, alternate_present, primary),
    ] {
        let skip = if !present {
            Skip::MissingArchitecture {
                architecture: target.arch.to_string(),
            }
        } else {
            Skip::SiblingNotReady {
                architecture: target.arch.to_string(),
                sibling: other.arch.to_string(),
            }
        };
        log::warn!("{}: skipped ({skip:?})", target.name);
        skips.push(skip);
    }
    skips
}

/// Publish a group atomically, then record format defaults.
fn publish(host: &mut HostContext, group: Vec<(PlatformTarget, Platform)>) -> Result<()> {
    let (targets, platforms): (Vec<_>, Vec<_>) = group.into_iter().unzip();
    let published = host.platforms.register_all(NAMESPACE, platforms)?;

    for (target, platform) in targets.iter().zip(published) {
        if target.format_default {
            let arch = Arc::clone(platform.architecture());
            host.default_platforms
                .register_default_platform(PE_FORMAT, &arch, platform);
        }
    }
    Ok(())
}
