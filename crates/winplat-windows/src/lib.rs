//! Windows platform definitions.
//!
//! Registers one platform per supported Windows architecture into a host:
//! `windows-x86`, `windows-x86_64`, `windows-armv7` / `windows-thumb2`
//! (linked mode siblings), and `windows-aarch64`. Each platform takes its
//! calling conventions from the host catalog according to the role table
//! in [`roles`], and becomes the PE loader's default for its architecture.

pub mod build;
pub mod init;
pub mod module;
pub mod roles;

pub use build::{build_platform, BuildReport, LookupOutcome, LookupStatus};
pub use init::{
    initialize, initialize_targets, InitReport, PlatformTarget, Skip, TargetGroup, NAMESPACE,
    PE_FORMAT, WINDOWS_TARGETS,
};
pub use module::{WindowsModule, OPTIONAL_DEPENDENCIES};
pub use roles::{ArchFamily, ConventionRule};
