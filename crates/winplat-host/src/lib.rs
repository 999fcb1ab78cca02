//! Host registries for a binary-analysis host.
//!
//! The host keeps four registries that platform modules work against:
//! - **Architecture set / Calling Convention Catalog:** which instruction
//!   sets are loaded and which named conventions each provides
//! - **Platform Registry:** published platforms, grouped by OS namespace
//! - **Default Platform Table:** which platform a container-format loader
//!   assumes for an architecture
//! - **Loaded modules:** which support modules have initialized
//!
//! All of them live in a [`HostContext`] that is passed to each module's
//! entry point.

pub mod arch;
pub mod config;
pub mod error;
pub mod module;
pub mod platform;
pub mod registry;

pub use arch::{Architecture, CallingConvention, CallingConventionCatalog, Endianness};
pub use config::{HostConfig, ValidationIssue};
pub use error::{HostError, Result};
pub use module::{Dependency, HostContext, HostModule};
pub use platform::{Platform, PlatformSummary, Role};
pub use registry::{DefaultPlatformTable, DuplicatePolicy, PlatformRegistry};
