//! Error types for host registry operations.

use std::path::PathBuf;

/// Errors that can occur while populating or querying the host registries.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// An architecture with this name is already registered.
    #[error("architecture '{name}' already registered")]
    DuplicateArchitecture { name: String },

    /// No architecture with this name is registered.
    #[error("unknown architecture: {name}")]
    UnknownArchitecture { name: String },

    /// A calling convention with this name already exists for the architecture.
    #[error("calling convention '{name}' already registered for architecture '{architecture}'")]
    DuplicateCallingConvention { architecture: String, name: String },

    /// A calling convention was offered to a platform bound to another architecture.
    #[error(
        "calling convention '{convention}' belongs to '{convention_arch}', \
         but platform '{platform}' is bound to '{platform_arch}'"
    )]
    ArchitectureMismatch {
        platform: String,
        platform_arch: String,
        convention: String,
        convention_arch: String,
    },

    /// A related-platform link whose target is not built for the key architecture.
    #[error(
        "platform '{target}' is bound to '{target_arch}' and cannot be related \
         to '{platform}' under architecture '{key_arch}'"
    )]
    RelatedArchitectureMismatch {
        platform: String,
        key_arch: String,
        target: String,
        target_arch: String,
    },

    /// A platform name is already published in the namespace.
    #[error("platform '{name}' already registered in namespace '{namespace}'")]
    DuplicatePlatform { namespace: String, name: String },

    /// A required module dependency is not loaded.
    #[error("module '{module}' requires '{dependency}', which is not loaded")]
    MissingDependency { module: String, dependency: String },

    /// A module reported failure from its initialization entry point.
    #[error("module '{module}' did not initialize")]
    ModuleInitFailed { module: String },

    /// A module with this name is already loaded.
    #[error("module '{module}' already loaded")]
    ModuleAlreadyLoaded { module: String },

    /// Host description file not found.
    #[error("host description not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// I/O error reading a host description.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for host operations.
pub type Result<T> = std::result::Result<T, HostError>;
