//! Architecture set and calling-convention catalog.
//!
//! The catalog is the host's record of which instruction-set architectures
//! are loaded and which named calling conventions each one provides.
//! Platform modules only query it; architecture support modules populate it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{HostError, Result};

/// Byte ordering of an architecture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// An instruction-set architecture known to the host.
///
/// Identity is the name: two values with the same name denote the same
/// architecture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Architecture {
    /// Unique architecture name (e.g., "x86_64", "thumb2").
    pub name: String,
    /// Pointer size in bytes.
    pub address_size: u32,
    /// Byte ordering.
    pub endianness: Endianness,
}

impl Architecture {
    /// Describe a little-endian architecture.
    pub fn new(name: impl Into<String>, address_size: u32) -> Self {
        Self {
            name: name.into(),
            address_size,
            endianness: Endianness::Little,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A named calling convention scoped to one architecture.
///
/// Instances are shared and never modified once registered in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallingConvention {
    /// Convention name (e.g., "cdecl", "win64").
    pub name: String,
    /// Name of the architecture this convention belongs to.
    pub architecture: String,
    /// Registers used for passing arguments.
    pub argument_registers: Vec<String>,
    /// Registers used for return values.
    pub return_registers: Vec<String>,
    /// Registers that the callee must preserve.
    pub callee_saved: Vec<String>,
    /// Required stack alignment in bytes.
    pub stack_alignment: u32,
}

impl CallingConvention {
    /// A convention with no register assignments, for the given architecture.
    pub fn new(architecture: &Architecture, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            architecture: architecture.name.clone(),
            argument_registers: Vec::new(),
            return_registers: Vec::new(),
            callee_saved: Vec::new(),
            stack_alignment: architecture.address_size,
        }
    }

    /// Whether this convention belongs to `arch`.
    pub fn is_for(&self, arch: &Architecture) -> bool {
        self.architecture == arch.name
    }
}

/// The host's architecture set together with each architecture's conventions.
#[derive(Debug, Default)]
pub struct CallingConventionCatalog {
    architectures: Vec<Arc<Architecture>>,
    conventions: HashMap<String, Vec<Arc<CallingConvention>>>,
}

impl CallingConventionCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an architecture to the host's architecture set.
    pub fn register_architecture(&mut self, arch: Architecture) -> Result<Arc<Architecture>> {
        if self.conventions.contains_key(&arch.name) {
            return Err(HostError::DuplicateArchitecture { name: arch.name });
        }
        let arch = Arc::new(arch);
        self.conventions.insert(arch.name.clone(), Vec::new());
        self.architectures.push(Arc::clone(&arch));
        log::debug!("registered architecture {}", arch.name);
        Ok(arch)
    }

    /// Add a calling convention to an already registered architecture.
    pub fn register_calling_convention(
        &mut self,
        cc: CallingConvention,
    ) -> Result<Arc<CallingConvention>> {
        let list = self
            .conventions
            .get_mut(&cc.architecture)
            .ok_or_else(|| HostError::UnknownArchitecture {
                name: cc.architecture.clone(),
            })?;
        if list.iter().any(|existing| existing.name == cc.name) {
            return Err(HostError::DuplicateCallingConvention {
                architecture: cc.architecture,
                name: cc.name,
            });
        }
        let cc = Arc::new(cc);
        list.push(Arc::clone(&cc));
        log::debug!("registered calling convention {}/{}", cc.architecture, cc.name);
        Ok(cc)
    }

    /// Look up a loaded architecture by name.
    pub fn lookup_architecture(&self, name: &str) -> Option<Arc<Architecture>> {
        self.architectures.iter().find(|a| a.name == name).cloned()
    }

    /// Look up a calling convention of `arch` by name.
    pub fn lookup_calling_convention(
        &self,
        arch: &Architecture,
        name: &str,
    ) -> Option<Arc<CallingConvention>> {
        self.conventions
            .get(&arch.name)?
            .iter()
            .find(|cc| cc.name == name)
            .cloned()
    }

    /// All conventions of `arch`, in registration order.
    pub fn calling_conventions(&self, arch: &Architecture) -> &[Arc<CallingConvention>] {
        self.conventions
            .get(&arch.name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All loaded architectures, in registration order.
    pub fn architectures(&self) -> &[Arc<Architecture>] {
        &self.architectures
    }
}
