//! Host descriptions: which architecture modules are loaded and what they provide.
//!
//! A host description is a TOML document listing architecture support
//! modules, the architectures each one registers, and each architecture's
//! calling conventions:
//!
//! ```toml
//! [[module]]
//! name = "arch_x86"
//!
//! [[module.architecture]]
//! name = "x86"
//! address-size = 4
//!
//! [[module.architecture.calling-convention]]
//! name = "cdecl"
//! return-registers = ["eax", "edx"]
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::arch::{Architecture, CallingConvention, Endianness};
use crate::error::{HostError, Result};
use crate::module::HostContext;
use crate::registry::DuplicatePolicy;

/// A complete host description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleConfig>,
}

/// One architecture support module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub name: String,
    #[serde(default, rename = "architecture")]
    pub architectures: Vec<ArchitectureConfig>,
}

/// One architecture and the conventions it provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArchitectureConfig {
    pub name: String,
    /// Pointer size in bytes.
    pub address_size: u32,
    #[serde(default)]
    pub endianness: Endianness,
    #[serde(default, rename = "calling-convention")]
    pub calling_conventions: Vec<ConventionConfig>,
}

/// One calling convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConventionConfig {
    pub name: String,
    #[serde(default)]
    pub argument_registers: Vec<String>,
    #[serde(default)]
    pub return_registers: Vec<String>,
    #[serde(default)]
    pub callee_saved: Vec<String>,
    /// Defaults to the architecture's address size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_alignment: Option<u32>,
}

/// A problem found in a host description.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl HostConfig {
    /// Parse a host description from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load a host description from a file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HostError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Drop the named modules, as if their support was never loaded.
    pub fn without_modules(mut self, names: &[&str]) -> Self {
        self.modules.retain(|m| !names.contains(&m.name.as_str()));
        self
    }

    /// Look up a module by name.
    pub fn module(&self, name: &str) -> Option<&ModuleConfig> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Check the description for structural problems.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        let mut module_names = BTreeSet::new();
        let mut arch_names = BTreeSet::new();

        for module in &self.modules {
            if module.name.is_empty() {
                issues.push(ValidationIssue {
                    severity: "error",
                    message: "module with empty name".into(),
                });
            } else if !module_names.insert(module.name.as_str()) {
                issues.push(ValidationIssue {
                    severity: "error",
                    message: format!("module '{}' listed more than once", module.name),
                });
            }

            if module.architectures.is_empty() {
                issues.push(ValidationIssue {
                    severity: "warning",
                    message: format!("module '{}' provides no architectures", module.name),
                });
            }

            for arch in &module.architectures {
                if arch.name.is_empty() {
                    issues.push(ValidationIssue {
                        severity: "error",
                        message: format!("module '{}' has an architecture with empty name", module.name),
                    });
                } else if !arch_names.insert(arch.name.as_str()) {
                    issues.push(ValidationIssue {
                        severity: "error",
                        message: format!("architecture '{}' defined more than once", arch.name),
                    });
                }

                if arch.address_size == 0 {
                    issues.push(ValidationIssue {
                        severity: "error",
                        message: format!("architecture '{}' has zero address size", arch.name),
                    });
                }

                let mut cc_names = BTreeSet::new();
                for cc in &arch.calling_conventions {
                    if cc.name.is_empty() {
                        issues.push(ValidationIssue {
                            severity: "error",
                            message: format!(
                                "architecture '{}' has a calling convention with empty name",
                                arch.name
                            ),
                        });
                    } else if !cc_names.insert(cc.name.as_str()) {
                        issues.push(ValidationIssue {
                            severity: "error",
                            message: format!(
                                "calling convention '{}' defined more than once for '{}'",
                                cc.name, arch.name
                            ),
                        });
                    }
                }
            }
        }

        if issues.iter().any(|i| i.severity == "error") {
            Err(issues)
        } else {
            for issue in &issues {
                log::warn!("host description: {}", issue.message);
            }
            Ok(())
        }
    }

    /// Register every described architecture module into a fresh host.
    pub fn into_context(self, policy: DuplicatePolicy) -> Result<HostContext> {
        let mut host = HostContext::new(policy);
        for module in self.modules {
            for arch_cfg in module.architectures {
                let arch = host.catalog.register_architecture(Architecture {
                    name: arch_cfg.name,
                    address_size: arch_cfg.address_size,
                    endianness: arch_cfg.endianness,
                })?;
                for cc in arch_cfg.calling_conventions {
                    host.catalog.register_calling_convention(CallingConvention {
                        name: cc.name,
                        architecture: arch.name.clone(),
                        argument_registers: cc.argument_registers,
                        return_registers: cc.return_registers,
                        callee_saved: cc.callee_saved,
                        stack_alignment: cc.stack_alignment.unwrap_or(arch.address_size),
                    })?;
                }
            }
            host.mark_loaded(&module.name)?;
        }
        Ok(host)
    }

    /// The standard host: x86, ARMv7/Thumb-2, and ARM64 support modules.
    pub fn builtin() -> Self {
        let x86_stack = ["ebx", "esi", "edi", "ebp"];
        let arm_saved = ["r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11"];
        let arm_cdecl = || convention("cdecl", &["r0", "r1", "r2", "r3"], &["r0", "r1"], &arm_saved, 8);

        Self {
            modules: vec![
                ModuleConfig {
                    name: "arch_x86".into(),
                    architectures: vec![
                        architecture(
                            "x86",
                            4,
                            vec![
                                convention("cdecl", &[], &["eax", "edx"], &x86_stack, 4),
                                convention("fastcall", &["ecx", "edx"], &["eax", "edx"], &x86_stack, 4),
                                convention("stdcall", &[], &["eax", "edx"], &x86_stack, 4),
                                convention("thiscall", &["ecx"], &["eax", "edx"], &x86_stack, 4),
                                convention("regparm", &["eax", "edx", "ecx"], &["eax", "edx"], &x86_stack, 4),
                            ],
                        ),
                        architecture(
                            "x86_64",
                            8,
                            vec![
                                convention(
                                    "win64",
                                    &["rcx", "rdx", "r8", "r9"],
                                    &["rax"],
                                    &["rbx", "rbp", "rdi", "rsi", "r12", "r13", "r14", "r15"],
                                    16,
                                ),
                                convention(
                                    "sysv",
                                    &["rdi", "rsi", "rdx", "rcx", "r8", "r9"],
                                    &["rax", "rdx"],
                                    &["rbx", "rbp", "r12", "r13", "r14", "r15"],
                                    16,
                                ),
                            ],
                        ),
                    ],
                },
                ModuleConfig {
                    name: "arch_armv7".into(),
                    architectures: vec![
                        architecture("armv7", 4, vec![arm_cdecl()]),
                        architecture("thumb2", 4, vec![arm_cdecl()]),
                    ],
                },
                ModuleConfig {
                    name: "arch_arm64".into(),
                    architectures: vec![architecture(
                        "aarch64",
                        8,
                        vec![convention(
                            "cdecl",
                            &["x0", "x1", "x2", "x3", "x4", "x5", "x6", "x7"],
                            &["x0", "x1"],
                            &["x19", "x20", "x21", "x22", "x23", "x24", "x25", "x26", "x27", "x28"],
                            16,
                        )],
                    )],
                },
            ],
        }
    }
}

fn architecture(name: &str, address_size: u32, ccs: Vec<ConventionConfig>) -> ArchitectureConfig {
    ArchitectureConfig {
        name: name.into(),
        address_size,
        endianness: Endianness::Little,
        calling_conventions: ccs,
    }
}

fn convention(
    name: &str,
    args: &[&str],
    ret: &[&str],
    saved: &[&str],
    alignment: u32,
) -> ConventionConfig {
    ConventionConfig {
        name: name.into(),
        argument_registers: owned(args),
        return_registers: owned(ret),
        callee_saved: owned(saved),
        stack_alignment: Some(alignment),
    }
}

fn owned(regs: &[&str]) -> Vec<String> {
    regs.iter().map(|r| r.to_string()).collect()
}
