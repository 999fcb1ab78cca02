//! Calling-convention role table for Windows platforms.
//!
//! Each architecture family lists the conventions its Windows platform
//! looks up, in lookup order, and what each one is bound to once found.

use serde::Serialize;
use winplat_host::Role;

/// One convention lookup and the slots it fills when found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConventionRule {
    /// Name looked up in the calling-convention catalog.
    pub name: &'static str,
    /// Whether the convention becomes the platform default.
    pub default: bool,
    /// Named roles the convention is bound to.
    pub roles: &'static [Role],
}

/// Architecture families with distinct Windows role tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchFamily {
    /// 32-bit x86.
    X86,
    /// 64-bit x86.
    X86_64,
    /// 32-bit ARM, in either the standard or the compact (Thumb-2) encoding.
    Arm,
    /// 64-bit ARM.
    Aarch64,
}

const ALL_ROLES: &[Role] = &Role::ALL;

const X86_RULES: &[ConventionRule] = &[
    ConventionRule {
        name: "cdecl",
        default: true,
        roles: &[Role::Cdecl],
    },
    ConventionRule {
        name: "fastcall",
        default: false,
        roles: &[Role::Fastcall],
    },
    ConventionRule {
        name: "stdcall",
        default: false,
        roles: &[Role::Stdcall],
    },
    ConventionRule {
        name: "thiscall",
        default: false,
        roles: &[],
    },
    // Register convention emitted by Borland compilers.
    ConventionRule {
        name: "regparm",
        default: false,
        roles: &[],
    },
];

// The x64 ABI has a single convention; every role resolves to it.
const X86_64_RULES: &[ConventionRule] = &[ConventionRule {
    name: "win64",
    default: true,
    roles: ALL_ROLES,
}];

const ARM_RULES: &[ConventionRule] = &[ConventionRule {
    name: "cdecl",
    default: true,
    roles: ALL_ROLES,
}];

impl ArchFamily {
    /// Conventions to look up, in order.
    pub fn conventions(self) -> &'static [ConventionRule] {
        match self {
            ArchFamily::X86 => X86_RULES,
            ArchFamily::X86_64 => X86_64_RULES,
            ArchFamily::Arm | ArchFamily::Aarch64 => ARM_RULES,
        }
    }

    /// Name of the convention that becomes the default, if the table names one.
    pub fn default_convention(self) -> Option<&'static str> {
        self.conventions()
            .iter()
            .find(|rule| rule.default)
            .map(|rule| rule.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x86_binds_three_roles_and_registers_five() {
        let rules = ArchFamily::X86.conventions();
        let names: Vec<_> = rules.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["cdecl", "fastcall", "stdcall", "thiscall", "regparm"]);
        let bound: usize = rules.iter().map(|r| r.roles.len()).sum();
        assert_eq!(bound, 3);
        assert_eq!(ArchFamily::X86.default_convention(), Some("cdecl"));
    }

    #[test]
    fn unified_families_use_one_convention_for_everything() {
        for (family, name) in [
            (ArchFamily::X86_64, "win64"),
            (ArchFamily::Arm, "cdecl"),
            (ArchFamily::Aarch64, "cdecl"),
        ] {
            let rules = family.conventions();
            assert_eq!(rules.len(), 1);
            assert_eq!(rules[0].name, name);
            assert!(rules[0].default);
            assert_eq!(rules[0].roles, &Role::ALL);
        }
    }

    #[test]
    fn exactly_one_default_per_family() {
        for family in [
            ArchFamily::X86,
            ArchFamily::X86_64,
            ArchFamily::Arm,
            ArchFamily::Aarch64,
        ] {
            let defaults = family.conventions().iter().filter(|r| r.default).count();
            assert_eq!(defaults, 1, "{family:?}");
        }
    }
}
