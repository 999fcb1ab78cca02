//! Platform model.
//!
//! A platform binds one architecture to an operating-system ABI environment:
//! the calling conventions available there, the default one, and which
//! convention plays each named role. Platforms are mutable only until they
//! are published in a [`PlatformRegistry`](crate::registry::PlatformRegistry).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::arch::{Architecture, CallingConvention};
use crate::error::{HostError, Result};

/// Named calling-convention role slots of a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// The platform's cdecl-equivalent convention.
    Cdecl,
    /// The platform's fastcall-equivalent convention.
    Fastcall,
    /// The platform's stdcall-equivalent convention.
    Stdcall,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Role; 3] = [Role::Cdecl, Role::Fastcall, Role::Stdcall];

    /// Lowercase role name.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Cdecl => "cdecl",
            Role::Fastcall => "fastcall",
            Role::Stdcall => "stdcall",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named binding of an architecture to an OS environment.
#[derive(Debug, Clone)]
pub struct Platform {
    name: String,
    arch: Arc<Architecture>,
    conventions: Vec<Arc<CallingConvention>>,
    default: Option<Arc<CallingConvention>>,
    roles: BTreeMap<Role, Arc<CallingConvention>>,
    /// Architecture name -> related platform name.
    related: BTreeMap<String, String>,
}

impl Platform {
    /// Create an empty platform bound to `arch`.
    pub fn new(arch: Arc<Architecture>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arch,
            conventions: Vec::new(),
            default: None,
            roles: BTreeMap::new(),
            related: BTreeMap::new(),
        }
    }

    /// Platform name, unique within its namespace.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Architecture this platform is bound to.
    pub fn architecture(&self) -> &Arc<Architecture> {
        &self.arch
    }

    /// Register a calling convention.
    ///
    /// The first convention registered under a name wins; registering the
    /// name again returns the instance already held. Conventions of other
    /// architectures are rejected.
    pub fn register_calling_convention(
        &mut self,
        cc: Arc<CallingConvention>,
    ) -> Result<Arc<CallingConvention>> {
        if !cc.is_for(&self.arch) {
            return Err(HostError::ArchitectureMismatch {
                platform: self.name.clone(),
                platform_arch: self.arch.name.clone(),
                convention: cc.name.clone(),
                convention_arch: cc.architecture.clone(),
            });
        }
        if let Some(existing) = self.calling_convention(&cc.name) {
            return Ok(Arc::clone(existing));
        }
        self.conventions.push(Arc::clone(&cc));
        Ok(cc)
    }

    /// Register `cc` and make it the default calling convention.
    pub fn set_default_calling_convention(&mut self, cc: Arc<CallingConvention>) -> Result<()> {
        let cc = self.register_calling_convention(cc)?;
        self.default = Some(cc);
        Ok(())
    }

    /// Register `cc` and bind it to `role`.
    pub fn set_role(&mut self, role: Role, cc: Arc<CallingConvention>) -> Result<()> {
        let cc = self.register_calling_convention(cc)?;
        self.roles.insert(role, cc);
        Ok(())
    }

    /// Registered conventions, in registration order.
    pub fn calling_conventions(&self) -> &[Arc<CallingConvention>] {
        &self.conventions
    }

    /// A registered convention by name, whether or not it fills a role.
    pub fn calling_convention(&self, name: &str) -> Option<&Arc<CallingConvention>> {
        self.conventions.iter().find(|cc| cc.name == name)
    }

    pub fn default_calling_convention(&self) -> Option<&Arc<CallingConvention>> {
        self.default.as_ref()
    }

    /// Convention bound to `role`, if any.
    pub fn role(&self, role: Role) -> Option<&Arc<CallingConvention>> {
        self.roles.get(&role)
    }

    /// All role bindings.
    pub fn roles(&self) -> impl Iterator<Item = (Role, &Arc<CallingConvention>)> {
        self.roles.iter().map(|(role, cc)| (*role, cc))
    }

    /// Link this platform to `other` for when the processor runs in `arch` mode.
    ///
    /// The link is one-directional. `other` must be bound to `arch`.
    pub fn add_related_platform(&mut self, arch: &Architecture, other: &Platform) -> Result<()> {
        if other.arch.name != arch.name {
            return Err(HostError::RelatedArchitectureMismatch {
                platform: self.name.clone(),
                key_arch: arch.name.clone(),
                target: other.name.clone(),
                target_arch: other.arch.name.clone(),
            });
        }
        self.related.insert(arch.name.clone(), other.name.clone());
        Ok(())
    }

    /// Link two mode-sibling platforms to each other.
    ///
    /// Either both directions are recorded or, on error, neither is.
    pub fn link_mode_siblings(a: &mut Platform, b: &mut Platform) -> Result<()> {
        if a.arch.name == b.arch.name {
            return Err(HostError::RelatedArchitectureMismatch {
                platform: a.name.clone(),
                key_arch: b.arch.name.clone(),
                target: b.name.clone(),
                target_arch: b.arch.name.clone(),
            });
        }
        let b_arch = Arc::clone(&b.arch);
        let a_arch = Arc::clone(&a.arch);
        a.add_related_platform(&b_arch, b)?;
        b.add_related_platform(&a_arch, a)?;
        Ok(())
    }

    /// Name of the platform related under `arch`, if linked.
    pub fn related_platform_name(&self, arch: &str) -> Option<&str> {
        self.related.get(arch).map(String::as_str)
    }

    /// All related-platform links as (architecture, platform name).
    pub fn related_platforms(&self) -> impl Iterator<Item = (&str, &str)> {
        self.related.iter().map(|(a, p)| (a.as_str(), p.as_str()))
    }

    /// Serializable name-level view of this platform.
    pub fn summary(&self) -> PlatformSummary {
        PlatformSummary {
            name: self.name.clone(),
            architecture: self.arch.name.clone(),
            calling_conventions: self.conventions.iter().map(|cc| cc.name.clone()).collect(),
            default_calling_convention: self.default.as_ref().map(|cc| cc.name.clone()),
            roles: self
                .roles
                .iter()
                .map(|(role, cc)| (*role, cc.name.clone()))
                .collect(),
            related: self.related.clone(),
        }
    }
}

/// Name-level snapshot of a platform, suitable for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformSummary {
    pub name: String,
    pub architecture: String,
    pub calling_conventions: Vec<String>,
    pub default_calling_convention: Option<String>,
    pub roles: BTreeMap<Role, String>,
    pub related: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x86() -> Arc<Architecture> {
        Arc::new(Architecture::new("x86", 4))
    }

    fn cc(arch: &Architecture, name: &str) -> Arc<CallingConvention> {
        Arc::new(CallingConvention::new(arch, name))
    }

    #[test]
    fn duplicate_registration_keeps_first_instance() {
        let arch = x86();
        let mut p = Platform::new(Arc::clone(&arch), "windows-x86");
        let first = cc(&arch, "cdecl");
        let mut second = CallingConvention::new(&arch, "cdecl");
        second.stack_alignment = 16;

        p.register_calling_convention(Arc::clone(&first)).unwrap();
        let held = p.register_calling_convention(Arc::new(second)).unwrap();

        assert_eq!(p.calling_conventions().len(), 1);
        assert!(Arc::ptr_eq(&held, &first));
        assert_eq!(p.calling_convention("cdecl").unwrap().stack_alignment, 4);
    }

    #[test]
    fn default_is_registered() {
        let arch = x86();
        let mut p = Platform::new(Arc::clone(&arch), "windows-x86");
        p.set_default_calling_convention(cc(&arch, "cdecl")).unwrap();
        let default = p.default_calling_convention().unwrap();
        assert!(p
            .calling_conventions()
            .iter()
            .any(|registered| Arc::ptr_eq(registered, default)));
    }

    #[test]
    fn role_binds_registered_instance() {
        let arch = x86();
        let mut p = Platform::new(Arc::clone(&arch), "windows-x86");
        let first = cc(&arch, "stdcall");
        p.register_calling_convention(Arc::clone(&first)).unwrap();
        p.set_role(Role::Stdcall, cc(&arch, "stdcall")).unwrap();
        assert!(Arc::ptr_eq(p.role(Role::Stdcall).unwrap(), &first));
        assert!(p.role(Role::Fastcall).is_none());
    }

    #[test]
    fn one_convention_fills_many_roles() {
        let arch = Arc::new(Architecture::new("x86_64", 8));
        let mut p = Platform::new(Arc::clone(&arch), "windows-x86_64");
        let win64 = cc(&arch, "win64");
        p.set_default_calling_convention(Arc::clone(&win64)).unwrap();
        for role in Role::ALL {
            p.set_role(role, Arc::clone(&win64)).unwrap();
        }
        assert_eq!(p.calling_conventions().len(), 1);
        assert_eq!(p.roles().count(), 3);
    }

    #[test]
    fn foreign_convention_rejected() {
        let arch = x86();
        let arm = Architecture::new("armv7", 4);
        let mut p = Platform::new(arch, "windows-x86");
        let err = p.register_calling_convention(cc(&arm, "cdecl")).unwrap_err();
        assert!(matches!(err, HostError::ArchitectureMismatch { .. }));
        assert!(p.calling_conventions().is_empty());
    }

    #[test]
    fn related_link_requires_matching_architecture() {
        let arm = Arc::new(Architecture::new("armv7", 4));
        let thumb = Arc::new(Architecture::new("thumb2", 4));
        let mut a = Platform::new(Arc::clone(&arm), "windows-armv7");
        let t = Platform::new(Arc::clone(&thumb), "windows-thumb2");

        let err = a.add_related_platform(&arm, &t).unwrap_err();
        assert!(matches!(err, HostError::RelatedArchitectureMismatch { .. }));
        assert!(a.related_platform_name("armv7").is_none());

        a.add_related_platform(&thumb, &t).unwrap();
        assert_eq!(a.related_platform_name("thumb2"), Some("windows-thumb2"));
    }

    #[test]
    fn sibling_link_is_bidirectional() {
        let arm = Arc::new(Architecture::new("armv7", 4));
        let thumb = Arc::new(Architecture::new("thumb2", 4));
        let mut a = Platform::new(arm, "windows-armv7");
        let mut t = Platform::new(thumb, "windows-thumb2");
        Platform::link_mode_siblings(&mut a, &mut t).unwrap();
        assert_eq!(a.related_platform_name("thumb2"), Some("windows-thumb2"));
        assert_eq!(t.related_platform_name("armv7"), Some("windows-armv7"));
    }

    #[test]
    fn sibling_link_on_same_architecture_sets_nothing() {
        let arm = Arc::new(Architecture::new("armv7", 4));
        let mut a = Platform::new(Arc::clone(&arm), "windows-armv7");
        let mut b = Platform::new(arm, "other-armv7");
        assert!(Platform::link_mode_siblings(&mut a, &mut b).is_err());
        assert_eq!(a.related_platforms().count(), 0);
        assert_eq!(b.related_platforms().count(), 0);
    }

    #[test]
    fn summary_lists_names() {
        let arch = x86();
        let mut p = Platform::new(Arc::clone(&arch), "windows-x86");
        p.set_default_calling_convention(cc(&arch, "cdecl")).unwrap();
        p.set_role(Role::Cdecl, cc(&arch, "cdecl")).unwrap();
        p.register_calling_convention(cc(&arch, "thiscall")).unwrap();
        let s = p.summary();
        assert_eq!(s.calling_conventions, vec!["cdecl", "thiscall"]);
        assert_eq!(s.default_calling_convention.as_deref(), Some("cdecl"));
        assert_eq!(s.roles.get(&Role::Cdecl).map(String::as_str), Some("cdecl"));
    }
}
