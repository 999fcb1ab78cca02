//! Platform registry and default-platform-for-format table.
//!
//! Published platforms are owned by the registry and shared as
//! `Arc<Platform>`; once published they are never modified.

use std::collections::HashMap;
use std::sync::Arc;

use crate::arch::Architecture;
use crate::error::{HostError, Result};
use crate::platform::Platform;

/// What to do when a platform name is published twice in one namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// The new platform replaces the old one in place.
    Replace,
    /// The second publication fails with [`HostError::DuplicatePlatform`].
    #[default]
    Reject,
}

/// Platforms grouped by OS namespace.
#[derive(Debug, Default)]
pub struct PlatformRegistry {
    policy: DuplicatePolicy,
    /// Namespace names in first-use order.
    order: Vec<String>,
    namespaces: HashMap<String, Vec<Arc<Platform>>>,
}

impl PlatformRegistry {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Publish a platform under `namespace`.
    pub fn register(&mut self, namespace: &str, platform: Platform) -> Result<Arc<Platform>> {
        let mut published = self.register_all(namespace, vec![platform])?;
        Ok(published.remove(0))
    }

    /// Publish a group of platforms under `namespace`.
    ///
    /// Conflicts are checked for the whole group before anything is
    /// inserted, so a rejected group leaves the registry unchanged.
    pub fn register_all(
        &mut self,
        namespace: &str,
        platforms: Vec<Platform>,
    ) -> Result<Vec<Arc<Platform>>> {
        if self.policy == DuplicatePolicy::Reject {
            for (i, p) in platforms.iter().enumerate() {
                let clashes_with_group = platforms[..i].iter().any(|q| q.name() == p.name());
                if clashes_with_group || self.get(namespace, p.name()).is_some() {
                    return Err(HostError::DuplicatePlatform {
                        namespace: namespace.to_string(),
                        name: p.name().to_string(),
                    });
                }
            }
        }

        if !self.namespaces.contains_key(namespace) {
            self.order.push(namespace.to_string());
        }
        let entries = self.namespaces.entry(namespace.to_string()).or_default();

        let mut published = Vec::with_capacity(platforms.len());
        for platform in platforms {
            let platform = Arc::new(platform);
            match entries.iter_mut().find(|p| p.name() == platform.name()) {
                Some(slot) => {
                    log::debug!("replacing platform {namespace}/{}", platform.name());
                    *slot = Arc::clone(&platform);
                }
                None => entries.push(Arc::clone(&platform)),
            }
            log::info!("registered platform {namespace}/{}", platform.name());
            published.push(platform);
        }
        Ok(published)
    }

    /// Look up a published platform by name.
    pub fn get(&self, namespace: &str, name: &str) -> Option<Arc<Platform>> {
        self.namespaces
            .get(namespace)?
            .iter()
            .find(|p| p.name() == name)
            .cloned()
    }

    /// All platforms of a namespace, in publication order.
    pub fn platforms(&self, namespace: &str) -> &[Arc<Platform>] {
        self.namespaces
            .get(namespace)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Platforms of a namespace bound to `arch`.
    pub fn platforms_for_architecture(&self, namespace: &str, arch: &str) -> Vec<Arc<Platform>> {
        self.platforms(namespace)
            .iter()
            .filter(|p| p.architecture().name == arch)
            .cloned()
            .collect()
    }

    /// Namespaces in first-use order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Resolve `platform`'s link for `arch` to the published instance.
    pub fn related_platform(
        &self,
        namespace: &str,
        platform: &Platform,
        arch: &str,
    ) -> Option<Arc<Platform>> {
        let name = platform.related_platform_name(arch)?;
        self.get(namespace, name)
            .filter(|related| related.architecture().name == arch)
    }
}

/// Side table of which platform a container-format loader should assume
/// for an architecture when nothing else identifies one.
#[derive(Debug, Default)]
pub struct DefaultPlatformTable {
    entries: HashMap<(String, String), Arc<Platform>>,
}

impl DefaultPlatformTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `platform` as the default for (`format`, `arch`).
    ///
    /// Last write wins; the replaced entry is returned.
    pub fn register_default_platform(
        &mut self,
        format: &str,
        arch: &Architecture,
        platform: Arc<Platform>,
    ) -> Option<Arc<Platform>> {
        log::debug!(
            "default platform for {format}/{} is {}",
            arch.name,
            platform.name()
        );
        self.entries
            .insert((format.to_string(), arch.name.clone()), platform)
    }

    pub fn default_platform(&self, format: &str, arch: &str) -> Option<Arc<Platform>> {
        self.entries
            .get(&(format.to_string(), arch.to_string()))
            .cloned()
    }

    /// All entries as (format, architecture, platform), sorted by key.
    pub fn entries(&self) -> Vec<(&str, &str, &Arc<Platform>)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|((format, arch), p)| (format.as_str(), arch.as_str(), p))
            .collect();
        entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
