//! CLI command implementations.

pub mod deps;
pub mod describe;
pub mod host;
pub mod init;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use winplat_host::{DuplicatePolicy, HostConfig, HostContext};
use winplat_windows::{InitReport, WindowsModule};

/// How to build the host a command runs against.
#[derive(Debug, Clone, Default)]
pub struct HostOptions {
    pub path: Option<PathBuf>,
    pub without: Vec<String>,
    pub replace: bool,
}

/// Read the host description from `path`, or the built-in one.
pub fn load_config(path: Option<&Path>) -> Result<HostConfig> {
    match path {
        Some(path) => HostConfig::load(path)
            .with_context(|| format!("loading host description {}", path.display())),
        None => Ok(HostConfig::builtin()),
    }
}

/// Build the host and load the Windows module into it.
pub fn load_windows(options: &HostOptions) -> Result<(HostContext, InitReport)> {
    let config = load_config(options.path.as_deref())?;
    if let Err(issues) = config.validate() {
        for issue in &issues {
            eprintln!("{}: {}", issue.severity, issue.message);
        }
        bail!("invalid host description");
    }

    let without: Vec<&str> = options.without.iter().map(String::as_str).collect();
    let policy = if options.replace {
        DuplicatePolicy::Replace
    } else {
        DuplicatePolicy::Reject
    };
    let mut host = config
        .without_modules(&without)
        .into_context(policy)
        .context("building host")?;
    log::debug!(
        "host modules: {}",
        host.loaded_modules().collect::<Vec<_>>().join(", ")
    );

    let module = WindowsModule::new();
    host.load(&module)?;
    let report = module.take_report().unwrap_or_default();
    Ok((host, report))
}
