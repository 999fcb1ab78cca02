//! `winplat host` — validate and print a host description.

use std::path::Path;

use anyhow::{bail, Result};

use super::load_config;

/// Print the host description as TOML after validating it.
pub fn run(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    if let Err(issues) = config.validate() {
        for issue in &issues {
            eprintln!("{}: {}", issue.severity, issue.message);
        }
        bail!("host description has {} problem(s)", issues.len());
    }
    print!("{}", config.to_toml()?);
    Ok(())
}
