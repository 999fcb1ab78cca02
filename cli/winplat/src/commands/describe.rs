//! `winplat describe` — show one published platform.

use anyhow::{anyhow, Result};
use winplat_host::Role;
use winplat_windows::{NAMESPACE, PE_FORMAT};

use super::{load_windows, HostOptions};

/// Describe a platform in detail.
pub fn run(options: &HostOptions, name: &str) -> Result<()> {
    let (host, _) = load_windows(options)?;
    let platform = host.platforms.get(NAMESPACE, name).ok_or_else(|| {
        anyhow!("unknown platform: '{name}'. Use 'winplat init' to see published platforms.")
    })?;
    let arch = platform.architecture();

    println!("=== Platform: {} ===", platform.name());
    println!("Architecture: {} ({} bytes, {:?})", arch.name, arch.address_size, arch.endianness);
    println!();

    println!("--- Calling conventions ---");
    for cc in platform.calling_conventions() {
        println!(
            "  {:<10} args [{}] ret [{}] align {}",
            cc.name,
            cc.argument_registers.join(", "),
            cc.return_registers.join(", "),
            cc.stack_alignment
        );
    }
    println!();

    println!("--- Roles ---");
    let default = platform
        .default_calling_convention()
        .map(|cc| cc.name.as_str())
        .unwrap_or("-");
    println!("  {:<10} {default}", "default");
    for role in Role::ALL {
        let bound = platform.role(role).map(|cc| cc.name.as_str()).unwrap_or("-");
        println!("  {:<10} {bound}", role.as_str());
    }

    let related: Vec<_> = platform.related_platforms().collect();
    if !related.is_empty() {
        println!();
        println!("--- Related platforms ---");
        for (arch, other) in related {
            println!("  {arch:<10} {other}");
        }
    }

    let is_default = host
        .default_platforms
        .default_platform(PE_FORMAT, &arch.name)
        .is_some_and(|p| p.name() == platform.name());
    if is_default {
        println!();
        println!("Default {PE_FORMAT} platform for {}", arch.name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_known_platform() {
        assert!(run(&HostOptions::default(), "windows-thumb2").is_ok());
    }

    #[test]
    fn describe_unknown_platform() {
        assert!(run(&HostOptions::default(), "windows-mips").is_err());
    }

    #[test]
    fn describe_platform_whose_module_is_absent() {
        let options = HostOptions {
            without: vec!["arch_arm64".into()],
            ..HostOptions::default()
        };
        assert!(run(&options, "windows-aarch64").is_err());
    }
}
