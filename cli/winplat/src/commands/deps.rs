//! `winplat deps` — the module dependency declaration.

use anyhow::Result;
use winplat_host::HostModule;
use winplat_windows::WindowsModule;

/// Print the Windows module's declared dependencies.
pub fn run() -> Result<()> {
    let module = WindowsModule::new();
    println!("{} depends on:", module.name());
    for dep in module.dependencies() {
        let kind = if dep.optional { "optional" } else { "required" };
        println!("  {:<12} {kind}", dep.name);
    }
    Ok(())
}
