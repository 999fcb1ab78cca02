//! `winplat init` — load the Windows module and list the result.

use anyhow::{bail, Result};
use serde::Serialize;
use winplat_host::{HostContext, PlatformSummary};
use winplat_windows::{InitReport, Skip, NAMESPACE};

use super::{load_windows, HostOptions};

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct InitOutput<'a> {
    platforms: Vec<PlatformSummary>,
    format_defaults: Vec<FormatDefault<'a>>,
    report: &'a InitReport,
}

#[derive(Serialize)]
struct FormatDefault<'a> {
    format: &'a str,
    architecture: &'a str,
    platform: &'a str,
}

/// Run the Windows module and print what it published.
pub fn run(options: &HostOptions, format: Option<&str>) -> Result<()> {
    let (host, report) = load_windows(options)?;
    match format.unwrap_or("text") {
        "text" => print_text(&host, &report),
        "json" => print_json(&host, &report)?,
        other => bail!("unknown format: '{other}' (expected text or json)"),
    }
    Ok(())
}

fn print_text(host: &HostContext, report: &InitReport) {
    println!("Published platforms ({NAMESPACE}):");
    for built in &report.built {
        let missing: Vec<_> = built.missing().collect();
        if missing.is_empty() {
            println!("  {:<20} {}", built.platform, built.architecture);
        } else {
            println!(
                "  {:<20} {} (missing: {})",
                built.platform,
                built.architecture,
                missing.join(", ")
            );
        }
    }

    if !report.skipped.is_empty() {
        println!();
        println!("Skipped:");
        for skip in &report.skipped {
            match skip {
                Skip::MissingArchitecture { architecture } => {
                    println!("  {architecture:<20} architecture not loaded")
                }
                Skip::SiblingNotReady {
                    architecture,
                    sibling,
                } => println!("  {architecture:<20} mode sibling {sibling} not loaded"),
            }
        }
    }

    println!();
    println!("Format defaults:");
    for (format, arch, platform) in host.default_platforms.entries() {
        println!("  {format}/{arch:<16} {}", platform.name());
    }
}

fn print_json(host: &HostContext, report: &InitReport) -> Result<()> {
    let output = InitOutput {
        platforms: host
            .platforms
            .platforms(NAMESPACE)
            .iter()
            .map(|p| p.summary())
            .collect(),
        format_defaults: host
            .default_platforms
            .entries()
            .into_iter()
            .map(|(format, architecture, platform)| FormatDefault {
                format,
                architecture,
                platform: platform.name(),
            })
            .collect(),
        report,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
