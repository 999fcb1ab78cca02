//! winplat CLI — builds a host, registers the Windows platforms, and reports them.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "winplat", version, about = "Windows platform registry")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options selecting the host description.
#[derive(clap::Args, Clone, Debug, Default)]
struct HostArgs {
    /// Host description TOML (default: built-in host)
    #[arg(long)]
    host: Option<PathBuf>,
    /// Treat an architecture module as not loaded (repeatable)
    #[arg(long = "without", value_name = "MODULE")]
    without: Vec<String>,
    /// Replace platforms published twice instead of failing
    #[arg(long)]
    replace: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the Windows module and list what it registered
    Init {
        #[command(flatten)]
        host: HostArgs,
        /// Output format (text, json)
        #[arg(long)]
        format: Option<String>,
    },
    /// Show one published platform
    Describe {
        /// Platform name (e.g., windows-x86_64)
        name: String,
        #[command(flatten)]
        host: HostArgs,
    },
    /// Show the module dependency declaration
    Deps,
    /// Validate and print a host description
    Host {
        /// Host description TOML (default: built-in host)
        #[arg(long)]
        host: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init { host, format } => {
            let options = commands::HostOptions::from(host);
            commands::init::run(&options, format.as_deref())
        }
        Commands::Describe { name, host } => {
            let options = commands::HostOptions::from(host);
            commands::describe::run(&options, &name)
        }
        Commands::Deps => commands::deps::run(),
        Commands::Host { host } => commands::host::run(host.as_deref()),
    }
}

impl From<HostArgs> for commands::HostOptions {
    fn from(args: HostArgs) -> Self {
        commands::HostOptions {
            path: args.host,
            without: args.without,
            replace: args.replace,
        }
    }
}
