//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Control CLI for sizing off-grid PV installations."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use solardim_common::{init_tracing, AppConfig};
use tracing::debug;

mod compare;
mod profitability;
mod project;
mod size;

const CONFIG_CANDIDATES: [&str; 2] = ["solardim.toml", "configs/solardim.toml"];

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Off-grid photovoltaic sizing utility",
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to SOLARDIM_CONFIG, then ./solardim.toml).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Size panels, battery, inverter and strings for a project.
    Size(size::SizeCommand),
    /// Tabulate the sizing for several candidate panel wattages.
    Compare(compare::CompareCommand),
    /// Project the ten-year cash flow of an installation.
    Profitability(profitability::ProfitabilityCommand),
}

fn load_config(explicit: Option<&PathBuf>) -> Result<AppConfig> {
    match explicit {
        Some(path) => AppConfig::from_path(path),
        None => Ok(AppConfig::load_or_default(&CONFIG_CANDIDATES)?.config),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    init_tracing("solardimctl", &config.logging)?;
    debug!(command = ?cli.command, "dispatching");

    match cli.command {
        Commands::Size(cmd) => cmd.execute(&config),
        Commands::Compare(cmd) => cmd.execute(&config),
        Commands::Profitability(cmd) => cmd.execute(&config),
    }
}
