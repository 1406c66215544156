//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Control CLI for sizing off-grid PV installations."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use anyhow::Result;
use clap::Args;
use solardim_calc_engine::{compare_panel_wattages, project::build_request};
use solardim_common::AppConfig;

use crate::project::ProjectArgs;

#[derive(Debug, Args)]
pub struct CompareCommand {
    #[command(flatten)]
    project: ProjectArgs,

    /// Candidate wattages, comma separated (defaults to the configured list).
    #[arg(long, value_name = "WC", value_delimiter = ',')]
    wattages: Vec<f64>,

    /// Print the table as JSON.
    #[arg(long)]
    json: bool,
}

impl CompareCommand {
    pub fn execute(&self, config: &AppConfig) -> Result<()> {
        let project = self.project.load(config)?;
        let (request, _) = build_request(&project, &config.project_options())?;
        let wattages = if self.wattages.is_empty() {
            &config.sizing.comparison_wattages
        } else {
            &self.wattages
        };

        let options = compare_panel_wattages(&request, wattages, &config.sizing)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&options)?);
            return Ok(());
        }
        println!(
            "{:>8} {:>7} {:>12} {:>10} {:>10} {:>9}",
            "Wc", "panels", "installed", "oversize", "surface", "warnings"
        );
        for option in &options {
            let surface = option
                .surface_m2
                .map(|s| format!("{s:.2}"))
                .unwrap_or_else(|| "-".to_owned());
            println!(
                "{:>8} {:>7} {:>12.2} {:>10.2} {:>10} {:>9}",
                option.panel_power_wc,
                option.panel_count,
                option.installed_wc,
                option.oversize_wc,
                surface,
                option.warning_count
            );
        }
        Ok(())
    }
}
