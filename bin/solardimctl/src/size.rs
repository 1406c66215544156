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
use clap::Args;
use solardim_calc_engine::{analyze_project_with_options, project::ProjectReport};
use solardim_common::AppConfig;

use crate::project::ProjectArgs;

#[derive(Debug, Args)]
pub struct SizeCommand {
    #[command(flatten)]
    project: ProjectArgs,

    /// Panel wattage used when the project has no module datasheet.
    #[arg(long = "panel-wc", value_name = "WC")]
    panel_wc: Option<f64>,

    /// Battery system voltage used when neither inverter nor battery unit gives one.
    #[arg(long = "system-voltage", value_name = "VOLTS")]
    system_voltage: Option<f64>,

    /// Write JSON reports; without a value the configured reports directory is used.
    #[arg(long, value_name = "DIR", num_args = 0..=1)]
    output: Option<Option<PathBuf>>,

    /// Print the full report as JSON instead of a summary.
    #[arg(long)]
    json: bool,
}

impl SizeCommand {
    pub fn execute(&self, config: &AppConfig) -> Result<()> {
        let project = self.project.load(config)?;

        let mut options = config.project_options();
        if let Some(wc) = self.panel_wc {
            options.panel_power_wc = wc;
        }
        if let Some(volts) = self.system_voltage {
            options.system_voltage_v = volts;
        }

        let output_dir = self
            .output
            .as_ref()
            .map(|dir| dir.clone().unwrap_or_else(|| config.reports.directory.clone()));

        let summary =
            analyze_project_with_options(&project, &options, &config.sizing, output_dir.as_deref())?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary.report)?);
        } else {
            print_summary(&summary.report);
            if let Some(dir) = output_dir {
                println!("Reports written to {}", dir.display());
            }
        }
        Ok(())
    }
}

fn print_summary(report: &ProjectReport) {
    let sizing = &report.sizing;
    if let Some(name) = &report.name {
        println!("Project: {name}");
    }
    println!(
        "Consumption ({}): {:.2} kWh/day, peak load {:.0} W",
        sizing.source.as_str(),
        sizing.daily_energy_kwh,
        sizing.peak_load_w
    );
    if let Some(bills) = &report.bills {
        println!(
            "  from {} bill(s), average {:.2} kWh/day",
            bills.bill_count, bills.average_daily_kwh
        );
    }
    println!(
        "PV array: {:.2} Wc required, {} x {} Wc = {:.2} kWc installed",
        sizing.peak_power_required_wc,
        sizing.panel_count,
        sizing.panel_power_wc,
        sizing.installed_kwc
    );
    println!(
        "Battery: {:.2} Ah at {} V ({:.2} kWh)",
        sizing.battery.capacity_ah, sizing.battery.system_voltage_v, sizing.battery.capacity_kwh
    );
    println!(
        "Inverter: {:.0} W ({:.2} kVA)",
        sizing.inverter_rating_w, sizing.inverter_rating_kva
    );
    if let Some(production) = sizing.estimated_annual_production_kwh {
        println!("Estimated production: {production:.0} kWh/year");
    }
    if let Some(strings) = &sizing.string_configuration {
        for layout in &strings.strings {
            println!(
                "String {}: {} in series x {} in parallel ({} panels)",
                layout.index,
                layout.assigned_series,
                layout.assigned_parallel,
                layout.assigned_panels
            );
        }
    }
    if let Some(bank) = &sizing.battery_bank {
        println!(
            "Battery bank: {}S{}P ({} units, {} V, {} Ah)",
            bank.series, bank.parallel, bank.total_units, bank.pack_voltage_v, bank.capacity_ah
        );
    }
    if let Some(surface) = &sizing.surface {
        println!("Surface: {:.2} m2", surface.total_area_m2);
    }
    if let Some(profit) = &report.profitability {
        println!(
            "Profitability: savings {:.0}/year, payback {} years",
            profit.annual_savings, profit.payback_years
        );
    }
    for warning in &sizing.warnings {
        println!("warning: {warning}");
    }
}
