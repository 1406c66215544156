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

use anyhow::{Context, Result};
use clap::Args;
use solardim_calc_engine::{
    io::{load_bills_from_jsonl, load_project_from_file},
    store::{FinancialSettings, ProjectFile},
};
use solardim_common::AppConfig;
use tracing::info;

/// Project inputs shared by the sizing subcommands.
#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Project description (YAML or JSON).
    #[arg(long, value_name = "FILE")]
    project: PathBuf,

    /// Extracted bill records, one JSON object per line; appended to the project's bills.
    #[arg(long, value_name = "FILE")]
    bills: Option<PathBuf>,
}

impl ProjectArgs {
    /// Reads the project and applies the configured installation cost when it has none.
    pub fn load(&self, config: &AppConfig) -> Result<ProjectFile> {
        let mut project = load_project_from_file(&self.project)
            .with_context(|| format!("unable to load project {}", self.project.display()))?;

        if let Some(path) = &self.bills {
            let bills = load_bills_from_jsonl(path)
                .with_context(|| format!("unable to load bills {}", path.display()))?;
            info!(count = bills.len(), path = %path.display(), "bill records loaded");
            project.bills.extend(bills);
        }

        if project.financials.is_none() && config.finance.installation_cost > 0.0 {
            project.financials = Some(FinancialSettings {
                tariff_per_kwh: None,
                installation_cost: config.finance.installation_cost,
            });
        }
        Ok(project)
    }
}
