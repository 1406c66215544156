//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Sizing and profitability routines for off-grid PV planning."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Deterministic sizing engine for off-grid photovoltaic installations.
//!
//! Every computation is pure: identical inputs always give identical results,
//! so independent runs (for instance one per candidate panel wattage) may be
//! evaluated concurrently without coordination.

pub mod api;
pub mod array;
pub mod battery;
pub mod consumption;
pub mod errors;
pub mod io;
pub mod model;
pub mod params;
pub mod profitability;
pub mod project;
pub mod reports;
pub mod sizing;
pub mod store;
pub mod strings;
pub mod surface;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    params::SizingParameters,
    project::{run_project, ProjectOptions, ProjectReport},
    reports::ReportExporter,
    store::ProjectStore,
};

pub use errors::{CalcEngineError, Result};
pub use profitability::{compute_profitability, ProfitabilityResult};
pub use sizing::{compare_panel_wattages, size_system, PanelOption, SizingRequest, SizingResult};

/// Rounds to `decimals` places, exact ties going to the even neighbour.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SizingSummary {
    pub timestamp: DateTime<Utc>,
    pub report: ProjectReport,
}

impl SizingSummary {
    pub fn exporter(&self) -> ReportExporter<'_> {
        ReportExporter::new(self)
    }
}

/// Runs the full project pipeline and optionally writes the JSON reports.
pub fn analyze_project_with_options(
    store: &impl ProjectStore,
    options: &ProjectOptions,
    params: &SizingParameters,
    output_dir: Option<&std::path::Path>,
) -> Result<SizingSummary> {
    info!("Running project sizing...");
    let report = run_project(store, options, params)?;

    let summary = SizingSummary {
        timestamp: Utc::now(),
        report,
    };

    if let Some(dir) = output_dir {
        summary.exporter().export_all(dir)?;
    }

    Ok(summary)
}
