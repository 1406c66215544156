//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Sizing and profitability routines for off-grid PV planning."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    consumption::{summarize_bills, BillSummary},
    errors::{CalcEngineError, Result},
    model::usable,
    params::{
        SizingParameters, DEFAULT_PANEL_POWER_WC, DEFAULT_SYSTEM_VOLTAGE_V,
        DEFAULT_TARIFF_PER_KWH,
    },
    profitability::{compute_profitability, ProfitabilityResult},
    sizing::{compare_panel_wattages, size_system, PanelOption, SizingRequest, SizingResult},
    store::ProjectStore,
};

/// Caller defaults applied when the store does not pin a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectOptions {
    pub panel_power_wc: f64,
    pub system_voltage_v: f64,
    pub default_tariff_per_kwh: f64,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self {
            panel_power_wc: DEFAULT_PANEL_POWER_WC,
            system_voltage_v: DEFAULT_SYSTEM_VOLTAGE_V,
            default_tariff_per_kwh: DEFAULT_TARIFF_PER_KWH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectReport {
    pub name: Option<String>,
    pub bills: Option<BillSummary>,
    pub sizing: SizingResult,
    pub comparison: Vec<PanelOption>,
    pub profitability: Option<ProfitabilityResult>,
}

/// Assembles a sizing request from the stored project records.
pub fn build_request(
    store: &impl ProjectStore,
    options: &ProjectOptions,
) -> Result<(SizingRequest, Option<BillSummary>)> {
    let location = store
        .get_location()
        .ok_or_else(|| CalcEngineError::invalid("project has no site location"))?;

    let appliances = store.list_appliances();
    let bills = if appliances.is_empty() {
        summarize_bills(&store.list_bills())
    } else {
        None
    };

    let mut request = SizingRequest::new(location.hsp)
        .with_appliances(appliances)
        .with_panel_power(options.panel_power_wc)
        .with_system_voltage(options.system_voltage_v)
        .with_strings(store.get_strings());
    request.avg_daily_kwh = bills.as_ref().map(|b| b.average_daily_kwh);
    request.specific_yield_kwh_per_kwc = location.specific_yield_kwh_per_kwc();
    request.module = store.get_module();
    request.inverter = store.get_inverter();
    request.battery_unit = store.get_battery_unit();
    Ok((request, bills))
}

/// Sizes the stored project, tabulates panel options and, when priced, its profitability.
pub fn run_project(
    store: &impl ProjectStore,
    options: &ProjectOptions,
    params: &SizingParameters,
) -> Result<ProjectReport> {
    let (request, bills) = build_request(store, options)?;
    let sizing = size_system(&request, params)?;
    let comparison = compare_panel_wattages(&request, &params.comparison_wattages, params)?;

    let financials = store.get_financials().unwrap_or_default();
    let tariff = bills
        .as_ref()
        .and_then(|b| b.average_tariff)
        .or_else(|| usable(financials.tariff_per_kwh))
        .unwrap_or(options.default_tariff_per_kwh);

    let profitability = match sizing.estimated_annual_production_kwh {
        Some(production) if financials.installation_cost > 0.0 && production > 0.0 => Some(
            compute_profitability(financials.installation_cost, production, tariff)?,
        ),
        _ => {
            debug!("installation cost or production estimate missing; profitability skipped");
            None
        }
    };

    info!(
        project = store.project_name().as_deref().unwrap_or("unnamed"),
        panels = sizing.panel_count,
        warnings = sizing.warnings.len(),
        "project sized"
    );

    Ok(ProjectReport {
        name: store.project_name(),
        bills,
        sizing,
        comparison,
        profitability,
    })
}
