//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Sizing and profitability routines for off-grid PV planning."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Single-pass dimensioning of a complete off-grid system.
//!
//! Optional hardware data only gates enrichment steps here; the formulas in
//! the sibling modules always receive resolved values.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    array::{size_array, validate_hsp},
    battery::{
        battery_bank_configuration, battery_requirement, BatteryBankConfiguration,
        BatteryRequirement,
    },
    consumption::ConsumptionProfile,
    errors::{CalcEngineError, Result},
    model::{
        usable, Appliance, BatteryUnitSpec, ConsumptionSource, InverterSpec, ModuleSpec,
        StringInputSpec,
    },
    params::{SizingParameters, DEFAULT_PANEL_POWER_WC, DEFAULT_SYSTEM_VOLTAGE_V},
    profitability::estimate_annual_production,
    round_to,
    strings::{resolve_strings, StringConfiguration},
    surface::{surface, SurfaceEstimate},
};

/// Highest MPPT input index an inverter may expose.
const MAX_STRING_INPUTS: u8 = 2;

fn default_panel_power_wc() -> f64 {
    DEFAULT_PANEL_POWER_WC
}

fn default_system_voltage_v() -> f64 {
    DEFAULT_SYSTEM_VOLTAGE_V
}

/// Inputs of one sizing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingRequest {
    pub hsp: f64,
    #[serde(default)]
    pub appliances: Vec<Appliance>,
    /// Mean daily consumption from the billing history, used when no appliance is listed.
    #[serde(default)]
    pub avg_daily_kwh: Option<f64>,
    #[serde(default = "default_panel_power_wc")]
    pub panel_power_wc: f64,
    #[serde(default = "default_system_voltage_v")]
    pub system_voltage_v: f64,
    #[serde(default)]
    pub module: Option<ModuleSpec>,
    #[serde(default)]
    pub inverter: Option<InverterSpec>,
    #[serde(default)]
    pub strings: Vec<StringInputSpec>,
    #[serde(default)]
    pub battery_unit: Option<BatteryUnitSpec>,
    #[serde(default)]
    pub specific_yield_kwh_per_kwc: Option<f64>,
}

impl SizingRequest {
    pub fn new(hsp: f64) -> Self {
        Self {
            hsp,
            appliances: Vec::new(),
            avg_daily_kwh: None,
            panel_power_wc: DEFAULT_PANEL_POWER_WC,
            system_voltage_v: DEFAULT_SYSTEM_VOLTAGE_V,
            module: None,
            inverter: None,
            strings: Vec::new(),
            battery_unit: None,
            specific_yield_kwh_per_kwc: None,
        }
    }

    pub fn with_appliances(mut self, appliances: Vec<Appliance>) -> Self {
        self.appliances = appliances;
        self
    }

    pub fn with_bill_average(mut self, avg_daily_kwh: f64) -> Self {
        self.avg_daily_kwh = Some(avg_daily_kwh);
        self
    }

    pub fn with_panel_power(mut self, panel_power_wc: f64) -> Self {
        self.panel_power_wc = panel_power_wc;
        self
    }

    pub fn with_system_voltage(mut self, system_voltage_v: f64) -> Self {
        self.system_voltage_v = system_voltage_v;
        self
    }

    pub fn with_module(mut self, module: ModuleSpec) -> Self {
        self.module = Some(module);
        self
    }

    pub fn with_inverter(mut self, inverter: InverterSpec) -> Self {
        self.inverter = Some(inverter);
        self
    }

    pub fn with_strings(mut self, strings: Vec<StringInputSpec>) -> Self {
        self.strings = strings;
        self
    }

    pub fn with_battery_unit(mut self, unit: BatteryUnitSpec) -> Self {
        self.battery_unit = Some(unit);
        self
    }

    pub fn with_specific_yield(mut self, kwh_per_kwc: f64) -> Self {
        self.specific_yield_kwh_per_kwc = Some(kwh_per_kwc);
        self
    }

    fn consumption(&self, params: &SizingParameters) -> Result<ConsumptionProfile> {
        if !self.appliances.is_empty() {
            return ConsumptionProfile::from_appliances(&self.appliances);
        }
        match self.avg_daily_kwh {
            Some(avg) => ConsumptionProfile::from_bills(avg, params),
            None => Err(CalcEngineError::invalid(
                "no consumption source: supply appliances or an average daily consumption from bills",
            )),
        }
    }

    /// Module rating overrides the requested default.
    fn effective_panel_power(&self) -> f64 {
        self.module
            .as_ref()
            .and_then(|m| usable(m.rated_power_wc))
            .unwrap_or(self.panel_power_wc)
    }

    /// Inverter start voltage, then unit battery voltage, then the requested default.
    fn effective_system_voltage(&self) -> f64 {
        self.inverter
            .as_ref()
            .and_then(|inv| usable(inv.battery_start_voltage_v))
            .or_else(|| {
                self.battery_unit
                    .as_ref()
                    .and_then(|unit| usable(unit.voltage_v))
            })
            .unwrap_or(self.system_voltage_v)
    }

    /// Checks input indexes and returns the inputs to dispatch, in index order.
    fn string_inputs(&self) -> Result<(Vec<StringInputSpec>, Option<String>)> {
        if self.strings.len() > usize::from(MAX_STRING_INPUTS) {
            return Err(CalcEngineError::invalid(format!(
                "at most {MAX_STRING_INPUTS} string inputs are supported (got {})",
                self.strings.len()
            )));
        }
        let mut inputs = self.strings.clone();
        inputs.sort_by_key(|s| s.index);
        for pair in inputs.windows(2) {
            if pair[0].index == pair[1].index {
                return Err(CalcEngineError::invalid(format!(
                    "string input {} is declared twice",
                    pair[0].index
                )));
            }
        }
        if let Some(bad) = inputs
            .iter()
            .find(|s| s.index == 0 || s.index > MAX_STRING_INPUTS)
        {
            return Err(CalcEngineError::invalid(format!(
                "string input index must be 1 or 2 (got {})",
                bad.index
            )));
        }

        let declared = self
            .inverter
            .as_ref()
            .and_then(|inv| inv.input_count)
            .filter(|n| *n > 0);
        match declared {
            Some(count) if inputs.len() > usize::from(count) => {
                let note = format!(
                    "Inverter declares {count} PV input(s); {} extra string input(s) ignored",
                    inputs.len() - usize::from(count)
                );
                warn!("{note}");
                inputs.truncate(usize::from(count));
                Ok((inputs, Some(note)))
            }
            _ => Ok((inputs, None)),
        }
    }
}

/// Full dimensioning output. Enrichments are `None` when their data was absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    pub source: ConsumptionSource,
    pub daily_energy_wh: f64,
    pub daily_energy_kwh: f64,
    pub peak_load_w: f64,
    pub hsp: f64,
    pub peak_power_required_wc: f64,
    pub panel_power_wc: f64,
    pub panel_count: u32,
    pub installed_wc: f64,
    pub installed_kwc: f64,
    pub battery: BatteryRequirement,
    pub inverter_rating_w: f64,
    pub inverter_rating_kva: f64,
    pub estimated_annual_production_kwh: Option<f64>,
    pub string_configuration: Option<StringConfiguration>,
    pub surface: Option<SurfaceEstimate>,
    pub battery_bank: Option<BatteryBankConfiguration>,
    /// Every constraint warning raised during the run, in evaluation order.
    pub warnings: Vec<String>,
}

/// Sizes panels, battery, inverter and the optional enrichments for one request.
pub fn size_system(request: &SizingRequest, params: &SizingParameters) -> Result<SizingResult> {
    params.validate()?;
    validate_hsp(request.hsp, params.max_peak_sun_hours)?;
    let (string_inputs, input_note) = request.string_inputs()?;

    let consumption = request.consumption(params)?;
    info!(
        source = consumption.source.as_str(),
        daily_energy_wh = consumption.daily_energy_wh,
        peak_load_w = consumption.peak_load_w,
        "consumption resolved"
    );

    let panel_power_wc = request.effective_panel_power();
    let system_voltage_v = request.effective_system_voltage();

    let mut warnings = Vec::new();

    let array = size_array(
        consumption.daily_energy_wh,
        request.hsp,
        params.performance_ratio,
        panel_power_wc,
        params.max_peak_sun_hours,
    )?;
    if !(panel_power_wc.is_finite() && panel_power_wc > 0.0) {
        warnings.push(format!(
            "Panel wattage ({panel_power_wc} Wc) is not positive; panel count could not be computed"
        ));
    }

    let battery = battery_requirement(
        consumption.daily_energy_wh,
        params.autonomy_days,
        system_voltage_v,
        params.depth_of_discharge,
    )?;
    let inverter_rating_w = consumption.peak_load_w * params.inverter_margin;
    info!(
        panel_count = array.panel_count,
        installed_wc = array.installed_wc,
        battery_ah = battery.capacity_ah,
        inverter_rating_w,
        "base sizing complete"
    );

    let estimated_annual_production_kwh = usable(request.specific_yield_kwh_per_kwc)
        .map(|yield_kwh| estimate_annual_production(array.installed_kwc(), yield_kwh))
        .transpose()?;

    warnings.extend(input_note);

    let string_configuration = match &request.module {
        Some(module) if !string_inputs.is_empty() => {
            resolve_strings(array.panel_count, module, &string_inputs)
        }
        _ => None,
    };
    if let Some(config) = &string_configuration {
        warnings.extend(config.warnings.iter().cloned());
    }

    let surface = request
        .module
        .as_ref()
        .filter(|m| m.has_dimensions())
        .and_then(|m| {
            surface(
                array.panel_count,
                m.length_m,
                m.width_m,
                params.ventilation_coefficient,
            )
        });

    let battery_bank = request
        .battery_unit
        .as_ref()
        .and_then(|unit| battery_bank_configuration(&battery, unit, request.inverter.as_ref()));
    if let Some(note) = battery_bank.as_ref().and_then(|b| b.warning.clone()) {
        warnings.push(note);
    }

    Ok(SizingResult {
        source: consumption.source,
        daily_energy_wh: round_to(consumption.daily_energy_wh, 2),
        daily_energy_kwh: round_to(consumption.daily_energy_wh / 1000.0, 2),
        peak_load_w: round_to(consumption.peak_load_w, 2),
        hsp: request.hsp,
        peak_power_required_wc: array.peak_power_required_wc,
        panel_power_wc,
        panel_count: array.panel_count,
        installed_wc: array.installed_wc,
        installed_kwc: array.installed_kwc(),
        battery,
        inverter_rating_w: round_to(inverter_rating_w, 2),
        inverter_rating_kva: round_to(inverter_rating_w / 1000.0, 2),
        estimated_annual_production_kwh,
        string_configuration,
        surface,
        battery_bank,
        warnings,
    })
}

/// One row of the panel-wattage comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelOption {
    pub panel_power_wc: f64,
    pub panel_count: u32,
    pub installed_wc: f64,
    /// Installed power above the strict requirement.
    pub oversize_wc: f64,
    pub surface_m2: Option<f64>,
    pub warning_count: usize,
}

/// Re-runs the sizing for each candidate wattage.
///
/// Runs are independent; the module's own rating is ignored so the candidate applies.
pub fn compare_panel_wattages(
    request: &SizingRequest,
    wattages: &[f64],
    params: &SizingParameters,
) -> Result<Vec<PanelOption>> {
    wattages
        .iter()
        .map(|&wattage| {
            if !wattage.is_finite() || wattage <= 0.0 {
                return Err(CalcEngineError::invalid(format!(
                    "comparison wattage must be greater than 0 (got {wattage})"
                )));
            }
            let mut candidate = request.clone().with_panel_power(wattage);
            if let Some(module) = candidate.module.as_mut() {
                module.rated_power_wc = None;
            }
            let result = size_system(&candidate, params)?;
            Ok(PanelOption {
                panel_power_wc: wattage,
                panel_count: result.panel_count,
                installed_wc: result.installed_wc,
                oversize_wc: round_to(result.installed_wc - result.peak_power_required_wc, 2),
                surface_m2: result.surface.map(|s| s.total_area_m2),
                warning_count: result.warnings.len(),
            })
        })
        .collect()
}
