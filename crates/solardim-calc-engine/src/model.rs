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

use crate::errors::{CalcEngineError, Result};

/// Keeps a hardware figure only when it is usable (finite and strictly positive).
///
/// Zero or negative datasheet values are treated the same as a missing field.
pub(crate) fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appliance {
    pub name: String,
    pub power_w: f64,
    pub hours_per_day: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl Appliance {
    pub fn new(name: impl Into<String>, power_w: f64, hours_per_day: f64, quantity: u32) -> Self {
        Self {
            name: name.into(),
            power_w,
            hours_per_day,
            quantity,
        }
    }

    /// Combined power drawn by every unit of this appliance.
    pub fn total_power_w(&self) -> f64 {
        self.power_w * f64::from(self.quantity)
    }

    pub fn daily_energy_wh(&self) -> f64 {
        self.total_power_w() * self.hours_per_day
    }

    pub fn validate(&self) -> Result<()> {
        if !self.power_w.is_finite() || self.power_w < 0.0 {
            return Err(CalcEngineError::invalid(format!(
                "appliance '{}' has a negative power rating ({} W)",
                self.name, self.power_w
            )));
        }
        if !self.hours_per_day.is_finite() || !(0.0..=24.0).contains(&self.hours_per_day) {
            return Err(CalcEngineError::invalid(format!(
                "appliance '{}' usage must lie within 0-24 h/day (got {})",
                self.name, self.hours_per_day
            )));
        }
        if self.quantity == 0 {
            return Err(CalcEngineError::invalid(format!(
                "appliance '{}' quantity must be at least 1",
                self.name
            )));
        }
        Ok(())
    }
}

/// Solar resource for the site, as returned by the irradiance lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteIrradiance {
    #[serde(default)]
    pub city: Option<String>,
    pub hsp: f64,
    #[serde(default)]
    pub annual_irradiation_kwh_per_m2: Option<f64>,
    #[serde(default)]
    pub annual_production_kwh_per_kwc: Option<f64>,
}

impl SiteIrradiance {
    /// Specific yield used for production estimates.
    ///
    /// Prefers the simulated yield per kWc; otherwise falls back to the annual
    /// plane irradiation, which equals the theoretical STC yield per kWc.
    pub fn specific_yield_kwh_per_kwc(&self) -> Option<f64> {
        usable(self.annual_production_kwh_per_kwc)
            .or_else(|| usable(self.annual_irradiation_kwh_per_m2))
    }
}

/// PV module datasheet. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleSpec {
    #[serde(default)]
    pub rated_power_wc: Option<f64>,
    #[serde(default)]
    pub voc_v: Option<f64>,
    #[serde(default)]
    pub isc_a: Option<f64>,
    #[serde(default)]
    pub vmp_v: Option<f64>,
    #[serde(default)]
    pub imp_a: Option<f64>,
    #[serde(default)]
    pub length_m: Option<f64>,
    #[serde(default)]
    pub width_m: Option<f64>,
}

impl ModuleSpec {
    pub fn has_dimensions(&self) -> bool {
        usable(self.length_m).is_some() && usable(self.width_m).is_some()
    }
}

/// Electrical limits of one inverter MPPT input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringInputSpec {
    pub index: u8,
    #[serde(default)]
    pub voc_max_v: Option<f64>,
    #[serde(default)]
    pub vmppt_min_v: Option<f64>,
    #[serde(default)]
    pub vmppt_max_v: Option<f64>,
    #[serde(default)]
    pub imax_a: Option<f64>,
}

impl StringInputSpec {
    pub fn new(index: u8) -> Self {
        Self {
            index,
            voc_max_v: None,
            vmppt_min_v: None,
            vmppt_max_v: None,
            imax_a: None,
        }
    }

    pub fn with_voc_max(mut self, volts: f64) -> Self {
        self.voc_max_v = Some(volts);
        self
    }

    pub fn with_mppt_window(mut self, min_v: f64, max_v: f64) -> Self {
        self.vmppt_min_v = Some(min_v);
        self.vmppt_max_v = Some(max_v);
        self
    }

    pub fn with_imax(mut self, amps: f64) -> Self {
        self.imax_a = Some(amps);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatteryUnitSpec {
    #[serde(default)]
    pub voltage_v: Option<f64>,
    #[serde(default)]
    pub capacity_ah: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InverterSpec {
    #[serde(default)]
    pub battery_start_voltage_v: Option<f64>,
    #[serde(default)]
    pub input_count: Option<u8>,
}

/// One validated utility bill as produced by the bill extraction step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillRecord {
    #[serde(default)]
    pub period: Option<String>,
    pub duration_days: u32,
    pub consumption_kwh: f64,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub supplier: Option<String>,
}

/// Where the daily consumption figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumptionSource {
    /// Itemised appliance list; peak load is measured from nameplate power.
    Appliances,
    /// Billing history; peak load is a heuristic estimate.
    Bills,
}

impl ConsumptionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumptionSource::Appliances => "appliances",
            ConsumptionSource::Bills => "bills",
        }
    }
}
