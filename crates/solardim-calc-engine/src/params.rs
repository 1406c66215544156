//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Sizing and profitability routines for off-grid PV planning."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Tunable design constants. Every formula takes them explicitly so a caller
//! (or a test) can override a single value per call.

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_fraction, ensure_positive, CalcEngineError, Result};

/// Real-world off-grid losses (temperature, wiring, inverter, soiling).
pub const DEFAULT_PERFORMANCE_RATIO: f64 = 0.65;
/// Usable fraction of a lithium bank.
pub const DEFAULT_DEPTH_OF_DISCHARGE: f64 = 0.95;
pub const DEFAULT_AUTONOMY_DAYS: f64 = 1.0;
/// Spacing and airflow clearance around each module.
pub const DEFAULT_VENTILATION_COEFFICIENT: f64 = 1.1;
/// Surge capacity applied to the peak load when rating the inverter.
pub const DEFAULT_INVERTER_MARGIN: f64 = 1.25;
/// Notional daily usage window used to estimate peak load from bills.
pub const DEFAULT_BILL_PEAK_WINDOW_HOURS: f64 = 8.0;
pub const DEFAULT_BILL_PEAK_MARGIN: f64 = 1.25;
pub const MAX_PEAK_SUN_HOURS: f64 = 12.0;

pub const DEFAULT_PANEL_POWER_WC: f64 = 500.0;
pub const DEFAULT_SYSTEM_VOLTAGE_V: f64 = 48.0;
pub const DEFAULT_TARIFF_PER_KWH: f64 = 150.0;
pub const PROJECTION_YEARS: u32 = 10;

fn default_performance_ratio() -> f64 {
    DEFAULT_PERFORMANCE_RATIO
}

fn default_depth_of_discharge() -> f64 {
    DEFAULT_DEPTH_OF_DISCHARGE
}

fn default_autonomy_days() -> f64 {
    DEFAULT_AUTONOMY_DAYS
}

fn default_ventilation_coefficient() -> f64 {
    DEFAULT_VENTILATION_COEFFICIENT
}

fn default_inverter_margin() -> f64 {
    DEFAULT_INVERTER_MARGIN
}

fn default_bill_peak_window_hours() -> f64 {
    DEFAULT_BILL_PEAK_WINDOW_HOURS
}

fn default_bill_peak_margin() -> f64 {
    DEFAULT_BILL_PEAK_MARGIN
}

fn default_max_peak_sun_hours() -> f64 {
    MAX_PEAK_SUN_HOURS
}

fn default_comparison_wattages() -> Vec<f64> {
    vec![300.0, 400.0, 450.0, 500.0, 550.0]
}

/// Design constants consumed by the sizing formulas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingParameters {
    #[serde(default = "default_performance_ratio")]
    pub performance_ratio: f64,
    #[serde(default = "default_depth_of_discharge")]
    pub depth_of_discharge: f64,
    #[serde(default = "default_autonomy_days")]
    pub autonomy_days: f64,
    #[serde(default = "default_ventilation_coefficient")]
    pub ventilation_coefficient: f64,
    #[serde(default = "default_inverter_margin")]
    pub inverter_margin: f64,
    #[serde(default = "default_bill_peak_window_hours")]
    pub bill_peak_window_hours: f64,
    #[serde(default = "default_bill_peak_margin")]
    pub bill_peak_margin: f64,
    #[serde(default = "default_max_peak_sun_hours")]
    pub max_peak_sun_hours: f64,
    #[serde(default = "default_comparison_wattages")]
    pub comparison_wattages: Vec<f64>,
}

impl Default for SizingParameters {
    fn default() -> Self {
        Self {
            performance_ratio: DEFAULT_PERFORMANCE_RATIO,
            depth_of_discharge: DEFAULT_DEPTH_OF_DISCHARGE,
            autonomy_days: DEFAULT_AUTONOMY_DAYS,
            ventilation_coefficient: DEFAULT_VENTILATION_COEFFICIENT,
            inverter_margin: DEFAULT_INVERTER_MARGIN,
            bill_peak_window_hours: DEFAULT_BILL_PEAK_WINDOW_HOURS,
            bill_peak_margin: DEFAULT_BILL_PEAK_MARGIN,
            max_peak_sun_hours: MAX_PEAK_SUN_HOURS,
            comparison_wattages: default_comparison_wattages(),
        }
    }
}

impl SizingParameters {
    /// Validate structural invariants of the constants themselves.
    pub fn validate(&self) -> Result<()> {
        ensure_fraction("performance ratio", self.performance_ratio)?;
        ensure_fraction("depth of discharge", self.depth_of_discharge)?;
        ensure_positive("autonomy days", self.autonomy_days)?;
        ensure_positive("ventilation coefficient", self.ventilation_coefficient)?;
        ensure_positive("inverter margin", self.inverter_margin)?;
        ensure_positive("bill peak window", self.bill_peak_window_hours)?;
        ensure_positive("bill peak margin", self.bill_peak_margin)?;
        ensure_positive("peak sun hours ceiling", self.max_peak_sun_hours)?;
        if self.max_peak_sun_hours > 24.0 {
            return Err(CalcEngineError::invalid(format!(
                "peak sun hours ceiling cannot exceed 24 h (got {})",
                self.max_peak_sun_hours
            )));
        }
        for wattage in &self.comparison_wattages {
            ensure_positive("comparison wattage", *wattage)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SizingParameters::default().validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let params: SizingParameters = serde_yaml::from_str("performance_ratio: 0.75\n").unwrap();
        assert_eq!(params.performance_ratio, 0.75);
        assert_eq!(params.depth_of_discharge, DEFAULT_DEPTH_OF_DISCHARGE);
        assert_eq!(params.comparison_wattages.len(), 5);
    }

    #[test]
    fn rejects_depth_of_discharge_above_one() {
        let params = SizingParameters {
            depth_of_discharge: 1.2,
            ..SizingParameters::default()
        };
        assert!(params.validate().is_err());
    }
}
