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
use tracing::{debug, warn};

use crate::{
    errors::{ensure_fraction, ensure_non_negative, ensure_positive, CalcEngineError, Result},
    params::MAX_PEAK_SUN_HOURS,
    round_to,
};

/// Validates a peak-sun-hours figure against `(0, max_hsp]`.
pub fn validate_hsp(hsp: f64, max_hsp: f64) -> Result<()> {
    ensure_positive("HSP", hsp)?;
    if hsp > max_hsp {
        return Err(CalcEngineError::invalid(format!(
            "HSP of {hsp} h/day exceeds the plausible ceiling of {max_hsp} h/day"
        )));
    }
    Ok(())
}

/// Peak power (Wc) needed to cover `daily_wh` at the given irradiance and losses.
pub fn peak_power_required(daily_wh: f64, hsp: f64, performance_ratio: f64) -> Result<f64> {
    peak_power_required_with_ceiling(daily_wh, hsp, performance_ratio, MAX_PEAK_SUN_HOURS)
}

pub(crate) fn peak_power_required_with_ceiling(
    daily_wh: f64,
    hsp: f64,
    performance_ratio: f64,
    max_hsp: f64,
) -> Result<f64> {
    validate_hsp(hsp, max_hsp)?;
    ensure_non_negative("daily energy", daily_wh)?;
    ensure_fraction("performance ratio", performance_ratio)?;
    Ok(round_to(daily_wh / (hsp * performance_ratio), 2))
}

/// Number of modules needed, rounded up.
///
/// A non-positive panel wattage means the module is not known yet: the count is 0.
pub fn panel_count(peak_power_wc: f64, panel_power_wc: f64) -> u32 {
    if !panel_power_wc.is_finite() || panel_power_wc <= 0.0 {
        warn!(panel_power_wc, "panel wattage is not positive; panel count not computed");
        return 0;
    }
    if !peak_power_wc.is_finite() || peak_power_wc <= 0.0 {
        return 0;
    }
    (peak_power_wc / panel_power_wc).ceil() as u32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArraySizing {
    pub peak_power_required_wc: f64,
    pub panel_power_wc: f64,
    pub panel_count: u32,
    pub installed_wc: f64,
}

impl ArraySizing {
    pub fn installed_kwc(&self) -> f64 {
        round_to(self.installed_wc / 1000.0, 2)
    }
}

/// Sizes the PV field for a daily energy need.
pub fn size_array(
    daily_wh: f64,
    hsp: f64,
    performance_ratio: f64,
    panel_power_wc: f64,
    max_hsp: f64,
) -> Result<ArraySizing> {
    let peak_power_required_wc =
        peak_power_required_with_ceiling(daily_wh, hsp, performance_ratio, max_hsp)?;
    let count = panel_count(peak_power_required_wc, panel_power_wc);
    let installed_wc = f64::from(count) * panel_power_wc.max(0.0);
    debug!(
        peak_power_required_wc,
        panel_count = count,
        installed_wc,
        "array sized"
    );
    Ok(ArraySizing {
        peak_power_required_wc,
        panel_power_wc,
        panel_count: count,
        installed_wc,
    })
}
