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
    errors::{ensure_fraction, ensure_non_negative, ensure_positive, Result},
    model::{usable, BatteryUnitSpec, InverterSpec},
    round_to,
};

/// Storage needed to carry the daily load through the autonomy period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryRequirement {
    pub capacity_ah: f64,
    pub capacity_kwh: f64,
    pub system_voltage_v: f64,
    pub autonomy_days: f64,
    pub depth_of_discharge: f64,
}

/// `C(Ah) = (E × days) / (V × DoD)`.
pub fn battery_requirement(
    daily_wh: f64,
    autonomy_days: f64,
    system_voltage_v: f64,
    depth_of_discharge: f64,
) -> Result<BatteryRequirement> {
    ensure_non_negative("daily energy", daily_wh)?;
    ensure_positive("autonomy days", autonomy_days)?;
    ensure_positive("system voltage", system_voltage_v)?;
    ensure_fraction("depth of discharge", depth_of_discharge)?;

    let stored_wh = daily_wh * autonomy_days;
    let requirement = BatteryRequirement {
        capacity_ah: round_to(stored_wh / (system_voltage_v * depth_of_discharge), 2),
        capacity_kwh: round_to(stored_wh / 1000.0, 2),
        system_voltage_v,
        autonomy_days,
        depth_of_discharge,
    };
    debug!(
        capacity_ah = requirement.capacity_ah,
        capacity_kwh = requirement.capacity_kwh,
        "battery requirement computed"
    );
    Ok(requirement)
}

/// Series/parallel arrangement of unit batteries meeting a requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryBankConfiguration {
    pub series: u32,
    pub parallel: u32,
    pub total_units: u32,
    pub pack_voltage_v: f64,
    pub capacity_ah: f64,
    pub warning: Option<String>,
}

/// Arranges unit batteries; `None` when the unit voltage or capacity is unknown.
///
/// A pack below the inverter start voltage is reported, not rejected.
pub fn battery_bank_configuration(
    requirement: &BatteryRequirement,
    unit: &BatteryUnitSpec,
    inverter: Option<&InverterSpec>,
) -> Option<BatteryBankConfiguration> {
    let (Some(unit_voltage), Some(unit_capacity)) =
        (usable(unit.voltage_v), usable(unit.capacity_ah))
    else {
        debug!("unit battery voltage/capacity missing; skipping bank configuration");
        return None;
    };

    let series = (requirement.system_voltage_v / unit_voltage).ceil() as u32;
    let parallel = (requirement.capacity_ah / unit_capacity).ceil() as u32;
    let pack_voltage_v = round_to(f64::from(series) * unit_voltage, 2);

    let warning = inverter
        .and_then(|inv| usable(inv.battery_start_voltage_v))
        .filter(|start| pack_voltage_v < *start)
        .map(|start| {
            let note = format!(
                "Battery pack voltage ({pack_voltage_v} V) is below the inverter start voltage ({start} V)"
            );
            warn!("{note}");
            note
        });

    Some(BatteryBankConfiguration {
        series,
        parallel,
        total_units: series.saturating_mul(parallel),
        pack_voltage_v,
        capacity_ah: round_to(f64::from(parallel) * unit_capacity, 2),
        warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reference_requirement() {
        let req = battery_requirement(1000.0, 1.0, 48.0, 0.95).unwrap();
        assert_relative_eq!(req.capacity_ah, 21.93);
        assert_relative_eq!(req.capacity_kwh, 1.0);
    }

    #[test]
    fn autonomy_scales_capacity() {
        let one = battery_requirement(5000.0, 1.0, 24.0, 0.5).unwrap();
        let two = battery_requirement(5000.0, 2.0, 24.0, 0.5).unwrap();
        assert_relative_eq!(two.capacity_ah, one.capacity_ah * 2.0, epsilon = 0.05);
    }

    #[test]
    fn rejects_bad_denominators() {
        assert!(battery_requirement(1000.0, 1.0, 0.0, 0.95).is_err());
        assert!(battery_requirement(1000.0, 1.0, -12.0, 0.95).is_err());
        assert!(battery_requirement(1000.0, 1.0, 48.0, 0.0).is_err());
        assert!(battery_requirement(1000.0, 1.0, 48.0, 1.5).is_err());
    }

    #[test]
    fn configures_series_and_parallel_units() {
        let req = battery_requirement(10_000.0, 1.0, 48.0, 0.95).unwrap();
        let unit = BatteryUnitSpec {
            voltage_v: Some(12.0),
            capacity_ah: Some(100.0),
        };
        let bank = battery_bank_configuration(&req, &unit, None).unwrap();
        assert_eq!(bank.series, 4);
        assert_eq!(bank.parallel, 3);
        assert_eq!(bank.total_units, 12);
        assert_eq!(bank.pack_voltage_v, 48.0);
        assert_eq!(bank.capacity_ah, 300.0);
        assert!(bank.warning.is_none());
    }

    #[test]
    fn warns_when_pack_cannot_start_inverter() {
        let req = battery_requirement(2000.0, 1.0, 24.0, 0.95).unwrap();
        let unit = BatteryUnitSpec {
            voltage_v: Some(12.0),
            capacity_ah: Some(200.0),
        };
        let inverter = InverterSpec {
            battery_start_voltage_v: Some(48.0),
            input_count: Some(1),
        };
        let bank = battery_bank_configuration(&req, &unit, Some(&inverter)).unwrap();
        assert_eq!(bank.pack_voltage_v, 24.0);
        assert!(bank.warning.unwrap().contains("start voltage"));
    }

    #[test]
    fn oversized_bank_saturates_unit_count() {
        let req = BatteryRequirement {
            capacity_ah: 1e12,
            capacity_kwh: 48e9,
            system_voltage_v: 48.0,
            autonomy_days: 1.0,
            depth_of_discharge: 0.95,
        };
        let unit = BatteryUnitSpec {
            voltage_v: Some(1e-9),
            capacity_ah: Some(1.0),
        };
        let bank = battery_bank_configuration(&req, &unit, None).unwrap();
        assert_eq!(bank.series, u32::MAX);
        assert_eq!(bank.parallel, u32::MAX);
        assert_eq!(bank.total_units, u32::MAX);
    }

    #[test]
    fn missing_unit_data_is_none() {
        let req = battery_requirement(2000.0, 1.0, 24.0, 0.95).unwrap();
        let unit = BatteryUnitSpec {
            voltage_v: Some(12.0),
            capacity_ah: None,
        };
        assert!(battery_bank_configuration(&req, &unit, None).is_none());
    }
}
