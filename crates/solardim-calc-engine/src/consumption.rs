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
    errors::{ensure_positive, Result},
    model::{Appliance, BillRecord, ConsumptionSource},
    params::SizingParameters,
    round_to,
};

/// Total daily energy of the appliance list, in Wh.
pub fn daily_energy(appliances: &[Appliance]) -> f64 {
    appliances.iter().map(Appliance::daily_energy_wh).sum()
}

/// Simultaneous peak load of the appliance list, in W.
pub fn peak_load(appliances: &[Appliance]) -> f64 {
    appliances.iter().map(Appliance::total_power_w).sum()
}

/// Daily energy and peak load, labelled with their provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionProfile {
    pub source: ConsumptionSource,
    pub daily_energy_wh: f64,
    pub peak_load_w: f64,
}

impl ConsumptionProfile {
    pub fn from_appliances(appliances: &[Appliance]) -> Result<Self> {
        for appliance in appliances {
            appliance.validate()?;
        }
        Ok(Self {
            source: ConsumptionSource::Appliances,
            daily_energy_wh: daily_energy(appliances),
            peak_load_w: peak_load(appliances),
        })
    }

    /// Builds a profile from the billing-history daily average.
    ///
    /// Peak load is an estimate: the daily energy spread over a notional usage
    /// window, plus a safety margin.
    pub fn from_bills(average_daily_kwh: f64, params: &SizingParameters) -> Result<Self> {
        ensure_positive("average daily consumption", average_daily_kwh)?;
        let daily_energy_wh = average_daily_kwh * 1000.0;
        let peak_load_w = (daily_energy_wh / params.bill_peak_window_hours) * params.bill_peak_margin;
        debug!(
            daily_energy_wh,
            peak_load_w, "estimated peak load from billing history"
        );
        Ok(Self {
            source: ConsumptionSource::Bills,
            daily_energy_wh,
            peak_load_w,
        })
    }
}

impl BillRecord {
    fn is_usable(&self) -> bool {
        self.duration_days > 0 && self.consumption_kwh.is_finite() && self.consumption_kwh > 0.0
    }

    /// Mean daily consumption over the billed period, in kWh.
    pub fn daily_consumption_kwh(&self) -> Option<f64> {
        self.is_usable()
            .then(|| round_to(self.consumption_kwh / f64::from(self.duration_days), 2))
    }

    /// Average price paid per kWh on this bill.
    pub fn average_tariff(&self) -> Option<f64> {
        let amount = self.amount.filter(|a| a.is_finite() && *a > 0.0)?;
        self.is_usable()
            .then(|| round_to(amount / self.consumption_kwh, 2))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillSummary {
    pub average_daily_kwh: f64,
    pub average_tariff: Option<f64>,
    pub bill_count: usize,
}

/// Averages the daily consumption (and tariff, when amounts are known) across bills.
///
/// Bills without a positive consumption and duration are ignored. Returns `None`
/// when no usable bill remains.
pub fn summarize_bills(bills: &[BillRecord]) -> Option<BillSummary> {
    let daily: Vec<f64> = bills
        .iter()
        .filter_map(|bill| {
            let value = bill.daily_consumption_kwh();
            if value.is_none() {
                warn!(
                    period = bill.period.as_deref().unwrap_or(""),
                    "ignoring bill without usable consumption or duration"
                );
            }
            value
        })
        .collect();
    if daily.is_empty() {
        return None;
    }

    let tariffs: Vec<f64> = bills.iter().filter_map(BillRecord::average_tariff).collect();
    let average_tariff = (!tariffs.is_empty())
        .then(|| round_to(tariffs.iter().sum::<f64>() / tariffs.len() as f64, 2));

    Some(BillSummary {
        average_daily_kwh: round_to(daily.iter().sum::<f64>() / daily.len() as f64, 2),
        average_tariff,
        bill_count: daily.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn bill(days: u32, kwh: f64, amount: Option<f64>) -> BillRecord {
        BillRecord {
            period: None,
            duration_days: days,
            consumption_kwh: kwh,
            amount,
            supplier: None,
        }
    }

    #[test]
    fn empty_list_has_no_energy_or_load() {
        assert_eq!(daily_energy(&[]), 0.0);
        assert_eq!(peak_load(&[]), 0.0);
    }

    #[test]
    fn aggregates_power_and_energy() {
        let appliances = vec![
            Appliance::new("Lamp", 10.0, 6.0, 4),
            Appliance::new("Fridge", 150.0, 24.0, 1),
        ];
        assert_eq!(daily_energy(&appliances), 240.0 + 3600.0);
        assert_eq!(peak_load(&appliances), 40.0 + 150.0);
    }

    #[test]
    fn bills_profile_uses_eight_hour_window_and_margin() {
        let profile = ConsumptionProfile::from_bills(8.0, &SizingParameters::default()).unwrap();
        assert_eq!(profile.source, ConsumptionSource::Bills);
        assert_eq!(profile.daily_energy_wh, 8000.0);
        assert_relative_eq!(profile.peak_load_w, 1250.0);
    }

    #[test]
    fn bills_profile_rejects_zero_average() {
        assert!(ConsumptionProfile::from_bills(0.0, &SizingParameters::default()).is_err());
    }

    #[test]
    fn appliance_profile_validates_each_entry() {
        let appliances = vec![Appliance::new("Pump", 750.0, 30.0, 1)];
        assert!(ConsumptionProfile::from_appliances(&appliances).is_err());
    }

    #[test]
    fn summarizes_usable_bills_only() {
        let bills = vec![
            bill(30, 300.0, Some(45_000.0)),
            bill(31, 372.0, None),
            bill(0, 120.0, Some(10_000.0)),
        ];
        let summary = summarize_bills(&bills).unwrap();
        assert_eq!(summary.bill_count, 2);
        assert_relative_eq!(summary.average_daily_kwh, 11.0);
        assert_eq!(summary.average_tariff, Some(150.0));
    }

    #[test]
    fn no_usable_bill_yields_none() {
        assert!(summarize_bills(&[bill(30, 0.0, None)]).is_none());
        assert!(summarize_bills(&[]).is_none());
    }

    proptest! {
        #[test]
        fn daily_energy_is_sum_of_products(
            items in prop::collection::vec((0.0f64..5000.0, 0.0f64..24.0, 1u32..10), 0..20)
        ) {
            let appliances: Vec<Appliance> = items
                .iter()
                .map(|(p, h, q)| Appliance::new("x", *p, *h, *q))
                .collect();
            let expected: f64 = items.iter().map(|(p, h, q)| p * h * f64::from(*q)).sum();
            prop_assert!((daily_energy(&appliances) - expected).abs() <= 1e-6 * expected.max(1.0));
        }
    }
}
