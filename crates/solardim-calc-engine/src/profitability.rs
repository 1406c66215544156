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
use tracing::info;

use crate::{
    errors::{ensure_non_negative, ensure_positive, Result},
    params::PROJECTION_YEARS,
    round_to,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionYear {
    pub year: u32,
    pub cumulative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitabilityResult {
    pub installation_cost: f64,
    pub annual_production_kwh: f64,
    pub tariff_per_kwh: f64,
    pub annual_savings: f64,
    /// 0 when the installation never pays back.
    pub payback_years: f64,
    pub break_even_year: Option<u32>,
    pub projection: Vec<ProjectionYear>,
}

/// Ten-year cumulative cash flow of an installation priced at `installation_cost`.
pub fn compute_profitability(
    installation_cost: f64,
    annual_production_kwh: f64,
    tariff_per_kwh: f64,
) -> Result<ProfitabilityResult> {
    ensure_non_negative("installation cost", installation_cost)?;
    ensure_positive("annual production", annual_production_kwh)?;
    ensure_positive("tariff", tariff_per_kwh)?;

    let annual_savings = annual_production_kwh * tariff_per_kwh;
    let payback_years = if annual_savings > 0.0 {
        round_to(installation_cost / annual_savings, 1)
    } else {
        0.0
    };

    let projection: Vec<ProjectionYear> = (1..=PROJECTION_YEARS)
        .scan(-installation_cost, |cumulative, year| {
            *cumulative += annual_savings;
            Some(ProjectionYear {
                year,
                cumulative: round_to(*cumulative, 2),
            })
        })
        .collect();
    let break_even_year = projection
        .iter()
        .find(|row| row.cumulative >= 0.0)
        .map(|row| row.year);

    info!(
        annual_savings,
        payback_years,
        break_even_year = break_even_year.unwrap_or_default(),
        "profitability computed"
    );

    Ok(ProfitabilityResult {
        installation_cost: round_to(installation_cost, 2),
        annual_production_kwh,
        tariff_per_kwh,
        annual_savings: round_to(annual_savings, 2),
        payback_years,
        break_even_year,
        projection,
    })
}

/// Yearly production of an installed field given the site's specific yield.
pub fn estimate_annual_production(installed_kwc: f64, yield_kwh_per_kwc: f64) -> Result<f64> {
    ensure_non_negative("installed capacity", installed_kwc)?;
    ensure_non_negative("specific yield", yield_kwh_per_kwc)?;
    Ok(round_to(installed_kwc * yield_kwh_per_kwc, 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pays_back_in_year_five() {
        let result = compute_profitability(1_000_000.0, 1000.0, 200.0).unwrap();
        assert_relative_eq!(result.annual_savings, 200_000.0);
        assert_relative_eq!(result.payback_years, 5.0);
        assert_eq!(result.projection.len(), 10);
        assert_relative_eq!(result.projection[4].cumulative, 0.0);
        assert_relative_eq!(result.projection[0].cumulative, -800_000.0);
        assert_relative_eq!(result.projection[9].cumulative, 1_000_000.0);
        assert_eq!(result.break_even_year, Some(5));
    }

    #[test]
    fn payback_tie_rounds_to_even() {
        let result = compute_profitability(225.0, 1.0, 100.0).unwrap();
        assert_eq!(result.payback_years, 2.2);
        assert_eq!(result.break_even_year, Some(3));
    }

    #[test]
    fn free_installation_breaks_even_immediately() {
        let result = compute_profitability(0.0, 500.0, 150.0).unwrap();
        assert_eq!(result.payback_years, 0.0);
        assert_eq!(result.break_even_year, Some(1));
    }

    #[test]
    fn payback_beyond_projection_has_no_break_even_year() {
        let result = compute_profitability(5_000_000.0, 1000.0, 150.0).unwrap();
        assert_relative_eq!(result.payback_years, 33.3);
        assert_eq!(result.break_even_year, None);
    }

    #[test]
    fn rejects_invalid_inputs() {
        assert!(compute_profitability(-1.0, 1000.0, 150.0).is_err());
        assert!(compute_profitability(1000.0, 0.0, 150.0).is_err());
        assert!(compute_profitability(1000.0, 1000.0, 0.0).is_err());
    }

    #[test]
    fn production_scales_with_installed_capacity() {
        assert_relative_eq!(estimate_annual_production(3.2, 1650.0).unwrap(), 5280.0);
        assert!(estimate_annual_production(-1.0, 1650.0).is_err());
    }
}
