//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Control CLI for sizing off-grid PV installations."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use anyhow::Result;
use clap::Args;
use solardim_calc_engine::compute_profitability;
use solardim_common::AppConfig;

#[derive(Debug, Args)]
pub struct ProfitabilityCommand {
    /// Installation cost, in the tariff's currency.
    #[arg(long, value_name = "AMOUNT")]
    cost: f64,

    /// Annual production in kWh.
    #[arg(long, value_name = "KWH")]
    production: f64,

    /// Price per kWh (defaults to the configured tariff).
    #[arg(long, value_name = "PRICE")]
    tariff: Option<f64>,

    #[arg(long)]
    json: bool,
}

impl ProfitabilityCommand {
    pub fn execute(&self, config: &AppConfig) -> Result<()> {
        let tariff = self.tariff.unwrap_or(config.finance.tariff_per_kwh);
        let result = compute_profitability(self.cost, self.production, tariff)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
            return Ok(());
        }
        println!("Annual savings: {:.2}", result.annual_savings);
        match result.break_even_year {
            Some(year) => println!(
                "Payback: {} years (break-even in year {year})",
                result.payback_years
            ),
            None => println!(
                "Payback: {} years (beyond the projection)",
                result.payback_years
            ),
        }
        for row in &result.projection {
            println!("Year {:>2}: {:>14.2}", row.year, row.cumulative);
        }
        Ok(())
    }
}
