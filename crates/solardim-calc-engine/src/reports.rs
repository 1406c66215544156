//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Sizing and profitability routines for off-grid PV planning."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::{fs, path::Path};

use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::{errors::Result, SizingSummary};

#[derive(Debug)]
pub struct ReportExporter<'a> {
    summary: &'a SizingSummary,
}

impl<'a> ReportExporter<'a> {
    pub fn new(summary: &'a SizingSummary) -> Self {
        Self { summary }
    }

    pub fn export_all(&self, output_dir: &Path) -> Result<()> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        let timestamp = self.summary.timestamp.to_rfc3339();
        let project = self.summary.report.name.clone();

        let sizing_report = ReportEnvelope::new(
            &timestamp,
            project.clone(),
            sizing_schema(),
            &self.summary.report.sizing,
        );
        let comparison_report = ReportEnvelope::new(
            &timestamp,
            project.clone(),
            comparison_schema(),
            &self.summary.report.comparison,
        );
        write_json(output_dir.join("sizing.json"), &sizing_report)?;
        write_json(output_dir.join("comparison.json"), &comparison_report)?;

        if let Some(profitability) = &self.summary.report.profitability {
            let profitability_report = ReportEnvelope::new(
                &timestamp,
                project,
                profitability_schema(),
                profitability,
            );
            write_json(output_dir.join("profitability.json"), &profitability_report)?;
        }

        info!("Reports exported to {}", output_dir.display());
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ReportEnvelope<'a, T: Serialize> {
    timestamp: &'a str,
    project: Option<String>,
    schema: serde_json::Value,
    data: &'a T,
}

impl<'a, T: Serialize> ReportEnvelope<'a, T> {
    fn new(
        timestamp: &'a str,
        project: Option<String>,
        schema: serde_json::Value,
        data: &'a T,
    ) -> Self {
        Self {
            timestamp,
            project,
            schema,
            data,
        }
    }
}

fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value)?;
    fs::write(path, serialized)?;
    Ok(())
}

fn sizing_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "SizingResult",
        "type": "object",
        "properties": {
            "source": {"type": "string", "enum": ["appliances", "bills"]},
            "daily_energy_wh": {"type": "number"},
            "peak_load_w": {"type": "number"},
            "peak_power_required_wc": {"type": "number"},
            "panel_count": {"type": "integer", "minimum": 0},
            "installed_wc": {"type": "number"},
            "battery": {
                "type": "object",
                "properties": {
                    "capacity_ah": {"type": "number"},
                    "capacity_kwh": {"type": "number"},
                    "system_voltage_v": {"type": "number"}
                },
                "required": ["capacity_ah", "capacity_kwh", "system_voltage_v"]
            },
            "inverter_rating_w": {"type": "number"},
            "string_configuration": {"type": ["object", "null"]},
            "surface": {"type": ["object", "null"]},
            "battery_bank": {"type": ["object", "null"]},
            "warnings": {"type": "array", "items": {"type": "string"}}
        },
        "required": [
            "source",
            "daily_energy_wh",
            "peak_power_required_wc",
            "panel_count",
            "installed_wc",
            "battery",
            "inverter_rating_w",
            "warnings"
        ]
    })
}

fn comparison_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "PanelComparison",
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "panel_power_wc": {"type": "number"},
                "panel_count": {"type": "integer", "minimum": 0},
                "installed_wc": {"type": "number"},
                "oversize_wc": {"type": "number"},
                "surface_m2": {"type": ["number", "null"]},
                "warning_count": {"type": "integer"}
            },
            "required": ["panel_power_wc", "panel_count", "installed_wc", "oversize_wc"]
        }
    })
}

fn profitability_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "ProfitabilityResult",
        "type": "object",
        "properties": {
            "installation_cost": {"type": "number"},
            "annual_savings": {"type": "number"},
            "payback_years": {"type": "number"},
            "break_even_year": {"type": ["integer", "null"]},
            "projection": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "year": {"type": "integer"},
                        "cumulative": {"type": "number"}
                    },
                    "required": ["year", "cumulative"]
                }
            }
        },
        "required": ["installation_cost", "annual_savings", "payback_years", "projection"]
    })
}
