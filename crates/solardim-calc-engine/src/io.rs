//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Sizing and profitability routines for off-grid PV planning."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::{fs, io::BufRead, path::Path};

use crate::{
    errors::{CalcEngineError, Result},
    model::BillRecord,
    store::ProjectFile,
};

pub fn parse_project(data: &str) -> Result<ProjectFile> {
    let project = if data.trim_start().starts_with('{') {
        serde_json::from_str(data)?
    } else {
        serde_yaml::from_str(data).map_err(CalcEngineError::YamlSerializationFailed)?
    };
    Ok(project)
}

/// Reads a project description, JSON or YAML.
pub fn load_project_from_file(path: impl AsRef<Path>) -> Result<ProjectFile> {
    let data = fs::read_to_string(path)?;
    parse_project(&data)
}

/// Reads extracted bill records, one JSON object per line.
pub fn load_bills_from_jsonl(path: impl AsRef<Path>) -> Result<Vec<BillRecord>> {
    let file = fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut bills = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        bills.push(serde_json::from_str(&line)?);
    }
    Ok(bills)
}
