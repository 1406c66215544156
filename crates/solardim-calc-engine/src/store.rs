//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Sizing and profitability routines for off-grid PV planning."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Read contract of the project record store, plus a serde-backed in-memory store.

use serde::{Deserialize, Serialize};

use crate::model::{
    Appliance, BatteryUnitSpec, BillRecord, InverterSpec, ModuleSpec, SiteIrradiance,
    StringInputSpec,
};

/// Installation price and tariff entered by the technician.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSettings {
    #[serde(default)]
    pub tariff_per_kwh: Option<f64>,
    #[serde(default)]
    pub installation_cost: f64,
}

/// Accessors the engine uses to gather already-resolved project records.
pub trait ProjectStore {
    fn project_name(&self) -> Option<String> {
        None
    }
    fn list_appliances(&self) -> Vec<Appliance>;
    fn list_bills(&self) -> Vec<BillRecord>;
    fn get_location(&self) -> Option<SiteIrradiance>;
    fn get_module(&self) -> Option<ModuleSpec>;
    fn get_inverter(&self) -> Option<InverterSpec>;
    fn get_strings(&self) -> Vec<StringInputSpec>;
    fn get_battery_unit(&self) -> Option<BatteryUnitSpec>;
    fn get_financials(&self) -> Option<FinancialSettings>;
}

/// Whole project held in memory, as read from a project file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub appliances: Vec<Appliance>,
    #[serde(default)]
    pub bills: Vec<BillRecord>,
    #[serde(default)]
    pub location: Option<SiteIrradiance>,
    #[serde(default)]
    pub module: Option<ModuleSpec>,
    #[serde(default)]
    pub inverter: Option<InverterSpec>,
    #[serde(default)]
    pub strings: Vec<StringInputSpec>,
    #[serde(default)]
    pub battery_unit: Option<BatteryUnitSpec>,
    #[serde(default)]
    pub financials: Option<FinancialSettings>,
}

impl ProjectStore for ProjectFile {
    fn project_name(&self) -> Option<String> {
        self.name.clone()
    }

    fn list_appliances(&self) -> Vec<Appliance> {
        self.appliances.clone()
    }

    fn list_bills(&self) -> Vec<BillRecord> {
        self.bills.clone()
    }

    fn get_location(&self) -> Option<SiteIrradiance> {
        self.location.clone()
    }

    fn get_module(&self) -> Option<ModuleSpec> {
        self.module.clone()
    }

    fn get_inverter(&self) -> Option<InverterSpec> {
        self.inverter.clone()
    }

    fn get_strings(&self) -> Vec<StringInputSpec> {
        let mut strings = self.strings.clone();
        strings.sort_by_key(|s| s.index);
        strings
    }

    fn get_battery_unit(&self) -> Option<BatteryUnitSpec> {
        self.battery_unit.clone()
    }

    fn get_financials(&self) -> Option<FinancialSettings> {
        self.financials.clone()
    }
}
