//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Sizing and profitability routines for off-grid PV planning."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fs;

use approx::assert_relative_eq;
use solardim_calc_engine::{
    analyze_project_with_options,
    array::{panel_count, peak_power_required},
    battery::battery_requirement,
    compute_profitability,
    io::{load_bills_from_jsonl, load_project_from_file},
    model::{
        Appliance, BatteryUnitSpec, ConsumptionSource, InverterSpec, ModuleSpec, SiteIrradiance,
        StringInputSpec,
    },
    params::SizingParameters,
    project::ProjectOptions,
    size_system,
    store::{FinancialSettings, ProjectFile},
    SizingRequest,
};
use tempfile::tempdir;

fn module() -> ModuleSpec {
    ModuleSpec {
        rated_power_wc: Some(400.0),
        voc_v: Some(40.0),
        isc_a: Some(10.8),
        vmp_v: Some(33.0),
        imp_a: Some(10.0),
        length_m: Some(1.72),
        width_m: Some(1.13),
    }
}

fn household() -> Vec<Appliance> {
    vec![
        Appliance::new("Fridge", 150.0, 24.0, 1),
        Appliance::new("Lamps", 12.0, 6.0, 10),
        Appliance::new("TV", 100.0, 5.0, 1),
        Appliance::new("Fan", 60.0, 10.0, 3),
        Appliance::new("Pump", 750.0, 2.0, 1),
    ]
}

fn full_request() -> SizingRequest {
    SizingRequest::new(5.0)
        .with_appliances(household())
        .with_module(module())
        .with_inverter(InverterSpec {
            battery_start_voltage_v: Some(48.0),
            input_count: Some(2),
        })
        .with_strings(vec![
            StringInputSpec::new(1)
                .with_voc_max(150.0)
                .with_mppt_window(60.0, 145.0)
                .with_imax(25.0),
            StringInputSpec::new(2)
                .with_voc_max(150.0)
                .with_mppt_window(60.0, 145.0)
                .with_imax(25.0),
        ])
        .with_battery_unit(BatteryUnitSpec {
            voltage_v: Some(12.0),
            capacity_ah: Some(200.0),
        })
        .with_specific_yield(1650.0)
}

#[test]
fn reference_array_scenario() {
    let peak = peak_power_required(10_000.0, 5.0, 0.65).unwrap();
    assert_relative_eq!(peak, 3076.92);
    let count = panel_count(peak, 400.0);
    assert_eq!(count, 8);
    assert_eq!(f64::from(count) * 400.0, 3200.0);
}

#[test]
fn reference_battery_and_profitability_figures() {
    let battery = battery_requirement(1000.0, 1.0, 48.0, 0.95).unwrap();
    assert_relative_eq!(battery.capacity_ah, 21.93);

    let profit = compute_profitability(1_000_000.0, 2000.0, 100.0).unwrap();
    assert_relative_eq!(profit.projection[4].cumulative, 0.0);
    assert_relative_eq!(profit.payback_years, 5.0);
}

#[test]
fn full_request_computes_every_enrichment() {
    let result = size_system(&full_request(), &SizingParameters::default()).unwrap();

    // 3600 + 720 + 500 + 1800 + 1500
    assert_eq!(result.source, ConsumptionSource::Appliances);
    assert_eq!(result.daily_energy_wh, 8120.0);
    assert_eq!(result.peak_load_w, 1300.0);
    assert_relative_eq!(result.inverter_rating_w, 1625.0);
    assert_eq!(result.battery.system_voltage_v, 48.0);
    assert_eq!(result.panel_count, 7);

    let strings = result.string_configuration.as_ref().unwrap();
    // floor(145 / 33) = 4 exceeds floor(150 / 40) = 3 and is clamped.
    assert_eq!(strings.strings[0].series_optimal, 3);
    assert_eq!(
        strings
            .warnings
            .iter()
            .filter(|w| w.contains("Voc max"))
            .count(),
        2
    );
    for layout in &strings.strings {
        assert!(layout.assigned_panels <= layout.capacity());
    }
    assert_eq!(strings.unassigned_panels, 0);

    let bank = result.battery_bank.as_ref().unwrap();
    assert_eq!(bank.series, 4);
    assert!(bank.warning.is_none());

    assert!(result.surface.is_some());
    assert!(result.estimated_annual_production_kwh.is_some());
    assert_eq!(result.warnings, strings.warnings);
}

#[test]
fn sizing_is_idempotent() {
    let params = SizingParameters::default();
    let first = size_system(&full_request(), &params).unwrap();
    let second = size_system(&full_request(), &params).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn invalid_inputs_are_rejected() {
    let params = SizingParameters::default();
    assert!(size_system(&SizingRequest::new(0.0).with_appliances(household()), &params)
        .unwrap_err()
        .is_invalid_input());
    assert!(size_system(&SizingRequest::new(4.5), &params)
        .unwrap_err()
        .is_invalid_input());
    assert!(
        size_system(&SizingRequest::new(4.5).with_bill_average(-3.0), &params)
            .unwrap_err()
            .is_invalid_input()
    );
}

#[test]
fn overridden_parameters_apply_per_call() {
    let request = SizingRequest::new(5.0)
        .with_bill_average(10.0)
        .with_panel_power(400.0);
    let tuned = SizingParameters {
        performance_ratio: 0.8,
        ..SizingParameters::default()
    };
    let result = size_system(&request, &tuned).unwrap();
    assert_relative_eq!(result.peak_power_required_wc, 2500.0);
    assert_eq!(result.panel_count, 7);
}

#[test]
fn project_file_round_trip_exports_reports() {
    let temp = tempdir().expect("temp dir");
    let project = ProjectFile {
        name: Some("integration".into()),
        appliances: household(),
        location: Some(SiteIrradiance {
            city: Some("Bamako".into()),
            hsp: 5.8,
            annual_irradiation_kwh_per_m2: Some(2200.0),
            annual_production_kwh_per_kwc: Some(1700.0),
        }),
        module: Some(module()),
        financials: Some(FinancialSettings {
            tariff_per_kwh: Some(120.0),
            installation_cost: 3_500_000.0,
        }),
        ..ProjectFile::default()
    };
    let project_path = temp.path().join("project.yaml");
    fs::write(&project_path, serde_yaml::to_string(&project).unwrap()).unwrap();

    let loaded = load_project_from_file(&project_path).unwrap();
    assert_eq!(loaded, project);

    let reports_dir = temp.path().join("reports");
    let summary = analyze_project_with_options(
        &loaded,
        &ProjectOptions::default(),
        &SizingParameters::default(),
        Some(&reports_dir),
    )
    .expect("analysis");

    let profit = summary.report.profitability.as_ref().expect("priced project");
    assert_eq!(profit.tariff_per_kwh, 120.0);
    assert_eq!(profit.projection.len(), 10);

    let sizing_json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(reports_dir.join("sizing.json")).unwrap())
            .unwrap();
    assert_eq!(sizing_json["project"], "integration");
    assert_eq!(sizing_json["data"]["source"], "appliances");
    assert!(sizing_json["data"]["panel_count"].as_u64().unwrap() > 0);

    let comparison_json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(reports_dir.join("comparison.json")).unwrap())
            .unwrap();
    assert_eq!(comparison_json["data"].as_array().unwrap().len(), 5);

    let profit_json: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(reports_dir.join("profitability.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        profit_json["data"]["projection"].as_array().unwrap().len(),
        10
    );
}

#[test]
fn bills_loaded_from_jsonl_drive_bills_mode() {
    let temp = tempdir().expect("temp dir");
    let path = temp.path().join("bills.jsonl");
    fs::write(
        &path,
        concat!(
            "{\"period\":\"2024-03\",\"duration_days\":31,\"consumption_kwh\":248,\"amount\":37200}\n",
            "\n",
            "{\"period\":\"2024-04\",\"duration_days\":30,\"consumption_kwh\":240,\"amount\":36000}\n",
        ),
    )
    .unwrap();
    let bills = load_bills_from_jsonl(&path).unwrap();
    assert_eq!(bills.len(), 2);

    let project = ProjectFile {
        bills,
        location: Some(SiteIrradiance {
            city: None,
            hsp: 5.0,
            annual_irradiation_kwh_per_m2: None,
            annual_production_kwh_per_kwc: None,
        }),
        ..ProjectFile::default()
    };
    let summary = analyze_project_with_options(
        &project,
        &ProjectOptions::default(),
        &SizingParameters::default(),
        None,
    )
    .unwrap();
    let report = summary.report;
    assert_eq!(report.sizing.source, ConsumptionSource::Bills);
    assert_eq!(report.bills.unwrap().average_daily_kwh, 8.0);
    assert_relative_eq!(report.sizing.peak_load_w, 1250.0);
    assert!(report.sizing.estimated_annual_production_kwh.is_none());
    assert!(report.profitability.is_none());
}
