//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Sizing and profitability routines for off-grid PV planning."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Series/parallel layout of the PV field across the inverter MPPT inputs.
//!
//! Each input gets three candidate series counts: the MPPT floor, the MPPT
//! ceiling and the absolute Voc ceiling. The absolute ceiling is a hard limit
//! (open-circuit voltage above it destroys the input stage) so exceeding it
//! clamps with a warning, while missing the MPPT floor is only reported.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    model::{usable, ModuleSpec, StringInputSpec},
    round_to,
};

/// Layout computed for one MPPT input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringLayout {
    pub index: u8,
    pub series_min: Option<u32>,
    pub series_max_mppt: Option<u32>,
    pub series_max_absolute: Option<u32>,
    pub series_optimal: u32,
    pub parallel_max: Option<u32>,
    pub assigned_series: u32,
    pub assigned_parallel: u32,
    pub assigned_panels: u32,
    pub string_voltage_v: Option<f64>,
}

impl StringLayout {
    /// Number of panels this input may carry at the optimal series count.
    pub fn capacity(&self) -> u32 {
        self.series_optimal.saturating_mul(self.parallel_capacity())
    }

    /// Parallel branches considered safe; one branch when current data is missing.
    pub fn parallel_capacity(&self) -> u32 {
        self.parallel_max.filter(|n| *n > 0).unwrap_or(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringConfiguration {
    pub strings: Vec<StringLayout>,
    pub warnings: Vec<String>,
    pub unassigned_panels: u32,
}

impl StringConfiguration {
    pub fn assigned_panels(&self) -> u32 {
        self.strings.iter().map(|s| s.assigned_panels).sum()
    }
}

/// Module figures the resolver needs, already checked for presence.
#[derive(Debug, Clone, Copy)]
struct ModuleElectrical {
    voc: f64,
    vmp: f64,
    imp: Option<f64>,
}

/// Distributes `panel_count` modules over the inputs in index order.
///
/// Returns `None` when the module lacks Voc or Vmp, or no inputs are given.
pub fn resolve_strings(
    panel_count: u32,
    module: &ModuleSpec,
    inputs: &[StringInputSpec],
) -> Option<StringConfiguration> {
    if inputs.is_empty() {
        debug!("no string inputs supplied; skipping string configuration");
        return None;
    }
    let (Some(voc), Some(vmp)) = (usable(module.voc_v), usable(module.vmp_v)) else {
        debug!("module Voc/Vmp missing; skipping string configuration");
        return None;
    };
    let electrical = ModuleElectrical {
        voc,
        vmp,
        imp: usable(module.imp_a),
    };

    let mut warnings = Vec::new();
    let mut strings = Vec::with_capacity(inputs.len());
    let mut remaining = panel_count;

    for input in inputs {
        let (planned, notes) = plan_string(input, electrical);
        warnings.extend(notes);
        let Some(layout) = planned else {
            continue;
        };
        let layout = assign(layout, remaining, electrical.vmp);
        remaining -= layout.assigned_panels.min(remaining);
        strings.push(layout);
    }

    if remaining > 0 {
        let note = format!(
            "{remaining} panel(s) left unassigned: string input capacity is insufficient"
        );
        warn!("{note}");
        warnings.push(note);
    }

    Some(StringConfiguration {
        strings,
        warnings,
        unassigned_panels: remaining,
    })
}

/// Derives the series/parallel bounds for one input together with its warnings.
fn plan_string(
    input: &StringInputSpec,
    module: ModuleElectrical,
) -> (Option<StringLayout>, Vec<String>) {
    let mut notes = Vec::new();
    let index = input.index;

    let series_min = usable(input.vmppt_min_v).map(|v| (v / module.vmp).ceil() as u32);
    let series_max_mppt = usable(input.vmppt_max_v).map(|v| (v / module.vmp).floor() as u32);
    let series_max_absolute = usable(input.voc_max_v).map(|v| (v / module.voc).floor() as u32);

    if series_max_absolute == Some(0) {
        let note = format!(
            "String {index}: a single module Voc ({} V) exceeds Voc max ({} V); input left unused",
            module.voc,
            input.voc_max_v.unwrap_or_default()
        );
        warn!("{note}");
        notes.push(note);
        return (None, notes);
    }

    let Some(mut series_optimal) = series_max_mppt
        .filter(|n| *n > 0)
        .or(series_max_absolute)
    else {
        debug!(index, "not enough voltage data to derive a series count; input skipped");
        return (None, notes);
    };

    if let Some(ceiling) = series_max_absolute {
        if series_optimal > ceiling {
            series_optimal = ceiling;
            let note = format!(
                "String {index}: series count reduced to {ceiling} to respect Voc max ({} V)",
                input.voc_max_v.unwrap_or_default()
            );
            warn!("{note}");
            notes.push(note);
        }
    }

    if let Some(floor) = series_min {
        if series_optimal < floor {
            let note = format!(
                "String {index}: MPPT voltage insufficient, at least {floor} modules in series required"
            );
            warn!("{note}");
            notes.push(note);
        }
    }

    let parallel_max = usable(input.imax_a)
        .zip(module.imp)
        .map(|(imax, imp)| (imax / imp).floor() as u32);
    if parallel_max == Some(0) {
        let note = format!(
            "String {index}: module Imp ({} A) exceeds input Imax ({} A); a single branch is assumed",
            module.imp.unwrap_or_default(),
            input.imax_a.unwrap_or_default()
        );
        warn!("{note}");
        notes.push(note);
    }

    let layout = StringLayout {
        index,
        series_min,
        series_max_mppt,
        series_max_absolute,
        series_optimal,
        parallel_max,
        assigned_series: 0,
        assigned_parallel: 0,
        assigned_panels: 0,
        string_voltage_v: None,
    };
    (Some(layout), notes)
}

fn assign(layout: StringLayout, remaining: u32, vmp: f64) -> StringLayout {
    if remaining == 0 {
        return layout;
    }
    let assigned = remaining.min(layout.capacity());
    let parallel = assigned.div_ceil(layout.series_optimal);
    StringLayout {
        assigned_series: layout.series_optimal,
        assigned_parallel: parallel,
        assigned_panels: layout.series_optimal.saturating_mul(parallel),
        string_voltage_v: Some(round_to(f64::from(layout.series_optimal) * vmp, 2)),
        ..layout
    }
}
