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

use crate::{model::usable, round_to};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceEstimate {
    pub module_area_m2: f64,
    pub raw_area_m2: f64,
    pub total_area_m2: f64,
    pub ventilation_coefficient: f64,
}

/// Ground or roof area taken by the field, including spacing for airflow.
pub fn surface(
    panel_count: u32,
    length_m: Option<f64>,
    width_m: Option<f64>,
    ventilation_coefficient: f64,
) -> Option<SurfaceEstimate> {
    let (length, width) = (usable(length_m)?, usable(width_m)?);
    let module_area = length * width;
    let raw_area = f64::from(panel_count) * module_area;
    Some(SurfaceEstimate {
        module_area_m2: round_to(module_area, 3),
        raw_area_m2: round_to(raw_area, 2),
        total_area_m2: round_to(raw_area * ventilation_coefficient, 2),
        ventilation_coefficient,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn applies_ventilation_coefficient() {
        let estimate = surface(8, Some(1.7), Some(1.1), 1.1).unwrap();
        assert_relative_eq!(estimate.module_area_m2, 1.87);
        assert_relative_eq!(estimate.raw_area_m2, 14.96);
        assert_relative_eq!(estimate.total_area_m2, 16.46);
    }

    #[test]
    fn missing_dimension_is_none() {
        assert!(surface(8, Some(1.7), None, 1.1).is_none());
        assert!(surface(8, None, Some(1.1), 1.1).is_none());
    }
}
