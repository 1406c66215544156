//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Sizing and profitability routines for off-grid PV planning."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use crate::sizing::SizingRequest;

#[cfg(feature = "rest-api")]
pub use rest::router;

#[cfg(feature = "rest-api")]
mod rest {
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use std::sync::Arc;

    use crate::{
        errors::CalcEngineError,
        params::SizingParameters,
        profitability::{compute_profitability, ProfitabilityResult},
        sizing::{compare_panel_wattages, size_system, PanelOption, SizingResult},
    };

    use super::{CompareRequest, ProfitabilityRequest, SizingRequest};

    #[derive(Clone, Default)]
    pub struct CalcEngineState {
        params: SizingParameters,
    }

    pub fn router(params: SizingParameters) -> Router {
        Router::new()
            .route("/api/sizing", post(sizing))
            .route("/api/sizing/compare", post(compare))
            .route("/api/profitability", post(profitability))
            .with_state(Arc::new(CalcEngineState { params }))
    }

    async fn sizing(
        State(state): State<Arc<CalcEngineState>>,
        Json(payload): Json<SizingRequest>,
    ) -> Result<Json<SizingResult>, StatusCode> {
        size_system(&payload, &state.params)
            .map(Json)
            .map_err(map_err)
    }

    async fn compare(
        State(state): State<Arc<CalcEngineState>>,
        Json(payload): Json<CompareRequest>,
    ) -> Result<Json<Vec<PanelOption>>, StatusCode> {
        let wattages = payload
            .wattages
            .unwrap_or_else(|| state.params.comparison_wattages.clone());
        compare_panel_wattages(&payload.request, &wattages, &state.params)
            .map(Json)
            .map_err(map_err)
    }

    async fn profitability(
        State(_): State<Arc<CalcEngineState>>,
        Json(payload): Json<ProfitabilityRequest>,
    ) -> Result<Json<ProfitabilityResult>, StatusCode> {
        compute_profitability(
            payload.installation_cost,
            payload.annual_production_kwh,
            payload.tariff_per_kwh,
        )
        .map(Json)
        .map_err(map_err)
    }

    fn map_err(err: CalcEngineError) -> StatusCode {
        match err {
            CalcEngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

}

fn default_tariff() -> f64 {
    crate::params::DEFAULT_TARIFF_PER_KWH
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CompareRequest {
    #[serde(flatten)]
    pub request: SizingRequest,
    #[serde(default)]
    pub wattages: Option<Vec<f64>>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProfitabilityRequest {
    pub installation_cost: f64,
    pub annual_production_kwh: f64,
    #[serde(default = "default_tariff")]
    pub tariff_per_kwh: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profitability_request_defaults_tariff() {
        let request: ProfitabilityRequest =
            serde_json::from_str(r#"{"installation_cost": 1000, "annual_production_kwh": 10}"#)
                .unwrap();
        assert_eq!(request.tariff_per_kwh, 150.0);
    }

    #[test]
    fn compare_request_flattens_sizing_fields() {
        let request: CompareRequest = serde_json::from_str(
            r#"{"hsp": 5.0, "avg_daily_kwh": 10.0, "wattages": [300, 400]}"#,
        )
        .unwrap();
        assert_eq!(request.request.panel_power_wc, 500.0);
        assert_eq!(request.wattages, Some(vec![300.0, 400.0]));
    }
}
