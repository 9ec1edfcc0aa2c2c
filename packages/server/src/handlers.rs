//! HTTP handler functions for the prediction service API.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use minesight_analytics::compute_snapshot;
use minesight_analytics::filter::available_states;
use minesight_analytics_models::ConfidenceThreshold;
use minesight_mine_models::ZoneCollection;
use minesight_server_models::{
    ApiError, ApiHealth, HEALTHY, PredictRequest, PredictResponse, PredictionMetadata,
    StatesResponse,
};

use crate::{AppState, MODEL_NAME, MODEL_VERSION};

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        status: HEALTHY.to_string(),
        model: Some(MODEL_NAME.to_string()),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        timestamp: Some(Utc::now()),
    })
}

/// `GET /api/model/info`
pub async fn model_info(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.model)
}

/// `POST /api/predict`
///
/// Returns static zones with `confidence >= threshold`, in dataset order,
/// truncated to `num_predictions`.
pub async fn predict(
    state: web::Data<AppState>,
    body: web::Json<PredictRequest>,
) -> HttpResponse {
    let request = body.into_inner();
    let threshold = match ConfidenceThreshold::new(request.confidence_or_default()) {
        Ok(threshold) => threshold,
        Err(e) => {
            log::warn!("Rejected prediction request: {e}");
            return HttpResponse::BadRequest().json(ApiError {
                error: e.to_string(),
            });
        }
    };
    let limit = request.num_predictions_or_default();

    log::info!("Running prediction with confidence threshold {threshold}, limit {limit}");

    let zones: ZoneCollection = state
        .dataset
        .zones()
        .iter()
        .filter(|zone| threshold.passes(zone.properties.confidence))
        .take(limit)
        .cloned()
        .collect();

    let metadata = PredictionMetadata {
        total_predictions: zones.len(),
        confidence_threshold: threshold.value(),
        model_version: MODEL_VERSION.to_string(),
        timestamp: Some(Utc::now()),
    };

    HttpResponse::Ok().json(PredictResponse {
        zones,
        metadata: Some(metadata),
    })
}

/// `GET /api/analytics`
pub async fn analytics(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(compute_snapshot(
        state.dataset.mines(),
        state.dataset.zones(),
    ))
}

/// `GET /api/states`
///
/// Sorted distinct states, without the `"All"` picker label.
pub async fn states(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(StatesResponse {
        states: available_states(state.dataset.mines(), state.dataset.zones()),
    })
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test};
    use minesight_analytics_models::AnalyticsSnapshot;
    use minesight_server_models::ModelInfo;
    use serde_json::json;

    use super::*;
    use crate::configure;

    fn app_state() -> web::Data<AppState> {
        web::Data::new(AppState::load().unwrap())
    }

    #[actix_web::test]
    async fn health_reports_healthy() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let health: ApiHealth = test::call_and_read_body_json(&app, req).await;
        assert!(health.is_healthy());
        assert_eq!(health.model.as_deref(), Some(MODEL_NAME));
    }

    #[actix_web::test]
    async fn model_info_is_served() {
        let app =
            test::init_service(App::new().app_data(app_state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/model/info").to_request();
        let info: ModelInfo = test::call_and_read_body_json(&app, req).await;
        assert_eq!(info.model_name, MODEL_NAME);
        assert_eq!(info.input_bands, 16);
    }

    #[actix_web::test]
    async fn predict_filters_and_truncates() {
        let app =
            test::init_service(App::new().app_data(app_state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(json!({"confidence": 0.8, "num_predictions": 50}))
            .to_request();
        let all: PredictResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(all.zones.len(), 6);
        assert!(all.zones.iter().all(|z| z.properties.confidence >= 0.8));
        assert_eq!(all.metadata.as_ref().map(|m| m.total_predictions), Some(6));

        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(json!({"confidence": 0.8, "num_predictions": 2}))
            .to_request();
        let truncated: PredictResponse = test::call_and_read_body_json(&app, req).await;
        let ids: Vec<&str> = truncated
            .zones
            .iter()
            .map(|z| z.properties.id.as_str())
            .collect();
        assert_eq!(ids, vec!["pred_jh_palamu_new", "pred_od_sundargarh_new"]);
    }

    #[actix_web::test]
    async fn predict_defaults_apply_to_empty_body() {
        let app =
            test::init_service(App::new().app_data(app_state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(json!({}))
            .to_request();
        let response: PredictResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(response.zones.len(), 25);
        let metadata = response.metadata.unwrap();
        assert!((metadata.confidence_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(metadata.model_version, MODEL_VERSION);
    }

    #[actix_web::test]
    async fn predict_rejects_out_of_range_confidence() {
        let app =
            test::init_service(App::new().app_data(app_state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(json!({"confidence": 1.5}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);
    }

    #[actix_web::test]
    async fn analytics_matches_dataset() {
        let app =
            test::init_service(App::new().app_data(app_state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/analytics").to_request();
        let snapshot: AnalyticsSnapshot = test::call_and_read_body_json(&app, req).await;
        assert_eq!(snapshot.total_known_mines, 85);
        assert_eq!(snapshot.total_predicted_zones, 25);
    }

    #[actix_web::test]
    async fn states_are_sorted() {
        let app =
            test::init_service(App::new().app_data(app_state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/states").to_request();
        let body: StatesResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.states.len(), 14);
        assert!(body.states.windows(2).all(|w| w[0] < w[1]));
    }
}
