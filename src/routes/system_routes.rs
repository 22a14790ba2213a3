use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::state::AppState;
use crate::utils::errors::{internal_error, AppError};

pub fn create_system_router() -> Router<AppState> {
    Router::new()
        .route("/", get(api_description))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
}

/// Descripción de la API y de las features esperadas por /predict
async fn api_description() -> Json<serde_json::Value> {
    Json(json!({
        "title": "Get Around API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Suggests the optimal daily rental price of a car from its features",
        "endpoints": {
            "GET /preview?rows=<n>": "first rows of the training dataset",
            "GET /features?feature=<name>": "possible values of a feature, most frequent first",
            "POST /predict": "rental price prediction for the given car features"
        },
        "features": crate::dto::prediction_dto::FEATURE_COLUMNS
    }))
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "rental-pricing",
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "dataset_rows": state.dataset.len(),
        "model": state.estimator.describe()
    }))
}

async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state
        .metrics
        .render()
        .map_err(|e| internal_error(&e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
