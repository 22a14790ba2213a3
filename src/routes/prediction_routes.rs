use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::controllers::prediction_controller::PredictionController;
use crate::dto::prediction_dto::{PredictionFeatures, PredictionResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_prediction_router() -> Router<AppState> {
    Router::new().route("/predict", post(predict))
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictionFeatures>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let Json(request) = payload?;
    let controller = PredictionController::new(state.estimator.clone(), state.metrics.clone());
    let response = controller.predict(request)?;
    Ok(Json(response))
}
