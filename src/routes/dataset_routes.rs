use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};

use crate::controllers::dataset_controller::DatasetController;
use crate::dto::dataset_dto::{FeatureQuery, PreviewQuery};
use crate::models::CellValue;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::validate_feature_name;

pub fn create_dataset_router() -> Router<AppState> {
    Router::new()
        .route("/features", get(list_feature_values))
        .route("/preview", get(preview_dataset))
}

async fn list_feature_values(
    State(state): State<AppState>,
    query: Result<Query<FeatureQuery>, QueryRejection>,
) -> Result<Json<Vec<CellValue>>, AppError> {
    let Query(query) = query?;
    let controller = DatasetController::new(state.dataset.clone());
    let feature = validate_feature_name(&query.feature)?;
    let values = controller.feature_values(feature)?;
    Ok(Json(values))
}

async fn preview_dataset(
    State(state): State<AppState>,
    query: Result<Query<PreviewQuery>, QueryRejection>,
) -> Result<Json<Map<String, Value>>, AppError> {
    let Query(query) = query?;
    let controller = DatasetController::new(state.dataset.clone());
    Ok(Json(controller.preview(query.rows)))
}
