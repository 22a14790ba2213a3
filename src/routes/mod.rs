//! Rutas HTTP
//!
//! Ensambla los routers de la API con las capas comunes (trazas, timeout,
//! compresión, CORS y métricas).

pub mod dataset_routes;
pub mod prediction_routes;
pub mod system_routes;

use axum::{error_handling::HandleErrorLayer, middleware::from_fn_with_state, BoxError, Router};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::{cors_middleware, track_http_requests};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Crear el router completo de la aplicación
pub fn create_app(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let cors = cors_middleware(&state.config.cors_origins);

    Router::new()
        .merge(system_routes::create_system_router())
        .merge(dataset_routes::create_dataset_router())
        .merge(prediction_routes::create_prediction_router())
        .route_layer(from_fn_with_state(state.clone(), track_http_requests))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(timeout)
                .layer(TraceLayer::new_for_http())
                .into_inner(),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

async fn handle_middleware_error(error: BoxError) -> AppError {
    if error.is::<tower::timeout::error::Elapsed>() {
        AppError::Timeout
    } else {
        AppError::Internal(format!("unhandled middleware error: {}", error))
    }
}
