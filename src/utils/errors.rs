//! Errores de la API de precios
//!
//! Cada error se convierte en una respuesta JSON `{error, message, details?, code?}`.
//! Los errores del cliente (400/404/422) no llegan nunca al modelo; los
//! del preprocesador o del modelo son 500.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::booster::BoosterError;
use crate::models::preprocessor::PreprocessError;

/// Errores de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unprocessable entity: {0}")]
    Unprocessable(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Preprocessing error: {0}")]
    Preprocessing(#[from] PreprocessError),

    #[error("Inference error: {0}")]
    Inference(#[from] BoosterError),

    #[error("Request timed out")]
    Timeout,

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Cuerpo JSON de las respuestas de error
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => AppError::Unprocessable(e.body_text()),
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Validation(e) => {
                log::warn!("Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Validation Error".to_string(),
                        message: "The car features are out of range".to_string(),
                        details: Some(json!(e)),
                        code: Some("VALIDATION_ERROR".to_string()),
                    },
                )
            }

            AppError::Unprocessable(msg) => {
                log::warn!("Unprocessable payload: {}", msg);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorResponse {
                        error: "Unprocessable Entity".to_string(),
                        message: msg,
                        details: None,
                        code: Some("INVALID_PAYLOAD".to_string()),
                    },
                )
            }

            AppError::BadRequest(msg) => {
                log::warn!("Bad request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Bad Request".to_string(),
                        message: msg,
                        details: None,
                        code: Some("BAD_REQUEST".to_string()),
                    },
                )
            }

            AppError::NotFound(msg) => {
                log::warn!("Resource not found: {}", msg);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse {
                        error: "Not Found".to_string(),
                        message: msg,
                        details: None,
                        code: Some("NOT_FOUND".to_string()),
                    },
                )
            }

            AppError::Preprocessing(e) => {
                log::error!("Preprocessing error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Preprocessing Error".to_string(),
                        message: "The input row could not be transformed".to_string(),
                        details: Some(json!({ "preprocessing_error": e.to_string() })),
                        code: Some("PREPROCESSING_ERROR".to_string()),
                    },
                )
            }

            AppError::Inference(e) => {
                log::error!("Inference error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Inference Error".to_string(),
                        message: "The pricing model failed to produce a prediction".to_string(),
                        details: Some(json!({ "inference_error": e.to_string() })),
                        code: Some("INFERENCE_ERROR".to_string()),
                    },
                )
            }

            AppError::Timeout => {
                log::error!("Request timed out");
                (
                    StatusCode::REQUEST_TIMEOUT,
                    ErrorResponse {
                        error: "Request Timeout".to_string(),
                        message: "The request took too long to complete".to_string(),
                        details: None,
                        code: Some("TIMEOUT".to_string()),
                    },
                )
            }

            AppError::Internal(msg) => {
                log::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal Server Error".to_string(),
                        message: "An unexpected error occurred".to_string(),
                        details: Some(json!({ "internal_error": msg })),
                        code: Some("INTERNAL_ERROR".to_string()),
                    },
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de columna inexistente
pub fn unknown_column_error(column: &str) -> AppError {
    AppError::NotFound(format!("Column '{}' does not exist in the dataset", column))
}

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}

/// Función helper para crear errores internos
pub fn internal_error(message: &str) -> AppError {
    AppError::Internal(message.to_string())
}
