//! Middleware de métricas
//!
//! Contadores Prometheus de peticiones HTTP y de predicciones, expuestos
//! en `/metrics` en formato texto.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Instant;

use crate::state::AppState;

/// Registro de métricas de la aplicación
pub struct AppMetrics {
    registry: Registry,
    pub http_requests: IntCounterVec,
    pub predictions: IntCounter,
    pub prediction_failures: IntCounter,
    pub prediction_latency: Histogram,
}

impl AppMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("rental_pricing".to_string()), None)?;

        let http_requests = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests by route and status"),
            &["method", "path", "status"],
        )?;
        let predictions = IntCounter::new("predictions_total", "Successful price predictions")?;
        let prediction_failures =
            IntCounter::new("prediction_failures_total", "Price predictions that failed")?;
        let prediction_latency = Histogram::with_opts(
            HistogramOpts::new(
                "prediction_latency_seconds",
                "Time spent preprocessing and running the pricing model",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
        )?;

        registry.register(Box::new(http_requests.clone()))?;
        registry.register(Box::new(predictions.clone()))?;
        registry.register(Box::new(prediction_failures.clone()))?;
        registry.register(Box::new(prediction_latency.clone()))?;

        Ok(Self {
            registry,
            http_requests,
            predictions,
            prediction_failures,
            prediction_latency,
        })
    }

    /// Exportar en formato texto de Prometheus
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Contar peticiones HTTP por ruta y código de estado
pub async fn track_http_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let started = Instant::now();

    let response = next.run(request).await;

    state
        .metrics
        .http_requests
        .with_label_values(&[method.as_str(), path.as_str(), response.status().as_str()])
        .inc();
    log::debug!(
        "{} {} -> {} ({:?})",
        method,
        path,
        response.status(),
        started.elapsed()
    );
    response
}
