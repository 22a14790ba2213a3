//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Todo es de solo lectura salvo las métricas,
//! que son atómicas.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::middleware::metrics::AppMetrics;
use crate::models::PriceDataset;
use crate::repositories::LoadedArtifacts;
use crate::services::{PriceEstimator, PricingPipeline};

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub dataset: Arc<PriceDataset>,
    pub estimator: Arc<dyn PriceEstimator>,
    pub metrics: Arc<AppMetrics>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        dataset: PriceDataset,
        estimator: Arc<dyn PriceEstimator>,
        metrics: AppMetrics,
    ) -> Self {
        Self {
            config,
            dataset: Arc::new(dataset),
            estimator,
            metrics: Arc::new(metrics),
        }
    }

    /// Construir el estado a partir de los artefactos cargados al arrancar
    pub fn from_artifacts(
        config: EnvironmentConfig,
        artifacts: LoadedArtifacts,
        metrics: AppMetrics,
    ) -> Self {
        let pipeline = PricingPipeline::new(artifacts.preprocessor, artifacts.model);
        Self::new(config, artifacts.dataset, Arc::new(pipeline), metrics)
    }
}
