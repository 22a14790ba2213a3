use std::sync::Arc;
use std::time::Instant;
use validator::Validate;

use crate::dto::prediction_dto::{PredictionFeatures, PredictionResponse};
use crate::middleware::metrics::AppMetrics;
use crate::services::PriceEstimator;
use crate::utils::errors::AppError;

pub struct PredictionController {
    estimator: Arc<dyn PriceEstimator>,
    metrics: Arc<AppMetrics>,
}

impl PredictionController {
    pub fn new(estimator: Arc<dyn PriceEstimator>, metrics: Arc<AppMetrics>) -> Self {
        Self { estimator, metrics }
    }

    pub fn predict(&self, request: PredictionFeatures) -> Result<PredictionResponse, AppError> {
        // Validar rangos antes de tocar el modelo
        request.validate()?;

        let timer = Instant::now();
        let result = self.estimator.estimate(&request);
        self.metrics
            .prediction_latency
            .observe(timer.elapsed().as_secs_f64());

        match result {
            Ok(prediction) => {
                self.metrics.predictions.inc();
                Ok(PredictionResponse { prediction })
            }
            Err(e) => {
                self.metrics.prediction_failures.inc();
                Err(e)
            }
        }
    }
}
