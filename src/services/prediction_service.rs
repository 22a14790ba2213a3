//! Servicio de predicción de precios
//!
//! Encadena preprocesador y modelo sobre una única fila. Ambos artefactos
//! se cargan una vez y se comparten en solo lectura entre peticiones.

use crate::dto::prediction_dto::PredictionFeatures;
use crate::models::{BoostedTrees, Preprocessor};
use crate::utils::errors::{internal_error, AppResult};

/// Estimador de precio de alquiler
pub trait PriceEstimator: Send + Sync {
    fn estimate(&self, features: &PredictionFeatures) -> AppResult<f64>;

    /// Descripción breve para /health
    fn describe(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

/// Preprocesador + ensemble de árboles
pub struct PricingPipeline {
    preprocessor: Preprocessor,
    model: BoostedTrees,
}

impl PricingPipeline {
    pub fn new(preprocessor: Preprocessor, model: BoostedTrees) -> Self {
        Self { preprocessor, model }
    }
}

impl PriceEstimator for PricingPipeline {
    fn estimate(&self, features: &PredictionFeatures) -> AppResult<f64> {
        let row = features.to_row();
        let transformed = self.preprocessor.transform(&row)?;
        let prediction = self.model.predict(&transformed)?;

        if !prediction.is_finite() {
            return Err(internal_error("model produced a non-finite prediction"));
        }

        log::debug!(
            "💶 prediction={:.3} model_key={} mileage={} engine_power={}",
            prediction,
            features.model_key,
            features.mileage,
            features.engine_power
        );
        Ok(prediction)
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::json!({
            "model_trees": self.model.num_trees(),
            "input_features": self.preprocessor.output_width(),
        })
    }
}
