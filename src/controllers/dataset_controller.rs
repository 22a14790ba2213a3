use serde_json::{Map, Value};
use std::sync::Arc;

use crate::models::{CellValue, PriceDataset};
use crate::utils::errors::{unknown_column_error, AppError};

pub struct DatasetController {
    dataset: Arc<PriceDataset>,
}

impl DatasetController {
    pub fn new(dataset: Arc<PriceDataset>) -> Self {
        Self { dataset }
    }

    /// Valores posibles de una feature, del más frecuente al menos frecuente
    pub fn feature_values(&self, feature: &str) -> Result<Vec<CellValue>, AppError> {
        let counts = self
            .dataset
            .value_counts(feature)
            .ok_or_else(|| unknown_column_error(feature))?;

        log::info!("📋 Feature '{}' has {} distinct values", feature, counts.len());
        Ok(counts.into_iter().map(|(value, _)| value).collect())
    }

    /// Primeras filas del dataset orientadas a columnas
    pub fn preview(&self, rows: i64) -> Map<String, Value> {
        log::info!(
            "👀 Preview of {} rows requested ({} available)",
            rows,
            self.dataset.len()
        );
        self.dataset.head_as_columns(rows)
    }
}
