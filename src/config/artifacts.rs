//! Rutas de los artefactos del modelo
//!
//! Dataset de entrenamiento, preprocesador exportado y modelo XGBoost.

use std::env;
use std::path::PathBuf;

/// Configuración de artefactos
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    pub dataset_path: PathBuf,
    pub preprocessor_path: PathBuf,
    pub model_path: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("df_price_clean.csv"),
            preprocessor_path: PathBuf::from("preprocessor.json"),
            model_path: PathBuf::from("model_final.json"),
        }
    }
}

impl ArtifactConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            dataset_path: env::var("DATASET_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.dataset_path),
            preprocessor_path: env::var("PREPROCESSOR_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.preprocessor_path),
            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
        }
    }
}
