//! Carga de artefactos desde disco
//!
//! El dataset, el preprocesador y el modelo se leen una sola vez al arrancar.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::ArtifactConfig;
use crate::models::booster::BoosterError;
use crate::models::preprocessor::PreprocessError;
use crate::models::{BoostedTrees, CellValue, Preprocessor, PriceDataset};

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid preprocessor {path}: {source}")]
    Preprocessor {
        path: PathBuf,
        #[source]
        source: PreprocessError,
    },

    #[error("invalid model {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: BoosterError,
    },
}

/// Todos los artefactos cargados
pub struct LoadedArtifacts {
    pub dataset: PriceDataset,
    pub preprocessor: Preprocessor,
    pub model: BoostedTrees,
}

pub struct ArtifactRepository {
    config: ArtifactConfig,
}

impl ArtifactRepository {
    pub fn new(config: ArtifactConfig) -> Self {
        Self { config }
    }

    pub fn load_all(&self) -> Result<LoadedArtifacts, ArtifactError> {
        Ok(LoadedArtifacts {
            dataset: load_dataset(&self.config.dataset_path)?,
            preprocessor: load_preprocessor(&self.config.preprocessor_path)?,
            model: load_model(&self.config.model_path)?,
        })
    }
}

/// Leer el dataset de precios desde un CSV con cabecera
pub fn load_dataset(path: &Path) -> Result<PriceDataset, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_dataset(BufReader::new(file)).map_err(|source| ArtifactError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Leer un dataset desde cualquier lector CSV
pub fn read_dataset<R: std::io::Read>(reader: R) -> Result<PriceDataset, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(CellValue::parse).collect());
    }
    Ok(PriceDataset::new(columns, rows))
}

pub fn load_preprocessor(path: &Path) -> Result<Preprocessor, ArtifactError> {
    let content = read_to_string(path)?;
    Preprocessor::from_json(&content).map_err(|source| ArtifactError::Preprocessor {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_model(path: &Path) -> Result<BoostedTrees, ArtifactError> {
    let content = read_to_string(path)?;
    BoostedTrees::from_json(&content).map_err(|source| ArtifactError::Model {
        path: path.to_path_buf(),
        source,
    })
}

fn read_to_string(path: &Path) -> Result<String, ArtifactError> {
    fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_dataset_types_cells() {
        let csv = ",model_key,mileage,fuel,has_gps,rental_price_per_day\n\
                   0,Citroën,140411,diesel,True,106\n\
                   1,Peugeot,13929,petrol,False,\n";
        let dataset = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.columns()[0], "");
        assert_eq!(dataset.column_index("has_gps"), Some(4));

        let preview = dataset.head_as_columns(2);
        assert_eq!(preview["mileage"]["0"], serde_json::json!(140411));
        assert_eq!(preview["has_gps"]["1"], serde_json::json!(false));
        assert_eq!(preview["rental_price_per_day"]["1"], serde_json::Value::Null);
    }

    #[test]
    fn test_read_dataset_settles_numeric_columns() {
        let csv = "model_key,engine_power,mileage\n\
                   Renault,100,140411\n\
                   Citroën,100.0,\n\
                   BMW,90,13929\n";
        let dataset = read_dataset(csv.as_bytes()).unwrap();

        let counts = dataset.value_counts("engine_power").unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].1, 2);

        let preview = dataset.head_as_columns(3);
        assert_eq!(preview["engine_power"]["0"], serde_json::json!(100.0));
        assert!(preview["engine_power"]["0"].is_f64());
        // Enteros con nulos siguen siendo enteros
        assert!(preview["mileage"]["0"].is_i64());
    }

    #[test]
    fn test_missing_files_are_io_errors() {
        let err = load_model(Path::new("/nonexistent/model_final.json")).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
    }
}
