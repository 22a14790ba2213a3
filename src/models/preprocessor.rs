//! Pipeline de preprocesamiento
//!
//! Versión exportada a JSON del `ColumnTransformer` ajustado durante el
//! entrenamiento: escalado estándar de columnas numéricas, one-hot de las
//! categóricas y columnas que pasan sin cambios. Las salidas se concatenan
//! en el orden de los transformadores.

use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::models::cell::CellValue;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("column '{0}' is missing from the input row")]
    MissingColumn(String),

    #[error("column '{column}' expects a numeric value, got '{value}'")]
    NotNumeric { column: String, value: String },

    #[error("column '{column}' has unknown category '{value}'")]
    UnknownCategory { column: String, value: String },

    #[error("invalid transformer definition: {0}")]
    InvalidDefinition(String),
}

/// Qué hacer con una categoría no vista durante el ajuste
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Ignore,
    Error,
}

/// Transformador individual del pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transformer {
    StandardScaler {
        columns: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    OneHot {
        columns: Vec<String>,
        categories: Vec<Vec<CellValue>>,
        #[serde(default)]
        drop: Vec<Option<CellValue>>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
    Passthrough {
        columns: Vec<String>,
    },
}

impl Transformer {
    fn validate(&self) -> Result<(), PreprocessError> {
        match self {
            Transformer::StandardScaler { columns, mean, scale } => {
                if mean.len() != columns.len() || scale.len() != columns.len() {
                    return Err(PreprocessError::InvalidDefinition(format!(
                        "standard_scaler has {} columns but {} means and {} scales",
                        columns.len(),
                        mean.len(),
                        scale.len()
                    )));
                }
            }
            Transformer::OneHot { columns, categories, drop, .. } => {
                if categories.len() != columns.len() {
                    return Err(PreprocessError::InvalidDefinition(format!(
                        "one_hot has {} columns but {} category lists",
                        columns.len(),
                        categories.len()
                    )));
                }
                if !drop.is_empty() && drop.len() != columns.len() {
                    return Err(PreprocessError::InvalidDefinition(format!(
                        "one_hot has {} columns but {} drop entries",
                        columns.len(),
                        drop.len()
                    )));
                }
            }
            Transformer::Passthrough { .. } => {}
        }
        Ok(())
    }

    fn output_width(&self) -> usize {
        match self {
            Transformer::StandardScaler { columns, .. } | Transformer::Passthrough { columns } => {
                columns.len()
            }
            Transformer::OneHot { categories, drop, .. } => categories
                .iter()
                .enumerate()
                .map(|(i, cats)| {
                    let dropped = drop.get(i).map_or(false, |d| d.is_some());
                    cats.len() - usize::from(dropped && !cats.is_empty())
                })
                .sum(),
        }
    }

    fn apply(&self, row: &HashMap<&str, &CellValue>, out: &mut Vec<f64>) -> Result<(), PreprocessError> {
        match self {
            Transformer::StandardScaler { columns, mean, scale } => {
                for (i, column) in columns.iter().enumerate() {
                    let x = numeric(row, column)?;
                    let s = if scale[i] == 0.0 { 1.0 } else { scale[i] };
                    out.push((x - mean[i]) / s);
                }
            }
            Transformer::OneHot { columns, categories, drop, handle_unknown } => {
                for (i, column) in columns.iter().enumerate() {
                    let value = lookup(row, column)?;
                    let dropped = drop.get(i).and_then(|d| d.as_ref());
                    let mut seen = false;
                    for category in &categories[i] {
                        let hit = category.matches(value);
                        seen |= hit;
                        if dropped.map_or(false, |d| d.matches(category)) {
                            continue;
                        }
                        out.push(if hit { 1.0 } else { 0.0 });
                    }
                    if !seen && *handle_unknown == HandleUnknown::Error {
                        return Err(PreprocessError::UnknownCategory {
                            column: column.clone(),
                            value: value.to_string(),
                        });
                    }
                }
            }
            Transformer::Passthrough { columns } => {
                for column in columns {
                    out.push(numeric(row, column)?);
                }
            }
        }
        Ok(())
    }
}

fn lookup<'a>(row: &HashMap<&str, &'a CellValue>, column: &str) -> Result<&'a CellValue, PreprocessError> {
    row.get(column)
        .copied()
        .ok_or_else(|| PreprocessError::MissingColumn(column.to_string()))
}

fn numeric(row: &HashMap<&str, &CellValue>, column: &str) -> Result<f64, PreprocessError> {
    let value = lookup(row, column)?;
    value.as_f64().ok_or_else(|| PreprocessError::NotNumeric {
        column: column.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct PreprocessorDocument {
    transformers: Vec<Transformer>,
}

/// Preprocesador ajustado, inmutable
#[derive(Debug, Clone)]
pub struct Preprocessor {
    transformers: Vec<Transformer>,
    width: usize,
}

impl Preprocessor {
    pub fn new(transformers: Vec<Transformer>) -> Result<Self, PreprocessError> {
        for t in &transformers {
            t.validate()?;
        }
        let width = transformers.iter().map(Transformer::output_width).sum();
        Ok(Self { transformers, width })
    }

    pub fn from_json(json: &str) -> Result<Self, PreprocessError> {
        let doc: PreprocessorDocument = serde_json::from_str(json)
            .map_err(|e| PreprocessError::InvalidDefinition(e.to_string()))?;
        Self::new(doc.transformers)
    }

    /// Número de features que produce `transform`
    pub fn output_width(&self) -> usize {
        self.width
    }

    /// Transformar una fila `(columna, valor)` en el vector de entrada del modelo
    pub fn transform(&self, row: &[(&str, CellValue)]) -> Result<Vec<f64>, PreprocessError> {
        let index: HashMap<&str, &CellValue> = row.iter().map(|(k, v)| (*k, v)).collect();
        let mut out = Vec::with_capacity(self.width);
        for transformer in &self.transformers {
            transformer.apply(&index, &mut out)?;
        }
        Ok(out)
    }
}
