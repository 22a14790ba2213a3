//! Modelos de datos
//!
//! Tabla del dataset de precios, preprocesador ajustado y modelo de
//! gradient boosting. Todos son inmutables una vez cargados.

pub mod booster;
pub mod cell;
pub mod dataset;
pub mod preprocessor;

pub use booster::BoostedTrees;
pub use cell::CellValue;
pub use dataset::PriceDataset;
pub use preprocessor::Preprocessor;
