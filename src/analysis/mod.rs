//! Análisis offline de los retrasos de alquiler
//!
//! Lo usa la herramienta `delay_dashboard`; la API no depende de este módulo.

pub mod delay_record;
pub mod delay_report;
pub mod stats;
pub mod threshold;

pub use delay_record::*;
pub use delay_report::{build_report, CheckoutStatus, ConsecutiveRental, DelayReport, ThresholdOptions};
pub use threshold::{simulate_thresholds, ThresholdPoint, ThresholdSimulation};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid delay export {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot read workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {path} has no sheets")]
    EmptyWorkbook { path: PathBuf },

    #[error("cannot write report {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
