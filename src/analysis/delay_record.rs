//! Registros de retraso de alquileres
//!
//! Cada fila del export describe un alquiler: tipo de check-in, estado,
//! retraso al devolver el coche y el alquiler anterior del mismo coche.
//! Se lee la hoja de cálculo original (`.xlsx`, primera hoja) o un export CSV
//! con las mismas columnas.

use calamine::{open_workbook_auto, Data, Reader};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use crate::analysis::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckinType {
    Mobile,
    Connect,
}

impl fmt::Display for CheckinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckinType::Mobile => write!(f, "mobile"),
            CheckinType::Connect => write!(f, "connect"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentalState {
    Ended,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayRecord {
    pub rental_id: i64,
    pub car_id: i64,
    pub checkin_type: CheckinType,
    pub state: RentalState,
    #[serde(default)]
    pub delay_at_checkout_in_minutes: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub previous_ended_rental_id: Option<i64>,
    #[serde(default)]
    pub time_delta_with_previous_rental_in_minutes: Option<f64>,
}

impl DelayRecord {
    pub fn is_canceled(&self) -> bool {
        self.state == RentalState::Canceled
    }

    /// Un retraso positivo al devolver el coche es un retraso
    pub fn is_late(&self) -> bool {
        self.delay_at_checkout_in_minutes.map_or(false, |d| d > 0.0)
    }

    fn normalized(mut self) -> Self {
        self.delay_at_checkout_in_minutes = self.delay_at_checkout_in_minutes.filter(|d| !d.is_nan());
        self.time_delta_with_previous_rental_in_minutes = self
            .time_delta_with_previous_rental_in_minutes
            .filter(|d| !d.is_nan());
        self
    }
}

// Los exports de hoja de cálculo escriben los ids nulables como float ("505000.0")
fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(v) if v.is_nan() => Ok(None),
        Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(Some(v as i64)),
        Some(v) => Err(serde::de::Error::custom(format!("invalid rental id {}", v))),
    }
}

/// Leer registros de un CSV con cabecera
pub fn read_delay_records<R: Read>(reader: R) -> Result<Vec<DelayRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    reader
        .deserialize::<DelayRecord>()
        .map(|record| record.map(DelayRecord::normalized))
        .collect()
}

/// Extensiones que se leen como hoja de cálculo
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Texto de una celda tal como lo escribiría un export CSV
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Leer la primera hoja de un libro; la primera fila es la cabecera.
///
/// Las filas pasan por el mismo deserializador que el CSV, así que nulos e
/// ids con formato float se tratan igual en ambos formatos.
pub fn read_delay_workbook(path: &Path) -> Result<Vec<DelayRecord>, AnalysisError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| AnalysisError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AnalysisError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?
        .map_err(|source| AnalysisError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header) => csv::StringRecord::from(header.iter().map(cell_text).collect::<Vec<_>>()),
        None => return Ok(Vec::new()),
    };

    rows.filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|row| {
            let record = csv::StringRecord::from(row.iter().map(cell_text).collect::<Vec<_>>());
            record
                .deserialize::<DelayRecord>(Some(&headers))
                .map(DelayRecord::normalized)
                .map_err(|source| AnalysisError::Csv {
                    path: path.to_path_buf(),
                    source,
                })
        })
        .collect()
}

/// Cargar el export de retrasos, eligiendo el lector por la extensión
pub fn load_delay_records(path: &Path) -> Result<Vec<DelayRecord>, AnalysisError> {
    if is_workbook(path) {
        return read_delay_workbook(path);
    }
    let file = File::open(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_delay_records(BufReader::new(file)).map_err(|source| AnalysisError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Alcance del umbral mínimo entre alquileres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdScope {
    #[default]
    Mobile,
    Connect,
    All,
}

impl ThresholdScope {
    /// ¿Aplica el umbral a un alquiler cuyo predecesor usó este check-in?
    pub fn includes(self, previous_checkin: CheckinType) -> bool {
        match self {
            ThresholdScope::Mobile => previous_checkin == CheckinType::Mobile,
            ThresholdScope::Connect => previous_checkin == CheckinType::Connect,
            ThresholdScope::All => true,
        }
    }
}

impl FromStr for ThresholdScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(ThresholdScope::Mobile),
            "connect" => Ok(ThresholdScope::Connect),
            "all" => Ok(ThresholdScope::All),
            other => Err(format!("unknown scope '{}' (expected mobile, connect or all)", other)),
        }
    }
}

impl fmt::Display for ThresholdScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdScope::Mobile => write!(f, "mobile"),
            ThresholdScope::Connect => write!(f, "connect"),
            ThresholdScope::All => write!(f, "all"),
        }
    }
}
