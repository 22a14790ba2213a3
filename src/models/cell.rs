//! Valores de celda tipados
//!
//! Las celdas del dataset y las columnas de la fila de predicción comparten
//! este tipo para que el preprocesador trate igual a ambas.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Valor de una celda tabular
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Inferir el tipo de una celda leída de un CSV
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Null;
        }
        match trimmed {
            "True" | "true" => return CellValue::Bool(true),
            "False" | "false" => return CellValue::Bool(false),
            _ => {}
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_nan() {
                return CellValue::Null;
            }
            return CellValue::Float(f);
        }
        CellValue::Text(raw.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Valor numérico de la celda (los booleanos cuentan como 0/1)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            CellValue::Null | CellValue::Text(_) => None,
        }
    }

    /// Igualdad entre tipos: 1 == 1.0 y `true` == "True"
    pub fn matches(&self, other: &CellValue) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Bool(b), CellValue::Text(t)) | (CellValue::Text(t), CellValue::Bool(b)) => {
                t.eq_ignore_ascii_case(if *b { "true" } else { "false" })
            }
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Int(_) | CellValue::Float(_), CellValue::Int(_) | CellValue::Float(_)) => {
                self.as_f64() == other.as_f64()
            }
            _ => false,
        }
    }

    /// Clave hashable para agrupar valores idénticos
    pub(crate) fn group_key(&self) -> String {
        match self {
            CellValue::Null => "n:".to_string(),
            CellValue::Bool(b) => format!("b:{}", b),
            CellValue::Int(i) => format!("i:{}", i),
            CellValue::Float(f) => format!("f:{}", f),
            CellValue::Text(t) => format!("t:{}", t),
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "null"),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Text(t) => write!(f, "{}", t),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_infers_types() {
        assert_eq!(CellValue::parse(""), CellValue::Null);
        assert_eq!(CellValue::parse("True"), CellValue::Bool(true));
        assert_eq!(CellValue::parse("42"), CellValue::Int(42));
        assert_eq!(CellValue::parse("4.5"), CellValue::Float(4.5));
        assert_eq!(CellValue::parse("Citroën"), CellValue::Text("Citroën".to_string()));
    }

    #[test]
    fn test_cross_type_matching() {
        assert!(CellValue::Int(1).matches(&CellValue::Float(1.0)));
        assert!(CellValue::Bool(true).matches(&CellValue::Text("True".to_string())));
        assert!(!CellValue::Int(1).matches(&CellValue::Text("1".to_string())));
    }

    #[test]
    fn test_serializes_as_plain_json() {
        let values = vec![
            CellValue::Null,
            CellValue::Bool(false),
            CellValue::Int(3),
            CellValue::Text("diesel".to_string()),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[null,false,3,"diesel"]"#);
    }
}
