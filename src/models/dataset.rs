//! Dataset de precios en memoria
//!
//! Tabla columnar inmutable con el dataset de entrenamiento. Se carga una
//! vez al arrancar y se comparte en solo lectura entre los handlers.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::models::cell::CellValue;

/// Tabla de precios (orden de columnas y filas preservado)
#[derive(Debug, Clone, Default)]
pub struct PriceDataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl PriceDataset {
    /// Construir la tabla; las filas cortas se completan con nulos.
    ///
    /// Cada columna numérica queda con un solo tipo: si mezcla enteros y
    /// floats, los enteros pasan a float (como el dtype de pandas).
    pub fn new(columns: Vec<String>, mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        for row in rows.iter_mut() {
            row.resize(width, CellValue::Null);
        }
        for idx in 0..width {
            widen_mixed_numeric_column(&mut rows, idx);
        }
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Valores distintos de una columna, del más frecuente al menos frecuente.
    ///
    /// Los empates conservan el orden de primera aparición. Los nulos se
    /// ignoran. Devuelve `None` si la columna no existe.
    pub fn value_counts(&self, column: &str) -> Option<Vec<(CellValue, usize)>> {
        let idx = self.column_index(column)?;

        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<(CellValue, usize)> = Vec::new();
        for row in &self.rows {
            let cell = &row[idx];
            if cell.is_null() {
                continue;
            }
            match positions.get(&cell.group_key()) {
                Some(&pos) => counts[pos].1 += 1,
                None => {
                    positions.insert(cell.group_key(), counts.len());
                    counts.push((cell.clone(), 1));
                }
            }
        }

        // sort_by es estable: los empates mantienen el orden de aparición
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        Some(counts)
    }

    /// Número de filas que devuelve `head(rows)`.
    ///
    /// Un valor negativo excluye las últimas `|rows|` filas.
    pub fn head_len(&self, rows: i64) -> usize {
        let total = self.rows.len();
        if rows >= 0 {
            (rows as u64).min(total as u64) as usize
        } else {
            total.saturating_sub(rows.unsigned_abs().min(total as u64) as usize)
        }
    }

    /// Primeras filas en formato orientado a columnas:
    /// `{columna: {indice_fila: valor}}`
    pub fn head_as_columns(&self, rows: i64) -> Map<String, Value> {
        let n = self.head_len(rows);
        let mut out = Map::new();
        for (col_idx, column) in self.columns.iter().enumerate() {
            let mut cells = Map::new();
            for (row_idx, row) in self.rows.iter().take(n).enumerate() {
                let value = serde_json::to_value(&row[col_idx]).unwrap_or(Value::Null);
                cells.insert(row_idx.to_string(), value);
            }
            out.insert(column.clone(), Value::Object(cells));
        }
        out
    }
}

/// Promover a float los enteros de una columna que solo tiene números y algún float
fn widen_mixed_numeric_column(rows: &mut [Vec<CellValue>], idx: usize) {
    let mut has_float = false;
    for row in rows.iter() {
        match row[idx] {
            CellValue::Float(_) => has_float = true,
            CellValue::Int(_) | CellValue::Null => {}
            _ => return,
        }
    }
    if !has_float {
        return;
    }
    for row in rows.iter_mut() {
        if let CellValue::Int(v) = row[idx] {
            row[idx] = CellValue::Float(v as f64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PriceDataset {
        let rows = vec![
            vec!["Renault".into(), CellValue::Int(100)],
            vec!["Citroën".into(), CellValue::Int(120)],
            vec!["Renault".into(), CellValue::Int(90)],
            vec!["BMW".into(), CellValue::Null],
            vec!["Citroën".into(), CellValue::Int(100)],
            vec!["Renault".into(), CellValue::Int(100)],
        ];
        PriceDataset::new(vec!["model_key".to_string(), "engine_power".to_string()], rows)
    }

    #[test]
    fn test_value_counts_orders_by_frequency() {
        let counts = sample().value_counts("model_key").unwrap();
        let values: Vec<String> = counts.iter().map(|(v, _)| v.to_string()).collect();
        assert_eq!(values, vec!["Renault", "Citroën", "BMW"]);
        assert_eq!(counts[0].1, 3);
    }

    #[test]
    fn test_value_counts_skips_nulls_and_unknown_columns() {
        let dataset = sample();
        let counts = dataset.value_counts("engine_power").unwrap();
        assert_eq!(counts[0], (CellValue::Int(100), 3));
        assert_eq!(counts.len(), 3);
        assert!(dataset.value_counts("price").is_none());
    }

    #[test]
    fn test_mixed_numeric_column_counts_as_one_type() {
        let rows = vec![
            vec![CellValue::Int(100), CellValue::Int(1)],
            vec![CellValue::Float(100.0), CellValue::Null],
            vec![CellValue::Int(90), "n/a".into()],
            vec![CellValue::Null, CellValue::Float(2.5)],
        ];
        let dataset = PriceDataset::new(vec!["engine_power".to_string(), "other".to_string()], rows);

        let counts = dataset.value_counts("engine_power").unwrap();
        assert_eq!(counts.len(), 2);
        assert!(matches!(counts[0], (CellValue::Float(v), 2) if v == 100.0));
        assert!(matches!(counts[1].0, CellValue::Float(v) if v == 90.0));

        // Columnas con texto no se tocan
        let counts = dataset.value_counts("other").unwrap();
        assert!(matches!(counts[0].0, CellValue::Int(1)));
    }

    #[test]
    fn test_head_len_follows_pandas_semantics() {
        let dataset = sample();
        assert_eq!(dataset.head_len(0), 0);
        assert_eq!(dataset.head_len(2), 2);
        assert_eq!(dataset.head_len(100), 6);
        assert_eq!(dataset.head_len(-2), 4);
        assert_eq!(dataset.head_len(-100), 0);
    }

    #[test]
    fn test_head_as_columns_keeps_column_order() {
        let preview = sample().head_as_columns(2);
        let columns: Vec<&String> = preview.keys().collect();
        assert_eq!(columns, vec!["model_key", "engine_power"]);
        assert_eq!(preview["model_key"]["1"], Value::String("Citroën".to_string()));
        assert_eq!(preview["engine_power"].as_object().unwrap().len(), 2);
    }
}
