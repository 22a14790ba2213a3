use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::CellValue;

/// Orden fijo de columnas con el que se ajustó el preprocesador
pub const FEATURE_COLUMNS: [&str; 13] = [
    "model_key",
    "mileage",
    "engine_power",
    "fuel",
    "paint_color",
    "car_type",
    "private_parking_available",
    "has_gps",
    "has_air_conditioning",
    "automatic_car",
    "has_getaround_connect",
    "has_speed_regulator",
    "winter_tires",
];

// Request de predicción: los trece campos son obligatorios
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct PredictionFeatures {
    pub model_key: String,
    #[validate(range(min = 0))]
    pub mileage: i64,
    #[validate(range(min = 0))]
    pub engine_power: i64,
    pub fuel: String,
    pub paint_color: String,
    pub car_type: String,
    pub private_parking_available: bool,
    pub has_gps: bool,
    pub has_air_conditioning: bool,
    pub automatic_car: bool,
    pub has_getaround_connect: bool,
    pub has_speed_regulator: bool,
    pub winter_tires: bool,
}

impl PredictionFeatures {
    /// Fila única en el orden de `FEATURE_COLUMNS`
    pub fn to_row(&self) -> Vec<(&'static str, CellValue)> {
        let values = [
            CellValue::from(self.model_key.clone()),
            CellValue::from(self.mileage),
            CellValue::from(self.engine_power),
            CellValue::from(self.fuel.clone()),
            CellValue::from(self.paint_color.clone()),
            CellValue::from(self.car_type.clone()),
            CellValue::from(self.private_parking_available),
            CellValue::from(self.has_gps),
            CellValue::from(self.has_air_conditioning),
            CellValue::from(self.automatic_car),
            CellValue::from(self.has_getaround_connect),
            CellValue::from(self.has_speed_regulator),
            CellValue::from(self.winter_tires),
        ];
        FEATURE_COLUMNS.into_iter().zip(values).collect()
    }
}

// Response de predicción
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn renault() -> serde_json::Value {
        json!({
            "model_key": "Renault",
            "mileage": 50000,
            "engine_power": 120,
            "fuel": "diesel",
            "paint_color": "black",
            "car_type": "sedan",
            "private_parking_available": false,
            "has_gps": false,
            "has_air_conditioning": false,
            "automatic_car": false,
            "has_getaround_connect": false,
            "has_speed_regulator": false,
            "winter_tires": false
        })
    }

    #[test]
    fn test_row_follows_fixed_column_order() {
        let features: PredictionFeatures = serde_json::from_value(renault()).unwrap();
        let row = features.to_row();
        let names: Vec<&str> = row.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, FEATURE_COLUMNS);
        assert_eq!(row[1].1, CellValue::Int(50000));
        assert_eq!(row[12].1, CellValue::Bool(false));
    }

    #[test]
    fn test_every_field_is_required() {
        for field in FEATURE_COLUMNS {
            let mut body = renault();
            body.as_object_mut().unwrap().remove(field);
            assert!(
                serde_json::from_value::<PredictionFeatures>(body).is_err(),
                "missing {} should be rejected",
                field
            );
        }
    }

    #[test]
    fn test_flags_must_be_booleans() {
        let mut body = renault();
        body["has_gps"] = json!("yes");
        assert!(serde_json::from_value::<PredictionFeatures>(body).is_err());

        let mut body = renault();
        body["mileage"] = json!("50000");
        assert!(serde_json::from_value::<PredictionFeatures>(body).is_err());
    }

    #[test]
    fn test_negative_mileage_fails_validation() {
        let mut body = renault();
        body["mileage"] = json!(-1);
        let features: PredictionFeatures = serde_json::from_value(body).unwrap();
        assert!(features.validate().is_err());
    }
}
