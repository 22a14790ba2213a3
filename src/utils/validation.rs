//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validar parámetros de query
//! antes de consultar el dataset.

use crate::utils::errors::{bad_request_error, AppResult};

/// Validar que el nombre de feature no esté en blanco.
///
/// El nombre se devuelve tal cual: `"fuel "` no es la columna `fuel`.
pub fn validate_feature_name(value: &str) -> AppResult<&str> {
    if value.trim().is_empty() {
        return Err(bad_request_error("feature must not be empty"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_feature_names_are_rejected() {
        assert!(validate_feature_name("").is_err());
        assert!(validate_feature_name("   ").is_err());
        assert!(validate_feature_name("\t").is_err());
    }

    #[test]
    fn test_feature_name_is_used_literally() {
        assert_eq!(validate_feature_name("fuel").unwrap(), "fuel");
        assert_eq!(validate_feature_name("  fuel ").unwrap(), "  fuel ");
    }
}
