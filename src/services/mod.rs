//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación. El servicio
//! de predicción encapsula el preprocesamiento y la inferencia del modelo.

pub mod prediction_service;

pub use prediction_service::*;
