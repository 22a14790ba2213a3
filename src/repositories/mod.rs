//! Repositorios
//!
//! Acceso a los artefactos persistidos (dataset, preprocesador, modelo).

pub mod artifact_repository;

pub use artifact_repository::*;
