//! Configuración del proyecto
//!
//! Este módulo contiene la configuración del servidor, las rutas de los
//! artefactos del modelo y otras configuraciones del sistema.

pub mod artifacts;
pub mod environment;

pub use artifacts::*;
pub use environment::*;
