//! Middleware del sistema
//!
//! Este módulo contiene el middleware de CORS y de métricas.

pub mod cors;
pub mod metrics;

pub use cors::*;
pub use metrics::*;
