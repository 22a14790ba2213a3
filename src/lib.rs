//! API de estimación del precio de alquiler diario de coches y análisis de
//! retrasos entre alquileres consecutivos.

pub mod analysis;
pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
