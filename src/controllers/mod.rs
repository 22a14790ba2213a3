pub mod dataset_controller;
pub mod prediction_controller;

pub use dataset_controller::*;
pub use prediction_controller::*;
