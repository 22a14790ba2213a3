pub mod dataset_dto;
pub mod prediction_dto;

pub use dataset_dto::*;
pub use prediction_dto::*;
