use serde::Deserialize;

// Query de /features
#[derive(Debug, Deserialize)]
pub struct FeatureQuery {
    pub feature: String,
}

// Query de /preview
#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub rows: i64,
}
