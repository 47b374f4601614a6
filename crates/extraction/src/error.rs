use crate::config::ConfigError;
use pointclouds_segmentation::FitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fit(#[from] FitError),

    #[error("fitted {model} is degenerate")]
    DegenerateModel { model: &'static str },
}
