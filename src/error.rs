//! Error types for trackfilter

use std::fmt;

use thiserror::Error;

/// Stage of the smoother in which a matrix solve failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmootherStage {
    /// Forward pass, innovation covariance solve
    Filter,
    /// Backward pass, predicted covariance solve
    Smoother,
}

impl fmt::Display for SmootherStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmootherStage::Filter => write!(f, "forward filter"),
            SmootherStage::Smoother => write!(f, "backward smoother"),
        }
    }
}

/// trackfilter error type
#[derive(Error, Debug)]
pub enum TrackError {
    #[error("invalid coordinate: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("numeric instability in {stage} at step {step}")]
    NumericInstability { step: usize, stage: SmootherStage },

    #[error("GPX error: {0}")]
    Gpx(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("report serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<gpx::errors::GpxError> for TrackError {
    fn from(e: gpx::errors::GpxError) -> Self {
        TrackError::Gpx(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackError>;
