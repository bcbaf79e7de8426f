// src/error.rs

use std::error::Error;
use std::fmt;

/// Errors produced while building, decomposing or reporting an interface dataset.
#[derive(Debug)]
pub enum PcaError {
    /// Malformed input: empty or ragged tables, non-finite cells, mismatched
    /// lengths, or a constant column fed to the correlation.
    InvalidInput(String),
    /// The centered matrix is all zero, so no direction carries variance.
    DegenerateInput(String),
    /// A fitted model was required but `fit` has not been called.
    NotFitted(&'static str),
    /// The linear algebra backend failed.
    Decomposition(String),
    Io(std::io::Error),
    Csv(csv::Error),
    Image(image::ImageError),
    Config(serde_json::Error),
}

impl fmt::Display for PcaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PcaError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            PcaError::DegenerateInput(msg) => write!(f, "degenerate input: {msg}"),
            PcaError::NotFitted(msg) => write!(f, "PCA model not fitted: {msg}"),
            PcaError::Decomposition(msg) => write!(f, "decomposition failed: {msg}"),
            PcaError::Io(err) => write!(f, "I/O error: {err}"),
            PcaError::Csv(err) => write!(f, "CSV error: {err}"),
            PcaError::Image(err) => write!(f, "image error: {err}"),
            PcaError::Config(err) => write!(f, "dataset configuration error: {err}"),
        }
    }
}

impl Error for PcaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PcaError::Io(err) => Some(err),
            PcaError::Csv(err) => Some(err),
            PcaError::Image(err) => Some(err),
            PcaError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PcaError {
    fn from(err: std::io::Error) -> Self {
        PcaError::Io(err)
    }
}

impl From<csv::Error> for PcaError {
    fn from(err: csv::Error) -> Self {
        PcaError::Csv(err)
    }
}

impl From<image::ImageError> for PcaError {
    fn from(err: image::ImageError) -> Self {
        PcaError::Image(err)
    }
}

impl From<serde_json::Error> for PcaError {
    fn from(err: serde_json::Error) -> Self {
        PcaError::Config(err)
    }
}
