// Principal component analysis of interface motif counts

#![doc = include_str!("../README.md")]

pub mod analysis;
pub mod correlation;
pub mod datasets;
pub mod error;
pub mod export;
mod font;
pub mod linalg_backends;
pub mod matrix;
pub mod pca;
pub mod plot;
pub mod report;

pub use correlation::{correlate, Correlation};
pub use datasets::DatasetConfig;
pub use error::PcaError;
pub use matrix::DataMatrix;
pub use pca::{decompose, PcaResult, PCA};
