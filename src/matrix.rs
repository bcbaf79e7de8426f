// src/matrix.rs

use crate::error::PcaError;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

/// A labelled n×p table of real values.
///
/// Rows are samples (for example an oligomer assembly) and columns are
/// features (for example the `Shared`, `Novel` and `Lost` motif counts).
/// The table is validated once at construction and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DataMatrix {
    sample_labels: Vec<String>,
    feature_names: Vec<String>,
    values: Array2<f64>,
}

impl DataMatrix {
    /// Builds a matrix from a dense array and its row/column labels.
    ///
    /// # Errors
    /// Returns `PcaError::InvalidInput` if the array has zero rows or zero
    /// columns, if the label counts do not match the array shape, or if any
    /// cell is NaN or infinite.
    pub fn new(
        sample_labels: Vec<String>,
        feature_names: Vec<String>,
        values: Array2<f64>,
    ) -> Result<Self, PcaError> {
        let (n_samples, n_features) = values.dim();
        if n_samples == 0 || n_features == 0 {
            return Err(PcaError::InvalidInput(format!(
                "data matrix must have at least one row and one column, got {}x{}",
                n_samples, n_features
            )));
        }
        if sample_labels.len() != n_samples {
            return Err(PcaError::InvalidInput(format!(
                "{} sample labels given for {} rows",
                sample_labels.len(),
                n_samples
            )));
        }
        if feature_names.len() != n_features {
            return Err(PcaError::InvalidInput(format!(
                "{} feature names given for {} columns",
                feature_names.len(),
                n_features
            )));
        }
        ensure_finite(values.view())?;

        Ok(Self {
            sample_labels,
            feature_names,
            values,
        })
    }

    /// Builds a matrix from row vectors, rejecting ragged rows.
    pub fn from_rows(
        sample_labels: Vec<String>,
        feature_names: Vec<String>,
        rows: &[Vec<f64>],
    ) -> Result<Self, PcaError> {
        let n_features = feature_names.len();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_features) {
            return Err(PcaError::InvalidInput(format!(
                "row {} has {} values, expected {}",
                idx,
                row.len(),
                n_features
            )));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let values = Array2::from_shape_vec((rows.len(), n_features), flat)
            .map_err(|e| PcaError::InvalidInput(format!("cannot shape rows into a matrix: {e}")))?;
        Self::new(sample_labels, feature_names, values)
    }

    pub fn sample_labels(&self) -> &[String] {
        &self.sample_labels
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Looks up a feature column by name.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.feature_names
            .iter()
            .position(|f| f == name)
            .map(|idx| self.values.index_axis(Axis(1), idx))
    }
}

/// Rejects NaN and infinite cells, reporting the first offending position.
pub(crate) fn ensure_finite(values: ArrayView2<'_, f64>) -> Result<(), PcaError> {
    for ((row, col), &val) in values.indexed_iter() {
        if !val.is_finite() {
            return Err(PcaError::InvalidInput(format!(
                "non-finite value {} at row {}, column {}",
                val, row, col
            )));
        }
    }
    Ok(())
}
