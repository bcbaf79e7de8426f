// Principal component analysis (PCA)

use crate::error::PcaError;
use crate::linalg_backends::{BackendEigh, LinAlgBackendProvider};
use crate::matrix::{ensure_finite, DataMatrix};
use log::debug;
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Principal component analysis (PCA) structure.
///
/// Holds a fitted model (column means, rotation matrix and per-component
/// variances) and can project data into, and back out of, principal
/// component space. Data are centered but not scaled, so components describe
/// the covariance of the raw features.
///
/// Eigenvectors are only defined up to sign. Each component is oriented so
/// that its largest-magnitude loading is positive, which keeps repeated runs
/// stable, but callers comparing against other tools must allow a sign flip
/// per component.
#[derive(Debug, Clone)]
pub struct PCA {
    /// The rotation matrix (principal components as columns).
    /// Shape: (n_features, n_components)
    rotation: Option<Array2<f64>>,
    /// Mean vector of the training data.
    /// Shape: (n_features)
    mean: Option<Array1<f64>>,
    /// Eigenvalues of the sample covariance matrix, descending.
    /// Shape: (n_components)
    explained_variance: Option<Array1<f64>>,
    /// Share of the total variance per component, computed before the
    /// variances are rescaled so it stays defined when they underflow.
    explained_variance_ratio: Option<Array1<f64>>,
}

impl Default for PCA {
    fn default() -> Self {
        Self::new()
    }
}

impl PCA {
    /// Creates a new, unfitted PCA model.
    ///
    /// # Examples
    ///
    /// ```
    /// use oligomer_pca::PCA;
    /// let pca = PCA::new();
    /// assert!(pca.rotation().is_none());
    /// ```
    pub fn new() -> Self {
        Self {
            rotation: None,
            mean: None,
            explained_variance: None,
            explained_variance_ratio: None,
        }
    }

    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.mean.as_ref()
    }

    /// Returns the rotation matrix, shape (n_features, n_components).
    /// Column k is the loading vector of principal component k.
    pub fn rotation(&self) -> Option<&Array2<f64>> {
        self.rotation.as_ref()
    }

    /// Returns the variance along each component (sample covariance eigenvalues),
    /// ordered from largest to smallest.
    pub fn explained_variance(&self) -> Option<&Array1<f64>> {
        self.explained_variance.as_ref()
    }

    /// Fraction of the total variance captured by each component.
    pub fn explained_variance_ratio(&self) -> Option<&Array1<f64>> {
        self.explained_variance_ratio.as_ref()
    }

    /// Fits the model by eigendecomposition of the p×p sample covariance matrix.
    ///
    /// All `n_features` components are kept. When there are fewer samples than
    /// features the trailing components carry zero variance but are still
    /// orthonormal, so the rotation is always square.
    ///
    /// * `data_matrix` - Input data, shape (n_samples, n_features).
    ///
    /// # Errors
    /// - `InvalidInput` for an empty matrix or a non-finite cell.
    /// - `InvalidInput` when the component variances do not fit in an f64.
    /// - `DegenerateInput` when every feature is constant (this includes a
    ///   single sample), since no direction carries any variance.
    /// - `Decomposition` if the eigensolver fails.
    pub fn fit(&mut self, mut data_matrix: Array2<f64>) -> Result<(), PcaError> {
        let (n_samples, n_features) = data_matrix.dim();
        if n_samples == 0 || n_features == 0 {
            return Err(PcaError::InvalidInput(format!(
                "input matrix has zero samples or zero features ({}x{})",
                n_samples, n_features
            )));
        }
        ensure_finite(data_matrix.view())?;

        // --- 1. Center ---
        let constant_columns: Vec<bool> = data_matrix
            .axis_iter(Axis(1))
            .map(|col| col.iter().all(|&v| v == col[0]))
            .collect();
        if constant_columns.iter().all(|&c| c) {
            return Err(PcaError::DegenerateInput(format!(
                "all {} features are constant across {} samples; total variance is zero",
                n_features, n_samples
            )));
        }

        // Work on a copy scaled by a power of two so the covariance products
        // stay within f64 range; the scaling itself is exact.
        let scale = power_of_two_scale(&data_matrix);
        data_matrix /= scale;

        let scaled_mean = data_matrix
            .mean_axis(Axis(0))
            .ok_or_else(|| PcaError::InvalidInput("failed to compute column means".to_string()))?;
        data_matrix -= &scaled_mean;
        // Constant columns center to exactly zero, even when the mean is not representable.
        for idx in constant_columns.iter().enumerate().filter_map(|(i, &c)| c.then_some(i)) {
            data_matrix.column_mut(idx).fill(0.0);
        }
        let mean_vector = scaled_mean * scale;

        // --- 2. Covariance and eigendecomposition ---
        let mut cov_matrix = data_matrix.t().dot(&data_matrix);
        cov_matrix /= (n_samples - 1) as f64;
        if cov_matrix.iter().any(|v| !v.is_finite()) {
            return Err(PcaError::Decomposition(
                "covariance matrix has non-finite entries".to_string(),
            ));
        }

        let backend = LinAlgBackendProvider::new();
        let eig = backend.eigh_upper(&cov_matrix)?;

        let mut eig_pairs: Vec<(f64, Array1<f64>)> = eig
            .eigenvalues
            .into_iter()
            .zip(eig.eigenvectors.columns().into_iter().map(|col| col.to_owned()))
            .collect();
        eig_pairs.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

        // --- 3. Normalize, orient and collect ---
        let mut rotation = Array2::<f64>::zeros((n_features, eig_pairs.len()));
        let mut scaled_variances = Array1::<f64>::zeros(eig_pairs.len());
        for (k, (eig_val, mut eig_vec)) in eig_pairs.into_iter().enumerate() {
            let norm = eig_vec.dot(&eig_vec).sqrt();
            if norm > 1e-12 {
                eig_vec /= norm;
            }
            orient_component(&mut eig_vec);
            rotation.column_mut(k).assign(&eig_vec);
            // Round-off can push zero eigenvalues slightly negative.
            scaled_variances[k] = eig_val.max(0.0);
        }

        let total = scaled_variances.sum();
        if !(total > 0.0 && total.is_finite()) {
            return Err(PcaError::DegenerateInput(format!(
                "total variance {} is not positive; explained variance ratio undefined",
                total * scale * scale
            )));
        }
        let variance_ratio = &scaled_variances / total;
        let variances = scaled_variances.mapv(|v| v * scale * scale);
        if variances.iter().any(|v| !v.is_finite()) {
            return Err(PcaError::InvalidInput(format!(
                "component variances exceed the f64 range (values scaled by {scale:e})"
            )));
        }

        debug!(
            "PCA fit on {}x{} matrix via {} backend; eigenvalues {:?}",
            n_samples,
            n_features,
            backend.name(),
            variances.to_vec()
        );

        self.mean = Some(mean_vector);
        self.rotation = Some(rotation);
        self.explained_variance = Some(variances);
        self.explained_variance_ratio = Some(variance_ratio);
        Ok(())
    }

    /// Centers `x` with the fitted mean and projects it onto the components.
    ///
    /// # Errors
    /// `NotFitted` before `fit`; `InvalidInput` if the feature count differs
    /// from the fitted model or `x` holds a non-finite value.
    pub fn transform(&self, mut x: Array2<f64>) -> Result<Array2<f64>, PcaError> {
        let rotation_matrix = self
            .rotation
            .as_ref()
            .ok_or(PcaError::NotFitted("rotation matrix not set; call fit first"))?;
        let mean_vector = self
            .mean
            .as_ref()
            .ok_or(PcaError::NotFitted("mean vector not set; call fit first"))?;

        if x.ncols() != mean_vector.len() {
            return Err(PcaError::InvalidInput(format!(
                "input has {} features but the model was fitted on {}",
                x.ncols(),
                mean_vector.len()
            )));
        }
        ensure_finite(x.view())?;

        x -= mean_vector;
        let scores = x.dot(rotation_matrix);
        ensure_finite(scores.view())?;
        Ok(scores)
    }

    /// Maps scores back into the original feature space (adds the mean back).
    ///
    /// With all components kept this exactly undoes `transform`.
    pub fn inverse_transform(&self, scores: Array2<f64>) -> Result<Array2<f64>, PcaError> {
        let rotation_matrix = self
            .rotation
            .as_ref()
            .ok_or(PcaError::NotFitted("rotation matrix not set; call fit first"))?;
        let mean_vector = self
            .mean
            .as_ref()
            .ok_or(PcaError::NotFitted("mean vector not set; call fit first"))?;

        if scores.ncols() != rotation_matrix.ncols() {
            return Err(PcaError::InvalidInput(format!(
                "scores have {} columns but the model has {} components",
                scores.ncols(),
                rotation_matrix.ncols()
            )));
        }

        let mut reconstructed = scores.dot(&rotation_matrix.t());
        reconstructed += mean_vector;
        Ok(reconstructed)
    }
}

/// Power of two close to the largest magnitude in `values`, kept within the
/// normal f64 exponent range. Returns 1 for an all-zero matrix.
fn power_of_two_scale(values: &Array2<f64>) -> f64 {
    let max_abs = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if max_abs == 0.0 {
        return 1.0;
    }
    let exponent = (max_abs.log2().ceil() as i32).clamp(f64::MIN_EXP - 1, f64::MAX_EXP - 1);
    2.0_f64.powi(exponent)
}

/// Flips `component` so its largest-magnitude entry is positive.
fn orient_component(component: &mut Array1<f64>) {
    let pivot = component
        .iter()
        .copied()
        .fold(0.0_f64, |best, v| if v.abs() > best.abs() { v } else { best });
    if pivot < 0.0 {
        component.mapv_inplace(|v| -v);
    }
}

/// Output of [`decompose`]: variance decomposition, loadings and scores of one table.
#[derive(Debug, Clone)]
pub struct PcaResult {
    sample_labels: Vec<String>,
    feature_names: Vec<String>,
    mean: Array1<f64>,
    explained_variance: Array1<f64>,
    explained_variance_ratio: Array1<f64>,
    components: Array2<f64>,
    scores: Array2<f64>,
}

impl PcaResult {
    pub fn sample_labels(&self) -> &[String] {
        &self.sample_labels
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Column means removed before decomposition.
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn explained_variance(&self) -> &Array1<f64> {
        &self.explained_variance
    }

    /// Fraction of total variance per component; sums to 1, non-increasing.
    pub fn explained_variance_ratio(&self) -> &Array1<f64> {
        &self.explained_variance_ratio
    }

    /// Loadings, shape (n_components, n_features). Row k is the unit-norm
    /// loading vector of PC k+1.
    pub fn components(&self) -> &Array2<f64> {
        &self.components
    }

    /// Scores, shape (n_samples, n_components), rows in input order.
    pub fn scores(&self) -> &Array2<f64> {
        &self.scores
    }

    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    /// Scores of every sample on component `k` (zero based).
    pub fn score_column(&self, k: usize) -> Option<ArrayView1<'_, f64>> {
        (k < self.scores.ncols()).then(|| self.scores.column(k))
    }
}

/// Decomposes a labelled table into its principal components.
///
/// Centers the columns, eigendecomposes the sample covariance and projects
/// the centered rows onto every component. Pure: the input is not modified
/// and nothing is cached.
///
/// # Errors
/// `InvalidInput` for non-finite cells, `DegenerateInput` when every column is
/// constant, `Decomposition` if the eigensolver fails.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use oligomer_pca::{decompose, DataMatrix};
///
/// let matrix = DataMatrix::new(
///     vec!["a".into(), "b".into(), "c".into()],
///     vec!["x".into(), "y".into()],
///     array![[1.0, 2.0], [2.0, 1.0], [3.0, 5.0]],
/// )
/// .unwrap();
/// let result = decompose(&matrix).unwrap();
/// let total: f64 = result.explained_variance_ratio().sum();
/// assert!((total - 1.0).abs() < 1e-9);
/// assert_eq!(result.scores().dim(), (3, 2));
/// ```
pub fn decompose(matrix: &DataMatrix) -> Result<PcaResult, PcaError> {
    let values = matrix.values().to_owned();
    let mut pca = PCA::new();
    pca.fit(values.clone())?;
    let scores = pca.transform(values)?;

    let (Some(rotation), Some(mean), Some(explained_variance), Some(explained_variance_ratio)) = (
        pca.rotation,
        pca.mean,
        pca.explained_variance,
        pca.explained_variance_ratio,
    ) else {
        return Err(PcaError::NotFitted("fit did not produce a complete model"));
    };

    Ok(PcaResult {
        sample_labels: matrix.sample_labels().to_vec(),
        feature_names: matrix.feature_names().to_vec(),
        mean,
        explained_variance,
        explained_variance_ratio,
        components: rotation.reversed_axes(),
        scores,
    })
}
