// src/linalg_backends.rs

use crate::error::PcaError;
use ndarray::{Array1, Array2};

#[cfg(not(any(
    feature = "backend_faer",
    feature = "backend_openblas",
    feature = "backend_openblas_system",
    feature = "backend_mkl",
    feature = "backend_mkl_system"
)))]
compile_error!(
    "oligomer_pca needs a linear algebra backend: enable `backend_faer` (default) or one of the ndarray-linalg LAPACK backends"
);

/// Output of a symmetric eigendecomposition.
#[derive(Debug)]
pub struct EighOutput {
    /// Eigenvalues, in whatever order the backend returns them (usually ascending).
    pub eigenvalues: Array1<f64>,
    /// Eigenvectors as columns of the matrix.
    /// eigenvectors.column(i) corresponds to eigenvalues[i].
    pub eigenvectors: Array2<f64>,
}

/// Symmetric eigendecomposition reading the upper triangle of `matrix`.
pub trait BackendEigh {
    fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EighOutput, PcaError>;
}

fn check_square(matrix: &Array2<f64>) -> Result<(), PcaError> {
    if matrix.nrows() != matrix.ncols() {
        return Err(PcaError::Decomposition(format!(
            "matrix must be square for eigendecomposition, got {}x{}",
            matrix.nrows(),
            matrix.ncols()
        )));
    }
    Ok(())
}

// --- ndarray-linalg (LAPACK) backend ---
#[cfg(any(
    feature = "backend_openblas",
    feature = "backend_openblas_system",
    feature = "backend_mkl",
    feature = "backend_mkl_system"
))]
mod lapack_specific_code {
    use super::{check_square, BackendEigh, EighOutput};
    use crate::error::PcaError;
    use ndarray::Array2;
    use ndarray_linalg::{Eigh as NdLinalgEigh, UPLO};

    #[derive(Debug, Default, Copy, Clone)]
    pub struct NdarrayLinAlgBackend;

    impl BackendEigh for NdarrayLinAlgBackend {
        fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EighOutput, PcaError> {
            check_square(matrix)?;
            let (eigenvalues, eigenvectors) = matrix
                .eigh(UPLO::Upper)
                .map_err(|e| PcaError::Decomposition(format!("LAPACK eigh failed: {e}")))?;
            Ok(EighOutput {
                eigenvalues,
                eigenvectors,
            })
        }
    }
}

// --- faer backend (pure Rust) ---
#[cfg(feature = "backend_faer")]
mod faer_specific_code {
    use super::{check_square, BackendEigh, EighOutput};
    use crate::error::PcaError;
    use faer::{Mat, Side};
    use ndarray::{Array1, Array2};

    #[derive(Debug, Default, Copy, Clone)]
    pub struct FaerLinAlgBackend;

    impl BackendEigh for FaerLinAlgBackend {
        fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EighOutput, PcaError> {
            check_square(matrix)?;
            let n = matrix.nrows();
            if n == 0 {
                return Ok(EighOutput {
                    eigenvalues: Array1::zeros(0),
                    eigenvectors: Array2::zeros((0, 0)),
                });
            }

            let faer_mat = Mat::<f64>::from_fn(n, n, |i, j| matrix[[i, j]]);
            let eig = faer_mat
                .as_ref()
                .self_adjoint_eigen(Side::Upper)
                .map_err(|e| PcaError::Decomposition(format!("faer eigendecomposition failed: {e:?}")))?;

            let diag = eig.S();
            let basis = eig.U();
            let eigenvalues = Array1::from_shape_fn(diag.dim(), |i| diag[i]);
            let eigenvectors = Array2::from_shape_fn((basis.nrows(), basis.ncols()), |(i, j)| basis[(i, j)]);
            Ok(EighOutput {
                eigenvalues,
                eigenvectors,
            })
        }
    }
}

/// Dispatches to the backend selected by compile-time feature flags.
/// `backend_faer` wins when several backends are enabled.
#[derive(Debug, Default, Copy, Clone)]
pub struct LinAlgBackendProvider;

impl LinAlgBackendProvider {
    pub fn new() -> Self {
        Self
    }

    /// Name of the active backend, for logging.
    pub fn name(&self) -> &'static str {
        #[cfg(feature = "backend_faer")]
        {
            "faer"
        }
        #[cfg(not(feature = "backend_faer"))]
        {
            "ndarray-linalg"
        }
    }
}

impl BackendEigh for LinAlgBackendProvider {
    fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EighOutput, PcaError> {
        #[cfg(feature = "backend_faer")]
        {
            faer_specific_code::FaerLinAlgBackend.eigh_upper(matrix)
        }
        #[cfg(not(feature = "backend_faer"))]
        {
            lapack_specific_code::NdarrayLinAlgBackend.eigh_upper(matrix)
        }
    }
}
