use approx::assert_abs_diff_eq;
use ndarray::{Array2, Axis};
use oligomer_pca::{decompose, DataMatrix, PcaError, PcaResult};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const TOL: f64 = 1e-9;

fn generate_random_data(n_samples: usize, n_features: usize, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Array2::from_shape_fn((n_samples, n_features), |_| {
        rng.gen_range(0..=7) as f64 // motif-like counts
    })
}

fn labelled(values: Array2<f64>) -> DataMatrix {
    let (n, p) = values.dim();
    DataMatrix::new(
        (0..n).map(|i| format!("sample{i}")).collect(),
        (0..p).map(|j| format!("feature{j}")).collect(),
        values,
    )
    .unwrap()
}

/// Random tables of assorted shapes, skipping the rare draw with no variance.
fn random_matrices() -> Vec<DataMatrix> {
    let shapes = [(4, 3), (5, 2), (10, 4), (3, 5), (2, 2), (30, 6), (6, 1)];
    let mut out = Vec::new();
    for (seed, &(n, p)) in shapes.iter().enumerate() {
        for rep in 0..4u64 {
            let values = generate_random_data(n, p, seed as u64 * 100 + rep);
            let varies = values
                .axis_iter(Axis(1))
                .any(|col| col.iter().any(|&v| v != col[0]));
            if varies {
                out.push(labelled(values));
            }
        }
    }
    assert!(out.len() > 20);
    out
}

fn centered(matrix: &DataMatrix) -> Array2<f64> {
    let values = matrix.values().to_owned();
    let mean = values.mean_axis(Axis(0)).unwrap();
    values - &mean
}

fn assert_columns_equal_up_to_sign(a: &Array2<f64>, b: &Array2<f64>, tol: f64) {
    assert_eq!(a.dim(), b.dim());
    for (col_a, col_b) in a.axis_iter(Axis(1)).zip(b.axis_iter(Axis(1))) {
        let same = (&col_a - &col_b).iter().all(|d| d.abs() < tol);
        let flipped = (&col_a + &col_b).iter().all(|d| d.abs() < tol);
        assert!(same || flipped, "columns differ beyond sign: {col_a:?} vs {col_b:?}");
    }
}

#[test]
fn test_explained_variance_ratio_sums_to_one_and_is_sorted() {
    for matrix in random_matrices() {
        let result = decompose(&matrix).unwrap();
        let ratios = result.explained_variance_ratio();
        assert_eq!(ratios.len(), matrix.ncols());
        assert_abs_diff_eq!(ratios.sum(), 1.0, epsilon = TOL);
        for r in ratios.iter() {
            assert!((0.0..=1.0 + TOL).contains(r), "ratio out of range: {r}");
        }
        for pair in ratios.to_vec().windows(2) {
            assert!(pair[0] >= pair[1], "ratios not sorted: {ratios:?}");
        }
    }
}

#[test]
fn test_components_are_orthonormal() {
    for matrix in random_matrices() {
        let result = decompose(&matrix).unwrap();
        let components = result.components();
        let p = matrix.ncols();
        assert_eq!(components.dim(), (p, p));
        let gram = components.dot(&components.t());
        for i in 0..p {
            for j in 0..p {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(gram[[i, j]], expected, epsilon = TOL);
            }
        }
    }
}

#[test]
fn test_scores_have_zero_column_means() {
    for matrix in random_matrices() {
        let result = decompose(&matrix).unwrap();
        assert_eq!(result.scores().dim(), (matrix.nrows(), matrix.ncols()));
        let means = result.scores().mean_axis(Axis(0)).unwrap();
        for m in means.iter() {
            assert_abs_diff_eq!(*m, 0.0, epsilon = TOL);
        }
    }
}

#[test]
fn test_scores_times_components_recovers_centered_data() {
    for matrix in random_matrices() {
        let result = decompose(&matrix).unwrap();
        let rebuilt = result.scores().dot(result.components());
        let expected = centered(&matrix);
        for (a, b) in rebuilt.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = TOL);
        }
    }
}

#[test]
fn test_scores_are_projections_on_components() {
    let matrix = labelled(generate_random_data(8, 3, 7));
    let result = decompose(&matrix).unwrap();
    let x = centered(&matrix);
    for i in 0..matrix.nrows() {
        for k in 0..result.n_components() {
            let expected: f64 = (0..matrix.ncols())
                .map(|j| x[[i, j]] * result.components()[[k, j]])
                .sum();
            assert_abs_diff_eq!(result.scores()[[i, k]], expected, epsilon = TOL);
        }
    }
}

#[test]
fn test_explained_variance_matches_score_variance() {
    let matrix = labelled(generate_random_data(12, 4, 99));
    let result: PcaResult = decompose(&matrix).unwrap();
    let n = matrix.nrows() as f64;
    for k in 0..result.n_components() {
        let column = result.score_column(k).unwrap();
        let var = column.iter().map(|v| v * v).sum::<f64>() / (n - 1.0);
        assert_abs_diff_eq!(var, result.explained_variance()[k], epsilon = 1e-9);
    }
}

#[test]
fn test_repeated_decomposition_is_stable_up_to_sign() {
    for matrix in random_matrices() {
        let first = decompose(&matrix).unwrap();
        let second = decompose(&matrix).unwrap();
        assert_eq!(first.explained_variance_ratio(), second.explained_variance_ratio());
        assert_columns_equal_up_to_sign(first.scores(), second.scores(), TOL);
    }
}

#[test]
fn test_single_column_has_unit_ratio() {
    let matrix = labelled(ndarray::array![[1.0], [4.0], [2.0], [7.0]]);
    let result = decompose(&matrix).unwrap();
    assert_eq!(result.explained_variance_ratio().len(), 1);
    assert_abs_diff_eq!(result.explained_variance_ratio()[0], 1.0, epsilon = TOL);
    assert_abs_diff_eq!(result.components()[[0, 0]].abs(), 1.0, epsilon = TOL);
}

#[test]
fn test_identical_rows_are_degenerate() {
    let matrix = labelled(ndarray::array![[2.0, 3.0, 1.0], [2.0, 3.0, 1.0], [2.0, 3.0, 1.0]]);
    assert!(matches!(decompose(&matrix), Err(PcaError::DegenerateInput(_))));

    let fractional = labelled(ndarray::array![[0.1, 0.7], [0.1, 0.7], [0.1, 0.7]]);
    assert!(matches!(decompose(&fractional), Err(PcaError::DegenerateInput(_))));

    let single_row = labelled(ndarray::array![[1.0, 2.0]]);
    assert!(matches!(decompose(&single_row), Err(PcaError::DegenerateInput(_))));
}

#[test]
fn test_decompose_does_not_modify_input() {
    let matrix = labelled(generate_random_data(5, 3, 3));
    let before = matrix.clone();
    decompose(&matrix).unwrap();
    assert_eq!(matrix, before);
}

#[test]
fn test_decomposition_is_invariant_to_magnitude() {
    for matrix in random_matrices().into_iter().take(8) {
        let reference = decompose(&matrix).unwrap();
        for factor in [1e-250, 1e-150, 1e150] {
            let rescaled = labelled(matrix.values().mapv(|v| v * factor));
            let result = decompose(&rescaled).unwrap();
            let ratios = result.explained_variance_ratio();
            assert!(ratios.iter().all(|r| r.is_finite()), "non-finite ratio at {factor:e}");
            assert_abs_diff_eq!(ratios.sum(), 1.0, epsilon = TOL);
            for (a, b) in ratios.iter().zip(reference.explained_variance_ratio().iter()) {
                assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
            }
            // Only well-separated components have a unique direction to compare.
            let reference_ratios = reference.explained_variance_ratio();
            let separated: Vec<usize> = (0..reference_ratios.len())
                .filter(|&k| {
                    (0..reference_ratios.len())
                        .all(|j| j == k || (reference_ratios[j] - reference_ratios[k]).abs() > 1e-6)
                })
                .collect();
            let unscaled_scores = result.scores().mapv(|v| v / factor);
            let pick = |scores: &Array2<f64>| scores.select(Axis(1), &separated);
            assert_columns_equal_up_to_sign(&pick(&unscaled_scores), &pick(reference.scores()), 1e-8);
        }
    }
}

#[test]
fn test_variance_overflow_is_an_error_not_nan() {
    let matrix = labelled(ndarray::array![[1e200, 0.0], [-1e200, 1.0], [3e199, 2.0]]);
    assert!(matches!(decompose(&matrix), Err(PcaError::InvalidInput(_))));
}
