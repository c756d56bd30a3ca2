//! # Eigen decomposition of complex square matrices
//!
//! A = Q T Q^H with T upper triangular (complex Schur form, nalgebra). The eigenvalues are the
//! diagonal of T in the order the solver leaves them. For the k-th eigenvalue the
//! triangular system (T - t_kk I) y = 0 is solved by back substitution with y_k = 1 and
//! y_j = 0 for j > k, the eigenvector is Q y normalized to unit length. Each vector is
//! rotated so that its largest component is real and positive, which fixes the free phase.
//!
//! Near-equal diagonal entries make the back substitution divide by ~0; such denominators
//! are replaced by eps*|T| the way LAPACK's xTREVC does.
use crate::Utils::config::CalcConfig;
use crate::calculator::errors::{CalcError, CalcResult};
use crate::calculator::number_format::format_complex_significant;
use crate::calculator::stabilizer::Stabilize;
use crate::somelinalg::matrix_parser::parse_matrix;
use log::{debug, warn};
use nalgebra::{DMatrix, DVector, Schur};
use num_complex::Complex64;
use num_traits::{One, Zero};
use std::fmt;

const MAX_SCHUR_ITERATIONS: usize = 10_000;
/// relative size of a subdiagonal entry that still counts as zero
const TRIANGULAR_TOLERANCE: f64 = 1e-8;
/// back substitution rescales once a component grows past this
const GROWTH_LIMIT: f64 = 1e150;

/// eigenvalues and unit eigenvectors, vector k belongs to value k
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    pub eigenvalues: Vec<Complex64>,
    pub eigenvectors: Vec<DVector<Complex64>>,
}

/// formatted output
#[derive(Debug, Clone, PartialEq)]
pub struct EigenResult {
    pub eigenvalues: Vec<String>,
    pub eigenvectors: Vec<Vec<String>>,
}

impl fmt::Display for EigenResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (value, vector) in self.eigenvalues.iter().zip(self.eigenvectors.iter()) {
            writeln!(f, "{} -> [{}]", value, vector.join(", "))?;
        }
        Ok(())
    }
}

fn back_substitute(t: &DMatrix<Complex64>, k: usize, smin: f64) -> DVector<Complex64> {
    let n = t.nrows();
    let lambda = t[(k, k)];
    let mut y = DVector::<Complex64>::zeros(n);
    y[k] = Complex64::one();
    for i in (0..k).rev() {
        let mut sum = Complex64::zero();
        for j in (i + 1)..=k {
            sum += t[(i, j)] * y[j];
        }
        let mut denom = t[(i, i)] - lambda;
        if denom.norm() < smin {
            denom = Complex64::new(smin, 0.0);
        }
        y[i] = -sum / denom;
        let growth = y[i].norm();
        if growth > GROWTH_LIMIT {
            y /= Complex64::new(growth, 0.0);
        }
    }
    y
}

/// unit length, largest component real and positive
fn fix_norm_and_phase(x: DVector<Complex64>) -> DVector<Complex64> {
    let norm = x.norm();
    if norm == 0.0 {
        return x;
    }
    let pivot = x
        .iter()
        .copied()
        .fold(Complex64::zero(), |best, c| {
            if c.norm() > best.norm() { c } else { best }
        });
    let phase = pivot / pivot.norm();
    x * (phase.conj() / norm)
}

pub fn compute_eigen(matrix: &DMatrix<Complex64>) -> CalcResult<EigenDecomposition> {
    if !matrix.is_square() {
        return Err(CalcError::shape(format!(
            "eigen decomposition needs a square matrix, got {}x{}",
            matrix.nrows(),
            matrix.ncols()
        )));
    }
    let n = matrix.nrows();
    if n == 0 {
        return Err(CalcError::format("matrix is empty"));
    }
    if n == 1 {
        return Ok(EigenDecomposition {
            eigenvalues: vec![matrix[(0, 0)]],
            eigenvectors: vec![DVector::from_element(1, Complex64::one())],
        });
    }
    let schur = Schur::try_new(matrix.clone(), f64::EPSILON, MAX_SCHUR_ITERATIONS)
        .ok_or_else(|| CalcError::domain("Schur decomposition did not converge"))?;
    let (q, t) = schur.unpack();
    let scale = t.norm();
    for j in 0..n {
        for i in (j + 1)..n {
            if t[(i, j)].norm() > TRIANGULAR_TOLERANCE * scale.max(1.0) {
                warn!("Schur form is not triangular: |T[{},{}]| = {:e}", i, j, t[(i, j)].norm());
                return Err(CalcError::domain(
                    "Schur decomposition did not reach triangular form",
                ));
            }
        }
    }
    let smin = (f64::EPSILON * scale).max(f64::MIN_POSITIVE);
    let eigenvalues: Vec<Complex64> = (0..n).map(|k| t[(k, k)]).collect();
    let eigenvectors: Vec<DVector<Complex64>> = (0..n)
        .map(|k| fix_norm_and_phase(&q * back_substitute(&t, k, smin)))
        .collect();
    debug!("eigenvalues of {}x{} matrix: {:?}", n, n, eigenvalues);
    Ok(EigenDecomposition {
        eigenvalues,
        eigenvectors,
    })
}

/// stabilized and formatted to `config.eigen_precision` significant figures
pub fn eigen_decompose(matrix: &DMatrix<Complex64>, config: &CalcConfig) -> CalcResult<EigenResult> {
    let decomposition = compute_eigen(matrix)?;
    let format = |z: &Complex64| {
        format_complex_significant(z.stabilize(config.zero_tolerance), config.eigen_precision)
    };
    Ok(EigenResult {
        eigenvalues: decomposition.eigenvalues.iter().map(format).collect(),
        eigenvectors: decomposition
            .eigenvectors
            .iter()
            .map(|v| v.iter().map(format).collect())
            .collect(),
    })
}

pub fn eigen_from_text(text: &str, config: &CalcConfig) -> CalcResult<EigenResult> {
    let matrix = parse_matrix(text)?;
    eigen_decompose(&matrix, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::errors::ErrorKind;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn assert_eigenpairs(matrix: &DMatrix<Complex64>, decomposition: &EigenDecomposition) {
        for (lambda, v) in decomposition
            .eigenvalues
            .iter()
            .zip(decomposition.eigenvectors.iter())
        {
            assert!((v.norm() - 1.0).abs() < 1e-12);
            let residual = (matrix * v - v * *lambda).norm();
            assert!(residual < 1e-9, "residual {} for {}", residual, lambda);
        }
    }

    fn sorted(mut values: Vec<String>) -> Vec<String> {
        values.sort();
        values
    }

    #[test]
    fn test_identity() {
        let result = eigen_from_text("[[1,0],[0,1]]", &CalcConfig::default()).unwrap();
        assert_eq!(result.eigenvalues, vec!["1", "1"]);
        assert_eq!(
            sorted(result.eigenvectors.iter().map(|v| v.join(",")).collect()),
            vec!["0,1", "1,0"]
        );
    }

    #[test]
    fn test_diagonal() {
        let result = eigen_from_text("[[2,0],[0,3]]", &CalcConfig::default()).unwrap();
        assert_eq!(sorted(result.eigenvalues), vec!["2", "3"]);
    }

    #[test]
    fn test_rotation_has_imaginary_eigenvalues() {
        let result = eigen_from_text("[[0,-1],[1,0]]", &CalcConfig::default()).unwrap();
        assert_eq!(sorted(result.eigenvalues), vec!["-1i", "1i"]);
        assert_eq!(result.eigenvectors.len(), 2);
        assert!(result.eigenvectors.iter().all(|v| v.len() == 2));
    }

    #[test]
    fn test_symmetric_real_matrix() {
        let m = DMatrix::from_row_slice(2, 2, &[c(2.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(2.0, 0.0)]);
        let decomposition = compute_eigen(&m).unwrap();
        assert_eigenpairs(&m, &decomposition);
        let result = eigen_decompose(&m, &CalcConfig::default()).unwrap();
        assert_eq!(sorted(result.eigenvalues), vec!["1", "3"]);
        for v in &result.eigenvectors {
            assert_eq!(v.len(), 2);
            assert!(v.iter().all(|s| s.trim_start_matches('-') == "0.707107"));
        }
    }

    #[test]
    fn test_complex_matrix_residuals() {
        let m = DMatrix::from_row_slice(
            3,
            3,
            &[
                c(1.0, 2.0),
                c(0.5, 0.0),
                c(0.0, -1.0),
                c(2.0, 0.0),
                c(-1.0, 1.0),
                c(3.0, 0.0),
                c(0.0, 0.5),
                c(1.0, 1.0),
                c(4.0, 0.0),
            ],
        );
        let decomposition = compute_eigen(&m).unwrap();
        assert_eq!(decomposition.eigenvalues.len(), 3);
        assert_eigenpairs(&m, &decomposition);
        let trace: Complex64 = decomposition.eigenvalues.iter().sum();
        assert!((trace - m.trace()).norm() < 1e-9);
    }

    #[test]
    fn test_defective_matrix_still_returns_a_vector_per_value() {
        let result = eigen_from_text("[[1,1],[0,1]]", &CalcConfig::default()).unwrap();
        assert_eq!(result.eigenvalues, vec!["1", "1"]);
        assert_eq!(result.eigenvectors.len(), 2);
    }

    #[test]
    fn test_one_by_one() {
        let result = eigen_from_text("[[[2, -3]]]", &CalcConfig::default()).unwrap();
        assert_eq!(result.eigenvalues, vec!["2-3i"]);
        assert_eq!(result.eigenvectors, vec![vec!["1"]]);
    }

    #[test]
    fn test_precision_is_configurable() {
        let config = CalcConfig::default().with_eigen_precision(3);
        let m = DMatrix::from_row_slice(2, 2, &[c(2.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(2.0, 0.0)]);
        let result = eigen_decompose(&m, &config).unwrap();
        for v in &result.eigenvectors {
            assert!(v.iter().all(|s| s.trim_start_matches('-') == "0.707"));
        }
    }

    #[test]
    fn test_input_errors() {
        let config = CalcConfig::default();
        assert_eq!(
            eigen_from_text("[[1,2],[3]]", &config).unwrap_err().kind,
            ErrorKind::FormatError
        );
        assert_eq!(
            eigen_from_text("[[1,2,3],[4,5,6]]", &config).unwrap_err().kind,
            ErrorKind::ShapeError
        );
    }
}
