//! Elementary matrix algebra over complex entries: sum, difference, product, transpose,
//! determinant and inverse, plus a text front end that parses the operands and formats the
//! answer the same way as the eigen output.
use crate::Utils::config::CalcConfig;
use crate::calculator::errors::{CalcError, CalcResult};
use crate::calculator::number_format::format_complex_significant;
use crate::calculator::stabilizer::Stabilize;
use crate::somelinalg::matrix_parser::parse_any_matrix;
use log::{info, warn};
use nalgebra::DMatrix;
use num_complex::Complex64;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum MatrixOp {
    Add,
    Subtract,
    Multiply,
    Transpose,
    Determinant,
    Inverse,
}

impl MatrixOp {
    /// true for operations that take a second matrix
    pub fn is_binary(&self) -> bool {
        matches!(self, MatrixOp::Add | MatrixOp::Subtract | MatrixOp::Multiply)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatrixOpResult {
    Matrix(Vec<Vec<String>>),
    Scalar(String),
}

type CMatrix = DMatrix<Complex64>;

fn same_shape(a: &CMatrix, b: &CMatrix, op: &str) -> CalcResult<()> {
    if a.shape() != b.shape() {
        return Err(CalcError::shape(format!(
            "cannot {} a {}x{} and a {}x{} matrix",
            op,
            a.nrows(),
            a.ncols(),
            b.nrows(),
            b.ncols()
        )));
    }
    Ok(())
}

fn require_square(a: &CMatrix, op: &str) -> CalcResult<()> {
    if !a.is_square() {
        return Err(CalcError::shape(format!(
            "{} needs a square matrix, got {}x{}",
            op,
            a.nrows(),
            a.ncols()
        )));
    }
    Ok(())
}

pub fn add(a: &CMatrix, b: &CMatrix) -> CalcResult<CMatrix> {
    same_shape(a, b, "add")?;
    Ok(a + b)
}

pub fn subtract(a: &CMatrix, b: &CMatrix) -> CalcResult<CMatrix> {
    same_shape(a, b, "subtract")?;
    Ok(a - b)
}

pub fn multiply(a: &CMatrix, b: &CMatrix) -> CalcResult<CMatrix> {
    if a.ncols() != b.nrows() {
        return Err(CalcError::shape(format!(
            "cannot multiply {}x{} by {}x{}: inner dimensions differ",
            a.nrows(),
            a.ncols(),
            b.nrows(),
            b.ncols()
        )));
    }
    Ok(a * b)
}

pub fn transpose(a: &CMatrix) -> CMatrix {
    a.transpose()
}

pub fn determinant(a: &CMatrix) -> CalcResult<Complex64> {
    require_square(a, "determinant")?;
    Ok(a.clone().determinant())
}

/// |det| relative to its Hadamard bound, the product of the row norms; 0 for a zero row
fn relative_determinant(a: &CMatrix, det: Complex64) -> f64 {
    let bound: f64 = a.row_iter().map(|row| row.norm()).product();
    if bound == 0.0 { 0.0 } else { det.norm() / bound }
}

/// fails with DomainError if |det| is below `tolerance` times the product of the row norms
pub fn inverse(a: &CMatrix, tolerance: f64) -> CalcResult<CMatrix> {
    require_square(a, "inverse")?;
    let det = a.clone().determinant();
    if relative_determinant(a, det) < tolerance {
        warn!("Matrix is singular. Determinant = {:.8}", det);
        return Err(CalcError::domain("matrix is singular"));
    }
    a.clone()
        .try_inverse()
        .ok_or_else(|| CalcError::domain("matrix is singular"))
}

fn format_matrix(m: &CMatrix, config: &CalcConfig) -> Vec<Vec<String>> {
    m.row_iter()
        .map(|row| {
            row.iter()
                .map(|z| {
                    format_complex_significant(
                        z.stabilize(config.zero_tolerance),
                        config.eigen_precision,
                    )
                })
                .collect()
        })
        .collect()
}

/// parse the operand(s), apply `op`, format the answer
pub fn matrix_operation(
    op: MatrixOp,
    a_text: &str,
    b_text: Option<&str>,
    config: &CalcConfig,
) -> CalcResult<MatrixOpResult> {
    let a = parse_any_matrix(a_text)?;
    let second = if op.is_binary() {
        let text = b_text.ok_or_else(|| {
            CalcError::invalid_argument(format!("{} needs a second matrix", op))
        })?;
        Some(parse_any_matrix(text)?)
    } else {
        None
    };
    let result = match (op, second) {
        (MatrixOp::Add, Some(b)) => MatrixOpResult::Matrix(format_matrix(&add(&a, &b)?, config)),
        (MatrixOp::Subtract, Some(b)) => {
            MatrixOpResult::Matrix(format_matrix(&subtract(&a, &b)?, config))
        }
        (MatrixOp::Multiply, Some(b)) => {
            MatrixOpResult::Matrix(format_matrix(&multiply(&a, &b)?, config))
        }
        (MatrixOp::Transpose, _) => MatrixOpResult::Matrix(format_matrix(&transpose(&a), config)),
        (MatrixOp::Determinant, _) => MatrixOpResult::Scalar(format_complex_significant(
            determinant(&a)?.stabilize(config.zero_tolerance),
            config.eigen_precision,
        )),
        (MatrixOp::Inverse, _) => MatrixOpResult::Matrix(format_matrix(
            &inverse(&a, config.zero_tolerance)?,
            config,
        )),
        (op, None) => {
            return Err(CalcError::invalid_argument(format!(
                "{} needs a second matrix",
                op
            )));
        }
    };
    info!("matrix {} done", op);
    Ok(result)
}
