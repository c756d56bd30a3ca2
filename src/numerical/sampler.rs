//! Function sampling for plots.
//!
//! The expression is normalized and parsed once, then evaluated at every grid point with `x`
//! (and `y`) bound. Syntax and name errors fail the whole call; a point where evaluation
//! fails, or where the value is not a finite real number, is dropped from a curve and set to
//! `0.0` on a surface.
use crate::Utils::config::CalcConfig;
use crate::calculator::errors::{CalcError, CalcResult};
use crate::calculator::evaluator::{CompiledExpression, EvaluationContext};
use log::{debug, info};
use nalgebra::DMatrix;
use rayon::prelude::*;

/// `n` evenly spaced points over `[start, end]`, both ends included; one point is `start`
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampledFunction1D {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl SampledFunction1D {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// meshgrid: row `i` holds `y_i`, column `j` holds `x_j`
#[derive(Debug, Clone, PartialEq)]
pub struct SampledFunction2D {
    pub x: DMatrix<f64>,
    pub y: DMatrix<f64>,
    pub z: DMatrix<f64>,
}

fn check_bounds(min: f64, max: f64, axis: &str) -> CalcResult<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(CalcError::invalid_argument(format!(
            "{} bounds must be finite, got [{}, {}]",
            axis, min, max
        )));
    }
    Ok(())
}

fn check_count(n: usize, cap: usize) -> CalcResult<()> {
    if n == 0 {
        return Err(CalcError::invalid_argument("point count must be positive"));
    }
    if n > cap {
        return Err(CalcError::invalid_argument(format!(
            "point count {} exceeds the limit of {}",
            n, cap
        )));
    }
    Ok(())
}

/// finite real value at one point, None if the point is unusable
fn real_value(compiled: &CompiledExpression, ctx: &EvaluationContext) -> Option<f64> {
    compiled
        .eval_number(ctx)
        .ok()
        .and_then(|v| v.as_real())
        .filter(|v| v.is_finite())
}

pub fn sample_1d(
    expression: &str,
    x_min: f64,
    x_max: f64,
    point_count: usize,
    config: &CalcConfig,
) -> CalcResult<SampledFunction1D> {
    check_count(point_count, config.max_sample_points)?;
    check_bounds(x_min, x_max, "x")?;
    let compiled = CompiledExpression::compile(expression, &["x"])?;
    let mut ctx = config.evaluation_context();
    let (mut xs, mut ys) = (Vec::with_capacity(point_count), Vec::with_capacity(point_count));
    for x in linspace(x_min, x_max, point_count) {
        ctx.set_variable("x", x);
        if let Some(y) = real_value(&compiled, &ctx) {
            xs.push(x);
            ys.push(y);
        }
    }
    if xs.len() < point_count {
        debug!(
            "sample_1d '{}': dropped {} of {} points",
            expression,
            point_count - xs.len(),
            point_count
        );
    }
    Ok(SampledFunction1D { x: xs, y: ys })
}

pub fn sample_2d(
    expression: &str,
    x_range: (f64, f64),
    y_range: (f64, f64),
    point_count: usize,
    config: &CalcConfig,
) -> CalcResult<SampledFunction2D> {
    check_count(point_count, config.max_grid_points)?;
    check_bounds(x_range.0, x_range.1, "x")?;
    check_bounds(y_range.0, y_range.1, "y")?;
    let compiled = CompiledExpression::compile(expression, &["x", "y"])?;
    let xs = linspace(x_range.0, x_range.1, point_count);
    let ys = linspace(y_range.0, y_range.1, point_count);
    let n = point_count;
    // rows are independent; collect keeps their order
    let rows: Vec<Vec<f64>> = ys
        .par_iter()
        .map(|&y| {
            let mut ctx = config.evaluation_context().with_variable("y", y);
            xs.iter()
                .map(|&x| {
                    ctx.set_variable("x", x);
                    real_value(&compiled, &ctx).unwrap_or(0.0)
                })
                .collect()
        })
        .collect();
    let x_grid = DMatrix::from_fn(n, n, |_, j| xs[j]);
    let y_grid = DMatrix::from_fn(n, n, |i, _| ys[i]);
    let z_grid = DMatrix::from_fn(n, n, |i, j| rows[i][j]);
    info!("sample_2d '{}': {}x{} grid", expression, n, n);
    Ok(SampledFunction2D {
        x: x_grid,
        y: y_grid,
        z: z_grid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::errors::ErrorKind;
    use approx::assert_relative_eq;

    fn config() -> CalcConfig {
        CalcConfig::default()
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(-1.0, 1.0, 3), vec![-1.0, 0.0, 1.0]);
        assert_eq!(linspace(2.0, 5.0, 1), vec![2.0]);
        let v = linspace(0.0, 1.0, 11);
        assert_eq!(v.len(), 11);
        assert_eq!(v[10], 1.0);
        assert_relative_eq!(v[3], 0.3, epsilon = 1e-15);
    }

    #[test]
    fn test_sample_1d_drops_singular_point() {
        let curve = sample_1d("1/x", -1.0, 1.0, 3, &config()).unwrap();
        assert_eq!(curve.x, vec![-1.0, 1.0]);
        assert_eq!(curve.y, vec![-1.0, 1.0]);
    }

    #[test]
    fn test_sample_1d_drops_domain_errors() {
        let curve = sample_1d("sqrt(x)", -2.0, 2.0, 5, &config()).unwrap();
        assert_eq!(curve.x, vec![0.0, 1.0, 2.0]);
        assert_relative_eq!(curve.y[2], 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_sample_1d_notation() {
        let curve = sample_1d("2x² + 1", 0.0, 2.0, 3, &config()).unwrap();
        assert_eq!(curve.y, vec![1.0, 3.0, 9.0]);
    }

    #[test]
    fn test_sample_1d_single_point() {
        let curve = sample_1d("x + 1", 4.0, 10.0, 1, &config()).unwrap();
        assert_eq!(curve.x, vec![4.0]);
        assert_eq!(curve.y, vec![5.0]);
    }

    #[test]
    fn test_sample_1d_complex_values_dropped() {
        let curve = sample_1d("x + i", 0.0, 1.0, 4, &config()).unwrap();
        assert!(curve.is_empty());
    }

    #[test]
    fn test_whole_call_errors() {
        let err = sample_1d("sin(", 0.0, 1.0, 10, &config()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SyntaxError);
        let err = sample_1d("x + z", 0.0, 1.0, 10, &config()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NameError);
        let err = sample_2d("foo(x)", (0.0, 1.0), (0.0, 1.0), 4, &config()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NameError);
    }

    #[test]
    fn test_invalid_arguments() {
        let cfg = config().with_max_sample_points(10).with_max_grid_points(5);
        for result in [
            sample_1d("x", 0.0, 1.0, 0, &cfg).map(|_| ()),
            sample_1d("x", 0.0, 1.0, 11, &cfg).map(|_| ()),
            sample_1d("x", f64::NAN, 1.0, 5, &cfg).map(|_| ()),
            sample_2d("x", (0.0, 1.0), (0.0, 1.0), 6, &cfg).map(|_| ()),
            sample_2d("x", (0.0, 1.0), (0.0, f64::INFINITY), 3, &cfg).map(|_| ()),
        ] {
            assert_eq!(result.unwrap_err().kind, ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn test_sample_2d_layout() {
        let surface = sample_2d("x + 10y", (0.0, 2.0), (0.0, 1.0), 3, &config()).unwrap();
        assert_eq!(surface.z.shape(), (3, 3));
        assert_eq!(surface.x.shape(), (3, 3));
        // x varies along a row, y down a column
        assert_eq!(surface.x[(2, 1)], 1.0);
        assert_eq!(surface.y[(2, 1)], 1.0);
        assert_eq!(surface.z[(0, 2)], 2.0);
        assert_eq!(surface.z[(2, 0)], 10.0);
        assert_eq!(surface.z[(1, 1)], 6.0);
    }

    #[test]
    fn test_sample_2d_invalid_cells_are_zero() {
        let surface = sample_2d("1/(x*y)", (-1.0, 1.0), (-1.0, 1.0), 3, &config()).unwrap();
        assert_eq!(surface.z.shape(), (3, 3));
        assert_eq!(surface.z[(1, 1)], 0.0);
        assert_eq!(surface.z[(1, 0)], 0.0);
        assert_eq!(surface.z[(0, 0)], 1.0);
        assert_eq!(surface.z[(0, 2)], -1.0);
    }

    #[test]
    fn test_sample_2d_matches_sequential_evaluation() {
        let n = 17;
        let surface = sample_2d("sin(x)*cos(y)", (-3.0, 3.0), (-2.0, 2.0), n, &config()).unwrap();
        let xs = linspace(-3.0, 3.0, n);
        let ys = linspace(-2.0, 2.0, n);
        for i in 0..n {
            for j in 0..n {
                let expected = xs[j].sin() * ys[i].cos();
                assert_relative_eq!(surface.z[(i, j)], expected, epsilon = 1e-9);
            }
        }
    }
}
