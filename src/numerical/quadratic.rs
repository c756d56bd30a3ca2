//! Roots of a·x² + b·x + c = 0 with complex coefficients.
//!
//! Coefficients are calculator expressions (`"1"`, `"2i"`, `"3-4i"`, `"sqrt(2)"`) evaluated
//! in the complex domain. The roots are computed without cancellation:
//! q = -(b + sgn·sqrt(D))/2 with the sign making |b + sgn·sqrt(D)| largest, x1 = q/a, x2 = c/q.
use crate::Utils::config::CalcConfig;
use crate::calculator::errors::{CalcError, CalcResult};
use crate::calculator::evaluator::{CompiledExpression, evaluate_ast};
use crate::calculator::normalizer::Domain;
use crate::calculator::number_format::format_complex_significant;
use crate::calculator::stabilizer::Stabilize;
use log::debug;
use num_complex::Complex64;
use num_traits::Zero;

#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticRoots {
    pub discriminant: Complex64,
    pub roots: Vec<Complex64>,
}

/// formatted discriminant and roots
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticSolution {
    pub discriminant: String,
    pub roots: Vec<String>,
}

fn coefficient(text: &str, name: &str, config: &CalcConfig) -> CalcResult<Complex64> {
    let compiled = CompiledExpression::compile(text, &[]).map_err(|e| {
        CalcError::new(e.kind, format!("coefficient {}: {}", name, e.message))
    })?;
    let value = evaluate_ast(&compiled.ast, Domain::Complex, &config.evaluation_context())?;
    Ok(value.as_complex())
}

/// numeric roots; `a = 0` falls back to the linear root, `a = b = 0` has none
pub fn quadratic_roots(
    a: Complex64,
    b: Complex64,
    c: Complex64,
    tolerance: f64,
) -> CalcResult<QuadraticRoots> {
    let (a, b, c) = (a.stabilize(tolerance), b.stabilize(tolerance), c.stabilize(tolerance));
    if a.is_zero() {
        if b.is_zero() {
            return Err(CalcError::domain(
                "a and b are both zero, the equation has no unknown",
            ));
        }
        return Ok(QuadraticRoots {
            discriminant: b * b,
            roots: vec![(-c / b).stabilize(tolerance)],
        });
    }
    let discriminant = (b * b - a * c * 4.0).stabilize(tolerance);
    let root = discriminant.sqrt();
    let sign = if (b.conj() * root).re >= 0.0 { 1.0 } else { -1.0 };
    let q = -(b + root * sign) / 2.0;
    let (x1, x2) = if q.is_zero() {
        // b = 0 and D = 0, so c = 0 as well
        (Complex64::zero(), Complex64::zero())
    } else {
        (q / a, c / q)
    };
    Ok(QuadraticRoots {
        discriminant,
        roots: vec![x1.stabilize(tolerance), x2.stabilize(tolerance)],
    })
}

pub fn solve_quadratic(a: &str, b: &str, c: &str, config: &CalcConfig) -> CalcResult<QuadraticSolution> {
    let roots = quadratic_roots(
        coefficient(a, "a", config)?,
        coefficient(b, "b", config)?,
        coefficient(c, "c", config)?,
        config.zero_tolerance,
    )?;
    debug!("quadratic roots {:?}", roots);
    let format = |z: &Complex64| format_complex_significant(*z, config.eigen_precision);
    Ok(QuadraticSolution {
        discriminant: format(&roots.discriminant),
        roots: roots.roots.iter().map(format).collect(),
    })
}
