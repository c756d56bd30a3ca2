//! Interpreter of the expression tree.
//!
//! The tree is walked once per evaluation with a scalar type fixed by the domain:
//! `f64` for the real domain, `Complex64` for the complex one. Both implement
//! [`DomainScalar`], which carries the domain rules (what is a DomainError in real mode,
//! how `%` behaves, how a power is taken). No host code is ever executed: the only things
//! an expression can reach are the operators, the registry and the caller's variables.
use crate::calculator::calc_engine::Expr;
use crate::calculator::errors::{CalcError, CalcResult};
use crate::calculator::normalizer::{Domain, Expression, normalize};
use crate::calculator::number_format::{format_complex, format_real};
use crate::calculator::registry::{Func, constant_value};
use crate::calculator::stabilizer::{DEFAULT_ZERO_TOLERANCE, Stabilize};
use log::debug;
use num_complex::Complex64;
use num_traits::{One, Zero};
use std::collections::HashMap;
use std::f64::consts::LN_10;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// scalar type an expression is evaluated over
pub trait DomainScalar:
    Copy
    + Stabilize
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    fn from_real(value: f64) -> Self;
    fn imaginary_unit() -> CalcResult<Self>;
    fn divide(self, rhs: Self) -> CalcResult<Self>;
    fn modulo(self, rhs: Self) -> CalcResult<Self>;
    fn power(self, exponent: Self, tolerance: f64) -> CalcResult<Self>;
    fn apply(func: Func, arg: Self, tolerance: f64) -> CalcResult<Self>;
    fn is_finite(&self) -> bool;
    fn into_number(self) -> Number;
}

/// `%` with the sign of the divisor: `-7 % 3 == 2`
fn floored_rem(lhs: f64, rhs: f64) -> f64 {
    let r = lhs % rhs;
    if r != 0.0 && (r < 0.0) != (rhs < 0.0) {
        r + rhs
    } else {
        r
    }
}

fn complex_function(func: Func, z: Complex64) -> CalcResult<Complex64> {
    // a signed zero selects the lower side of a branch cut: sqrt(-1 - 0i) = -i
    let z = Complex64::new(z.re + 0.0, z.im + 0.0);
    let value = match func {
        Func::Sin | Func::Csin => z.sin(),
        Func::Cos | Func::Ccos => z.cos(),
        Func::Tan | Func::Ctan => z.tan(),
        Func::Asin => z.asin(),
        Func::Acos => z.acos(),
        Func::Atan => z.atan(),
        Func::Sinh => z.sinh(),
        Func::Cosh => z.cosh(),
        Func::Tanh => z.tanh(),
        Func::Log | Func::Ln => {
            if z.is_zero() {
                return Err(CalcError::domain(format!("{}(0) is undefined", func)));
            }
            if func == Func::Log {
                z.ln() / LN_10
            } else {
                z.ln()
            }
        }
        Func::Sqrt | Func::Sqrtc => z.sqrt(),
        Func::Abs => Complex64::new(z.norm(), 0.0),
        Func::Exp | Func::Expc => z.exp(),
    };
    Ok(value)
}

impl DomainScalar for f64 {
    fn from_real(value: f64) -> Self {
        value
    }

    fn imaginary_unit() -> CalcResult<Self> {
        Err(CalcError::domain(
            "imaginary unit is not allowed in the real domain",
        ))
    }

    fn divide(self, rhs: Self) -> CalcResult<Self> {
        if rhs == 0.0 {
            return Err(CalcError::division("division by zero"));
        }
        Ok(self / rhs)
    }

    fn modulo(self, rhs: Self) -> CalcResult<Self> {
        if rhs == 0.0 {
            return Err(CalcError::division("modulo by zero"));
        }
        Ok(floored_rem(self, rhs))
    }

    fn power(self, exponent: Self, tolerance: f64) -> CalcResult<Self> {
        if self == 0.0 && exponent < 0.0 {
            return Err(CalcError::division(
                "zero cannot be raised to a negative power",
            ));
        }
        if self < 0.0 && exponent.fract() != 0.0 {
            return Err(CalcError::domain(format!(
                "negative base {} to fractional power {}",
                self, exponent
            )));
        }
        Ok(self.powf(exponent).stabilize(tolerance))
    }

    fn apply(func: Func, x: Self, tolerance: f64) -> CalcResult<Self> {
        let value = match func {
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
            Func::Tan => x.tan(),
            Func::Asin | Func::Acos if x.abs() > 1.0 => {
                return Err(CalcError::domain(format!(
                    "{}({}) is outside of [-1, 1]",
                    func, x
                )));
            }
            Func::Asin => x.asin(),
            Func::Acos => x.acos(),
            Func::Atan => x.atan(),
            Func::Sinh => x.sinh(),
            Func::Cosh => x.cosh(),
            Func::Tanh => x.tanh(),
            Func::Log | Func::Ln if x <= 0.0 => {
                return Err(CalcError::domain(format!(
                    "{}({}) needs a positive argument",
                    func, x
                )));
            }
            Func::Log => x.log10(),
            Func::Ln => x.ln(),
            Func::Sqrt if x < 0.0 => {
                return Err(CalcError::domain(format!(
                    "sqrt({}) of a negative number in the real domain",
                    x
                )));
            }
            Func::Sqrt => x.sqrt(),
            Func::Abs => x.abs(),
            Func::Exp => x.exp(),
            Func::Csin | Func::Ccos | Func::Ctan | Func::Sqrtc | Func::Expc => {
                let z = complex_function(func, Complex64::new(x, 0.0))?.stabilize(tolerance);
                if z.im != 0.0 {
                    return Err(CalcError::domain(format!(
                        "{}({}) is not real, use the complex domain",
                        func, x
                    )));
                }
                z.re
            }
        };
        Ok(value)
    }

    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }

    fn into_number(self) -> Number {
        Number::Real(self)
    }
}

impl DomainScalar for Complex64 {
    fn from_real(value: f64) -> Self {
        Complex64::new(value, 0.0)
    }

    fn imaginary_unit() -> CalcResult<Self> {
        Ok(Complex64::i())
    }

    fn divide(self, rhs: Self) -> CalcResult<Self> {
        if rhs.is_zero() {
            return Err(CalcError::division("division by zero"));
        }
        Ok(self / rhs)
    }

    fn modulo(self, rhs: Self) -> CalcResult<Self> {
        if self.im != 0.0 || rhs.im != 0.0 {
            return Err(CalcError::domain("modulo is only defined for real operands"));
        }
        f64::modulo(self.re, rhs.re).map(Complex64::from_real)
    }

    fn power(self, exponent: Self, tolerance: f64) -> CalcResult<Self> {
        if self.is_zero() {
            return if exponent.is_zero() {
                Ok(Complex64::one())
            } else if exponent.re > 0.0 {
                Ok(Complex64::zero())
            } else if exponent.im == 0.0 {
                Err(CalcError::division(
                    "zero cannot be raised to a negative power",
                ))
            } else {
                Err(CalcError::domain("zero to a complex power is undefined"))
            };
        }
        let integer_exponent = exponent.im == 0.0
            && exponent.re.fract() == 0.0
            && exponent.re.abs() <= i32::MAX as f64;
        let value = if integer_exponent {
            self.powi(exponent.re as i32)
        } else {
            self.powc(exponent)
        };
        Ok(value.stabilize(tolerance))
    }

    fn apply(func: Func, z: Self, _tolerance: f64) -> CalcResult<Self> {
        complex_function(func, z)
    }

    fn is_finite(&self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }

    fn into_number(self) -> Number {
        Number::Complex(self)
    }
}

/// value of an evaluated expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Real(f64),
    Complex(Complex64),
}

impl Number {
    /// the value as a real number, if its imaginary part is exactly zero
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Number::Real(v) => Some(*v),
            Number::Complex(z) if z.im == 0.0 => Some(z.re),
            Number::Complex(_) => None,
        }
    }

    pub fn as_complex(&self) -> Complex64 {
        match self {
            Number::Real(v) => Complex64::new(*v, 0.0),
            Number::Complex(z) => *z,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Number::Real(v) => write!(f, "{}", format_real(*v)),
            Number::Complex(z) => write!(f, "{}", format_complex(*z)),
        }
    }
}

/// evaluated value together with its canonical string rendering
#[derive(Debug, Clone, PartialEq)]
pub struct NumericResult {
    pub value: Number,
    pub rendered: String,
}

impl NumericResult {
    pub fn new(value: Number) -> Self {
        NumericResult {
            value,
            rendered: value.to_string(),
        }
    }
}

/// per-call variable bindings plus the zero-snap tolerance
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    pub variables: HashMap<String, f64>,
    pub tolerance: f64,
}

impl Default for EvaluationContext {
    fn default() -> Self {
        EvaluationContext {
            variables: HashMap::new(),
            tolerance: DEFAULT_ZERO_TOLERANCE,
        }
    }
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_variable(mut self, name: &str, value: f64) -> Self {
        self.variables.insert(name.to_string(), value);
        self
    }

    pub fn set_variable(&mut self, name: &str, value: f64) {
        self.variables.insert(name.to_string(), value);
    }

    /// bound variable first, then a registry constant
    pub fn lookup(&self, name: &str) -> CalcResult<f64> {
        if let Some(value) = self.variables.get(name) {
            return Ok(*value);
        }
        constant_value(name).ok_or_else(|| CalcError::name(format!("name '{}' is not defined", name)))
    }

    pub fn bound_names(&self) -> Vec<&str> {
        self.variables.keys().map(|k| k.as_str()).collect()
    }
}

fn eval_node<T: DomainScalar>(expr: &Expr, ctx: &EvaluationContext) -> CalcResult<T> {
    let tol = ctx.tolerance;
    match expr {
        Expr::Const(val) => Ok(T::from_real(*val)),
        Expr::ImaginaryUnit => T::imaginary_unit(),
        Expr::Var(name) => ctx.lookup(name).map(T::from_real),
        Expr::Neg(e) => Ok(-eval_node::<T>(e, ctx)?),
        Expr::Add(lhs, rhs) => Ok(eval_node::<T>(lhs, ctx)? + eval_node::<T>(rhs, ctx)?),
        Expr::Sub(lhs, rhs) => Ok(eval_node::<T>(lhs, ctx)? - eval_node::<T>(rhs, ctx)?),
        Expr::Mul(lhs, rhs) => Ok(eval_node::<T>(lhs, ctx)? * eval_node::<T>(rhs, ctx)?),
        Expr::Div(lhs, rhs) => eval_node::<T>(lhs, ctx)?.divide(eval_node::<T>(rhs, ctx)?),
        Expr::Rem(lhs, rhs) => eval_node::<T>(lhs, ctx)?.modulo(eval_node::<T>(rhs, ctx)?),
        Expr::Pow(base, exp) => {
            let value = eval_node::<T>(base, ctx)?.power(eval_node::<T>(exp, ctx)?, tol)?;
            if !value.is_finite() {
                return Err(CalcError::domain(format!("{} overflows", expr)));
            }
            Ok(value)
        }
        Expr::Call(func, arg) => {
            let value = T::apply(*func, eval_node::<T>(arg, ctx)?, tol)?;
            if !value.is_finite() {
                return Err(CalcError::domain(format!("{} is not finite", expr)));
            }
            Ok(value.stabilize(tol))
        }
    }
}

/// evaluate an already parsed tree in the given domain
pub fn evaluate_ast(ast: &Expr, domain: Domain, ctx: &EvaluationContext) -> CalcResult<Number> {
    let number = match domain {
        Domain::Real => eval_node::<f64>(ast, ctx)?.stabilize(ctx.tolerance).into_number(),
        Domain::Complex => eval_node::<Complex64>(ast, ctx)?
            .stabilize(ctx.tolerance)
            .into_number(),
    };
    let finite = match number {
        Number::Real(v) => v.is_finite(),
        Number::Complex(z) => z.re.is_finite() && z.im.is_finite(),
    };
    if !finite {
        return Err(CalcError::domain("result is not finite"));
    }
    Ok(number)
}

/// evaluate canonical text (output of the normalizer) in the given domain
pub fn evaluate(canonical: &str, domain: Domain, ctx: &EvaluationContext) -> CalcResult<NumericResult> {
    let ast = Expr::parse_expression(canonical)?;
    let value = evaluate_ast(&ast, domain, ctx)?;
    let result = NumericResult::new(value);
    debug!("{} [{}] = {}", canonical, domain, result.rendered);
    Ok(result)
}

/// normalized and parsed once, evaluated many times (grids, benchmarks)
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    pub expression: Expression,
    pub ast: Expr,
}

impl CompiledExpression {
    /// normalize and parse `raw`; every remaining name must be one of `bound`
    pub fn compile(raw: &str, bound: &[&str]) -> CalcResult<Self> {
        let expression = normalize(raw, bound)?;
        let ast = Expr::parse_expression(&expression.canonical)?;
        if let Some(unknown) = ast
            .names()
            .into_iter()
            .find(|name| !bound.contains(&name.as_str()) && constant_value(name).is_none())
        {
            return Err(CalcError::name(format!("name '{}' is not defined", unknown)));
        }
        Ok(CompiledExpression { expression, ast })
    }

    pub fn domain(&self) -> Domain {
        self.expression.domain
    }

    pub fn eval_number(&self, ctx: &EvaluationContext) -> CalcResult<Number> {
        evaluate_ast(&self.ast, self.expression.domain, ctx)
    }
}
