//! The closed table of functions and constants the evaluator understands.
//!
//! Nothing outside of this table (plus the caller's variable bindings) can be named in an
//! expression. Contract for the ambiguous names:
//! * `log` is ALWAYS the base-10 logarithm, `ln` is the natural one;
//! * `pi`, `π`, `e` (any case) are constants, `i`/`j` is the imaginary unit, unless the caller
//!   binds exactly that name as a variable - then the binding wins.
use std::f64::consts::{E, PI};
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// canonical spelling of the imaginary unit after normalization
pub const IMAGINARY_UNIT: &str = "imaginary_unit";
/// raw spellings of the imaginary unit
pub const IMAGINARY_TOKENS: [&str; 2] = ["i", "j"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    /// base-10 logarithm
    Log,
    Ln,
    Sqrt,
    Abs,
    Exp,
    Csin,
    Ccos,
    Ctan,
    Sqrtc,
    Expc,
}

impl Func {
    /// look a function up by any of its accepted names
    pub fn lookup(name: &str) -> Option<Func> {
        Func::from_str(name).ok()
    }

    pub fn is_function_name(name: &str) -> bool {
        Func::lookup(name).is_some()
    }

    /// functions that always use complex-analytic definitions
    pub fn is_explicit_complex(&self) -> bool {
        matches!(
            self,
            Func::Csin | Func::Ccos | Func::Ctan | Func::Sqrtc | Func::Expc
        )
    }
}

/// numeric value of a named constant; `pi`/`π`/`e` are case-insensitive
pub fn constant_value(name: &str) -> Option<f64> {
    match name.to_lowercase().as_str() {
        "pi" | "π" => Some(PI),
        "e" => Some(E),
        _ => None,
    }
}

pub fn is_imaginary_token(name: &str) -> bool {
    IMAGINARY_TOKENS.contains(&name)
}
