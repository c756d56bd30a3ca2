//! examples of usage of RustedCalc
/// expressions, complex numbers, matrices, quadratic equations and sampling
pub mod calc_examples;
