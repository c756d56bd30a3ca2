//! numerical consumers of the calculator
/// roots of quadratic equations with complex coefficients
pub mod quadratic;
/// evaluation of an expression over 1D and 2D grids
pub mod sampler;
