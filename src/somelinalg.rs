//! complex linear algebra: matrix literals, eigen decomposition, elementary matrix operations
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// eigenvalues and eigenvectors via complex Schur form
pub mod eigen;
pub mod matrix_ops;
/// nested-array and plain-row matrix notations
pub mod matrix_parser;
