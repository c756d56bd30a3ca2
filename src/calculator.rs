//! # Calculator
//! Safe evaluation of free-form math notation.
//!
//! Pipeline: raw text -> [`normalizer`] (tokens, implicit multiplication, domain detection)
//! -> [`calc_engine`] (AST) -> [`evaluator`] (real or complex interpreter) -> [`stabilizer`]
//! -> [`number_format`].
//! ```text
//! use RustedCalc::calculator::calculate;
//! let result = calculate("sqrtc(-4) + 1").unwrap();
//! assert_eq!(result.rendered, "1+2i");
//! ```
use crate::calculator::errors::CalcResult;
use crate::calculator::evaluator::{EvaluationContext, NumericResult, evaluate};
use crate::calculator::normalizer::normalize;
use log::info;

/// AST of canonical expressions and its parser
pub mod calc_engine;
/// error kinds shared by every operation of the crate
pub mod errors;
/// real and complex interpreter of the AST
pub mod evaluator;
/// nom tokenizer
pub mod lexer;
/// human notation -> canonical text
pub mod normalizer;
pub mod number_format;
/// closed table of functions and constants
pub mod registry;
/// snapping of near-zero components
pub mod stabilizer;

/// normalize and evaluate raw user input without variables
pub fn calculate(raw: &str) -> CalcResult<NumericResult> {
    calculate_with(raw, &EvaluationContext::new())
}

/// normalize and evaluate raw user input; the context's variables take precedence
/// over the constants of the same name
pub fn calculate_with(raw: &str, ctx: &EvaluationContext) -> CalcResult<NumericResult> {
    let bound = ctx.bound_names();
    let expression = normalize(raw, &bound)?;
    let result = evaluate(&expression.canonical, expression.domain, ctx)?;
    info!("calculate: '{}' = {}", raw, result.rendered);
    Ok(result)
}
