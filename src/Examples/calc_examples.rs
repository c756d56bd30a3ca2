// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_snake_case)]

use crate::Utils::config::CalcConfig;
use crate::Utils::logger::{save_curve_to_csv, save_surface_to_csv};
use crate::calculator::calc_engine::Expr;
use crate::calculator::evaluator::EvaluationContext;
use crate::calculator::normalizer::normalize;
use crate::calculator::{calculate, calculate_with};
use crate::numerical::quadratic::solve_quadratic;
use crate::numerical::sampler::{sample_1d, sample_2d};
use crate::somelinalg::eigen::eigen_from_text;
use crate::somelinalg::matrix_ops::{MatrixOp, matrix_operation};

#[allow(dead_code)]
pub fn calc_examples(example: usize) {
    let config = CalcConfig::default();
    match example {
        0 => {
            // SCALAR EXPRESSIONS
            // human notation is normalized first: implicit multiplication, ^ and ², √, constants
            for input in ["2+2", "2(3+4)", "√16 + 3²", "sin(pi)", "log(1000)", "ln(e)", "7 % 3"] {
                let normalized = normalize(input, &[]).unwrap();
                println!("{:<14} -> {:<30} [{}]", input, normalized.canonical, normalized.domain);
                match calculate(input) {
                    Ok(result) => println!("   = {}", result.rendered),
                    Err(e) => println!("   error {}", e),
                }
            }
        }
        1 => {
            // COMPLEX NUMBERS
            // an i or j literal switches the whole expression to the complex domain
            for input in ["3+4i", "(1+i)(1-i)", "i^2", "sqrt(-4) + 0i", "sqrtc(-4)", "exp(i*pi)"] {
                match calculate(input) {
                    Ok(result) => println!("{} = {}", input, result.rendered),
                    Err(e) => println!("{} -> {}", input, e),
                }
            }
            // in the real domain this is an error
            println!("sqrt(-4) -> {}", calculate("sqrt(-4)").unwrap_err());
        }
        2 => {
            // VARIABLES
            // a binding wins over the constant with the same name
            let ctx = EvaluationContext::new()
                .with_variable("x", 2.0)
                .with_variable("e", 10.0);
            let result = calculate_with("3x² + e", &ctx).unwrap();
            println!("3x² + e at x = 2, e = 10: {}", result.rendered);
            // parse tree of the canonical form
            let canonical = normalize("3x² + e", &["x", "e"]).unwrap().canonical;
            println!("tree: {}", Expr::parse_expression(&canonical).unwrap());
        }
        3 => {
            // EIGEN DECOMPOSITION
            for input in ["[[2,1],[1,2]]", "[[0,-1],[1,0]]", "[[[1,1], 2], [0, [3,-1]]]", "4 1; 2 3"] {
                match eigen_from_text(input, &config) {
                    Ok(result) => println!("{}:\n{}", input, result),
                    Err(e) => println!("{} -> {}", input, e),
                }
            }
        }
        4 => {
            // MATRIX ALGEBRA
            let a = "[[4,7],[2,6]]";
            let b = "[[1,0],[0,2i]]";
            for op in [MatrixOp::Add, MatrixOp::Multiply, MatrixOp::Transpose, MatrixOp::Determinant, MatrixOp::Inverse] {
                println!("{} -> {:?}", op, matrix_operation(op, a, Some(b), &config));
            }
        }
        5 => {
            // QUADRATIC EQUATIONS
            for (a, b, c) in [("1", "-3", "2"), ("1", "0", "1"), ("1", "-2-i", "2i"), ("0", "2", "-4")] {
                let solution = solve_quadratic(a, b, c, &config).unwrap();
                println!(
                    "{}x² + ({})x + ({}) = 0: D = {}, roots {:?}",
                    a, b, c, solution.discriminant, solution.roots
                );
            }
        }
        6 => {
            // SAMPLING FOR PLOTS
            let curve = sample_1d("1/x", -1.0, 1.0, 11, &config).unwrap();
            println!("1/x: {} of 11 points kept, x = {:?}", curve.len(), curve.x);
            let surface = sample_2d("sin(x)cos(y)", (-3.0, 3.0), (-3.0, 3.0), 50, &config).unwrap();
            println!("surface {:?}, z max = {}", surface.z.shape(), surface.z.max());
            save_curve_to_csv(&curve, "curve.csv").unwrap();
            save_surface_to_csv(&surface, "surface.csv").unwrap();
            println!("saved to curve.csv and surface.csv");
        }
        _ => {
            println!("no example {}", example);
        }
    }
}
