//! Matrix literals.
//!
//! Two notations are accepted:
//! * JSON-style nested arrays `[[1, 2], [3, [4, -1]]]` where an entry is a real number or a
//!   `[re, im]` pair;
//! * plain rows `1 2; 3 4` (rows split by `;` or newlines, entries by whitespace or commas),
//!   where every entry is a calculator expression such as `2i`, `1-3i` or `sqrt(2)`.
use crate::calculator::calculate;
use crate::calculator::errors::{CalcError, CalcResult};
use log::debug;
use nalgebra::DMatrix;
use nom::{
    IResult, Parser,
    branch::alt,
    character::complete::{char, multispace0},
    combinator::{all_consuming, map},
    multi::separated_list0,
    number::complete::double,
    sequence::{delimited, separated_pair},
};
use num_complex::Complex64;
use regex::Regex;
use std::sync::LazyLock;

/// skip surrounding whitespace
fn ws<'a, O, P>(inner: P) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    P: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

fn complex_pair(input: &str) -> IResult<&str, Complex64> {
    map(
        delimited(
            char('['),
            separated_pair(ws(double), char(','), ws(double)),
            char(']'),
        ),
        |(re, im)| Complex64::new(re, im),
    )
    .parse(input)
}

fn entry(input: &str) -> IResult<&str, Complex64> {
    alt((complex_pair, map(double, |re| Complex64::new(re, 0.0)))).parse(input)
}

fn row(input: &str) -> IResult<&str, Vec<Complex64>> {
    delimited(
        char('['),
        separated_list0(char(','), ws(entry)),
        ws(char(']')),
    )
    .parse(input)
}

fn nested_rows(input: &str) -> IResult<&str, Vec<Vec<Complex64>>> {
    delimited(
        ws(char('[')),
        separated_list0(char(','), ws(row)),
        ws(char(']')),
    )
    .parse(input)
}

fn parse_nested(text: &str) -> CalcResult<Vec<Vec<Complex64>>> {
    match all_consuming(nested_rows).parse(text) {
        Ok((_, rows)) => Ok(rows),
        Err(e) => Err(CalcError::format(format!("malformed matrix literal: {}", e))),
    }
}

/// commas and blanks between the entries of a plain row
static ENTRY_SEPARATOR: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"[\s,]+"));

fn parse_plain(text: &str) -> CalcResult<Vec<Vec<Complex64>>> {
    let separator = ENTRY_SEPARATOR
        .as_ref()
        .map_err(|e| CalcError::format(format!("bad entry separator: {}", e)))?;
    let mut rows = Vec::new();
    for line in text.split(['\n', ';']) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut row = Vec::new();
        for item in separator.split(line).filter(|s| !s.is_empty()) {
            let value = calculate(item).map_err(|e| {
                CalcError::format(format!("bad matrix entry '{}': {}", item, e))
            })?;
            row.push(value.value.as_complex());
        }
        rows.push(row);
    }
    Ok(rows)
}

fn rows_to_matrix(rows: Vec<Vec<Complex64>>) -> CalcResult<DMatrix<Complex64>> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, |r| r.len());
    if nrows == 0 || ncols == 0 {
        return Err(CalcError::format("matrix is empty"));
    }
    if let Some((i, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
        return Err(CalcError::format(format!(
            "row {} has {} entries, expected {}",
            i,
            r.len(),
            ncols
        )));
    }
    if rows.iter().flatten().any(|z| !z.re.is_finite() || !z.im.is_finite()) {
        return Err(CalcError::format("matrix entries must be finite"));
    }
    Ok(DMatrix::from_fn(nrows, ncols, |i, j| rows[i][j]))
}

/// rectangular matrix in either notation
pub fn parse_any_matrix(text: &str) -> CalcResult<DMatrix<Complex64>> {
    let text = text.trim();
    let rows = if text.starts_with('[') {
        parse_nested(text)?
    } else {
        parse_plain(text)?
    };
    let matrix = rows_to_matrix(rows)?;
    debug!("parsed {}x{} matrix", matrix.nrows(), matrix.ncols());
    Ok(matrix)
}

/// square matrix, as needed by the eigen decomposition
pub fn parse_matrix(text: &str) -> CalcResult<DMatrix<Complex64>> {
    let matrix = parse_any_matrix(text)?;
    if !matrix.is_square() {
        return Err(CalcError::shape(format!(
            "matrix must be square, got {}x{}",
            matrix.nrows(),
            matrix.ncols()
        )));
    }
    Ok(matrix)
}
