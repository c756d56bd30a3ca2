//! Rewrites human notation into the canonical evaluator syntax and picks the domain.
//!
//! All rewriting is done on tokens:
//! ```text
//!  "2sin30 + 3i - √16 + x²"
//!        | tokenize
//!  [2][sin][30][+][3][i][-][√][16][+][x][²]
//!        | symbols:   √ -> sqrt, ² -> **2, ^ -> **
//!        | calls:     sin 30 -> sin(30), sqrt 16 -> sqrt(16)
//!        | products:  2 sin -> 2*sin, 3 i -> 3*i
//!        | names:     pi/π/e -> literal, i/j -> imaginary_unit (domain = complex)
//!  "2*sin(30)+3*imaginary_unit-sqrt(16)+x**2"
//! ```
use crate::calculator::errors::{CalcError, CalcResult};
use crate::calculator::lexer::{Token, tokenize};
use crate::calculator::registry::{
    Func, IMAGINARY_UNIT, constant_value, is_imaginary_token,
};
use log::debug;
use strum_macros::Display;

/// evaluation mode, fixed before evaluation starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Domain {
    Real,
    Complex,
}

/// an expression as typed by the user together with its canonical form
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub raw: String,
    pub canonical: String,
    pub domain: Domain,
}

fn rewrite_symbols(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    for tok in tokens {
        match tok {
            Token::Caret => out.push(Token::StarStar),
            Token::Squared => {
                out.push(Token::StarStar);
                out.push(Token::Num("2".to_string()));
            }
            Token::Root => out.push(Token::Ident(Func::Sqrt.to_string())),
            other => out.push(other),
        }
    }
    out
}

/// constants, imaginary unit and aliases; a caller binding of the exact name wins over a constant
fn resolve_names(tokens: Vec<Token>, bound: &[&str], domain: &mut Domain) -> Vec<Token> {
    tokens
        .into_iter()
        .map(|tok| {
            let Token::Ident(name) = &tok else {
                return tok;
            };
            if let Some(func) = Func::lookup(name) {
                if func.is_explicit_complex() {
                    *domain = Domain::Complex;
                }
                return Token::Ident(func.to_string());
            }
            if bound.contains(&name.as_str()) {
                return tok;
            }
            if let Some(value) = constant_value(name) {
                return Token::Num(value.to_string());
            }
            if is_imaginary_token(name) || name == IMAGINARY_UNIT {
                *domain = Domain::Complex;
                return Token::Ident(IMAGINARY_UNIT.to_string());
            }
            tok
        })
        .collect()
}

fn is_function(tok: &Token) -> bool {
    tok.ident().is_some_and(Func::is_function_name)
}

fn is_atom(tok: &Token) -> bool {
    matches!(tok, Token::Num(_)) || (matches!(tok, Token::Ident(_)) && !is_function(tok))
}

/// `sin30`, `sin 30`, `sqrt x` -> `sin(30)`, `sqrt(x)`
fn apply_implicit_calls(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len() + 4);
    let mut iter = tokens.into_iter().peekable();
    while let Some(tok) = iter.next() {
        let wraps_atom = is_function(&tok) && iter.peek().is_some_and(is_atom);
        out.push(tok);
        if wraps_atom {
            if let Some(atom) = iter.next() {
                out.push(Token::LParen);
                out.push(atom);
                out.push(Token::RParen);
            }
        }
    }
    out
}

fn ends_operand(tok: &Token) -> bool {
    matches!(tok, Token::Num(_) | Token::RParen) || (matches!(tok, Token::Ident(_)) && !is_function(tok))
}

fn starts_operand(tok: &Token) -> bool {
    matches!(tok, Token::Num(_) | Token::Ident(_) | Token::LParen)
}

/// names that stand for a value: bound variables, constants, the imaginary unit
fn is_value_name(name: &str, bound: &[&str]) -> bool {
    bound.contains(&name)
        || constant_value(name).is_some()
        || is_imaginary_token(name)
        || name == IMAGINARY_UNIT
}

/// `2x`, `2(x+1)`, `(a)(b)`, `3sin(x)`, `2 imaginary_unit` get an explicit `*`
fn insert_implicit_multiplication(tokens: Vec<Token>, bound: &[&str]) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len() * 2);
    for tok in tokens {
        if let Some(prev) = out.last() {
            let both_numbers = matches!(prev, Token::Num(_)) && matches!(tok, Token::Num(_));
            // an unknown name before `(` stays a call so that it is reported as unknown
            let unknown_call = matches!(tok, Token::LParen)
                && prev.ident().is_some_and(|name| !is_value_name(name, bound));
            if ends_operand(prev) && starts_operand(&tok) && !both_numbers && !unknown_call {
                out.push(Token::Star);
            }
        }
        out.push(tok);
    }
    out
}

/// canonical text; a space only where two tokens would otherwise glue into one
fn render(tokens: &[Token]) -> String {
    let word = |t: &Token| matches!(t, Token::Num(_) | Token::Ident(_));
    let mut text = String::new();
    for (i, tok) in tokens.iter().enumerate() {
        if i > 0 && word(&tokens[i - 1]) && word(tok) {
            text.push(' ');
        }
        text.push_str(&tok.to_string());
    }
    text
}

/// normalize raw user input; `bound` lists the variable names the caller will bind
pub fn normalize(raw: &str, bound: &[&str]) -> CalcResult<Expression> {
    let tokens = tokenize(raw)?;
    if tokens.is_empty() {
        return Err(CalcError::syntax("empty expression"));
    }
    let mut domain = Domain::Real;
    let tokens = rewrite_symbols(tokens);
    let tokens = apply_implicit_calls(tokens);
    let tokens = insert_implicit_multiplication(tokens, bound);
    let tokens = resolve_names(tokens, bound, &mut domain);
    let canonical = render(&tokens);
    debug!("normalized '{}' -> '{}' ({} domain)", raw, canonical, domain);
    Ok(Expression {
        raw: raw.to_string(),
        canonical,
        domain,
    })
}
