//! Tokenizer shared by the normalizer and the evaluator.
//!
//! Text is always split into tokens before anything is rewritten, so an identifier such as
//! `exp` can never be corrupted by replacing the constant `e` inside of it.
use crate::calculator::errors::{CalcError, CalcResult};
use crate::calculator::registry::Func;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, one_of},
    combinator::{map, opt, recognize, value},
};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// numeric literal, kept as written
    Num(String),
    /// function, constant or variable name
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,
    /// `^`, rewritten to `**` by the normalizer
    Caret,
    /// `²`, rewritten to `**2` by the normalizer
    Squared,
    /// `√`, rewritten to `sqrt` by the normalizer
    Root,
    LParen,
    RParen,
}

impl Token {
    pub fn ident(&self) -> Option<&str> {
        match self {
            Token::Ident(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Num(s) => write!(f, "{}", s),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::StarStar => write!(f, "**"),
            Token::Caret => write!(f, "^"),
            Token::Squared => write!(f, "²"),
            Token::Root => write!(f, "√"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

/// digits with optional fraction and exponent; the sign is an operator, never part of the literal
fn number(input: &str) -> IResult<&str, Token> {
    let mantissa = alt((
        recognize((digit1, opt((char('.'), digit0)))),
        recognize((char('.'), digit1)),
    ));
    let exponent = opt((one_of("eE"), opt(one_of("+-")), digit1));
    map(recognize((mantissa, exponent)), |s: &str| {
        Token::Num(s.to_string())
    })
    .parse(input)
}

fn is_ident_head(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_tail(c: char) -> bool {
    c.is_alphabetic() || c.is_ascii_digit() || c == '_'
}

fn identifier(input: &str) -> IResult<&str, Token> {
    let (rest, head) = take_while1(is_ident_head).parse(input)?;
    // `sin30` is `sin` applied to 30, `log10` is `log` applied to 10
    if Func::is_function_name(head) && rest.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok((rest, Token::Ident(head.to_string())));
    }
    let (rest, tail) = take_while(is_ident_tail).parse(rest)?;
    Ok((rest, Token::Ident(format!("{}{}", head, tail))))
}

fn operator(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::StarStar, tag("**")),
        value(Token::Plus, char('+')),
        value(Token::Minus, char('-')),
        value(Token::Minus, char('−')),
        value(Token::Star, char('*')),
        value(Token::Star, char('×')),
        value(Token::Slash, char('/')),
        value(Token::Slash, char('÷')),
        value(Token::Percent, char('%')),
        value(Token::Caret, char('^')),
        value(Token::Squared, char('²')),
        value(Token::Root, char('√')),
        value(Token::LParen, char('(')),
        value(Token::RParen, char(')')),
    ))
    .parse(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((number, identifier, operator)).parse(input)
}

/// split text into tokens, whitespace is insignificant
pub fn tokenize(input: &str) -> CalcResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = input.trim_start();
    while !rest.is_empty() {
        match token(rest) {
            Ok((remaining, tok)) => {
                tokens.push(tok);
                rest = remaining.trim_start();
            }
            Err(_) => {
                let position = input.chars().count() - rest.chars().count();
                let found = rest.chars().next().unwrap_or(' ');
                return Err(CalcError::syntax(format!(
                    "unexpected character '{}' at position {}",
                    found, position
                )));
            }
        }
    }
    Ok(tokens)
}
