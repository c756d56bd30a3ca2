//! # Calculator engine
//!
//! Abstract syntax tree of a canonical expression and the precedence-climbing parser that
//! builds it. The grammar is closed:
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/' | '%') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary ('**' unary)?          right associative, 2**-1 allowed
//! primary := number | name | function '(' sum ')' | '(' sum ')'
//! ```
//! so `-2**2` is `-(2**2)` and `2**3**2` is `2**(3**2)`.
//! Names are not resolved here; the evaluator looks them up in the registry and the
//! caller's bindings, nothing else.
use crate::calculator::errors::{CalcError, CalcResult};
use crate::calculator::lexer::{Token, tokenize};
use crate::calculator::registry::{Func, IMAGINARY_UNIT};
use std::fmt;

/// deeper nesting is rejected instead of risking the stack
const MAX_DEPTH: usize = 200;

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// numerical literal
    Const(f64),
    /// the imaginary unit `i`
    ImaginaryUnit,
    /// variable or named constant, resolved at evaluation time
    Var(String),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Rem(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    /// registered function applied to one argument
    Call(Func, Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Const(val) => write!(f, "{}", val),
            Expr::ImaginaryUnit => write!(f, "i"),
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Neg(expr) => write!(f, "(-{})", expr),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Rem(lhs, rhs) => write!(f, "({} % {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ** {})", base, exp),
            Expr::Call(func, arg) => write!(f, "{}({})", func, arg),
        }
    }
}

impl Expr {
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// names of all variables and constants the expression refers to
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names.sort();
        names.dedup();
        names
    }

    fn collect_names(&self, names: &mut Vec<String>) {
        match self {
            Expr::Var(name) => names.push(name.clone()),
            Expr::Neg(e) | Expr::Call(_, e) => e.collect_names(names),
            Expr::Add(l, r)
            | Expr::Sub(l, r)
            | Expr::Mul(l, r)
            | Expr::Div(l, r)
            | Expr::Rem(l, r)
            | Expr::Pow(l, r) => {
                l.collect_names(names);
                r.collect_names(names);
            }
            Expr::Const(_) | Expr::ImaginaryUnit => {}
        }
    }

    /// true if the tree calls a function that is only defined over complex numbers
    pub fn uses_explicit_complex(&self) -> bool {
        match self {
            Expr::Call(func, arg) => func.is_explicit_complex() || arg.uses_explicit_complex(),
            Expr::Neg(e) => e.uses_explicit_complex(),
            Expr::Add(l, r)
            | Expr::Sub(l, r)
            | Expr::Mul(l, r)
            | Expr::Div(l, r)
            | Expr::Rem(l, r)
            | Expr::Pow(l, r) => l.uses_explicit_complex() || r.uses_explicit_complex(),
            Expr::Const(_) | Expr::ImaginaryUnit | Expr::Var(_) => false,
        }
    }

    /// parse canonical text (see [`crate::calculator::normalizer::normalize`])
    pub fn parse_expression(input: &str) -> CalcResult<Expr> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(CalcError::syntax("empty expression"));
        }
        let mut parser = ExprParser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.parse_sum()?.expr;
        match parser.peek() {
            None => Ok(expr),
            Some(Token::RParen) => Err(CalcError::syntax(
                "unbalanced parentheses: unexpected ')'",
            )),
            Some(tok) => Err(CalcError::syntax(format!("unexpected token '{}'", tok))),
        }
    }
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

/// subtree with its height; a flat `1+1+...+1` chain grows the tree as much as nesting does
struct Node {
    expr: Expr,
    height: usize,
}

impl Node {
    fn leaf(expr: Expr) -> Self {
        Node { expr, height: 1 }
    }

    fn checked(expr: Expr, height: usize) -> CalcResult<Node> {
        if height > MAX_DEPTH {
            return Err(CalcError::syntax("expression is nested too deeply"));
        }
        Ok(Node { expr, height })
    }

    fn unary(self, op: impl FnOnce(Box<Expr>) -> Expr) -> CalcResult<Node> {
        Node::checked(op(self.expr.boxed()), self.height + 1)
    }

    fn binary(self, rhs: Node, op: impl FnOnce(Box<Expr>, Box<Expr>) -> Expr) -> CalcResult<Node> {
        let height = self.height.max(rhs.height) + 1;
        Node::checked(op(self.expr.boxed(), rhs.expr.boxed()), height)
    }
}

impl ExprParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn enter(&mut self) -> CalcResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::syntax("expression is nested too deeply"));
        }
        Ok(())
    }

    fn parse_sum(&mut self) -> CalcResult<Node> {
        let mut lhs = self.parse_product()?;
        loop {
            let op: fn(Box<Expr>, Box<Expr>) -> Expr = match self.peek() {
                Some(Token::Plus) => Expr::Add,
                Some(Token::Minus) => Expr::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_product()?;
            lhs = lhs.binary(rhs, op)?;
        }
    }

    fn parse_product(&mut self) -> CalcResult<Node> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op: fn(Box<Expr>, Box<Expr>) -> Expr = match self.peek() {
                Some(Token::Star) => Expr::Mul,
                Some(Token::Slash) => Expr::Div,
                Some(Token::Percent) => Expr::Rem,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = lhs.binary(rhs, op)?;
        }
    }

    fn parse_unary(&mut self) -> CalcResult<Node> {
        self.enter()?;
        let result = match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                self.parse_unary().and_then(|e| e.unary(Expr::Neg))
            }
            Some(Token::Plus) => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        };
        self.depth -= 1;
        result
    }

    fn parse_power(&mut self) -> CalcResult<Node> {
        let base = self.parse_primary()?;
        if let Some(Token::StarStar) = self.peek() {
            self.advance();
            let exponent = self.parse_unary()?;
            return base.binary(exponent, Expr::Pow);
        }
        Ok(base)
    }

    fn expect_closing(&mut self) -> CalcResult<()> {
        match self.advance() {
            Some(Token::RParen) => Ok(()),
            Some(tok) => Err(CalcError::syntax(format!(
                "expected ')' but found '{}'",
                tok
            ))),
            None => Err(CalcError::syntax("unbalanced parentheses: missing ')'")),
        }
    }

    fn parse_group(&mut self) -> CalcResult<Node> {
        self.enter()?;
        let inner = self.parse_sum();
        self.depth -= 1;
        let inner = inner?;
        self.expect_closing()?;
        Ok(inner)
    }

    fn parse_primary(&mut self) -> CalcResult<Node> {
        match self.advance() {
            Some(Token::Num(text)) => text
                .parse::<f64>()
                .map(|v| Node::leaf(Expr::Const(v)))
                .map_err(|_| CalcError::syntax(format!("invalid number '{}'", text))),
            Some(Token::Ident(name)) => {
                if let Some(func) = Func::lookup(&name) {
                    return match self.advance() {
                        Some(Token::LParen) => {
                            let arg = self.parse_group()?;
                            arg.unary(|a| Expr::Call(func, a))
                        }
                        _ => Err(CalcError::syntax(format!(
                            "function '{}' must be followed by '('",
                            name
                        ))),
                    };
                }
                if let Some(Token::LParen) = self.peek() {
                    return Err(CalcError::name(format!("unknown function '{}'", name)));
                }
                if name == IMAGINARY_UNIT {
                    return Ok(Node::leaf(Expr::ImaginaryUnit));
                }
                Ok(Node::leaf(Expr::Var(name)))
            }
            Some(Token::LParen) => self.parse_group(),
            Some(Token::RParen) => Err(CalcError::syntax(
                "unbalanced parentheses: unexpected ')'",
            )),
            Some(tok @ (Token::Caret | Token::Squared | Token::Root)) => Err(CalcError::syntax(
                format!("'{}' is not canonical syntax, normalize the expression first", tok),
            )),
            Some(tok) => Err(CalcError::syntax(format!("unexpected token '{}'", tok))),
            None => Err(CalcError::syntax("unexpected end of expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::errors::ErrorKind;

    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::Var(name.to_string()))
    }
    fn c(v: f64) -> Box<Expr> {
        Box::new(Expr::Const(v))
    }

    #[test]
    fn test_parse_constant() {
        let expr = Expr::parse_expression("42").unwrap();
        assert_eq!(expr, Expr::Const(42.0));
    }

    #[test]
    fn test_precedence() {
        let expr = Expr::parse_expression("1 + 2 * x").unwrap();
        assert_eq!(expr, Expr::Add(c(1.0), Box::new(Expr::Mul(c(2.0), var("x")))));
    }

    #[test]
    fn test_left_associative_subtraction() {
        let expr = Expr::parse_expression("x - 2 - 1").unwrap();
        assert_eq!(
            expr,
            Expr::Sub(Box::new(Expr::Sub(var("x"), c(2.0))), c(1.0))
        );
    }

    #[test]
    fn test_power_binds_tighter_than_unary_minus() {
        let expr = Expr::parse_expression("-2**2").unwrap();
        assert_eq!(expr, Expr::Neg(Box::new(Expr::Pow(c(2.0), c(2.0)))));
    }

    #[test]
    fn test_power_right_associative_with_signed_exponent() {
        let expr = Expr::parse_expression("2**3**2").unwrap();
        assert_eq!(
            expr,
            Expr::Pow(c(2.0), Box::new(Expr::Pow(c(3.0), c(2.0))))
        );
        let expr = Expr::parse_expression("2**-1").unwrap();
        assert_eq!(expr, Expr::Pow(c(2.0), Box::new(Expr::Neg(c(1.0)))));
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expr = Expr::parse_expression("(x + y) * z").unwrap();
        assert_eq!(
            expr,
            Expr::Mul(Box::new(Expr::Add(var("x"), var("y"))), var("z"))
        );
    }

    #[test]
    fn test_function_calls() {
        let expr = Expr::parse_expression("sin(cos(x))").unwrap();
        assert_eq!(
            expr,
            Expr::Call(Func::Sin, Box::new(Expr::Call(Func::Cos, var("x"))))
        );
        let expr = Expr::parse_expression("2*imaginary_unit").unwrap();
        assert_eq!(expr, Expr::Mul(c(2.0), Box::new(Expr::ImaginaryUnit)));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let err = Expr::parse_expression("(x + y").unwrap_err();
        assert_eq!(err.kind, ErrorKind::SyntaxError);
        let err = Expr::parse_expression("x + y)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::SyntaxError);
        let err = Expr::parse_expression("(x +").unwrap_err();
        assert_eq!(err.kind, ErrorKind::SyntaxError);
    }

    #[test]
    fn test_unknown_function_is_name_error() {
        let err = Expr::parse_expression("unknown_fn(1)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NameError);
    }

    #[test]
    fn test_function_without_parentheses() {
        let err = Expr::parse_expression("sin 2").unwrap_err();
        assert_eq!(err.kind, ErrorKind::SyntaxError);
    }

    #[test]
    fn test_raw_symbols_rejected() {
        let err = Expr::parse_expression("2^3").unwrap_err();
        assert_eq!(err.kind, ErrorKind::SyntaxError);
    }

    #[test]
    fn test_deep_nesting_rejected() {
        let text = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        let err = Expr::parse_expression(&text).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SyntaxError);
        let ok = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(Expr::parse_expression(&ok).unwrap(), Expr::Const(1.0));
    }

    #[test]
    fn test_long_flat_chain_rejected() {
        let text = format!("{}1", "1+".repeat(10_000));
        let err = Expr::parse_expression(&text).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SyntaxError);
        let text = format!("{}2", "2*".repeat(10_000));
        let err = Expr::parse_expression(&text).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SyntaxError);
        let short = format!("{}1", "1+".repeat(100));
        assert!(Expr::parse_expression(&short).is_ok());
    }

    #[test]
    fn test_names_and_display() {
        let expr = Expr::parse_expression("x*y + sin(x) - pi").unwrap();
        assert_eq!(expr.names(), vec!["pi", "x", "y"]);
        assert_eq!(expr.to_string(), "(((x * y) + sin(x)) - pi)");
    }
}
