//! precedence-climbing evaluator
//!
//! parsing and evaluation happen in the same pass: every production returns
//! the value it denotes, there is no syntax tree. the cursor lives in a
//! [`Parser`] built per call, so one token slice can be evaluated from many
//! threads at once.

use super::error::SyntaxError;
use super::resolver::Resolver;
use super::token::{Token, TokenKind};
use super::value::Value;

const LOG_TARGET: &str = "filterexpr::eval";

static END: Token = Token::end();

// binding powers, loosest first
const OR_BP: u8 = 1;
const AND_BP: u8 = 2;
const COMPARE_BP: u8 = 4;
const ADDITIVE_BP: u8 = 5;
const MULTIPLICATIVE_BP: u8 = 6;
const UNARY_MINUS_BP: u8 = 7;

/// deepest chain of `(`, `!` and unary `-` accepted; each level is a
/// recursive call, so this bounds stack use
const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Regex,
    NotRegex,
    Match,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    fn from_kind(kind: &TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Or => BinaryOp::Or,
            TokenKind::And => BinaryOp::And,
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::Ne => BinaryOp::Ne,
            TokenKind::Regex => BinaryOp::Regex,
            TokenKind::NotRegex => BinaryOp::NotRegex,
            TokenKind::Match => BinaryOp::Match,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Le => BinaryOp::Le,
            TokenKind::Ge => BinaryOp::Ge,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Rem,
            _ => return None,
        };
        Some(op)
    }

    fn binding_power(self) -> u8 {
        match self {
            BinaryOp::Or => OR_BP,
            BinaryOp::And => AND_BP,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Regex
            | BinaryOp::NotRegex
            | BinaryOp::Match
            | BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::Le
            | BinaryOp::Ge => COMPARE_BP,
            BinaryOp::Add | BinaryOp::Sub => ADDITIVE_BP,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => MULTIPLICATIVE_BP,
        }
    }

    fn apply(self, lhs: Value, rhs: Value) -> Value {
        match self {
            BinaryOp::Or => lhs.or(rhs),
            BinaryOp::And => lhs.and(rhs),
            BinaryOp::Eq => lhs.equals(&rhs),
            BinaryOp::Ne => lhs.not_equals(&rhs),
            BinaryOp::Regex => lhs.regex_match(&rhs),
            BinaryOp::NotRegex => lhs.regex_not_match(&rhs),
            BinaryOp::Match => lhs.wildcard(&rhs),
            BinaryOp::Lt => lhs.less_than(&rhs),
            BinaryOp::Gt => lhs.greater_than(&rhs),
            BinaryOp::Le => lhs.less_or_equal(&rhs),
            BinaryOp::Ge => lhs.greater_or_equal(&rhs),
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Rem => lhs % rhs,
        }
    }
}

/// evaluate a token stream against `resolver`
///
/// identifiers are resolved exactly once each, in token order, as the cursor
/// reaches them. both operands of `&&` and `||` are always evaluated.
pub(crate) fn evaluate<R: Resolver + ?Sized>(
    tokens: &[Token],
    resolver: &R,
) -> Result<Value, SyntaxError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        resolver,
    };

    let result = parser.expression(0).and_then(|value| {
        let trailing = parser.peek();
        if trailing.is_end() {
            Ok(value)
        } else {
            Err(parser.unexpected(trailing))
        }
    });

    if let Err(e) = &result {
        log::debug!(target: LOG_TARGET, "syntax error: {}", e);
    }
    result
}

struct Parser<'a, R: ?Sized> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    resolver: &'a R,
}

impl<'a, R: Resolver + ?Sized> Parser<'a, R> {
    fn peek(&self) -> &'a Token {
        self.tokens.get(self.pos).unwrap_or(&END)
    }

    fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if !token.is_end() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self, token: &Token) -> SyntaxError {
        if token.is_end() {
            SyntaxError::UnexpectedEnd
        } else {
            SyntaxError::UnexpectedToken {
                found: token.raw.clone(),
                position: self.pos,
            }
        }
    }

    /// parse and evaluate while the next operator binds at least `min_bp`
    fn expression(&mut self, min_bp: u8) -> Result<Value, SyntaxError> {
        if self.depth >= MAX_DEPTH {
            return Err(SyntaxError::NestingTooDeep { position: self.pos });
        }
        self.depth += 1;
        let result = self.climb(min_bp);
        self.depth -= 1;
        result
    }

    fn climb(&mut self, min_bp: u8) -> Result<Value, SyntaxError> {
        let mut lhs = self.operand()?;

        loop {
            let Some(op) = BinaryOp::from_kind(&self.peek().kind) else {
                break;
            };
            let bp = op.binding_power();
            if bp < min_bp {
                break;
            }
            self.advance();
            // left associative
            let rhs = self.expression(bp + 1)?;
            lhs = op.apply(lhs, rhs);
        }

        Ok(lhs)
    }

    fn operand(&mut self) -> Result<Value, SyntaxError> {
        let token = self.peek();
        match &token.kind {
            TokenKind::Not => {
                self.advance();
                // `!a == b` negates the whole comparison
                let value = self.expression(COMPARE_BP)?;
                Ok(!value)
            }
            TokenKind::Minus => {
                self.advance();
                let value = self.expression(UNARY_MINUS_BP)?;
                Ok(-value)
            }
            TokenKind::LParen => {
                let open = self.pos;
                self.advance();
                let value = self.expression(0)?;
                let close = self.peek();
                match close.kind {
                    TokenKind::RParen => {
                        self.advance();
                        Ok(value)
                    }
                    TokenKind::End => Err(SyntaxError::UnclosedParen { position: open }),
                    _ => Err(self.unexpected(close)),
                }
            }
            TokenKind::Literal(value) => {
                self.advance();
                Ok(value.clone())
            }
            TokenKind::Ident => {
                self.advance();
                let value = self.resolver.resolve(&token.raw);
                log::trace!(target: LOG_TARGET, "resolved '{}' to {}", token.raw, value);
                Ok(value)
            }
            _ => Err(self.unexpected(token)),
        }
    }
}
