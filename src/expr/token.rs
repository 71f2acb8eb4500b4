//! lexical tokens

use std::fmt;

use super::value::Value;

/// what a token is
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `!`
    Not,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `=`: wildcard match, not assignment
    Match,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `=~`
    Regex,
    /// `!~`
    NotRegex,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// string, number, boolean or nil literal, already converted
    Literal(Value),
    /// variable path handed to the resolver as-is (dots included)
    Ident,
    /// end of input
    End,
}

impl TokenKind {
    /// operator kind for a raw operator spelling
    pub fn operator(raw: &str) -> Option<Self> {
        let kind = match raw {
            "(" => TokenKind::LParen,
            ")" => TokenKind::RParen,
            "!" => TokenKind::Not,
            "&&" => TokenKind::And,
            "||" => TokenKind::Or,
            "=" => TokenKind::Match,
            "==" => TokenKind::Eq,
            "!=" => TokenKind::Ne,
            "=~" => TokenKind::Regex,
            "!~" => TokenKind::NotRegex,
            "<" => TokenKind::Lt,
            ">" => TokenKind::Gt,
            "<=" => TokenKind::Le,
            ">=" => TokenKind::Ge,
            "+" => TokenKind::Plus,
            "-" => TokenKind::Minus,
            "*" => TokenKind::Star,
            "/" => TokenKind::Slash,
            "%" => TokenKind::Percent,
            _ => return None,
        };
        Some(kind)
    }

    /// short human name, used by the `tokens` command
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::LParen => "lparen",
            TokenKind::RParen => "rparen",
            TokenKind::Not => "not",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Match => "match",
            TokenKind::Eq => "eq",
            TokenKind::Ne => "ne",
            TokenKind::Regex => "regex",
            TokenKind::NotRegex => "not_regex",
            TokenKind::Lt => "lt",
            TokenKind::Gt => "gt",
            TokenKind::Le => "le",
            TokenKind::Ge => "ge",
            TokenKind::Plus => "plus",
            TokenKind::Minus => "minus",
            TokenKind::Star => "star",
            TokenKind::Slash => "slash",
            TokenKind::Percent => "percent",
            TokenKind::Literal(_) => "literal",
            TokenKind::Ident => "ident",
            TokenKind::End => "end",
        }
    }
}

/// a token and the exact text it was cut from
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub raw: String,
}

impl Token {
    pub fn new(kind: TokenKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }

    pub const fn end() -> Self {
        Self {
            kind: TokenKind::End,
            raw: String::new(),
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self.kind, TokenKind::End)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_end() {
            write!(f, "end of input")
        } else {
            write!(f, "{}", self.raw)
        }
    }
}
