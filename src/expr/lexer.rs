//! tokenizer - converts expression text to a token stream
//!
//! a character-class state machine: each character either extends the
//! current token or "cuts" it, meaning the character belongs to the next
//! token and is fed again from [`State::Start`].

use super::error::TokenizeError;
use super::token::{Token, TokenKind};
use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Integer,
    Float,
    /// saw `|`, need another `|`
    PipePending,
    /// saw `&`, need another `&`
    AmpPending,
    /// saw `!`, `>` or `<`
    CmpPending,
    /// saw `=`
    EqPending,
    /// inside a string opened with the given quote
    Quoted(char),
    Ident,
    /// token finished, the next character starts a new one
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// whitespace between tokens
    Skip,
    /// character belongs to the current token
    Continue(State),
    /// character belongs to the next token
    Cut,
}

/// split `source` (trimmed first) into tokens, ending with [`TokenKind::End`]
pub fn tokenize(source: &str) -> Result<Vec<Token>, TokenizeError> {
    let source = source.trim();
    let mut tokens = Vec::with_capacity(8);
    let mut state = State::Start;
    let mut start = 0;
    let mut chars = source.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        match next_state(state, c, offset)? {
            Step::Skip => {
                chars.next();
                start = offset + c.len_utf8();
            }
            Step::Continue(next) => {
                if state == State::Start {
                    start = offset;
                }
                state = next;
                chars.next();
            }
            Step::Cut => {
                tokens.push(classify(&source[start..offset], start)?);
                state = State::Start;
                start = offset;
            }
        }
    }

    match state {
        State::Start => {}
        State::PipePending => {
            return Err(TokenizeError::IllegalAfter {
                after: '|',
                found: None,
                offset: source.len(),
            })
        }
        State::AmpPending => {
            return Err(TokenizeError::IllegalAfter {
                after: '&',
                found: None,
                offset: source.len(),
            })
        }
        State::Quoted(quote) => {
            return Err(TokenizeError::UnterminatedString {
                quote,
                offset: start,
            })
        }
        _ => tokens.push(classify(&source[start..], start)?),
    }

    tokens.push(Token::end());
    Ok(tokens)
}

fn next_state(state: State, c: char, offset: usize) -> Result<Step, TokenizeError> {
    let step = match state {
        State::Start => {
            if c.is_whitespace() {
                return Ok(Step::Skip);
            }
            if c.is_numeric() {
                return Ok(Step::Continue(State::Integer));
            }
            match c {
                '+' | '-' | '*' | '/' | '%' | '(' | ')' => Step::Continue(State::Complete),
                '|' => Step::Continue(State::PipePending),
                '&' => Step::Continue(State::AmpPending),
                '!' | '>' | '<' => Step::Continue(State::CmpPending),
                '=' => Step::Continue(State::EqPending),
                '"' | '\'' | '`' => Step::Continue(State::Quoted(c)),
                _ if is_ident_start(c) => Step::Continue(State::Ident),
                _ => return Err(TokenizeError::IllegalCharacter { found: c, offset }),
            }
        }
        State::Integer => {
            if c.is_numeric() {
                Step::Continue(State::Integer)
            } else if c == '.' {
                Step::Continue(State::Float)
            } else {
                Step::Cut
            }
        }
        State::Float => {
            if c.is_numeric() {
                Step::Continue(State::Float)
            } else {
                Step::Cut
            }
        }
        State::PipePending | State::AmpPending => {
            let after = if state == State::PipePending { '|' } else { '&' };
            if c != after {
                return Err(TokenizeError::IllegalAfter {
                    after,
                    found: Some(c),
                    offset,
                });
            }
            Step::Continue(State::Complete)
        }
        // !=, >=, <=, !~ and ==, =~
        State::CmpPending | State::EqPending => {
            if c == '=' || c == '~' {
                Step::Continue(State::Complete)
            } else {
                Step::Cut
            }
        }
        State::Quoted(quote) => {
            if c == quote {
                Step::Continue(State::Complete)
            } else {
                Step::Continue(state)
            }
        }
        State::Ident => {
            if is_ident_continue(c) {
                Step::Continue(State::Ident)
            } else {
                Step::Cut
            }
        }
        State::Complete => Step::Cut,
    };
    Ok(step)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '.'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// turn the raw text of one complete token into a [`Token`]
fn classify(raw: &str, offset: usize) -> Result<Token, TokenizeError> {
    let mut chars = raw.chars();
    let first = chars.next().unwrap_or_default();

    if matches!(first, '"' | '\'' | '`') {
        // the state machine only completes a string on its closing quote
        let inner = &raw[1..raw.len() - 1];
        return Ok(Token::new(
            TokenKind::Literal(Value::string(inner)),
            raw,
        ));
    }

    if let Some(kind) = TokenKind::operator(raw) {
        return Ok(Token::new(kind, raw));
    }

    if first.is_numeric() {
        let n = raw.parse::<f64>().map_err(|_| TokenizeError::InvalidNumber {
            raw: raw.to_string(),
            offset,
        })?;
        return Ok(Token::new(TokenKind::Literal(Value::number(n)), raw));
    }

    let kind = match raw {
        "true" => TokenKind::Literal(Value::boolean(true)),
        "false" => TokenKind::Literal(Value::boolean(false)),
        "nil" => TokenKind::Literal(Value::nil()),
        _ if is_ident_start(first) => TokenKind::Ident,
        // `>~` and `<~`
        _ => {
            return Err(TokenizeError::UnknownOperator {
                raw: raw.to_string(),
                offset,
            })
        }
    };
    Ok(Token::new(kind, raw))
}
