// src/payoff/lexer.rs
//! Tokenizer for payoff expressions.
//!
//! Byte-wise scan of a single-line expression, emitting tokens that carry
//! source `Span`s so compile errors can point at the offending byte.

use crate::error::{PricerResult, PricingError};

/// Source span for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Token types.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Ident(String),

    // Keywords
    If,
    Then,
    Else,
    And,
    Or,
    Not,

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    EqEq, // ==
    Ne,   // !=
    Lt,   // <
    Le,   // <=
    Gt,   // >
    Ge,   // >=
}

/// Tokenize a payoff expression into a vector of tokens.
///
/// Anything outside the closed token set is a `ParseError`; in particular
/// a bare `=` is rejected up front so assignment never reaches the parser.
pub fn tokenize(source: &str) -> PricerResult<Vec<Token>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let ch = bytes[pos];

        if ch == b' ' || ch == b'\t' || ch == b'\n' || ch == b'\r' {
            pos += 1;
            continue;
        }

        // Number literal.
        if ch.is_ascii_digit()
            || (ch == b'.' && pos + 1 < bytes.len() && bytes[pos + 1].is_ascii_digit())
        {
            let (num, end) = lex_number(source, pos)?;
            tokens.push(Token {
                kind: TokenKind::Number(num),
                span: Span::new(pos, end),
            });
            pos = end;
            continue;
        }

        // Identifier or keyword.
        if ch.is_ascii_alphabetic() || ch == b'_' {
            let end = lex_ident_end(source, pos);
            let word = &source[pos..end];
            let kind = match word {
                "if" => TokenKind::If,
                "then" => TokenKind::Then,
                "else" => TokenKind::Else,
                "and" => TokenKind::And,
                "or" => TokenKind::Or,
                "not" => TokenKind::Not,
                _ => TokenKind::Ident(word.to_string()),
            };
            tokens.push(Token {
                kind,
                span: Span::new(pos, end),
            });
            pos = end;
            continue;
        }

        // Two-character operators.
        if pos + 1 < bytes.len() {
            let kind = match &source[pos..pos + 2] {
                "==" => Some(TokenKind::EqEq),
                "!=" => Some(TokenKind::Ne),
                "<=" => Some(TokenKind::Le),
                ">=" => Some(TokenKind::Ge),
                _ => None,
            };
            if let Some(kind) = kind {
                tokens.push(Token {
                    kind,
                    span: Span::new(pos, pos + 2),
                });
                pos += 2;
                continue;
            }
        }

        // Single-character operators / punctuation.
        let kind = match ch {
            b'(' => Some(TokenKind::LParen),
            b')' => Some(TokenKind::RParen),
            b'[' => Some(TokenKind::LBracket),
            b']' => Some(TokenKind::RBracket),
            b',' => Some(TokenKind::Comma),
            b'+' => Some(TokenKind::Plus),
            b'-' => Some(TokenKind::Minus),
            b'*' => Some(TokenKind::Star),
            b'/' => Some(TokenKind::Slash),
            b'<' => Some(TokenKind::Lt),
            b'>' => Some(TokenKind::Gt),
            _ => None,
        };

        if let Some(kind) = kind {
            tokens.push(Token {
                kind,
                span: Span::new(pos, pos + 1),
            });
            pos += 1;
        } else if ch == b'=' {
            return Err(PricingError::ParseError {
                message: "assignment is not supported in payoff expressions".to_string(),
                position: pos,
            });
        } else {
            let offending: String = source[pos..].chars().take(1).collect();
            return Err(PricingError::ParseError {
                message: format!("unexpected character '{}'", offending),
                position: pos,
            });
        }
    }

    Ok(tokens)
}

fn lex_number(source: &str, start: usize) -> PricerResult<(f64, usize)> {
    let bytes = source.as_bytes();
    let mut pos = start;

    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        pos += 1;
        if pos < bytes.len() && (bytes[pos] == b'+' || bytes[pos] == b'-') {
            pos += 1;
        }
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
    }

    let text = &source[start..pos];
    text.parse::<f64>()
        .map(|n| (n, pos))
        .map_err(|_| PricingError::ParseError {
            message: format!("invalid number literal '{}'", text),
            position: start,
        })
}

fn lex_ident_end(source: &str, start: usize) -> usize {
    let bytes = source.as_bytes();
    let mut pos = start;
    while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
        pos += 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_vanilla_call() {
        let tokens = tokenize("max(s - strike, 0)").unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident("max".to_string()),
                TokenKind::LParen,
                TokenKind::Ident("s".to_string()),
                TokenKind::Minus,
                TokenKind::Ident("strike".to_string()),
                TokenKind::Comma,
                TokenKind::Number(0.0),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn tokenize_operators_and_keywords() {
        let tokens = tokenize("if s >= strike and not s == spot then 1 else 0").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::If);
        assert_eq!(tokens[2].kind, TokenKind::Ge);
        assert_eq!(tokens[4].kind, TokenKind::And);
        assert_eq!(tokens[5].kind, TokenKind::Not);
        assert_eq!(tokens[7].kind, TokenKind::EqEq);
        assert_eq!(tokens[9].kind, TokenKind::Then);
        assert_eq!(tokens[11].kind, TokenKind::Else);
    }

    #[test]
    fn tokenize_path_indexing() {
        let tokens = tokenize("path[-1]").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Ident("path".to_string()));
        assert_eq!(tokens[1].kind, TokenKind::LBracket);
        assert_eq!(tokens[2].kind, TokenKind::Minus);
        assert_eq!(tokens[3].kind, TokenKind::Number(1.0));
        assert_eq!(tokens[4].kind, TokenKind::RBracket);
    }

    #[test]
    fn tokenize_scientific_notation() {
        let tokens = tokenize("1.5e-3").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Number(0.0015));
        assert_eq!(tokens[0].span, Span::new(0, 6));
    }

    #[test]
    fn assignment_is_rejected() {
        let err = tokenize("s = 5").unwrap_err();
        let msg = format!("{}", err);
        assert!(msg.contains("assignment"));
    }

    #[test]
    fn disallowed_characters_are_rejected() {
        assert!(tokenize("s.method()").is_err());
        assert!(tokenize("s; 1").is_err());
        assert!(tokenize("{s}").is_err());
        assert!(tokenize("s ** 2").is_ok()); // lexes as Star Star; parser rejects
    }
}
