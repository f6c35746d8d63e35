// src/payoff/parser.rs
//! Recursive-descent parser for payoff expressions.
//!
//! Precedence, loosest to tightest:
//! `if/then/else` → `or` → `and` → `not` → comparison → `+ -` → `* /`
//! → unary `-` → `path[...]` subscript → primary.
//!
//! The whitelist is enforced here, not at evaluation time: an unknown
//! identifier, an unknown call target, a bad argument count, or a
//! subscript on anything but `path` is a `ParseError` before any
//! simulation work begins.

use crate::error::{PricerResult, PricingError};
use crate::payoff::ast::*;
use crate::payoff::lexer::{Span, Token, TokenKind};

/// Parser state wrapping a token stream.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &TokenKind, what: &str) -> PricerResult<Span> {
        match self.tokens.get(self.pos) {
            Some(tok) if &tok.kind == expected => {
                self.pos += 1;
                Ok(self.tokens[self.pos - 1].span)
            }
            Some(tok) => Err(PricingError::ParseError {
                message: format!("expected {}, got {:?}", what, tok.kind),
                position: tok.span.start,
            }),
            None => Err(PricingError::ParseError {
                message: format!("expected {}, got end of input", what),
                position: self.eof_position(),
            }),
        }
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|t| t.span)
            .unwrap_or_else(|| Span::new(self.eof_position(), self.eof_position()))
    }

    fn eof_position(&self) -> usize {
        self.tokens.last().map(|t| t.span.end).unwrap_or(0)
    }
}

/// Parse a token stream into an expression tree.
pub fn parse(tokens: Vec<Token>) -> PricerResult<Expr> {
    if tokens.is_empty() {
        return Err(PricingError::ParseError {
            message: "empty payoff expression".to_string(),
            position: 0,
        });
    }
    let mut parser = Parser::new(tokens);
    let expr = parse_expr(&mut parser)?;
    if let Some(kind) = parser.peek_kind() {
        return Err(PricingError::ParseError {
            message: format!("unexpected trailing token {:?}", kind),
            position: parser.current_span().start,
        });
    }
    Ok(expr)
}

fn parse_expr(p: &mut Parser) -> PricerResult<Expr> {
    if matches!(p.peek_kind(), Some(TokenKind::If)) {
        return parse_if_expr(p);
    }
    parse_or_expr(p)
}

fn parse_if_expr(p: &mut Parser) -> PricerResult<Expr> {
    let span = p.current_span();
    p.expect(&TokenKind::If, "'if'")?;
    let condition = parse_expr(p)?;
    p.expect(&TokenKind::Then, "'then'")?;
    let then_branch = parse_expr(p)?;
    p.expect(&TokenKind::Else, "'else'")?;
    let else_branch = parse_expr(p)?;
    let end = else_branch.span.end;
    Ok(Expr {
        kind: ExprKind::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        },
        span: Span::new(span.start, end),
    })
}

fn parse_or_expr(p: &mut Parser) -> PricerResult<Expr> {
    let mut left = parse_and_expr(p)?;
    while matches!(p.peek_kind(), Some(TokenKind::Or)) {
        p.advance();
        let right = parse_and_expr(p)?;
        left = bin_op(BinOp::Or, left, right);
    }
    Ok(left)
}

fn parse_and_expr(p: &mut Parser) -> PricerResult<Expr> {
    let mut left = parse_not_expr(p)?;
    while matches!(p.peek_kind(), Some(TokenKind::And)) {
        p.advance();
        let right = parse_not_expr(p)?;
        left = bin_op(BinOp::And, left, right);
    }
    Ok(left)
}

fn parse_not_expr(p: &mut Parser) -> PricerResult<Expr> {
    if matches!(p.peek_kind(), Some(TokenKind::Not)) {
        let span = p.current_span();
        p.advance();
        let operand = parse_not_expr(p)?;
        let end = operand.span.end;
        return Ok(Expr {
            kind: ExprKind::UnaryOp {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            },
            span: Span::new(span.start, end),
        });
    }
    parse_comparison(p)
}

fn parse_comparison(p: &mut Parser) -> PricerResult<Expr> {
    let left = parse_additive(p)?;
    let op = match p.peek_kind() {
        Some(TokenKind::EqEq) => BinOp::Eq,
        Some(TokenKind::Ne) => BinOp::Ne,
        Some(TokenKind::Lt) => BinOp::Lt,
        Some(TokenKind::Le) => BinOp::Le,
        Some(TokenKind::Gt) => BinOp::Gt,
        Some(TokenKind::Ge) => BinOp::Ge,
        _ => return Ok(left),
    };
    p.advance();
    let right = parse_additive(p)?;
    Ok(bin_op(op, left, right))
}

fn parse_additive(p: &mut Parser) -> PricerResult<Expr> {
    let mut left = parse_multiplicative(p)?;
    loop {
        let op = match p.peek_kind() {
            Some(TokenKind::Plus) => BinOp::Add,
            Some(TokenKind::Minus) => BinOp::Sub,
            _ => break,
        };
        p.advance();
        let right = parse_multiplicative(p)?;
        left = bin_op(op, left, right);
    }
    Ok(left)
}

fn parse_multiplicative(p: &mut Parser) -> PricerResult<Expr> {
    let mut left = parse_unary(p)?;
    loop {
        let op = match p.peek_kind() {
            Some(TokenKind::Star) => BinOp::Mul,
            Some(TokenKind::Slash) => BinOp::Div,
            _ => break,
        };
        p.advance();
        let right = parse_unary(p)?;
        left = bin_op(op, left, right);
    }
    Ok(left)
}

fn parse_unary(p: &mut Parser) -> PricerResult<Expr> {
    if matches!(p.peek_kind(), Some(TokenKind::Minus)) {
        let span = p.current_span();
        p.advance();
        let operand = parse_unary(p)?;
        let end = operand.span.end;
        return Ok(Expr {
            kind: ExprKind::UnaryOp {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            },
            span: Span::new(span.start, end),
        });
    }
    parse_postfix(p)
}

/// Primary expression followed by an optional subscript. Only `path`
/// may be indexed; the restriction is checked here so `s[0]` or
/// `max(...)[1]` never compile.
fn parse_postfix(p: &mut Parser) -> PricerResult<Expr> {
    let expr = parse_primary(p)?;
    if !matches!(p.peek_kind(), Some(TokenKind::LBracket)) {
        return Ok(expr);
    }
    if expr.kind != ExprKind::Var(Var::Path) {
        return Err(PricingError::ParseError {
            message: "subscript is only allowed on 'path'".to_string(),
            position: p.current_span().start,
        });
    }
    p.advance();
    let index = parse_expr(p)?;
    let end = p.expect(&TokenKind::RBracket, "']'")?;
    Ok(Expr {
        kind: ExprKind::Index {
            index: Box::new(index),
        },
        span: Span::new(expr.span.start, end.end),
    })
}

fn parse_primary(p: &mut Parser) -> PricerResult<Expr> {
    let span = p.current_span();
    match p.peek_kind().cloned() {
        Some(TokenKind::Number(n)) => {
            p.advance();
            Ok(Expr {
                kind: ExprKind::Number(n),
                span,
            })
        }
        Some(TokenKind::LParen) => {
            p.advance();
            let expr = parse_expr(p)?;
            p.expect(&TokenKind::RParen, "')'")?;
            Ok(expr)
        }
        Some(TokenKind::Ident(name)) => {
            p.advance();
            if matches!(p.peek_kind(), Some(TokenKind::LParen)) {
                parse_call(p, &name, span)
            } else {
                match Var::lookup(&name) {
                    Some(var) => Ok(Expr {
                        kind: ExprKind::Var(var),
                        span,
                    }),
                    None => Err(PricingError::ParseError {
                        message: format!(
                            "unknown variable '{}' (allowed: path, s, st, spot, strike, step)",
                            name
                        ),
                        position: span.start,
                    }),
                }
            }
        }
        Some(kind) => Err(PricingError::ParseError {
            message: format!("expected expression, got {:?}", kind),
            position: span.start,
        }),
        None => Err(PricingError::ParseError {
            message: "expected expression, got end of input".to_string(),
            position: span.start,
        }),
    }
}

fn parse_call(p: &mut Parser, name: &str, span: Span) -> PricerResult<Expr> {
    let func = Func::lookup(name).ok_or_else(|| PricingError::ParseError {
        message: format!(
            "unknown function '{}' (allowed: max, min, abs, exp, ln, log, sqrt, pow)",
            name
        ),
        position: span.start,
    })?;

    p.expect(&TokenKind::LParen, "'('")?;
    let mut args = Vec::new();
    if !matches!(p.peek_kind(), Some(TokenKind::RParen)) {
        args.push(parse_expr(p)?);
        while matches!(p.peek_kind(), Some(TokenKind::Comma)) {
            p.advance();
            args.push(parse_expr(p)?);
        }
    }
    let end = p.expect(&TokenKind::RParen, "')'")?;

    let (min_arity, max_arity) = func.arity();
    if args.len() < min_arity || args.len() > max_arity {
        let expected = if min_arity == max_arity {
            format!("{}", min_arity)
        } else {
            format!("at least {}", min_arity)
        };
        return Err(PricingError::ParseError {
            message: format!(
                "function '{}' takes {} argument(s), got {}",
                func.name(),
                expected,
                args.len()
            ),
            position: span.start,
        });
    }

    Ok(Expr {
        kind: ExprKind::Call { func, args },
        span: Span::new(span.start, end.end),
    })
}

fn bin_op(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    let span = Span::new(lhs.span.start, rhs.span.end);
    Expr {
        kind: ExprKind::BinOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        span,
    }
}
