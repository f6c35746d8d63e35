// src/payoff/mod.rs
//! Safe payoff expression engine
//!
//! User-supplied payoff formulas are untrusted input. Instead of handing
//! them to a scripting runtime, this module compiles them through a
//! closed grammar: a lexer, a recursive-descent parser, and an
//! enum-tagged AST whose variable and function sets are fixed at parse
//! time. An expression can reference only the simulation bindings and a
//! small library of pure numeric functions: no file, network, process,
//! or arbitrary name access exists anywhere in the evaluator.
//!
//! # Grammar
//!
//! - **Variables**: `path` (the realized price sequence), `s` / `st`
//!   (terminal price), `spot` (initial price), `strike`, `step` (number
//!   of time steps). `path[i]` indexes the sequence; negative indices
//!   count from the end, so `path[-1]` is the terminal price.
//! - **Functions**: `max` / `min` (two-or-more numbers, or `max(path)` to
//!   aggregate), `abs`, `exp`, `ln` (alias `log`), `sqrt`, `pow`.
//! - **Operators**: `+ - * /`, unary `-`, comparisons
//!   `== != < <= > >=`, boolean `and` / `or` / `not`, and
//!   `if cond then a else b`.
//!
//! Anything else (unknown names, unknown call targets, assignment,
//! attribute access, subscripts on anything but `path`) fails at
//! compile time with `ParseError`. Runtime failures (division by zero,
//! domain errors, type mismatches) fail with `EvaluationError` and abort
//! the run that triggered them.
//!
//! # Example
//!
//! ```rust
//! use fast_pricer::payoff::{PayoffBindings, PayoffExpr};
//!
//! let expr = PayoffExpr::compile("max(s - strike, 0)").unwrap();
//! let path = [100.0, 103.0, 108.0];
//! let payoff = expr.evaluate(&PayoffBindings::new(&path, 105.0)).unwrap();
//! assert_eq!(payoff, 3.0);
//! ```

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

pub use eval::PayoffBindings;

use crate::error::PricerResult;

/// A compiled payoff expression.
///
/// Compile once per pricing run and reuse across every simulated path;
/// parsing cost amortizes over potentially hundreds of thousands of
/// evaluations. The compiled tree is immutable and shareable across
/// worker threads.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoffExpr {
    expr: ast::Expr,
    source: String,
}

impl PayoffExpr {
    /// Compile an expression, rejecting anything outside the grammar.
    pub fn compile(source: &str) -> PricerResult<Self> {
        let tokens = lexer::tokenize(source)?;
        let expr = parser::parse(tokens)?;
        Ok(PayoffExpr {
            expr,
            source: source.to_string(),
        })
    }

    /// Evaluate against one path's bindings, yielding the undiscounted
    /// payoff.
    pub fn evaluate(&self, bindings: &PayoffBindings<'_>) -> PricerResult<f64> {
        eval::evaluate(&self.expr, bindings)
    }

    /// The original expression text.
    pub fn source(&self) -> &str {
        &self.source
    }
}
