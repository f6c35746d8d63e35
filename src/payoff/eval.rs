// src/payoff/eval.rs
//! Tree-walking evaluator for compiled payoff expressions.
//!
//! Evaluation is deterministic, side-effect-free, and closed over the
//! bindings: the only reachable data is the realized path, the strike,
//! and values derived from them. Runtime failures (division by zero,
//! domain violations, operand type mismatches, bad path indices) surface
//! as `EvaluationError`, never as a silent substitute value.

use crate::error::{PricerResult, PricingError};
use crate::payoff::ast::*;

/// Variable bindings for one simulated path.
#[derive(Debug, Clone, Copy)]
pub struct PayoffBindings<'a> {
    path: &'a [f64],
    strike: f64,
}

impl<'a> PayoffBindings<'a> {
    /// Bind a realized path (S_0 ..= S_M, so at least two prices) and the
    /// strike. `s`/`st`, `spot` and `step` are derived from the path.
    pub fn new(path: &'a [f64], strike: f64) -> Self {
        debug_assert!(!path.is_empty(), "path must contain at least S_0");
        Self { path, strike }
    }

    fn terminal(&self) -> f64 {
        self.path[self.path.len() - 1]
    }

    fn spot(&self) -> f64 {
        self.path[0]
    }

    fn step(&self) -> f64 {
        (self.path.len() - 1) as f64
    }
}

/// Runtime value. Sequences only ever borrow the bound path.
#[derive(Debug, Clone, Copy)]
enum Value<'a> {
    Num(f64),
    Bool(bool),
    Seq(&'a [f64]),
}

impl Value<'_> {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Seq(_) => "sequence",
        }
    }
}

fn eval_error(reason: String) -> PricingError {
    PricingError::EvaluationError { reason, path: None }
}

/// Evaluate an expression tree against one path's bindings.
///
/// The result must be a finite number; a boolean or sequence result, or a
/// NaN/infinite value, is an `EvaluationError`.
pub fn evaluate(expr: &Expr, bindings: &PayoffBindings<'_>) -> PricerResult<f64> {
    match eval(expr, bindings)? {
        Value::Num(n) if n.is_finite() => Ok(n),
        Value::Num(n) => Err(eval_error(format!("payoff is not finite ({})", n))),
        other => Err(eval_error(format!(
            "payoff must be a number, got a {}",
            other.type_name()
        ))),
    }
}

fn eval<'a>(expr: &Expr, b: &PayoffBindings<'a>) -> PricerResult<Value<'a>> {
    match &expr.kind {
        ExprKind::Number(n) => Ok(Value::Num(*n)),
        ExprKind::Var(var) => Ok(match var {
            Var::Path => Value::Seq(b.path),
            Var::Terminal => Value::Num(b.terminal()),
            Var::Spot => Value::Num(b.spot()),
            Var::Strike => Value::Num(b.strike),
            Var::Step => Value::Num(b.step()),
        }),
        ExprKind::Index { index } => {
            let idx = expect_num(eval(index, b)?, "path index")?;
            index_path(b.path, idx).map(Value::Num)
        }
        ExprKind::Call { func, args } => eval_call(*func, args, b),
        ExprKind::BinOp { op, lhs, rhs } => eval_bin_op(*op, lhs, rhs, b),
        ExprKind::UnaryOp { op, operand } => match op {
            UnaryOp::Neg => {
                let v = expect_num(eval(operand, b)?, "negation operand")?;
                Ok(Value::Num(-v))
            }
            UnaryOp::Not => {
                let v = expect_bool(eval(operand, b)?, "'not' operand")?;
                Ok(Value::Bool(!v))
            }
        },
        ExprKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let cond = expect_bool(eval(condition, b)?, "'if' condition")?;
            if cond {
                eval(then_branch, b)
            } else {
                eval(else_branch, b)
            }
        }
    }
}

fn eval_bin_op<'a>(
    op: BinOp,
    lhs: &Expr,
    rhs: &Expr,
    b: &PayoffBindings<'a>,
) -> PricerResult<Value<'a>> {
    // Boolean connectives short-circuit.
    if matches!(op, BinOp::And | BinOp::Or) {
        let l = expect_bool(eval(lhs, b)?, "boolean operand")?;
        return match (op, l) {
            (BinOp::And, false) => Ok(Value::Bool(false)),
            (BinOp::Or, true) => Ok(Value::Bool(true)),
            _ => Ok(Value::Bool(expect_bool(
                eval(rhs, b)?,
                "boolean operand",
            )?)),
        };
    }

    let l = eval(lhs, b)?;
    let r = eval(rhs, b)?;
    let (l, r) = match (l, r) {
        (Value::Num(l), Value::Num(r)) => (l, r),
        (l, r) => {
            return Err(eval_error(format!(
                "unsupported operand types: {} and {}",
                l.type_name(),
                r.type_name()
            )))
        }
    };

    Ok(match op {
        BinOp::Add => Value::Num(l + r),
        BinOp::Sub => Value::Num(l - r),
        BinOp::Mul => Value::Num(l * r),
        BinOp::Div => {
            if r == 0.0 {
                return Err(eval_error("division by zero".to_string()));
            }
            Value::Num(l / r)
        }
        BinOp::Eq => Value::Bool(l == r),
        BinOp::Ne => Value::Bool(l != r),
        BinOp::Lt => Value::Bool(l < r),
        BinOp::Le => Value::Bool(l <= r),
        BinOp::Gt => Value::Bool(l > r),
        BinOp::Ge => Value::Bool(l >= r),
        BinOp::And | BinOp::Or => unreachable!("handled above"),
    })
}

fn eval_call<'a>(func: Func, args: &[Expr], b: &PayoffBindings<'a>) -> PricerResult<Value<'a>> {
    match func {
        Func::Max | Func::Min => {
            // One sequence argument aggregates over the path; otherwise
            // two-or-more numbers.
            if args.len() == 1 {
                let seq = match eval(&args[0], b)? {
                    Value::Seq(seq) => seq,
                    other => {
                        return Err(eval_error(format!(
                            "single-argument {} requires the path, got a {}",
                            func.name(),
                            other.type_name()
                        )))
                    }
                };
                let folded = seq.iter().copied().fold(
                    if func == Func::Max {
                        f64::NEG_INFINITY
                    } else {
                        f64::INFINITY
                    },
                    |acc, x| {
                        if func == Func::Max {
                            acc.max(x)
                        } else {
                            acc.min(x)
                        }
                    },
                );
                Ok(Value::Num(folded))
            } else {
                let mut acc = expect_num(eval(&args[0], b)?, "argument")?;
                for arg in &args[1..] {
                    let v = expect_num(eval(arg, b)?, "argument")?;
                    acc = if func == Func::Max {
                        acc.max(v)
                    } else {
                        acc.min(v)
                    };
                }
                Ok(Value::Num(acc))
            }
        }
        Func::Abs => {
            let v = expect_num(eval(&args[0], b)?, "argument")?;
            Ok(Value::Num(v.abs()))
        }
        Func::Exp => {
            let v = expect_num(eval(&args[0], b)?, "argument")?;
            Ok(Value::Num(v.exp()))
        }
        Func::Ln => {
            let v = expect_num(eval(&args[0], b)?, "argument")?;
            if v <= 0.0 {
                return Err(eval_error(format!("ln of non-positive value ({})", v)));
            }
            Ok(Value::Num(v.ln()))
        }
        Func::Sqrt => {
            let v = expect_num(eval(&args[0], b)?, "argument")?;
            if v < 0.0 {
                return Err(eval_error(format!("sqrt of negative value ({})", v)));
            }
            Ok(Value::Num(v.sqrt()))
        }
        Func::Pow => {
            let base = expect_num(eval(&args[0], b)?, "argument")?;
            let exponent = expect_num(eval(&args[1], b)?, "argument")?;
            Ok(Value::Num(base.powf(exponent)))
        }
    }
}

/// Resolve a path index; negative values count from the end.
fn index_path(path: &[f64], idx: f64) -> PricerResult<f64> {
    if idx.fract() != 0.0 || !idx.is_finite() {
        return Err(eval_error(format!("path index must be an integer ({})", idx)));
    }
    let len = path.len() as f64;
    let resolved = if idx < 0.0 { idx + len } else { idx };
    if resolved < 0.0 || resolved >= len {
        return Err(eval_error(format!(
            "path index {} out of range for {} prices",
            idx,
            path.len()
        )));
    }
    Ok(path[resolved as usize])
}

fn expect_num(value: Value<'_>, what: &str) -> PricerResult<f64> {
    match value {
        Value::Num(n) => Ok(n),
        other => Err(eval_error(format!(
            "{} must be a number, got a {}",
            what,
            other.type_name()
        ))),
    }
}

fn expect_bool(value: Value<'_>, what: &str) -> PricerResult<bool> {
    match value {
        Value::Bool(v) => Ok(v),
        other => Err(eval_error(format!(
            "{} must be a boolean, got a {}",
            what,
            other.type_name()
        ))),
    }
}
