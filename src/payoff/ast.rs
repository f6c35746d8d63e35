// src/payoff/ast.rs
//! Enum-tagged expression tree produced by the parser.
//!
//! The variable and function sets are closed enums resolved at parse
//! time, so an evaluated tree can only ever touch the whitelisted
//! bindings: there is no name resolution at runtime.

use crate::payoff::lexer::Span;

/// Expression node with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Numeric literal.
    Number(f64),
    /// Whitelisted variable reference.
    Var(Var),
    /// `path[index]`, the only permitted subscript.
    Index { index: Box<Expr> },
    /// Whitelisted function call.
    Call { func: Func, args: Vec<Expr> },
    /// Binary operation.
    BinOp {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Unary operation.
    UnaryOp { op: UnaryOp, operand: Box<Expr> },
    /// `if cond then a else b`.
    If {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
}

/// The closed set of variables a payoff expression may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Var {
    /// The realized price sequence, S_0 ..= S_M.
    Path,
    /// Terminal price (`s` or `st`).
    Terminal,
    /// Initial price (`spot`).
    Spot,
    /// Strike from the market model.
    Strike,
    /// Number of time steps M.
    Step,
}

impl Var {
    pub fn lookup(name: &str) -> Option<Var> {
        match name {
            "path" => Some(Var::Path),
            "s" | "st" => Some(Var::Terminal),
            "spot" => Some(Var::Spot),
            "strike" => Some(Var::Strike),
            "step" => Some(Var::Step),
            _ => None,
        }
    }
}

/// The closed set of callable functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Max,
    Min,
    Abs,
    Exp,
    Ln,
    Sqrt,
    Pow,
}

impl Func {
    pub fn lookup(name: &str) -> Option<Func> {
        match name {
            "max" => Some(Func::Max),
            "min" => Some(Func::Min),
            "abs" => Some(Func::Abs),
            "exp" => Some(Func::Exp),
            "ln" | "log" => Some(Func::Ln),
            "sqrt" => Some(Func::Sqrt),
            "pow" => Some(Func::Pow),
            _ => None,
        }
    }

    /// Allowed argument counts: (min, max).
    ///
    /// `max`/`min` take either one sequence argument (aggregate over the
    /// path) or two-or-more numbers; the shape check is at runtime, the
    /// arity check here.
    pub fn arity(&self) -> (usize, usize) {
        match self {
            Func::Max | Func::Min => (1, usize::MAX),
            Func::Abs | Func::Exp | Func::Ln | Func::Sqrt => (1, 1),
            Func::Pow => (2, 2),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Func::Max => "max",
            Func::Min => "min",
            Func::Abs => "abs",
            Func::Exp => "exp",
            Func::Ln => "ln",
            Func::Sqrt => "sqrt",
            Func::Pow => "pow",
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}
