//! Input model for dependence analysis.
//!
//! A minimal statement/expression tree standing in for the host frontend:
//! integer expressions, scalar and array accesses, assignments, counted
//! loops and branches. Collaborators lower their own representation into
//! this model before calling the analysis.

use crate::utils::intern::{intern, Symbol};
use serde::{Serialize, Deserialize};
use std::fmt;

/// Metadata for one counted loop.
///
/// Bounds are resolved compile-time constants where the surrounding tooling
/// could determine them; `None` means unresolved, and the dependence system
/// falls back to conservative sentinel bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopInfo {
    /// The loop index variable
    pub index: Symbol,
    /// Resolved constant lower bound, if known
    pub lower: Option<i64>,
    /// Resolved constant upper bound (inclusive), if known
    pub upper_inclusive: Option<i64>,
    /// Loop step; zero is an unsupported loop form
    pub step: i64,
}

impl LoopInfo {
    /// A unit-step loop over `[lower, upper]`.
    pub fn new(index: &str, lower: i64, upper_inclusive: i64) -> Self {
        Self {
            index: intern(index),
            lower: Some(lower),
            upper_inclusive: Some(upper_inclusive),
            step: 1,
        }
    }

    /// A unit-step loop with unresolved bounds.
    pub fn unbounded(index: &str) -> Self {
        Self {
            index: intern(index),
            lower: None,
            upper_inclusive: None,
            step: 1,
        }
    }

    /// Override the step.
    pub fn with_step(mut self, step: i64) -> Self {
        self.step = step;
        self
    }
}

/// A memory access: a base variable plus zero or more subscripts.
///
/// Empty subscripts denote a scalar access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessExpr {
    /// The accessed variable or array
    pub base: Symbol,
    /// Subscript expressions, outermost dimension first
    pub subscripts: Vec<Expr>,
}

impl AccessExpr {
    /// A scalar access.
    pub fn scalar(base: &str) -> Self {
        Self { base: intern(base), subscripts: Vec::new() }
    }

    /// An array access with the given subscripts.
    pub fn array(base: &str, subscripts: Vec<Expr>) -> Self {
        Self { base: intern(base), subscripts }
    }

    /// Whether this access has no subscripts.
    pub fn is_scalar(&self) -> bool {
        self.subscripts.is_empty()
    }

    /// Number of subscript dimensions (0 for scalars).
    pub fn ndims(&self) -> usize {
        self.subscripts.len()
    }
}

impl fmt::Display for AccessExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        for sub in &self.subscripts {
            write!(f, "[{}]", sub)?;
        }
        Ok(())
    }
}

/// An integer-valued expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Integer literal
    Literal(i64),
    /// Scalar or array access
    Access(AccessExpr),
    /// Unary operation: `op operand`
    Unary {
        /// The operator
        op: UnaryOp,
        /// The operand
        operand: Box<Expr>,
    },
    /// Binary operation: `left op right`
    Binary {
        /// The operator
        op: BinaryOp,
        /// Left operand
        left: Box<Expr>,
        /// Right operand
        right: Box<Expr>,
    },
}

impl Expr {
    /// An integer literal.
    pub fn lit(value: i64) -> Self {
        Expr::Literal(value)
    }

    /// A scalar variable reference.
    pub fn var(name: &str) -> Self {
        Expr::Access(AccessExpr::scalar(name))
    }

    /// An array element read.
    pub fn index(base: &str, subscripts: Vec<Expr>) -> Self {
        Expr::Access(AccessExpr::array(base, subscripts))
    }

    /// `left + right`
    pub fn add(left: Expr, right: Expr) -> Self {
        Expr::Binary { op: BinaryOp::Add, left: Box::new(left), right: Box::new(right) }
    }

    /// `left - right`
    pub fn sub(left: Expr, right: Expr) -> Self {
        Expr::Binary { op: BinaryOp::Sub, left: Box::new(left), right: Box::new(right) }
    }

    /// `left * right`
    pub fn mul(left: Expr, right: Expr) -> Self {
        Expr::Binary { op: BinaryOp::Mul, left: Box::new(left), right: Box::new(right) }
    }

    /// `left / right`
    pub fn div(left: Expr, right: Expr) -> Self {
        Expr::Binary { op: BinaryOp::Div, left: Box::new(left), right: Box::new(right) }
    }

    /// `left % right`
    pub fn modulo(left: Expr, right: Expr) -> Self {
        Expr::Binary { op: BinaryOp::Mod, left: Box::new(left), right: Box::new(right) }
    }

    /// `-operand`
    pub fn neg(operand: Expr) -> Self {
        Expr::Unary { op: UnaryOp::Neg, operand: Box::new(operand) }
    }

    /// Check if this expression contains no variable references.
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Literal(_) => true,
            Expr::Access(_) => false,
            Expr::Unary { operand, .. } => operand.is_constant(),
            Expr::Binary { left, right, .. } => left.is_constant() && right.is_constant(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::Access(access) => write!(f, "{}", access),
            Expr::Unary { op, operand } => write!(f, "{}{}", op, operand),
            Expr::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Mod => write!(f, "%"),
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Negation: `-x`
    Neg,
    /// Identity: `+x`
    Plus,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Plus => write!(f, "+"),
        }
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    /// The kind of statement
    pub kind: StmtKind,
    /// Source line
    pub line: u32,
}

/// The kind of a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    /// Assignment: `target = value;`
    Assign {
        /// The written access
        target: AccessExpr,
        /// The assigned value
        value: Expr,
    },

    /// Compound assignment: `target op= value;` (target is read and written)
    Update {
        /// The read-and-written access
        target: AccessExpr,
        /// The compound operator
        op: BinaryOp,
        /// The combined value
        value: Expr,
    },

    /// Counted loop: `for (index = lower; index <= upper; index += step) { body }`
    Loop {
        /// Loop metadata
        info: LoopInfo,
        /// Loop body
        body: Vec<Stmt>,
    },

    /// Branch: `if (cond) { then } else { else }`
    If {
        /// The condition
        cond: Expr,
        /// Taken branch
        then_body: Vec<Stmt>,
        /// Not-taken branch
        else_body: Vec<Stmt>,
    },
}

impl Stmt {
    /// An assignment statement.
    pub fn assign(line: u32, target: AccessExpr, value: Expr) -> Self {
        Self { kind: StmtKind::Assign { target, value }, line }
    }

    /// A compound assignment statement.
    pub fn update(line: u32, target: AccessExpr, op: BinaryOp, value: Expr) -> Self {
        Self { kind: StmtKind::Update { target, op, value }, line }
    }

    /// A counted loop.
    pub fn for_loop(line: u32, info: LoopInfo, body: Vec<Stmt>) -> Self {
        Self { kind: StmtKind::Loop { info, body }, line }
    }

    /// A two-armed branch.
    pub fn if_else(line: u32, cond: Expr, then_body: Vec<Stmt>, else_body: Vec<Stmt>) -> Self {
        Self { kind: StmtKind::If { cond, then_body, else_body }, line }
    }

    /// A one-armed branch.
    pub fn if_then(line: u32, cond: Expr, then_body: Vec<Stmt>) -> Self {
        Self::if_else(line, cond, then_body, Vec::new())
    }
}
