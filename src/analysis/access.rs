//! Access collection from the input statement tree.
//!
//! The collector walks a statement list depth-first and produces one
//! [`VariableAccess`] per memory-access site, tagged read or write, with
//! its subscripts already reduced to affine form and its enclosing loop
//! chain recorded. Identifiers inside subscripts count as scalar reads.

use crate::affine::LinearExpr;
use crate::analysis::dependence::DependenceKind;
use crate::ast::{AccessExpr, Expr, LoopInfo, Stmt, StmtKind};
use crate::utils::errors::DependenceTestFailure;
use crate::utils::intern::Symbol;
use num_rational::Rational64;

/// One entered loop, identified by position in the walk.
///
/// The id distinguishes value-equal sibling loops: two loops over the same
/// index and bounds are still different loops, and accesses under them
/// share no common level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopFrame {
    /// Unique id within one collection pass
    pub id: usize,
    /// The loop's metadata
    pub info: LoopInfo,
}

/// A collected memory-access site.
#[derive(Debug, Clone)]
pub struct VariableAccess {
    /// The accessed variable or array
    pub base: Symbol,
    /// Whether this site writes the location
    pub is_write: bool,
    /// Affine subscripts, outermost dimension first; empty for scalars
    pub subscripts: Vec<LinearExpr>,
    /// Source line of the owning statement
    pub line: u32,
    /// Pre-order position among all collected accesses, for lexical
    /// precedence between sites that share no loop
    pub order: usize,
    /// Enclosing loops, outermost first
    pub loops: Vec<LoopFrame>,
}

impl VariableAccess {
    /// Whether this is a scalar access.
    pub fn is_scalar(&self) -> bool {
        self.subscripts.is_empty()
    }

    /// Number of subscript dimensions.
    pub fn ndims(&self) -> usize {
        self.subscripts.len()
    }

    /// The longest common enclosing-loop prefix with another access.
    pub fn common_loops<'a>(&'a self, other: &VariableAccess) -> &'a [LoopFrame] {
        let shared = self
            .loops
            .iter()
            .zip(other.loops.iter())
            .take_while(|(a, b)| a.id == b.id)
            .count();
        &self.loops[..shared]
    }

    /// The dependence kind from this access (source) to another (sink),
    /// or `None` if neither writes.
    pub fn kind_to(&self, other: &VariableAccess) -> Option<DependenceKind> {
        match (self.is_write, other.is_write) {
            (true, false) => Some(DependenceKind::Flow),
            (false, true) => Some(DependenceKind::Anti),
            (true, true) => Some(DependenceKind::Output),
            (false, false) => None,
        }
    }

    /// Project the subscripts onto a fixed variable ordering, one row per
    /// dimension: `[constant, coefficient per variable]`.
    pub fn collect_coefficients(&self, vars: &[Symbol]) -> Vec<Vec<Rational64>> {
        self.subscripts
            .iter()
            .map(|sub| {
                let mut row = Vec::with_capacity(vars.len() + 1);
                row.push(sub.constant_term());
                for &var in vars {
                    row.push(sub.coefficient(var));
                }
                row
            })
            .collect()
    }
}

/// Answers "may these two base variables denote overlapping storage".
///
/// The surrounding tooling resolves pointer aliasing with its own analyses;
/// this crate only consumes the verdict.
pub trait AliasOracle {
    /// Whether `a` and `b` may overlap.
    fn may_alias(&self, a: Symbol, b: Symbol) -> bool;
}

/// Name-identity aliasing: distinct names never overlap.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAliasing;

impl AliasOracle for NoAliasing {
    fn may_alias(&self, a: Symbol, b: Symbol) -> bool {
        a == b
    }
}

/// Collect every access site in `statements`, walked under the given
/// already-entered enclosing loops.
pub fn collect_accesses(
    statements: &[Stmt],
    enclosing: &[LoopInfo],
) -> Result<Vec<VariableAccess>, DependenceTestFailure> {
    for info in enclosing {
        if info.step == 0 {
            return Err(DependenceTestFailure::unsupported(
                format!("loop over '{}' has zero step", info.index),
                None,
            ));
        }
    }
    let loops: Vec<LoopFrame> = enclosing
        .iter()
        .cloned()
        .enumerate()
        .map(|(id, info)| LoopFrame { id, info })
        .collect();
    let mut collector = AccessCollector {
        accesses: Vec::new(),
        next_loop_id: loops.len(),
        loops,
    };
    collector.walk_statements(statements)?;
    Ok(collector.accesses)
}

struct AccessCollector {
    accesses: Vec<VariableAccess>,
    loops: Vec<LoopFrame>,
    next_loop_id: usize,
}

impl AccessCollector {
    fn walk_statements(&mut self, statements: &[Stmt]) -> Result<(), DependenceTestFailure> {
        for stmt in statements {
            self.walk_statement(stmt)?;
        }
        Ok(())
    }

    fn walk_statement(&mut self, stmt: &Stmt) -> Result<(), DependenceTestFailure> {
        match &stmt.kind {
            StmtKind::Assign { target, value } => {
                self.record(target, true, stmt.line)?;
                self.walk_expr(value, stmt.line)
            }
            StmtKind::Update { target, value, .. } => {
                self.record(target, true, stmt.line)?;
                self.record(target, false, stmt.line)?;
                self.walk_expr(value, stmt.line)
            }
            StmtKind::Loop { info, body } => {
                if info.step == 0 {
                    return Err(DependenceTestFailure::unsupported(
                        format!("loop over '{}' has zero step", info.index),
                        Some(stmt.line),
                    ));
                }
                if self.loops.iter().any(|frame| frame.info.index == info.index) {
                    return Err(DependenceTestFailure::unsupported(
                        format!("loop index '{}' shadows an enclosing loop's index", info.index),
                        Some(stmt.line),
                    ));
                }
                self.loops.push(LoopFrame {
                    id: self.next_loop_id,
                    info: info.clone(),
                });
                self.next_loop_id += 1;
                self.walk_statements(body)?;
                self.loops.pop();
                Ok(())
            }
            StmtKind::If { cond, then_body, else_body } => {
                self.walk_expr(cond, stmt.line)?;
                self.walk_statements(then_body)?;
                self.walk_statements(else_body)
            }
        }
    }

    fn walk_expr(&mut self, expr: &Expr, line: u32) -> Result<(), DependenceTestFailure> {
        match expr {
            Expr::Literal(_) => Ok(()),
            Expr::Access(access) => self.record(access, false, line),
            Expr::Unary { operand, .. } => self.walk_expr(operand, line),
            Expr::Binary { left, right, .. } => {
                self.walk_expr(left, line)?;
                self.walk_expr(right, line)
            }
        }
    }

    fn record(
        &mut self,
        access: &AccessExpr,
        is_write: bool,
        line: u32,
    ) -> Result<(), DependenceTestFailure> {
        if is_write && access.is_scalar() {
            if let Some(frame) = self
                .loops
                .iter()
                .find(|frame| frame.info.index == access.base)
            {
                return Err(DependenceTestFailure::writes_index(
                    &frame.info.index.name(),
                    line,
                ));
            }
        }
        let mut subscripts = Vec::with_capacity(access.subscripts.len());
        for sub in &access.subscripts {
            let linear = LinearExpr::from_expr(sub)
                .map_err(|err| DependenceTestFailure::from(err).at_line(line))?;
            subscripts.push(linear);
        }
        self.accesses.push(VariableAccess {
            base: access.base,
            is_write,
            subscripts,
            line,
            order: self.accesses.len(),
            loops: self.loops.clone(),
        });
        // subscript identifiers are themselves read at this site
        for sub in &access.subscripts {
            self.walk_expr(sub, line)?;
        }
        Ok(())
    }
}
