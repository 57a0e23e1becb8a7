//! Access collection and dependence analysis passes.

pub mod access;
pub mod dependence;

pub use access::{collect_accesses, AliasOracle, NoAliasing, VariableAccess};
pub use dependence::{DataDependence, DependenceAnalysis, DependenceKind, DependenceSet};

pub use crate::solver::Direction;

use crate::ast::{LoopInfo, Stmt};
use crate::utils::errors::DepResult;

/// Analyze a statement list with name-identity aliasing.
pub fn analyze(statements: &[Stmt], enclosing: &[LoopInfo]) -> DepResult<DependenceSet> {
    let analyzer = DependenceAnalysis::new();
    analyzer.analyze(statements, enclosing)
}
