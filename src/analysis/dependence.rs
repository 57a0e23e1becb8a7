//! Dependence analysis over statement lists.
//!
//! The orchestrator pairs up collected access sites, runs the
//! direction-vector search for each pair over their common loop nest, and
//! classifies the feasible vectors into flow, anti and output dependences.
//! The result set backs the legality queries of loop-transformation checks
//! (parallelization, interchange, fusion and friends).

use crate::analysis::access::{collect_accesses, AliasOracle, NoAliasing, VariableAccess};
use crate::ast::{LoopInfo, Stmt};
use crate::solver::hierarchy::DirectionHierarchy;
use crate::solver::system::{format_directions, DependenceSystem, Direction};
use crate::utils::cancel::CancelToken;
use crate::utils::errors::DepResult;
use crate::utils::intern::Symbol;
use serde::{Serialize, Deserialize};
use std::collections::BTreeSet;
use std::fmt;

/// Kind of data dependence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DependenceKind {
    /// Read-after-write (true/flow dependence)
    Flow,
    /// Write-after-read (anti dependence)
    Anti,
    /// Write-after-write (output dependence)
    Output,
}

impl DependenceKind {
    /// Whether this is a value-carrying dependence, as opposed to storage
    /// reuse.
    pub fn is_true_dependence(&self) -> bool {
        matches!(self, DependenceKind::Flow)
    }

    /// Get short name for the dependence kind.
    pub fn short_name(&self) -> &'static str {
        match self {
            DependenceKind::Flow => "RAW",
            DependenceKind::Anti => "WAR",
            DependenceKind::Output => "WAW",
        }
    }
}

impl fmt::Display for DependenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependenceKind::Flow => write!(f, "flow"),
            DependenceKind::Anti => write!(f, "anti"),
            DependenceKind::Output => write!(f, "output"),
        }
    }
}

/// One confirmed dependence between two access sites.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataDependence {
    /// Kind of dependence
    pub kind: DependenceKind,
    /// The accessed variable or array
    pub base: Symbol,
    /// Source line of the source access
    pub source_line: u32,
    /// Source line of the sink access
    pub sink_line: u32,
    /// Direction per common loop level, outermost first
    pub direction: Vec<Direction>,
}

impl DataDependence {
    /// The 1-based level of the outermost component that is not `=`, or
    /// `None` for a loop-independent dependence. An unconstrained (`*`)
    /// component counts as carried.
    pub fn level(&self) -> Option<usize> {
        self.direction
            .iter()
            .position(|d| *d != Direction::Eq)
            .map(|idx| idx + 1)
    }

    /// Whether some loop level carries this dependence.
    pub fn is_loop_carried(&self) -> bool {
        self.level().is_some()
    }

    /// Whether the dependence stays within a single iteration.
    pub fn is_loop_independent(&self) -> bool {
        !self.is_loop_carried()
    }
}

impl fmt::Display for DataDependence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: line {} -> line {} [{}]",
            self.kind,
            self.base,
            self.source_line,
            self.sink_line,
            format_directions(&self.direction)
        )
    }
}

/// The dependences found in one statement list.
///
/// Structurally identical records collapse; equality between sets ignores
/// construction order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependenceSet {
    deps: BTreeSet<DataDependence>,
}

impl DependenceSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependence. Returns false if it was already present.
    pub fn insert(&mut self, dep: DataDependence) -> bool {
        self.deps.insert(dep)
    }

    /// Iterate over the dependences.
    pub fn iter(&self) -> impl Iterator<Item = &DataDependence> {
        self.deps.iter()
    }

    /// Number of dependences.
    pub fn len(&self) -> usize {
        self.deps.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    /// Whether any dependence is carried at the given 1-based level.
    pub fn has_level(&self, level: usize) -> bool {
        self.deps.iter().any(|dep| dep.level() == Some(level))
    }

    /// Whether any dependence is loop-carried.
    pub fn has_loop_carried(&self) -> bool {
        self.deps.iter().any(DataDependence::is_loop_carried)
    }

    /// Number of loop-carried dependences.
    pub fn carried_count(&self) -> usize {
        self.deps.iter().filter(|dep| dep.is_loop_carried()).count()
    }

    /// Number of dependences of one kind.
    pub fn count_of_kind(&self, kind: DependenceKind) -> usize {
        self.deps.iter().filter(|dep| dep.kind == kind).count()
    }

    /// The dependences ordered by their display form, for deterministic
    /// diagnostics.
    pub fn sorted(&self) -> Vec<&DataDependence> {
        let mut deps: Vec<&DataDependence> = self.deps.iter().collect();
        deps.sort_by_key(|dep| dep.to_string());
        deps
    }
}

/// Stand-in bounds for unresolved loop limits, kept just inside the i32
/// range.
const LOWER_SENTINEL: i64 = i32::MIN as i64 + 1;
const UPPER_SENTINEL: i64 = i32::MAX as i64 - 1;

fn effective_bounds(info: &LoopInfo) -> (i64, i64) {
    // only unresolved bounds take the sentinels; narrowing a resolved
    // bound could hide a dependence
    (
        info.lower.unwrap_or(LOWER_SENTINEL),
        info.upper_inclusive.unwrap_or(UPPER_SENTINEL),
    )
}

/// Whole-unit dependence analysis.
///
/// A single failure anywhere in the statement list fails the whole
/// analysis: the caller must reject its transformation rather than assume
/// independence.
pub struct DependenceAnalysis {
    oracle: Box<dyn AliasOracle>,
}

impl Default for DependenceAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

impl DependenceAnalysis {
    /// Analysis with name-identity aliasing.
    pub fn new() -> Self {
        Self { oracle: Box::new(NoAliasing) }
    }

    /// Analysis with a caller-supplied aliasing oracle.
    pub fn with_oracle(oracle: Box<dyn AliasOracle>) -> Self {
        Self { oracle }
    }

    /// Analyze a statement list under the given already-entered loops.
    pub fn analyze(
        &self,
        statements: &[Stmt],
        enclosing: &[LoopInfo],
    ) -> DepResult<DependenceSet> {
        self.analyze_with_cancel(statements, enclosing, &CancelToken::new())
    }

    /// Like [`analyze`](Self::analyze), polling the token between
    /// direction-vector candidates.
    pub fn analyze_with_cancel(
        &self,
        statements: &[Stmt],
        enclosing: &[LoopInfo],
        cancel: &CancelToken,
    ) -> DepResult<DependenceSet> {
        let accesses = collect_accesses(statements, enclosing)?;
        log::debug!(
            "collected {} access sites from {} statements",
            accesses.len(),
            statements.len()
        );
        let mut set = DependenceSet::new();
        for source in &accesses {
            for sink in &accesses {
                self.analyze_pair(source, sink, cancel, &mut set)?;
            }
        }
        log::debug!("found {} dependences", set.len());
        Ok(set)
    }

    fn analyze_pair(
        &self,
        source: &VariableAccess,
        sink: &VariableAccess,
        cancel: &CancelToken,
        set: &mut DependenceSet,
    ) -> DepResult<()> {
        let Some(kind) = source.kind_to(sink) else {
            return Ok(());
        };
        if !self.oracle.may_alias(source.base, sink.base) {
            return Ok(());
        }
        let common = source.common_loops(sink);
        let self_pair = source.order == sink.order;
        // the sink must be reachable after the source: a shared loop
        // re-executes the source, otherwise lexical order decides
        if common.is_empty() && source.order >= sink.order {
            return Ok(());
        }

        if source.is_scalar()
            || sink.is_scalar()
            || source.base != sink.base
            || source.ndims() != sink.ndims()
        {
            // no usable subscript correspondence: assume overlap at every
            // common level
            let dep = DataDependence {
                kind,
                base: source.base,
                source_line: source.line,
                sink_line: sink.line,
                direction: vec![Direction::Any; common.len()],
            };
            if !(self_pair && dep.is_loop_independent()) {
                set.insert(dep);
            }
            return Ok(());
        }

        let index_vars: Vec<Symbol> = common.iter().map(|frame| frame.info.index).collect();
        let mut seen: BTreeSet<Symbol> = BTreeSet::new();
        for sub in source.subscripts.iter().chain(sink.subscripts.iter()) {
            for var in sub.variables() {
                if !index_vars.contains(&var) {
                    seen.insert(var);
                }
            }
        }
        let mut scalar_vars: Vec<Symbol> = seen.into_iter().collect();
        scalar_vars.sort_by_key(|sym| sym.name());
        let num_scalars = scalar_vars.len();

        let mut vars = index_vars;
        vars.extend(scalar_vars);

        let write_rows = source.collect_coefficients(&vars);
        let read_rows = sink.collect_coefficients(&vars);
        let (lower, upper): (Vec<i64>, Vec<i64>) = common
            .iter()
            .map(|frame| effective_bounds(&frame.info))
            .unzip();

        let system = DependenceSystem::new(lower, upper, write_rows, read_rows, num_scalars)?;
        let hierarchy = DirectionHierarchy::new(system);
        for direction in hierarchy.feasible_directions(cancel)? {
            let dep = DataDependence {
                kind,
                base: source.base,
                source_line: source.line,
                sink_line: sink.line,
                direction,
            };
            if self_pair && dep.is_loop_independent() {
                // a site does not depend on itself within one iteration
                continue;
            }
            log::trace!("confirmed {}", dep);
            set.insert(dep);
        }
        Ok(())
    }
}
