//! Direction-vector hierarchy search.
//!
//! Enumerates every feasible direction vector for one access pair with a
//! depth-first walk over `{<, =, >}` per level. A partial assignment leaves
//! its suffix unconstrained (`*`); if the partial system is already
//! infeasible the whole subtree is pruned. Vectors whose first non-`=`
//! component is `>` are never enumerated: under the fixed source-before-sink
//! access ordering they are mirror images of `<`-leading vectors, not
//! independent results.

use crate::solver::system::{format_directions, DependenceSystem, Direction};
use crate::utils::cancel::CancelToken;
use crate::utils::errors::{AnalysisError, DepResult};
use std::collections::BTreeSet;

/// Feasible-direction enumeration for one dependence system.
#[derive(Debug, Clone)]
pub struct DirectionHierarchy {
    system: DependenceSystem,
}

impl DirectionHierarchy {
    /// Wrap a dependence system for enumeration.
    pub fn new(system: DependenceSystem) -> Self {
        Self { system }
    }

    /// The underlying system.
    pub fn system(&self) -> &DependenceSystem {
        &self.system
    }

    /// All feasible direction vectors, starting the search at the
    /// outermost level.
    pub fn feasible_directions(
        &self,
        cancel: &CancelToken,
    ) -> DepResult<BTreeSet<Vec<Direction>>> {
        self.feasible_directions_from(0, cancel)
    }

    /// All feasible direction vectors with levels before `start_level`
    /// left unconstrained (`*`).
    ///
    /// With a non-zero `start_level` the unconstrained prefix counts as
    /// "not all =", so `>` is enumerated at `start_level` itself.
    pub fn feasible_directions_from(
        &self,
        start_level: usize,
        cancel: &CancelToken,
    ) -> DepResult<BTreeSet<Vec<Direction>>> {
        let mut current = vec![Direction::Any; self.system.depth()];
        let all_eq_prefix = start_level == 0;
        let mut results = BTreeSet::new();
        self.search(start_level, &mut current, all_eq_prefix, &mut results, cancel)?;
        Ok(results)
    }

    fn search(
        &self,
        level: usize,
        current: &mut [Direction],
        all_eq_prefix: bool,
        results: &mut BTreeSet<Vec<Direction>>,
        cancel: &CancelToken,
    ) -> DepResult<()> {
        if cancel.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }
        log::trace!("testing direction vector [{}]", format_directions(current));
        if !self.system.test(current)? {
            return Ok(());
        }
        if level >= current.len() {
            results.insert(current.to_vec());
            return Ok(());
        }
        for dir in [Direction::Lt, Direction::Eq, Direction::Gt] {
            if dir == Direction::Gt && all_eq_prefix {
                // mirror of an already-enumerated <-leading vector
                continue;
            }
            current[level] = dir;
            self.search(
                level + 1,
                current,
                all_eq_prefix && dir == Direction::Eq,
                results,
                cancel,
            )?;
        }
        current[level] = Direction::Any;
        Ok(())
    }
}
