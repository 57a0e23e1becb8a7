//! # loopdep - Loop Data-Dependence Analysis
//!
//! A dependence analysis engine for loop-transformation tooling, including:
//! - Affine subscript extraction from loop-nest statements
//! - Fourier-Motzkin feasibility testing over rational constraint systems
//! - Hierarchical direction-vector search with prefix pruning
//! - Flow/anti/output classification and per-level carried queries
//!
//! ## Architecture
//!
//! ```text
//! Statements → Access Collection → Dependence Systems → Direction Search → DependenceSet
//! ```
//!
//! ## Example
//!
//! ```rust
//! use loopdep::prelude::*;
//!
//! // for (i = 1; i <= 100; i++) { a[i] = a[i - 1] + 1; }
//! let nest = vec![Stmt::for_loop(
//!     1,
//!     LoopInfo::new("i", 1, 100),
//!     vec![Stmt::assign(
//!         2,
//!         AccessExpr::array("a", vec![Expr::var("i")]),
//!         Expr::add(
//!             Expr::index("a", vec![Expr::sub(Expr::var("i"), Expr::lit(1))]),
//!             Expr::lit(1),
//!         ),
//!     )],
//! )];
//!
//! let deps = analyze(&nest, &[])?;
//! assert!(deps.has_level(1));
//! # Ok::<(), AnalysisError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod affine;
pub mod analysis;
pub mod ast;
pub mod solver;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::affine::LinearExpr;
    pub use crate::analysis::{
        analyze, collect_accesses, AliasOracle, DataDependence, DependenceAnalysis,
        DependenceKind, DependenceSet, NoAliasing, VariableAccess,
    };
    pub use crate::ast::{AccessExpr, BinaryOp, Expr, LoopInfo, Stmt, StmtKind, UnaryOp};
    pub use crate::solver::{
        has_real_solution, ConstraintMatrix, DependenceSystem, Direction, DirectionHierarchy,
    };
    pub use crate::utils::cancel::CancelToken;
    pub use crate::utils::errors::*;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
