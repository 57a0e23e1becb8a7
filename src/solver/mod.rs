//! Feasibility machinery: constraint matrices, Fourier-Motzkin
//! elimination, dependence systems and the direction-vector search.

pub mod matrix;
pub mod eliminator;
pub mod system;
pub mod hierarchy;

// Re-exports
pub use matrix::ConstraintMatrix;
pub use eliminator::has_real_solution;
pub use system::{DependenceSystem, Direction};
pub use hierarchy::DirectionHierarchy;
