//! Utility modules for the dependence engine.
//!
//! This module contains common utilities used throughout the codebase:
//! - Error types
//! - Symbol interning
//! - Cancellation tokens

pub mod errors;
pub mod intern;
pub mod cancel;

// Re-exports
pub use errors::*;
pub use intern::{intern, resolve, Symbol, SymbolTable};
pub use cancel::CancelToken;
