//! Symbol interning for variable identity.
//!
//! Loop index variables and scalar symbols appearing in subscripts are
//! compared and stored as interned [`Symbol`]s rather than strings.

use string_interner::{StringInterner, DefaultSymbol, backend::StringBackend, Symbol as SymbolTrait};
use std::fmt;
use std::sync::RwLock;
use serde::{Serialize, Deserialize};
use once_cell::sync::Lazy;

/// Type alias for our interner backend
type Backend = StringBackend<DefaultSymbol>;

/// A symbol representing an interned variable name.
///
/// Ordering is by intern index, not by name; callers that need name order
/// (e.g. the scalar-column ordering of a dependence system) resolve first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(u32);

impl Symbol {
    pub(crate) fn from_raw(index: u32) -> Self { Symbol(index) }
    /// The raw intern index.
    pub fn as_raw(&self) -> u32 { self.0 }

    /// The interned name, or a placeholder if the symbol is unknown
    /// to the global interner.
    pub fn name(&self) -> String {
        resolve(*self).unwrap_or_else(|| format!("?{}", self.0))
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Global symbol interner (thread-safe).
static GLOBAL_INTERNER: Lazy<RwLock<StringInterner<Backend>>> =
    Lazy::new(|| RwLock::new(StringInterner::new()));

/// An owned symbol interner, for callers that want isolation from the
/// global table.
#[derive(Debug)]
pub struct SymbolTable {
    interner: StringInterner<Backend>,
}

impl Default for SymbolTable {
    fn default() -> Self { Self::new() }
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self { interner: StringInterner::new() }
    }

    /// Intern a name, returning its symbol.
    pub fn intern(&mut self, s: &str) -> Symbol {
        let sym = self.interner.get_or_intern(s);
        Symbol(sym.to_usize() as u32)
    }

    /// Resolve a symbol back to its name.
    pub fn resolve(&self, sym: Symbol) -> Option<&str> {
        let internal_sym = DefaultSymbol::try_from_usize(sym.0 as usize)?;
        self.interner.resolve(internal_sym)
    }

    /// Look up an already-interned name.
    pub fn get(&self, s: &str) -> Option<Symbol> {
        self.interner.get(s).map(|sym| Symbol(sym.to_usize() as u32))
    }

    /// Number of interned names.
    pub fn len(&self) -> usize { self.interner.len() }
    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool { self.interner.is_empty() }
}

/// Intern a string in the global interner.
pub fn intern(s: &str) -> Symbol {
    let mut interner = GLOBAL_INTERNER.write().unwrap();
    let sym = interner.get_or_intern(s);
    Symbol(sym.to_usize() as u32)
}

/// Resolve a symbol from the global interner.
pub fn resolve(sym: Symbol) -> Option<String> {
    let interner = GLOBAL_INTERNER.read().unwrap();
    let internal_sym = DefaultSymbol::try_from_usize(sym.0 as usize)?;
    interner.resolve(internal_sym).map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_table() {
        let mut table = SymbolTable::new();
        let sym1 = table.intern("i");
        let sym2 = table.intern("j");
        let sym3 = table.intern("i");
        assert_eq!(sym1, sym3);
        assert_ne!(sym1, sym2);
        assert_eq!(table.resolve(sym1), Some("i"));
    }

    #[test]
    fn test_global_interner() {
        let sym1 = intern("loop_index");
        let sym2 = intern("loop_index");
        assert_eq!(sym1, sym2);
        assert_eq!(resolve(sym1), Some("loop_index".to_string()));
        assert_eq!(sym1.name(), "loop_index");
    }

    #[test]
    fn test_unknown_symbol_name() {
        let sym = Symbol::from_raw(u32::MAX);
        assert!(sym.name().starts_with('?'));
    }
}
