//! Scope table for name resolution

use crate::error::ScopeError;
use crate::symbol::SymbolId;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use wb_intern::Name;

/// Definitions in one nested block, in declaration order
type Frame = IndexMap<Name, SymbolId, FxBuildHasher>;

/// Stack of scope frames
///
/// [`declare`](Self::declare) and [`lookup_innermost`](Self::lookup_innermost)
/// see only the innermost frame; [`resolve`](Self::resolve) walks the whole
/// stack from the inside out. A block may therefore re-declare a name that
/// is visible from an enclosing block, but not one it already declared.
#[derive(Debug, Clone)]
pub struct ScopeTable {
    frames: Vec<Frame>,
}

impl ScopeTable {
    /// Create a table with a single, empty frame
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    /// Number of frames on the stack
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Push an empty innermost frame
    pub fn push_scope(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Remove the innermost frame
    ///
    /// # Errors
    ///
    /// Returns `ScopeError::ScopeUnderflow` if the table has no frames.
    pub fn pop_scope(&mut self) -> Result<(), ScopeError> {
        self.frames.pop().map(|_| ()).ok_or(ScopeError::ScopeUnderflow)
    }

    /// Bind `name` to `symbol` in the innermost frame
    ///
    /// # Errors
    ///
    /// Returns `ScopeError::DuplicateName` if the innermost frame already
    /// binds `name` (outer frames are not consulted), or
    /// `ScopeError::InvalidDeclaration` if the table has no frames.
    pub fn declare(&mut self, name: Name, symbol: SymbolId) -> Result<(), ScopeError> {
        let frame = self
            .frames
            .last_mut()
            .ok_or(ScopeError::InvalidDeclaration)?;

        if let Some(&existing) = frame.get(&name) {
            return Err(ScopeError::DuplicateName { name, existing });
        }

        frame.insert(name, symbol);
        Ok(())
    }

    /// Look `name` up in the innermost frame only
    pub fn lookup_innermost(&self, name: Name) -> Option<SymbolId> {
        self.frames.last()?.get(&name).copied()
    }

    /// Look `name` up from the innermost frame outward
    pub fn resolve(&self, name: Name) -> Option<SymbolId> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(&name).copied())
    }
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{PrimitiveType, Symbol, Symbols};
    use wb_intern::Interner;

    fn setup() -> (Interner, Symbols, SymbolId, SymbolId) {
        let interner = Interner::new();
        let mut symbols = Symbols::new();
        let int = symbols.alloc(Symbol::Primitive(PrimitiveType::Int));
        let bool_sym = symbols.alloc(Symbol::Primitive(PrimitiveType::Bool));
        (interner, symbols, int, bool_sym)
    }

    #[test]
    fn test_declare_and_resolve() {
        let (interner, _symbols, int, _) = setup();
        let mut table = ScopeTable::new();
        let x = interner.intern("x");

        table.declare(x, int).unwrap();
        assert_eq!(table.resolve(x), Some(int));
        assert_eq!(table.lookup_innermost(x), Some(int));
        assert_eq!(table.resolve(interner.intern("y")), None);
    }

    #[test]
    fn test_duplicate_in_same_frame() {
        let (interner, _symbols, int, bool_sym) = setup();
        let mut table = ScopeTable::new();
        let x = interner.intern("x");

        table.declare(x, int).unwrap();
        assert_eq!(
            table.declare(x, bool_sym),
            Err(ScopeError::DuplicateName {
                name: x,
                existing: int
            })
        );
        // The first binding survives
        assert_eq!(table.resolve(x), Some(int));
    }

    #[test]
    fn test_shadowing() {
        let (interner, _symbols, int, bool_sym) = setup();
        let mut table = ScopeTable::new();
        let x = interner.intern("x");

        table.declare(x, int).unwrap();
        table.push_scope();
        assert_eq!(table.lookup_innermost(x), None);
        assert_eq!(table.resolve(x), Some(int));

        table.declare(x, bool_sym).unwrap();
        assert_eq!(table.resolve(x), Some(bool_sym));

        table.pop_scope().unwrap();
        assert_eq!(table.resolve(x), Some(int));
    }

    #[test]
    fn test_underflow_and_empty_declare() {
        let (interner, _symbols, int, _) = setup();
        let mut table = ScopeTable::new();
        assert_eq!(table.depth(), 1);

        table.pop_scope().unwrap();
        assert_eq!(table.depth(), 0);
        assert_eq!(table.pop_scope(), Err(ScopeError::ScopeUnderflow));

        let x = interner.intern("x");
        assert_eq!(table.declare(x, int), Err(ScopeError::InvalidDeclaration));
        assert_eq!(table.lookup_innermost(x), None);
        assert_eq!(table.resolve(x), None);
    }
}
