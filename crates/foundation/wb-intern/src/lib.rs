//! String interning for identifier names

pub use lasso::Spur as Name;
use lasso::ThreadedRodeo;
use std::fmt;
use std::sync::Arc;

/// Shared string interner
///
/// Cloning is cheap and every clone resolves the same set of names.
#[derive(Clone)]
pub struct Interner {
    inner: Arc<ThreadedRodeo>,
}

impl Interner {
    /// Create an empty interner
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ThreadedRodeo::new()),
        }
    }

    /// Intern `text`, returning the existing handle if already present
    pub fn intern(&self, text: &str) -> Name {
        self.inner.get_or_intern(text)
    }

    /// Look up a handle without interning
    pub fn get(&self, text: &str) -> Option<Name> {
        self.inner.get(text)
    }

    /// Resolve a handle back to its text
    pub fn resolve(&self, name: &Name) -> &str {
        self.inner.resolve(name)
    }

    /// Number of distinct names interned so far
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether nothing has been interned yet
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Interner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_idempotent() {
        let interner = Interner::new();
        let first = interner.intern("value");
        let second = interner.intern("value");
        assert_eq!(first, second);
        assert_eq!(interner.len(), 1);
        assert_eq!(interner.resolve(&first), "value");
    }

    #[test]
    fn test_clones_share_names() {
        let interner = Interner::new();
        let copy = interner.clone();
        let name = copy.intern("shared");
        assert_eq!(interner.get("shared"), Some(name));
        assert_eq!(interner.get("missing"), None);
    }
}
