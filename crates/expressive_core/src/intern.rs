//! String interning for identifier names.
//!
//! Identifiers are interned while parsing so that name comparisons in the
//! clash checks and the transformer are integer comparisons.

use lasso::{Spur, ThreadedRodeo};
use std::fmt;
use std::sync::Arc;

/// An interned identifier name. A `u32`-sized handle into a [`StringInterner`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Atom(Spur);

impl Atom {
    #[inline]
    pub fn from_spur(spur: Spur) -> Self {
        Self(spur)
    }

    #[inline]
    pub fn as_spur(self) -> Spur {
        self.0
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({:?})", self.0)
    }
}

/// Thread-safe string interner.
///
/// Cloning is cheap and shares the underlying table, so the parser's tree and
/// the transformer's output tree resolve the same handles.
#[derive(Clone)]
pub struct StringInterner {
    rodeo: Arc<ThreadedRodeo>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self {
            rodeo: Arc::new(ThreadedRodeo::new()),
        }
    }

    /// Intern a string, returning the existing handle if already present.
    #[inline]
    pub fn intern(&self, s: &str) -> Atom {
        Atom::from_spur(self.rodeo.get_or_intern(s))
    }

    #[inline]
    pub fn intern_static(&self, s: &'static str) -> Atom {
        Atom::from_spur(self.rodeo.get_or_intern_static(s))
    }

    /// Look up an already-interned string without interning it.
    #[inline]
    pub fn get(&self, s: &str) -> Option<Atom> {
        self.rodeo.get(s).map(Atom::from_spur)
    }

    #[inline]
    pub fn resolve(&self, key: Atom) -> &str {
        self.rodeo.resolve(&key.as_spur())
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}
