//! Shared name types and class-symbol interning.

use lasso::{Spur, ThreadedRodeo};
use smol_str::SmolStr;

/// A lightweight owned simple name.
///
/// This is backed by [`smol_str::SmolStr`], which stores short strings inline
/// and avoids heap allocation in many common cases.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Name(SmolStr);

impl Name {
    #[inline]
    pub fn new(text: impl Into<SmolStr>) -> Self {
        Self(text.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Name").field(&self.0.as_str()).finish()
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Identity of a named class.
///
/// A symbol stands for a fully-qualified internal binary name
/// (`java/lang/Object`, `p/Outer$Inner`). Symbols are interned once in a
/// [`SymbolTable`] and compare by key, so equality in lookup paths is O(1).
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct ClassSymbol(Spur);

impl std::fmt::Debug for ClassSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClassSymbol({})", lasso::Key::into_usize(self.0))
    }
}

/// A thread-safe interner from internal binary names to [`ClassSymbol`]s.
///
/// The well-known supertypes of the language (`java/lang/Object`,
/// `java/lang/Enum`, `java/lang/annotation/Annotation`) are interned at
/// construction and exposed as accessors; the hierarchy binder falls back to
/// them when a declaration has no explicit supertypes.
pub struct SymbolTable {
    rodeo: ThreadedRodeo,
    object: ClassSymbol,
    enumeration: ClassSymbol,
    annotation: ClassSymbol,
}

impl SymbolTable {
    pub fn new() -> Self {
        let rodeo = ThreadedRodeo::new();
        let object = ClassSymbol(rodeo.get_or_intern("java/lang/Object"));
        let enumeration = ClassSymbol(rodeo.get_or_intern("java/lang/Enum"));
        let annotation = ClassSymbol(rodeo.get_or_intern("java/lang/annotation/Annotation"));
        Self {
            rodeo,
            object,
            enumeration,
            annotation,
        }
    }

    /// Interns an internal binary name, returning the same symbol for the
    /// same name. Takes `&self`; interning may happen while the environment
    /// is being read.
    #[inline]
    pub fn intern(&self, binary_name: &str) -> ClassSymbol {
        ClassSymbol(self.rodeo.get_or_intern(binary_name))
    }

    /// The internal binary name a symbol was interned from.
    #[inline]
    pub fn binary_name(&self, sym: ClassSymbol) -> &str {
        self.rodeo.resolve(&sym.0)
    }

    /// `java/lang/Object`.
    #[inline]
    pub fn object(&self) -> ClassSymbol {
        self.object
    }

    /// `java/lang/Enum`.
    #[inline]
    pub fn enumeration(&self) -> ClassSymbol {
        self.enumeration
    }

    /// `java/lang/annotation/Annotation`.
    #[inline]
    pub fn annotation(&self) -> ClassSymbol {
        self.annotation
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::{assert_eq, assert_ne};

    use super::*;

    #[test]
    fn interning_is_stable() {
        let table = SymbolTable::new();
        let a = table.intern("p/Foo");
        let b = table.intern("p/Foo");
        assert_eq!(a, b);
        assert_eq!(table.binary_name(a), "p/Foo");
        assert_ne!(a, table.intern("p/Bar"));
    }

    #[test]
    fn well_known_symbols_are_preinterned() {
        let table = SymbolTable::new();
        assert_eq!(table.intern("java/lang/Object"), table.object());
        assert_eq!(table.intern("java/lang/Enum"), table.enumeration());
        assert_eq!(
            table.intern("java/lang/annotation/Annotation"),
            table.annotation()
        );
    }
}
