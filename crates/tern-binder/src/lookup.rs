//! Scopes and name lookup for compilation units.
//!
//! A qualified name is resolved in two stages: a scope finds the *base*
//! symbol (consuming one or more leading simple names), and the caller walks
//! whatever names remain as member-type accesses. Scopes are stacked in
//! shadowing order inside a [`CompoundScope`].

use std::collections::HashMap;
use std::sync::Arc;

use tern_core::{ClassSymbol, Name};

/// An ordered, non-empty sequence of simple names being resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKey {
    names: Vec<Name>,
}

impl LookupKey {
    pub fn new(names: Vec<Name>) -> Self {
        assert!(!names.is_empty(), "lookup key must be non-empty");
        Self { names }
    }

    pub fn first(&self) -> &Name {
        &self.names[0]
    }

    pub fn rest(&self) -> &[Name] {
        &self.names[1..]
    }

    pub fn names(&self) -> &[Name] {
        &self.names
    }
}

/// A resolved base symbol plus the names still to be resolved as member
/// accesses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub sym: ClassSymbol,
    pub remaining: Vec<Name>,
}

pub trait Scope {
    fn lookup(&self, key: &LookupKey) -> Option<LookupResult>;
}

/// Lookup of top-level classes by package and simple name.
///
/// Backed by whatever holds the known top-level classes: the source units
/// being compiled plus the class path.
pub trait TopLevelIndex {
    /// `package` is dotted, empty for the default package.
    fn resolve(&self, package: &str, simple: &str) -> Option<ClassSymbol>;
}

/// A map-backed [`TopLevelIndex`].
#[derive(Debug, Clone, Default)]
pub struct MapIndex {
    by_package: HashMap<String, HashMap<Name, ClassSymbol>>,
}

impl MapIndex {
    pub fn insert(&mut self, package: &str, simple: Name, sym: ClassSymbol) {
        self.by_package
            .entry(package.to_string())
            .or_default()
            .insert(simple, sym);
    }
}

impl TopLevelIndex for MapIndex {
    fn resolve(&self, package: &str, simple: &str) -> Option<ClassSymbol> {
        self.by_package
            .get(package)?
            .get(&Name::from(simple))
            .copied()
    }
}

/// A single-type import, keyed by its imported simple name.
///
/// `import p.Outer.Inner;` resolves to the top-level class `p/Outer` plus
/// the member path `[Inner]`; importing a top-level class directly leaves
/// the member path empty. Member steps are resolved at use sites, where the
/// environment is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleTypeImport {
    pub sym: ClassSymbol,
    pub members: Vec<Name>,
}

/// Single-type imports: each maps a simple name to the imported type.
pub struct ImportScope {
    by_simple: HashMap<Name, SingleTypeImport>,
}

impl ImportScope {
    pub fn new(by_simple: HashMap<Name, SingleTypeImport>) -> Self {
        Self { by_simple }
    }
}

impl Scope for ImportScope {
    fn lookup(&self, key: &LookupKey) -> Option<LookupResult> {
        let import = self.by_simple.get(key.first())?;
        let mut remaining = import.members.clone();
        remaining.extend_from_slice(key.rest());
        Some(LookupResult {
            sym: import.sym,
            remaining,
        })
    }
}

/// Top-level classes of the compilation unit's own package.
pub struct PackageScope {
    package: String,
    index: Arc<dyn TopLevelIndex>,
}

impl PackageScope {
    pub fn new(package: String, index: Arc<dyn TopLevelIndex>) -> Self {
        Self { package, index }
    }
}

impl Scope for PackageScope {
    fn lookup(&self, key: &LookupKey) -> Option<LookupResult> {
        let sym = self.index.resolve(&self.package, key.first().as_str())?;
        Some(LookupResult {
            sym,
            remaining: key.rest().to_vec(),
        })
    }
}

/// On-demand (`import p.*;`) imports, consulted in declaration order.
pub struct WildcardImportScope {
    packages: Vec<String>,
    index: Arc<dyn TopLevelIndex>,
}

impl WildcardImportScope {
    pub fn new(packages: Vec<String>, index: Arc<dyn TopLevelIndex>) -> Self {
        Self { packages, index }
    }
}

impl Scope for WildcardImportScope {
    fn lookup(&self, key: &LookupKey) -> Option<LookupResult> {
        for package in &self.packages {
            if let Some(sym) = self.index.resolve(package, key.first().as_str()) {
                return Some(LookupResult {
                    sym,
                    remaining: key.rest().to_vec(),
                });
            }
        }
        None
    }
}

/// Fully-qualified names: consumes leading names as a package path until a
/// known top-level class matches.
pub struct QualifiedScope {
    index: Arc<dyn TopLevelIndex>,
}

impl QualifiedScope {
    pub fn new(index: Arc<dyn TopLevelIndex>) -> Self {
        Self { index }
    }
}

impl Scope for QualifiedScope {
    fn lookup(&self, key: &LookupKey) -> Option<LookupResult> {
        resolve_top_level(self.index.as_ref(), key)
    }
}

/// Walks `key` against `index`, consuming leading names as a package path
/// until the next name matches a top-level class. Whatever follows the match
/// is left for member-access resolution.
pub(crate) fn resolve_top_level(
    index: &dyn TopLevelIndex,
    key: &LookupKey,
) -> Option<LookupResult> {
    let names = key.names();
    let mut package = String::new();
    for (i, name) in names.iter().enumerate() {
        if let Some(sym) = index.resolve(&package, name.as_str()) {
            return Some(LookupResult {
                sym,
                remaining: names[i + 1..].to_vec(),
            });
        }
        if !package.is_empty() {
            package.push('.');
        }
        package.push_str(name.as_str());
    }
    None
}

/// An ordered stack of sub-scopes; the first non-empty answer wins.
pub struct CompoundScope {
    scopes: Vec<Box<dyn Scope>>,
}

impl CompoundScope {
    pub fn new(scopes: Vec<Box<dyn Scope>>) -> Self {
        Self { scopes }
    }
}

impl Scope for CompoundScope {
    fn lookup(&self, key: &LookupKey) -> Option<LookupResult> {
        self.scopes.iter().find_map(|scope| scope.lookup(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_core::SymbolTable;

    fn key(names: &[&str]) -> LookupKey {
        LookupKey::new(names.iter().map(|n| Name::from(*n)).collect())
    }

    #[test]
    fn qualified_scope_consumes_the_package_prefix() {
        let syms = SymbolTable::new();
        let mut index = MapIndex::default();
        index.insert("java.util", Name::from("List"), syms.intern("java/util/List"));
        let scope = QualifiedScope::new(Arc::new(index));

        let result = scope.lookup(&key(&["java", "util", "List", "Entry"])).unwrap();
        assert_eq!(result.sym, syms.intern("java/util/List"));
        assert_eq!(result.remaining, vec![Name::from("Entry")]);

        assert!(scope.lookup(&key(&["java", "util", "Set"])).is_none());
    }

    #[test]
    fn import_scope_carries_the_member_path() {
        let syms = SymbolTable::new();
        let outer = syms.intern("a/Outer");
        let mut single = HashMap::new();
        single.insert(
            Name::from("Inner"),
            SingleTypeImport {
                sym: outer,
                members: vec![Name::from("Inner")],
            },
        );
        let scope = ImportScope::new(single);

        let result = scope.lookup(&key(&["Inner", "Deep"])).unwrap();
        assert_eq!(result.sym, outer);
        assert_eq!(
            result.remaining,
            vec![Name::from("Inner"), Name::from("Deep")]
        );
    }

    #[test]
    fn compound_scope_prefers_the_outer_scope() {
        let syms = SymbolTable::new();
        let imported = syms.intern("a/Foo");
        let sibling = syms.intern("b/Foo");

        let mut single = HashMap::new();
        single.insert(
            Name::from("Foo"),
            SingleTypeImport {
                sym: imported,
                members: Vec::new(),
            },
        );
        let mut index = MapIndex::default();
        index.insert("b", Name::from("Foo"), sibling);

        let scope = CompoundScope::new(vec![
            Box::new(ImportScope::new(single)),
            Box::new(PackageScope::new("b".to_string(), Arc::new(index))),
        ]);
        assert_eq!(scope.lookup(&key(&["Foo"])).unwrap().sym, imported);
        assert_eq!(scope.lookup(&key(&["Foo"])).unwrap().remaining, vec![]);
    }
}
