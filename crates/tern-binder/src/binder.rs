//! The batch driver: canonicalizes compilation units and hierarchy-binds
//! every source class.
//!
//! Canonicalization interns a symbol for every declared class, records owner
//! chains and member-type maps, and seeds the environment with partial
//! headers. Those maps depend only on lexical containment, never on resolved
//! supertypes, which is what lets hierarchy binding recurse through
//! supertype member types without a cycle.

use std::collections::HashMap;
use std::sync::Arc;

use tern_core::{ClassSymbol, Name, SymbolTable};

use crate::env::{ClassHeader, ClasspathEnv, CompoundEnv, SimpleEnv};
use crate::error::BindError;
use crate::hierarchy::{HierarchyBinder, SourceBoundClass, SourceHeaderBoundClass};
use crate::lookup::{
    resolve_top_level, CompoundScope, ImportScope, LookupKey, MapIndex, PackageScope,
    QualifiedScope, SingleTypeImport, TopLevelIndex, WildcardImportScope,
};
use crate::tree::{CompUnit, MemberDecl, TyDecl};

/// The result of binding a batch of compilation units.
#[derive(Debug)]
pub struct Bound {
    /// Final header view of every source class.
    pub env: SimpleEnv,
    /// Per-class hierarchy results, outer classes before their members.
    pub headers: Vec<(ClassSymbol, SourceHeaderBoundClass)>,
}

/// Canonicalizes and hierarchy-binds `units` against `classpath`.
///
/// Classes are bound in declaration order with enclosing classes first, and
/// each result is folded back into the environment before the next bind, so
/// later binds see the supertype edges of everything already bound.
pub fn bind_units(
    units: &[CompUnit],
    syms: &SymbolTable,
    classpath: &ClasspathEnv<'_>,
) -> Result<Bound, BindError> {
    let mut env = SimpleEnv::default();
    let mut index = MapIndex::default();
    let mut pending: Vec<Pending> = Vec::new();

    for (unit_idx, unit) in units.iter().enumerate() {
        let package = unit.package.as_deref().unwrap_or("");
        for decl in &unit.decls {
            let binary_name = if package.is_empty() {
                decl.name.to_string()
            } else {
                format!("{}/{}", package.replace('.', "/"), decl.name)
            };
            let sym = canonicalize(decl, binary_name, None, unit_idx, syms, &mut env, &mut pending);
            index.insert(package, decl.name.clone(), sym);
        }
    }

    for sym in classpath.symbols() {
        let internal = syms.binary_name(sym);
        let (package_path, simple) = internal.rsplit_once('/').unwrap_or(("", internal));
        if simple.contains('$') {
            // Nested classes are reached through their outer class.
            continue;
        }
        index.insert(&package_path.replace('/', "."), Name::from(simple), sym);
    }

    let index: Arc<dyn TopLevelIndex> = Arc::new(index);
    let scopes: Vec<Arc<CompoundScope>> = units
        .iter()
        .map(|unit| Arc::new(unit_scope(unit, syms, &index)))
        .collect();

    let records: Vec<SourceBoundClass> = pending
        .into_iter()
        .map(|p| SourceBoundClass {
            decl: p.decl,
            sym: p.sym,
            owner: p.owner,
            scope: scopes[p.unit_idx].clone(),
        })
        .collect();

    let mut headers = Vec::with_capacity(records.len());
    for record in &records {
        let bound = {
            let compound = CompoundEnv::new(&env, classpath);
            HierarchyBinder::new(&compound, syms).bind(record)?
        };
        env.set_hierarchy(record.sym, &bound);
        headers.push((record.sym, bound));
    }

    Ok(Bound { env, headers })
}

struct Pending {
    unit_idx: usize,
    decl: TyDecl,
    sym: ClassSymbol,
    owner: Option<ClassSymbol>,
}

/// Interns `decl` and its nested types, seeding partial headers. Returns the
/// symbol of `decl`; pushes outer declarations before the types they
/// enclose.
fn canonicalize(
    decl: &TyDecl,
    binary_name: String,
    owner: Option<ClassSymbol>,
    unit_idx: usize,
    syms: &SymbolTable,
    env: &mut SimpleEnv,
    pending: &mut Vec<Pending>,
) -> ClassSymbol {
    let sym = syms.intern(&binary_name);
    pending.push(Pending {
        unit_idx,
        decl: decl.clone(),
        sym,
        owner,
    });

    let mut members = HashMap::new();
    for member in &decl.members {
        if let MemberDecl::Type(nested) = member {
            let nested_name = format!("{binary_name}${}", nested.name);
            let nested_sym =
                canonicalize(nested, nested_name, Some(sym), unit_idx, syms, env, pending);
            members.insert(nested.name.clone(), nested_sym);
        }
    }

    env.insert(
        sym,
        ClassHeader {
            kind: decl.kind,
            owner,
            access: 0,
            superclass: None,
            interfaces: Vec::new(),
            members,
        },
    );
    sym
}

/// Builds the scope stack for one compilation unit: single-type imports,
/// then the unit's own package, then on-demand imports, then fully-qualified
/// resolution.
fn unit_scope(unit: &CompUnit, syms: &SymbolTable, index: &Arc<dyn TopLevelIndex>) -> CompoundScope {
    let mut single = HashMap::new();
    let mut star_packages = Vec::new();
    for import in &unit.imports {
        if import.is_static {
            // Static imports contribute no type names to these scopes.
            continue;
        }
        if import.is_star {
            star_packages.push(import.path.clone());
            continue;
        }
        if import.path.trim().is_empty() {
            continue;
        }

        let names: Vec<Name> = import.path.split('.').map(Name::from).collect();
        let Some(imported) = names.last().cloned() else {
            continue;
        };
        let key = LookupKey::new(names);
        // The path names a top-level class after some package prefix; any
        // names beyond it reach the imported type as nested members (e.g.
        // `import p.Outer.Inner;` resolves `p/Outer` here and leaves `Inner`
        // for member resolution at use sites).
        let entry = match resolve_top_level(index.as_ref(), &key) {
            Some(result) => SingleTypeImport {
                sym: result.sym,
                members: result.remaining,
            },
            None => {
                // No known top-level class on the path. Keep the import in
                // scope under the plain package.Class reading so the failure
                // surfaces at use sites instead of silently vanishing.
                let (package, simple) = import
                    .path
                    .rsplit_once('.')
                    .unwrap_or(("", import.path.as_str()));
                let internal = if package.is_empty() {
                    simple.to_string()
                } else {
                    format!("{}/{}", package.replace('.', "/"), simple)
                };
                SingleTypeImport {
                    sym: syms.intern(&internal),
                    members: Vec::new(),
                }
            }
        };
        single.insert(imported, entry);
    }

    let package = unit.package.clone().unwrap_or_default();
    CompoundScope::new(vec![
        Box::new(ImportScope::new(single)),
        Box::new(PackageScope::new(package, index.clone())),
        Box::new(WildcardImportScope::new(star_packages, index.clone())),
        Box::new(QualifiedScope::new(index.clone())),
    ])
}
