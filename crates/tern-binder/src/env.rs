//! Environments: the symbol-to-header mapping the binder resolves against.
//!
//! Two backings composed as one view: a store of source classes being bound
//! (keys fixed up front, header contents growing as passes complete) and a
//! loader over class-path bytes that materializes headers on first access.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use tern_classfile::ClassFile;
use tern_core::flag;
use tern_core::{ClassSymbol, Name, SymbolTable, TyKind};

/// The header-bound view of one class, source or binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHeader {
    pub kind: TyKind,
    /// The lexically enclosing class, if any.
    pub owner: Option<ClassSymbol>,
    pub access: u32,
    /// `None` while a source class awaits hierarchy binding (and for
    /// `java/lang/Object`).
    pub superclass: Option<ClassSymbol>,
    pub interfaces: Vec<ClassSymbol>,
    /// Member types by simple name.
    pub members: HashMap<Name, ClassSymbol>,
}

impl ClassHeader {
    /// Builds the header view of a parsed class file.
    ///
    /// The inner-class records carried by the file fill in what the
    /// top-level access mask loses: the record describing the class itself
    /// supplies its true access flags and its enclosing class, and records
    /// describing its members populate the member-type map.
    pub fn of_classfile(class: &ClassFile, syms: &SymbolTable) -> Self {
        let mut access = u32::from(class.access_flags);
        let mut owner = None;
        let mut members = HashMap::new();
        for record in &class.inner_classes {
            if record.inner_class == class.this_class {
                if let Some(outer) = &record.outer_class {
                    owner = Some(syms.intern(outer));
                }
                access = u32::from(record.access_flags);
            } else if record.outer_class.as_deref() == Some(class.this_class.as_str()) {
                if let Some(name) = &record.inner_name {
                    members.insert(Name::from(name.as_str()), syms.intern(&record.inner_class));
                }
            }
        }

        Self {
            kind: kind_of(access),
            owner,
            access,
            superclass: class.super_class.as_deref().map(|s| syms.intern(s)),
            interfaces: class.interfaces.iter().map(|i| syms.intern(i)).collect(),
            members,
        }
    }
}

fn kind_of(access: u32) -> TyKind {
    if access & flag::ACC_ANNOTATION != 0 {
        TyKind::Annotation
    } else if access & flag::ACC_INTERFACE != 0 {
        TyKind::Interface
    } else if access & flag::ACC_ENUM != 0 {
        TyKind::Enum
    } else {
        TyKind::Class
    }
}

/// A read view over bound classes.
///
/// Lookup is total for every symbol the binder encounters through owner
/// chains; environments are never mutated while a resolution is in flight.
pub trait Env {
    fn get(&self, sym: ClassSymbol) -> Option<Arc<ClassHeader>>;
}

/// The store of source classes being bound.
#[derive(Debug, Default)]
pub struct SimpleEnv {
    classes: HashMap<ClassSymbol, Arc<ClassHeader>>,
}

impl SimpleEnv {
    pub fn insert(&mut self, sym: ClassSymbol, header: ClassHeader) {
        self.classes.insert(sym, Arc::new(header));
    }

    /// Folds a completed hierarchy bind back into the stored header. The key
    /// set is fixed at canonicalization; only header contents grow.
    pub fn set_hierarchy(
        &mut self,
        sym: ClassSymbol,
        bound: &crate::hierarchy::SourceHeaderBoundClass,
    ) {
        let entry = self
            .classes
            .get_mut(&sym)
            .unwrap_or_else(|| panic!("set_hierarchy for uncanonicalized symbol {sym:?}"));
        let mut header = (**entry).clone();
        header.access = bound.access;
        header.superclass = Some(bound.superclass);
        header.interfaces = bound.interfaces.clone();
        *entry = Arc::new(header);
    }

    pub fn symbols(&self) -> impl Iterator<Item = ClassSymbol> + '_ {
        self.classes.keys().copied()
    }
}

impl Env for SimpleEnv {
    fn get(&self, sym: ClassSymbol) -> Option<Arc<ClassHeader>> {
        self.classes.get(&sym).cloned()
    }
}

/// Headers for pre-compiled dependencies, materialized from class-file bytes
/// on first access.
pub struct ClasspathEnv<'s> {
    syms: &'s SymbolTable,
    bytes: HashMap<ClassSymbol, Vec<u8>>,
    cache: RefCell<HashMap<ClassSymbol, Option<Arc<ClassHeader>>>>,
}

impl<'s> ClasspathEnv<'s> {
    /// `entries` maps internal-form class names to class-file bytes, all
    /// materialized up front by the caller's loader.
    pub fn new(
        syms: &'s SymbolTable,
        entries: impl IntoIterator<Item = (String, Vec<u8>)>,
    ) -> Self {
        let bytes = entries
            .into_iter()
            .map(|(name, data)| (syms.intern(&name), data))
            .collect();
        Self {
            syms,
            bytes,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Every class the class path can provide.
    pub fn symbols(&self) -> impl Iterator<Item = ClassSymbol> + '_ {
        self.bytes.keys().copied()
    }

    fn load(&self, sym: ClassSymbol) -> Option<Arc<ClassHeader>> {
        let data = self.bytes.get(&sym)?;
        match ClassFile::parse(data) {
            Ok(class) => Some(Arc::new(ClassHeader::of_classfile(&class, self.syms))),
            Err(err) => {
                tracing::error!(
                    class = self.syms.binary_name(sym),
                    %err,
                    "failed to parse class-path entry"
                );
                None
            }
        }
    }
}

impl Env for ClasspathEnv<'_> {
    fn get(&self, sym: ClassSymbol) -> Option<Arc<ClassHeader>> {
        if let Some(cached) = self.cache.borrow().get(&sym) {
            return cached.clone();
        }
        let loaded = self.load(sym);
        self.cache.borrow_mut().insert(sym, loaded.clone());
        loaded
    }
}

/// Source classes layered over the class path.
pub struct CompoundEnv<'e> {
    first: &'e dyn Env,
    second: &'e dyn Env,
}

impl<'e> CompoundEnv<'e> {
    pub fn new(first: &'e dyn Env, second: &'e dyn Env) -> Self {
        Self { first, second }
    }
}

impl Env for CompoundEnv<'_> {
    fn get(&self, sym: ClassSymbol) -> Option<Arc<ClassHeader>> {
        self.first.get(sym).or_else(|| self.second.get(sym))
    }
}
