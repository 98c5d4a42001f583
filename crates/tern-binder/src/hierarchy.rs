//! Type hierarchy binding.
//!
//! Given a class declaration, its owner and the compilation-unit scope,
//! computes the resolved superclass and interface symbols, the finalized
//! access flags and the finalized visibility.

use std::sync::Arc;

use tern_core::flag;
use tern_core::{ClassSymbol, Modifier, SymbolTable, TyKind, Visibility};

use crate::env::{ClassHeader, Env};
use crate::error::BindError;
use crate::lookup::{CompoundScope, LookupKey, LookupResult, Scope};
use crate::resolve::resolve;
use crate::tree::{ClassTy, MemberDecl, TyDecl};

/// Per-class input to hierarchy binding: the declaration, the enclosing
/// class (absent for top-level declarations) and the unit's scope stack.
#[derive(Clone)]
pub struct SourceBoundClass {
    pub decl: TyDecl,
    pub sym: ClassSymbol,
    pub owner: Option<ClassSymbol>,
    pub scope: Arc<CompoundScope>,
}

/// The product of hierarchy binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceHeaderBoundClass {
    pub superclass: ClassSymbol,
    /// Resolved interfaces, exactly in source order.
    pub interfaces: Vec<ClassSymbol>,
    pub visibility: Visibility,
    pub access: u32,
}

pub struct HierarchyBinder<'a> {
    env: &'a dyn Env,
    syms: &'a SymbolTable,
}

impl<'a> HierarchyBinder<'a> {
    pub fn new(env: &'a dyn Env, syms: &'a SymbolTable) -> Self {
        Self { env, syms }
    }

    /// Binds the type hierarchy for a single class.
    pub fn bind(&self, base: &SourceBoundClass) -> Result<SourceHeaderBoundClass, BindError> {
        let decl = &base.decl;

        let mut access = 0u32;
        for modifier in &decl.mods {
            access |= modifier.flag();
        }
        access |= match decl.kind {
            TyKind::Class => flag::ACC_SUPER,
            TyKind::Interface => flag::ACC_ABSTRACT | flag::ACC_INTERFACE,
            TyKind::Enum => flag::ACC_ENUM | flag::ACC_SUPER,
            TyKind::Annotation => {
                flag::ACC_ABSTRACT | flag::ACC_INTERFACE | flag::ACC_ANNOTATION
            }
        };

        // Types declared in interfaces and annotations are implicitly
        // public, whatever their source modifiers say.
        let visibility = if self.enclosed_by_interface(base.owner) {
            Visibility::Public
        } else {
            Visibility::from_access(access)
        };

        if access & flag::ACC_STATIC == 0 {
            // Nested enums, and types nested within interfaces and
            // annotations, are implicitly static.
            if decl.kind == TyKind::Enum || self.enclosed_by_interface(base.owner) {
                access |= flag::ACC_STATIC;
            }
        }

        if decl.kind == TyKind::Interface {
            access |= flag::ACC_ABSTRACT;
        }

        let superclass = match &decl.xtnds {
            Some(ty) => self.resolve_class(&base.scope, base.sym, ty)?,
            None => match decl.kind {
                TyKind::Enum => {
                    if is_enum_abstract(decl) {
                        access |= flag::ACC_ABSTRACT;
                    } else {
                        access |= flag::ACC_FINAL;
                    }
                    self.syms.enumeration()
                }
                // Compiling java/lang/Object itself is not supported: the
                // default unconditionally names it as the superclass.
                TyKind::Class | TyKind::Interface | TyKind::Annotation => self.syms.object(),
            },
        };

        let mut interfaces = Vec::with_capacity(decl.impls.len());
        for ty in &decl.impls {
            interfaces.push(self.resolve_class(&base.scope, base.sym, ty)?);
        }
        if interfaces.is_empty() && decl.kind == TyKind::Annotation {
            interfaces.push(self.syms.annotation());
        }

        Ok(SourceHeaderBoundClass {
            superclass,
            interfaces,
            visibility,
            access,
        })
    }

    /// Resolves a qualified type expression to a symbol, with handling for
    /// non-canonical qualified names.
    pub fn resolve_class(
        &self,
        scope: &CompoundScope,
        sym: ClassSymbol,
        ty: &ClassTy,
    ) -> Result<ClassSymbol, BindError> {
        // Flatten the left-recursive chain to outermost-first simple names,
        // e.g. `Foo.Bar.Baz` -> ["Foo", "Bar", "Baz"].
        let mut flat = Vec::new();
        let mut curr = Some(ty);
        while let Some(t) = curr {
            flat.push(t.name.clone());
            curr = t.base.as_deref();
        }
        flat.reverse();
        let key = LookupKey::new(flat);

        let Some(result) = self.lookup(scope, sym, &key) else {
            return Err(BindError::Unresolved { ty: ty.to_string() });
        };

        // The remaining names refer to member types, which may be declared
        // in supertypes of the symbol resolved so far.
        let mut current = result.sym;
        for name in &result.remaining {
            current =
                resolve(self.env, current, name).ok_or_else(|| BindError::MissingMember {
                    owner: self.syms.binary_name(current).to_string(),
                    name: name.to_string(),
                    ty: ty.to_string(),
                })?;
        }
        Ok(current)
    }

    /// Finds the base symbol of a qualified name.
    ///
    /// Member types visible from the lexically enclosing declarations shadow
    /// anything the compilation-unit scope would find, so the owner chain is
    /// walked first.
    fn lookup(
        &self,
        parent: &CompoundScope,
        sym: ClassSymbol,
        key: &LookupKey,
    ) -> Option<LookupResult> {
        let mut current = Some(sym);
        while let Some(curr) = current {
            if let Some(hit) = resolve(self.env, curr, key.first()) {
                return Some(LookupResult {
                    sym: hit,
                    remaining: key.rest().to_vec(),
                });
            }
            current = self.header(curr).owner;
        }
        parent.lookup(key)
    }

    /// Walks the owner chain; true as soon as an interface or annotation
    /// declaration encloses the class.
    fn enclosed_by_interface(&self, mut owner: Option<ClassSymbol>) -> bool {
        while let Some(sym) = owner {
            let header = self.header(sym);
            match header.kind {
                TyKind::Interface | TyKind::Annotation => return true,
                TyKind::Class | TyKind::Enum => {}
            }
            owner = header.owner;
        }
        false
    }

    fn header(&self, sym: ClassSymbol) -> Arc<ClassHeader> {
        self.env
            .get(sym)
            .unwrap_or_else(|| panic!("no bound class for `{}`", self.syms.binary_name(sym)))
    }
}

/// Whether any enum constant declares a class body; the parser records this
/// with the `EnumImpl` marker, and such enums lower to abstract classes.
fn is_enum_abstract(decl: &TyDecl) -> bool {
    decl.members.iter().any(|member| match member {
        MemberDecl::Var(var) => var.mods.contains(&Modifier::EnumImpl),
        MemberDecl::Method(_) | MemberDecl::Type(_) => false,
    })
}
