//! The declaration tree handed over by the parser.
//!
//! Only what header binding needs survives here: kinds, modifiers, the
//! `extends`/`implements` clauses, and enough member structure to find
//! nested types and body-bearing enum constants.

use std::fmt;

use tern_core::{Modifier, Name, TyKind};

/// One compilation unit as produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompUnit {
    /// Dotted package name; `None` for the default package.
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub decls: Vec<TyDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub is_static: bool,
    pub is_star: bool,
    /// Dotted path, without the trailing `.*` of an on-demand import.
    pub path: String,
}

/// A type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TyDecl {
    pub kind: TyKind,
    pub mods: Vec<Modifier>,
    pub name: Name,
    /// The explicit `extends` clause, if any.
    pub xtnds: Option<ClassTy>,
    /// `implements` (or interface `extends`) types in source order.
    pub impls: Vec<ClassTy>,
    pub members: Vec<MemberDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberDecl {
    Var(VarDecl),
    Method(MethodDecl),
    Type(TyDecl),
}

/// A field declaration, or an enum constant (the parser marks constants
/// declared with a class body with [`Modifier::EnumImpl`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecl {
    pub mods: Vec<Modifier>,
    pub name: Name,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub mods: Vec<Modifier>,
    pub name: Name,
}

/// A qualified type expression.
///
/// `A<...>.B<...>.C` parses to a left-recursive chain: the node for `C`
/// carries the chain for `A.B` as its `base`. Type arguments are erased
/// before header binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTy {
    pub base: Option<Box<ClassTy>>,
    pub name: Name,
}

impl ClassTy {
    pub fn simple(name: &str) -> Self {
        Self {
            base: None,
            name: Name::from(name),
        }
    }

    /// Builds the left-recursive chain for `names` given outermost-first.
    pub fn qualified(names: &[&str]) -> Self {
        let (first, rest) = names
            .split_first()
            .expect("qualified name must be non-empty");
        let mut ty = ClassTy::simple(first);
        for name in rest {
            ty = ClassTy {
                base: Some(Box::new(ty)),
                name: Name::from(*name),
            };
        }
        ty
    }
}

impl fmt::Display for ClassTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(base) = &self.base {
            write!(f, "{base}.")?;
        }
        f.write_str(self.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_ty_display_is_dotted() {
        assert_eq!(ClassTy::simple("Foo").to_string(), "Foo");
        assert_eq!(
            ClassTy::qualified(&["Outer", "Mid", "Inner"]).to_string(),
            "Outer.Mid.Inner"
        );
    }
}
