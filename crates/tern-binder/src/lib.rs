//! Hierarchy binding for header compilation.
//!
//! Computes, per source class, the resolved superclass and interface
//! symbols, finalized access flags and visibility. Names resolve through
//! lexically enclosing classes, member types inherited from supertypes
//! (including classes loaded from pre-compiled class files), imports, the
//! enclosing package and fully-qualified top-level names.

pub mod binder;
pub mod env;
pub mod error;
pub mod hierarchy;
pub mod lookup;
pub mod resolve;
pub mod tree;

pub use binder::{bind_units, Bound};
pub use env::{ClassHeader, ClasspathEnv, CompoundEnv, Env, SimpleEnv};
pub use error::BindError;
pub use hierarchy::{HierarchyBinder, SourceBoundClass, SourceHeaderBoundClass};
pub use lookup::{
    CompoundScope, ImportScope, LookupKey, LookupResult, MapIndex, PackageScope, QualifiedScope,
    Scope, SingleTypeImport, TopLevelIndex, WildcardImportScope,
};
pub use resolve::resolve;
