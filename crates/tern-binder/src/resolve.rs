//! Member-type resolution through the inheritance hierarchy.

use tern_core::{ClassSymbol, Name};

use crate::env::Env;

/// Finds a member type of `sym` named `name`.
///
/// Searches the class's direct member types, then recursively its
/// superclass's, then each interface's in declaration order. The first match
/// wins; when distinct paths would yield distinct symbols, diagnosing the
/// ambiguity is a later pass's job.
pub fn resolve(env: &dyn Env, sym: ClassSymbol, name: &Name) -> Option<ClassSymbol> {
    let header = env.get(sym)?;
    if let Some(&member) = header.members.get(name) {
        return Some(member);
    }
    if let Some(superclass) = header.superclass {
        if let Some(found) = resolve(env, superclass, name) {
            return Some(found);
        }
    }
    for &interface in &header.interfaces {
        if let Some(found) = resolve(env, interface, name) {
            return Some(found);
        }
    }
    None
}
