use thiserror::Error;

/// Hierarchy-binding failures.
///
/// The first failure is fatal for the class being bound; callers collect
/// results across classes and decide whether to proceed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A named type could not be resolved in any scope.
    #[error("could not resolve `{ty}`")]
    Unresolved { ty: String },
    /// A member-type step of a qualified name had no match against the
    /// symbol resolved so far.
    #[error("`{owner}` has no member type `{name}` (resolving `{ty}`)")]
    MissingMember {
        owner: String,
        name: String,
        ty: String,
    },
}
