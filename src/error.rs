//! Rich diagnostic error types for the concept-learning engine.
//!
//! Each subsystem defines its own error enum next to the invariant it
//! protects, and converts into [`CoreError`] via `#[from]`, the same pattern
//! the underlying engine uses to fold per-subsystem errors into one umbrella
//! type with miette `#[diagnostic]` derives for error codes and help text.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by [`crate::classification::ClassificationTree`].
#[derive(Debug, Error, Diagnostic)]
pub enum ClassificationError {
    #[error("class name cannot be empty")]
    #[diagnostic(code(winston::classification::empty_name))]
    EmptyName,

    #[error("class `{0}` is already registered")]
    #[diagnostic(
        code(winston::classification::duplicate),
        help("each class may only be added once; pick a distinct name or skip the add")
    )]
    DuplicateClass(String),

    #[error("adding `{child}` under `{parent}` would create a cycle")]
    #[diagnostic(
        code(winston::classification::cycle),
        help("the classification tree is a rooted forest: a class cannot be its own ancestor")
    )]
    Cycle { child: String, parent: String },
}

/// Errors raised by [`crate::model::Model`].
#[derive(Debug, Error, Diagnostic)]
pub enum ModelError {
    #[error("object name cannot be empty")]
    #[diagnostic(code(winston::model::empty_name))]
    EmptyObjectName,

    #[error("object `{0}` is already present in the model")]
    #[diagnostic(code(winston::model::duplicate_object))]
    DuplicateObject(String),

    #[error("object `{0}` referenced by a link is not present in the model")]
    #[diagnostic(
        code(winston::model::dangling_link),
        help("add the object before linking it, or remove the stale link")
    )]
    DanglingLink(String),
}

/// Errors raised when translating between a [`crate::model::Model`] and the
/// fixed predicate vocabulary.
#[derive(Debug, Error, Diagnostic)]
pub enum AdapterError {
    #[error("unknown predicate name `{0}`")]
    #[diagnostic(
        code(winston::adapter::unknown_predicate),
        help("the adapter only understands IsA, HasPart, MustHavePart, MustNotHavePart and Attribute")
    )]
    UnknownPredicate(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),
}

/// The umbrella error type returned by every fallible public operation.
///
/// A heuristic declining to fire because it would conflict with an existing
/// rule is ordinary control flow, not a reportable error, so that signal
/// never surfaces as a `CoreError` variant.
#[derive(Debug, Error, Diagnostic)]
pub enum CoreError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Classification(#[from] ClassificationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Adapter(#[from] AdapterError),
}

pub type CoreResult<T> = Result<T, CoreError>;
