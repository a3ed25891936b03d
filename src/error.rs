//! Error types for the asyncapi-class-gen crate.

use std::path::PathBuf;

/// Errors that can occur while evaluating a document or rendering classes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input document is structurally unusable.
    #[error("document error: {0}")]
    Document(String),

    /// A requested server was not found in the document.
    #[error("server '{name}' not found in document (available: {available})")]
    ServerNotFound { name: String, available: String },

    /// Two schema components map to the same class in the same package.
    #[error("class '{package}\\{name}' is defined by both '{first}' and '{second}'")]
    DuplicateClass {
        package: String,
        name: String,
        first: String,
        second: String,
    },

    /// A property declares neither a `type` nor a `$ref`.
    #[error("field '{field}' of class '{class}' has no type")]
    MissingFieldType { class: String, field: String },

    /// A field type is neither a registered built-in nor a known component.
    #[error("unresolved type reference '{type_name}' for field '{field}' of class '{class}'")]
    UnresolvedType {
        class: String,
        field: String,
        type_name: String,
    },

    /// A `discriminator` names a property the schema does not declare.
    #[error("discriminator '{field}' of class '{class}' is not one of its properties")]
    DiscriminatorNotFound { class: String, field: String },

    /// A class extends a superclass that declares no discriminator field.
    #[error(
        "class '{class}' extends '{super_class}', which declares no discriminator field"
    )]
    MissingDiscriminator { class: String, super_class: String },

    /// A class extends a superclass that declares more than one discriminator field.
    #[error(
        "class '{class}' extends '{super_class}', which declares more than one discriminator field ({fields})"
    )]
    AmbiguousDiscriminator {
        class: String,
        super_class: String,
        fields: String,
    },

    /// A subclass declares a variable one of its ancestors already declares.
    #[error("field '{field}' of class '{class}' is already declared by ancestor '{ancestor}'")]
    RedeclaredField {
        class: String,
        field: String,
        ancestor: String,
    },

    /// A class has more than one `$ref` in its `allOf`.
    #[error("class '{class}' extends more than one class ({candidates})")]
    MultipleSuperClasses { class: String, candidates: String },

    /// A class transitively extends itself.
    #[error("cyclic inheritance: {chain}")]
    CyclicInheritance { chain: String },

    /// The active backend has no syntax for a built-in type.
    #[error("backend '{backend}' has no mapping for built-in type '{type_name}'")]
    UnmappedBuiltIn { backend: String, type_name: String },

    /// Two classes render to the same output path.
    #[error("classes '{first}' and '{second}' both render to {path}")]
    DuplicatePath {
        path: String,
        first: String,
        second: String,
    },

    /// One or more classes failed to render.
    #[error("failed to render {count} class(es): {summary}")]
    Render { count: usize, summary: String },

    /// A requested target language has no backend.
    #[error("unknown target '{name}' (available: {available})")]
    UnknownTarget { name: String, available: String },

    /// Failed to write a generated file.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a file from disk.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON parse error with context.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
