//! Error types for the TOON codec and the TOONPath engines.
//!
//! Three concerns, three enums:
//!
//! - [`ToonError`] — decoding TOON text (carries the 1-based source line)
//! - [`PathError`] — parsing a mutation path or TOONPath query (carries the
//!   0-based character offset where parsing stopped)
//! - [`QueryError`] — executing a read query (syntax wrap + strict path
//!   resolution failures)
//!
//! Mutation operations do not surface these at the boundary; they return
//! discriminated result structs (`success`/`message`) so callers can map
//! outcomes to responses without exception-style handling. See
//! [`crate::mutate`].

use thiserror::Error;

/// Errors that can occur while decoding TOON text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToonError {
    /// The input was not valid TOON. Includes the 1-based line number
    /// where the error was detected.
    #[error("TOON parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Convenience alias for decoder results.
pub type Result<T> = std::result::Result<T, ToonError>;

/// Syntax errors from the mutation-path and TOONPath query grammars.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A character that fits no grammar rule at this point.
    #[error("unexpected character '{found}' at position {position}")]
    UnexpectedChar { found: char, position: usize },

    /// A string literal with no closing quote.
    #[error("unterminated string starting at position {position}")]
    UnterminatedString { position: usize },

    /// The parser needed one construct and found another. `what` names the
    /// expected construct ("']'", "operator", "value", "field name", ...).
    #[error("expected {what} at position {position}")]
    Expected { what: String, position: usize },

    /// A comparison operator that is not one of `== != < > <= >=`.
    #[error("invalid operator at position {position}")]
    InvalidOperator { position: usize },

    /// `sort:<field>:<order>` with an order other than `asc`/`desc`.
    #[error("invalid sort order '{order}' at position {position}")]
    InvalidSortOrder { order: String, position: usize },
}

/// Errors from the read-path query engine.
///
/// Path resolution is strict: every segment must exist and every
/// intermediate value must be traversable. There is no defaulting and no
/// partial match.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The query string failed to parse.
    #[error("invalid query: {0}")]
    Syntax(#[from] PathError),

    /// A path segment was applied to a null value.
    #[error("cannot access property '{segment}' of null")]
    NullAccess { segment: String },

    /// A path segment was applied to a scalar.
    #[error("cannot access property '{segment}' of a primitive value")]
    PrimitiveAccess { segment: String },

    /// The named property does not exist at this point in the tree.
    #[error("property '{segment}' not found")]
    MissingProperty { segment: String },
}
