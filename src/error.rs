//! Crate-wide error taxonomy
//!
//! Every stage of the pipeline fails with one of these variants; all of them
//! are fatal and abort evaluation. Output already written by `Print` stays
//! visible.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The lexer could not classify part of the input.
    #[error("lex error: {0}")]
    Lex(String),

    /// The parser hit a token it did not expect.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// An AST node violated the shape precondition of a standardization rule.
    #[error("standardize error: {0}")]
    Standardize(String),

    /// The standardized tree contained a label the flattener does not emit
    /// control items for.
    #[error("flatten error: {0}")]
    Flatten(String),

    /// An identifier was neither bound in the environment chain nor a
    /// built-in name.
    #[error("unbound identifier '{0}'")]
    UnboundIdentifier(String),

    /// An operator or built-in received the wrong kind of value.
    #[error("type error: {0}")]
    Type(String),

    /// A tuple was indexed out of range or with a non-integer.
    #[error("tuple index error: {0}")]
    Index(String),

    /// The machine state broke an internal invariant (value stack underflow,
    /// missing control structure, malformed tuple encoding).
    #[error("machine error: {0}")]
    Machine(String),

    /// The output sink failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
