//! Interpreter for RPAL, a small applicative functional language.
//!
//! Evaluation is a strict pipeline:
//!
//! 1. lex the source into tokens,
//! 2. parse them into an abstract syntax tree,
//! 3. standardize the tree into applications of lambdas,
//! 4. flatten the standardized tree into control structures,
//! 5. run the control structures on the CSE machine.
//!
//! [`evaluate`] wires the stages together; each stage is also public so
//! callers and tests can drive them separately.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod machine;
pub mod parser;
pub mod standardize;

pub use error::{Error, Result};

use std::io::Write;

use tracing::debug;

use lexer::Token;
use machine::Machine;
use parser::ParseState;

/// Evaluate an RPAL program, writing its printed output to `out`.
pub fn evaluate(source: &str, out: &mut impl Write) -> Result<()> {
    let source = lexer::strip_comments(source);
    let tokens = Token::lex(&source).map_err(|err| Error::Lex(err.to_string()))?;
    debug!(tokens = tokens.len(), "lexed");

    let mut state = ParseState::new(tokens);
    let ast = parser::parse(&mut state)?;

    let st = standardize::standardize(ast)?;

    let structures = machine::flatten(&st)?;
    debug!(control_structures = structures.len(), "flattened");

    let mut machine = Machine::new(structures, out);
    machine.run()
}
