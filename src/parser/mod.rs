mod grammar;

use crate::ast::Node;
use crate::error::{Error, Result};
use crate::lexer::Token;

/// Cursor over the materialized token stream, with one-token lookahead.
/// The cursor position can be saved and restored.
pub struct ParseState {
    tokens: Vec<Token>,
    index: usize,
}

impl ParseState {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    pub fn next(&mut self) -> Option<Token> {
        if self.has_next() {
            let token = self.tokens[self.index].clone();
            self.index += 1;
            Some(token)
        } else {
            None
        }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    pub fn has_next(&self) -> bool {
        self.index < self.tokens.len()
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn restore(&mut self, position: usize) {
        self.index = position;
    }
}

/// Parse a whole program: one expression spanning the entire token stream.
pub fn parse(state: &mut ParseState) -> Result<Node> {
    if !state.has_next() {
        return Err(Error::Syntax("empty program".into()));
    }

    let root = grammar::expression(state)?;

    match state.peek() {
        None => Ok(root),
        Some(token) => Err(Error::Syntax(format!(
            "expected end of input, found {}",
            token.describe()
        ))),
    }
}
