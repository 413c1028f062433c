//! Oberon-07 source parser
//!
//! This module transforms Oberon-07 source bytes into a concrete parse tree:
//! - [`lexer`]: Tokenization (source bytes → tokens)
//! - [`parse`]: Parsing (tokens → tree), with the grammar split across
//!   `declarations`, `types`, `statements` and `expressions`
//! - [`ast`]: Parse tree node definitions
//! - [`trace`]: Progress narration hooks shared by both stages
//!
//! # Parser Implementation
//!
//! Hand-written backtracking recursive descent parser. Each grammar
//! production produces one tree node labeled with the production name, and
//! every consumed token becomes a leaf, so the leaves of a tree read back the
//! token stream in order.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;
pub mod trace;
mod types;

#[cfg(test)]
mod property_tests;

use ast::ParseNode;
use lexer::{LexError, Scanner};
use parse::{ParseError, Parser, ParserOptions};
use thiserror::Error;
use trace::Trace;

/// Error from either front-end stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrontendError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Scan and parse one source file.
///
/// A lexical error stops the pipeline before the parser sees any token.
pub fn parse_source(
    source: &[u8],
    tracer: &dyn Trace,
    options: ParserOptions,
) -> Result<ParseNode, FrontendError> {
    let tokens = Scanner::new(source)
        .with_tracer(tracer)
        .run()
        .into_result()?;
    let tree = Parser::new(&tokens)
        .with_tracer(tracer)
        .with_options(options)
        .parse_program()?;
    Ok(tree)
}
