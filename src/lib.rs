//! # Introduction
//!
//! A front-end for Oberon-07: it scans source bytes into position-tagged
//! tokens and parses them, with a backtracking recursive descent parser, into
//! a concrete parse tree whose node labels are the grammar's rule names.
//!
//! ## Pipeline
//!
//! ```text
//! Source bytes → Scanner → Tokens → Parser → ParseNode tree → Outline
//! ```
//!
//! 1. [`parser::lexer`] classifies bytes into [`parser::lexer::Token`]s.
//! 2. [`parser::parse`] turns the token stream into a [`parser::ast::ParseNode`]
//!    rooted at `module`, or reports one precise [`parser::parse::ParseError`].
//! 3. [`outline`] walks the tree by label and lists what the module imports
//!    and declares.
//!
//! Both stages accept a [`parser::trace::Trace`] to narrate their progress;
//! [`parser::parse_source`] runs the whole pipeline.
//!
//! ## Example
//!
//! ```
//! use oberon07::parser::{parse_source, parse::ParserOptions, trace::NoTrace};
//!
//! let tree = parse_source(b"MODULE M; END M.", &NoTrace, ParserOptions::default()).unwrap();
//! assert_eq!(tree.label(), "module");
//! ```

pub mod outline;
pub mod parser;
