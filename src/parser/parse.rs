//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure:
//! error types, terminal primitives, the scoped checkpoint helper, and the
//! main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser is a backtracking recursive descent parser over a borrowed
//! token slice:
//! - This module: Parser struct, primitives, and coordination
//! - `declarations`: module, imports, CONST/TYPE/VAR blocks, procedures
//! - `types`: type expressions (arrays, records, pointers, procedure types)
//! - `statements`: statement sequences and structured statements
//! - `expressions`: expressions, designators and sets
//!
//! # Production protocol
//!
//! Every grammar production returns a [`Production`]:
//!
//! - `Ok(Some(node))`: the production matched.
//! - `Ok(None)`: the production does not apply here; the cursor is exactly
//!   where it was before the attempt.
//! - `Err(_)`: the production committed and a required element is missing.
//!
//! Productions are written as closures run through `Parser::production`,
//! which owns the checkpoint. A body signals "no match" by returning
//! `Ok(false)` and never rewinds the cursor itself.
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::parser::ast::{ParseNode, SourceLocation};
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::trace::{NoTrace, Trace, TraceEvent, TracePhase};
use thiserror::Error;

/// Outcome of one production attempt.
pub type Production = Result<Option<ParseNode>, ParseError>;

/// Outcome of a production body: `Ok(true)` matched, `Ok(false)` no match.
pub(crate) type Matched = Result<bool, ParseError>;

/// Production frames allowed on the stack before the parse is abandoned.
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    Expected,
    NameMismatch,
    TrailingToken,
    NestingTooDeep,
}

/// Parser error type
///
/// Every variant carries the source location and the index of the token
/// where the parse stopped. At end of stream the location is that of the
/// last token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("parse error at {location}: expected {expected}, {}", found_clause(.found))]
    Expected {
        expected: String,
        /// Text of the offending token, `None` at end of stream.
        found: Option<String>,
        location: SourceLocation,
        index: usize,
    },

    #[error("parse error at {location}: {construct} '{opening}' is closed with '{closing}'")]
    NameMismatch {
        construct: String,
        opening: String,
        closing: String,
        location: SourceLocation,
        index: usize,
    },

    #[error("unparsed token '{text}' at {location}, token number {index}")]
    TrailingToken {
        text: String,
        location: SourceLocation,
        index: usize,
    },

    #[error("parse error at {location}: nesting exceeds {limit} levels")]
    NestingTooDeep {
        limit: usize,
        location: SourceLocation,
        index: usize,
    },
}

fn found_clause(found: &Option<String>) -> String {
    match found {
        Some(text) => format!("found '{text}'"),
        None => "but reached end of stream".to_string(),
    }
}

impl ParseError {
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::Expected { .. } => ParseErrorKind::Expected,
            ParseError::NameMismatch { .. } => ParseErrorKind::NameMismatch,
            ParseError::TrailingToken { .. } => ParseErrorKind::TrailingToken,
            ParseError::NestingTooDeep { .. } => ParseErrorKind::NestingTooDeep,
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::Expected { location, .. }
            | ParseError::NameMismatch { location, .. }
            | ParseError::TrailingToken { location, .. }
            | ParseError::NestingTooDeep { location, .. } => *location,
        }
    }

    /// Index of the token the error points at.
    pub fn index(&self) -> usize {
        match self {
            ParseError::Expected { index, .. }
            | ParseError::NameMismatch { index, .. }
            | ParseError::TrailingToken { index, .. }
            | ParseError::NestingTooDeep { index, .. } => *index,
        }
    }
}

/// Recursive descent parser for Oberon-07
pub struct Parser<'t> {
    pub(crate) tokens: &'t [Token],
    pub(crate) position: usize,
    tracer: &'t dyn Trace,
    depth: usize,
    max_depth: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            position: 0,
            tracer: &NoTrace,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.max_depth = options.max_depth;
        self
    }

    pub fn with_tracer(mut self, tracer: &'t dyn Trace) -> Self {
        self.tracer = tracer;
        self
    }

    /// Current cursor (index of the next unconsumed token).
    pub fn position(&self) -> usize {
        self.position
    }

    /// Parse one compilation unit. Every token must be consumed.
    pub fn parse_program(&mut self) -> Result<ParseNode, ParseError> {
        let module = self
            .parse_module()?
            .ok_or_else(|| self.expected("'MODULE'"))?;

        if let Some(token) = self.peek() {
            return Err(ParseError::TrailingToken {
                text: token.text.clone(),
                location: token.location,
                index: self.position,
            });
        }

        Ok(module)
    }

    // ===== Checkpointing =====

    /// Run a production body under a checkpoint.
    ///
    /// The body receives an empty node labeled `label` to fill. Unless it
    /// returns `Ok(true)` the node is dropped and the cursor is put back.
    pub(crate) fn production<F>(&mut self, label: &'static str, body: F) -> Production
    where
        F: FnOnce(&mut Self, &mut ParseNode) -> Matched,
    {
        if self.depth >= self.max_depth {
            return Err(ParseError::NestingTooDeep {
                limit: self.max_depth,
                location: self.current_location(),
                index: self.position,
            });
        }

        let checkpoint = self.position;
        self.trace(TracePhase::Attempt, label);

        self.depth += 1;
        let mut node = ParseNode::production(label);
        let outcome = body(self, &mut node);
        self.depth -= 1;

        match outcome {
            Ok(true) => {
                self.trace(TracePhase::Matched, label);
                Ok(Some(node))
            }
            Ok(false) => {
                self.position = checkpoint;
                self.trace(TracePhase::NoMatch, label);
                Ok(None)
            }
            Err(err) => {
                self.position = checkpoint;
                self.trace(TracePhase::Failed, label);
                Err(err)
            }
        }
    }

    /// Try alternatives in order; the first match wins.
    pub(crate) fn first_of(&mut self, alternatives: &[fn(&mut Self) -> Production]) -> Production {
        for alternative in alternatives {
            if let Some(node) = alternative(self)? {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    /// Run a production that must match at this point.
    pub(crate) fn require(
        &mut self,
        what: &str,
        production: fn(&mut Self) -> Production,
    ) -> Result<ParseNode, ParseError> {
        match production(self)? {
            Some(node) => Ok(node),
            None => Err(self.expected(what)),
        }
    }

    // ===== Terminal primitives =====

    pub(crate) fn match_reserved_word(&mut self, word: &str) -> Option<ParseNode> {
        self.match_token(word, |t| t.kind == TokenKind::ReservedWord && t.text == word)
    }

    pub(crate) fn match_operator(&mut self, op: &str) -> Option<ParseNode> {
        self.match_token(op, |t| {
            t.kind == TokenKind::OperatorOrDelimiter && t.text == op
        })
    }

    pub(crate) fn match_kind(&mut self, kind: TokenKind) -> Option<ParseNode> {
        self.match_token(kind.name(), |t| t.kind == kind)
    }

    /// A grammar `ident`: plain or predefined identifier.
    pub(crate) fn match_ident(&mut self) -> Option<ParseNode> {
        self.match_token("ident", is_ident)
    }

    fn match_token(&mut self, rule: &str, accept: impl Fn(&Token) -> bool) -> Option<ParseNode> {
        self.trace(TracePhase::Attempt, rule);
        match self.peek() {
            Some(token) if accept(token) => {
                let node = ParseNode::terminal(token);
                self.trace(TracePhase::Matched, rule);
                self.position += 1;
                Some(node)
            }
            _ => {
                self.trace(TracePhase::NoMatch, rule);
                None
            }
        }
    }

    // ===== Committed terminals =====

    pub(crate) fn expect_reserved_word(&mut self, word: &str) -> Result<ParseNode, ParseError> {
        self.match_reserved_word(word)
            .ok_or_else(|| self.expected(&format!("'{word}'")))
    }

    pub(crate) fn expect_operator(&mut self, op: &str) -> Result<ParseNode, ParseError> {
        self.match_operator(op)
            .ok_or_else(|| self.expected(&format!("'{op}'")))
    }

    pub(crate) fn expect_ident(&mut self) -> Result<ParseNode, ParseError> {
        self.match_ident().ok_or_else(|| self.expected("ident"))
    }

    /// Match the identifier closing a `construct` opened as `opening`.
    pub(crate) fn expect_closing_name(
        &mut self,
        construct: &str,
        opening: &str,
    ) -> Result<ParseNode, ParseError> {
        let location = self.current_location();
        let index = self.position;
        let closing = self.expect_ident()?;

        if closing.label() != opening {
            return Err(ParseError::NameMismatch {
                construct: construct.to_string(),
                opening: opening.to_string(),
                closing: closing.label().to_string(),
                location,
                index,
            });
        }
        Ok(closing)
    }

    // ===== Helper methods =====

    pub(crate) fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.position)
    }

    /// Location of the current token, or of the last token at end of stream.
    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek()
            .or_else(|| self.tokens.last())
            .map_or(SourceLocation::new(1, 1), |t| t.location)
    }

    pub(crate) fn expected(&self, what: &str) -> ParseError {
        ParseError::Expected {
            expected: what.to_string(),
            found: self.peek().map(|t| t.text.clone()),
            location: self.current_location(),
            index: self.position,
        }
    }

    fn trace(&self, phase: TracePhase, rule: &str) {
        self.tracer.event(&TraceEvent {
            phase,
            rule,
            position: self.position,
            token: self.peek(),
        });
    }
}

fn is_ident(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Identifier | TokenKind::Predefined)
}

/// Parse a token stream into a module tree.
pub fn parse(tokens: &[Token]) -> Result<ParseNode, ParseError> {
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::scan;
    use std::cell::RefCell;

    fn tokens(source: &str) -> Vec<Token> {
        scan(source.as_bytes()).into_result().unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<(TracePhase, String)>>,
    }

    impl Trace for Recorder {
        fn event(&self, event: &TraceEvent<'_>) {
            self.events
                .borrow_mut()
                .push((event.phase, event.rule.to_string()));
        }
    }

    #[test]
    fn test_minimal_module() {
        let tokens = tokens("MODULE M; END M.");
        let tree = parse(&tokens).unwrap();

        assert_eq!(tree.label(), "module");
        let labels: Vec<&str> = tree.children().iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            vec!["MODULE", "M", ";", "declarationSequence", "END", "M", "."]
        );
        assert!(tree.children()[3].children().is_empty());
    }

    #[test]
    fn test_name_mismatch() {
        let tokens = tokens("MODULE M; END N.");
        let err = parse(&tokens).unwrap_err();

        assert_eq!(err.kind(), ParseErrorKind::NameMismatch);
        assert_eq!(err.index(), 4);
        assert_eq!(err.location(), SourceLocation::new(1, 15));
        assert_eq!(
            err.to_string(),
            "parse error at line 1, column 15: module 'M' is closed with 'N'"
        );
    }

    #[test]
    fn test_trailing_token() {
        let tokens = tokens("MODULE M; END M. garbage");
        let err = parse(&tokens).unwrap_err();

        match err {
            ParseError::TrailingToken {
                text,
                location,
                index,
            } => {
                assert_eq!(text, "garbage");
                assert_eq!(location, SourceLocation::new(1, 18));
                assert_eq!(index, 6);
            }
            other => panic!("Expected trailing token error, got {other:?}"),
        }
    }

    #[test]
    fn test_expected_message() {
        let tokens = tokens("MODULE M END M.");
        let err = parse(&tokens).unwrap_err();
        assert_eq!(
            err.to_string(),
            "parse error at line 1, column 10: expected ';', found 'END'"
        );

        let tokens = self::tokens("MODULE M;");
        let err = parse(&tokens).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Expected);
        assert!(err.to_string().ends_with("expected 'END', but reached end of stream"));
        assert_eq!(err.index(), 3);
    }

    #[test]
    fn test_not_a_module() {
        let tokens = tokens("x := 1");
        let err = parse(&tokens).unwrap_err();
        assert_eq!(err.index(), 0);
        assert!(err.to_string().contains("expected 'MODULE'"));

        let err = parse(&[]).unwrap_err();
        assert_eq!(err.location(), SourceLocation::new(1, 1));
    }

    #[test]
    fn test_no_match_restores_cursor() {
        let tokens = tokens("x y");
        let mut parser = Parser::new(&tokens);

        // an assignment needs ":=" after its designator
        assert!(parser.parse_assignment().unwrap().is_none());
        assert_eq!(parser.position(), 0);

        assert!(parser.parse_if_statement().unwrap().is_none());
        assert_eq!(parser.position(), 0);
    }

    #[test]
    fn test_failure_restores_cursor() {
        let tokens = tokens("IF x THEN");
        let mut parser = Parser::new(&tokens);

        assert!(parser.parse_if_statement().is_err());
        assert_eq!(parser.position(), 0);
    }

    #[test]
    fn test_nesting_guard() {
        let source = format!("MODULE M; BEGIN x := {}1{} END M.", "(".repeat(40), ")".repeat(40));
        let tokens = tokens(&source);

        let err = Parser::new(&tokens)
            .with_options(ParserOptions { max_depth: 32 })
            .parse_program()
            .unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::NestingTooDeep);

        assert!(parse(&tokens).is_ok());
    }

    #[test]
    fn test_tracer_sees_productions() {
        let tokens = tokens("MODULE M; END M.");
        let recorder = Recorder::default();
        Parser::new(&tokens)
            .with_tracer(&recorder)
            .parse_program()
            .unwrap();

        let events = recorder.events.borrow();
        assert_eq!(events[0], (TracePhase::Attempt, "module".to_string()));
        assert!(events.contains(&(TracePhase::Matched, "declarationSequence".to_string())));
        assert!(events.contains(&(TracePhase::NoMatch, "importList".to_string())));
        assert_eq!(
            events.last(),
            Some(&(TracePhase::Matched, "module".to_string()))
        );
    }
}
