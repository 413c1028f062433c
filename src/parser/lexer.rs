//! Scanner (tokenizer) for Oberon-07 source
//!
//! Converts a raw byte buffer into a flat [`Token`] stream consumed by the
//! parser. Whitespace and `(* ... *)` comments are dropped; every other byte
//! ends up in exactly one token.
//!
//! Identifier- and number-shaped runs are accumulated first and classified
//! once the run ends, by trying an ordered list of shapes (reserved word,
//! predefined identifier, string, integer, real, identifier). Reserved words
//! are therefore recognized by reclassifying an identifier, not by a
//! character class of their own.
//!
//! Comments do not nest: the first `*)` closes the comment no matter how many
//! `(*` were seen inside it.

use super::ast::SourceLocation;
use super::trace::{NoTrace, Trace};
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Token classification.
///
/// `Comment` and `Keyword` exist for consumers that want a complete
/// vocabulary; the scanner never emits them (comments are discarded and every
/// keyword is reported as a [`TokenKind::ReservedWord`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Integer,
    Real,
    String,
    Comment,
    Keyword,
    Predefined,
    Identifier,
    OperatorOrDelimiter,
    ReservedWord,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Integer => "integer",
            TokenKind::Real => "real",
            TokenKind::String => "string",
            TokenKind::Comment => "comment",
            TokenKind::Keyword => "keyword",
            TokenKind::Predefined => "predefined identifier",
            TokenKind::Identifier => "identifier",
            TokenKind::OperatorOrDelimiter => "operator",
            TokenKind::ReservedWord => "reserved word",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified lexeme together with the position of its first byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind, location: SourceLocation) -> Self {
        Self {
            text: text.into(),
            kind,
            location,
        }
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn column(&self) -> usize {
        self.location.column
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.text)
    }
}

pub const RESERVED_WORDS: &[&str] = &[
    "ARRAY", "BEGIN", "BY", "CASE", "CONST", "DIV", "DO", "ELSE", "ELSIF", "END", "FALSE", "FOR",
    "IF", "IMPORT", "IN", "IS", "MOD", "MODULE", "NIL", "OF", "OR", "POINTER", "PROCEDURE",
    "RECORD", "REPEAT", "RETURN", "THEN", "TO", "TRUE", "TYPE", "UNTIL", "VAR", "WHILE",
];

pub const PREDEFINED_IDENTIFIERS: &[&str] = &[
    "ABS", "ASH", "BOOLEAN", "CAP", "CHAR", "CHR", "COPY", "DEC", "ENTIER", "EXCL", "FALSE",
    "HALT", "INC", "INCL", "INTEGER", "LEN", "LONG", "LONGINT", "LONGREAL", "MAX", "MIN", "NEW",
    "ODD", "ORD", "REAL", "SET", "SHORT", "SHORTINT", "SIZE", "TRUE",
];

/// Single-byte operators and delimiters.
const OPERATOR_BYTES: &[u8] = b"+-*/~&.,;|()[]{}^=#<>:";

/// Operators spelled with two bytes. A pair of operator bytes is only fused
/// into one token when it appears here.
pub const MULTI_CHAR_OPERATORS: &[&str] = &[":=", ">=", "<=", ".."];

struct Tables {
    reserved: FxHashSet<&'static str>,
    predefined: FxHashSet<&'static str>,
    multi_char: FxHashSet<&'static str>,
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(|| Tables {
        reserved: RESERVED_WORDS.iter().copied().collect(),
        predefined: PREDEFINED_IDENTIFIERS.iter().copied().collect(),
        multi_char: MULTI_CHAR_OPERATORS.iter().copied().collect(),
    })
}

pub fn is_reserved_word(lexeme: &str) -> bool {
    tables().reserved.contains(lexeme)
}

pub fn is_predefined_identifier(lexeme: &str) -> bool {
    tables().predefined.contains(lexeme)
}

pub fn is_operator(lexeme: &str) -> bool {
    match lexeme.as_bytes() {
        [byte] => is_operator_byte(*byte),
        _ => tables().multi_char.contains(lexeme),
    }
}

fn is_operator_byte(byte: u8) -> bool {
    OPERATOR_BYTES.contains(&byte)
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, 9..=13 | b' ')
}

fn is_hex_digit(byte: u8) -> bool {
    byte.is_ascii_digit() || (b'A'..=b'F').contains(&byte)
}

/// `"` {non-quote} `"`, or a character constant `digit {hexDigit} X`.
pub fn is_string_literal(lexeme: &str) -> bool {
    let bytes = lexeme.as_bytes();
    if bytes.len() < 2 {
        return false;
    }
    let inner = &bytes[1..bytes.len() - 1];
    if bytes[0] == b'"' {
        return bytes[bytes.len() - 1] == b'"' && !inner.contains(&b'"');
    }
    bytes[0].is_ascii_digit()
        && bytes[bytes.len() - 1] == b'X'
        && inner.iter().all(|&b| is_hex_digit(b))
}

/// `digit {digit}` or `digit {hexDigit} H`.
pub fn is_integer_literal(lexeme: &str) -> bool {
    let bytes = lexeme.as_bytes();
    match bytes {
        [] => false,
        [first, .., b'H'] => {
            first.is_ascii_digit() && bytes[1..bytes.len() - 1].iter().all(|&b| is_hex_digit(b))
        }
        _ => bytes.iter().all(u8::is_ascii_digit),
    }
}

/// `digit {digit} "." {digit} [("E" | "D") ["+" | "-"] digit {digit}]`.
pub fn is_real_literal(lexeme: &str) -> bool {
    let bytes = lexeme.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    if bytes.first().map_or(true, |b| !b.is_ascii_digit()) {
        return false;
    }
    let mut i = digits_from(0);
    if bytes.get(i) != Some(&b'.') {
        return false;
    }
    i = digits_from(i + 1);
    if i == bytes.len() {
        return true;
    }
    if !matches!(bytes[i], b'E' | b'D') {
        return false;
    }
    i += 1;
    if matches!(bytes.get(i), Some(b'+' | b'-')) {
        i += 1;
    }
    let exponent_start = i;
    let end = digits_from(i);
    end > exponent_start && end == bytes.len()
}

/// `letter {letter | digit}`.
pub fn is_identifier(lexeme: &str) -> bool {
    let bytes = lexeme.as_bytes();
    match bytes.first() {
        Some(first) if first.is_ascii_alphabetic() => {
            bytes[1..].iter().all(u8::is_ascii_alphanumeric)
        }
        _ => false,
    }
}

type Classifier = fn(&str) -> bool;

/// Lexeme shapes in priority order; the first match decides the kind.
const CLASSIFIERS: &[(Classifier, TokenKind)] = &[
    (is_reserved_word, TokenKind::ReservedWord),
    (is_predefined_identifier, TokenKind::Predefined),
    (is_string_literal, TokenKind::String),
    (is_integer_literal, TokenKind::Integer),
    (is_real_literal, TokenKind::Real),
    (is_identifier, TokenKind::Identifier),
];

/// Classify an accumulated lexeme, or `None` if it fits no shape.
pub fn classify(lexeme: &str) -> Option<TokenKind> {
    CLASSIFIERS
        .iter()
        .find(|(matches, _)| matches(lexeme))
        .map(|&(_, kind)| kind)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    UnrecognizedToken,
    UnterminatedComment,
    UnterminatedString,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LexErrorKind::UnrecognizedToken => "unrecognized token",
            LexErrorKind::UnterminatedComment => "unclosed comment",
            LexErrorKind::UnterminatedString => "unfinished string",
        };
        f.write_str(text)
    }
}

/// Lexer error type
///
/// Every error is reported where scanning failed: end of input for an
/// unterminated comment or string, the first byte of an unrecognized token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lexer error at {location}: {kind} {text:?}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub location: SourceLocation,
    /// Offending lexeme, or the opening text of an unterminated construct.
    pub text: String,
    /// Opening delimiter of an unterminated comment or string.
    pub opened_at: Option<SourceLocation>,
}

/// Everything a scan produced. On failure `tokens` holds the prefix that was
/// scanned before the error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutput {
    pub tokens: Vec<Token>,
    pub error: Option<LexError>,
}

impl ScanOutput {
    pub fn into_result(self) -> Result<Vec<Token>, LexError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.tokens),
        }
    }
}

/// Scan `source` without tracing.
pub fn scan(source: &[u8]) -> ScanOutput {
    Scanner::new(source).run()
}

/// Accumulation mode of the scanner. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InComment { start: SourceLocation },
    InIdentifier { start: SourceLocation },
    InNumber { start: SourceLocation },
    InString { start: SourceLocation },
}

/// Scanner for Oberon-07 source
pub struct Scanner<'a> {
    input: &'a [u8],
    position: usize,
    line: usize,
    column: usize,
    state: ScanState,
    lexeme: Vec<u8>,
    tokens: Vec<Token>,
    tracer: &'a dyn Trace,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            position: 0,
            line: 1,
            column: 1,
            state: ScanState::Normal,
            lexeme: Vec::new(),
            tokens: Vec::new(),
            tracer: &NoTrace,
        }
    }

    pub fn with_tracer(mut self, tracer: &'a dyn Trace) -> Self {
        self.tracer = tracer;
        self
    }

    /// Scan the whole input.
    pub fn run(mut self) -> ScanOutput {
        let error = self.scan_all().err();
        ScanOutput {
            tokens: self.tokens,
            error,
        }
    }

    fn scan_all(&mut self) -> Result<(), LexError> {
        while let Some(byte) = self.peek() {
            match self.state {
                ScanState::Normal => self.scan_normal(byte)?,
                ScanState::InComment { .. } => {
                    if byte == b'*' && self.peek_ahead(1) == Some(b')') {
                        self.advance();
                        self.advance();
                        self.state = ScanState::Normal;
                    } else {
                        self.advance();
                    }
                }
                ScanState::InString { start } => {
                    self.lexeme.push(byte);
                    self.advance();
                    if byte == b'"' {
                        self.finish_lexeme(start)?;
                    }
                }
                ScanState::InIdentifier { start } | ScanState::InNumber { start } => {
                    if self.continues_lexeme(byte) {
                        self.lexeme.push(byte);
                        self.advance();
                    } else {
                        // The boundary byte is scanned again in Normal state.
                        self.finish_lexeme(start)?;
                    }
                }
            }
        }

        match self.state {
            ScanState::Normal => Ok(()),
            ScanState::InComment { start } => Err(LexError {
                kind: LexErrorKind::UnterminatedComment,
                location: self.current_location(),
                text: "(*".to_string(),
                opened_at: Some(start),
            }),
            ScanState::InString { start } => Err(LexError {
                kind: LexErrorKind::UnterminatedString,
                location: self.current_location(),
                text: String::from_utf8_lossy(&self.lexeme).into_owned(),
                opened_at: Some(start),
            }),
            ScanState::InIdentifier { start } | ScanState::InNumber { start } => {
                self.finish_lexeme(start)
            }
        }
    }

    fn scan_normal(&mut self, byte: u8) -> Result<(), LexError> {
        let start = self.current_location();

        if byte == b'(' && self.peek_ahead(1) == Some(b'*') {
            self.advance();
            self.advance();
            self.state = ScanState::InComment { start };
        } else if is_whitespace(byte) {
            self.advance();
        } else if is_operator_byte(byte) {
            self.scan_operator(byte, start);
        } else {
            self.state = match byte {
                b'"' => ScanState::InString { start },
                b'0'..=b'9' => ScanState::InNumber { start },
                _ => ScanState::InIdentifier { start },
            };
            self.lexeme.push(byte);
            self.advance();
        }
        Ok(())
    }

    fn scan_operator(&mut self, first: u8, start: SourceLocation) {
        if let Some(second) = self.peek_ahead(1) {
            let pair = [first, second];
            if let Ok(text) = std::str::from_utf8(&pair) {
                if is_operator(text) {
                    let token = Token::new(text, TokenKind::OperatorOrDelimiter, start);
                    self.advance();
                    self.advance();
                    self.emit(token);
                    return;
                }
            }
        }

        let token = Token::new(
            char::from(first).to_string(),
            TokenKind::OperatorOrDelimiter,
            start,
        );
        self.advance();
        self.emit(token);
    }

    /// Whether `byte` extends the identifier or number being accumulated.
    fn continues_lexeme(&self, byte: u8) -> bool {
        let in_number = matches!(self.state, ScanState::InNumber { .. });
        let has_point = self.lexeme.contains(&b'.');

        match byte {
            b'.' => in_number && !has_point && self.peek_ahead(1) != Some(b'.'),
            b'+' | b'-' => {
                in_number && has_point && matches!(self.lexeme.last(), Some(b'E' | b'D'))
            }
            b'"' => false,
            _ => !is_whitespace(byte) && !is_operator_byte(byte),
        }
    }

    fn finish_lexeme(&mut self, start: SourceLocation) -> Result<(), LexError> {
        let text = String::from_utf8_lossy(&self.lexeme).into_owned();
        self.lexeme.clear();
        self.state = ScanState::Normal;

        match classify(&text) {
            Some(kind) => {
                self.emit(Token::new(text, kind, start));
                Ok(())
            }
            None => Err(LexError {
                kind: LexErrorKind::UnrecognizedToken,
                location: start,
                text,
                opened_at: None,
            }),
        }
    }

    fn emit(&mut self, token: Token) {
        self.tracer.token(&token);
        self.tokens.push(token);
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<u8> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.position += 1;

        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(byte)
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_texts(source: &str) -> Vec<(TokenKind, String)> {
        scan(source.as_bytes())
            .into_result()
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = scan(b"MODULE M; END M.").into_result().unwrap();

        assert_eq!(tokens.len(), 6);
        assert_eq!(tokens[0].kind, TokenKind::ReservedWord);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].text, ";");
        assert_eq!(tokens[3].text, "END");
        assert_eq!(tokens[4].text, "M");
        assert_eq!(tokens[5].kind, TokenKind::OperatorOrDelimiter);
    }

    #[test]
    fn test_range_is_not_a_real() {
        assert_eq!(
            kinds_and_texts("1..10"),
            vec![
                (TokenKind::Integer, "1".to_string()),
                (TokenKind::OperatorOrDelimiter, "..".to_string()),
                (TokenKind::Integer, "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_number_shapes() {
        assert_eq!(kinds_and_texts("3.14"), vec![(TokenKind::Real, "3.14".to_string())]);
        assert_eq!(kinds_and_texts("0FFH"), vec![(TokenKind::Integer, "0FFH".to_string())]);
        assert_eq!(
            kinds_and_texts("1.5E+3"),
            vec![(TokenKind::Real, "1.5E+3".to_string())]
        );
        assert_eq!(kinds_and_texts("41X"), vec![(TokenKind::String, "41X".to_string())]);
    }

    #[test]
    fn test_bad_hex_is_unrecognized() {
        let output = scan(b"x := 0GGH;");
        let err = output.error.unwrap();
        assert_eq!(err.kind, LexErrorKind::UnrecognizedToken);
        assert_eq!(err.text, "0GGH");
        assert_eq!(err.location, SourceLocation::new(1, 6));
        // prefix before the failure is kept
        assert_eq!(output.tokens.len(), 2);
    }

    #[test]
    fn test_operators() {
        let texts: Vec<String> = kinds_and_texts("a := b >= c <= d .. ;)")
            .into_iter()
            .map(|(_, text)| text)
            .collect();
        assert_eq!(texts, vec!["a", ":=", "b", ">=", "c", "<=", "d", "..", ";", ")"]);
    }

    #[test]
    fn test_unfused_operator_pair() {
        let texts: Vec<String> = kinds_and_texts("x:=-1")
            .into_iter()
            .map(|(_, text)| text)
            .collect();
        assert_eq!(texts, vec!["x", ":=", "-", "1"]);

        let texts: Vec<String> = kinds_and_texts("p^.next")
            .into_iter()
            .map(|(_, text)| text)
            .collect();
        assert_eq!(texts, vec!["p", "^", ".", "next"]);
    }

    #[test]
    fn test_reclassification() {
        assert_eq!(
            kinds_and_texts("WHILE INTEGER TRUE count"),
            vec![
                (TokenKind::ReservedWord, "WHILE".to_string()),
                (TokenKind::Predefined, "INTEGER".to_string()),
                (TokenKind::ReservedWord, "TRUE".to_string()),
                (TokenKind::Identifier, "count".to_string()),
            ]
        );
    }

    #[test]
    fn test_comments() {
        let tokens = scan(b"x (* a comment\nspanning lines *) y").into_result().unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].text, "y");
        assert_eq!(tokens[1].location, SourceLocation::new(2, 19));
    }

    #[test]
    fn test_comments_do_not_nest() {
        // the inner "(*" is ignored, the first "*)" closes the comment
        let tokens = scan(b"(* outer (* inner *) x *)").into_result().unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["x", "*", ")"]);
    }

    #[test]
    fn test_string_literal() {
        let tokens = scan(br#"s := "hello (* world""#).into_result().unwrap();
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].text, "\"hello (* world\"");
        assert_eq!(tokens[2].location, SourceLocation::new(1, 6));
    }

    #[test]
    fn test_unterminated_comment() {
        let err = scan(b"x\n  (* never closed").error.unwrap();
        assert_eq!(err.kind, LexErrorKind::UnterminatedComment);
        assert_eq!(err.location, SourceLocation::new(2, 18));
        assert_eq!(err.opened_at, Some(SourceLocation::new(2, 3)));
    }

    #[test]
    fn test_unterminated_string() {
        let output = scan(b"a \"open");
        let err = output.error.unwrap();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.location, SourceLocation::new(1, 8));
        assert_eq!(err.opened_at, Some(SourceLocation::new(1, 3)));
        assert_eq!(output.tokens.len(), 1);
    }

    #[test]
    fn test_unterminated_string_across_lines() {
        let err = scan(b"a := \"open\nmore").error.unwrap();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.location, SourceLocation::new(2, 5));
        assert_eq!(err.opened_at, Some(SourceLocation::new(1, 6)));
        assert_eq!(
            err.to_string(),
            "lexer error at line 2, column 5: unfinished string \"\\\"open\\nmore\""
        );
    }

    #[test]
    fn test_trailing_lexeme_is_flushed() {
        let tokens = scan(b"END M").into_result().unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].text, "M");
    }

    #[test]
    fn test_operator_table() {
        for op in [":=", ">=", "<=", "..", ":", "+", "#", "^", "|", "~"] {
            assert!(is_operator(op), "{op} should be an operator");
        }
        for text in ["=>", "<>", "!=", "", "_", "a"] {
            assert!(!is_operator(text), "{text:?} should not be an operator");
        }
    }

    #[test]
    fn test_underscore_is_rejected() {
        let err = scan(b"my_var").error.unwrap();
        assert_eq!(err.kind, LexErrorKind::UnrecognizedToken);
        assert_eq!(err.text, "my_var");
    }

    #[test]
    fn test_positions_track_lines() {
        let tokens = scan(b"MODULE M;\n  VAR x: INTEGER;").into_result().unwrap();
        let var = &tokens[3];
        assert_eq!(var.text, "VAR");
        assert_eq!((var.line(), var.column()), (2, 3));
        let colon = &tokens[5];
        assert_eq!(colon.text, ":");
        assert_eq!(colon.location, SourceLocation::new(2, 8));
    }

    #[test]
    fn test_classify_order() {
        assert_eq!(classify("MODULE"), Some(TokenKind::ReservedWord));
        assert_eq!(classify("ABS"), Some(TokenKind::Predefined));
        assert_eq!(classify("\"a\""), Some(TokenKind::String));
        assert_eq!(classify("12"), Some(TokenKind::Integer));
        assert_eq!(classify("12.5D-2"), Some(TokenKind::Real));
        assert_eq!(classify("x1"), Some(TokenKind::Identifier));
        assert_eq!(classify("1x"), None);
        assert_eq!(classify("1.5E"), None);
    }
}
