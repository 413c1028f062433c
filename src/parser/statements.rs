//! Statement parsing implementation
//!
//! This module handles parsing of all Oberon-07 statement types:
//!
//! - Assignments and procedure calls
//! - Control flow: `IF`, `CASE`, `WHILE`, `REPEAT`, `FOR`
//! - Statement sequences, including empty statements
//!
//! # Grammar
//!
//! ```text
//! statementSequence ::= statement {";" statement}
//! statement         ::= [assignment | procedureCall | ifStatement | caseStatement
//!                       | whileStatement | repeatStatement | forStatement]
//! assignment        ::= designator ":=" expression
//! procedureCall     ::= designator [actualParameters]
//! ifStatement       ::= IF expression THEN statementSequence
//!                       {ELSIF expression THEN statementSequence}
//!                       [ELSE statementSequence] END
//! caseStatement     ::= CASE expression OF case {"|" case} END
//! case              ::= [caseLabelList ":" statementSequence]
//! caseLabelList     ::= labelRange {"," labelRange}
//! labelRange        ::= label [".." label]
//! label             ::= integer | string | qualident
//! whileStatement    ::= WHILE expression DO statementSequence
//!                       {ELSIF expression DO statementSequence} END
//! repeatStatement   ::= REPEAT statementSequence UNTIL expression
//! forStatement      ::= FOR ident ":=" expression TO expression
//!                       [BY expression] DO statementSequence END
//! ```
//!
//! Empty statements produce no node, so `BEGIN END` and a `;` before `END`
//! are both accepted.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::ParseNode;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser, Production};

impl<'t> Parser<'t> {
    /// Always matches, possibly with no children.
    pub(crate) fn parse_statement_sequence(&mut self) -> Production {
        self.production("statementSequence", |p, node| {
            loop {
                if let Some(statement) = p.parse_statement()? {
                    node.push(statement);
                }
                match p.match_operator(";") {
                    Some(semicolon) => node.push(semicolon),
                    None => break,
                }
            }
            Ok(true)
        })
    }

    /// Parse a statement; alternatives are tried in order.
    pub(crate) fn parse_statement(&mut self) -> Production {
        self.production("statement", |p, node| {
            let alternatives: [fn(&mut Self) -> Production; 7] = [
                Self::parse_assignment,
                Self::parse_procedure_call,
                Self::parse_if_statement,
                Self::parse_case_statement,
                Self::parse_while_statement,
                Self::parse_repeat_statement,
                Self::parse_for_statement,
            ];
            match p.first_of(&alternatives)? {
                Some(inner) => {
                    node.push(inner);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    /// No match unless the designator is followed by `:=`.
    pub(crate) fn parse_assignment(&mut self) -> Production {
        self.production("assignment", |p, node| {
            let Some(target) = p.parse_designator()? else {
                return Ok(false);
            };
            node.push(target);

            let Some(assign) = p.match_operator(":=") else {
                return Ok(false);
            };
            node.push(assign);
            node.push(p.require("expression", Self::parse_expression)?);
            Ok(true)
        })
    }

    pub(crate) fn parse_procedure_call(&mut self) -> Production {
        self.production("procedureCall", |p, node| {
            let Some(callee) = p.parse_designator()? else {
                return Ok(false);
            };
            node.push(callee);

            if let Some(args) = p.parse_actual_parameters()? {
                node.push(args);
            }
            Ok(true)
        })
    }

    pub(crate) fn parse_if_statement(&mut self) -> Production {
        self.production("ifStatement", |p, node| {
            let Some(keyword) = p.match_reserved_word("IF") else {
                return Ok(false);
            };
            node.push(keyword);
            p.push_guarded_sequence(node, "THEN")?;

            while let Some(elsif) = p.match_reserved_word("ELSIF") {
                node.push(elsif);
                p.push_guarded_sequence(node, "THEN")?;
            }

            if let Some(otherwise) = p.match_reserved_word("ELSE") {
                node.push(otherwise);
                node.push(p.require("statementSequence", Self::parse_statement_sequence)?);
            }

            node.push(p.expect_reserved_word("END")?);
            Ok(true)
        })
    }

    /// `expression keyword statementSequence`, the arm shape of IF and WHILE.
    fn push_guarded_sequence(
        &mut self,
        node: &mut ParseNode,
        keyword: &str,
    ) -> Result<(), ParseError> {
        node.push(self.require("expression", Self::parse_expression)?);
        node.push(self.expect_reserved_word(keyword)?);
        node.push(self.require("statementSequence", Self::parse_statement_sequence)?);
        Ok(())
    }

    pub(crate) fn parse_case_statement(&mut self) -> Production {
        self.production("caseStatement", |p, node| {
            let Some(keyword) = p.match_reserved_word("CASE") else {
                return Ok(false);
            };
            node.push(keyword);
            node.push(p.require("expression", Self::parse_expression)?);
            node.push(p.expect_reserved_word("OF")?);
            node.push(p.require("case", Self::parse_case)?);

            while let Some(bar) = p.match_operator("|") {
                node.push(bar);
                node.push(p.require("case", Self::parse_case)?);
            }

            node.push(p.expect_reserved_word("END")?);
            Ok(true)
        })
    }

    /// Always matches; an empty case has no children.
    pub(crate) fn parse_case(&mut self) -> Production {
        self.production("case", |p, node| {
            if let Some(labels) = p.parse_case_label_list()? {
                node.push(labels);
                node.push(p.expect_operator(":")?);
                node.push(p.require("statementSequence", Self::parse_statement_sequence)?);
            }
            Ok(true)
        })
    }

    pub(crate) fn parse_case_label_list(&mut self) -> Production {
        self.production("caseLabelList", |p, node| {
            let Some(first) = p.parse_label_range()? else {
                return Ok(false);
            };
            node.push(first);

            while let Some(comma) = p.match_operator(",") {
                node.push(comma);
                node.push(p.require("labelRange", Self::parse_label_range)?);
            }
            Ok(true)
        })
    }

    pub(crate) fn parse_label_range(&mut self) -> Production {
        self.production("labelRange", |p, node| {
            let Some(low) = p.parse_label()? else {
                return Ok(false);
            };
            node.push(low);

            if let Some(range) = p.match_operator("..") {
                node.push(range);
                node.push(p.require("label", Self::parse_label)?);
            }
            Ok(true)
        })
    }

    pub(crate) fn parse_label(&mut self) -> Production {
        self.production("label", |p, node| {
            let constant = p
                .match_kind(TokenKind::Integer)
                .or_else(|| p.match_kind(TokenKind::String));
            let label = match constant {
                Some(terminal) => terminal,
                None => match p.parse_qualident()? {
                    Some(name) => name,
                    None => return Ok(false),
                },
            };
            node.push(label);
            Ok(true)
        })
    }

    pub(crate) fn parse_while_statement(&mut self) -> Production {
        self.production("whileStatement", |p, node| {
            let Some(keyword) = p.match_reserved_word("WHILE") else {
                return Ok(false);
            };
            node.push(keyword);
            p.push_guarded_sequence(node, "DO")?;

            while let Some(elsif) = p.match_reserved_word("ELSIF") {
                node.push(elsif);
                p.push_guarded_sequence(node, "DO")?;
            }

            node.push(p.expect_reserved_word("END")?);
            Ok(true)
        })
    }

    pub(crate) fn parse_repeat_statement(&mut self) -> Production {
        self.production("repeatStatement", |p, node| {
            let Some(keyword) = p.match_reserved_word("REPEAT") else {
                return Ok(false);
            };
            node.push(keyword);
            node.push(p.require("statementSequence", Self::parse_statement_sequence)?);
            node.push(p.expect_reserved_word("UNTIL")?);
            node.push(p.require("expression", Self::parse_expression)?);
            Ok(true)
        })
    }

    pub(crate) fn parse_for_statement(&mut self) -> Production {
        self.production("forStatement", |p, node| {
            let Some(keyword) = p.match_reserved_word("FOR") else {
                return Ok(false);
            };
            node.push(keyword);
            node.push(p.expect_ident()?);
            node.push(p.expect_operator(":=")?);
            node.push(p.require("expression", Self::parse_expression)?);
            node.push(p.expect_reserved_word("TO")?);
            node.push(p.require("expression", Self::parse_expression)?);

            if let Some(by) = p.match_reserved_word("BY") {
                node.push(by);
                node.push(p.require("expression", Self::parse_expression)?);
            }

            node.push(p.expect_reserved_word("DO")?);
            node.push(p.require("statementSequence", Self::parse_statement_sequence)?);
            node.push(p.expect_reserved_word("END")?);
            Ok(true)
        })
    }
}
