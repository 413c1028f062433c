//! Expression parsing implementation
//!
//! Precedence is carried by the grammar layering itself: a relation joins
//! two simple expressions, additive operators join terms, multiplicative
//! operators join factors. `1 + 2 * 3` therefore puts `2 * 3` inside a
//! single `term`.
//!
//! # Grammar
//!
//! ```text
//! expression       ::= simpleExpression [relation simpleExpression]
//! relation         ::= "=" | "#" | "<" | "<=" | ">" | ">=" | IN | IS
//! simpleExpression ::= ["+" | "-"] term {addOperator term}
//! addOperator      ::= "+" | "-" | OR
//! term             ::= factor {mulOperator factor}
//! mulOperator      ::= "*" | "/" | DIV | MOD | "&"
//! factor           ::= number | string | NIL | TRUE | FALSE | set
//!                    | designator [actualParameters]
//!                    | "(" expression ")" | "~" factor
//! designator       ::= qualident {selector}
//! selector         ::= "." ident | "[" expList "]" | "^" | "(" qualident ")"
//! qualident        ::= [ident "."] ident
//! expList          ::= expression {"," expression}
//! actualParameters ::= "(" [expList] ")"
//! set              ::= "{" [element {"," element}] "}"
//! element          ::= expression [".." expression]
//! ```
//!
//! `P(x)` is ambiguous without symbol information: the designator claims
//! `(x)` as a type guard before `actualParameters` is tried. `P(1)` and
//! `P(x, y)` are calls.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::lexer::TokenKind;
use crate::parser::parse::{Parser, Production};

/// An operator spelled either with a delimiter or a reserved word.
#[derive(Clone, Copy)]
enum Op {
    Symbol(&'static str),
    Word(&'static str),
}

const RELATIONS: &[Op] = &[
    Op::Symbol("="),
    Op::Symbol("#"),
    Op::Symbol("<"),
    Op::Symbol("<="),
    Op::Symbol(">"),
    Op::Symbol(">="),
    Op::Word("IN"),
    Op::Word("IS"),
];

const ADD_OPERATORS: &[Op] = &[Op::Symbol("+"), Op::Symbol("-"), Op::Word("OR")];

const MUL_OPERATORS: &[Op] = &[
    Op::Symbol("*"),
    Op::Symbol("/"),
    Op::Word("DIV"),
    Op::Word("MOD"),
    Op::Symbol("&"),
];

impl<'t> Parser<'t> {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Production {
        self.production("expression", |p, node| {
            let Some(left) = p.parse_simple_expression()? else {
                return Ok(false);
            };
            node.push(left);

            if let Some(relation) = p.parse_relation()? {
                node.push(relation);
                node.push(p.require("expression", Self::parse_simple_expression)?);
            }
            Ok(true)
        })
    }

    pub(crate) fn parse_relation(&mut self) -> Production {
        self.operator_production("relation", RELATIONS)
    }

    pub(crate) fn parse_add_operator(&mut self) -> Production {
        self.operator_production("addOperator", ADD_OPERATORS)
    }

    pub(crate) fn parse_mul_operator(&mut self) -> Production {
        self.operator_production("mulOperator", MUL_OPERATORS)
    }

    fn operator_production(&mut self, label: &'static str, table: &'static [Op]) -> Production {
        self.production(label, |p, node| {
            let matched = table.iter().find_map(|op| match *op {
                Op::Symbol(symbol) => p.match_operator(symbol),
                Op::Word(word) => p.match_reserved_word(word),
            });
            match matched {
                Some(terminal) => {
                    node.push(terminal);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    pub(crate) fn parse_simple_expression(&mut self) -> Production {
        self.production("simpleExpression", |p, node| {
            let sign = p.match_operator("+").or_else(|| p.match_operator("-"));
            match sign {
                Some(sign) => {
                    node.push(sign);
                    node.push(p.require("term", Self::parse_term)?);
                }
                None => {
                    let Some(first) = p.parse_term()? else {
                        return Ok(false);
                    };
                    node.push(first);
                }
            }

            while let Some(op) = p.parse_add_operator()? {
                node.push(op);
                node.push(p.require("term", Self::parse_term)?);
            }
            Ok(true)
        })
    }

    pub(crate) fn parse_term(&mut self) -> Production {
        self.production("term", |p, node| {
            let Some(first) = p.parse_factor()? else {
                return Ok(false);
            };
            node.push(first);

            while let Some(op) = p.parse_mul_operator()? {
                node.push(op);
                node.push(p.require("factor", Self::parse_factor)?);
            }
            Ok(true)
        })
    }

    pub(crate) fn parse_factor(&mut self) -> Production {
        self.production("factor", |p, node| {
            for kind in [TokenKind::Integer, TokenKind::Real, TokenKind::String] {
                if let Some(literal) = p.match_kind(kind) {
                    node.push(literal);
                    return Ok(true);
                }
            }

            for word in ["NIL", "TRUE", "FALSE"] {
                if let Some(constant) = p.match_reserved_word(word) {
                    node.push(constant);
                    return Ok(true);
                }
            }

            if let Some(set) = p.parse_set()? {
                node.push(set);
                return Ok(true);
            }

            if let Some(designator) = p.parse_designator()? {
                node.push(designator);
                if let Some(args) = p.parse_actual_parameters()? {
                    node.push(args);
                }
                return Ok(true);
            }

            if let Some(open) = p.match_operator("(") {
                node.push(open);
                node.push(p.require("expression", Self::parse_expression)?);
                node.push(p.expect_operator(")")?);
                return Ok(true);
            }

            if let Some(not) = p.match_operator("~") {
                node.push(not);
                node.push(p.require("factor", Self::parse_factor)?);
                return Ok(true);
            }

            Ok(false)
        })
    }

    pub(crate) fn parse_designator(&mut self) -> Production {
        self.production("designator", |p, node| {
            let Some(name) = p.parse_qualident()? else {
                return Ok(false);
            };
            node.push(name);

            while let Some(selector) = p.parse_selector()? {
                node.push(selector);
            }
            Ok(true)
        })
    }

    pub(crate) fn parse_selector(&mut self) -> Production {
        let alternatives: [fn(&mut Self) -> Production; 4] = [
            Self::parse_field_selector,
            Self::parse_index_selector,
            Self::parse_dereference,
            Self::parse_type_guard,
        ];
        self.first_of(&alternatives)
    }

    /// `"." ident`; gives way if no identifier follows the dot.
    fn parse_field_selector(&mut self) -> Production {
        self.production("selector", |p, node| {
            let Some(dot) = p.match_operator(".") else {
                return Ok(false);
            };
            node.push(dot);

            let Some(field) = p.match_ident() else {
                return Ok(false);
            };
            node.push(field);
            Ok(true)
        })
    }

    fn parse_index_selector(&mut self) -> Production {
        self.production("selector", |p, node| {
            let Some(open) = p.match_operator("[") else {
                return Ok(false);
            };
            node.push(open);
            node.push(p.require("expList", Self::parse_exp_list)?);
            node.push(p.expect_operator("]")?);
            Ok(true)
        })
    }

    fn parse_dereference(&mut self) -> Production {
        self.production("selector", |p, node| match p.match_operator("^") {
            Some(caret) => {
                node.push(caret);
                Ok(true)
            }
            None => Ok(false),
        })
    }

    /// `"(" qualident ")"`; gives way to actual parameters on any mismatch.
    fn parse_type_guard(&mut self) -> Production {
        self.production("selector", |p, node| {
            let Some(open) = p.match_operator("(") else {
                return Ok(false);
            };
            node.push(open);

            let Some(guard) = p.parse_qualident()? else {
                return Ok(false);
            };
            node.push(guard);

            let Some(close) = p.match_operator(")") else {
                return Ok(false);
            };
            node.push(close);
            Ok(true)
        })
    }

    pub(crate) fn parse_qualident(&mut self) -> Production {
        let alternatives: [fn(&mut Self) -> Production; 2] =
            [Self::parse_qualified_name, Self::parse_bare_name];
        self.first_of(&alternatives)
    }

    /// `Module.name`
    fn parse_qualified_name(&mut self) -> Production {
        self.production("qualident", |p, node| {
            let Some(module) = p.match_ident() else {
                return Ok(false);
            };
            node.push(module);

            let Some(dot) = p.match_operator(".") else {
                return Ok(false);
            };
            node.push(dot);

            let Some(name) = p.match_ident() else {
                return Ok(false);
            };
            node.push(name);
            Ok(true)
        })
    }

    fn parse_bare_name(&mut self) -> Production {
        self.production("qualident", |p, node| match p.match_ident() {
            Some(name) => {
                node.push(name);
                Ok(true)
            }
            None => Ok(false),
        })
    }

    pub(crate) fn parse_exp_list(&mut self) -> Production {
        self.production("expList", |p, node| {
            let Some(first) = p.parse_expression()? else {
                return Ok(false);
            };
            node.push(first);

            while let Some(comma) = p.match_operator(",") {
                node.push(comma);
                node.push(p.require("expression", Self::parse_expression)?);
            }
            Ok(true)
        })
    }

    pub(crate) fn parse_actual_parameters(&mut self) -> Production {
        self.production("actualParameters", |p, node| {
            let Some(open) = p.match_operator("(") else {
                return Ok(false);
            };
            node.push(open);

            if let Some(args) = p.parse_exp_list()? {
                node.push(args);
            }
            node.push(p.expect_operator(")")?);
            Ok(true)
        })
    }

    pub(crate) fn parse_set(&mut self) -> Production {
        self.production("set", |p, node| {
            let Some(open) = p.match_operator("{") else {
                return Ok(false);
            };
            node.push(open);

            if let Some(first) = p.parse_element()? {
                node.push(first);
                while let Some(comma) = p.match_operator(",") {
                    node.push(comma);
                    node.push(p.require("element", Self::parse_element)?);
                }
            }

            node.push(p.expect_operator("}")?);
            Ok(true)
        })
    }

    pub(crate) fn parse_element(&mut self) -> Production {
        self.production("element", |p, node| {
            let Some(low) = p.parse_expression()? else {
                return Ok(false);
            };
            node.push(low);

            if let Some(range) = p.match_operator("..") {
                node.push(range);
                node.push(p.require("expression", Self::parse_expression)?);
            }
            Ok(true)
        })
    }
}
