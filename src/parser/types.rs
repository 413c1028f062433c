//! Type expression parsing
//!
//! # Grammar
//!
//! ```text
//! type              ::= qualident | structType
//! structType        ::= arrayType | recordType | pointerType | procedureType
//! arrayType         ::= ARRAY length {"," length} OF type
//! recordType        ::= RECORD ["(" qualident ")"] [fieldListSequence] END
//! fieldListSequence ::= fieldList {";" fieldList}
//! fieldList         ::= identList ":" type
//! pointerType       ::= POINTER TO type
//! procedureType     ::= PROCEDURE [formalParameters]
//! ```
//!
//! Lengths are plain expressions. A field list sequence may end with a
//! stray `;` before `END`.

use crate::parser::parse::{Parser, Production};

impl<'t> Parser<'t> {
    pub(crate) fn parse_type(&mut self) -> Production {
        self.production("type", |p, node| {
            let alternatives: [fn(&mut Self) -> Production; 2] =
                [Self::parse_qualident, Self::parse_struct_type];
            match p.first_of(&alternatives)? {
                Some(inner) => {
                    node.push(inner);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    pub(crate) fn parse_struct_type(&mut self) -> Production {
        self.production("structType", |p, node| {
            let alternatives: [fn(&mut Self) -> Production; 4] = [
                Self::parse_array_type,
                Self::parse_record_type,
                Self::parse_pointer_type,
                Self::parse_procedure_type,
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

    pub(crate) fn parse_array_type(&mut self) -> Production {
        self.production("arrayType", |p, node| {
            let Some(keyword) = p.match_reserved_word("ARRAY") else {
                return Ok(false);
            };
            node.push(keyword);
            node.push(p.require("expression", Self::parse_expression)?);

            while let Some(comma) = p.match_operator(",") {
                node.push(comma);
                node.push(p.require("expression", Self::parse_expression)?);
            }

            node.push(p.expect_reserved_word("OF")?);
            node.push(p.require("type", Self::parse_type)?);
            Ok(true)
        })
    }

    pub(crate) fn parse_record_type(&mut self) -> Production {
        self.production("recordType", |p, node| {
            let Some(keyword) = p.match_reserved_word("RECORD") else {
                return Ok(false);
            };
            node.push(keyword);

            if let Some(open) = p.match_operator("(") {
                node.push(open);
                node.push(p.require("qualident", Self::parse_qualident)?);
                node.push(p.expect_operator(")")?);
            }

            if let Some(fields) = p.parse_field_list_sequence()? {
                node.push(fields);
            }

            node.push(p.expect_reserved_word("END")?);
            Ok(true)
        })
    }

    pub(crate) fn parse_field_list_sequence(&mut self) -> Production {
        self.production("fieldListSequence", |p, node| {
            let Some(first) = p.parse_field_list()? else {
                return Ok(false);
            };
            node.push(first);

            while let Some(semicolon) = p.match_operator(";") {
                node.push(semicolon);
                if let Some(fields) = p.parse_field_list()? {
                    node.push(fields);
                }
            }
            Ok(true)
        })
    }

    pub(crate) fn parse_field_list(&mut self) -> Production {
        self.production("fieldList", |p, node| {
            let Some(names) = p.parse_ident_list()? else {
                return Ok(false);
            };
            node.push(names);
            node.push(p.expect_operator(":")?);
            node.push(p.require("type", Self::parse_type)?);
            Ok(true)
        })
    }

    pub(crate) fn parse_pointer_type(&mut self) -> Production {
        self.production("pointerType", |p, node| {
            let Some(keyword) = p.match_reserved_word("POINTER") else {
                return Ok(false);
            };
            node.push(keyword);
            node.push(p.expect_reserved_word("TO")?);
            node.push(p.require("type", Self::parse_type)?);
            Ok(true)
        })
    }

    pub(crate) fn parse_procedure_type(&mut self) -> Production {
        self.production("procedureType", |p, node| {
            let Some(keyword) = p.match_reserved_word("PROCEDURE") else {
                return Ok(false);
            };
            node.push(keyword);

            if let Some(params) = p.parse_formal_parameters()? {
                node.push(params);
            }
            Ok(true)
        })
    }
}
