//! Declaration parsing implementation
//!
//! This module handles the module frame and everything that can appear in a
//! declaration sequence:
//!
//! - Module header, import list and closing name
//! - `CONST`, `TYPE` and `VAR` blocks
//! - Procedure declarations with headings, bodies and formal parameters
//!
//! # Grammar
//!
//! ```text
//! module              ::= MODULE ident ";" [importList] declarationSequence
//!                         [BEGIN statementSequence] END ident "."
//! importList          ::= IMPORT import {"," import} ";"
//! import              ::= ident [":=" ident]
//! declarationSequence ::= [CONST {constDeclaration ";"}]
//!                         [TYPE {typeDeclaration ";"}]
//!                         [VAR {varDeclaration ";"}]
//!                         {procedureDeclaration ";"}
//! constDeclaration    ::= identdef "=" expression
//! typeDeclaration     ::= identdef "=" type
//! varDeclaration      ::= identList ":" type
//! procedureDeclaration ::= procedureHeading ";" procedureBody ident
//! procedureHeading    ::= PROCEDURE identdef [formalParameters]
//! procedureBody       ::= declarationSequence [BEGIN statementSequence]
//!                         [RETURN expression] END
//! formalParameters    ::= "(" [fpSection {";" fpSection}] ")" [":" qualident]
//! fpSection           ::= [VAR] ident {"," ident} ":" formalType
//! formalType          ::= {ARRAY OF} qualident
//! identdef            ::= ident ["*"]
//! identList           ::= identdef {"," identdef}
//! ```
//!
//! Each block of the declaration sequence becomes its own node
//! (`declarationSequence_constSequence`, `declarationSequence_typeDeclaration`,
//! `declarationSequence_varDeclaration`, `declarationSequence_procedureDeclaration`).
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::ParseNode;
use crate::parser::parse::{ParseError, Parser, Production};

impl<'t> Parser<'t> {
    pub(crate) fn parse_module(&mut self) -> Production {
        self.production("module", |p, node| {
            let Some(keyword) = p.match_reserved_word("MODULE") else {
                return Ok(false);
            };
            node.push(keyword);

            let name = p.expect_ident()?;
            let opening = name.label().to_string();
            node.push(name);
            node.push(p.expect_operator(";")?);

            if let Some(imports) = p.parse_import_list()? {
                node.push(imports);
            }
            node.push(p.require("declarationSequence", Self::parse_declaration_sequence)?);
            p.push_body(node)?;

            node.push(p.expect_reserved_word("END")?);
            node.push(p.expect_closing_name("module", &opening)?);
            node.push(p.expect_operator(".")?);
            Ok(true)
        })
    }

    /// Optional `BEGIN statementSequence` shared by modules and procedures.
    fn push_body(&mut self, node: &mut ParseNode) -> Result<(), ParseError> {
        if let Some(begin) = self.match_reserved_word("BEGIN") {
            node.push(begin);
            node.push(self.require("statementSequence", Self::parse_statement_sequence)?);
        }
        Ok(())
    }

    pub(crate) fn parse_import_list(&mut self) -> Production {
        self.production("importList", |p, node| {
            let Some(keyword) = p.match_reserved_word("IMPORT") else {
                return Ok(false);
            };
            node.push(keyword);
            node.push(p.require("import", Self::parse_import)?);

            while let Some(comma) = p.match_operator(",") {
                node.push(comma);
                node.push(p.require("import", Self::parse_import)?);
            }

            node.push(p.expect_operator(";")?);
            Ok(true)
        })
    }

    /// `Name` or `Alias := Name`.
    pub(crate) fn parse_import(&mut self) -> Production {
        self.production("import", |p, node| {
            let Some(name) = p.match_ident() else {
                return Ok(false);
            };
            node.push(name);

            if let Some(assign) = p.match_operator(":=") {
                node.push(assign);
                node.push(p.expect_ident()?);
            }
            Ok(true)
        })
    }

    /// Always matches; an empty sequence is a node without children.
    pub(crate) fn parse_declaration_sequence(&mut self) -> Production {
        self.production("declarationSequence", |p, node| {
            let sections: [fn(&mut Self) -> Production; 4] = [
                Self::parse_const_section,
                Self::parse_type_section,
                Self::parse_var_section,
                Self::parse_procedure_section,
            ];
            for section in sections {
                if let Some(block) = section(p)? {
                    node.push(block);
                }
            }
            Ok(true)
        })
    }

    fn parse_const_section(&mut self) -> Production {
        self.declaration_block(
            "declarationSequence_constSequence",
            "CONST",
            Self::parse_const_declaration,
        )
    }

    fn parse_type_section(&mut self) -> Production {
        self.declaration_block(
            "declarationSequence_typeDeclaration",
            "TYPE",
            Self::parse_type_declaration,
        )
    }

    fn parse_var_section(&mut self) -> Production {
        self.declaration_block(
            "declarationSequence_varDeclaration",
            "VAR",
            Self::parse_var_declaration,
        )
    }

    /// `keyword {item ";"}`
    fn declaration_block(
        &mut self,
        label: &'static str,
        keyword: &'static str,
        item: fn(&mut Self) -> Production,
    ) -> Production {
        self.production(label, |p, node| {
            let Some(word) = p.match_reserved_word(keyword) else {
                return Ok(false);
            };
            node.push(word);

            while let Some(declaration) = item(p)? {
                node.push(declaration);
                node.push(p.expect_operator(";")?);
            }
            Ok(true)
        })
    }

    /// Only produces a node when at least one procedure is declared.
    fn parse_procedure_section(&mut self) -> Production {
        self.production("declarationSequence_procedureDeclaration", |p, node| {
            while let Some(procedure) = p.parse_procedure_declaration()? {
                node.push(procedure);
                node.push(p.expect_operator(";")?);
            }
            Ok(!node.children().is_empty())
        })
    }

    pub(crate) fn parse_const_declaration(&mut self) -> Production {
        self.production("constDeclaration", |p, node| {
            let Some(identdef) = p.parse_identdef()? else {
                return Ok(false);
            };
            node.push(identdef);
            node.push(p.expect_operator("=")?);
            node.push(p.require("expression", Self::parse_expression)?);
            Ok(true)
        })
    }

    pub(crate) fn parse_type_declaration(&mut self) -> Production {
        self.production("typeDeclaration", |p, node| {
            let Some(identdef) = p.parse_identdef()? else {
                return Ok(false);
            };
            node.push(identdef);
            node.push(p.expect_operator("=")?);
            node.push(p.require("type", Self::parse_type)?);
            Ok(true)
        })
    }

    pub(crate) fn parse_var_declaration(&mut self) -> Production {
        self.production("varDeclaration", |p, node| {
            let Some(names) = p.parse_ident_list()? else {
                return Ok(false);
            };
            node.push(names);
            node.push(p.expect_operator(":")?);
            node.push(p.require("type", Self::parse_type)?);
            Ok(true)
        })
    }

    pub(crate) fn parse_procedure_declaration(&mut self) -> Production {
        self.production("procedureDeclaration", |p, node| {
            let Some(heading) = p.parse_procedure_heading()? else {
                return Ok(false);
            };
            let opening = heading
                .child("identdef")
                .and_then(|def| def.children().first())
                .map(|name| name.label().to_string())
                .unwrap_or_default();
            node.push(heading);

            node.push(p.expect_operator(";")?);
            node.push(p.require("procedureBody", Self::parse_procedure_body)?);
            node.push(p.expect_closing_name("procedure", &opening)?);
            Ok(true)
        })
    }

    pub(crate) fn parse_procedure_heading(&mut self) -> Production {
        self.production("procedureHeading", |p, node| {
            let Some(keyword) = p.match_reserved_word("PROCEDURE") else {
                return Ok(false);
            };
            node.push(keyword);
            node.push(p.require("identdef", Self::parse_identdef)?);

            if let Some(params) = p.parse_formal_parameters()? {
                node.push(params);
            }
            Ok(true)
        })
    }

    pub(crate) fn parse_procedure_body(&mut self) -> Production {
        self.production("procedureBody", |p, node| {
            node.push(p.require("declarationSequence", Self::parse_declaration_sequence)?);
            p.push_body(node)?;

            if let Some(keyword) = p.match_reserved_word("RETURN") {
                node.push(keyword);
                node.push(p.require("expression", Self::parse_expression)?);
            }

            node.push(p.expect_reserved_word("END")?);
            Ok(true)
        })
    }

    pub(crate) fn parse_formal_parameters(&mut self) -> Production {
        self.production("formalParameters", |p, node| {
            let Some(open) = p.match_operator("(") else {
                return Ok(false);
            };
            node.push(open);

            if let Some(section) = p.parse_fp_section()? {
                node.push(section);
                while let Some(semicolon) = p.match_operator(";") {
                    node.push(semicolon);
                    node.push(p.require("fpSection", Self::parse_fp_section)?);
                }
            }
            node.push(p.expect_operator(")")?);

            if let Some(colon) = p.match_operator(":") {
                node.push(colon);
                node.push(p.require("qualident", Self::parse_qualident)?);
            }
            Ok(true)
        })
    }

    pub(crate) fn parse_fp_section(&mut self) -> Production {
        self.production("fpSection", |p, node| {
            if let Some(keyword) = p.match_reserved_word("VAR") {
                node.push(keyword);
                node.push(p.expect_ident()?);
            } else {
                let Some(name) = p.match_ident() else {
                    return Ok(false);
                };
                node.push(name);
            }

            while let Some(comma) = p.match_operator(",") {
                node.push(comma);
                node.push(p.expect_ident()?);
            }

            node.push(p.expect_operator(":")?);
            node.push(p.require("formalType", Self::parse_formal_type)?);
            Ok(true)
        })
    }

    pub(crate) fn parse_formal_type(&mut self) -> Production {
        self.production("formalType", |p, node| {
            while let Some(array) = p.match_reserved_word("ARRAY") {
                node.push(array);
                node.push(p.expect_reserved_word("OF")?);
            }

            if node.children().is_empty() {
                let Some(name) = p.parse_qualident()? else {
                    return Ok(false);
                };
                node.push(name);
            } else {
                node.push(p.require("qualident", Self::parse_qualident)?);
            }
            Ok(true)
        })
    }

    pub(crate) fn parse_identdef(&mut self) -> Production {
        self.production("identdef", |p, node| {
            let Some(name) = p.match_ident() else {
                return Ok(false);
            };
            node.push(name);

            if let Some(export) = p.match_operator("*") {
                node.push(export);
            }
            Ok(true)
        })
    }

    pub(crate) fn parse_ident_list(&mut self) -> Production {
        self.production("identList", |p, node| {
            let Some(first) = p.parse_identdef()? else {
                return Ok(false);
            };
            node.push(first);

            while let Some(comma) = p.match_operator(",") {
                node.push(comma);
                node.push(p.require("identdef", Self::parse_identdef)?);
            }
            Ok(true)
        })
    }
}
