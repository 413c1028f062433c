//! Module outline extracted from a parse tree
//!
//! A structural pass over the tree produced by [`crate::parser`]: it reads
//! the module name, the import list and the names declared at module level,
//! navigating purely by node label. No name resolution or type checking
//! happens here.

use crate::parser::ast::ParseNode;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutlineError {
    #[error("unexpected tree shape: expected {expected} in '{context}'")]
    UnexpectedShape { expected: String, context: String },
}

/// An imported module. Without an alias, `alias` equals `module`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub alias: String,
    pub module: String,
}

/// A declared name and its export mark (`*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub exported: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outline {
    pub module: String,
    pub imports: Vec<Import>,
    pub constants: Vec<Declaration>,
    pub types: Vec<Declaration>,
    pub variables: Vec<Declaration>,
    pub procedures: Vec<Declaration>,
}

impl Outline {
    pub fn from_tree(tree: &ParseNode) -> Result<Self, OutlineError> {
        if tree.label() != "module" {
            return Err(unexpected("a module", tree));
        }

        let module = tree
            .children()
            .get(1)
            .filter(|name| name.is_terminal())
            .ok_or_else(|| unexpected("the module name", tree))?
            .label()
            .to_string();

        let imports = match tree.child("importList") {
            Some(list) => list
                .children_labeled("import")
                .map(import_of)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let declarations = tree
            .child("declarationSequence")
            .ok_or_else(|| unexpected("a declaration sequence", tree))?;

        let mut outline = Outline {
            module,
            imports,
            ..Outline::default()
        };

        if let Some(block) = declarations.child("declarationSequence_constSequence") {
            for decl in block.children_labeled("constDeclaration") {
                outline.constants.push(declared_name(decl)?);
            }
        }

        if let Some(block) = declarations.child("declarationSequence_typeDeclaration") {
            for decl in block.children_labeled("typeDeclaration") {
                outline.types.push(declared_name(decl)?);
            }
        }

        if let Some(block) = declarations.child("declarationSequence_varDeclaration") {
            for decl in block.children_labeled("varDeclaration") {
                let names = decl
                    .child("identList")
                    .ok_or_else(|| unexpected("an identifier list", decl))?;
                for identdef in names.children_labeled("identdef") {
                    outline.variables.push(identdef_of(identdef)?);
                }
            }
        }

        if let Some(block) = declarations.child("declarationSequence_procedureDeclaration") {
            for decl in block.children_labeled("procedureDeclaration") {
                let heading = decl
                    .child("procedureHeading")
                    .ok_or_else(|| unexpected("a procedure heading", decl))?;
                outline.procedures.push(declared_name(heading)?);
            }
        }

        Ok(outline)
    }
}

impl fmt::Display for Outline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "module {}: {} imports, {} constants, {} types, {} variables, {} procedures",
            self.module,
            self.imports.len(),
            self.constants.len(),
            self.types.len(),
            self.variables.len(),
            self.procedures.len()
        )
    }
}

fn unexpected(expected: &str, context: &ParseNode) -> OutlineError {
    OutlineError::UnexpectedShape {
        expected: expected.to_string(),
        context: context.label().to_string(),
    }
}

/// `Name` or `Alias := Name`.
fn import_of(node: &ParseNode) -> Result<Import, OutlineError> {
    match node.terminals().as_slice() {
        [name] => Ok(Import {
            alias: name.label().to_string(),
            module: name.label().to_string(),
        }),
        [alias, _, module] => Ok(Import {
            alias: alias.label().to_string(),
            module: module.label().to_string(),
        }),
        _ => Err(unexpected("an import", node)),
    }
}

/// Name from the `identdef` child of a declaration or heading.
fn declared_name(node: &ParseNode) -> Result<Declaration, OutlineError> {
    let identdef = node
        .child("identdef")
        .ok_or_else(|| unexpected("an identdef", node))?;
    identdef_of(identdef)
}

fn identdef_of(identdef: &ParseNode) -> Result<Declaration, OutlineError> {
    let name = identdef
        .children()
        .first()
        .ok_or_else(|| unexpected("an identifier", identdef))?;
    Ok(Declaration {
        name: name.label().to_string(),
        exported: identdef.child("*").is_some(),
    })
}
