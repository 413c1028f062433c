// Concrete parse tree definitions for the Oberon-07 front-end

use super::lexer::{Token, TokenKind};
use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Distinguishes grammar-production nodes from token leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Interior node; the label is the production name.
    Production,
    /// Leaf built from one consumed token; the label is the token text.
    Terminal {
        token_kind: TokenKind,
        location: SourceLocation,
    },
}

/// A node of the concrete parse tree.
///
/// Every node is owned by exactly one parent. A production that fails simply
/// drops the node it was building together with its subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNode {
    label: String,
    kind: NodeKind,
    children: Vec<ParseNode>,
}

impl ParseNode {
    /// Create an empty production node.
    pub fn production(label: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: NodeKind::Production,
            children: Vec::new(),
        }
    }

    /// Create a leaf for a consumed token.
    pub fn terminal(token: &Token) -> Self {
        Self {
            label: token.text.clone(),
            kind: NodeKind::Terminal {
                token_kind: token.kind,
                location: token.location,
            },
            children: Vec::new(),
        }
    }

    pub fn push(&mut self, child: ParseNode) {
        self.children.push(child);
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[ParseNode] {
        &self.children
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, NodeKind::Terminal { .. })
    }

    /// Token kind of a terminal leaf, `None` for productions.
    pub fn token_kind(&self) -> Option<TokenKind> {
        match self.kind {
            NodeKind::Terminal { token_kind, .. } => Some(token_kind),
            NodeKind::Production => None,
        }
    }

    /// Source location of a terminal leaf, or of the first terminal below a
    /// production. Empty productions have no location.
    pub fn location(&self) -> Option<SourceLocation> {
        match self.kind {
            NodeKind::Terminal { location, .. } => Some(location),
            NodeKind::Production => self.children.iter().find_map(|c| c.location()),
        }
    }

    /// First direct child carrying `label`.
    pub fn child(&self, label: &str) -> Option<&ParseNode> {
        self.children.iter().find(|c| c.label == label)
    }

    /// All direct children carrying `label`, in order.
    pub fn children_labeled<'a>(
        &'a self,
        label: &'a str,
    ) -> impl Iterator<Item = &'a ParseNode> + 'a {
        self.children.iter().filter(move |c| c.label == label)
    }

    /// Terminal leaves of the subtree in source order.
    pub fn terminals(&self) -> Vec<&ParseNode> {
        let mut leaves = Vec::new();
        self.collect_terminals(&mut leaves);
        leaves
    }

    fn collect_terminals<'a>(&'a self, out: &mut Vec<&'a ParseNode>) {
        if self.is_terminal() {
            out.push(self);
            return;
        }
        for child in &self.children {
            child.collect_terminals(out);
        }
    }

    /// Number of nodes in the subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ParseNode::node_count).sum::<usize>()
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:width$}{}", "", self.label, width = depth * 2)?;
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ParseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
