//! Shared fixture trees for unit tests.
//!
//! Trees are shaped like a Python grammar would produce them, built with
//! [`SyntaxNode::spanning`] so text and positions stay consistent with the
//! source string.

use crate::model::{GrammarCatalog, GrammarLoadError, SyntaxNode};
use crate::pipeline::LanguageBackend;

/// `x=1` as `program > expression_statement > assignment(left, =, right)`.
pub fn assignment_tree() -> SyntaxNode {
    let source = "x=1";
    let assignment = SyntaxNode::spanning(source, "assignment", 0, 3)
        .with_field_child("left", SyntaxNode::spanning(source, "identifier", 0, 1))
        .with_child(SyntaxNode::spanning(source, "=", 1, 2))
        .with_field_child("right", SyntaxNode::spanning(source, "integer", 2, 3));
    SyntaxNode::spanning(source, "program", 0, 3).with_child(
        SyntaxNode::spanning(source, "expression_statement", 0, 3).with_child(assignment),
    )
}

/// `f(a, b)` where both arguments sit behind the same `argument` field.
pub fn repeated_field_tree() -> SyntaxNode {
    let source = "f(a, b)";
    let arguments = SyntaxNode::spanning(source, "argument_list", 1, 7)
        .with_child(SyntaxNode::spanning(source, "(", 1, 2))
        .with_field_child("argument", SyntaxNode::spanning(source, "identifier", 2, 3))
        .with_child(SyntaxNode::spanning(source, ",", 3, 4))
        .with_field_child("argument", SyntaxNode::spanning(source, "identifier", 5, 6))
        .with_child(SyntaxNode::spanning(source, ")", 6, 7));
    SyntaxNode::spanning(source, "call", 0, 7)
        .with_field_child("function", SyntaxNode::spanning(source, "identifier", 0, 1))
        .with_field_child("arguments", arguments)
}

/// `x = (` with an `ERROR` node swallowing the dangling parenthesis.
pub fn error_tree() -> SyntaxNode {
    let source = "x = (\n";
    SyntaxNode::spanning(source, "module", 0, 6).with_child(
        SyntaxNode::spanning(source, "ERROR", 0, 5)
            .into_error()
            .with_child(SyntaxNode::spanning(source, "identifier", 0, 1))
            .with_child(SyntaxNode::spanning(source, "=", 2, 3))
            .with_child(SyntaxNode::spanning(source, "(", 4, 5)),
    )
}

/// A single node with `len` characters of text.
pub fn leaf_with_text(node_type: &str, len: usize) -> SyntaxNode {
    let text = "a".repeat(len);
    SyntaxNode::new(node_type, 0, len, text)
}

/// A chain `depth` nodes deep, each with one child.
pub fn deep_chain(depth: usize) -> SyntaxNode {
    let mut node = SyntaxNode::new("leaf", 0, 0, "");
    for level in 1..depth {
        node = SyntaxNode::new(format!("level_{level}"), 0, 0, "").with_child(node);
    }
    node
}

/// Backend whose every grammar splits source into whitespace-separated `word` nodes.
///
/// Counts `load_language` calls so cache behaviour can be observed.
#[derive(Debug, Default)]
pub struct WordBackend {
    grammars: Vec<String>,
    loads: usize,
}

impl WordBackend {
    /// Backend that knows the given grammar ids.
    pub fn new<I, S>(grammars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            grammars: grammars.into_iter().map(Into::into).collect(),
            loads: 0,
        }
    }

    /// Number of `load_language` calls so far, failed ones included.
    pub fn loads(&self) -> usize {
        self.loads
    }
}

impl LanguageBackend for WordBackend {
    type Language = String;
    type Tree = SyntaxNode;

    fn load_language(&mut self, id: &str) -> Result<String, GrammarLoadError> {
        self.loads += 1;
        if self.grammars.iter().any(|g| g == id) {
            Ok(id.to_string())
        } else {
            Err(GrammarLoadError::UnknownGrammar(id.to_string()))
        }
    }

    fn parse(&mut self, _language: &String, source: &str) -> Result<SyntaxNode, GrammarLoadError> {
        let mut root = SyntaxNode::spanning(source, "program", 0, source.len());
        let mut start = None;
        for (index, c) in source.char_indices() {
            match (c.is_whitespace(), start) {
                (false, None) => start = Some(index),
                (true, Some(begin)) => {
                    root = root.with_child(SyntaxNode::spanning(source, "word", begin, index));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(begin) = start {
            root = root.with_child(SyntaxNode::spanning(source, "word", begin, source.len()));
        }
        Ok(root)
    }

    fn catalog(&self) -> GrammarCatalog {
        GrammarCatalog::new(self.grammars.iter().cloned())
    }
}
