//! Owned parse tree.
//!
//! `SyntaxNode` is the crate's own rendition of a parser's output: used for
//! fixtures, for tests, and for reading already-parsed trees from JSON.

use super::parse_node::{ParseNode, Point, SyntaxTree};
use super::stack;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// An owned parse tree node.
///
/// The field name of the edge from the parent lives on the child (`field`),
/// which keeps the JSON form flat and readable:
///
/// ```json
/// {"type": "assignment", "startByte": 0, "endByte": 3, "text": "x=1",
///  "children": [{"type": "identifier", "field": "left", ...}]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxNode {
    /// Grammar symbol name.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Start byte offset.
    pub start_byte: usize,
    /// End byte offset (exclusive).
    pub end_byte: usize,
    /// Row/column of the start offset.
    #[serde(default)]
    pub start_position: Point,
    /// Row/column of the end offset.
    #[serde(default)]
    pub end_position: Point,
    /// Error-recovery node flag.
    #[serde(default)]
    pub is_error: bool,
    /// Field name of the edge from the parent, if the grammar assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Source text covered by the node.
    #[serde(default)]
    pub text: String,
    /// Children in source order.
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "stack::serialize_children"
    )]
    pub children: Vec<SyntaxNode>,
}

impl Drop for SyntaxNode {
    fn drop(&mut self) {
        stack::dismantle(std::mem::take(&mut self.children), |node| {
            std::mem::take(&mut node.children)
        });
    }
}

impl SyntaxNode {
    /// Create a childless node with zeroed positions.
    pub fn new(
        node_type: impl Into<String>,
        start_byte: usize,
        end_byte: usize,
        text: impl Into<String>,
    ) -> Self {
        Self {
            node_type: node_type.into(),
            start_byte,
            end_byte,
            start_position: Point::default(),
            end_position: Point::default(),
            is_error: false,
            field: None,
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Create a node covering `source[start_byte..end_byte]`, deriving text and
    /// row/column positions from `source`.
    ///
    /// Offsets past the end of `source` are clamped; offsets that fall inside a
    /// multi-byte character yield empty text rather than panicking.
    pub fn spanning(
        source: &str,
        node_type: impl Into<String>,
        start_byte: usize,
        end_byte: usize,
    ) -> Self {
        let start = start_byte.min(source.len());
        let end = end_byte.clamp(start, source.len());
        let text = source.get(start..end).unwrap_or_default();
        let mut node = Self::new(node_type, start, end, text);
        node.start_position = point_at(source, start);
        node.end_position = point_at(source, end);
        node
    }

    /// Append an unnamed child.
    pub fn with_child(mut self, child: SyntaxNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child reached through the named field `field`.
    pub fn with_field_child(mut self, field: impl Into<String>, mut child: SyntaxNode) -> Self {
        child.field = Some(field.into());
        self.children.push(child);
        self
    }

    /// Mark the node as an error-recovery node.
    pub fn into_error(mut self) -> Self {
        self.is_error = true;
        self
    }

    /// Read a tree document.
    ///
    /// Unlike `serde_json::from_str` this accepts documents nested deeper
    /// than serde_json's default limit of 128 levels.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed JSON, a document that
    /// does not describe a node, or trailing input.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut reader = serde_json::Deserializer::from_str(json);
        reader.disable_recursion_limit();
        let node = Self::deserialize(serde_stacker::Deserializer::new(&mut reader))?;
        reader.end()?;
        Ok(node)
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

/// Row/column of `offset` within `source` (column counted in bytes).
fn point_at(source: &str, offset: usize) -> Point {
    let prefix = &source.as_bytes()[..offset];
    let row = prefix.iter().filter(|&&b| b == b'\n').count();
    let column = match prefix.iter().rposition(|&b| b == b'\n') {
        Some(newline) => offset - newline - 1,
        None => offset,
    };
    Point::new(row, column)
}

impl ParseNode for &SyntaxNode {
    fn node_type(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.node_type)
    }

    fn start_byte(&self) -> usize {
        self.start_byte
    }

    fn end_byte(&self) -> usize {
        self.end_byte
    }

    fn start_position(&self) -> Point {
        self.start_position
    }

    fn end_position(&self) -> Point {
        self.end_position
    }

    fn is_error(&self) -> bool {
        self.is_error
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Option<Self> {
        self.children.get(index)
    }

    fn field_name_for_child(&self, index: usize) -> Option<Cow<'_, str>> {
        self.children
            .get(index)
            .and_then(|child| child.field.as_deref())
            .map(Cow::Borrowed)
    }

    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }
}

impl SyntaxTree for SyntaxNode {
    type Node<'a> = &'a SyntaxNode;

    fn root(&self) -> Self::Node<'_> {
        self
    }
}
