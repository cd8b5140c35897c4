//! Read-only view of a parser's output.
//!
//! Everything downstream of the parser (serializer, graph projector, layout)
//! is written against [`ParseNode`], so owned fixture trees and tree-sitter
//! trees go through exactly the same code.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Zero-based row/column location, serialized as `{"row": .., "column": ..}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Zero-based line number.
    pub row: usize,
    /// Zero-based byte column within the line.
    pub column: usize,
}

impl Point {
    /// Create a point.
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// A node in a parse tree produced by an external grammar-driven parser.
///
/// Children are handed out by value: borrowed owned-trees implement this for
/// `&SyntaxNode`, cursor-style runtimes for their `Copy` node handles.
///
/// Invariant expected from implementors: a node's byte range contains every
/// child's range, and children are ordered by position. Handles are expected
/// to be cheap to clone.
pub trait ParseNode: Sized + Clone {
    /// Grammar symbol name (e.g. `"assignment"`, `"ERROR"`).
    fn node_type(&self) -> Cow<'_, str>;

    /// Byte offset where the node starts.
    fn start_byte(&self) -> usize;

    /// Byte offset where the node ends (exclusive, `>= start_byte`).
    fn end_byte(&self) -> usize;

    /// Row/column of [`ParseNode::start_byte`].
    fn start_position(&self) -> Point;

    /// Row/column of [`ParseNode::end_byte`].
    fn end_position(&self) -> Point;

    /// True for nodes the parser created to recover from a syntax error.
    fn is_error(&self) -> bool;

    /// Number of children, named and anonymous.
    fn child_count(&self) -> usize;

    /// Child at `index`, or `None` when out of range.
    fn child(&self, index: usize) -> Option<Self>;

    /// Field name the grammar assigns to the child at `index`, if any.
    fn field_name_for_child(&self, index: usize) -> Option<Cow<'_, str>>;

    /// Source text covered by the node.
    fn text(&self) -> Cow<'_, str>;
}

/// A parsed tree that can hand out its root node.
pub trait SyntaxTree {
    /// Node handle borrowed from the tree.
    type Node<'a>: ParseNode
    where
        Self: 'a;

    /// The root node.
    fn root(&self) -> Self::Node<'_>;
}

/// A finished child handed to the `build` step of [`fold_tree`].
#[derive(Debug)]
pub struct FoldedChild<T> {
    /// Position among the parent's children.
    pub index: usize,
    /// Field name of the edge from the parent, if any.
    pub field: Option<String>,
    /// What `build` produced for the child's subtree.
    pub value: T,
}

/// Bottom-up fold over the tree under `root`.
///
/// `build` sees each node once, after all of its children, together with
/// their results in source order. Children the node reports but cannot hand
/// out are skipped. The walk keeps its own stack of ancestors, so the depth of
/// the tree is limited by memory only.
pub fn fold_tree<N, T, F>(root: &N, mut build: F) -> T
where
    N: ParseNode,
    F: FnMut(&N, Vec<FoldedChild<T>>) -> T,
{
    struct Frame<N, T> {
        node: N,
        index: usize,
        field: Option<String>,
        next_child: usize,
        done: Vec<FoldedChild<T>>,
    }

    impl<N, T> Frame<N, T> {
        fn new(node: N, index: usize, field: Option<String>) -> Self {
            Self {
                node,
                index,
                field,
                next_child: 0,
                done: Vec::new(),
            }
        }
    }

    let mut current = Frame::new(root.clone(), 0, None);
    let mut ancestors: Vec<Frame<N, T>> = Vec::new();
    loop {
        if current.next_child < current.node.child_count() {
            let index = current.next_child;
            current.next_child += 1;
            if let Some(child) = current.node.child(index) {
                let field = current
                    .node
                    .field_name_for_child(index)
                    .map(Cow::into_owned);
                let parent = std::mem::replace(&mut current, Frame::new(child, index, field));
                ancestors.push(parent);
            }
            continue;
        }

        let value = build(&current.node, std::mem::take(&mut current.done));
        match ancestors.pop() {
            Some(mut parent) => {
                parent.done.push(FoldedChild {
                    index: current.index,
                    field: current.field.take(),
                    value,
                });
                current = parent;
            }
            None => return value,
        }
    }
}

/// Length of `text` in UTF-16 code units.
///
/// Text-inclusion thresholds are expressed in this unit, which is what
/// editor hosts report as string length.
pub fn text_length(text: &str) -> usize {
    text.encode_utf16().count()
}
