//! Parse tree to node/edge hierarchy projection.
//!
//! The projected tree is what the layout engine positions. Every node gets a
//! stable [`NodeId`] derived from its type and byte range so a renderer can key
//! its elements across recomputes.

use crate::model::{fold_tree, stack, ParseNode, Point};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Multiplier folding `(start, end)` into a single number: `start * 1_000_000 + end`.
pub const ID_SPAN_FACTOR: u128 = 1_000_000;

/// Identifier of a projected node: `<type>!<start * 1_000_000 + end>`.
///
/// Unique for any two nodes that differ in type or byte range. Two nodes with
/// identical type and range (zero-width duplicates) share an id; renderers
/// treat that as an ambiguity, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Derive the id for a node of `node_type` spanning `start..end`.
    pub fn new(node_type: &str, start: usize, end: usize) -> Self {
        let span = start as u128 * ID_SPAN_FACTOR + end as u128;
        Self(format!("{node_type}!{span}"))
    }

    /// The id of the synthetic node shown while no tree exists.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// String form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A node of the diagram hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Stable identifier.
    pub id: NodeId,
    /// Grammar symbol name.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Raw node text, never truncated here.
    pub text: String,
    /// Children in source order.
    #[serde(serialize_with = "stack::serialize_children")]
    pub children: Vec<GraphNode>,
    /// Field name of the edge from the parent, when the grammar assigns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_link_name: Option<String>,
    /// Present (and `true`) only on error nodes.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
    /// Start location, recorded only on error nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_position: Option<Point>,
    /// End location, recorded only on error nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_position: Option<Point>,
}

impl Drop for GraphNode {
    fn drop(&mut self) {
        stack::dismantle(std::mem::take(&mut self.children), |node| {
            std::mem::take(&mut node.children)
        });
    }
}

impl GraphNode {
    /// The synthetic empty root rendered while no tree has been computed.
    pub fn empty() -> Self {
        Self {
            id: NodeId::empty(),
            node_type: String::new(),
            text: String::new(),
            children: Vec::new(),
            parent_link_name: None,
            error: false,
            start_position: None,
            end_position: None,
        }
    }

    /// Number of nodes in this subtree, including `self`.
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

/// Project a parse tree into the diagram hierarchy.
///
/// `None` (no tree computed yet) yields [`GraphNode::empty`].
pub fn project<N: ParseNode>(root: Option<&N>) -> GraphNode {
    match root {
        Some(node) => project_node(node),
        None => GraphNode::empty(),
    }
}

fn project_node<N: ParseNode>(root: &N) -> GraphNode {
    fold_tree(root, |node, children| {
        let node_type = node.node_type().into_owned();
        let is_error = node.is_error();
        GraphNode {
            id: NodeId::new(&node_type, node.start_byte(), node.end_byte()),
            node_type,
            text: node.text().into_owned(),
            children: children
                .into_iter()
                .map(|child| {
                    let mut projected: GraphNode = child.value;
                    projected.parent_link_name = child.field;
                    projected
                })
                .collect(),
            parent_link_name: None,
            error: is_error,
            start_position: is_error.then(|| node.start_position()),
            end_position: is_error.then(|| node.end_position()),
        }
    })
}

/// Ids shared by more than one node, in first-seen pre-order.
pub fn duplicate_ids(root: &GraphNode) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if !seen.insert(&node.id) && reported.insert(&node.id) {
            duplicates.push(node.id.clone());
        }
        stack.extend(node.children.iter().rev());
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SyntaxNode;
    use crate::test_harness::{assignment_tree, deep_chain, error_tree, repeated_field_tree};

    fn project_tree(tree: &SyntaxNode) -> GraphNode {
        project(Some(&tree))
    }

    #[test]
    fn root_id_folds_span_into_one_number() {
        let graph = project_tree(&assignment_tree());
        assert_eq!(graph.id.as_str(), "program!3");
    }

    #[test]
    fn id_uses_start_times_one_million() {
        assert_eq!(NodeId::new("identifier", 5, 6).as_str(), "identifier!5000006");
    }

    #[test]
    fn id_does_not_overflow_on_huge_offsets() {
        let id = NodeId::new("blob", usize::MAX, usize::MAX);
        let expected = usize::MAX as u128 * 1_000_000 + usize::MAX as u128;
        assert_eq!(id.to_string(), format!("blob!{expected}"));
    }

    #[test]
    fn absent_tree_projects_to_empty_node() {
        let graph = project::<&SyntaxNode>(None);
        assert_eq!(graph, GraphNode::empty());
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn parent_link_name_only_on_field_edges() {
        let graph = project_tree(&assignment_tree());
        let assignment = &graph.children[0].children[0];
        let links: Vec<_> = assignment
            .children
            .iter()
            .map(|c| c.parent_link_name.as_deref())
            .collect();
        assert_eq!(links, vec![Some("left"), None, Some("right")]);
        assert!(graph.parent_link_name.is_none());
    }

    #[test]
    fn positions_recorded_only_on_error_nodes() {
        let graph = project_tree(&error_tree());
        assert!(!graph.error);
        assert!(graph.start_position.is_none());

        let error = &graph.children[0];
        assert!(error.error);
        assert_eq!(error.start_position, Some(Point::new(0, 0)));
        assert_eq!(error.end_position, Some(Point::new(0, 5)));

        let json = serde_json::to_value(&graph).unwrap();
        assert!(json.get("startPosition").is_none());
        assert!(json.get("error").is_none());
        assert_eq!(json["children"][0]["error"], serde_json::json!(true));
    }

    #[test]
    fn text_is_always_kept_in_full() {
        let long = "y".repeat(500);
        let tree = SyntaxNode::new("string", 0, 500, long.clone());
        assert_eq!(project_tree(&tree).text, long);
    }

    #[test]
    fn ids_are_unique_for_distinct_type_and_span() {
        let graph = project_tree(&repeated_field_tree());
        assert!(duplicate_ids(&graph).is_empty());
        assert_eq!(graph.node_count(), 8);
    }

    #[test]
    fn zero_width_duplicates_are_reported_not_fatal() {
        let tree = SyntaxNode::new("block", 0, 0, "")
            .with_child(SyntaxNode::new("MISSING", 0, 0, ""))
            .with_child(SyntaxNode::new("MISSING", 0, 0, ""))
            .with_child(SyntaxNode::new("MISSING", 0, 0, ""));
        let graph = project_tree(&tree);
        assert_eq!(graph.children.len(), 3);
        assert_eq!(duplicate_ids(&graph), vec![NodeId::new("MISSING", 0, 0)]);
    }

    #[test]
    fn deep_chain_projects_every_level() {
        let graph = project_tree(&deep_chain(50));
        assert_eq!(graph.node_count(), 50);
    }

    #[test]
    fn very_deep_chain_projects_serializes_and_drops() {
        let graph = project_tree(&deep_chain(100_000));
        assert_eq!(graph.node_count(), 100_000);
        assert!(duplicate_ids(&graph).is_empty());

        let json = serde_json::to_string(&graph).unwrap();
        assert!(json.starts_with(r#"{"id":"level_99999!0","type":"level_99999""#));
    }
}
