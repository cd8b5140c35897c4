//! Diagram layout: tidy-tree placement plus edge geometry.
//!
//! Every node gets a fixed 190 x 90 footprint (a 180 x 50 box plus spacing).
//! After placement the whole tree is shifted by `(+width/2, +height/2)` so the
//! root sits in the middle of the viewport. Edges are cubic Bezier curves from
//! the bottom center of the parent's box to the top center of the child's.
//!
//! This is pure geometry; nothing here knows how the result is drawn.

mod tidy;

use crate::graph::{GraphNode, NodeId};
use crate::model::{text_length, Point};
use serde::Serialize;

/// Horizontal footprint of one node, including spacing.
pub const NODE_SPACING_X: f64 = 190.0;
/// Vertical distance between depth levels.
pub const NODE_SPACING_Y: f64 = 90.0;
/// Width of a node's box.
pub const NODE_BOX_WIDTH: f64 = 180.0;
/// Height of a node's box.
pub const NODE_BOX_HEIGHT: f64 = 50.0;
/// UTF-16 code units of node text shown inside a box before truncation.
pub const TEXT_PREVIEW_CHARS: usize = 18;

/// A 2D coordinate in diagram space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coord {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position (grows downward).
    pub y: f64,
}

impl Coord {
    /// Create a coordinate.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Label drawn at the middle of an edge that carries a field name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeLabel {
    /// Field name.
    pub text: String,
    /// Anchor point.
    pub position: Coord,
}

/// Cubic Bezier edge from a parent to one child.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPath {
    /// Parent id.
    pub source_id: NodeId,
    /// Child id.
    pub target_id: NodeId,
    /// Bottom center of the parent's box.
    pub source: Coord,
    /// First control point: `(mid_x, source.y)`.
    pub control1: Coord,
    /// Second control point: `(mid_x, target.y)`.
    pub control2: Coord,
    /// Top center of the child's box.
    pub target: Coord,
    /// Field-name label, when the child carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<EdgeLabel>,
}

impl LinkPath {
    /// Geometry of the edge between boxes anchored at `parent` and `child`.
    pub fn between(parent: &LayoutNode, child: &LayoutNode) -> Self {
        let source = Coord::new(parent.x + NODE_BOX_WIDTH / 2.0, parent.y + NODE_BOX_HEIGHT);
        let target = Coord::new(child.x + NODE_BOX_WIDTH / 2.0, child.y);
        let mid_x = (source.x + target.x) / 2.0;
        let label = child.parent_link_name.as_ref().map(|name| EdgeLabel {
            text: name.clone(),
            position: Coord::new(mid_x, (source.y + target.y) / 2.0),
        });
        Self {
            source_id: parent.id.clone(),
            target_id: child.id.clone(),
            source,
            control1: Coord::new(mid_x, source.y),
            control2: Coord::new(mid_x, target.y),
            target,
            label,
        }
    }

    /// Renderer key: `<parent id>+<child id>`.
    pub fn key(&self) -> String {
        format!("{}+{}", self.source_id, self.target_id)
    }

    /// SVG path data (`M .. C ..`).
    pub fn to_svg_path(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.source.x,
            self.source.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.target.x,
            self.target.y
        )
    }
}

/// A positioned node. `(x, y)` is the top-left corner of its box.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    /// Stable identifier.
    pub id: NodeId,
    /// Grammar symbol name.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Raw node text.
    pub text: String,
    /// Field name of the edge from the parent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_link_name: Option<String>,
    /// Error-recovery node flag.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
    /// Start location (error nodes only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_position: Option<Point>,
    /// End location (error nodes only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_position: Option<Point>,
    /// Distance from the root.
    pub depth: usize,
    /// Left edge of the box.
    pub x: f64,
    /// Top edge of the box.
    pub y: f64,
    /// Index of the parent in [`Layout::nodes`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
    /// Indices of the children in [`Layout::nodes`], in source order.
    pub children: Vec<usize>,
    /// One edge per child, in source order.
    pub links: Vec<LinkPath>,
}

impl LayoutNode {
    /// Node text cut to [`TEXT_PREVIEW_CHARS`] UTF-16 units for display inside the box.
    pub fn label_preview(&self) -> String {
        truncate_text(&self.text, TEXT_PREVIEW_CHARS)
    }
}

/// Every node of a laid-out tree, in pre-order (root first).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    /// Viewport width the layout was centered in.
    pub width: f64,
    /// Viewport height the layout was centered in.
    pub height: f64,
    /// Positioned nodes.
    pub nodes: Vec<LayoutNode>,
}

impl Layout {
    /// The root node.
    pub fn root(&self) -> Option<&LayoutNode> {
        self.nodes.first()
    }

    /// Look a node up by id (first match if ids are ambiguous).
    pub fn find(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|node| node.id.as_str() == id)
    }

    /// All edges, parent before child.
    pub fn links(&self) -> impl Iterator<Item = &LinkPath> {
        self.nodes.iter().flat_map(|node| node.links.iter())
    }

    /// Bounding box `(min, max)` of all node boxes.
    pub fn bounds(&self) -> Option<(Coord, Coord)> {
        let first = self.nodes.first()?;
        let mut min = Coord::new(first.x, first.y);
        let mut max = Coord::new(first.x + NODE_BOX_WIDTH, first.y + NODE_BOX_HEIGHT);
        for node in &self.nodes {
            min.x = min.x.min(node.x);
            min.y = min.y.min(node.y);
            max.x = max.x.max(node.x + NODE_BOX_WIDTH);
            max.y = max.y.max(node.y + NODE_BOX_HEIGHT);
        }
        Some((min, max))
    }
}

/// Lay `graph` out and center it in a `width` x `height` viewport.
///
/// Deterministic: the same input always yields the same coordinates.
pub fn layout(graph: &GraphNode, width: f64, height: f64) -> Layout {
    let mut nodes = flatten(graph);

    let children: Vec<Vec<usize>> = nodes.iter().map(|node| node.children.clone()).collect();
    let xs = tidy::tidy_x(&children);

    for (node, x) in nodes.iter_mut().zip(xs) {
        node.x = x * NODE_SPACING_X + width / 2.0;
        node.y = node.depth as f64 * NODE_SPACING_Y + height / 2.0;
    }

    let links: Vec<Vec<LinkPath>> = nodes
        .iter()
        .map(|parent| {
            parent
                .children
                .iter()
                .map(|&child| LinkPath::between(parent, &nodes[child]))
                .collect()
        })
        .collect();
    for (node, node_links) in nodes.iter_mut().zip(links) {
        node.links = node_links;
    }

    Layout {
        width,
        height,
        nodes,
    }
}

/// Pre-order arena of unpositioned nodes with parent/children indices filled in.
fn flatten(graph: &GraphNode) -> Vec<LayoutNode> {
    let mut nodes: Vec<LayoutNode> = Vec::with_capacity(graph.node_count());
    let mut stack: Vec<(&GraphNode, Option<usize>, usize)> = vec![(graph, None, 0)];

    while let Some((node, parent, depth)) = stack.pop() {
        let index = nodes.len();
        if let Some(parent) = parent {
            nodes[parent].children.push(index);
        }
        nodes.push(LayoutNode {
            id: node.id.clone(),
            node_type: node.node_type.clone(),
            text: node.text.clone(),
            parent_link_name: node.parent_link_name.clone(),
            error: node.error,
            start_position: node.start_position,
            end_position: node.end_position,
            depth,
            x: 0.0,
            y: 0.0,
            parent,
            children: Vec::new(),
            links: Vec::new(),
        });
        for child in node.children.iter().rev() {
            stack.push((child, Some(index), depth + 1));
        }
    }
    nodes
}

/// Cut `text` to `max_chars` UTF-16 code units, ending in `...` when truncated.
///
/// Characters are never split, so a truncated preview may come in under the limit.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text_length(text) <= max_chars {
        return text.to_string();
    }
    let budget = max_chars.saturating_sub(3);
    let mut used = 0;
    let mut truncated = String::new();
    for ch in text.chars() {
        used += ch.len_utf16();
        if used > budget {
            break;
        }
        truncated.push(ch);
    }
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
