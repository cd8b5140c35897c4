//! Parse tree to JSON document serialization.
//!
//! Two policies over the same walk:
//!
//! - **Verbose** (human-oriented, lossy): children keyed by field name, or
//!   `child_<index>` when the edge has none; the `children` key is omitted on
//!   leaves; `text` is kept only when short (`< 60` UTF-16 units, or `< 80` for
//!   `comment` nodes); `error: true` appears only on error nodes.
//! - **Terse** (machine-oriented, lossless): children always keyed
//!   `child_<index>` or `child_<index>_<field>`, so sibling keys never collide;
//!   `text`, `isError`, `startPosition` and `endPosition` are always present.
//!
//! Serialization is total: every tree produces a document. Pretty-printing is
//! left to [`to_pretty_json`].

use crate::model::{fold_tree, stack, text_length, ParseNode, Point};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Verbose mode keeps text shorter than this many UTF-16 code units.
pub const VERBOSE_TEXT_LIMIT: usize = 60;

/// Verbose mode keeps `comment` text shorter than this many UTF-16 code units.
pub const VERBOSE_COMMENT_TEXT_LIMIT: usize = 80;

const COMMENT_NODE_TYPE: &str = "comment";

/// Formatting policy for [`serialize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SerializeMode {
    /// Readable, lossy on long text.
    #[default]
    Verbose,
    /// Lossless, machine-consumable.
    Terse,
}

impl SerializeMode {
    /// `Terse` when `terse` is set, `Verbose` otherwise.
    pub fn from_terse(terse: bool) -> Self {
        if terse {
            Self::Terse
        } else {
            Self::Verbose
        }
    }
}

/// Children keyed by name, serialized as a JSON object in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Children<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for Children<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Children<T> {
    /// Insert `value` under `key`.
    ///
    /// A repeated key keeps its original position and takes the new value,
    /// the way assigning into a JSON object does.
    pub fn insert(&mut self, key: String, value: T) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// `(key, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn take_values(&mut self) -> Vec<T> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .map(|(_, value)| value)
            .collect()
    }
}

impl<T: Serialize> Serialize for Children<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        stack::grow(|| {
            let mut map = serializer.serialize_map(Some(self.entries.len()))?;
            for (key, value) in &self.entries {
                map.serialize_entry(key, value)?;
            }
            map.end()
        })
    }
}

/// Human-oriented node document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerboseNode {
    /// Grammar symbol name.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Children; `None` on leaves so the key disappears.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Children<VerboseNode>>,
    /// Node text when it passes the length rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Present (and `true`) only on error nodes.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

/// Machine-oriented, lossless node document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerseNode {
    /// Grammar symbol name.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Children, always present (possibly empty).
    pub children: Children<TerseNode>,
    /// Node text, never truncated.
    pub text: String,
    /// Error-recovery flag.
    pub is_error: bool,
    /// Start location.
    pub start_position: Point,
    /// End location.
    pub end_position: Point,
}

impl Drop for VerboseNode {
    fn drop(&mut self) {
        let Some(mut children) = self.children.take() else {
            return;
        };
        stack::dismantle(children.take_values(), |node| {
            node.children
                .take()
                .map(|mut children| children.take_values())
                .unwrap_or_default()
        });
    }
}

impl Drop for TerseNode {
    fn drop(&mut self) {
        stack::dismantle(self.children.take_values(), |node| {
            node.children.take_values()
        });
    }
}

/// Output of [`serialize`]: one of the two document shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SerializedNode {
    /// Verbose document.
    Verbose(VerboseNode),
    /// Terse document.
    Terse(TerseNode),
}

/// Serialize `node` and its subtree with the given policy.
pub fn serialize<N: ParseNode>(node: &N, mode: SerializeMode) -> SerializedNode {
    match mode {
        SerializeMode::Verbose => SerializedNode::Verbose(serialize_verbose(node)),
        SerializeMode::Terse => SerializedNode::Terse(serialize_terse(node)),
    }
}

/// Verbose serialization of `node`.
pub fn serialize_verbose<N: ParseNode>(node: &N) -> VerboseNode {
    fold_tree(node, |node, folded| {
        let node_type = node.node_type().into_owned();

        let mut children = Children::default();
        for child in folded {
            let key = match child.field {
                Some(field) => field,
                None => format!("child_{}", child.index),
            };
            children.insert(key, child.value);
        }

        let text = node.text();
        let text = keeps_verbose_text(&node_type, &text).then(|| text.into_owned());

        VerboseNode {
            children: (node.child_count() > 0).then_some(children),
            node_type,
            text,
            error: node.is_error(),
        }
    })
}

/// Terse serialization of `node`.
pub fn serialize_terse<N: ParseNode>(node: &N) -> TerseNode {
    fold_tree(node, |node, folded| {
        let mut children = Children::default();
        for child in folded {
            let key = match child.field {
                Some(field) => format!("child_{}_{field}", child.index),
                None => format!("child_{}", child.index),
            };
            children.insert(key, child.value);
        }

        TerseNode {
            node_type: node.node_type().into_owned(),
            children,
            text: node.text().into_owned(),
            is_error: node.is_error(),
            start_position: node.start_position(),
            end_position: node.end_position(),
        }
    })
}

/// Whether verbose mode keeps the text of a node of type `node_type`.
pub fn keeps_verbose_text(node_type: &str, text: &str) -> bool {
    let length = text_length(text);
    length < VERBOSE_TEXT_LIMIT
        || (node_type == COMMENT_NODE_TYPE && length < VERBOSE_COMMENT_TEXT_LIMIT)
}

/// Pretty-print a document with 2-space indentation.
pub fn to_pretty_json(node: &SerializedNode) -> serde_json::Result<String> {
    serde_json::to_string_pretty(node)
}

#[cfg(test)]
#[path = "serializer_tests.rs"]
mod tests;
