//! tree-sitter parser backend.
//!
//! Grammars are registered as [`tree_sitter::Language`] values keyed by id.
//! The `inference` grammar ships with the crate; hosts may register more with
//! [`TreeSitterBackend::register`].

use crate::model::{GrammarCatalog, GrammarLoadError, ParseNode, Point, SyntaxTree};
use crate::pipeline::LanguageBackend;
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::debug;

/// Id of the grammar bundled through `tree-sitter-inference`.
pub const INFERENCE_GRAMMAR: &str = "inference";

/// A grammar that passed the parser's ABI check.
#[derive(Clone)]
pub struct LoadedGrammar {
    id: String,
    language: tree_sitter::Language,
}

impl LoadedGrammar {
    /// Grammar id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl std::fmt::Debug for LoadedGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedGrammar").field("id", &self.id).finish()
    }
}

/// Registry of tree-sitter grammars plus a reusable parser.
pub struct TreeSitterBackend {
    parser: tree_sitter::Parser,
    registry: BTreeMap<String, tree_sitter::Language>,
}

impl TreeSitterBackend {
    /// Backend with no grammars registered.
    pub fn new() -> Self {
        Self {
            parser: tree_sitter::Parser::new(),
            registry: BTreeMap::new(),
        }
    }

    /// Backend with the bundled grammars registered.
    pub fn with_bundled() -> Self {
        let mut backend = Self::new();
        backend.register(INFERENCE_GRAMMAR, tree_sitter_inference::language());
        backend
    }

    /// Register `language` under `id`, replacing any previous registration.
    pub fn register(&mut self, id: impl Into<String>, language: tree_sitter::Language) {
        self.registry.insert(id.into(), language);
    }
}

impl Default for TreeSitterBackend {
    fn default() -> Self {
        Self::with_bundled()
    }
}

impl LanguageBackend for TreeSitterBackend {
    type Language = LoadedGrammar;
    type Tree = TsTree;

    fn load_language(&mut self, id: &str) -> Result<LoadedGrammar, GrammarLoadError> {
        let language = self
            .registry
            .get(id)
            .cloned()
            .ok_or_else(|| GrammarLoadError::UnknownGrammar(id.to_string()))?;
        self.parser
            .set_language(&language)
            .map_err(|e| GrammarLoadError::Incompatible {
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        debug!(grammar = id, "Grammar passed ABI check");
        Ok(LoadedGrammar {
            id: id.to_string(),
            language,
        })
    }

    fn parse(&mut self, grammar: &LoadedGrammar, source: &str) -> Result<TsTree, GrammarLoadError> {
        self.parser
            .set_language(&grammar.language)
            .map_err(|e| GrammarLoadError::Incompatible {
                id: grammar.id.clone(),
                reason: e.to_string(),
            })?;
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| GrammarLoadError::ParseAborted {
                id: grammar.id.clone(),
            })?;
        Ok(TsTree {
            tree,
            source: source.to_string(),
        })
    }

    fn catalog(&self) -> GrammarCatalog {
        GrammarCatalog::new(self.registry.keys().cloned())
    }
}

/// A tree-sitter tree together with the text it was parsed from.
#[derive(Debug, Clone)]
pub struct TsTree {
    tree: tree_sitter::Tree,
    source: String,
}

impl TsTree {
    /// Source text the tree covers.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl SyntaxTree for TsTree {
    type Node<'a> = TsNode<'a>;

    fn root(&self) -> TsNode<'_> {
        TsNode {
            node: self.tree.root_node(),
            source: &self.source,
        }
    }
}

/// A tree-sitter node handle paired with its source text.
#[derive(Debug, Clone, Copy)]
pub struct TsNode<'a> {
    node: tree_sitter::Node<'a>,
    source: &'a str,
}

fn point(p: tree_sitter::Point) -> Point {
    Point::new(p.row, p.column)
}

impl ParseNode for TsNode<'_> {
    fn node_type(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.node.kind())
    }

    fn start_byte(&self) -> usize {
        self.node.start_byte()
    }

    fn end_byte(&self) -> usize {
        self.node.end_byte()
    }

    fn start_position(&self) -> Point {
        point(self.node.start_position())
    }

    fn end_position(&self) -> Point {
        point(self.node.end_position())
    }

    fn is_error(&self) -> bool {
        self.node.is_error()
    }

    fn child_count(&self) -> usize {
        self.node.child_count()
    }

    fn child(&self, index: usize) -> Option<Self> {
        let node = self.node.child(index.try_into().ok()?)?;
        Some(Self {
            node,
            source: self.source,
        })
    }

    fn field_name_for_child(&self, index: usize) -> Option<Cow<'_, str>> {
        self.node
            .field_name_for_child(index.try_into().ok()?)
            .map(Cow::Borrowed)
    }

    fn text(&self) -> Cow<'_, str> {
        let text = self
            .node
            .utf8_text(self.source.as_bytes())
            .unwrap_or_default();
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph;
    use crate::pipeline::ParserSession;
    use crate::serializer::{self, SerializeMode, SerializedNode};

    const FUNCTION: &str = "fn func1() -> i32 {return 1;}";

    fn parse(source: &str) -> TsTree {
        let mut backend = TreeSitterBackend::with_bundled();
        let grammar = backend.load_language(INFERENCE_GRAMMAR).unwrap();
        backend.parse(&grammar, source).unwrap()
    }

    #[test]
    fn bundled_catalog_lists_inference() {
        let backend = TreeSitterBackend::with_bundled();
        assert!(backend.catalog().contains("inference"));
        assert!(TreeSitterBackend::new().catalog().is_empty());
    }

    #[test]
    fn unknown_grammar_is_rejected() {
        let mut backend = TreeSitterBackend::with_bundled();
        let err = backend.load_language("klingon").unwrap_err();
        assert_eq!(err, GrammarLoadError::UnknownGrammar("klingon".to_string()));
    }

    #[test]
    fn parses_function_definition() {
        let tree = parse(FUNCTION);
        let root = tree.root();
        assert_eq!(root.node_type(), "source_file");
        assert_eq!(root.start_byte(), 0);
        assert_eq!(root.end_byte(), FUNCTION.len());
        assert_eq!(root.text(), FUNCTION);

        let function = root.child(0).unwrap();
        assert_eq!(function.node_type(), "function_definition");
        assert!(!function.is_error());
    }

    #[test]
    fn children_lie_within_parent_span() {
        let tree = parse(FUNCTION);
        let mut stack = vec![tree.root()];
        while let Some(node) = stack.pop() {
            for index in 0..node.child_count() {
                let child = node.child(index).unwrap();
                assert!(child.start_byte() >= node.start_byte());
                assert!(child.end_byte() <= node.end_byte());
                stack.push(child);
            }
        }
    }

    #[test]
    fn projected_ids_are_unique() {
        let tree = parse(FUNCTION);
        let graph = graph::project(Some(&tree.root()));
        assert!(graph::duplicate_ids(&graph).is_empty());
        assert_eq!(graph.id.as_str(), format!("source_file!{}", FUNCTION.len()));
    }

    #[test]
    fn verbose_serialization_names_fields() {
        let tree = parse(FUNCTION);
        let SerializedNode::Verbose(root) =
            serializer::serialize(&tree.root(), SerializeMode::Verbose)
        else {
            panic!("verbose mode yields a verbose document");
        };
        let function = root.children.as_ref().unwrap().get("child_0").unwrap();
        assert_eq!(function.node_type, "function_definition");
        assert!(function.children.as_ref().unwrap().get("name").is_some());
    }

    #[test]
    fn broken_source_still_parses() {
        let tree = parse("fn (");
        assert!(tree.root().child_count() > 0);
    }

    #[test]
    fn session_caches_bundled_grammar() {
        let mut session = ParserSession::new(TreeSitterBackend::with_bundled());
        session.parse(INFERENCE_GRAMMAR, FUNCTION).unwrap();
        session.parse(INFERENCE_GRAMMAR, "").unwrap();
        assert!(session.is_cached(INFERENCE_GRAMMAR));
        assert_eq!(session.cached_count(), 1);
    }

    fn nested_return(depth: usize) -> String {
        format!(
            "fn f() -> i32 {{ return {}1{}; }}",
            "(".repeat(depth),
            ")".repeat(depth)
        )
    }

    #[test]
    fn deeply_nested_source_serializes_in_verbose_mode() {
        let tree = parse(&nested_return(50_000));
        let document = serializer::serialize_verbose(&tree.root());
        assert_eq!(document.node_type, "source_file");

        let json = serde_json::to_string(&document).unwrap();
        assert!(json.matches("\"type\"").count() > 50_000);
    }

    #[test]
    fn deeply_nested_source_projects_lays_out_and_serializes_tersely() {
        // Terse and graph text copy every span, so memory grows with depth squared
        let tree = parse(&nested_return(5_000));

        let projected = graph::project(Some(&tree.root()));
        assert!(projected.node_count() > 5_000);
        assert!(serde_json::to_string(&projected).is_ok());

        let placed = crate::layout::layout(&projected, 800.0, 600.0);
        assert_eq!(placed.nodes.len(), projected.node_count());

        let document = serializer::serialize_terse(&tree.root());
        let json = serde_json::to_string(&document).unwrap();
        assert_eq!(
            json.matches("\"isError\"").count(),
            projected.node_count()
        );
    }
}
