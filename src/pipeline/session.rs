//! Parser session: the backend seam and a per-session grammar cache.

use crate::model::{GrammarCatalog, GrammarLoadError, SyntaxTree};
use std::collections::HashMap;
use tracing::{debug, info};

/// A grammar-driven parser runtime.
///
/// Implementations resolve grammar ids to loaded languages and run them over
/// source text. Loading may be slow (e.g. fetching a compiled grammar), which
/// is why [`ParserSession`] caches the results.
pub trait LanguageBackend {
    /// A loaded, ready-to-use grammar.
    type Language: Clone;

    /// A parsed tree.
    type Tree: SyntaxTree;

    /// Load the grammar registered under `id`.
    fn load_language(&mut self, id: &str) -> Result<Self::Language, GrammarLoadError>;

    /// Parse `source` with `language`.
    fn parse(
        &mut self,
        language: &Self::Language,
        source: &str,
    ) -> Result<Self::Tree, GrammarLoadError>;

    /// Ids of every grammar this backend can load.
    fn catalog(&self) -> GrammarCatalog;
}

/// A backend plus the grammars loaded so far in this session.
///
/// The first request for an id calls [`LanguageBackend::load_language`]; later
/// requests are served from the cache. Failed loads are not cached, so a
/// retry reaches the backend again.
pub struct ParserSession<B: LanguageBackend> {
    backend: B,
    cache: HashMap<String, B::Language>,
    active: Option<String>,
}

impl<B: LanguageBackend> ParserSession<B> {
    /// Start a session with an empty cache.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cache: HashMap::new(),
            active: None,
        }
    }

    /// The loaded grammar for `id`, loading it on first use.
    pub fn language(&mut self, id: &str) -> Result<B::Language, GrammarLoadError> {
        if let Some(language) = self.cache.get(id) {
            debug!(grammar = id, "Grammar cache hit");
            return Ok(language.clone());
        }
        let language = self.backend.load_language(id)?;
        info!(grammar = id, "Loaded grammar");
        self.cache.insert(id.to_string(), language.clone());
        Ok(language)
    }

    /// Parse `source` with the grammar `id`, making it the active grammar.
    pub fn parse(&mut self, id: &str, source: &str) -> Result<B::Tree, GrammarLoadError> {
        let language = self.language(id)?;
        self.active = Some(id.to_string());
        self.backend.parse(&language, source)
    }

    /// Grammar of the most recent parse request whose grammar loaded.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Whether `id` is already loaded.
    pub fn is_cached(&self, id: &str) -> bool {
        self.cache.contains_key(id)
    }

    /// Number of loaded grammars.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Ids the backend can load.
    pub fn catalog(&self) -> GrammarCatalog {
        self.backend.catalog()
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}
