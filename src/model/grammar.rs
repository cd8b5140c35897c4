//! Grammar catalog.

/// The enumerable set of grammar identifiers a backend can serve.
///
/// The catalog is opaque data for display and membership checks; whether a
/// grammar actually loads is decided by the backend at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrammarCatalog {
    ids: Vec<String>,
}

impl GrammarCatalog {
    /// Build a catalog from identifiers, keeping first-seen order and dropping duplicates.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self::default();
        for id in ids {
            let id = id.into();
            if !catalog.contains(&id) {
                catalog.ids.push(id);
            }
        }
        catalog
    }

    /// Whether `id` is part of the catalog.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }

    /// Identifiers in display order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Number of grammars.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when no grammar is available.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
