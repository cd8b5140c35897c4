//! Session state carried by a share link.

use serde::{Deserialize, Serialize};

/// The part of a session that survives a share link: grammar, source and
/// output mode. Viewport state is deliberately not part of it.
///
/// Serialized with exactly the keys `language`, `code` and `terse`; all three
/// are required when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Grammar identifier.
    pub language: String,
    /// Source text.
    pub code: String,
    /// Whether the text panel shows the terse (machine-friendly) serialization.
    pub terse: bool,
}

impl ShareConfig {
    /// Create a share config.
    pub fn new(language: impl Into<String>, code: impl Into<String>, terse: bool) -> Self {
        Self {
            language: language.into(),
            code: code.into(),
            terse,
        }
    }
}
