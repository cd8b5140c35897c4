//! Domain model types (pure).
//!
//! Parse-tree abstractions, the share payload, the grammar catalog and the
//! error taxonomy.

pub mod error;
pub mod grammar;
pub mod parse_node;
pub mod share_config;
pub(crate) mod stack;
pub mod syntax_node;

// Re-export for convenience
pub use error::{AppError, ClipboardError, ConfigLoadError, GrammarLoadError, ShareError};
pub use grammar::GrammarCatalog;
pub use parse_node::{fold_tree, text_length, FoldedChild, ParseNode, Point, SyntaxTree};
pub use share_config::ShareConfig;
pub use syntax_node::SyntaxNode;
