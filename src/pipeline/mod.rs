//! Recompute pipeline.
//!
//! - [`debounce`] - quiet-window debouncing of editor changes
//! - [`session`] - the parser backend seam and grammar cache
//! - [`workbench`] - editor state, recompute loop and rendered snapshot

pub mod debounce;
pub mod session;
pub mod workbench;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use session::{LanguageBackend, ParserSession};
pub use workbench::{Rendered, SourceState, TickOutcome, Workbench, DEFAULT_VIEWPORT, EMPTY_TEXT};
