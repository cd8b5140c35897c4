//! tsviz - tree-sitter parse tree visualizer.
//!
//! Turns a concrete syntax tree into two views:
//!
//! - a JSON document, in a verbose (field-keyed) or terse (position-carrying)
//!   shape ([`serializer`]),
//! - a tidy-tree diagram with stable node ids and edge geometry ([`graph`],
//!   [`layout`]), navigated through a pan/zoom controller ([`viewport`]).
//!
//! Sessions can be shared as compact URL fragments ([`share`]). The
//! [`pipeline`] module ties editing, debouncing and re-rendering together;
//! [`grammars`] provides the tree-sitter backend.
//!
//! The core (`serializer`, `graph`, `layout`, `viewport`) is pure. I/O lives in
//! `config`, `logging`, `share::clipboard` and the binary.

pub mod config;
#[cfg(feature = "tree-sitter")]
pub mod grammars;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod serializer;
pub mod share;
pub mod viewport;

#[cfg(test)]
mod test_harness;
