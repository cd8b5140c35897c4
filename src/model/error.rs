//! Error types for tsviz.
//!
//! This module defines the user-facing error taxonomy using `thiserror`. Errors compose via
//! `?` and `From` conversions up to [`AppError`], which the CLI reports.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error for the binary
//!   - [`GrammarLoadError`] - A grammar could not be fetched or initialized
//!   - [`ShareError`] - Share link creation or loading failed
//!     - [`ConfigLoadError`] - A shared fragment could not be decoded
//!     - [`ClipboardError`] - The generated link could not be delivered
//!   - `std::io::Error` - Reading source input or writing output failed
//!
//! # Error Recovery Strategy
//!
//! - **GrammarLoadError**: surfaced to the user; the recompute is aborted and the previously
//!   rendered tree stays visible.
//! - **LinkTooLong**: surfaced to the user; no clipboard write happens.
//! - **ConfigLoadError**: logged and ignored; the session falls back to its defaults.
//! - **ClipboardError**: surfaced with the underlying reason.
//!
//! Serialization, graph projection and layout are total functions and have no error type.

use thiserror::Error;

/// Top-level error for the `tsviz` binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// The requested grammar could not be loaded, or the parser refused the input.
    #[error(transparent)]
    GrammarLoad(#[from] GrammarLoadError),

    /// Creating or loading a share link failed.
    #[error(transparent)]
    Share(#[from] ShareError),

    /// Configuration file could not be read or parsed.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// The tracing subscriber could not be installed.
    #[error(transparent)]
    Logging(#[from] crate::logging::LoggingError),

    /// A pre-parsed tree document could not be decoded.
    #[error("Invalid tree document: {0}")]
    TreeDocument(String),

    /// An output document could not be rendered as JSON.
    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),

    /// Reading input or writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while fetching or initializing a grammar, or running it over source text.
///
/// The recompute that hit this error is aborted; whatever was rendered before stays.
///
/// # Examples
///
/// ```
/// use tsviz::model::error::GrammarLoadError;
///
/// let err = GrammarLoadError::UnknownGrammar("klingon".to_string());
/// assert!(err.to_string().contains("klingon"));
/// ```
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GrammarLoadError {
    /// No grammar is registered under this identifier.
    #[error("Unknown grammar '{0}'")]
    UnknownGrammar(String),

    /// The grammar exists but the parser rejected it (ABI mismatch and similar).
    #[error("Grammar '{id}' could not be initialized: {reason}")]
    Incompatible {
        /// Grammar identifier.
        id: String,
        /// Reason reported by the parser runtime.
        reason: String,
    },

    /// The parser returned no tree for the input.
    #[error("Parsing with grammar '{id}' was aborted")]
    ParseAborted {
        /// Grammar identifier.
        id: String,
    },
}

/// Errors produced while creating or loading a share link.
#[derive(Debug, Error)]
pub enum ShareError {
    /// The full URL would exceed the cross-browser address-bar budget.
    ///
    /// Raised before any clipboard or navigation side effect.
    ///
    /// ```
    /// use tsviz::model::error::ShareError;
    ///
    /// let err = ShareError::LinkTooLong { length: 4096, limit: 2030 };
    /// assert_eq!(err.to_string(), "Link is too long to share! (4096 > 2030 characters)");
    /// ```
    #[error("Link is too long to share! ({length} > {limit} characters)")]
    LinkTooLong {
        /// Length of the URL that would have been produced.
        length: usize,
        /// Maximum accepted length.
        limit: usize,
    },

    /// The session state could not be serialized or compressed.
    #[error("Failed to encode share state: {0}")]
    Encode(String),

    /// A shared fragment could not be turned back into a session config.
    #[error(transparent)]
    ConfigLoad(#[from] ConfigLoadError),

    /// The generated link could not be written to the clipboard.
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

/// A shared link could not be decoded.
///
/// Callers must leave their existing state untouched when they see this error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigLoadError {
    /// The fragment is not valid base64.
    #[error("Error loading config: invalid base64: {0}")]
    Base64(String),

    /// The decoded bytes are not a valid compressed stream, or not UTF-8 once inflated.
    #[error("Error loading config: corrupt compressed payload: {0}")]
    Decompress(String),

    /// The inflated text is not JSON, or lacks `language`, `code` or `terse`.
    #[error("Error loading config: invalid JSON: {0}")]
    Json(String),
}

/// Failure to write a generated link to the system clipboard.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Failed to copy link to clipboard!: {reason}")]
pub struct ClipboardError {
    /// Underlying reason reported by the clipboard.
    pub reason: String,
}

impl ClipboardError {
    /// Build a clipboard error from any displayable cause.
    pub fn new(reason: impl std::fmt::Display) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}
