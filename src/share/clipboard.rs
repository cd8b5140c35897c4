//! Clipboard boundary for generated share links.

use crate::model::ClipboardError;
use std::io::Write;

/// Destination for a generated share link.
pub trait Clipboard {
    /// Replace the clipboard contents with `text`.
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard that writes each link as one line to an output stream.
///
/// Used by the CLI, where "copying" means printing for the user to pick up.
#[derive(Debug)]
pub struct WriterClipboard<W: Write> {
    writer: W,
}

impl<W: Write> WriterClipboard<W> {
    /// Wrap `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Clipboard for WriterClipboard<W> {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        writeln!(self.writer, "{text}").map_err(ClipboardError::new)?;
        self.writer.flush().map_err(ClipboardError::new)
    }
}
