//! Share-link codec.
//!
//! Session state travels in the URL fragment:
//!
//! ```text
//! <base url>#<base64(gzip(json))>
//! ```
//!
//! where the JSON document is `{"language": .., "code": .., "terse": ..}`.
//! Encoding refuses to produce URLs longer than [`MAX_URL_LENGTH`]; that check
//! runs before any clipboard write, so a rejected link leaves no trace.
//! Decoding is strict: anything malformed is a [`ConfigLoadError`] and the
//! caller keeps its current state.

pub mod clipboard;
pub mod compression;

pub use clipboard::{Clipboard, WriterClipboard};

use crate::model::{text_length, ConfigLoadError, ShareConfig, ShareError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, info, warn};

/// Longest URL accepted across common browsers' address bars.
pub const MAX_URL_LENGTH: usize = 2030;

/// Encode `config` into a fragment payload (without the leading `#`).
///
/// # Errors
///
/// Returns `ShareError::Encode` if the config cannot be serialized or compressed.
pub fn encode_fragment(config: &ShareConfig) -> Result<String, ShareError> {
    let json = serde_json::to_string(config).map_err(|e| ShareError::Encode(e.to_string()))?;
    let compressed =
        compression::compress(json.as_bytes()).map_err(|e| ShareError::Encode(e.to_string()))?;
    Ok(STANDARD.encode(compressed))
}

/// Build the full share URL `base_url#payload`.
///
/// # Errors
///
/// Returns `ShareError::LinkTooLong` if the URL would exceed [`MAX_URL_LENGTH`]
/// UTF-16 code units, or `ShareError::Encode` if encoding fails.
pub fn share_url(config: &ShareConfig, base_url: &str) -> Result<String, ShareError> {
    let fragment = encode_fragment(config)?;
    let url = format!("{}#{fragment}", strip_fragment(base_url));
    let length = text_length(&url);
    if length > MAX_URL_LENGTH {
        debug!(length, limit = MAX_URL_LENGTH, "Share link over budget");
        return Err(ShareError::LinkTooLong {
            length,
            limit: MAX_URL_LENGTH,
        });
    }
    Ok(url)
}

/// Build the share URL and hand it to `clipboard`.
///
/// The length check happens first; on `LinkTooLong` the clipboard is never touched.
///
/// # Errors
///
/// `ShareError::LinkTooLong`, `ShareError::Encode`, or `ShareError::Clipboard`
/// carrying the clipboard's reason.
pub fn share_link(
    config: &ShareConfig,
    base_url: &str,
    clipboard: &mut dyn Clipboard,
) -> Result<String, ShareError> {
    let url = share_url(config, base_url)?;
    clipboard.write_text(&url)?;
    info!(length = url.len(), "Link copied to clipboard");
    Ok(url)
}

/// Decode a fragment payload back into a config.
///
/// Accepts the payload with or without its leading `#`, and tolerates
/// surrounding whitespace.
///
/// # Errors
///
/// Returns `ConfigLoadError` for invalid base64, a corrupt or non-UTF-8
/// compressed stream, invalid JSON, or JSON missing `language`, `code` or `terse`.
pub fn decode(fragment: &str) -> Result<ShareConfig, ConfigLoadError> {
    let payload = fragment.trim();
    let payload = payload.strip_prefix('#').unwrap_or(payload);

    let compressed = STANDARD
        .decode(payload)
        .map_err(|e| ConfigLoadError::Base64(e.to_string()))?;
    let bytes = compression::decompress(&compressed)
        .map_err(|e| ConfigLoadError::Decompress(e.to_string()))?;
    let json = String::from_utf8(bytes).map_err(|e| ConfigLoadError::Decompress(e.to_string()))?;
    serde_json::from_str(&json).map_err(|e| ConfigLoadError::Json(e.to_string()))
}

/// Fragment part of `url` (after the first `#`), or `url` itself when it has none.
pub fn fragment_of(url: &str) -> &str {
    match url.split_once('#') {
        Some((_, fragment)) => fragment,
        None => url,
    }
}

/// Fail-soft loader for links opened by the user.
///
/// Returns `None` quietly for a URL without a fragment or with an empty one,
/// and `None` after logging why a fragment could not be decoded.
pub fn load_shared(url_or_fragment: &str) -> Option<ShareConfig> {
    let input = url_or_fragment.trim();
    if input.contains("://") && !input.contains('#') {
        return None;
    }
    let fragment = fragment_of(input);
    if fragment.is_empty() {
        return None;
    }
    match decode(fragment) {
        Ok(config) => {
            info!(language = %config.language, terse = config.terse, "Loaded shared session");
            Some(config)
        }
        Err(err) => {
            warn!(error = %err, "Ignoring shared link");
            None
        }
    }
}

fn strip_fragment(base_url: &str) -> &str {
    match base_url.split_once('#') {
        Some((base, _)) => base,
        None => base_url,
    }
}

#[cfg(test)]
#[path = "share_tests.rs"]
mod tests;
