//! Binary encoding of styled content
//!
//! The encoding is the persistence format for version content and for
//! rich-content snapshots inside serialized commands. A plain-text shadow
//! travels next to the bytes for search and diagnostics; the bytes are the
//! source of truth.

use crate::{DocModelError, DocumentContent, Result};

/// Header identifying the content encoding
pub const CONTENT_MAGIC: &[u8; 4] = b"RTC1";

/// Encodes styled content to bytes and back
pub trait ContentCodec: Send + Sync {
    fn encode(&self, content: &DocumentContent) -> Result<Vec<u8>>;

    fn decode(&self, bytes: &[u8], plain_text_shadow: &str) -> Result<DocumentContent>;
}

/// Default codec: a magic header followed by a JSON body
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryContentCodec;

impl ContentCodec for BinaryContentCodec {
    fn encode(&self, content: &DocumentContent) -> Result<Vec<u8>> {
        let mut bytes = CONTENT_MAGIC.to_vec();
        serde_json::to_writer(&mut bytes, content)
            .map_err(|e| DocModelError::CorruptEncoding(e.to_string()))?;
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8], plain_text_shadow: &str) -> Result<DocumentContent> {
        let body = bytes
            .strip_prefix(CONTENT_MAGIC.as_slice())
            .ok_or_else(|| DocModelError::CorruptEncoding("missing content header".to_string()))?;

        let content: DocumentContent = serde_json::from_slice(body)
            .map_err(|e| DocModelError::CorruptEncoding(e.to_string()))?;
        let content = content
            .into_canonical()
            .map_err(|e| DocModelError::CorruptEncoding(e.to_string()))?;

        if !plain_text_shadow.is_empty() && plain_text_shadow != content.text() {
            tracing::warn!(
                "Plain-text shadow disagrees with encoded content ({} vs {} codepoints)",
                plain_text_shadow.chars().count(),
                content.len()
            );
        }

        Ok(content)
    }
}
