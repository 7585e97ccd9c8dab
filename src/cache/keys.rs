//! Cache Key Module
//!
//! Derives stable cache keys from the semantically relevant inputs of an
//! expensive operation.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Marker used when options are absent.
const DEFAULT_DIGEST: &str = "default";

/// Marker used when options cannot be serialized.
const RAW_DIGEST: &str = "raw";

// == Content Info ==
/// Identity of an input image or file: its byte size and MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentInfo {
    pub size: u64,
    pub mime_type: String,
}

impl ContentInfo {
    pub fn new(size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            size,
            mime_type: mime_type.into(),
        }
    }

    /// Describes an in-memory buffer.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self::new(bytes.len() as u64, mime_type)
    }

    fn tag(&self) -> String {
        format!("{}_{}", self.size, self.mime_type)
    }
}

// == Key Generators ==
/// Key for an OCR extraction of `content` under `options`.
///
/// Pass `&()` when there are no options.
pub fn ocr_key<O: Serialize + ?Sized>(content: &ContentInfo, options: &O) -> String {
    format!("ocr_{}_{}", content.tag(), options_digest(options))
}

/// Key for a processed document version.
pub fn document_key(document_id: &str, version: Option<&str>) -> String {
    format!("doc_{}_{}", document_id, version.unwrap_or("latest"))
}

/// Key for an image transform, namespaced by operation.
pub fn image_processing_key<P: Serialize + ?Sized>(
    content: &ContentInfo,
    operation: &str,
    params: &P,
) -> String {
    format!("img_{}_{}_{}", operation, content.tag(), options_digest(params))
}

// == Digest ==
/// Short digest of the canonical JSON form of `options`.
///
/// Objects serialize with sorted keys, so field order never changes the digest.
fn options_digest<O: Serialize + ?Sized>(options: &O) -> String {
    let value = match serde_json::to_value(options) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Options not serializable, using coarse cache key");
            return RAW_DIGEST.to_string();
        }
    };

    if value.is_null() {
        return DEFAULT_DIGEST.to_string();
    }

    digest_value(&value)
}

fn digest_value(value: &Value) -> String {
    let canonical = value.to_string();
    let hash = Sha256::digest(canonical.as_bytes());
    hex::encode(&hash[..8])
}
