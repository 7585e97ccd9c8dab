//! Error Classification
//!
//! Maps a failure to an `ErrorType`: structured code first, then ordered
//! keyword rules over the lowercased message.

use crate::recovery::types::{ClassifiableError, ErrorType};

/// Keyword rules in priority order. The first rule with any keyword contained
/// in the message wins.
pub const KEYWORD_RULES: &[(ErrorType, &[&str])] = &[
    (ErrorType::CameraAccess, &["camera", "getusermedia", "notallowederror"]),
    (ErrorType::Permission, &["permission", "denied", "unauthorized"]),
    (ErrorType::Network, &["network", "fetch", "connection"]),
    (ErrorType::Storage, &["storage", "database", "save"]),
    (ErrorType::Timeout, &["timeout", "timed out"]),
    (ErrorType::Quota, &["quota", "limit exceeded"]),
    (ErrorType::RateLimit, &["rate limit", "too many requests"]),
    (ErrorType::OcrExtraction, &["ocr", "extract", "text"]),
    (ErrorType::FileUpload, &["file", "upload", "size"]),
    (ErrorType::ImageProcessing, &["processing", "canvas", "image"]),
];

/// Classifies an error. Never fails; unmatched input is `Unknown`.
pub fn classify(error: &ClassifiableError) -> ErrorType {
    if let Some(code) = error.code {
        return code.error_type();
    }

    let message = error.message.to_lowercase();
    KEYWORD_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| message.contains(kw)))
        .map(|(error_type, _)| *error_type)
        .unwrap_or(ErrorType::Unknown)
}
