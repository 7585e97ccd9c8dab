//! Payload models for cached scanner artifacts
//!
//! These are the shapes the upstream OCR and document pipelines hand to the
//! cache. The cache itself only requires them to be serializable.

pub mod document;
pub mod ocr;

// Re-export commonly used types
pub use document::{DocumentStatus, FileRef, ProcessedDocument};
pub use ocr::{Bounds, OcrProvider, OcrResult, TextBlock};
