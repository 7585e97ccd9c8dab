//! OCR result model

use serde::{Deserialize, Serialize};

/// OCR backend that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrProvider {
    OpenAI,
    Qwen,
    Azure,
    Tesseract,
}

/// Rectangle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A recognized span of text with its location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    pub bounds: Bounds,
    /// Confidence in 0.0..=1.0
    pub confidence: f64,
}

/// Output of a single OCR extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrResult {
    /// Full recognized text
    pub text: String,
    /// Confidence in 0.0..=1.0
    pub confidence: f64,
    /// Provider used
    pub provider: OcrProvider,
    /// Wall time spent by the provider in milliseconds
    pub processing_time: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<TextBlock>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ocr_result_wire_names() {
        let result = OcrResult {
            text: "Invoice 42".to_string(),
            confidence: 0.9,
            provider: OcrProvider::OpenAI,
            processing_time: 1500,
            blocks: Vec::new(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["provider"], "openai");
        assert_eq!(json["processingTime"], 1500);
        assert!(json.get("blocks").is_none());
    }
}
