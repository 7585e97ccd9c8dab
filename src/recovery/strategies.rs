//! Default recovery strategy table

use std::collections::HashMap;

use crate::recovery::types::{ErrorType, RecoveryAction, RecoveryStrategy};

fn strategy(
    error_type: ErrorType,
    max_retries: u32,
    retry_delay_ms: u64,
    actions: &[RecoveryAction],
    user_message: &str,
    technical_message: &str,
) -> RecoveryStrategy {
    RecoveryStrategy {
        error_type,
        max_retries,
        retry_delay_ms,
        actions: actions.to_vec(),
        user_message: user_message.to_string(),
        technical_message: technical_message.to_string(),
        is_recoverable: true,
    }
}

/// Builds the standard strategy for every error type.
pub fn default_strategies() -> HashMap<ErrorType, RecoveryStrategy> {
    use RecoveryAction as A;

    [
        strategy(
            ErrorType::CameraAccess,
            2,
            1_000,
            &[A::RequestPermission, A::SwitchMethod],
            "Camera access denied. Please enable camera permissions or use file upload instead.",
            "Camera acquisition failed: permission denied or device unavailable",
        ),
        strategy(
            ErrorType::FileUpload,
            3,
            500,
            &[A::ReduceQuality, A::Retry],
            "File upload failed. Please try a smaller file or different format.",
            "File upload error: size, format, or transport issue",
        ),
        strategy(
            ErrorType::ImageProcessing,
            2,
            1_000,
            &[A::ReduceQuality, A::SimplifyRequest, A::Retry],
            "Image processing failed. Trying with reduced quality.",
            "Image processing pipeline error",
        ),
        strategy(
            ErrorType::OcrExtraction,
            3,
            2_000,
            &[A::FallbackProvider, A::ReduceQuality, A::ManualInput],
            "Text extraction failed. Trying alternative method.",
            "OCR provider failure or image quality issue",
        ),
        strategy(
            ErrorType::Network,
            5,
            3_000,
            &[A::WaitAndRetry, A::FallbackProvider],
            "Network connection issue. Retrying...",
            "Network request failed: connectivity or server issue",
        ),
        strategy(
            ErrorType::RateLimit,
            3,
            60_000,
            &[A::WaitAndRetry, A::FallbackProvider],
            "Service temporarily busy. Please wait a moment.",
            "Rate limit exceeded: wait or switch provider",
        ),
        strategy(
            ErrorType::Quota,
            1,
            0,
            &[A::FallbackProvider, A::ManualInput],
            "Service quota exceeded. Switching to alternative method.",
            "API quota exceeded: fallback provider required",
        ),
        strategy(
            ErrorType::Timeout,
            2,
            5_000,
            &[A::SimplifyRequest, A::ReduceQuality, A::Retry],
            "Request timed out. Trying with simplified processing.",
            "Request timeout: reduce complexity or retry",
        ),
        strategy(
            ErrorType::Storage,
            3,
            1_000,
            &[A::ClearCache, A::Retry],
            "Storage error. Clearing cache and retrying.",
            "Storage operation failed: cache or database issue",
        ),
        strategy(
            ErrorType::Permission,
            1,
            0,
            &[A::RequestPermission, A::SwitchMethod],
            "Permission required. Please grant access or use alternative method.",
            "Permission denied: user authorization required",
        ),
        strategy(
            ErrorType::Unknown,
            2,
            2_000,
            &[A::Retry, A::ManualInput],
            "An unexpected error occurred. Please try again.",
            "Unclassified error: generic retry strategy",
        ),
    ]
    .into_iter()
    .map(|s| (s.error_type, s))
    .collect()
}
