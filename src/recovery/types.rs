//! Recovery Types
//!
//! Error classifications, recovery actions, strategies and the result handed
//! back to callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// == Error Type ==
/// Closed classification of scanner failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    CameraAccess,
    FileUpload,
    ImageProcessing,
    OcrExtraction,
    Network,
    Storage,
    Permission,
    Quota,
    RateLimit,
    Timeout,
    Unknown,
}

impl ErrorType {
    pub const ALL: [ErrorType; 11] = [
        ErrorType::CameraAccess,
        ErrorType::FileUpload,
        ErrorType::ImageProcessing,
        ErrorType::OcrExtraction,
        ErrorType::Network,
        ErrorType::Storage,
        ErrorType::Permission,
        ErrorType::Quota,
        ErrorType::RateLimit,
        ErrorType::Timeout,
        ErrorType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::CameraAccess => "camera_access",
            ErrorType::FileUpload => "file_upload",
            ErrorType::ImageProcessing => "image_processing",
            ErrorType::OcrExtraction => "ocr_extraction",
            ErrorType::Network => "network",
            ErrorType::Storage => "storage",
            ErrorType::Permission => "permission",
            ErrorType::Quota => "quota",
            ErrorType::RateLimit => "rate_limit",
            ErrorType::Timeout => "timeout",
            ErrorType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Error Code ==
/// Structured codes reported by OCR providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    RateLimited,
    QuotaExceeded,
    Timeout,
    ProviderUnavailable,
    ExtractionFailed,
    NetworkError,
}

impl ErrorCode {
    /// The classification a code maps to.
    pub fn error_type(&self) -> ErrorType {
        match self {
            ErrorCode::RateLimited => ErrorType::RateLimit,
            ErrorCode::QuotaExceeded => ErrorType::Quota,
            ErrorCode::Timeout => ErrorType::Timeout,
            ErrorCode::ProviderUnavailable | ErrorCode::ExtractionFailed => {
                ErrorType::OcrExtraction
            }
            ErrorCode::NetworkError => ErrorType::Network,
        }
    }
}

/// Unrecognised provider error code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code: {0}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RATE_LIMITED" => Ok(ErrorCode::RateLimited),
            "QUOTA_EXCEEDED" => Ok(ErrorCode::QuotaExceeded),
            "TIMEOUT" => Ok(ErrorCode::Timeout),
            "PROVIDER_UNAVAILABLE" => Ok(ErrorCode::ProviderUnavailable),
            "EXTRACTION_FAILED" => Ok(ErrorCode::ExtractionFailed),
            "NETWORK_ERROR" => Ok(ErrorCode::NetworkError),
            other => Err(UnknownErrorCode(other.to_string())),
        }
    }
}

// == Classifiable Error ==
/// A failure as seen by the recovery service: a message and maybe a code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiableError {
    pub message: String,
    pub code: Option<ErrorCode>,
}

impl ClassifiableError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Captures the display message of any error.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        Self::new(err.to_string())
    }
}

impl fmt::Display for ClassifiableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} ({:?})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ClassifiableError {}

// == Recovery Action ==
/// Something a caller can do to get past a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    Retry,
    FallbackProvider,
    ReduceQuality,
    SimplifyRequest,
    ManualInput,
    SwitchMethod,
    WaitAndRetry,
    ClearCache,
    RequestPermission,
    None,
}

// == Recovery Strategy ==
/// Static recovery policy for one error type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryStrategy {
    pub error_type: ErrorType,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// Tried in order until one succeeds
    pub actions: Vec<RecoveryAction>,
    pub user_message: String,
    pub technical_message: String,
    pub is_recoverable: bool,
}

// == Recovery Context ==
/// Guarded resources the permission action can try to (re-)acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionKind {
    Camera,
}

/// Caller-supplied details about the failed operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryContext {
    /// Operation name used to key retry counters
    pub operation: Option<String>,
    /// Resource to request when the strategy asks for permission
    pub permission: Option<PermissionKind>,
}

impl RecoveryContext {
    pub fn for_operation(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            permission: None,
        }
    }

    pub fn with_permission(mut self, permission: PermissionKind) -> Self {
        self.permission = Some(permission);
        self
    }

    pub fn operation_name(&self) -> &str {
        self.operation.as_deref().unwrap_or("unknown")
    }
}

// == Recovery Result ==
/// How a recovery attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryOutcome {
    /// An action succeeded
    Recovered,
    /// The error type has no recoverable strategy
    NotRecoverable,
    /// The operation already used all its retries; the counter was reset
    RetriesExhausted,
    /// Every action failed; the caller may retry later
    ActionsFailed,
}

/// What the caller should change before retrying.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecoveryDirective {
    FallbackProvider,
    ReduceQuality { quality_reduction: f64 },
    Simplify { disable_table_detection: bool, reduce_timeout: bool },
    ManualInput,
    SwitchToUpload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryResult {
    pub outcome: RecoveryOutcome,
    pub action: RecoveryAction,
    pub message: String,
    pub should_retry: bool,
    pub retry_delay_ms: Option<u64>,
    pub directive: Option<RecoveryDirective>,
}

impl RecoveryResult {
    /// A successful action.
    pub fn recovered(
        action: RecoveryAction,
        message: impl Into<String>,
        should_retry: bool,
    ) -> Self {
        Self {
            outcome: RecoveryOutcome::Recovered,
            action,
            message: message.into(),
            should_retry,
            retry_delay_ms: None,
            directive: None,
        }
    }

    /// An action that ran but did not help.
    pub fn failed(action: RecoveryAction, message: impl Into<String>) -> Self {
        Self {
            outcome: RecoveryOutcome::ActionsFailed,
            action,
            message: message.into(),
            should_retry: false,
            retry_delay_ms: None,
            directive: None,
        }
    }

    pub fn with_delay(mut self, retry_delay_ms: u64) -> Self {
        self.retry_delay_ms = Some(retry_delay_ms);
        self
    }

    pub fn with_directive(mut self, directive: RecoveryDirective) -> Self {
        self.directive = Some(directive);
        self
    }

    pub fn success(&self) -> bool {
        self.outcome == RecoveryOutcome::Recovered
    }
}
