//! Error Reporting Sink
//!
//! Breadcrumbs and captured errors emitted by recovery attempts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::recovery::types::{ClassifiableError, ErrorType, RecoveryAction};

/// Trail marker recorded on every recovery attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breadcrumb {
    pub category: &'static str,
    pub message: &'static str,
    pub error_type: ErrorType,
    pub attempt: u32,
    pub max_retries: u32,
    pub error_message: String,
    pub timestamp: DateTime<Utc>,
}

/// Context attached to a captured error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub component: &'static str,
    pub action: &'static str,
    pub error_type: ErrorType,
    pub strategy: Vec<RecoveryAction>,
    pub is_recoverable: bool,
}

/// Destination for recovery breadcrumbs and captured errors.
pub trait ErrorReporter: Send + Sync + std::fmt::Debug {
    fn add_breadcrumb(&self, breadcrumb: &Breadcrumb);

    fn capture_error(&self, error: &ClassifiableError, report: &ErrorReport);
}

/// Reports through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn add_breadcrumb(&self, breadcrumb: &Breadcrumb) {
        info!(
            category = breadcrumb.category,
            error_type = %breadcrumb.error_type,
            attempt = breadcrumb.attempt,
            max_retries = breadcrumb.max_retries,
            error_message = %breadcrumb.error_message,
            "{}",
            breadcrumb.message
        );
    }

    fn capture_error(&self, err: &ClassifiableError, report: &ErrorReport) {
        error!(
            component = report.component,
            action = report.action,
            error_type = %report.error_type,
            strategy = ?report.strategy,
            is_recoverable = report.is_recoverable,
            error = %err,
            "Captured error"
        );
    }
}
