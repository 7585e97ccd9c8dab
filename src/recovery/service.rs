//! Error Recovery Service
//!
//! Classifies failures, tracks retries per error type and operation, and
//! walks a strategy's actions until one succeeds.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::recovery::classify::classify;
use crate::recovery::handlers::{DefaultActionHandler, RecoveryActionHandler};
use crate::recovery::reporter::{Breadcrumb, ErrorReport, ErrorReporter, TracingReporter};
use crate::recovery::strategies::default_strategies;
use crate::recovery::types::{
    ClassifiableError, ErrorType, RecoveryAction, RecoveryContext, RecoveryOutcome,
    RecoveryResult, RecoveryStrategy,
};

const FALLBACK_USER_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Stateful recovery coordinator.
///
/// Retry counters are keyed by `"<error type>_<operation>"`. A counter is
/// removed when an action succeeds or when retries run out.
#[derive(Debug)]
pub struct ErrorRecoveryService {
    strategies: HashMap<ErrorType, RecoveryStrategy>,
    retry_attempts: Mutex<HashMap<String, u32>>,
    handler: Arc<dyn RecoveryActionHandler>,
    reporter: Arc<dyn ErrorReporter>,
}

impl Default for ErrorRecoveryService {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            retry_attempts: Mutex::new(HashMap::new()),
            handler: Arc::new(DefaultActionHandler::default()),
            reporter: Arc::new(TracingReporter),
        }
    }
}

impl ErrorRecoveryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the strategy table.
    pub fn with_strategies(mut self, strategies: HashMap<ErrorType, RecoveryStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_handler(mut self, handler: Arc<dyn RecoveryActionHandler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn classify_error(&self, error: &ClassifiableError) -> ErrorType {
        classify(error)
    }

    pub fn get_recovery_strategy(&self, error_type: ErrorType) -> Option<&RecoveryStrategy> {
        self.strategies.get(&error_type)
    }

    /// Runs one recovery attempt for `error`.
    ///
    /// Each call consumes a retry for the error's type and operation. Once
    /// `max_retries` calls have been made the next call reports exhaustion
    /// and resets the counter.
    pub async fn attempt_recovery(
        &self,
        error: &ClassifiableError,
        context: &RecoveryContext,
    ) -> RecoveryResult {
        let error_type = self.classify_error(error);
        let Some(strategy) = self
            .strategies
            .get(&error_type)
            .filter(|strategy| strategy.is_recoverable)
        else {
            debug!(%error_type, "No recoverable strategy");
            return RecoveryResult {
                outcome: RecoveryOutcome::NotRecoverable,
                action: RecoveryAction::None,
                message: "Error is not recoverable".to_string(),
                should_retry: false,
                retry_delay_ms: None,
                directive: None,
            };
        };

        let key = retry_key(error_type, context.operation_name());
        let Some(attempt) = self.next_attempt(&key, strategy.max_retries) else {
            info!(%error_type, operation = context.operation_name(), "Max retries exceeded");
            return RecoveryResult {
                outcome: RecoveryOutcome::RetriesExhausted,
                action: RecoveryAction::None,
                message: "Maximum retry attempts exceeded".to_string(),
                should_retry: false,
                retry_delay_ms: None,
                directive: None,
            };
        };

        info!(
            %error_type,
            operation = context.operation_name(),
            attempt,
            max_retries = strategy.max_retries,
            "Attempting recovery"
        );
        self.report(error, strategy, attempt);

        for &action in &strategy.actions {
            match self.handler.execute(action, context, strategy).await {
                Ok(result) if result.success() => {
                    self.lock_attempts().remove(&key);
                    return result;
                }
                Ok(result) => {
                    debug!(?action, message = %result.message, "Recovery action did not succeed");
                }
                Err(e) => {
                    warn!(?action, error = %e, "Recovery action failed");
                }
            }
        }

        RecoveryResult {
            outcome: RecoveryOutcome::ActionsFailed,
            action: RecoveryAction::Retry,
            message: strategy.user_message.clone(),
            should_retry: attempt < strategy.max_retries,
            retry_delay_ms: Some(strategy.retry_delay_ms),
            directive: None,
        }
    }

    pub fn is_recoverable(&self, error: &ClassifiableError) -> bool {
        self.strategies
            .get(&self.classify_error(error))
            .is_some_and(|strategy| strategy.is_recoverable)
    }

    /// User-facing message for an error's classification.
    pub fn get_user_message(&self, error: &ClassifiableError) -> String {
        self.strategies
            .get(&self.classify_error(error))
            .map(|strategy| strategy.user_message.clone())
            .unwrap_or_else(|| FALLBACK_USER_MESSAGE.to_string())
    }

    /// Drops every retry counter whose key contains `operation`.
    pub fn reset_retry_attempts(&self, operation: &str) {
        self.lock_attempts().retain(|key, _| !key.contains(operation));
    }

    pub fn get_retry_count(&self, error_type: ErrorType, operation: &str) -> u32 {
        self.lock_attempts()
            .get(&retry_key(error_type, operation))
            .copied()
            .unwrap_or(0)
    }

    /// Returns the 1-based attempt number, or `None` after resetting an
    /// exhausted counter.
    fn next_attempt(&self, key: &str, max_retries: u32) -> Option<u32> {
        let mut attempts = self.lock_attempts();
        let current = attempts.get(key).copied().unwrap_or(0);
        if current >= max_retries {
            attempts.remove(key);
            return None;
        }
        attempts.insert(key.to_string(), current + 1);
        Some(current + 1)
    }

    fn report(&self, error: &ClassifiableError, strategy: &RecoveryStrategy, attempt: u32) {
        self.reporter.add_breadcrumb(&Breadcrumb {
            category: "error-recovery",
            message: "Attempting error recovery",
            error_type: strategy.error_type,
            attempt,
            max_retries: strategy.max_retries,
            error_message: error.message.clone(),
            timestamp: Utc::now(),
        });

        if attempt == 1 {
            self.reporter.capture_error(
                error,
                &ErrorReport {
                    component: "document-scanner",
                    action: "error-recovery",
                    error_type: strategy.error_type,
                    strategy: strategy.actions.clone(),
                    is_recoverable: strategy.is_recoverable,
                },
            );
        }
    }

    fn lock_attempts(&self) -> MutexGuard<'_, HashMap<String, u32>> {
        self.retry_attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn retry_key(error_type: ErrorType, operation: &str) -> String {
    format!("{}_{}", error_type, operation)
}
