//! Recovery Action Handlers
//!
//! Executes individual recovery actions. Handlers report failure either as a
//! non-recovered result or as an error; the service treats both the same.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::cache::{KeyValueStore, ResultCacheService};
use crate::error::RecoveryError;
use crate::recovery::types::{
    PermissionKind, RecoveryAction, RecoveryContext, RecoveryDirective, RecoveryResult,
    RecoveryStrategy,
};

/// Store keys containing any of these belong to the scanner.
const SCANNER_KEY_MARKERS: [&str; 2] = ["scanner", "ocr"];

/// Share of image quality dropped by the reduce-quality action.
const QUALITY_REDUCTION: f64 = 0.3;

// == Permission Gate ==
/// Acquires a hardware- or user-guarded resource.
#[async_trait]
pub trait PermissionGate: Send + Sync + std::fmt::Debug {
    /// Succeeds only if the resource was actually acquired.
    async fn acquire(&self, permission: PermissionKind) -> Result<(), RecoveryError>;
}

/// Gate for hosts with no guarded resources. Every request fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableGate;

#[async_trait]
impl PermissionGate for UnavailableGate {
    async fn acquire(&self, _permission: PermissionKind) -> Result<(), RecoveryError> {
        Err(RecoveryError::PermissionUnsupported)
    }
}

// == Action Handler ==
/// Executes one recovery action for a strategy.
#[async_trait]
pub trait RecoveryActionHandler: Send + Sync + std::fmt::Debug {
    async fn execute(
        &self,
        action: RecoveryAction,
        context: &RecoveryContext,
        strategy: &RecoveryStrategy,
    ) -> Result<RecoveryResult, RecoveryError>;
}

/// Standard handler: directive-only actions always succeed; cache clearing
/// and permission requests do real work.
#[derive(Debug, Clone)]
pub struct DefaultActionHandler {
    permission_gate: Arc<dyn PermissionGate>,
    store: Option<Arc<dyn KeyValueStore>>,
    result_cache: Option<Arc<ResultCacheService>>,
}

impl Default for DefaultActionHandler {
    fn default() -> Self {
        Self {
            permission_gate: Arc::new(UnavailableGate),
            store: None,
            result_cache: None,
        }
    }
}

impl DefaultActionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_permission_gate(mut self, gate: Arc<dyn PermissionGate>) -> Self {
        self.permission_gate = gate;
        self
    }

    /// Store whose scanner keys are removed by the clear-cache action.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Result cache emptied by the clear-cache action.
    pub fn with_result_cache(mut self, cache: Arc<ResultCacheService>) -> Self {
        self.result_cache = Some(cache);
        self
    }

    async fn clear_cache(&self) -> Result<RecoveryResult, RecoveryError> {
        let mut removed = 0usize;
        if let Some(store) = &self.store {
            let keys = store.keys()?;
            for key in keys
                .iter()
                .filter(|key| SCANNER_KEY_MARKERS.iter().any(|m| key.contains(m)))
            {
                store.remove_item(key)?;
                removed += 1;
            }
        }

        if let Some(cache) = &self.result_cache {
            cache.clear().await;
        }

        info!(removed, "Scanner caches cleared for recovery");
        Ok(RecoveryResult::recovered(
            RecoveryAction::ClearCache,
            "Cache cleared successfully",
            true,
        ))
    }

    async fn request_permission(
        &self,
        context: &RecoveryContext,
    ) -> Result<RecoveryResult, RecoveryError> {
        let Some(permission) = context.permission else {
            return Ok(RecoveryResult::failed(
                RecoveryAction::RequestPermission,
                "Unknown permission type",
            ));
        };

        match self.permission_gate.acquire(permission).await {
            Ok(()) => Ok(RecoveryResult::recovered(
                RecoveryAction::RequestPermission,
                format!("{:?} permission granted", permission),
                true,
            )),
            Err(e) => {
                debug!(?permission, error = %e, "Permission request refused");
                Ok(RecoveryResult::failed(
                    RecoveryAction::RequestPermission,
                    "Permission denied",
                ))
            }
        }
    }
}

#[async_trait]
impl RecoveryActionHandler for DefaultActionHandler {
    async fn execute(
        &self,
        action: RecoveryAction,
        context: &RecoveryContext,
        strategy: &RecoveryStrategy,
    ) -> Result<RecoveryResult, RecoveryError> {
        let result = match action {
            RecoveryAction::Retry => {
                RecoveryResult::recovered(action, "Retrying operation...", true)
                    .with_delay(strategy.retry_delay_ms)
            }
            RecoveryAction::WaitAndRetry => RecoveryResult::recovered(
                action,
                format!(
                    "Waiting {} seconds before retry...",
                    strategy.retry_delay_ms / 1000
                ),
                true,
            )
            .with_delay(strategy.retry_delay_ms),
            RecoveryAction::FallbackProvider => RecoveryResult::recovered(
                action,
                "Switching to alternative text extraction service",
                true,
            )
            .with_directive(RecoveryDirective::FallbackProvider),
            RecoveryAction::ReduceQuality => RecoveryResult::recovered(
                action,
                "Reducing image quality for faster processing",
                true,
            )
            .with_directive(RecoveryDirective::ReduceQuality {
                quality_reduction: QUALITY_REDUCTION,
            }),
            RecoveryAction::SimplifyRequest => {
                RecoveryResult::recovered(action, "Simplifying processing options", true)
                    .with_directive(RecoveryDirective::Simplify {
                        disable_table_detection: true,
                        reduce_timeout: true,
                    })
            }
            RecoveryAction::ManualInput => {
                RecoveryResult::recovered(action, "Switching to manual text input", false)
                    .with_directive(RecoveryDirective::ManualInput)
            }
            RecoveryAction::SwitchMethod => {
                RecoveryResult::recovered(action, "Switching to alternative input method", false)
                    .with_directive(RecoveryDirective::SwitchToUpload)
            }
            RecoveryAction::ClearCache => return self.clear_cache().await,
            RecoveryAction::RequestPermission => return self.request_permission(context).await,
            RecoveryAction::None => {
                RecoveryResult::failed(action, "Recovery action not implemented")
            }
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStore, PERSISTENCE_KEY};
    use crate::recovery::strategies::default_strategies;
    use crate::recovery::types::{ErrorType, RecoveryOutcome};

    #[derive(Debug)]
    struct GrantingGate;

    #[async_trait]
    impl PermissionGate for GrantingGate {
        async fn acquire(&self, _permission: PermissionKind) -> Result<(), RecoveryError> {
            Ok(())
        }
    }

    fn strategy(error_type: ErrorType) -> RecoveryStrategy {
        default_strategies().remove(&error_type).unwrap()
    }

    #[tokio::test]
    async fn test_wait_and_retry_carries_delay() {
        let handler = DefaultActionHandler::new();
        let result = handler
            .execute(
                RecoveryAction::WaitAndRetry,
                &RecoveryContext::default(),
                &strategy(ErrorType::RateLimit),
            )
            .await
            .unwrap();

        assert!(result.success());
        assert!(result.should_retry);
        assert_eq!(result.retry_delay_ms, Some(60_000));
        assert_eq!(result.message, "Waiting 60 seconds before retry...");
    }

    #[tokio::test]
    async fn test_manual_input_stops_retrying() {
        let handler = DefaultActionHandler::new();
        let result = handler
            .execute(
                RecoveryAction::ManualInput,
                &RecoveryContext::default(),
                &strategy(ErrorType::Unknown),
            )
            .await
            .unwrap();

        assert!(result.success());
        assert!(!result.should_retry);
        assert_eq!(result.directive, Some(RecoveryDirective::ManualInput));
    }

    #[tokio::test]
    async fn test_permission_needs_a_kind() {
        let handler = DefaultActionHandler::new().with_permission_gate(Arc::new(GrantingGate));
        let result = handler
            .execute(
                RecoveryAction::RequestPermission,
                &RecoveryContext::default(),
                &strategy(ErrorType::Permission),
            )
            .await
            .unwrap();

        assert_eq!(result.outcome, RecoveryOutcome::ActionsFailed);
        assert_eq!(result.message, "Unknown permission type");
    }

    #[tokio::test]
    async fn test_permission_granted_by_gate() {
        let handler = DefaultActionHandler::new().with_permission_gate(Arc::new(GrantingGate));
        let context =
            RecoveryContext::for_operation("capture").with_permission(PermissionKind::Camera);
        let result = handler
            .execute(
                RecoveryAction::RequestPermission,
                &context,
                &strategy(ErrorType::CameraAccess),
            )
            .await
            .unwrap();

        assert!(result.success());
        assert!(result.should_retry);
    }

    #[tokio::test]
    async fn test_permission_refused_without_hardware() {
        let handler = DefaultActionHandler::new();
        let context = RecoveryContext::default().with_permission(PermissionKind::Camera);
        let result = handler
            .execute(
                RecoveryAction::RequestPermission,
                &context,
                &strategy(ErrorType::CameraAccess),
            )
            .await
            .unwrap();

        assert!(!result.success());
    }

    #[tokio::test]
    async fn test_clear_cache_removes_scanner_keys_only() {
        let store = Arc::new(
            MemoryStore::new()
                .with_item(PERSISTENCE_KEY, "{}")
                .with_item("ocr_provider_pref", "openai")
                .with_item("theme", "dark"),
        );
        let handler = DefaultActionHandler::new().with_store(store.clone());

        let result = handler
            .execute(
                RecoveryAction::ClearCache,
                &RecoveryContext::default(),
                &strategy(ErrorType::Storage),
            )
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(store.keys().unwrap(), vec!["theme".to_string()]);
    }

    #[tokio::test]
    async fn test_none_action_fails() {
        let handler = DefaultActionHandler::new();
        let result = handler
            .execute(
                RecoveryAction::None,
                &RecoveryContext::default(),
                &strategy(ErrorType::Unknown),
            )
            .await
            .unwrap();

        assert!(!result.success());
    }
}
