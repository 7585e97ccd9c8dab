//! Error Recovery Module
//!
//! Classification of scanner failures and strategy-driven recovery.

pub mod classify;
mod handlers;
mod reporter;
mod service;
pub mod strategies;
mod types;

pub use classify::{classify, KEYWORD_RULES};
pub use handlers::{DefaultActionHandler, PermissionGate, RecoveryActionHandler, UnavailableGate};
pub use reporter::{Breadcrumb, ErrorReport, ErrorReporter, TracingReporter};
pub use service::ErrorRecoveryService;
pub use strategies::default_strategies;
pub use types::{
    ClassifiableError, ErrorCode, ErrorType, PermissionKind, RecoveryAction, RecoveryContext,
    RecoveryDirective, RecoveryOutcome, RecoveryResult, RecoveryStrategy, UnknownErrorCode,
};
