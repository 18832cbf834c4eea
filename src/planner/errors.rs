//! Enumerator error types
//!
//! Error codes:
//! - AERO_ENUM_INVALID_TREE (REJECT)
//! - AERO_ENUM_INVALID_CATALOG (REJECT)
//! - AERO_ENUM_INVALID_CONFIG (REJECT)
//!
//! Broken memo invariants are not errors: they are reported through
//! [`consistency_violation`], which never returns.

use std::fmt;

use super::catalog::CatalogError;
use crate::observability::{Event, Logger, Severity as LogSeverity};

/// Severity levels for enumerator errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Input rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Enumerator error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumeratorErrorCode {
    /// Predicate tree is structurally malformed
    AeroEnumInvalidTree,
    /// Index catalog failed validation
    AeroEnumInvalidCatalog,
    /// Enumerator configuration is invalid
    AeroEnumInvalidConfig,
}

impl EnumeratorErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            EnumeratorErrorCode::AeroEnumInvalidTree => "AERO_ENUM_INVALID_TREE",
            EnumeratorErrorCode::AeroEnumInvalidCatalog => "AERO_ENUM_INVALID_CATALOG",
            EnumeratorErrorCode::AeroEnumInvalidConfig => "AERO_ENUM_INVALID_CONFIG",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for EnumeratorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Enumerator error with context
#[derive(Debug, Clone)]
pub struct EnumeratorError {
    code: EnumeratorErrorCode,
    message: String,
}

impl EnumeratorError {
    /// Create an invalid tree error
    pub fn invalid_tree(reason: impl Into<String>) -> Self {
        Self {
            code: EnumeratorErrorCode::AeroEnumInvalidTree,
            message: reason.into(),
        }
    }

    /// Create an invalid catalog error
    pub fn invalid_catalog(reason: impl Into<String>) -> Self {
        Self {
            code: EnumeratorErrorCode::AeroEnumInvalidCatalog,
            message: reason.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self {
            code: EnumeratorErrorCode::AeroEnumInvalidConfig,
            message: reason.into(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> EnumeratorErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for EnumeratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for EnumeratorError {}

impl From<CatalogError> for EnumeratorError {
    fn from(e: CatalogError) -> Self {
        Self::invalid_catalog(e.to_string())
    }
}

/// Result type for enumerator operations
pub type EnumeratorResult<T> = Result<T, EnumeratorError>;

/// Aborts on a broken memo invariant.
///
/// Logged at FATAL before panicking so the violation is visible even when
/// the panic is caught upstream.
#[track_caller]
pub fn consistency_violation(detail: &str) -> ! {
    Logger::log_stderr(
        LogSeverity::Fatal,
        Event::ConsistencyViolation.as_str(),
        &[("detail", detail)],
    );
    panic!("memo consistency violation: {}", detail);
}
