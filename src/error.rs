//! Error types for the workspace billing core.
//!
//! Two layers of failure exist here. [`ServiceError`] is the typed payload a
//! remote collaborator (catalog, subscription, card, or profile service)
//! rejects with; it may carry an HTTP-like status code and a human-readable
//! message. [`BillingError`] is what this crate's own operations return:
//! local validation failures plus a wrapper for service rejections that do
//! escape to the caller.

use thiserror::Error;

/// Result type alias for billing operations.
pub type Result<T> = std::result::Result<T, BillingError>;

/// Result type alias for remote collaborator calls.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Failure payload surfaced by a remote collaborator service.
///
/// Collaborators reject with a structured payload rather than an untyped
/// value: an optional status code (HTTP semantics, e.g. `304`) and an
/// optional message suitable for showing to the user. The purchase and
/// profile flows never surface a bare `ServiceError` to the user directly;
/// they funnel [`message_or`](Self::message_or) through the notification
/// sink with a per-operation fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.message.as_deref().unwrap_or("remote call failed"))]
pub struct ServiceError {
    status: Option<u16>,
    message: Option<String>,
}

impl ServiceError {
    /// Creates a service error with a user-facing message and no status.
    #[must_use]
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self { status: None, message: Some(message.into()) }
    }

    /// Creates a service error carrying only a status code.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        Self { status: Some(status), message: None }
    }

    /// Attaches a status code.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns the status code, if the collaborator reported one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns true for a `304 Not Modified` rejection.
    ///
    /// A packages fetch that fails with 304 means the collaborator's cached
    /// read is still valid; callers treat it as success and consult the
    /// cached data instead of reporting a failure.
    #[must_use]
    pub fn is_not_modified(&self) -> bool {
        self.status == Some(304)
    }

    /// Returns the carried message, or `default` when the payload has none.
    #[must_use]
    pub fn message_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.message.as_deref().unwrap_or(default)
    }
}

/// Errors produced by the workspace billing core.
///
/// Remote-call failures during a purchase or profile commit are reported to
/// the notification sink and folded into the operation's outcome; the
/// variants here are what callers can still observe directly, mostly local
/// validation that fails before any remote call is issued.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum BillingError {
    /// A remote collaborator call failed and was not recoverable locally.
    #[error("remote service call failed: {0}")]
    Service(#[from] ServiceError),

    /// A purchase attempt was made while another one is still in flight.
    ///
    /// The purchase path is strictly serialized per wizard instance; callers
    /// should wait for the in-flight attempt to settle and retry.
    #[error("a purchase is already in progress for this account")]
    PurchaseInFlight,

    /// The package catalog has no RAM pricing to purchase against.
    ///
    /// Raised when a purchase is confirmed before the catalog was loaded, or
    /// when the catalog genuinely lacks a RAM package or RAM resource.
    #[error("RAM pricing is unavailable in the package catalog")]
    CatalogUnavailable,

    /// The requested quantity is outside the purchasable bounds.
    #[error("requested {requested}GB is outside the purchasable range {min}GB..={max}GB")]
    QuantityOutOfRange {
        /// Quantity the caller asked for, in gigabytes.
        requested: u64,
        /// Minimum purchasable quantity, in gigabytes.
        min: u64,
        /// Maximum purchasable quantity, in gigabytes.
        max: u64,
    },

    /// A resource type identifier failed validation.
    #[error("invalid resource type: {0}")]
    InvalidResourceType(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display_uses_message() {
        let error = ServiceError::new("card declined");
        assert_eq!(error.to_string(), "card declined");
    }

    #[test]
    fn test_service_error_display_fallback() {
        let error = ServiceError::from_status(500);
        assert_eq!(error.to_string(), "remote call failed");
    }

    #[test]
    fn test_message_or_prefers_payload_message() {
        let error = ServiceError::new("quota exceeded").with_status(403);
        assert_eq!(error.message_or("Failed to add more RAM to account."), "quota exceeded");
    }

    #[test]
    fn test_message_or_falls_back_to_default() {
        let error = ServiceError::from_status(502);
        assert_eq!(
            error.message_or("Failed to add more RAM to account."),
            "Failed to add more RAM to account."
        );
    }

    #[test]
    fn test_not_modified_detection() {
        assert!(ServiceError::from_status(304).is_not_modified());
        assert!(!ServiceError::from_status(404).is_not_modified());
        assert!(!ServiceError::new("no status").is_not_modified());
    }

    #[test]
    fn test_quantity_out_of_range_display() {
        let error = BillingError::QuantityOutOfRange { requested: 99, min: 1, max: 16 };
        assert_eq!(
            error.to_string(),
            "requested 99GB is outside the purchasable range 1GB..=16GB"
        );
    }
}
