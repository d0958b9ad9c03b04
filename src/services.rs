//! Collaborator contracts for the billing and account flows.
//!
//! The dashboard's remote services (pricing catalog, subscriptions, credit
//! cards, profiles) and its notification sink are consumed through these
//! narrow capability traits, injected into the orchestrators by the caller.
//! Each trait carries an explicit success/failure contract: remote methods
//! reject with a [`ServiceError`] payload, never an untyped value.
//!
//! The fetch/read split on the catalog and subscription services mirrors the
//! collaborators' caching: `fetch_*` refreshes the collaborator's cache and
//! the paired getter reads it, so a fetch rejected with `304 Not Modified`
//! still leaves a valid read behind.

use serde::{Deserialize, Serialize};

use crate::{
    account::profile::ProfileAttributes,
    billing::merge::{Subscription, SubscriptionPackage},
    catalog::Package,
    error::ServiceResult,
};

/// A stored credit card.
///
/// The processor-issued `token` is absent until the card has been saved with
/// the payment processor; a card without a token must be saved before any
/// charge is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    /// Card number (masked by the collaborator).
    pub number: String,
    /// Expiration in `MM/YY` form.
    pub expiration: String,
    /// Cardholder name.
    pub cardholder: String,
    /// Payment-processor token, once the card has been saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Pricing/catalog collaborator.
#[allow(async_fn_in_trait, reason = "consumed via generic injection, not trait objects")]
pub trait CatalogService: Send + Sync {
    /// Refreshes the collaborator's package cache.
    ///
    /// # Errors
    ///
    /// Rejects with the collaborator's failure payload; a 304 status means
    /// the cached read is still valid and [`packages`](Self::packages)
    /// should be consulted as if the fetch succeeded.
    async fn fetch_packages(&self) -> ServiceResult<()>;

    /// Reads the cached package list.
    fn packages(&self) -> Vec<Package>;
}

/// Subscription collaborator.
#[allow(async_fn_in_trait, reason = "consumed via generic injection, not trait objects")]
pub trait SubscriptionService: Send + Sync {
    /// Refreshes the cached active subscription for an account.
    ///
    /// # Errors
    ///
    /// Rejects with the collaborator's failure payload.
    async fn fetch_active_subscription(&self, account_id: &str) -> ServiceResult<()>;

    /// Reads the cached active subscription, or `None` when the account has
    /// no active subscription.
    fn active_subscription(&self, account_id: &str) -> Option<Subscription>;

    /// Creates a subscription from the given package list.
    ///
    /// # Errors
    ///
    /// Rejects with the collaborator's failure payload; a failed submit
    /// leaves the server-side subscription untouched.
    async fn create_subscription(
        &self,
        account_id: &str,
        packages: Vec<SubscriptionPackage>,
    ) -> ServiceResult<()>;

    /// Replaces the subscription's package list.
    ///
    /// # Errors
    ///
    /// Rejects with the collaborator's failure payload; a failed submit
    /// leaves the server-side subscription untouched.
    async fn update_subscription(
        &self,
        account_id: &str,
        packages: Vec<SubscriptionPackage>,
    ) -> ServiceResult<()>;
}

/// Credit-card storage collaborator.
#[allow(async_fn_in_trait, reason = "consumed via generic injection, not trait objects")]
pub trait CardService: Send + Sync {
    /// Fetches the card on file, or `None` when the account has none.
    ///
    /// # Errors
    ///
    /// Rejects with the collaborator's failure payload.
    async fn fetch_credit_card(&self, account_id: &str) -> ServiceResult<Option<CreditCard>>;

    /// Saves a card with the payment processor.
    ///
    /// # Errors
    ///
    /// Rejects with the collaborator's failure payload.
    async fn add_credit_card(&self, account_id: &str, card: &CreditCard) -> ServiceResult<()>;
}

/// User-profile collaborator.
#[allow(async_fn_in_trait, reason = "consumed via generic injection, not trait objects")]
pub trait ProfileService: Send + Sync {
    /// Fetches a user's profile attributes.
    ///
    /// # Errors
    ///
    /// Rejects with the collaborator's failure payload.
    async fn fetch_attributes(&self, user_id: &str) -> ServiceResult<ProfileAttributes>;

    /// Replaces a user's profile attributes.
    ///
    /// # Errors
    ///
    /// Rejects with the collaborator's failure payload.
    async fn set_attributes(
        &self,
        user_id: &str,
        attributes: &ProfileAttributes,
    ) -> ServiceResult<()>;
}

/// User-visible notification sink. Fire-and-forget; the flows never consume
/// a return value from it.
pub trait Notifier: Send + Sync {
    /// Shows an informational message.
    fn show_info(&self, message: &str);

    /// Shows an error message.
    fn show_error(&self, message: &str);
}
