//! Billing and subscription core for a cloud developer-workspace dashboard.
//!
//! This crate implements the data transformation and decision logic behind
//! the dashboard's "buy more RAM" flow, plus the staged profile auto-save
//! used by the account administration pages. Everything with a wire format
//! (HTTP services, dialogs, routing, rendering) stays outside, consumed
//! through the narrow trait seams in [`services`].
//!
//! # The purchase flow
//!
//! A purchase runs through [`purchase::PurchaseWizard`]:
//!
//! 1. The catalog is fetched and [`catalog::RamPlan`] derives the pricing
//!    context (unit prices, purchasable bounds, timeout display). A catalog
//!    without RAM pricing leaves the context unset and the flow
//!    short-circuits rather than computing with absent data.
//! 2. [`billing::period`] captures the date context: the next charge date
//!    (first of next month) and the days left in the current month.
//! 3. [`billing::charges`] computes the recurring monthly cost, the prorated
//!    charge for the rest of the current month, and the next-month total.
//! 4. On confirmation, [`billing::merge`] folds the purchase into the
//!    account's existing subscription, adding quantity to the matching
//!    package and appending what is missing without ever removing anything,
//!    and decides between the create and update submit endpoints.
//!
//! Remote failures are never fatal: they surface through the
//! [`services::Notifier`] and the wizard stays open for retry. The merge is
//! purely local, so a failed submit leaves the server-side subscription
//! untouched.
//!
//! # Example
//!
//! ```rust,no_run
//! use workspace_billing::{
//!     catalog::{ResourceKinds, ResourceType},
//!     purchase::{PurchaseConfig, PurchaseWizard},
//! };
//!
//! # async fn example<C, S, B, N>(catalog: C, subscriptions: S, cards: B, notifier: N)
//! # -> workspace_billing::error::Result<()>
//! # where
//! #     C: workspace_billing::services::CatalogService,
//! #     S: workspace_billing::services::SubscriptionService,
//! #     B: workspace_billing::services::CardService,
//! #     N: workspace_billing::services::Notifier,
//! # {
//! let config = PurchaseConfig {
//!     account_id: "account-123".to_owned(),
//!     kinds: ResourceKinds {
//!         ram: ResourceType::new("RAM")?,
//!         timeout: ResourceType::new("TIMEOUT")?,
//!     },
//!     total_gb: 3,
//!     free_gb: 2,
//! };
//!
//! let wizard = PurchaseWizard::new(config, catalog, subscriptions, cards, notifier);
//! wizard.init().await;
//!
//! let outcome = wizard.confirm(2).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod account;
pub mod billing;
pub mod catalog;
pub mod error;
pub mod purchase;
pub mod services;

pub use billing::merge::{MergePlan, SubmitIntent, Subscription, SubscriptionPackage};
pub use catalog::{Package, PricedResource, RamPlan, ResourceKinds, ResourceType};
pub use error::{BillingError, Result, ServiceError};
pub use purchase::{PurchaseOutcome, PurchaseWizard, WizardStep};
