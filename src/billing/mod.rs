//! Billing computations: calendar periods, charges, and the subscription
//! merge engine.
//!
//! Everything in this module is pure; remote collaborators and wizard state
//! live in [`crate::services`] and [`crate::purchase`].

pub mod charges;
pub mod merge;
pub mod period;

pub use merge::{MergePlan, SubmitIntent, Subscription, SubscriptionPackage, SubscriptionResource};
pub use period::BillingSchedule;
