//! Two-step purchase wizard for buying more workspace RAM.
//!
//! The wizard owns all of the flow's state explicitly: the current step, the
//! in-flight guard, the pricing context derived from the catalog, the date
//! context captured at open, and the card on file. Collaborators are
//! injected as [`crate::services`] traits.
//!
//! Methods take `&self` and mutable state sits behind short-lived locks,
//! never held across an await, so the wizard can be shared behind an `Arc`
//! and driven from concurrent UI events. Confirmation itself is serialized:
//! a second confirm while one is in flight is rejected with
//! [`BillingError::PurchaseInFlight`].
//!
//! Remote failures are non-fatal: they surface through the notification sink
//! and the wizard stays in its current step for retry. The merge computation
//! is purely local, so the only remote side effect is the final submit.

use std::sync::{
    Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use crate::{
    billing::{
        charges,
        merge::{SubmitIntent, merge_ram_purchase},
        period::BillingSchedule,
    },
    catalog::{MB_PER_GB, RamPlan, ResourceKinds},
    error::{BillingError, Result},
    services::{CardService, CatalogService, CreditCard, Notifier, SubscriptionService},
};

/// Fallback notification when the package catalog cannot be loaded.
const FAILED_LOAD_PACKAGES: &str = "Failed to load available packages.";
/// Fallback notification when the card on file cannot be loaded.
const FAILED_LOAD_CARD: &str = "Failed to load the credit card.";
/// Fallback notification when saving the card fails.
const FAILED_SAVE_CARD: &str = "Failed to save the credit card.";
/// Fallback notification when the subscription submit fails.
const FAILED_ADD_RAM: &str = "Failed to add more RAM to account.";

/// Wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    /// Quantity selection.
    One,
    /// Payment details, entered when no card is on file.
    Two,
}

/// Result of a purchase confirmation.
///
/// Remote failures are reported through the notifier and folded into
/// [`Failed`](Self::Failed); the wizard remains open for retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// No card is on file; the wizard moved to (or stayed in) the payment
    /// step without issuing any remote call.
    PaymentDetailsRequired,
    /// The subscription was submitted; the dialog can close.
    Completed(SubmitIntent),
    /// A remote call failed; the error was surfaced and the wizard stays
    /// open in its current step.
    Failed,
}

/// Static context of a purchase flow.
#[derive(Debug, Clone)]
pub struct PurchaseConfig {
    /// Account the purchase is made for.
    pub account_id: String,
    /// Well-known resource kinds of the platform.
    pub kinds: ResourceKinds,
    /// RAM currently available to the account, in gigabytes.
    pub total_gb: u64,
    /// Free RAM allotment, in gigabytes.
    pub free_gb: u64,
}

/// Orchestrates the "more RAM" purchase flow.
#[derive(Debug)]
pub struct PurchaseWizard<C, S, B, N> {
    config: PurchaseConfig,
    catalog: C,
    subscriptions: S,
    cards: B,
    notifier: N,
    schedule: BillingSchedule,
    step: Mutex<WizardStep>,
    in_flight: AtomicBool,
    plan: Mutex<Option<RamPlan>>,
    card: Mutex<Option<CreditCard>>,
}

/// Clears the in-flight flag when the purchase settles, including when the
/// confirm future is dropped mid-flight.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Poisoning only matters to a panicked purchase attempt; surviving callers
/// keep the last coherent state.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<C, S, B, N> PurchaseWizard<C, S, B, N>
where
    C: CatalogService,
    S: SubscriptionService,
    B: CardService,
    N: Notifier,
{
    /// Creates a wizard with the billing schedule captured from today's
    /// date. Call [`init`](Self::init) before confirming a purchase.
    #[must_use]
    pub fn new(config: PurchaseConfig, catalog: C, subscriptions: S, cards: B, notifier: N) -> Self {
        Self {
            config,
            catalog,
            subscriptions,
            cards,
            notifier,
            schedule: BillingSchedule::current(),
            step: Mutex::new(WizardStep::One),
            in_flight: AtomicBool::new(false),
            plan: Mutex::new(None),
            card: Mutex::new(None),
        }
    }

    /// Overrides the captured billing schedule.
    #[must_use]
    pub fn with_schedule(mut self, schedule: BillingSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Loads the pricing context and the card on file.
    ///
    /// The two fetches are independent; either may fail without affecting
    /// the other. A packages fetch rejected with `304 Not Modified` proceeds
    /// from the collaborator's cached read. Other fetch failures leave prior
    /// state unchanged and surface a notification.
    #[instrument(skip(self), fields(account_id = %self.config.account_id))]
    pub async fn init(&self) {
        match self.catalog.fetch_packages().await {
            Ok(()) => self.reload_plan(),
            Err(error) if error.is_not_modified() => self.reload_plan(),
            Err(error) => self.notifier.show_error(error.message_or(FAILED_LOAD_PACKAGES)),
        }

        match self.cards.fetch_credit_card(&self.config.account_id).await {
            Ok(card) => *lock(&self.card) = card,
            Err(error) => self.notifier.show_error(error.message_or(FAILED_LOAD_CARD)),
        }
    }

    fn reload_plan(&self) {
        *lock(&self.plan) = RamPlan::from_packages(
            &self.catalog.packages(),
            &self.config.kinds,
            self.config.total_gb,
            self.config.free_gb,
        );
    }

    /// Confirms the purchase of `quantity_gb` gigabytes of RAM.
    ///
    /// In step one without a card on file this is a gate, not a purchase:
    /// the wizard moves to the payment step and issues no remote call.
    /// Otherwise the card is saved first when it has no processor token yet,
    /// the active subscription is fetched, the purchase is merged into it,
    /// and the resulting package list is submitted to the create or update
    /// endpoint per the merge intent.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::PurchaseInFlight`] when a purchase is already
    /// running, [`BillingError::CatalogUnavailable`] when no RAM pricing was
    /// loaded, and [`BillingError::QuantityOutOfRange`] for a quantity
    /// outside the plan bounds. Remote failures are not returned as errors;
    /// they surface through the notifier as [`PurchaseOutcome::Failed`].
    #[instrument(skip(self), fields(account_id = %self.config.account_id))]
    pub async fn confirm(&self, quantity_gb: u64) -> Result<PurchaseOutcome> {
        let plan = lock(&self.plan).clone().ok_or(BillingError::CatalogUnavailable)?;
        plan.validate_quantity(quantity_gb)?;

        let Some(card) = lock(&self.card).clone() else {
            *lock(&self.step) = WizardStep::Two;
            return Ok(PurchaseOutcome::PaymentDetailsRequired);
        };

        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(BillingError::PurchaseInFlight);
        }
        let _guard = FlightGuard(&self.in_flight);

        Ok(self.perform_purchase(&plan, &card, quantity_gb).await)
    }

    async fn perform_purchase(
        &self,
        plan: &RamPlan,
        card: &CreditCard,
        quantity_gb: u64,
    ) -> PurchaseOutcome {
        let account_id = self.config.account_id.clone();

        if card.token.is_none() {
            if let Err(error) = self.cards.add_credit_card(&account_id, card).await {
                self.notifier.show_error(error.message_or(FAILED_SAVE_CARD));
                return PurchaseOutcome::Failed;
            }
            // Re-read the card to pick up the processor token.
            match self.cards.fetch_credit_card(&account_id).await {
                Ok(refreshed) => *lock(&self.card) = refreshed,
                Err(error) => self.notifier.show_error(error.message_or(FAILED_LOAD_CARD)),
            }
        }

        // The merge runs on the collaborator's cached read either way; a
        // failed refresh falls back to the last-known subscription state.
        if let Err(error) = self.subscriptions.fetch_active_subscription(&account_id).await {
            warn!(%error, "subscription refresh failed, merging against cached state");
        }
        let subscription = self.subscriptions.active_subscription(&account_id);

        let merge = merge_ram_purchase(
            subscription.as_ref(),
            &plan.ram_package,
            plan.timeout_resource.as_ref(),
            &self.config.kinds,
            quantity_gb * MB_PER_GB,
        );

        let intent = merge.intent;
        let submit = match intent {
            SubmitIntent::Create => {
                self.subscriptions.create_subscription(&account_id, merge.packages).await
            }
            SubmitIntent::Update => {
                self.subscriptions.update_subscription(&account_id, merge.packages).await
            }
        };

        match submit {
            Ok(()) => {
                info!(?intent, quantity_gb, "RAM purchase submitted");
                PurchaseOutcome::Completed(intent)
            }
            Err(error) => {
                self.notifier.show_error(error.message_or(FAILED_ADD_RAM));
                PurchaseOutcome::Failed
            }
        }
    }

    /// Stores card details entered in the payment step.
    pub fn set_card(&self, card: CreditCard) {
        *lock(&self.card) = Some(card);
    }

    /// Returns the card on file, if any.
    #[must_use]
    pub fn card(&self) -> Option<CreditCard> {
        lock(&self.card).clone()
    }

    /// Returns the current wizard step.
    #[must_use]
    pub fn step(&self) -> WizardStep {
        *lock(&self.step)
    }

    /// Returns true while a purchase attempt is in flight.
    #[must_use]
    pub fn is_purchasing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Returns the pricing context, once the catalog was loaded and when it
    /// defines RAM pricing.
    #[must_use]
    pub fn plan(&self) -> Option<RamPlan> {
        lock(&self.plan).clone()
    }

    /// Returns the captured date context.
    #[must_use]
    pub fn schedule(&self) -> &BillingSchedule {
        &self.schedule
    }

    /// Recurring monthly cost of the requested quantity, when pricing is
    /// available.
    #[must_use]
    pub fn monthly_cost(&self, quantity_gb: u64) -> Option<Decimal> {
        lock(&self.plan).as_ref().map(|plan| charges::monthly_cost(plan.unit_price, quantity_gb))
    }

    /// Charge for the rest of the current period, when pricing is available.
    #[must_use]
    pub fn prorated_charge(&self, quantity_gb: u64) -> Option<Decimal> {
        lock(&self.plan).as_ref().map(|plan| {
            charges::prorated_charge(plan.partial_price, quantity_gb, self.schedule.days_left)
        })
    }

    /// Recurring charge from next month on, when pricing is available.
    #[must_use]
    pub fn next_month_charge(&self, quantity_gb: u64) -> Option<Decimal> {
        lock(&self.plan).as_ref().map(|plan| {
            charges::next_month_charge(
                plan.unit_price,
                quantity_gb,
                self.config.total_gb,
                self.config.free_gb,
            )
        })
    }
}
