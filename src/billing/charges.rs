//! Charge calculations for a RAM purchase.
//!
//! Pure monetary formulas; the caller validates the quantity against the
//! catalog bounds first, and rounding/currency formatting is a presentation
//! concern left to the dialog.

use rust_decimal::Decimal;

/// Recurring monthly cost of the requested quantity.
#[must_use]
pub fn monthly_cost(full_price: Decimal, quantity: u64) -> Decimal {
    full_price * Decimal::from(quantity)
}

/// Amount charged now, prorated over the days left in the current period.
#[must_use]
pub fn prorated_charge(partial_price: Decimal, quantity: u64, days_left: u32) -> Decimal {
    partial_price * Decimal::from(quantity) * Decimal::from(days_left)
}

/// Total recurring charge from next month on: the new quantity plus what the
/// account already owns beyond its free allotment.
#[must_use]
pub fn next_month_charge(full_price: Decimal, quantity: u64, owned: u64, free: u64) -> Decimal {
    full_price * (Decimal::from(quantity) + Decimal::from(owned) - Decimal::from(free))
}
