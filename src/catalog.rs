//! Resource catalog models and lookups.
//!
//! The pricing service publishes purchasable packages, each bundling priced
//! resources (RAM, idle timeout). This module defines those models, the pure
//! lookups over them, and [`RamPlan`], the derived context the purchase
//! dialog runs on.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BillingError, Result};

/// Megabytes per gigabyte; catalog amounts are stored in megabytes while the
/// dialog works in gigabytes.
pub const MB_PER_GB: u64 = 1024;

/// Catalog timeout amounts are stored in minutes.
const MINUTES_PER_HOUR: u64 = 60;

/// Idle timeout shown when the catalog carries no timeout resource.
const DEFAULT_TIMEOUT_HOURS: u64 = 4;

/// Opaque resource kind identifier supplied by the catalog.
///
/// The engine never hardcodes the well-known kinds; they arrive from
/// platform configuration as a [`ResourceKinds`] value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceType(String);

impl ResourceType {
    /// Creates a resource type identifier after validation.
    ///
    /// # Errors
    ///
    /// Returns error if the identifier is empty, exceeds 64 characters, or
    /// contains characters other than alphanumerics, hyphens, and
    /// underscores.
    pub fn new<S: Into<String>>(id: S) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(BillingError::InvalidResourceType("identifier cannot be empty".into()));
        }
        if id.len() > 64 {
            return Err(BillingError::InvalidResourceType(
                "identifier must be 64 characters or less".into(),
            ));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(BillingError::InvalidResourceType(
                "identifier can only contain alphanumeric characters, hyphens, and underscores"
                    .into(),
            ));
        }
        Ok(Self(id))
    }

    /// Returns the inner string reference.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The well-known resource kinds of the platform, supplied by configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceKinds {
    /// Workspace RAM.
    pub ram: ResourceType,
    /// Workspace idle timeout.
    pub timeout: ResourceType,
}

/// A priced resource definition inside a catalog package.
///
/// Immutable within a purchase flow; amounts are in the catalog's internal
/// unit (megabytes for RAM, minutes for timeout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedResource {
    /// Resource kind.
    pub kind: ResourceType,
    /// Price per unit per billing month.
    pub full_price: Decimal,
    /// Price per unit per day, for prorating a partial month.
    pub partial_price: Decimal,
    /// Amount currently bundled with the package.
    pub amount: u64,
    /// Minimum purchasable amount.
    pub min_amount: u64,
    /// Maximum purchasable amount.
    pub max_amount: u64,
    /// Unit of the amounts (e.g. `mb`).
    pub unit: String,
}

/// A purchasable bundle of priced resources.
///
/// The `id` doubles as the template id a subscription package links back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package identifier (template id when referenced from a subscription).
    pub id: String,
    /// Priced resources bundled by this package, in catalog order.
    pub resources: Vec<PricedResource>,
}

/// Returns the first package containing a resource of the requested kind.
#[must_use]
pub fn find_package_by_resource_type<'a>(
    packages: &'a [Package],
    kind: &ResourceType,
) -> Option<&'a Package> {
    packages.iter().find(|package| package.resources.iter().any(|r| r.kind == *kind))
}

/// Returns the first resource of the requested kind within a package.
#[must_use]
pub fn find_resource_in_package<'a>(
    package: &'a Package,
    kind: &ResourceType,
) -> Option<&'a PricedResource> {
    package.resources.iter().find(|resource| resource.kind == *kind)
}

/// Pricing context for the "more RAM" purchase dialog, derived from the
/// catalog.
///
/// Built by [`RamPlan::from_packages`]; when the catalog lacks a RAM package
/// or RAM resource no plan is produced and every dependent field stays
/// unset, so callers short-circuit instead of computing with absent data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RamPlan {
    /// Price per gigabyte per month.
    pub unit_price: Decimal,
    /// Price per gigabyte per day, for the current partial month.
    pub partial_price: Decimal,
    /// Display string of the amount already paid for (e.g. `"2GB"`).
    pub owned_display: String,
    /// Minimum purchasable quantity, in gigabytes.
    pub min_gb: u64,
    /// Maximum purchasable quantity, in gigabytes, net of RAM the account
    /// already pays for.
    pub max_gb: u64,
    /// Workspace idle timeout to display, in hours.
    pub timeout_hours: u64,
    /// Timeout resource to carry into a newly created subscription, when the
    /// catalog defines one.
    pub timeout_resource: Option<PricedResource>,
    /// The catalog package RAM is purchased from.
    pub ram_package: Package,
}

impl RamPlan {
    /// Derives the purchase context from the catalog.
    ///
    /// `total_gb` and `free_gb` describe the account's current RAM: the
    /// purchasable maximum is reduced by the portion already paid for
    /// (`total - free`).
    ///
    /// Returns `None` when the catalog has no RAM package or the RAM package
    /// has no RAM resource.
    #[must_use]
    pub fn from_packages(
        packages: &[Package],
        kinds: &ResourceKinds,
        total_gb: u64,
        free_gb: u64,
    ) -> Option<Self> {
        let ram_package = find_package_by_resource_type(packages, &kinds.ram)?;
        let ram = find_resource_in_package(ram_package, &kinds.ram)?;
        let timeout = find_resource_in_package(ram_package, &kinds.timeout).cloned();

        let paid_gb = total_gb.saturating_sub(free_gb);

        Some(Self {
            unit_price: ram.full_price,
            partial_price: ram.partial_price,
            owned_display: format!("{}GB", ram.amount / MB_PER_GB),
            min_gb: ram.min_amount / MB_PER_GB,
            max_gb: (ram.max_amount / MB_PER_GB).saturating_sub(paid_gb),
            timeout_hours: timeout
                .as_ref()
                .map_or(DEFAULT_TIMEOUT_HOURS, |t| t.amount / MINUTES_PER_HOUR),
            timeout_resource: timeout,
            ram_package: ram_package.clone(),
        })
    }

    /// Checks a purchase quantity against the plan bounds.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::QuantityOutOfRange`] when `quantity_gb` falls
    /// outside `min_gb..=max_gb`.
    pub fn validate_quantity(&self, quantity_gb: u64) -> Result<()> {
        if quantity_gb < self.min_gb || quantity_gb > self.max_gb {
            return Err(BillingError::QuantityOutOfRange {
                requested: quantity_gb,
                min: self.min_gb,
                max: self.max_gb,
            });
        }
        Ok(())
    }
}
