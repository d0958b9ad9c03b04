//! Subscription merge engine.
//!
//! Given the account's current subscription (or none) and a desired amount
//! of additional RAM, produces the full package list to submit and whether
//! it should go to the create or the update endpoint. The computation is
//! purely local; only the eventual submit call has a side effect, so a
//! failed submit leaves the server-side subscription untouched.

use serde::{Deserialize, Serialize};

use crate::catalog::{Package, PricedResource, ResourceKinds, ResourceType};

/// Unit RAM amounts are submitted in.
const RAM_UNIT: &str = "mb";

/// A resource instance owned by a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionResource {
    /// Resource kind.
    pub kind: ResourceType,
    /// Owned amount, in the resource's unit.
    pub amount: u64,
    /// Unit of the amount.
    pub unit: String,
}

/// A subscribed package, linking back to a catalog [`Package`] by template
/// id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPackage {
    /// Catalog package this was created from, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Owned resources, at most one per kind.
    pub resources: Vec<SubscriptionResource>,
}

/// An account's active subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscribed packages.
    pub packages: Vec<SubscriptionPackage>,
}

/// Which subscription endpoint the merged package list must be submitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitIntent {
    /// No active subscription existed; create one.
    Create,
    /// Patch the existing subscription.
    Update,
}

/// Result of merging a RAM purchase into a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    /// Full package list to submit.
    pub packages: Vec<SubscriptionPackage>,
    /// Target endpoint for the submit.
    pub intent: SubmitIntent,
}

/// Merges an additional RAM purchase into the account's subscription.
///
/// `additional_ram_mb` must be strictly positive and already converted to
/// megabytes; the engine adds raw amounts and performs no unit conversion or
/// input defense. The input subscription is never mutated: the returned
/// package list is a fresh value.
///
/// With no subscription, a single package is produced from `ram_package`
/// carrying the RAM resource and, when the catalog defines one, the timeout
/// resource, with a [`SubmitIntent::Create`]. Otherwise the existing
/// packages are copied and the first package whose template id matches
/// `ram_package` gets its RAM amount increased (or a RAM resource appended
/// when it owned none); if no package matches, a RAM-only package is
/// appended, with a [`SubmitIntent::Update`] either way. Existing packages
/// and resources are never removed.
#[must_use]
pub fn merge_ram_purchase(
    subscription: Option<&Subscription>,
    ram_package: &Package,
    timeout_resource: Option<&PricedResource>,
    kinds: &ResourceKinds,
    additional_ram_mb: u64,
) -> MergePlan {
    let Some(subscription) = subscription else {
        let mut resources = vec![ram_resource(&kinds.ram, additional_ram_mb)];
        if let Some(timeout) = timeout_resource {
            resources.push(SubscriptionResource {
                kind: timeout.kind.clone(),
                amount: timeout.amount,
                unit: timeout.unit.clone(),
            });
        }
        return MergePlan {
            packages: vec![SubscriptionPackage {
                template_id: Some(ram_package.id.clone()),
                resources,
            }],
            intent: SubmitIntent::Create,
        };
    };

    let mut packages = subscription.packages.clone();

    match packages.iter_mut().find(|p| p.template_id.as_deref() == Some(ram_package.id.as_str())) {
        Some(package) => match package.resources.iter_mut().find(|r| r.kind == kinds.ram) {
            Some(resource) => resource.amount += additional_ram_mb,
            None => package.resources.push(ram_resource(&kinds.ram, additional_ram_mb)),
        },
        None => {
            // TODO: confirm with product whether a freshly appended package
            // should carry the catalog template id; the live backend accepts
            // it without one today.
            packages.push(SubscriptionPackage {
                template_id: None,
                resources: vec![ram_resource(&kinds.ram, additional_ram_mb)],
            });
        }
    }

    MergePlan { packages, intent: SubmitIntent::Update }
}

fn ram_resource(kind: &ResourceType, amount_mb: u64) -> SubscriptionResource {
    SubscriptionResource { kind: kind.clone(), amount: amount_mb, unit: RAM_UNIT.to_owned() }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use super::*;

    fn kinds() -> ResourceKinds {
        ResourceKinds {
            ram: ResourceType::new("RAM").unwrap(),
            timeout: ResourceType::new("TIMEOUT").unwrap(),
        }
    }

    fn ram_package() -> Package {
        Package {
            id: "pkg-ram".to_owned(),
            resources: vec![PricedResource {
                kind: ResourceType::new("RAM").unwrap(),
                full_price: Decimal::from(10),
                partial_price: Decimal::ONE,
                amount: 2048,
                min_amount: 1024,
                max_amount: 16_384,
                unit: "mb".to_owned(),
            }],
        }
    }

    fn timeout_resource() -> PricedResource {
        PricedResource {
            kind: ResourceType::new("TIMEOUT").unwrap(),
            full_price: Decimal::ZERO,
            partial_price: Decimal::ZERO,
            amount: 240,
            min_amount: 240,
            max_amount: 240,
            unit: "minute".to_owned(),
        }
    }

    fn owned_ram(amount: u64) -> SubscriptionResource {
        SubscriptionResource {
            kind: ResourceType::new("RAM").unwrap(),
            amount,
            unit: "mb".to_owned(),
        }
    }

    // ========================================================================
    // Create Branch Tests
    // ========================================================================

    #[test]
    fn test_merge_creates_when_no_subscription() {
        let plan =
            merge_ram_purchase(None, &ram_package(), Some(&timeout_resource()), &kinds(), 2048);

        assert_eq!(plan.intent, SubmitIntent::Create);
        assert_eq!(plan.packages.len(), 1);

        let package = &plan.packages[0];
        assert_eq!(package.template_id.as_deref(), Some("pkg-ram"));
        assert_eq!(package.resources.len(), 2);
        assert_eq!(package.resources[0].amount, 2048);
        assert_eq!(package.resources[0].unit, "mb");
        assert_eq!(package.resources[1].amount, 240);
        assert_eq!(package.resources[1].unit, "minute");
    }

    #[test]
    fn test_merge_creates_without_timeout_resource() {
        let plan = merge_ram_purchase(None, &ram_package(), None, &kinds(), 1024);

        assert_eq!(plan.intent, SubmitIntent::Create);
        assert_eq!(plan.packages[0].resources.len(), 1);
    }

    // ========================================================================
    // Update Branch Tests
    // ========================================================================

    #[test]
    fn test_merge_adds_to_existing_ram_amount() {
        let subscription = Subscription {
            packages: vec![SubscriptionPackage {
                template_id: Some("pkg-ram".to_owned()),
                resources: vec![owned_ram(3072)],
            }],
        };

        let plan = merge_ram_purchase(Some(&subscription), &ram_package(), None, &kinds(), 1024);

        assert_eq!(plan.intent, SubmitIntent::Update);
        assert_eq!(plan.packages[0].resources[0].amount, 4096);
        // Input subscription stays untouched.
        assert_eq!(subscription.packages[0].resources[0].amount, 3072);
    }

    #[test]
    fn test_merge_appends_ram_resource_when_package_has_none() {
        let subscription = Subscription {
            packages: vec![SubscriptionPackage {
                template_id: Some("pkg-ram".to_owned()),
                resources: vec![SubscriptionResource {
                    kind: ResourceType::new("TIMEOUT").unwrap(),
                    amount: 240,
                    unit: "minute".to_owned(),
                }],
            }],
        };

        let plan = merge_ram_purchase(Some(&subscription), &ram_package(), None, &kinds(), 2048);

        let package = &plan.packages[0];
        assert_eq!(package.resources.len(), 2);
        assert_eq!(package.resources[1].kind.as_str(), "RAM");
        assert_eq!(package.resources[1].amount, 2048);
    }

    #[test]
    fn test_merge_appends_package_when_template_missing() {
        let subscription = Subscription {
            packages: vec![SubscriptionPackage {
                template_id: Some("pkg-other".to_owned()),
                resources: vec![owned_ram(1024)],
            }],
        };

        let plan = merge_ram_purchase(Some(&subscription), &ram_package(), None, &kinds(), 2048);

        assert_eq!(plan.intent, SubmitIntent::Update);
        assert_eq!(plan.packages.len(), 2);
        // The pre-existing package is carried over unchanged.
        assert_eq!(plan.packages[0], subscription.packages[0]);
        // The appended package carries no template id (observed backend
        // behavior, see module docs).
        assert!(plan.packages[1].template_id.is_none());
        assert_eq!(plan.packages[1].resources[0].amount, 2048);
    }

    #[test]
    fn test_merge_first_template_match_wins() {
        let subscription = Subscription {
            packages: vec![
                SubscriptionPackage {
                    template_id: Some("pkg-ram".to_owned()),
                    resources: vec![owned_ram(1024)],
                },
                SubscriptionPackage {
                    template_id: Some("pkg-ram".to_owned()),
                    resources: vec![owned_ram(5120)],
                },
            ],
        };

        let plan = merge_ram_purchase(Some(&subscription), &ram_package(), None, &kinds(), 1024);

        assert_eq!(plan.packages[0].resources[0].amount, 2048);
        assert_eq!(plan.packages[1].resources[0].amount, 5120);
    }

    #[test]
    fn test_merge_empty_subscription_is_update() {
        let subscription = Subscription::default();
        let plan = merge_ram_purchase(Some(&subscription), &ram_package(), None, &kinds(), 1024);

        assert_eq!(plan.intent, SubmitIntent::Update);
        assert_eq!(plan.packages.len(), 1);
        assert!(plan.packages[0].template_id.is_none());
    }

    #[test]
    fn test_merge_no_duplicate_ram_resource() {
        let subscription = Subscription {
            packages: vec![SubscriptionPackage {
                template_id: Some("pkg-ram".to_owned()),
                resources: vec![owned_ram(1024)],
            }],
        };

        let plan = merge_ram_purchase(Some(&subscription), &ram_package(), None, &kinds(), 1024);

        let ram_count = plan.packages[0]
            .resources
            .iter()
            .filter(|r| r.kind.as_str() == "RAM")
            .count();
        assert_eq!(ram_count, 1);
    }

    // ========================================================================
    // Merge Laws (property-based)
    // ========================================================================

    proptest! {
        #[test]
        fn prop_merge_additivity(owned in 0_u64..1_000_000, delta in 1_u64..1_000_000) {
            let subscription = Subscription {
                packages: vec![SubscriptionPackage {
                    template_id: Some("pkg-ram".to_owned()),
                    resources: vec![owned_ram(owned)],
                }],
            };

            let plan =
                merge_ram_purchase(Some(&subscription), &ram_package(), None, &kinds(), delta);

            prop_assert_eq!(plan.packages[0].resources[0].amount, owned + delta);
        }

        #[test]
        fn prop_merge_never_loses_data(
            amounts in proptest::collection::vec(0_u64..100_000, 0..5),
            delta in 1_u64..100_000,
        ) {
            let subscription = Subscription {
                packages: amounts
                    .iter()
                    .enumerate()
                    .map(|(i, amount)| SubscriptionPackage {
                        template_id: Some(format!("pkg-{i}")),
                        resources: vec![owned_ram(*amount)],
                    })
                    .collect(),
            };

            let plan =
                merge_ram_purchase(Some(&subscription), &ram_package(), None, &kinds(), delta);

            // Every pre-existing package survives the merge untouched
            // (no template id matches "pkg-ram").
            prop_assert!(plan.packages.len() >= subscription.packages.len());
            for (before, after) in subscription.packages.iter().zip(plan.packages.iter()) {
                prop_assert_eq!(before, after);
            }
        }
    }
}
