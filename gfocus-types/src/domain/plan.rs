//! Plan catalog shown on the pricing and payment pages.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A USD price in cents.
///
/// Stored in the smallest unit to keep catalog arithmetic exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Price in dollars, as the backend reports amounts.
    pub fn as_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_free(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0.abs() % 100)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Forever,
    Monthly,
    Yearly,
}

/// Identifier used in `?plan=` links to the payment page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanKey {
    Free,
    #[default]
    ProMonthly,
    ProYearly,
    EnterpriseMonthly,
    EnterpriseYearly,
}

impl PlanKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanKey::Free => "free",
            PlanKey::ProMonthly => "pro-monthly",
            PlanKey::ProYearly => "pro-yearly",
            PlanKey::EnterpriseMonthly => "enterprise-monthly",
            PlanKey::EnterpriseYearly => "enterprise-yearly",
        }
    }

    pub fn all() -> &'static [PlanKey] {
        &[
            PlanKey::Free,
            PlanKey::ProMonthly,
            PlanKey::ProYearly,
            PlanKey::EnterpriseMonthly,
            PlanKey::EnterpriseYearly,
        ]
    }
}

impl fmt::Display for PlanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlanKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        PlanKey::all()
            .iter()
            .copied()
            .find(|key| key.as_str() == lowered)
            .ok_or_else(|| ValidationError::UnknownPlan(s.to_string()))
    }
}

/// One purchasable plan variant.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub key: PlanKey,
    /// Display name, also used for the transaction code prefix
    pub name: &'static str,
    pub subtitle: &'static str,
    pub price: Price,
    pub cycle: BillingCycle,
    /// Human-readable billing line, e.g. "per user/month"
    pub billing: &'static str,
    pub per_user: bool,
    pub min_users: Option<u32>,
    pub features: &'static [&'static str],
}

const FREE_FEATURES: &[&str] = &[
    "1 Hour daily working limit",
    "1 Connected device",
    "Standard AI Recognition",
    "Basic focus reports",
];

const PRO_FEATURES: &[&str] = &[
    "Unlimited working hours",
    "Multiple device sync",
    "Personalized AI Brain Training",
    "Push Alerts with Proof Images",
    "30-day History",
    "Priority support",
];

const ENTERPRISE_FEATURES: &[&str] = &[
    "All Pro features",
    "Admin Team Dashboard",
    "Productivity Analytics",
    "Dedicated Support",
    "Custom AI Optimization",
    "SSO Integration",
];

const ENTERPRISE_MONTHLY: Price = Price::from_cents(498);
const ENTERPRISE_MIN_USERS: u32 = 5;
/// Yearly per-user plans get 20% off twelve monthly payments.
const YEARLY_PER_USER_DISCOUNT_PERCENT: i64 = 20;

static CATALOG: [Plan; 5] = [
    Plan {
        key: PlanKey::Free,
        name: "Free",
        subtitle: "The Starter",
        price: Price::ZERO,
        cycle: BillingCycle::Forever,
        billing: "Forever free",
        per_user: false,
        min_users: None,
        features: FREE_FEATURES,
    },
    Plan {
        key: PlanKey::ProMonthly,
        name: "Pro",
        subtitle: "The Power User",
        price: Price::from_cents(1200),
        cycle: BillingCycle::Monthly,
        billing: "per month",
        per_user: false,
        min_users: None,
        features: PRO_FEATURES,
    },
    Plan {
        key: PlanKey::ProYearly,
        name: "Pro",
        subtitle: "The Power User",
        price: Price::from_cents(5900),
        cycle: BillingCycle::Yearly,
        billing: "per year",
        per_user: false,
        min_users: None,
        features: PRO_FEATURES,
    },
    Plan {
        key: PlanKey::EnterpriseMonthly,
        name: "Enterprise",
        subtitle: "The Team Leader",
        price: ENTERPRISE_MONTHLY,
        cycle: BillingCycle::Monthly,
        billing: "per user/month",
        per_user: true,
        min_users: Some(ENTERPRISE_MIN_USERS),
        features: ENTERPRISE_FEATURES,
    },
    Plan {
        key: PlanKey::EnterpriseYearly,
        name: "Enterprise",
        subtitle: "The Team Leader",
        price: yearly_per_user(ENTERPRISE_MONTHLY),
        cycle: BillingCycle::Yearly,
        billing: "per user/year",
        per_user: true,
        min_users: Some(ENTERPRISE_MIN_USERS),
        features: ENTERPRISE_FEATURES,
    },
];

/// Twelve months minus the yearly discount, rounded half-up to the cent.
const fn yearly_per_user(monthly: Price) -> Price {
    let scaled = monthly.0 * 12 * (100 - YEARLY_PER_USER_DISCOUNT_PERCENT);
    Price((scaled + 50) / 100)
}

impl Plan {
    /// The full catalog in display order.
    pub fn catalog() -> &'static [Plan] {
        &CATALOG
    }

    /// Looks up a plan by key.
    pub fn get(key: PlanKey) -> &'static Plan {
        CATALOG
            .iter()
            .find(|plan| plan.key == key)
            .unwrap_or(&CATALOG[1])
    }

    /// Resolves a `?plan=` value; missing or unknown keys fall back to Pro monthly.
    pub fn resolve(key: Option<&str>) -> &'static Plan {
        let key = key
            .and_then(|k| k.parse::<PlanKey>().ok())
            .unwrap_or_default();
        Self::get(key)
    }

    /// Looks up the plan the backend was told about.
    ///
    /// Accepts either a key (`pro-yearly`) or a display name (`Pro`); a bare
    /// name resolves to its monthly variant, or the free plan for "Free".
    pub fn find_by_name_or_key(value: &str) -> Option<&'static Plan> {
        if let Ok(key) = value.parse::<PlanKey>() {
            return Some(Self::get(key));
        }
        let value = value.trim();
        CATALOG
            .iter()
            .filter(|plan| plan.name.eq_ignore_ascii_case(value))
            .find(|plan| matches!(plan.cycle, BillingCycle::Monthly | BillingCycle::Forever))
    }

    /// Plans for the monthly or yearly toggle of the pricing table.
    pub fn for_cycle(yearly: bool) -> impl Iterator<Item = &'static Plan> {
        let wanted = if yearly {
            BillingCycle::Yearly
        } else {
            BillingCycle::Monthly
        };
        CATALOG
            .iter()
            .filter(move |plan| plan.cycle == wanted || plan.cycle == BillingCycle::Forever)
    }

    /// What a yearly flat-priced plan saves over paying monthly.
    pub fn yearly_savings(&self) -> Option<Price> {
        if self.per_user || self.cycle != BillingCycle::Yearly {
            return None;
        }
        let monthly = CATALOG.iter().find(|plan| {
            plan.name == self.name && plan.cycle == BillingCycle::Monthly
        })?;
        Some(Price(monthly.price.0 * 12 - self.price.0))
    }

    /// Value sent to the backend as `plan`.
    ///
    /// Display names are shared between billing cycles, so the key is sent
    /// to keep the backend pricing the variant that was actually bought.
    pub fn wire_id(&self) -> &'static str {
        self.key.as_str()
    }

    /// Seats actually billed for a requested count.
    pub fn billed_seats(&self, users: u32) -> u32 {
        if !self.per_user {
            return 1;
        }
        users.max(self.min_users.unwrap_or(1))
    }

    /// Total charge for a number of seats, honoring the minimum seat count.
    pub fn total_for(&self, users: u32) -> Price {
        if !self.per_user {
            return self.price;
        }
        Price(self.price.0 * self.billed_seats(users) as i64)
    }

    /// Smallest amount that pays for this plan.
    pub fn minimum_charge(&self) -> Price {
        self.total_for(1)
    }
}
