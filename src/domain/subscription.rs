use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Completed,
    Terminated,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPeriod {
    Monthly,
    Yearly,
}

impl SubscriptionPeriod {
    /// The renewal due-date for a subscription starting at `from`.
    pub fn next_due(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            SubscriptionPeriod::Monthly => from + Months::new(1),
            SubscriptionPeriod::Yearly => from + Months::new(12),
        }
    }
}

impl fmt::Display for SubscriptionPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionPeriod::Monthly => write!(f, "Monthly"),
            SubscriptionPeriod::Yearly => write!(f, "Yearly"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Default,
    Premium,
    Ultimate,
}

impl SubscriptionTier {
    /// Fixed pricing table. The Default tier is free on every period.
    pub fn price(&self, period: SubscriptionPeriod) -> Decimal {
        match self {
            SubscriptionTier::Default => Decimal::ZERO,
            SubscriptionTier::Premium => match period {
                SubscriptionPeriod::Monthly => dec!(19.99),
                SubscriptionPeriod::Yearly => dec!(199.99),
            },
            SubscriptionTier::Ultimate => match period {
                SubscriptionPeriod::Monthly => dec!(49.99),
                SubscriptionPeriod::Yearly => dec!(499.99),
            },
        }
    }

    /// How many wallets a user on this plan may hold.
    pub fn wallet_limit(&self) -> usize {
        match self {
            SubscriptionTier::Default => 1,
            SubscriptionTier::Premium => 2,
            SubscriptionTier::Ultimate => 3,
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionTier::Default => write!(f, "Default"),
            SubscriptionTier::Premium => write!(f, "Premium"),
            SubscriptionTier::Ultimate => write!(f, "Ultimate"),
        }
    }
}

/// A user's plan for one billing period.
///
/// While `status` is `Active`, `completed_on` holds the renewal due-date.
/// Once the instance goes `Completed` or `Terminated` it is terminal and
/// `completed_on` records the transition time; a user always holds exactly
/// one `Active` instance.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Subscription {
    pub id: Uuid,
    /// Id of the owning user.
    pub owner: Uuid,
    pub status: SubscriptionStatus,
    pub period: SubscriptionPeriod,
    pub tier: SubscriptionTier,
    pub price: Decimal,
    /// True exactly for monthly subscriptions; yearly ones run out instead
    /// of re-purchasing.
    pub renewal_allowed: bool,
    pub created_on: DateTime<Utc>,
    pub completed_on: DateTime<Utc>,
}

impl Subscription {
    pub fn new(
        owner: Uuid,
        tier: SubscriptionTier,
        period: SubscriptionPeriod,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            status: SubscriptionStatus::Active,
            period,
            tier,
            price: tier.price(period),
            renewal_allowed: period == SubscriptionPeriod::Monthly,
            created_on: now,
            completed_on: period.next_due(now),
        }
    }

    /// The free plan every user starts on and falls back to.
    pub fn new_default(owner: Uuid, now: DateTime<Utc>) -> Self {
        Self::new(
            owner,
            SubscriptionTier::Default,
            SubscriptionPeriod::Monthly,
            now,
        )
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.completed_on <= now
    }

    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.status = SubscriptionStatus::Completed;
        self.completed_on = now;
    }

    pub fn terminate(&mut self, now: DateTime<Utc>) {
        self.status = SubscriptionStatus::Terminated;
        self.completed_on = now;
    }
}
