use crate::application::locks::LockMap;
use crate::application::wallet::WalletEngine;
use crate::domain::money::Amount;
use crate::domain::ports::{SubscriptionStore, SubscriptionStoreRef};
use crate::domain::subscription::{
    Subscription, SubscriptionPeriod, SubscriptionStatus, SubscriptionTier,
};
use crate::domain::transaction::{Transaction, TransactionStatus};
use crate::domain::user::User;
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Plan change order: the target period and the wallet the price is charged
/// to. The target tier travels separately because renewals reuse the
/// current one.
#[derive(Debug, Clone)]
pub struct UpgradeRequest {
    pub period: SubscriptionPeriod,
    pub wallet_id: Uuid,
}

/// Owns subscription creation, paid plan changes and lifecycle transitions.
pub struct SubscriptionEngine {
    subscriptions: SubscriptionStoreRef,
    wallet_engine: Arc<WalletEngine>,
    /// Keyed by owner id: plan swaps for one user serialize so the
    /// one-active-subscription invariant holds under concurrent upgrades.
    locks: LockMap,
}

impl SubscriptionEngine {
    pub fn new(subscriptions: SubscriptionStoreRef, wallet_engine: Arc<WalletEngine>) -> Self {
        Self {
            subscriptions,
            wallet_engine,
            locks: LockMap::new(),
        }
    }

    /// Puts the user on the free plan: active, monthly, renewable, due in
    /// one month.
    pub async fn create_default(&self, user: &User) -> Result<Subscription> {
        let subscription = Subscription::new_default(user.id, Utc::now());
        self.subscriptions.save(subscription.clone()).await?;
        tracing::info!(
            subscription_id = %subscription.id,
            owner = %user.id,
            tier = %subscription.tier,
            "created new subscription"
        );
        Ok(subscription)
    }

    /// Swaps the user's active subscription for a paid one.
    ///
    /// The price is charged first; a `Failed` charge is returned unchanged
    /// and the current subscription stays untouched. On success the new
    /// subscription is persisted and the previous one marked completed, all
    /// under the owner's lock, so callers never observe a partial swap
    /// through this engine.
    pub async fn upgrade(
        &self,
        user: &User,
        tier: SubscriptionTier,
        request: &UpgradeRequest,
    ) -> Result<Transaction> {
        let _guard = self.locks.acquire(user.id).await;

        let mut current = self
            .subscriptions
            .find_by_owner_and_status(user.id, SubscriptionStatus::Active)
            .await?
            .ok_or_else(|| {
                LedgerError::Domain(format!(
                    "No active subscription has been found for user with id [{}]",
                    user.id
                ))
            })?;

        let price = Amount::new(tier.price(request.period))?;
        let description = format!("Purchase of {} {} subscription", request.period, tier);

        let charge = self
            .wallet_engine
            .charge(user, request.wallet_id, price, &description)
            .await?;
        if charge.status == TransactionStatus::Failed {
            tracing::warn!(
                user_id = %user.id,
                tier = %tier,
                "failed charge for subscription"
            );
            return Ok(charge);
        }

        let now = Utc::now();
        let renewed = Subscription::new(user.id, tier, request.period, now);
        self.subscriptions.save(renewed).await?;

        current.complete(now);
        self.subscriptions.save(current).await?;

        Ok(charge)
    }

    /// Active subscriptions whose due-date has passed at `now`.
    pub async fn due_for_renewal(&self, now: DateTime<Utc>) -> Result<Vec<Subscription>> {
        self.subscriptions.find_due(now).await
    }

    pub async fn mark_completed(&self, subscription: &Subscription) -> Result<()> {
        let mut subscription = subscription.clone();
        subscription.complete(Utc::now());
        self.subscriptions.save(subscription).await
    }

    pub async fn mark_terminated(&self, subscription: &Subscription) -> Result<()> {
        let mut subscription = subscription.clone();
        subscription.terminate(Utc::now());
        self.subscriptions.save(subscription).await
    }
}
