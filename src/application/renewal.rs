use crate::application::subscription::{SubscriptionEngine, UpgradeRequest};
use crate::domain::ports::{UserStore, UserStoreRef, WalletStore, WalletStoreRef};
use crate::domain::subscription::Subscription;
use crate::domain::transaction::TransactionStatus;
use crate::domain::wallet::{Wallet, WalletStatus};
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Periodic driver of the subscription state machine.
///
/// Each tick scans for active subscriptions past their due-date and applies
/// one of three transitions per subscription: re-purchase (monthly, funded),
/// terminate-and-downgrade (monthly, charge failed), or
/// complete-and-downgrade (yearly, no charge attempted). Every path retires
/// the old instance and leaves the owner with exactly one new active one.
pub struct RenewalScheduler {
    engine: Arc<SubscriptionEngine>,
    wallets: WalletStoreRef,
    users: UserStoreRef,
    interval: Duration,
}

impl RenewalScheduler {
    pub fn new(
        engine: Arc<SubscriptionEngine>,
        wallets: WalletStoreRef,
        users: UserStoreRef,
        interval: Duration,
    ) -> Self {
        Self {
            engine,
            wallets,
            users,
            interval,
        }
    }

    /// Runs ticks forever at the configured interval.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            if let Err(err) = self.tick(Utc::now()).await {
                tracing::error!(error = %err, "renewal tick failed");
            }
        }
    }

    /// One scheduler pass. Separated from [`run`](Self::run) so tests can
    /// drive it with a fixed clock. One subscription's fault is logged and
    /// never cancels the rest of the tick.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<()> {
        let due = self.engine.due_for_renewal(now).await?;
        if due.is_empty() {
            tracing::debug!("no subscriptions found for renewal");
            return Ok(());
        }

        for subscription in due {
            if let Err(err) = self.renew(&subscription).await {
                tracing::error!(
                    subscription_id = %subscription.id,
                    owner = %subscription.owner,
                    error = %err,
                    "subscription renewal failed; continuing with remaining due subscriptions"
                );
            }
        }
        Ok(())
    }

    async fn renew(&self, subscription: &Subscription) -> Result<()> {
        let owner = self
            .users
            .get(subscription.owner)
            .await?
            .ok_or_else(|| {
                LedgerError::NotFound(format!(
                    "User with id [{}] does not exist",
                    subscription.owner
                ))
            })?;

        if !subscription.renewal_allowed {
            self.engine.mark_completed(subscription).await?;
            self.engine.create_default(&owner).await?;
            return Ok(());
        }

        let renewed = match self.funding_wallet(owner.id).await? {
            Some(wallet) => {
                let request = UpgradeRequest {
                    period: subscription.period,
                    wallet_id: wallet.id,
                };
                let charge = self
                    .engine
                    .upgrade(&owner, subscription.tier, &request)
                    .await?;
                charge.status == TransactionStatus::Succeeded
            }
            None => false,
        };

        if !renewed {
            self.engine.mark_terminated(subscription).await?;
            self.engine.create_default(&owner).await?;
        }
        Ok(())
    }

    /// The wallet a renewal draws from: the owner's earliest-created active
    /// wallet, else the earliest-created one of any status (the charge then
    /// fails and takes the downgrade path). A user without wallets counts as
    /// a failed renewal.
    async fn funding_wallet(&self, owner: Uuid) -> Result<Option<Wallet>> {
        let wallets = self.wallets.find_by_owner(owner).await?;
        let active = wallets
            .iter()
            .find(|w| w.status == WalletStatus::Active)
            .cloned();
        Ok(active.or_else(|| wallets.into_iter().next()))
    }
}
