use crate::domain::subscription::{Subscription, SubscriptionStatus};
use crate::domain::transaction::Transaction;
use crate::domain::user::User;
use crate::domain::wallet::Wallet;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn save(&self, wallet: Wallet) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Wallet>>;
    /// All wallets of one owner, earliest-created first (ties broken by id).
    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Wallet>>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn save(&self, tx: Transaction) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Transaction>>;
    /// All transactions owned by a user, newest first.
    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Transaction>>;
    /// All transactions where the stringified wallet id appears as sender or
    /// receiver, newest first.
    async fn find_by_wallet(&self, wallet_id: Uuid) -> Result<Vec<Transaction>>;
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn save(&self, subscription: Subscription) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Subscription>>;
    /// The owner's most recently created subscription in the given status.
    async fn find_by_owner_and_status(
        &self,
        owner: Uuid,
        status: SubscriptionStatus,
    ) -> Result<Option<Subscription>>;
    /// Active subscriptions whose due-date has passed.
    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Subscription>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn save(&self, user: User) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// Remote notification dispatch. Best-effort from the ledger's perspective:
/// callers log failures and move on.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn notify(&self, user_id: Uuid, subject: &str, body: &str) -> Result<()>;
}

/// Emitted after every successful charge for downstream listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentEvent {
    pub user_id: Uuid,
    pub email: String,
    pub amount: Decimal,
    pub occurred_on: DateTime<Utc>,
}

/// Observer hook for payment events; no core logic depends on its outcome.
#[async_trait]
pub trait PaymentEventPublisher: Send + Sync {
    async fn publish(&self, event: PaymentEvent) -> Result<()>;
}

pub type WalletStoreRef = Arc<dyn WalletStore>;
pub type TransactionStoreRef = Arc<dyn TransactionStore>;
pub type SubscriptionStoreRef = Arc<dyn SubscriptionStore>;
pub type UserStoreRef = Arc<dyn UserStore>;
pub type NotificationGatewayRef = Arc<dyn NotificationGateway>;
pub type PaymentEventPublisherRef = Arc<dyn PaymentEventPublisher>;
