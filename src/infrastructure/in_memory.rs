use crate::domain::ports::{SubscriptionStore, TransactionStore, UserStore, WalletStore};
use crate::domain::subscription::{Subscription, SubscriptionStatus};
use crate::domain::transaction::Transaction;
use crate::domain::user::User;
use crate::domain::wallet::Wallet;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A thread-safe in-memory wallet store.
///
/// Uses `Arc<RwLock<HashMap>>` to allow shared concurrent access. Ideal for
/// testing and development where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryWalletStore {
    wallets: Arc<RwLock<HashMap<Uuid, Wallet>>>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn save(&self, wallet: Wallet) -> Result<()> {
        let mut wallets = self.wallets.write().await;
        wallets.insert(wallet.id, wallet);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Wallet>> {
        let wallets = self.wallets.read().await;
        Ok(wallets.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Wallet>> {
        let wallets = self.wallets.read().await;
        let mut owned: Vec<Wallet> = wallets
            .values()
            .filter(|w| w.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_on.cmp(&b.created_on).then_with(|| a.id.cmp(&b.id)));
        Ok(owned)
    }
}

/// A thread-safe in-memory transaction store.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    transactions: Arc<RwLock<HashMap<Uuid, Transaction>>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn save(&self, tx: Transaction) -> Result<()> {
        let mut transactions = self.transactions.write().await;
        transactions.insert(tx.id, tx);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Transaction>> {
        let transactions = self.transactions.read().await;
        let mut owned: Vec<Transaction> = transactions
            .values()
            .filter(|t| t.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_on.cmp(&a.created_on));
        Ok(owned)
    }

    async fn find_by_wallet(&self, wallet_id: Uuid) -> Result<Vec<Transaction>> {
        let wallet_id = wallet_id.to_string();
        let transactions = self.transactions.read().await;
        let mut involved: Vec<Transaction> = transactions
            .values()
            .filter(|t| t.sender == wallet_id || t.receiver == wallet_id)
            .cloned()
            .collect();
        involved.sort_by(|a, b| b.created_on.cmp(&a.created_on));
        Ok(involved)
    }
}

/// A thread-safe in-memory subscription store.
#[derive(Default, Clone)]
pub struct InMemorySubscriptionStore {
    subscriptions: Arc<RwLock<HashMap<Uuid, Subscription>>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn save(&self, subscription: Subscription) -> Result<()> {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions.insert(subscription.id, subscription);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Subscription>> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions.get(&id).cloned())
    }

    async fn find_by_owner_and_status(
        &self,
        owner: Uuid,
        status: SubscriptionStatus,
    ) -> Result<Option<Subscription>> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions
            .values()
            .filter(|s| s.owner == owner && s.status == status)
            .max_by_key(|s| s.created_on)
            .cloned())
    }

    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Subscription>> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions
            .values()
            .filter(|s| s.is_due(now))
            .cloned()
            .collect())
    }
}

/// A thread-safe in-memory user directory.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn save(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        users.insert(user.id, user);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }
}
