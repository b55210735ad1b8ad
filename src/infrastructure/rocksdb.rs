use crate::domain::ports::{SubscriptionStore, TransactionStore, UserStore, WalletStore};
use crate::domain::subscription::{Subscription, SubscriptionStatus};
use crate::domain::transaction::Transaction;
use crate::domain::user::User;
use crate::domain::wallet::Wallet;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Column Family for wallet aggregates.
pub const CF_WALLETS: &str = "wallets";
/// Column Family for the transaction ledger.
pub const CF_TRANSACTIONS: &str = "transactions";
/// Column Family for subscription instances.
pub const CF_SUBSCRIPTIONS: &str = "subscriptions";
/// Column Family for the user directory.
pub const CF_USERS: &str = "users";

/// A persistent store implementation using RocksDB.
///
/// One column family per aggregate type, uuid bytes as keys, JSON values.
/// Secondary queries (by owner, by counterparty, due-date scans) iterate
/// the column family, which is adequate at personal-platform scale.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
}

impl RocksDbStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// all required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_WALLETS, CF_TRANSACTIONS, CF_SUBSCRIPTIONS, CF_USERS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            LedgerError::Storage(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn put<T: Serialize>(&self, cf_name: &str, key: Uuid, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key.as_bytes(), bytes)?;
        Ok(())
    }

    fn fetch<T: DeserializeOwned>(&self, cf_name: &str, key: Uuid) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }
}

#[async_trait]
impl WalletStore for RocksDbStore {
    async fn save(&self, wallet: Wallet) -> Result<()> {
        self.put(CF_WALLETS, wallet.id, &wallet)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Wallet>> {
        self.fetch(CF_WALLETS, id)
    }

    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Wallet>> {
        let mut owned: Vec<Wallet> = self
            .scan::<Wallet>(CF_WALLETS)?
            .into_iter()
            .filter(|w| w.owner == owner)
            .collect();
        owned.sort_by(|a, b| a.created_on.cmp(&b.created_on).then_with(|| a.id.cmp(&b.id)));
        Ok(owned)
    }
}

#[async_trait]
impl TransactionStore for RocksDbStore {
    async fn save(&self, tx: Transaction) -> Result<()> {
        self.put(CF_TRANSACTIONS, tx.id, &tx)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Transaction>> {
        self.fetch(CF_TRANSACTIONS, id)
    }

    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Transaction>> {
        let mut owned: Vec<Transaction> = self
            .scan::<Transaction>(CF_TRANSACTIONS)?
            .into_iter()
            .filter(|t| t.owner == owner)
            .collect();
        owned.sort_by(|a, b| b.created_on.cmp(&a.created_on));
        Ok(owned)
    }

    async fn find_by_wallet(&self, wallet_id: Uuid) -> Result<Vec<Transaction>> {
        let wallet_id = wallet_id.to_string();
        let mut involved: Vec<Transaction> = self
            .scan::<Transaction>(CF_TRANSACTIONS)?
            .into_iter()
            .filter(|t| t.sender == wallet_id || t.receiver == wallet_id)
            .collect();
        involved.sort_by(|a, b| b.created_on.cmp(&a.created_on));
        Ok(involved)
    }
}

#[async_trait]
impl SubscriptionStore for RocksDbStore {
    async fn save(&self, subscription: Subscription) -> Result<()> {
        self.put(CF_SUBSCRIPTIONS, subscription.id, &subscription)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Subscription>> {
        self.fetch(CF_SUBSCRIPTIONS, id)
    }

    async fn find_by_owner_and_status(
        &self,
        owner: Uuid,
        status: SubscriptionStatus,
    ) -> Result<Option<Subscription>> {
        Ok(self
            .scan::<Subscription>(CF_SUBSCRIPTIONS)?
            .into_iter()
            .filter(|s| s.owner == owner && s.status == status)
            .max_by_key(|s| s.created_on))
    }

    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Subscription>> {
        Ok(self
            .scan::<Subscription>(CF_SUBSCRIPTIONS)?
            .into_iter()
            .filter(|s| s.is_due(now))
            .collect())
    }
}

#[async_trait]
impl UserStore for RocksDbStore {
    async fn save(&self, user: User) -> Result<()> {
        self.put(CF_USERS, user.id, &user)
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        self.fetch(CF_USERS, id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .scan::<User>(CF_USERS)?
            .into_iter()
            .find(|u| u.username == username))
    }
}
