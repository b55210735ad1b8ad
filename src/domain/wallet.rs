use crate::domain::money::{Amount, Balance};
use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Currency every wallet is denominated in.
pub const DEFAULT_CURRENCY: &str = "EUR";

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    Active,
    Inactive,
}

/// A user's monetary wallet.
///
/// The balance is only ever mutated through the wallet engine, which holds
/// the wallet's lock across the read-decide-write sequence. `balance` never
/// goes negative: the engine records a failed withdrawal instead of
/// overdrawing.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Wallet {
    pub id: Uuid,
    /// Id of the owning user.
    pub owner: Uuid,
    pub status: WalletStatus,
    pub balance: Balance,
    pub currency: String,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl Wallet {
    pub fn open(owner: Uuid, opening_balance: Balance, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            status: WalletStatus::Active,
            balance: opening_balance,
            currency: DEFAULT_CURRENCY.to_string(),
            created_on: now,
            updated_on: now,
        }
    }

    /// Whether the balance is sufficient to withdraw `amount`.
    pub fn covers(&self, amount: Amount) -> bool {
        self.balance >= Balance::from(amount)
    }

    /// Adds `amount` to the balance.
    pub fn credit(&mut self, amount: Amount, now: DateTime<Utc>) {
        self.balance += amount.into();
        self.updated_on = now;
    }

    /// Subtracts `amount` from the balance if covered.
    pub fn debit(&mut self, amount: Amount, now: DateTime<Utc>) -> Result<(), LedgerError> {
        if !self.covers(amount) {
            return Err(LedgerError::Validation(
                "Insufficient funds".to_string(),
            ));
        }
        self.balance -= amount.into();
        self.updated_on = now;
        Ok(())
    }

    pub fn toggle_status(&mut self, now: DateTime<Utc>) {
        self.status = match self.status {
            WalletStatus::Active => WalletStatus::Inactive,
            WalletStatus::Inactive => WalletStatus::Active,
        };
        self.updated_on = now;
    }
}
