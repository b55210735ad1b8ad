use crate::domain::money::{Amount, Balance};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "DEPOSIT"),
            TransactionKind::Withdrawal => write!(f, "WITHDRAWAL"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Succeeded,
    Failed,
}

/// An immutable entry in the ledger.
///
/// `sender` and `receiver` are free-text counterparty identifiers: a
/// stringified wallet id, a username, or the fixed ledger counterparty name.
/// Entries are append-only; once recorded they are never updated or deleted,
/// which makes the ledger the durable source of truth for reconciliation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    pub id: Uuid,
    /// Id of the user this entry belongs to.
    pub owner: Uuid,
    pub sender: String,
    pub receiver: String,
    pub amount: Amount,
    /// Balance of the mutated wallet right after the operation.
    pub balance_left: Balance,
    pub currency: String,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub description: String,
    /// Present exactly when `status` is `Failed`.
    pub failure_reason: Option<String>,
    pub created_on: DateTime<Utc>,
}

/// Field set common to both transaction outcomes; finished into an immutable
/// `Transaction` by [`TransactionSpec::succeeded`] or
/// [`TransactionSpec::failed`].
#[derive(Debug, Clone)]
pub struct TransactionSpec {
    pub owner: Uuid,
    pub sender: String,
    pub receiver: String,
    pub amount: Amount,
    pub balance_left: Balance,
    pub currency: String,
    pub kind: TransactionKind,
    pub description: String,
}

impl TransactionSpec {
    pub fn succeeded(self, now: DateTime<Utc>) -> Transaction {
        self.finish(TransactionStatus::Succeeded, None, now)
    }

    pub fn failed(self, reason: impl Into<String>, now: DateTime<Utc>) -> Transaction {
        self.finish(TransactionStatus::Failed, Some(reason.into()), now)
    }

    fn finish(
        self,
        status: TransactionStatus,
        failure_reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            owner: self.owner,
            sender: self.sender,
            receiver: self.receiver,
            amount: self.amount,
            balance_left: self.balance_left,
            currency: self.currency,
            kind: self.kind,
            status,
            description: self.description,
            failure_reason,
            created_on: now,
        }
    }
}
