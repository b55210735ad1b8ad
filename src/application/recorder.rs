use crate::application::notify::{Notification, Notifier};
use crate::domain::ports::{TransactionStore, TransactionStoreRef};
use crate::domain::transaction::{Transaction, TransactionStatus};
use crate::error::Result;
use uuid::Uuid;

/// Subject line for transaction notifications.
const TRANSACTION_SUBJECT: &str = "Walletcore Transaction";

/// Appends immutable entries to the transaction ledger and tells the owner
/// about each one.
pub struct TransactionRecorder {
    transactions: TransactionStoreRef,
    notifier: Notifier,
}

impl TransactionRecorder {
    pub fn new(transactions: TransactionStoreRef, notifier: Notifier) -> Self {
        Self {
            transactions,
            notifier,
        }
    }

    /// Persists the entry and dispatches a best-effort notification to the
    /// owner. A `Failed` entry is a normal return value, not an error; the
    /// notification is enqueued after the write so it can at worst describe
    /// a durable entry, never a phantom one.
    pub async fn record(&self, tx: Transaction) -> Result<Transaction> {
        self.transactions.save(tx.clone()).await?;

        self.notifier.send(Notification {
            user_id: tx.owner,
            subject: TRANSACTION_SUBJECT.to_string(),
            body: notification_body(&tx),
        });

        Ok(tx)
    }

    /// All of a user's transactions, newest first.
    pub async fn history_for_owner(&self, owner: Uuid) -> Result<Vec<Transaction>> {
        self.transactions.find_by_owner(owner).await
    }

    /// Transactions in which the wallet appears as sender or receiver,
    /// newest first.
    pub async fn history_for_wallet(&self, wallet_id: Uuid) -> Result<Vec<Transaction>> {
        self.transactions.find_by_wallet(wallet_id).await
    }
}

fn notification_body(tx: &Transaction) -> String {
    match (tx.status, tx.failure_reason.as_deref()) {
        (TransactionStatus::Failed, Some(reason)) => format!(
            "{} transaction with amount {:.2} {} failed! Reason: {}.",
            tx.kind,
            tx.amount.value(),
            tx.currency,
            reason
        ),
        _ => format!(
            "{} transaction with amount {:.2} {} was successfully processed!",
            tx.kind,
            tx.amount.value(),
            tx.currency
        ),
    }
}
