use crate::application::locks::LockMap;
use crate::application::recorder::TransactionRecorder;
use crate::domain::money::{Amount, Balance};
use crate::domain::ports::{
    PaymentEvent, PaymentEventPublisherRef, SubscriptionStore, SubscriptionStoreRef, UserStore,
    UserStoreRef, WalletStore, WalletStoreRef,
};
use crate::domain::subscription::SubscriptionStatus;
use crate::domain::transaction::{Transaction, TransactionKind, TransactionSpec, TransactionStatus};
use crate::domain::user::User;
use crate::domain::wallet::{Wallet, WalletStatus};
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;
use std::sync::Arc;
use uuid::Uuid;

/// Counterparty name recorded for top-ups and charges that do not involve
/// another user's wallet.
pub const LEDGER_COUNTERPARTY: &str = "Walletcore Ltd";

/// Transfer order: move `amount` from one of the sender's wallets to the
/// first active wallet of the named receiver.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub from_wallet_id: Uuid,
    pub to_username: String,
    pub amount: Amount,
}

/// Owns all balance mutation.
///
/// Every money-moving operation runs read-current-state, decide, write,
/// record-transaction as one atomic unit per wallet: the wallet's entry in
/// the lock map is held across the whole sequence. Rule violations that are
/// themselves ledger outcomes come back as `Failed` transactions; structural
/// faults come back as errors.
pub struct WalletEngine {
    wallets: WalletStoreRef,
    users: UserStoreRef,
    subscriptions: SubscriptionStoreRef,
    recorder: Arc<TransactionRecorder>,
    payments: PaymentEventPublisherRef,
    locks: LockMap,
}

impl WalletEngine {
    pub fn new(
        wallets: WalletStoreRef,
        users: UserStoreRef,
        subscriptions: SubscriptionStoreRef,
        recorder: Arc<TransactionRecorder>,
        payments: PaymentEventPublisherRef,
    ) -> Self {
        Self {
            wallets,
            users,
            subscriptions,
            recorder,
            payments,
            locks: LockMap::new(),
        }
    }

    /// Creates the user's first wallet, opened with a 20.00 EUR starting
    /// balance.
    pub async fn initialize_first_wallet(&self, user: &User) -> Result<Wallet> {
        let existing = self.wallets.find_by_owner(user.id).await?;
        if !existing.is_empty() {
            return Err(LedgerError::Domain(format!(
                "User with id [{}] already has wallets; first wallet can't be initialized",
                user.id
            )));
        }

        let wallet = Wallet::open(user.id, Balance::new(dec!(20.00)), Utc::now());
        self.wallets.save(wallet.clone()).await?;
        tracing::info!(
            wallet_id = %wallet.id,
            owner = %user.id,
            balance = %wallet.balance.value(),
            "created new wallet"
        );
        Ok(wallet)
    }

    /// Opens an additional, empty wallet if the user's plan still has room:
    /// Default plans hold 1 wallet, Premium 2, Ultimate 3.
    pub async fn unlock_new_wallet(&self, user: &User) -> Result<Wallet> {
        let wallets = self.wallets.find_by_owner(user.id).await?;
        let subscription = self
            .subscriptions
            .find_by_owner_and_status(user.id, SubscriptionStatus::Active)
            .await?
            .ok_or_else(|| {
                LedgerError::Domain(format!(
                    "No active subscription has been found for user with id [{}]",
                    user.id
                ))
            })?;

        if wallets.len() >= subscription.tier.wallet_limit() {
            return Err(LedgerError::LimitExceeded(format!(
                "Max wallets count reached for user with id [{}] on {} plan",
                user.id, subscription.tier
            )));
        }

        let wallet = Wallet::open(user.id, Balance::ZERO, Utc::now());
        self.wallets.save(wallet.clone()).await?;
        Ok(wallet)
    }

    /// Withdraws `amount` from the wallet in favor of the ledger
    /// counterparty.
    ///
    /// An inactive wallet or insufficient funds produce a recorded `Failed`
    /// withdrawal with the balance untouched. A successful charge also
    /// publishes a payment event for downstream listeners; the publication
    /// outcome is logged and never propagated.
    pub async fn charge(
        &self,
        user: &User,
        wallet_id: Uuid,
        amount: Amount,
        description: &str,
    ) -> Result<Transaction> {
        let _guard = self.locks.acquire(wallet_id).await;
        let now = Utc::now();
        let mut wallet = self.get_wallet(wallet_id).await?;

        let spec = |wallet: &Wallet| TransactionSpec {
            owner: user.id,
            sender: wallet.id.to_string(),
            receiver: LEDGER_COUNTERPARTY.to_string(),
            amount,
            balance_left: wallet.balance,
            currency: wallet.currency.clone(),
            kind: TransactionKind::Withdrawal,
            description: description.to_string(),
        };

        if wallet.status == WalletStatus::Inactive {
            return self
                .recorder
                .record(spec(&wallet).failed("Inactive wallet", now))
                .await;
        }
        if !wallet.covers(amount) {
            return self
                .recorder
                .record(spec(&wallet).failed("Insufficient funds", now))
                .await;
        }

        wallet.debit(amount, now)?;
        self.wallets.save(wallet.clone()).await?;
        self.publish_payment(user, amount, now).await;

        self.recorder.record(spec(&wallet).succeeded(now)).await
    }

    /// Deposits `amount` into the wallet from the ledger counterparty.
    pub async fn top_up(&self, wallet_id: Uuid, amount: Amount) -> Result<Transaction> {
        let _guard = self.locks.acquire(wallet_id).await;
        let now = Utc::now();
        let mut wallet = self.get_wallet(wallet_id).await?;
        let description = format!("Top up {:.2}", amount.value());

        let spec = |wallet: &Wallet| TransactionSpec {
            owner: wallet.owner,
            sender: LEDGER_COUNTERPARTY.to_string(),
            receiver: wallet.id.to_string(),
            amount,
            balance_left: wallet.balance,
            currency: wallet.currency.clone(),
            kind: TransactionKind::Deposit,
            description: description.clone(),
        };

        if wallet.status == WalletStatus::Inactive {
            return self
                .recorder
                .record(spec(&wallet).failed("Inactive wallet", now))
                .await;
        }

        wallet.credit(amount, now);
        self.wallets.save(wallet.clone()).await?;

        self.recorder.record(spec(&wallet).succeeded(now)).await
    }

    /// Moves funds between two users.
    ///
    /// The receiver is the named user's earliest-created active wallet. The
    /// debit and credit legs each lock only their own wallet and the two
    /// locks are never held together; the debit always lands first, so a
    /// crash between the legs leaves a succeeded withdrawal with no matching
    /// deposit for reconciliation to find. Returns the sender's withdrawal
    /// transaction; a successful transfer additionally records an
    /// independent deposit for the receiver.
    pub async fn transfer_funds(
        &self,
        sender: &User,
        request: &TransferRequest,
    ) -> Result<Transaction> {
        let sender_wallet = self.get_wallet(request.from_wallet_id).await?;
        let description = format!(
            "Transfer from {} to {} for {:.2} EUR",
            sender.username,
            request.to_username,
            request.amount.value()
        );

        let Some(receiver_wallet) = self.first_active_wallet(&request.to_username).await? else {
            let failed = TransactionSpec {
                owner: sender.id,
                sender: sender_wallet.id.to_string(),
                receiver: request.to_username.clone(),
                amount: request.amount,
                balance_left: sender_wallet.balance,
                currency: sender_wallet.currency.clone(),
                kind: TransactionKind::Withdrawal,
                description,
            }
            .failed("Invalid criteria for transfer", Utc::now());
            return self.recorder.record(failed).await;
        };

        let withdrawal = self
            .charge(sender, sender_wallet.id, request.amount, &description)
            .await?;
        if withdrawal.status == TransactionStatus::Failed {
            return Ok(withdrawal);
        }

        // Credit leg: re-read under the receiver's own lock; the sender's
        // lock was released when the charge returned.
        let _guard = self.locks.acquire(receiver_wallet.id).await;
        let now = Utc::now();
        let mut receiver_wallet = self.get_wallet(receiver_wallet.id).await?;
        receiver_wallet.credit(request.amount, now);
        self.wallets.save(receiver_wallet.clone()).await?;

        self.recorder
            .record(
                TransactionSpec {
                    owner: receiver_wallet.owner,
                    sender: sender.username.clone(),
                    receiver: receiver_wallet.id.to_string(),
                    amount: request.amount,
                    balance_left: receiver_wallet.balance,
                    currency: receiver_wallet.currency.clone(),
                    kind: TransactionKind::Deposit,
                    description,
                }
                .succeeded(now),
            )
            .await?;

        Ok(withdrawal)
    }

    /// Toggles the wallet between active and inactive.
    pub async fn switch_status(&self, wallet_id: Uuid, owner_id: Uuid) -> Result<Wallet> {
        let _guard = self.locks.acquire(wallet_id).await;
        let mut wallet = self.get_wallet(wallet_id).await?;
        if wallet.owner != owner_id {
            return Err(LedgerError::NotOwned(format!(
                "Wallet with id [{wallet_id}] does not belong to user with id [{owner_id}]"
            )));
        }

        wallet.toggle_status(Utc::now());
        self.wallets.save(wallet.clone()).await?;
        Ok(wallet)
    }

    async fn get_wallet(&self, id: Uuid) -> Result<Wallet> {
        self.wallets.get(id).await?.ok_or_else(|| {
            LedgerError::NotFound(format!("Wallet with id [{id}] does not exist"))
        })
    }

    async fn first_active_wallet(&self, username: &str) -> Result<Option<Wallet>> {
        let Some(receiver) = self.users.find_by_username(username).await? else {
            return Ok(None);
        };
        let wallets = self.wallets.find_by_owner(receiver.id).await?;
        Ok(wallets
            .into_iter()
            .find(|w| w.status == WalletStatus::Active))
    }

    async fn publish_payment(&self, user: &User, amount: Amount, now: DateTime<Utc>) {
        let event = PaymentEvent {
            user_id: user.id,
            email: user.email.clone(),
            amount: amount.value(),
            occurred_on: now,
        };
        if let Err(err) = self.payments.publish(event).await {
            tracing::warn!(user_id = %user.id, error = %err, "payment event publication failed");
        }
    }
}
