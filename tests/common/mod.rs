use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;
use walletcore::application::notify::Notifier;
use walletcore::application::recorder::TransactionRecorder;
use walletcore::application::renewal::RenewalScheduler;
use walletcore::application::subscription::SubscriptionEngine;
use walletcore::application::wallet::WalletEngine;
use walletcore::domain::ports::{
    SubscriptionStore, SubscriptionStoreRef, TransactionStoreRef, UserStore, UserStoreRef,
    WalletStoreRef,
};
use walletcore::domain::subscription::{Subscription, SubscriptionStatus};
use walletcore::domain::user::User;
use walletcore::domain::wallet::Wallet;
use walletcore::infrastructure::in_memory::{
    InMemorySubscriptionStore, InMemoryTransactionStore, InMemoryUserStore, InMemoryWalletStore,
};
use walletcore::infrastructure::observers::{LoggingNotificationGateway, LoggingPaymentPublisher};

/// Fully wired application over in-memory stores.
pub struct TestApp {
    pub users: UserStoreRef,
    pub wallets: WalletStoreRef,
    pub transactions: TransactionStoreRef,
    pub subscriptions: SubscriptionStoreRef,
    pub wallet_engine: Arc<WalletEngine>,
    pub subscription_engine: Arc<SubscriptionEngine>,
    pub scheduler: RenewalScheduler,
}

pub fn test_app() -> TestApp {
    let users: UserStoreRef = Arc::new(InMemoryUserStore::new());
    let wallets: WalletStoreRef = Arc::new(InMemoryWalletStore::new());
    let transactions: TransactionStoreRef = Arc::new(InMemoryTransactionStore::new());
    let subscriptions: SubscriptionStoreRef = Arc::new(InMemorySubscriptionStore::new());

    let recorder = Arc::new(TransactionRecorder::new(
        transactions.clone(),
        Notifier::spawn(Arc::new(LoggingNotificationGateway)),
    ));
    let wallet_engine = Arc::new(WalletEngine::new(
        wallets.clone(),
        users.clone(),
        subscriptions.clone(),
        recorder,
        Arc::new(LoggingPaymentPublisher),
    ));
    let subscription_engine = Arc::new(SubscriptionEngine::new(
        subscriptions.clone(),
        wallet_engine.clone(),
    ));
    let scheduler = RenewalScheduler::new(
        subscription_engine.clone(),
        wallets.clone(),
        users.clone(),
        std::time::Duration::from_secs(20),
    );

    TestApp {
        users,
        wallets,
        transactions,
        subscriptions,
        wallet_engine,
        subscription_engine,
        scheduler,
    }
}

/// Registers a user the way the platform does: directory entry, default
/// subscription, first wallet with its 20.00 EUR opening balance.
pub async fn register_user(app: &TestApp, username: &str) -> (User, Wallet, Subscription) {
    let user = User::new(username, format!("{username}@example.com"));
    app.users.save(user.clone()).await.unwrap();
    let subscription = app.subscription_engine.create_default(&user).await.unwrap();
    let wallet = app
        .wallet_engine
        .initialize_first_wallet(&user)
        .await
        .unwrap();
    (user, wallet, subscription)
}

/// The owner's current active subscription.
pub async fn active_subscription(app: &TestApp, owner: Uuid) -> Subscription {
    app.subscriptions
        .find_by_owner_and_status(owner, SubscriptionStatus::Active)
        .await
        .unwrap()
        .expect("owner should have an active subscription")
}

/// Rewinds a subscription's due-date into the past so the next scheduler
/// tick picks it up.
pub async fn force_due(app: &TestApp, subscription_id: Uuid) {
    let mut subscription = app
        .subscriptions
        .get(subscription_id)
        .await
        .unwrap()
        .expect("subscription should exist");
    subscription.completed_on = Utc::now() - Duration::days(1);
    app.subscriptions.save(subscription).await.unwrap();
}
