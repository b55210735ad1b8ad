mod common;

use chrono::{Duration, Utc};
use common::{active_subscription, force_due, register_user, test_app};
use rust_decimal_macros::dec;
use uuid::Uuid;
use walletcore::application::subscription::UpgradeRequest;
use walletcore::domain::money::{Amount, Balance};
use walletcore::domain::ports::{SubscriptionStore, TransactionStore, WalletStore};
use walletcore::domain::subscription::{
    Subscription, SubscriptionPeriod, SubscriptionStatus, SubscriptionTier,
};

#[tokio::test]
async fn test_tick_without_due_subscriptions_is_a_noop() {
    let app = test_app();
    let (user, _wallet, subscription) = register_user(&app, "ppetrov").await;

    app.scheduler.tick(Utc::now()).await.unwrap();

    let current = active_subscription(&app, user.id).await;
    assert_eq!(current.id, subscription.id);
    assert_eq!(current.status, SubscriptionStatus::Active);
}

#[tokio::test]
async fn test_monthly_renewal_with_sufficient_funds() {
    let app = test_app();
    let (user, wallet, _subscription) = register_user(&app, "ppetrov").await;
    app.wallet_engine
        .top_up(wallet.id, Amount::new(dec!(100.00)).unwrap())
        .await
        .unwrap();

    let request = UpgradeRequest {
        period: SubscriptionPeriod::Monthly,
        wallet_id: wallet.id,
    };
    app.subscription_engine
        .upgrade(&user, SubscriptionTier::Premium, &request)
        .await
        .unwrap();
    let premium = active_subscription(&app, user.id).await;
    force_due(&app, premium.id).await;

    app.scheduler.tick(Utc::now()).await.unwrap();

    // 20.00 + 100.00 - 19.99 - 19.99
    let stored_wallet = app.wallets.get(wallet.id).await.unwrap().unwrap();
    assert_eq!(stored_wallet.balance, Balance::new(dec!(80.02)));

    let previous = app.subscriptions.get(premium.id).await.unwrap().unwrap();
    assert_eq!(previous.status, SubscriptionStatus::Completed);

    let current = active_subscription(&app, user.id).await;
    assert_eq!(current.tier, SubscriptionTier::Premium);
    assert_eq!(current.period, SubscriptionPeriod::Monthly);
    assert!(current.completed_on > Utc::now());
}

#[tokio::test]
async fn test_free_plan_renews_through_a_zero_charge() {
    let app = test_app();
    let (user, wallet, subscription) = register_user(&app, "ppetrov").await;
    force_due(&app, subscription.id).await;

    app.scheduler.tick(Utc::now()).await.unwrap();

    let previous = app
        .subscriptions
        .get(subscription.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(previous.status, SubscriptionStatus::Completed);

    let current = active_subscription(&app, user.id).await;
    assert_eq!(current.tier, SubscriptionTier::Default);

    let stored_wallet = app.wallets.get(wallet.id).await.unwrap().unwrap();
    assert_eq!(stored_wallet.balance, Balance::new(dec!(20.00)));
}

#[tokio::test]
async fn test_failed_renewal_terminates_and_downgrades() {
    let app = test_app();
    let (user, wallet, _subscription) = register_user(&app, "ppetrov").await;

    let request = UpgradeRequest {
        period: SubscriptionPeriod::Monthly,
        wallet_id: wallet.id,
    };
    app.subscription_engine
        .upgrade(&user, SubscriptionTier::Premium, &request)
        .await
        .unwrap();
    // 0.01 left: the next 19.99 charge must fail.
    let premium = active_subscription(&app, user.id).await;
    force_due(&app, premium.id).await;

    app.scheduler.tick(Utc::now()).await.unwrap();

    let previous = app.subscriptions.get(premium.id).await.unwrap().unwrap();
    assert_eq!(previous.status, SubscriptionStatus::Terminated);

    let current = active_subscription(&app, user.id).await;
    assert_eq!(current.tier, SubscriptionTier::Default);
    assert_eq!(current.period, SubscriptionPeriod::Monthly);

    let stored_wallet = app.wallets.get(wallet.id).await.unwrap().unwrap();
    assert_eq!(stored_wallet.balance, Balance::new(dec!(0.01)));
}

#[tokio::test]
async fn test_yearly_subscription_completes_without_charging() {
    let app = test_app();
    let (user, wallet, _subscription) = register_user(&app, "ppetrov").await;
    app.wallet_engine
        .top_up(wallet.id, Amount::new(dec!(200.00)).unwrap())
        .await
        .unwrap();

    let request = UpgradeRequest {
        period: SubscriptionPeriod::Yearly,
        wallet_id: wallet.id,
    };
    app.subscription_engine
        .upgrade(&user, SubscriptionTier::Premium, &request)
        .await
        .unwrap();
    let yearly = active_subscription(&app, user.id).await;
    force_due(&app, yearly.id).await;

    let entries_before = app.transactions.find_by_owner(user.id).await.unwrap().len();

    app.scheduler.tick(Utc::now()).await.unwrap();

    let previous = app.subscriptions.get(yearly.id).await.unwrap().unwrap();
    assert_eq!(previous.status, SubscriptionStatus::Completed);

    let current = active_subscription(&app, user.id).await;
    assert_eq!(current.tier, SubscriptionTier::Default);

    // No charge was attempted: balance and ledger are unchanged.
    let stored_wallet = app.wallets.get(wallet.id).await.unwrap().unwrap();
    assert_eq!(stored_wallet.balance, Balance::new(dec!(20.01)));
    let entries_after = app.transactions.find_by_owner(user.id).await.unwrap().len();
    assert_eq!(entries_after, entries_before);
}

#[tokio::test]
async fn test_one_faulty_subscription_does_not_stop_the_tick() {
    let app = test_app();

    // A due subscription whose owner is missing from the directory faults
    // with NotFound inside the tick.
    let mut orphaned = Subscription::new_default(Uuid::new_v4(), Utc::now());
    orphaned.completed_on = Utc::now() - Duration::days(1);
    app.subscriptions.save(orphaned.clone()).await.unwrap();

    let (user, _wallet, subscription) = register_user(&app, "ppetrov").await;
    force_due(&app, subscription.id).await;

    app.scheduler.tick(Utc::now()).await.unwrap();

    // The orphan is untouched, the healthy subscription still renewed.
    let orphaned_after = app.subscriptions.get(orphaned.id).await.unwrap().unwrap();
    assert_eq!(orphaned_after.status, SubscriptionStatus::Active);

    let previous = app
        .subscriptions
        .get(subscription.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(previous.status, SubscriptionStatus::Completed);
    let current = active_subscription(&app, user.id).await;
    assert_ne!(current.id, subscription.id);
}
