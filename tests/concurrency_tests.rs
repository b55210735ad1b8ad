mod common;

use common::{register_user, test_app};
use rust_decimal_macros::dec;
use walletcore::domain::money::{Amount, Balance};
use walletcore::domain::ports::WalletStore;
use walletcore::domain::transaction::TransactionStatus;

#[tokio::test]
async fn test_concurrent_charges_never_overdraw() {
    let app = test_app();
    let (user, wallet, _subscription) = register_user(&app, "ppetrov").await;
    app.wallet_engine
        .top_up(wallet.id, Amount::new(dec!(35.00)).unwrap())
        .await
        .unwrap();
    // 55.00 on hand; ten concurrent charges of 10.00 each.

    let mut handles = Vec::new();
    for _ in 0..10 {
        let engine = app.wallet_engine.clone();
        let user = user.clone();
        let wallet_id = wallet.id;
        handles.push(tokio::spawn(async move {
            engine
                .charge(
                    &user,
                    wallet_id,
                    Amount::new(dec!(10.00)).unwrap(),
                    "load test",
                )
                .await
                .unwrap()
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        let tx = handle.await.unwrap();
        assert!(tx.balance_left.value() >= dec!(0));
        if tx.status == TransactionStatus::Succeeded {
            succeeded += 1;
        }
    }

    // Exactly five charges fit into 55.00; the rest fail on the balance
    // check instead of interleaving with the debits.
    assert_eq!(succeeded, 5);
    let stored = app.wallets.get(wallet.id).await.unwrap().unwrap();
    assert_eq!(stored.balance, Balance::new(dec!(5.00)));
}

#[tokio::test]
async fn test_concurrent_top_ups_all_land() {
    let app = test_app();
    let (_user, wallet, _subscription) = register_user(&app, "ppetrov").await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let engine = app.wallet_engine.clone();
        let wallet_id = wallet.id;
        handles.push(tokio::spawn(async move {
            engine
                .top_up(wallet_id, Amount::new(dec!(1.00)).unwrap())
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        let tx = handle.await.unwrap();
        assert_eq!(tx.status, TransactionStatus::Succeeded);
    }

    let stored = app.wallets.get(wallet.id).await.unwrap().unwrap();
    assert_eq!(stored.balance, Balance::new(dec!(40.00)));
}
