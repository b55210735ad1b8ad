use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use walletcore::application::notify::Notifier;
use walletcore::application::recorder::TransactionRecorder;
use walletcore::application::renewal::RenewalScheduler;
use walletcore::application::subscription::SubscriptionEngine;
use walletcore::application::wallet::WalletEngine;
use walletcore::domain::ports::{
    SubscriptionStoreRef, TransactionStoreRef, UserStore, UserStoreRef, WalletStoreRef,
};
use walletcore::domain::user::User;
use walletcore::infrastructure::in_memory::{
    InMemorySubscriptionStore, InMemoryTransactionStore, InMemoryUserStore, InMemoryWalletStore,
};
use walletcore::infrastructure::observers::{LoggingNotificationGateway, LoggingPaymentPublisher};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Seconds between renewal scheduler ticks.
    #[arg(long, default_value_t = 20)]
    tick_secs: u64,

    /// Seed a demo user with a default subscription and first wallet.
    #[arg(long)]
    seed_demo: bool,
}

struct Stores {
    wallets: WalletStoreRef,
    transactions: TransactionStoreRef,
    subscriptions: SubscriptionStoreRef,
    users: UserStoreRef,
}

fn in_memory_stores() -> Stores {
    Stores {
        wallets: Arc::new(InMemoryWalletStore::new()),
        transactions: Arc::new(InMemoryTransactionStore::new()),
        subscriptions: Arc::new(InMemorySubscriptionStore::new()),
        users: Arc::new(InMemoryUserStore::new()),
    }
}

#[cfg(feature = "storage-rocksdb")]
fn persistent_stores(path: PathBuf) -> Result<Stores> {
    let store = walletcore::infrastructure::rocksdb::RocksDbStore::open(path).into_diagnostic()?;
    Ok(Stores {
        wallets: Arc::new(store.clone()),
        transactions: Arc::new(store.clone()),
        subscriptions: Arc::new(store.clone()),
        users: Arc::new(store),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn persistent_stores(_path: PathBuf) -> Result<Stores> {
    miette::bail!("this build has no persistent storage; enable the storage-rocksdb feature")
}

async fn seed_demo(
    users: &UserStoreRef,
    wallet_engine: &WalletEngine,
    subscription_engine: &SubscriptionEngine,
) -> walletcore::error::Result<()> {
    let user = User::new("demo", "demo@walletcore.dev");
    users.save(user.clone()).await?;
    subscription_engine.create_default(&user).await?;
    let wallet = wallet_engine.initialize_first_wallet(&user).await?;
    tracing::info!(user_id = %user.id, wallet_id = %wallet.id, "seeded demo user");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let stores = match cli.db_path {
        Some(path) => persistent_stores(path)?,
        None => in_memory_stores(),
    };

    let notifier = Notifier::spawn(Arc::new(LoggingNotificationGateway));
    let recorder = Arc::new(TransactionRecorder::new(
        stores.transactions.clone(),
        notifier,
    ));
    let wallet_engine = Arc::new(WalletEngine::new(
        stores.wallets.clone(),
        stores.users.clone(),
        stores.subscriptions.clone(),
        recorder,
        Arc::new(LoggingPaymentPublisher),
    ));
    let subscription_engine = Arc::new(SubscriptionEngine::new(
        stores.subscriptions.clone(),
        wallet_engine.clone(),
    ));

    if cli.seed_demo {
        seed_demo(&stores.users, &wallet_engine, &subscription_engine)
            .await
            .into_diagnostic()?;
    }

    let scheduler = RenewalScheduler::new(
        subscription_engine,
        stores.wallets.clone(),
        stores.users.clone(),
        Duration::from_secs(cli.tick_secs),
    );

    tracing::info!(tick_secs = cli.tick_secs, "renewal scheduler starting");
    scheduler.run().await;

    Ok(())
}
