//! Wallet ledger and subscription lifecycle engine.
//!
//! The crate is split into three layers: `domain` holds the aggregates,
//! value objects and the ports the core talks to the outside world through;
//! `application` holds the engines that mutate balances, record transactions
//! and drive subscription renewals; `infrastructure` provides store backends
//! for the ports (in-memory, and RocksDB behind the `storage-rocksdb`
//! feature).

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
