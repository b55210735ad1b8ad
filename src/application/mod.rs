//! Application layer containing the core business logic orchestration.
//!
//! The engines here own the store ports and enforce the ledger invariants:
//! per-aggregate atomic read-modify-write through [`locks::LockMap`],
//! FAILED transactions as return values rather than errors, and the
//! one-active-subscription-per-user rule.

pub mod locks;
pub mod notify;
pub mod recorder;
pub mod renewal;
pub mod subscription;
pub mod wallet;
