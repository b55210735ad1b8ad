pub mod in_memory;
pub mod observers;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
