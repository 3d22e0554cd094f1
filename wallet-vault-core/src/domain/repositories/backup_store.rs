//! Backup store repository
//!
//! Persistence seam for encrypted wallet records and the wallet number index.

use async_trait::async_trait;
use crate::domain::entities::{IndexSnapshot, WalletRecord};
use crate::shared::types::{Address, StoreResult};

/// Storage for wallet backups, keyed by address
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackupStore: Send + Sync {
    /// Persist a record. Readers never observe a partially written record.
    async fn write(&self, address: &str, record: &WalletRecord) -> StoreResult<()>;

    /// Load a record; `NotFound` if absent, `Corrupt` if unreadable
    async fn read(&self, address: &str) -> StoreResult<WalletRecord>;

    async fn exists(&self, address: &str) -> StoreResult<bool>;

    /// Remove a record. Deleting a missing record succeeds.
    async fn delete(&self, address: &str) -> StoreResult<()>;

    /// Addresses of all readable records in creation order. Corrupt records
    /// are left out; I/O failures are returned.
    async fn list_addresses(&self) -> StoreResult<Vec<Address>>;

    /// Load the persisted index, if one has been written
    async fn read_index(&self) -> StoreResult<Option<IndexSnapshot>>;

    async fn write_index(&self, snapshot: &IndexSnapshot) -> StoreResult<()>;
}
