use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use crate::domain::entities::{IndexSnapshot, WalletRecord};
use crate::domain::repositories::BackupStore;
use crate::shared::error::StoreError;
use crate::shared::types::{Address, StoreResult};

/// In-memory backup store for tests and embedders that persist elsewhere
#[derive(Debug, Default)]
pub struct MemoryBackupStore {
    records: RwLock<HashMap<Address, WalletRecord>>,
    index: RwLock<Option<IndexSnapshot>>,
}

impl MemoryBackupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Drop the persisted index, as if the index file had been lost
    pub async fn clear_index(&self) {
        *self.index.write().await = None;
    }
}

#[async_trait]
impl BackupStore for MemoryBackupStore {
    async fn write(&self, address: &str, record: &WalletRecord) -> StoreResult<()> {
        if record.address != address {
            return Err(StoreError::invalid_address(format!(
                "record for {} cannot be stored under {}",
                record.address, address
            )));
        }
        self.records.write().await.insert(address.to_string(), record.clone());
        Ok(())
    }

    async fn read(&self, address: &str) -> StoreResult<WalletRecord> {
        let records = self.records.read().await;
        let record = records
            .get(address)
            .cloned()
            .ok_or_else(|| StoreError::not_found(address))?;
        record.check_version()?;
        Ok(record)
    }

    async fn exists(&self, address: &str) -> StoreResult<bool> {
        Ok(self.records.read().await.contains_key(address))
    }

    async fn delete(&self, address: &str) -> StoreResult<()> {
        self.records.write().await.remove(address);
        Ok(())
    }

    async fn list_addresses(&self) -> StoreResult<Vec<Address>> {
        let records = self.records.read().await;
        let mut found: Vec<_> = records
            .values()
            .map(|record| (record.sequence, record.created_at, record.address.clone()))
            .collect();
        found.sort();
        Ok(found.into_iter().map(|(_, _, address)| address).collect())
    }

    async fn read_index(&self) -> StoreResult<Option<IndexSnapshot>> {
        Ok(self.index.read().await.clone())
    }

    async fn write_index(&self, snapshot: &IndexSnapshot) -> StoreResult<()> {
        *self.index.write().await = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::crypto::{EncryptionAlgorithm, KdfParams};
    use crate::shared::constants::RECORD_FORMAT_VERSION;

    fn record(address: &str, sequence: u64) -> WalletRecord {
        WalletRecord {
            version: RECORD_FORMAT_VERSION,
            address: address.to_string(),
            cipher: EncryptionAlgorithm::AES256GCM,
            kdf: KdfParams::new(256, 1, 1),
            salt: vec![1; 32],
            nonce: vec![2; 12],
            ciphertext: vec![3; 40],
            tag: vec![4; 16],
            sequence,
            created_at: 0,
        }
    }

    #[tokio::test]
    async fn test_memory_store_basics() {
        let store = MemoryBackupStore::new();
        assert!(store.is_empty().await);

        store.write("b", &record("b", 2)).await.expect("Failed to write record");
        store.write("a", &record("a", 1)).await.expect("Failed to write record");
        assert_eq!(store.len().await, 2);
        assert_eq!(store.list_addresses().await.expect("Failed to list"), vec!["a", "b"]);

        store.delete("a").await.expect("Failed to delete");
        store.delete("a").await.expect("Second delete should succeed");
        assert!(matches!(store.read("a").await, Err(StoreError::NotFound(_))));
        assert!(store.exists("b").await.expect("Failed to check existence"));
    }

    #[tokio::test]
    async fn test_memory_store_index() {
        let store = MemoryBackupStore::new();
        assert_eq!(store.read_index().await.expect("Failed to read index"), None);

        let snapshot = IndexSnapshot::new(3, Default::default());
        store.write_index(&snapshot).await.expect("Failed to write index");
        assert_eq!(store.read_index().await.expect("Failed to read index"), Some(snapshot));

        store.clear_index().await;
        assert_eq!(store.read_index().await.expect("Failed to read index"), None);
    }
}
