use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::shared::constants::INDEX_FORMAT_VERSION;
use crate::shared::error::StoreError;
use crate::shared::types::{Address, WalletNumber};

/// Persisted form of the wallet number index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub version: u32,
    /// Highest number ever handed out, including retired ones
    pub highest_assigned: WalletNumber,
    pub entries: BTreeMap<WalletNumber, Address>,
}

impl IndexSnapshot {
    pub fn new(highest_assigned: WalletNumber, entries: BTreeMap<WalletNumber, Address>) -> Self {
        Self {
            version: INDEX_FORMAT_VERSION,
            highest_assigned,
            entries,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| StoreError::io_failure(format!("Index serialization failed: {}", e)))
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, StoreError> {
        let snapshot: IndexSnapshot = serde_json::from_slice(bytes)?;
        if snapshot.version != INDEX_FORMAT_VERSION {
            return Err(StoreError::corrupt(format!(
                "unsupported index version {}",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }
}
