//! Persisted wallet backup record

use serde::{Deserialize, Serialize};
use crate::core::crypto::{EncryptedData, EncryptionAlgorithm, KdfParams};
use crate::shared::constants::{NONCE_SIZE, RECORD_FORMAT_VERSION, SALT_SIZE, TAG_SIZE};
use crate::shared::error::StoreError;
use crate::shared::types::Address;
use crate::shared::utils::base64_bytes;

/// One encrypted keyring as it is written to disk.
///
/// Holds no plaintext secrets, so it is safe to clone and log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub version: u32,
    pub address: Address,
    pub cipher: EncryptionAlgorithm,
    pub kdf: KdfParams,
    #[serde(with = "base64_bytes")]
    pub salt: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub nonce: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub tag: Vec<u8>,
    /// Wallet number assigned when the record was created; orders the store
    #[serde(default)]
    pub sequence: u64,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
}

impl WalletRecord {
    pub fn encrypted_data(&self) -> EncryptedData {
        EncryptedData {
            algorithm: self.cipher,
            ciphertext: self.ciphertext.clone(),
            nonce: self.nonce.clone(),
            tag: self.tag.clone(),
        }
    }

    /// Reject format versions this build does not understand
    pub fn check_version(&self) -> Result<(), StoreError> {
        if self.version != RECORD_FORMAT_VERSION {
            return Err(StoreError::corrupt(format!(
                "unsupported record version {} for {}",
                self.version, self.address
            )));
        }
        Ok(())
    }

    /// Reject records whose parameters could never have been written by `KeyringCodec`
    pub fn check_layout(&self) -> Result<(), StoreError> {
        let field_sizes = [
            ("salt", self.salt.len(), SALT_SIZE),
            ("nonce", self.nonce.len(), NONCE_SIZE),
            ("tag", self.tag.len(), TAG_SIZE),
        ];
        for (field, actual, expected) in field_sizes {
            if actual != expected {
                return Err(StoreError::corrupt(format!(
                    "{} of {} is {} bytes, expected {}",
                    field, self.address, actual, expected
                )));
            }
        }
        self.kdf
            .validate()
            .map_err(|e| StoreError::corrupt(format!("kdf parameters of {}: {}", self.address, e)))?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| StoreError::io_failure(format!("Record serialization failed: {}", e)))
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, StoreError> {
        let record: WalletRecord = serde_json::from_slice(bytes)?;
        record.check_version()?;
        record.check_layout()?;
        Ok(record)
    }
}
