use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use chacha20poly1305::{ChaCha20Poly1305, Key as ChaChaKey, Nonce as ChaChaNonce};
use zeroize::Zeroizing;
use crate::shared::constants::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use crate::shared::error::CryptoError;
use crate::shared::utils::generate_random_bytes;
use super::{EncryptionAlgorithm, EncryptedData};

/// Secure encryption manager
pub struct EncryptionManager {
    algorithm: EncryptionAlgorithm,
}

impl EncryptionManager {
    pub fn new(algorithm: EncryptionAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn new_default() -> Self {
        Self::new(EncryptionAlgorithm::AES256GCM)
    }

    pub fn algorithm(&self) -> EncryptionAlgorithm {
        self.algorithm
    }

    /// Encrypt data with a key, binding `aad` into the tag
    pub fn encrypt(&self, data: &[u8], key: &[u8; KEY_SIZE], aad: &[u8]) -> Result<EncryptedData, CryptoError> {
        let nonce_bytes = generate_random_bytes::<NONCE_SIZE>();
        let payload = Payload { msg: data, aad };

        let sealed = match self.algorithm {
            EncryptionAlgorithm::AES256GCM => {
                let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
                cipher.encrypt(Nonce::from_slice(&nonce_bytes), payload)
            }
            EncryptionAlgorithm::ChaCha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new(ChaChaKey::from_slice(key));
                cipher.encrypt(ChaChaNonce::from_slice(&nonce_bytes), payload)
            }
        }
        .map_err(|e| CryptoError::encryption(format!("{} encryption failed: {}", self.algorithm, e)))?;

        if sealed.len() < TAG_SIZE {
            return Err(CryptoError::encryption("AEAD output shorter than its tag"));
        }

        // Split ciphertext and tag
        let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_SIZE);

        Ok(EncryptedData {
            algorithm: self.algorithm,
            ciphertext: ciphertext.to_vec(),
            nonce: nonce_bytes.to_vec(),
            tag: tag.to_vec(),
        })
    }

    /// Decrypt data with a key.
    ///
    /// Every failure, including malformed nonce or tag lengths, is reported as
    /// `WrongPasswordOrCorrupt`.
    pub fn decrypt(&self, encrypted_data: &EncryptedData, key: &[u8; KEY_SIZE], aad: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        if encrypted_data.nonce.len() != NONCE_SIZE || encrypted_data.tag.len() != TAG_SIZE {
            return Err(CryptoError::WrongPasswordOrCorrupt);
        }

        let combined = encrypted_data.combined();
        let payload = Payload { msg: combined.as_slice(), aad };

        let plaintext = match encrypted_data.algorithm {
            EncryptionAlgorithm::AES256GCM => {
                let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
                cipher.decrypt(Nonce::from_slice(&encrypted_data.nonce), payload)
            }
            EncryptionAlgorithm::ChaCha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new(ChaChaKey::from_slice(key));
                cipher.decrypt(ChaChaNonce::from_slice(&encrypted_data.nonce), payload)
            }
        }
        .map_err(|_| CryptoError::WrongPasswordOrCorrupt)?;

        Ok(Zeroizing::new(plaintext))
    }
}
