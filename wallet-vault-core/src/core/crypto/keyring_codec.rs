//! Keyring codec
//!
//! Seals a keyring into a `WalletRecord` under a password and opens it again.
//! Once a key has been derived, every failure surfaces as
//! `WrongPasswordOrCorrupt` so callers cannot tell a bad password from a
//! damaged file.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};
use crate::domain::entities::WalletRecord;
use crate::shared::constants::RECORD_FORMAT_VERSION;
use crate::shared::error::CryptoError;
use crate::shared::types::Address;
use crate::shared::utils::current_timestamp_millis;
use super::{EncryptionAlgorithm, EncryptionManager, KdfParams, KeyDeriver, Keyring};

/// Plaintext inside a record
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct KeyringPayload {
    mnemonic: String,
}

/// Encrypts and decrypts keyrings
pub struct KeyringCodec {
    encryption: EncryptionManager,
    kdf: KdfParams,
}

impl KeyringCodec {
    pub fn new(cipher: EncryptionAlgorithm, kdf: KdfParams) -> Self {
        Self {
            encryption: EncryptionManager::new(cipher),
            kdf,
        }
    }

    pub fn new_default() -> Self {
        Self::new(EncryptionAlgorithm::default(), KdfParams::default())
    }

    pub fn kdf(&self) -> &KdfParams {
        &self.kdf
    }

    /// Encrypt a keyring under `password`. The returned record has `sequence` 0.
    pub fn encrypt(&self, keyring: &Keyring, password: &str) -> Result<WalletRecord, CryptoError> {
        self.seal(keyring.mnemonic().as_str(), keyring.address(), password)
    }

    fn seal(&self, mnemonic: &str, address: &str, password: &str) -> Result<WalletRecord, CryptoError> {
        let payload = KeyringPayload {
            mnemonic: mnemonic.to_string(),
        };
        let plaintext = Zeroizing::new(
            serde_json::to_vec(&payload).map_err(|e| CryptoError::serialization(e.to_string()))?,
        );

        let salt = KeyDeriver::generate_salt();
        let key = KeyDeriver::new(self.kdf).derive_key(password.as_bytes(), &salt)?;
        let aad = Self::associated_data(RECORD_FORMAT_VERSION, address);
        let encrypted = self.encryption.encrypt(&plaintext, &key, &aad)?;

        Ok(WalletRecord {
            version: RECORD_FORMAT_VERSION,
            address: address.to_string(),
            cipher: encrypted.algorithm,
            kdf: self.kdf,
            salt: salt.to_vec(),
            nonce: encrypted.nonce,
            ciphertext: encrypted.ciphertext,
            tag: encrypted.tag,
            sequence: 0,
            created_at: current_timestamp_millis(),
        })
    }

    /// Decrypt a record and check that the keyring inside derives the stored address
    pub fn decrypt(&self, record: &WalletRecord, password: &str) -> Result<Keyring, CryptoError> {
        // Stored parameters are untrusted; a record Argon2 refuses is a damaged record
        let key = KeyDeriver::new(record.kdf)
            .derive_key(password.as_bytes(), &record.salt)
            .map_err(|e| {
                log::warn!("Backup for {} has unusable key parameters: {}", record.address, e);
                CryptoError::WrongPasswordOrCorrupt
            })?;
        let aad = Self::associated_data(record.version, &record.address);

        let plaintext = EncryptionManager::new(record.cipher)
            .decrypt(&record.encrypted_data(), &key, &aad)?;
        let payload: KeyringPayload = serde_json::from_slice(&plaintext)
            .map_err(|_| CryptoError::WrongPasswordOrCorrupt)?;
        let keyring = Keyring::from_mnemonic(&payload.mnemonic)
            .map_err(|_| CryptoError::WrongPasswordOrCorrupt)?;

        if keyring.address() != record.address {
            log::warn!("Backup for {} decrypted to a different address", record.address);
            return Err(CryptoError::WrongPasswordOrCorrupt);
        }
        Ok(keyring)
    }

    /// Address a keyring is stored under
    pub fn derive_address(keyring: &Keyring) -> Address {
        keyring.address().to_string()
    }

    fn associated_data(version: u32, address: &str) -> Vec<u8> {
        format!("wallet-vault/v{}/{}", version, address).into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn fast_codec() -> KeyringCodec {
        KeyringCodec::new(EncryptionAlgorithm::AES256GCM, KdfParams::new(256, 1, 1))
    }

    #[test]
    fn test_round_trip() {
        let codec = fast_codec();
        let keyring = Keyring::generate().expect("Failed to generate keyring");

        let record = codec.encrypt(&keyring, "pw1").expect("Failed to encrypt keyring");
        assert_eq!(record.address, keyring.address());
        assert_eq!(record.version, RECORD_FORMAT_VERSION);
        assert_eq!(record.salt.len(), 32);

        let restored = codec.decrypt(&record, "pw1").expect("Failed to decrypt keyring");
        assert_eq!(restored, keyring);
        assert_eq!(KeyringCodec::derive_address(&restored), record.address);
    }

    #[test]
    fn test_chacha_round_trip() {
        let codec = KeyringCodec::new(EncryptionAlgorithm::ChaCha20Poly1305, KdfParams::new(256, 1, 1));
        let keyring = Keyring::from_mnemonic(TEST_PHRASE).expect("Failed to restore keyring");

        let record = codec.encrypt(&keyring, "pw1").expect("Failed to encrypt keyring");
        assert_eq!(record.cipher, EncryptionAlgorithm::ChaCha20Poly1305);

        // Any codec opens any record; parameters travel with the record
        let restored = fast_codec().decrypt(&record, "pw1").expect("Failed to decrypt keyring");
        assert_eq!(restored.address(), keyring.address());
    }

    #[test]
    fn test_wrong_password() {
        let codec = fast_codec();
        let keyring = Keyring::generate().expect("Failed to generate keyring");
        let record = codec.encrypt(&keyring, "pw1").expect("Failed to encrypt keyring");

        let result = codec.decrypt(&record, "wrong");
        assert_eq!(result.err(), Some(CryptoError::WrongPasswordOrCorrupt));
    }

    #[test]
    fn test_tampered_ciphertext() {
        let codec = fast_codec();
        let keyring = Keyring::generate().expect("Failed to generate keyring");
        let mut record = codec.encrypt(&keyring, "pw1").expect("Failed to encrypt keyring");
        record.ciphertext[0] ^= 0x80;

        assert_eq!(codec.decrypt(&record, "pw1").err(), Some(CryptoError::WrongPasswordOrCorrupt));
    }

    #[test]
    fn test_relabelled_record_rejected() {
        let codec = fast_codec();
        let keyring = Keyring::generate().expect("Failed to generate keyring");
        let other = Keyring::generate().expect("Failed to generate keyring");
        let mut record = codec.encrypt(&keyring, "pw1").expect("Failed to encrypt keyring");
        record.address = other.address().to_string();

        assert_eq!(codec.decrypt(&record, "pw1").err(), Some(CryptoError::WrongPasswordOrCorrupt));
    }

    #[test]
    fn test_address_mismatch_rejected() {
        let codec = fast_codec();
        let claimed = Keyring::generate().expect("Failed to generate keyring");
        let actual = Keyring::from_mnemonic(TEST_PHRASE).expect("Failed to restore keyring");

        let record = codec
            .seal(actual.mnemonic().as_str(), claimed.address(), "pw1")
            .expect("Failed to seal payload");

        assert_eq!(codec.decrypt(&record, "pw1").err(), Some(CryptoError::WrongPasswordOrCorrupt));
    }

    #[test]
    fn test_invalid_kdf_params_rejected() {
        let codec = fast_codec();
        let keyring = Keyring::generate().expect("Failed to generate keyring");
        let mut record = codec.encrypt(&keyring, "pw1").expect("Failed to encrypt keyring");
        record.kdf.m_cost = u32::MAX;
        assert_eq!(codec.decrypt(&record, "pw1").err(), Some(CryptoError::WrongPasswordOrCorrupt));

        let mut record = codec.encrypt(&keyring, "pw1").expect("Failed to encrypt keyring");
        record.kdf.t_cost = 0;
        assert_eq!(codec.decrypt(&record, "pw1").err(), Some(CryptoError::WrongPasswordOrCorrupt));

        let mut record = codec.encrypt(&keyring, "pw1").expect("Failed to encrypt keyring");
        record.salt.truncate(3);
        assert_eq!(codec.decrypt(&record, "pw1").err(), Some(CryptoError::WrongPasswordOrCorrupt));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_round_trip_any_password(password in "[a-zA-Z0-9 !@#$%]{1,32}") {
            let codec = fast_codec();
            let keyring = Keyring::from_mnemonic(TEST_PHRASE).expect("Failed to restore keyring");

            let record = codec.encrypt(&keyring, &password).expect("Failed to encrypt keyring");
            let restored = codec.decrypt(&record, &password).expect("Failed to decrypt keyring");
            prop_assert_eq!(restored.address(), keyring.address());
        }

        #[test]
        fn prop_other_password_rejected(password in "[a-z]{1,16}", guess in "[a-z]{1,16}") {
            prop_assume!(password != guess);
            let codec = fast_codec();
            let keyring = Keyring::from_mnemonic(TEST_PHRASE).expect("Failed to restore keyring");

            let record = codec.encrypt(&keyring, &password).expect("Failed to encrypt keyring");
            prop_assert_eq!(codec.decrypt(&record, &guess).err(), Some(CryptoError::WrongPasswordOrCorrupt));
        }
    }
}
