use argon2::Argon2;
use zeroize::Zeroizing;
use crate::shared::constants::{KEY_SIZE, SALT_SIZE};
use crate::shared::error::CryptoError;
use crate::shared::utils::generate_random_bytes;
use super::{KdfAlgorithm, KdfParams};

/// Derives AEAD keys from passwords
pub struct KeyDeriver {
    params: KdfParams,
}

impl KeyDeriver {
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }

    pub fn new_default() -> Self {
        Self::new(KdfParams::default())
    }

    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Derive a 32-byte key from a password and salt
    pub fn derive_key(&self, password: &[u8], salt: &[u8]) -> Result<Zeroizing<[u8; KEY_SIZE]>, CryptoError> {
        let params = self.params.validate()?;
        let algorithm = match self.params.algorithm {
            KdfAlgorithm::Argon2id => argon2::Algorithm::Argon2id,
        };
        let argon2 = Argon2::new(algorithm, argon2::Version::V0x13, params);

        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        argon2.hash_password_into(password, salt, &mut key[..])?;
        Ok(key)
    }

    /// Generate a secure random salt
    pub fn generate_salt() -> [u8; SALT_SIZE] {
        generate_random_bytes::<SALT_SIZE>()
    }
}
