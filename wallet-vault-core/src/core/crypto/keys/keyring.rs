use zeroize::Zeroizing;
use crate::shared::constants::{PUBLIC_KEY_SIZE, SIGNATURE_SIZE};
use crate::shared::error::CryptoError;
use crate::shared::types::Address;
use super::{KeyManager, SecureSeedPhrase};

/// A mnemonic together with the keypair and address derived from it.
///
/// Not `Clone`: a keyring is shared through `Arc<Keyring>` and never copied.
pub struct Keyring {
    mnemonic: SecureSeedPhrase,
    secret_key: Zeroizing<[u8; 32]>,
    public_key: [u8; PUBLIC_KEY_SIZE],
    address: Address,
}

impl Keyring {
    /// Create a keyring from a freshly generated mnemonic
    pub fn generate() -> Result<Self, CryptoError> {
        Self::from_seed_phrase(SecureSeedPhrase::generate()?)
    }

    /// Restore a keyring from a user supplied mnemonic
    pub fn from_mnemonic(phrase: &str) -> Result<Self, CryptoError> {
        Self::from_seed_phrase(SecureSeedPhrase::parse(phrase)?)
    }

    pub fn from_seed_phrase(mnemonic: SecureSeedPhrase) -> Result<Self, CryptoError> {
        let key_manager = KeyManager::new();
        let seed = mnemonic.to_seed()?;
        let (secret_key, public_key) = key_manager.derive_keypair(&seed[..])?;
        let address = KeyManager::encode_address(&public_key);

        Ok(Self {
            mnemonic,
            secret_key,
            public_key,
            address,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.public_key
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }

    pub fn mnemonic(&self) -> &SecureSeedPhrase {
        &self.mnemonic
    }

    /// Sign an arbitrary message with the wallet key
    pub fn sign_message(&self, message: &[u8]) -> Result<[u8; SIGNATURE_SIZE], CryptoError> {
        KeyManager::new().sign_message(&self.secret_key, message)
    }
}

impl PartialEq for Keyring {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.mnemonic == other.mnemonic
    }
}

impl Eq for Keyring {}

impl std::fmt::Debug for Keyring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keyring")
            .field("address", &self.address)
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}
