//! Key derivation and address encoding
//!
//! Turns a BIP-39 seed into a secp256k1 keypair along a fixed hardened path
//! and encodes the public key as an SS58-style address.

use bip32::{DerivationPath, XPrv};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256, Sha512};
use std::str::FromStr;
use zeroize::Zeroizing;
use crate::shared::constants::{
    DERIVATION_PATH, PUBLIC_KEY_SIZE, SIGNATURE_SIZE, SS58_CHECKSUM_PREFIX, SS58_CHECKSUM_SIZE,
    SS58_PREFIX,
};
use crate::shared::error::CryptoError;
use crate::shared::types::Address;

/// Key manager for cryptographic key operations
pub struct KeyManager {
    secp256k1: Secp256k1<secp256k1::All>,
}

impl KeyManager {
    pub fn new() -> Self {
        Self {
            secp256k1: Secp256k1::new(),
        }
    }

    /// Derive the secret key and compressed public key for a BIP-39 seed
    pub fn derive_keypair(&self, seed: &[u8]) -> Result<(Zeroizing<[u8; 32]>, [u8; PUBLIC_KEY_SIZE]), CryptoError> {
        let xprv = XPrv::new(seed)?;
        let derivation_path = DerivationPath::from_str(DERIVATION_PATH)?;

        let mut child_xprv = xprv;
        for child_number in derivation_path.into_iter() {
            child_xprv = child_xprv.derive_child(child_number)?;
        }

        let mut secret = Zeroizing::new([0u8; 32]);
        secret.copy_from_slice(&child_xprv.private_key().to_bytes());

        let public_key = self.public_key(&secret)?;
        Ok((secret, public_key))
    }

    /// Compressed public key for a secret key
    pub fn public_key(&self, secret: &[u8; 32]) -> Result<[u8; PUBLIC_KEY_SIZE], CryptoError> {
        let secret_key = Self::secret_key(secret)?;
        Ok(PublicKey::from_secret_key(&self.secp256k1, &secret_key).serialize())
    }

    /// Deterministic ECDSA signature over the SHA-256 digest of `message`
    pub fn sign_message(&self, secret: &[u8; 32], message: &[u8]) -> Result<[u8; SIGNATURE_SIZE], CryptoError> {
        let secret_key = Self::secret_key(secret)?;
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&Sha256::digest(message));
        let message_hash = Message::from_digest(digest);

        let signature = self.secp256k1.sign_ecdsa(message_hash, &secret_key);
        Ok(signature.serialize_compact())
    }

    fn secret_key(secret: &[u8; 32]) -> Result<SecretKey, CryptoError> {
        let bytes: &[u8] = secret;
        let secret_key = SecretKey::from_byte_array(
            bytes.try_into().map_err(|_| CryptoError::key_derivation("Invalid private key length"))?,
        )?;
        Ok(secret_key)
    }

    /// Encode a compressed public key as `base58(prefix || pubkey || checksum)`
    pub fn encode_address(public_key: &[u8; PUBLIC_KEY_SIZE]) -> Address {
        let mut payload = Vec::with_capacity(1 + PUBLIC_KEY_SIZE + SS58_CHECKSUM_SIZE);
        payload.push(SS58_PREFIX);
        payload.extend_from_slice(public_key);
        let checksum = Self::checksum(&payload);
        payload.extend_from_slice(&checksum);
        bs58::encode(payload).into_string()
    }

    /// Check the encoding, prefix, and checksum of an address
    pub fn validate_address(address: &str) -> bool {
        let decoded = match bs58::decode(address).into_vec() {
            Ok(decoded) => decoded,
            Err(_) => return false,
        };
        if decoded.len() != 1 + PUBLIC_KEY_SIZE + SS58_CHECKSUM_SIZE || decoded[0] != SS58_PREFIX {
            return false;
        }
        let (payload, checksum) = decoded.split_at(1 + PUBLIC_KEY_SIZE);
        Self::checksum(payload)[..] == *checksum
    }

    fn checksum(payload: &[u8]) -> [u8; SS58_CHECKSUM_SIZE] {
        let mut hasher = Sha512::new();
        hasher.update(SS58_CHECKSUM_PREFIX);
        hasher.update(payload);
        let digest = hasher.finalize();
        let mut checksum = [0u8; SS58_CHECKSUM_SIZE];
        checksum.copy_from_slice(&digest[..SS58_CHECKSUM_SIZE]);
        checksum
    }
}

impl Default for KeyManager {
    fn default() -> Self {
        Self::new()
    }
}
