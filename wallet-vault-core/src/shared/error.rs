//! Error handling for the wallet vault
//!
//! Each layer has its own error enum. `WalletError` is what the resolver and
//! the facade return; the layer errors convert into it with `?`.

use thiserror::Error;
use crate::shared::types::{Address, WalletNumber};

/// Errors raised by the crypto codec
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Bad password, tampered ciphertext, and unexpected plaintext all end up here
    #[error("Wrong password or corrupted backup")]
    WrongPasswordOrCorrupt,

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),
}

impl CryptoError {
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationFailed(message.into())
    }

    pub fn key_derivation(message: impl Into<String>) -> Self {
        Self::KeyDerivation(message.into())
    }

    pub fn invalid_mnemonic(message: impl Into<String>) -> Self {
        Self::InvalidMnemonic(message.into())
    }

    pub fn encryption(message: impl Into<String>) -> Self {
        Self::Encryption(message.into())
    }
}

/// Errors raised by a backup store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("I/O failure: {0}")]
    IoFailure(String),

    #[error("No backup found for address {0}")]
    NotFound(Address),

    #[error("Corrupt backup: {0}")]
    Corrupt(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl StoreError {
    pub fn io_failure(message: impl Into<String>) -> Self {
        Self::IoFailure(message.into())
    }

    pub fn not_found(address: impl Into<Address>) -> Self {
        Self::NotFound(address.into())
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt(message.into())
    }

    pub fn invalid_address(address: impl Into<String>) -> Self {
        Self::InvalidAddress(address.into())
    }

    /// Only I/O failures are worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::IoFailure(_))
    }
}

/// Errors raised by the wallet number index
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("Address {address} already holds wallet number {number}")]
    AlreadyAssigned { address: Address, number: WalletNumber },

    #[error("Wallet not found: {0}")]
    NotFound(String),

    #[error("Index inconsistent: {0}")]
    Inconsistent(String),
}

impl IndexError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::Inconsistent(message.into())
    }
}

/// Wallet error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("Wallet {0} is not cached; a password is required")]
    PasswordRequired(Address),

    #[error("Wallet already exists: {0}")]
    WalletAlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WalletError {
    /// Create a password required error
    pub fn password_required(address: impl Into<Address>) -> Self {
        Self::PasswordRequired(address.into())
    }

    /// Create a wallet already exists error
    pub fn wallet_already_exists(message: impl Into<String>) -> Self {
        Self::WalletAlreadyExists(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True when the wallet is unknown to the index or missing from the store
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::NotFound(_)) | Self::Index(IndexError::NotFound(_))
        )
    }

    pub fn is_password_required(&self) -> bool {
        matches!(self, Self::PasswordRequired(_))
    }

    pub fn is_wrong_password_or_corrupt(&self) -> bool {
        matches!(self, Self::Crypto(CryptoError::WrongPasswordOrCorrupt))
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Store(StoreError::Corrupt(_)))
    }
}

// Standard library error conversions
impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::io_failure(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::corrupt(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for WalletError {
    fn from(err: std::io::Error) -> Self {
        Self::Store(err.into())
    }
}

impl From<tokio::task::JoinError> for WalletError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("Task join error: {}", err))
    }
}

// Cryptographic error conversions
impl From<argon2::Error> for CryptoError {
    fn from(err: argon2::Error) -> Self {
        Self::key_derivation(format!("Argon2 error: {}", err))
    }
}

impl From<bip32::Error> for CryptoError {
    fn from(err: bip32::Error) -> Self {
        Self::key_derivation(format!("BIP32 error: {}", err))
    }
}

impl From<secp256k1::Error> for CryptoError {
    fn from(err: secp256k1::Error) -> Self {
        Self::key_derivation(format!("Secp256k1 error: {}", err))
    }
}

impl From<bip39::Error> for CryptoError {
    fn from(err: bip39::Error) -> Self {
        Self::invalid_mnemonic(err.to_string())
    }
}
