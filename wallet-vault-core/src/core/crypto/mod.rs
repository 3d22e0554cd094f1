//! Cryptographic functionality for the wallet vault
//!
//! This module provides password key derivation, AEAD encryption, key
//! management, and the codec that seals keyrings into backup records.
//!
//! SECURITY: secret material lives in zeroizing containers, and decryption
//! failures never reveal whether the password or the file was at fault.

pub mod keys;
pub mod encryption;
pub mod password;
pub mod keyring_codec;

// Re-export all public items from submodules
pub use keys::*;
pub use encryption::*;
pub use password::*;
pub use keyring_codec::*;
