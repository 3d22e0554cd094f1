//! Password-based key derivation for the wallet vault
//!
//! This module turns a user password and a per-record salt into an AEAD key.

pub mod key_deriver;
pub mod kdf_params;
pub mod kdf_algorithm;

// Re-export all public items from submodules
pub use key_deriver::*;
pub use kdf_params::*;
pub use kdf_algorithm::*;
