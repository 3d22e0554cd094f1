//! Key management for the wallet vault
//!
//! This module handles mnemonic generation, key derivation, and the keyring type.

pub mod key_manager;
pub mod keyring;
pub mod secure_seed_phrase;

// Re-export all public items from submodules
pub use key_manager::*;
pub use keyring::*;
pub use secure_seed_phrase::*;
