//! Utility functions for the wallet vault
//!
//! This module contains common utility functions used throughout the wallet vault.

use crate::shared::error::WalletError;
use rand_core::OsRng;
use rand_core::RngCore;

/// Get current timestamp in milliseconds
pub fn current_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Collapse whitespace and lowercase a mnemonic before parsing
pub fn normalize_mnemonic(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check that an address can safely be used as part of a file name.
///
/// Addresses are base58, so anything outside that alphabet is rejected before
/// it reaches the file system.
pub fn is_file_safe_address(address: &str) -> bool {
    const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
    !address.is_empty()
        && address.len() <= 64
        && address.chars().all(|c| BASE58_ALPHABET.contains(c))
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), WalletError> {
    if password.is_empty() {
        return Err(WalletError::validation("Password cannot be empty"));
    }
    Ok(())
}

/// Generate cryptographically secure random bytes
pub fn generate_random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Base64 (standard alphabet) serde adapter for byte fields
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_timestamp() {
        let timestamp = current_timestamp_millis();
        assert!(timestamp > 0);
    }

    #[test]
    fn test_normalize_mnemonic() {
        assert_eq!(
            normalize_mnemonic("  Abandon   ABANDON\tabout \n"),
            "abandon abandon about"
        );
    }

    #[test]
    fn test_file_safe_address() {
        assert!(is_file_safe_address("5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"));
        assert!(!is_file_safe_address(""));
        assert!(!is_file_safe_address("../etc/passwd"));
        assert!(!is_file_safe_address("abc/def"));
        // 0, O, I and l are not in the base58 alphabet
        assert!(!is_file_safe_address("0OIl"));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("pw1").is_ok());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_random_bytes() {
        let a = generate_random_bytes::<32>();
        let b = generate_random_bytes::<32>();
        assert_ne!(a, b);
    }
}
