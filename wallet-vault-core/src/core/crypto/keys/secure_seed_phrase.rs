use bip39::{Language, Mnemonic};
use zeroize::Zeroizing;
use crate::shared::constants::MNEMONIC_ENTROPY_SIZE;
use crate::shared::error::CryptoError;
use crate::shared::utils::{generate_random_bytes, normalize_mnemonic};

/// Secure seed phrase wrapper
///
/// The phrase is wiped on drop and never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct SecureSeedPhrase {
    phrase: Zeroizing<String>,
}

impl SecureSeedPhrase {
    /// Generate a fresh 24-word English mnemonic
    pub fn generate() -> Result<Self, CryptoError> {
        let entropy = Zeroizing::new(generate_random_bytes::<MNEMONIC_ENTROPY_SIZE>());
        let mnemonic = Mnemonic::from_entropy(&entropy[..])?;
        Ok(Self::from_mnemonic(&mnemonic))
    }

    /// Parse and normalize a user supplied phrase
    pub fn parse(phrase: &str) -> Result<Self, CryptoError> {
        let normalized = Zeroizing::new(normalize_mnemonic(phrase));
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, &normalized)?;
        Ok(Self::from_mnemonic(&mnemonic))
    }

    fn from_mnemonic(mnemonic: &Mnemonic) -> Self {
        Self {
            phrase: Zeroizing::new(mnemonic.to_string()),
        }
    }

    /// Get the seed phrase as a &str
    pub fn as_str(&self) -> &str {
        &self.phrase
    }

    /// Get the seed phrase as `Vec<String>`
    pub fn as_words(&self) -> Vec<String> {
        self.phrase.split_whitespace().map(|s| s.to_string()).collect()
    }

    pub fn word_count(&self) -> usize {
        self.phrase.split_whitespace().count()
    }

    /// BIP-39 seed with an empty passphrase
    pub fn to_seed(&self) -> Result<Zeroizing<[u8; 64]>, CryptoError> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, &self.phrase)?;
        Ok(Zeroizing::new(mnemonic.to_seed_normalized("")))
    }
}

impl std::fmt::Debug for SecureSeedPhrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureSeedPhrase")
            .field("words", &self.word_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_generate_24_words() {
        let phrase = SecureSeedPhrase::generate().expect("Failed to generate seed phrase");
        assert_eq!(phrase.word_count(), 24);
        assert!(SecureSeedPhrase::parse(phrase.as_str()).is_ok());
    }

    #[test]
    fn test_generated_phrases_differ() {
        let a = SecureSeedPhrase::generate().expect("Failed to generate seed phrase");
        let b = SecureSeedPhrase::generate().expect("Failed to generate seed phrase");
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_normalizes() {
        let messy = format!("  {}  ", TEST_PHRASE.to_uppercase().replace(' ', "   "));
        let phrase = SecureSeedPhrase::parse(&messy).expect("Failed to parse seed phrase");
        assert_eq!(phrase.as_str(), TEST_PHRASE);
        assert_eq!(phrase.as_words().len(), 12);
    }

    #[test]
    fn test_parse_rejects_bad_checksum() {
        let bad = TEST_PHRASE.replace("about", "abandon");
        let result = SecureSeedPhrase::parse(&bad);
        assert!(matches!(result, Err(CryptoError::InvalidMnemonic(_))));
    }

    #[test]
    fn test_debug_is_redacted() {
        let phrase = SecureSeedPhrase::parse(TEST_PHRASE).expect("Failed to parse seed phrase");
        let debug = format!("{:?}", phrase);
        assert!(!debug.contains("abandon"));
    }
}
