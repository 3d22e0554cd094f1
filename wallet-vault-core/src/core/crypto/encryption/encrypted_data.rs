use super::EncryptionAlgorithm;

/// Encrypted data structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedData {
    pub algorithm: EncryptionAlgorithm,
    pub ciphertext: Vec<u8>,
    pub nonce: Vec<u8>,
    pub tag: Vec<u8>,
}

impl EncryptedData {
    /// Ciphertext with the tag appended, as the AEAD crates expect it
    pub fn combined(&self) -> Vec<u8> {
        let mut combined = Vec::with_capacity(self.ciphertext.len() + self.tag.len());
        combined.extend_from_slice(&self.ciphertext);
        combined.extend_from_slice(&self.tag);
        combined
    }
}
