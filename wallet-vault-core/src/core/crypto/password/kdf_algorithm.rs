use serde::{Deserialize, Serialize};

/// Password-based key derivation algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KdfAlgorithm {
    Argon2id,
}

impl std::fmt::Display for KdfAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KdfAlgorithm::Argon2id => write!(f, "argon2id"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_name() {
        let json = serde_json::to_string(&KdfAlgorithm::Argon2id).expect("Failed to serialize algorithm");
        assert_eq!(json, "\"argon2id\"");
        assert_eq!(KdfAlgorithm::Argon2id.to_string(), "argon2id");
    }
}
