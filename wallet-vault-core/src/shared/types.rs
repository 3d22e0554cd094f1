use crate::shared::error::{StoreError, WalletError};

// Basic types for wallet operations
pub type Address = String;
pub type WalletNumber = u64;

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;

/// Result type for backup store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// How a caller refers to a wallet
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WalletRef {
    Number(WalletNumber),
    Address(Address),
}

impl WalletRef {
    /// Pick an identifier from optional parts. The number wins when both are given.
    pub fn from_parts(number: Option<WalletNumber>, address: Option<&str>) -> WalletResult<Self> {
        match (number, address) {
            (Some(number), _) => Ok(Self::Number(number)),
            (None, Some(address)) if !address.trim().is_empty() => {
                Ok(Self::Address(address.trim().to_string()))
            }
            _ => Err(WalletError::validation(
                "Either a wallet number or an address is required",
            )),
        }
    }
}

impl std::fmt::Display for WalletRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletRef::Number(number) => write!(f, "wallet #{}", number),
            WalletRef::Address(address) => write!(f, "wallet {}", address),
        }
    }
}
