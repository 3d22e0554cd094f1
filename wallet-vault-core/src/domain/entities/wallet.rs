//! Wallet handle and related value objects
//!
//! These are the shapes the resolver hands back to callers. None of them
//! serialize secret material.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use crate::core::crypto::Keyring;
use crate::shared::types::{Address, WalletNumber};

/// An unlocked wallet. Cheap to clone; the keyring is shared, never copied.
#[derive(Debug, Clone)]
pub struct WalletHandle {
    address: Address,
    wallet_number: Option<WalletNumber>,
    keyring: Arc<Keyring>,
}

impl WalletHandle {
    pub fn new(keyring: Arc<Keyring>, wallet_number: Option<WalletNumber>) -> Self {
        Self {
            address: keyring.address().to_string(),
            wallet_number,
            keyring,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn wallet_number(&self) -> Option<WalletNumber> {
        self.wallet_number
    }

    pub fn keyring(&self) -> &Arc<Keyring> {
        &self.keyring
    }

    pub(crate) fn with_wallet_number(mut self, wallet_number: Option<WalletNumber>) -> Self {
        self.wallet_number = wallet_number;
        self
    }
}

/// Public view of a wallet: address, number, and the keyring if it is unlocked
#[derive(Debug, Clone)]
pub struct WalletData {
    pub address: Address,
    pub wallet_number: Option<WalletNumber>,
    pub keyring: Option<Arc<Keyring>>,
}

impl WalletData {
    pub fn is_unlocked(&self) -> bool {
        self.keyring.is_some()
    }
}

impl From<&WalletHandle> for WalletData {
    fn from(handle: &WalletHandle) -> Self {
        Self {
            address: handle.address().to_string(),
            wallet_number: handle.wallet_number(),
            keyring: Some(Arc::clone(handle.keyring())),
        }
    }
}

/// Address and number of a persisted wallet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletSummary {
    pub address: Address,
    pub wallet_number: WalletNumber,
}

/// What `generate_new` reports back
pub type GeneratedWallet = WalletSummary;
