//! Wallet Vault Core
//!
//! Credential storage for a command-driven wallet.
//! Encrypts keyrings to per-wallet backup files, numbers wallets in creation
//! order, and keeps unlocked keyrings in a session cache.
//!
//! ## Architecture
//!
//! - **Core**: Wallet resolver, number index, session cache, crypto
//! - **Domain**: Entities and the backup store seam
//! - **Infrastructure**: File and memory backup stores, configuration
//! - **Shared**: Common types, constants, errors, and utilities
//!
//! ## Security Features
//!
//! - Argon2id key derivation with a fresh salt per backup
//! - Authenticated encryption bound to the wallet address
//! - Secrets zeroized on drop
//! - Atomic, owner-only backup files
//!
//! ## Usage
//!
//! ```no_run
//! # async fn demo() -> Result<(), wallet_vault_core::WalletError> {
//! let vault = wallet_vault_core::init_wallet_vault().await?;
//!
//! let created = vault.generate_new("correct horse").await?;
//! vault.clear_wallet_from_cache(&created.address).await;
//!
//! let wallet = vault.load_wallet_by_number(created.wallet_number, Some("correct horse")).await?;
//! let signature = wallet.keyring().sign_message(b"hello")?;
//! # let _ = signature;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

// Re-export main modules for easy access
pub mod core;
pub mod domain;
pub mod shared;
pub mod infrastructure;

// Re-export specific components
pub use core::wallet::{WalletResolver, SessionPolicy, RetryPolicy};
pub use core::crypto::{Keyring, KeyringCodec, SecureSeedPhrase};
pub use domain::{BackupStore, GeneratedWallet, WalletData, WalletHandle, WalletRecord, WalletSummary};
pub use infrastructure::{FileBackupStore, MemoryBackupStore, VaultConfig};

// Re-export shared types
pub use shared::error::{CryptoError, IndexError, StoreError, WalletError};
pub use shared::types::{Address, WalletNumber, WalletResult};

/// Initialize logging. Safe to call more than once.
pub fn init() {
    let _ = env_logger::try_init();
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Open the vault with configuration from .env or safe defaults
pub async fn init_wallet_vault() -> Result<WalletVault, WalletError> {
    WalletVault::open(VaultConfig::from_env()).await
}

/// Entry point for the command layer
pub struct WalletVault {
    resolver: Arc<WalletResolver>,
}

impl WalletVault {
    /// Open a vault backed by files under `config.backup_dir`
    pub async fn open(config: VaultConfig) -> Result<Self, WalletError> {
        let store = FileBackupStore::open(config.backup_dir.clone()).await?;
        log::info!("Opening wallet vault at {}", store.root().display());
        Self::with_store(Arc::new(store), &config).await
    }

    /// Open a vault over any backup store
    pub async fn with_store(store: Arc<dyn BackupStore>, config: &VaultConfig) -> Result<Self, WalletError> {
        let resolver = WalletResolver::open(store, config).await?;
        Ok(Self {
            resolver: Arc::new(resolver),
        })
    }

    pub fn resolver(&self) -> &Arc<WalletResolver> {
        &self.resolver
    }

    /// Create a wallet and return its address and number
    pub async fn generate_new(&self, password: &str) -> Result<GeneratedWallet, WalletError> {
        let handle = self.resolver.generate_new(password).await?;
        Self::summarize(&handle)
    }

    pub async fn import_wallet(&self, mnemonic: &str, password: &str) -> Result<GeneratedWallet, WalletError> {
        let handle = self.resolver.import_mnemonic(mnemonic, password).await?;
        Self::summarize(&handle)
    }

    pub async fn load_wallet_by_number(&self, wallet_number: WalletNumber, password: Option<&str>) -> Result<WalletHandle, WalletError> {
        self.resolver.load_by_number(wallet_number, password).await
    }

    pub async fn load_wallet_by_address(&self, address: &str, password: Option<&str>) -> Result<WalletHandle, WalletError> {
        self.resolver.load_by_address(address, password).await
    }

    pub async fn eject_wallet_from_file(&self, address: &str, password: &str) -> Result<SecureSeedPhrase, WalletError> {
        self.resolver.eject_from_file(address, password).await
    }

    pub async fn store_wallet_in_cache(&self, address: &str, handle: &WalletHandle) -> Result<(), WalletError> {
        self.resolver.store_in_cache(address, handle).await
    }

    pub async fn clear_wallet_from_cache(&self, address: &str) -> bool {
        self.resolver.clear_from_cache(address).await
    }

    pub async fn get_wallet_data(&self, handle: &WalletHandle, wallet_number: Option<WalletNumber>) -> Result<WalletData, WalletError> {
        self.resolver.get_wallet_data(handle, wallet_number).await
    }

    pub async fn remove_wallet(&self, address: &str, password: &str) -> Result<(), WalletError> {
        self.resolver.remove_wallet(address, password).await
    }

    pub async fn list_wallets(&self) -> Vec<WalletSummary> {
        self.resolver.list_wallets().await
    }

    fn summarize(handle: &WalletHandle) -> Result<GeneratedWallet, WalletError> {
        let wallet_number = handle
            .wallet_number()
            .ok_or_else(|| WalletError::internal(format!("new wallet {} has no number", handle.address())))?;
        Ok(GeneratedWallet {
            address: handle.address().to_string(),
            wallet_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::crypto::KdfParams;
    use std::time::Duration;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> VaultConfig {
        VaultConfig::new(dir.path())
            .with_kdf(KdfParams::new(256, 1, 1))
            .with_retry(RetryPolicy::new(2, Duration::from_millis(1)))
    }

    #[test]
    fn test_init_is_repeatable() {
        init();
        init();
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "wallet-vault-core");
    }

    #[tokio::test]
    async fn test_vault_round_trip() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let vault = WalletVault::open(test_config(&dir)).await.expect("Failed to open vault");

        let created = vault.generate_new("pw1").await.expect("Failed to generate wallet");
        assert_eq!(created.wallet_number, 1);
        assert!(dir
            .path()
            .join(format!("{}_wallet_backup.json", created.address))
            .exists());

        assert!(vault.clear_wallet_from_cache(&created.address).await);
        let err = vault
            .load_wallet_by_address(&created.address, None)
            .await
            .expect_err("Expected password prompt");
        assert!(err.is_password_required());

        let handle = vault
            .load_wallet_by_address(&created.address, Some("pw1"))
            .await
            .expect("Failed to load wallet");
        assert_eq!(handle.wallet_number(), Some(1));

        let data = vault.get_wallet_data(&handle, None).await.expect("Failed to get wallet data");
        assert!(data.is_unlocked());

        let phrase = vault
            .eject_wallet_from_file(&created.address, "pw1")
            .await
            .expect("Failed to eject wallet");
        assert_eq!(phrase.word_count(), 24);
    }

    #[tokio::test]
    async fn test_handle_outlives_vault() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let vault = WalletVault::open(test_config(&dir)).await.expect("Failed to open vault");
        let created = vault.generate_new("pw1").await.expect("Failed to generate wallet");
        let handle = vault
            .load_wallet_by_number(created.wallet_number, None)
            .await
            .expect("Failed to load cached wallet");
        drop(vault);

        // The handle now holds the only reference to the keyring
        assert_eq!(Arc::strong_count(handle.keyring()), 1);
        handle.keyring().sign_message(b"still usable").expect("Failed to sign message");
    }

    #[tokio::test]
    async fn test_vault_import_list_remove() {
        let store: Arc<dyn BackupStore> = Arc::new(MemoryBackupStore::new());
        let dir = TempDir::new().expect("Failed to create temp dir");
        let vault = WalletVault::with_store(store, &test_config(&dir))
            .await
            .expect("Failed to open vault");

        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        let imported = vault.import_wallet(phrase, "pw1").await.expect("Failed to import wallet");
        let generated = vault.generate_new("pw2").await.expect("Failed to generate wallet");
        assert_eq!(generated.wallet_number, 2);

        let listed = vault.list_wallets().await;
        assert_eq!(listed, vec![imported.clone(), generated.clone()]);

        vault.remove_wallet(&imported.address, "pw1").await.expect("Failed to remove wallet");
        assert_eq!(vault.list_wallets().await, vec![generated]);

        let err = vault
            .load_wallet_by_number(1, Some("pw1"))
            .await
            .expect_err("Removed wallet should not load");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_store_wallet_in_cache_via_vault() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let vault = WalletVault::open(test_config(&dir)).await.expect("Failed to open vault");

        let created = vault.generate_new("pw1").await.expect("Failed to generate wallet");
        let handle = vault
            .load_wallet_by_number(created.wallet_number, None)
            .await
            .expect("Failed to load cached wallet");

        vault.clear_wallet_from_cache(&created.address).await;
        vault
            .store_wallet_in_cache(&created.address, &handle)
            .await
            .expect("Failed to cache wallet");

        let cached = vault
            .load_wallet_by_address(&created.address, None)
            .await
            .expect("Failed to load cached wallet");
        assert!(Arc::ptr_eq(cached.keyring(), handle.keyring()));
    }
}
