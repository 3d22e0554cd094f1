//! Wallet resolution for the wallet vault
//!
//! `WalletResolver` ties the codec, backup store, number index, and session
//! cache together. Loads run through an explicit state machine:
//!
//! ```text
//! ResolvingIdentifier -> CacheLookup -> Done                      (hit)
//!                                    -> StoreLookup -> Decrypt
//!                                       -> CachePopulate -> Done  (miss)
//! ```
//!
//! Any state can fail, which ends the load with that error.
//!
//! Locking: per-address locks serialize work on one wallet, and the index
//! mutex serializes number allocation. An address lock is always taken
//! before the index lock, never after.

pub mod address_locks;
pub mod number_index;
pub mod retry;
pub mod session_cache;

pub use address_locks::*;
pub use number_index::*;
pub use retry::*;
pub use session_cache::*;

use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use zeroize::Zeroizing;
use crate::core::crypto::{Keyring, KeyringCodec, SecureSeedPhrase};
use crate::domain::entities::{WalletData, WalletHandle, WalletRecord, WalletSummary};
use crate::domain::repositories::BackupStore;
use crate::infrastructure::config::VaultConfig;
use crate::shared::error::{CryptoError, StoreError, WalletError};
use crate::shared::types::{Address, WalletNumber, WalletRef, WalletResult};
use crate::shared::utils::validate_password;

/// Steps of a wallet load
enum LoadState {
    ResolvingIdentifier(WalletRef),
    CacheLookup {
        address: Address,
        wallet_number: Option<WalletNumber>,
    },
    StoreLookup {
        address: Address,
        wallet_number: Option<WalletNumber>,
    },
    Decrypt {
        record: WalletRecord,
        wallet_number: Option<WalletNumber>,
    },
    CachePopulate {
        keyring: Keyring,
        wallet_number: Option<WalletNumber>,
    },
    Done(WalletHandle),
}

impl LoadState {
    fn name(&self) -> &'static str {
        match self {
            LoadState::ResolvingIdentifier(_) => "resolving identifier",
            LoadState::CacheLookup { .. } => "cache lookup",
            LoadState::StoreLookup { .. } => "store lookup",
            LoadState::Decrypt { .. } => "decrypt",
            LoadState::CachePopulate { .. } => "cache populate",
            LoadState::Done(_) => "done",
        }
    }
}

/// Creates, loads, ejects, and removes wallets
pub struct WalletResolver {
    store: Arc<dyn BackupStore>,
    codec: Arc<KeyringCodec>,
    index: tokio::sync::Mutex<WalletNumberIndex>,
    cache: SessionCache,
    locks: AddressLocks,
    retry: RetryPolicy,
}

impl WalletResolver {
    /// Open a resolver over `store`, loading the persisted index.
    ///
    /// A missing, unreadable, or stale index is rebuilt from the stored records.
    pub async fn open(store: Arc<dyn BackupStore>, config: &VaultConfig) -> WalletResult<Self> {
        let resolver = Self {
            store,
            codec: Arc::new(KeyringCodec::new(config.cipher, config.kdf)),
            index: tokio::sync::Mutex::new(WalletNumberIndex::new()),
            cache: SessionCache::new(config.session),
            locks: AddressLocks::new(),
            retry: config.retry,
        };
        resolver.load_index().await?;
        Ok(resolver)
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    pub fn store(&self) -> &Arc<dyn BackupStore> {
        &self.store
    }

    async fn load_index(&self) -> WalletResult<()> {
        let persisted = match with_io_retry(&self.retry, "read index", || self.store.read_index()).await {
            Ok(Some(snapshot)) => match WalletNumberIndex::from_snapshot(&snapshot) {
                Ok(index) => Some(index),
                Err(e) => {
                    log::warn!("Persisted wallet index rejected: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(StoreError::Corrupt(message)) => {
                log::warn!("Persisted wallet index is corrupt: {}", message);
                None
            }
            Err(e) => return Err(e.into()),
        };

        let addresses = with_io_retry(&self.retry, "list backups", || self.store.list_addresses()).await?;
        let stale = match &persisted {
            Some(index) => self.is_stale(index, &addresses).await?,
            None => !addresses.is_empty(),
        };

        let mut index = self.index.lock().await;
        if stale {
            let previous_highest = persisted.as_ref().map(|i| i.highest_assigned()).unwrap_or(0);
            let rebuilt = self
                .rebuild_from_store(&addresses, persisted.as_ref(), previous_highest)
                .await?;
            self.persist_index(&rebuilt).await?;
            log::info!("Rebuilt wallet index with {} wallets", rebuilt.len());
            *index = rebuilt;
        } else {
            *index = persisted.unwrap_or_default();
            log::info!("Loaded wallet index with {} wallets", index.len());
        }
        Ok(())
    }

    /// An index is stale when a listed record is missing from it, or when it
    /// binds an address whose backup file is gone. Bindings whose file exists
    /// but cannot be read are still valid.
    async fn is_stale(&self, index: &WalletNumberIndex, addresses: &[Address]) -> WalletResult<bool> {
        if addresses.iter().any(|address| index.resolve_address(address).is_none()) {
            return Ok(true);
        }
        for address in Self::unlisted_bindings(index, addresses) {
            if !with_io_retry(&self.retry, "check backup", || self.store.exists(address)).await? {
                log::warn!("Backup for indexed wallet {} is gone", address);
                return Ok(true);
            }
            log::warn!("Backup for indexed wallet {} is unreadable; keeping its number", address);
        }
        Ok(false)
    }

    fn unlisted_bindings<'a>(index: &'a WalletNumberIndex, addresses: &[Address]) -> Vec<&'a Address> {
        index
            .entries()
            .map(|(_, address)| address)
            .filter(|address| !addresses.contains(*address))
            .collect()
    }

    /// Rebuild from the listed records. Bindings in `previous` whose file
    /// still exists but is unreadable keep their numbers.
    async fn rebuild_from_store(
        &self,
        addresses: &[Address],
        previous: Option<&WalletNumberIndex>,
        previous_highest: WalletNumber,
    ) -> WalletResult<WalletNumberIndex> {
        let mut records = Vec::with_capacity(addresses.len());

        if let Some(previous) = previous {
            for address in Self::unlisted_bindings(previous, addresses) {
                if with_io_retry(&self.retry, "check backup", || self.store.exists(address)).await? {
                    if let Some(number) = previous.resolve_address(address) {
                        records.push((address.clone(), number));
                    }
                }
            }
        }

        for address in addresses {
            match with_io_retry(&self.retry, "read backup", || self.store.read(address)).await {
                Ok(record) => records.push((address.clone(), record.sequence)),
                Err(e @ StoreError::IoFailure(_)) => return Err(e.into()),
                Err(e) => log::warn!("Leaving {} out of the index: {}", address, e),
            }
        }
        Ok(WalletNumberIndex::rebuild(
            records.iter().map(|(address, sequence)| (address.as_str(), *sequence)),
            previous_highest,
        ))
    }

    async fn persist_index(&self, index: &WalletNumberIndex) -> WalletResult<()> {
        let snapshot = index.snapshot();
        with_io_retry(&self.retry, "write index", || self.store.write_index(&snapshot)).await?;
        Ok(())
    }

    /// Rebuild the index from the stored records and persist it
    pub async fn rebuild_index(&self) -> WalletResult<Vec<WalletSummary>> {
        let mut index = self.index.lock().await;
        let addresses = with_io_retry(&self.retry, "list backups", || self.store.list_addresses()).await?;
        let rebuilt = self
            .rebuild_from_store(&addresses, Some(&*index), index.highest_assigned())
            .await?;
        self.persist_index(&rebuilt).await?;
        *index = rebuilt;
        log::info!("Rebuilt wallet index with {} wallets", index.len());
        Ok(Self::summaries(&index))
    }

    /// Generate a new wallet, persist it, and cache it
    pub async fn generate_new(&self, password: &str) -> WalletResult<WalletHandle> {
        validate_password(password)?;
        let password = Zeroizing::new(password.to_string());
        let codec = Arc::clone(&self.codec);

        let (keyring, record) = tokio::task::spawn_blocking(move || -> Result<(Keyring, WalletRecord), CryptoError> {
            let keyring = Keyring::generate()?;
            let record = codec.encrypt(&keyring, &password)?;
            Ok((keyring, record))
        })
        .await??;

        self.persist_new(keyring, record).await
    }

    /// Import a wallet from an existing mnemonic
    pub async fn import_mnemonic(&self, mnemonic: &str, password: &str) -> WalletResult<WalletHandle> {
        validate_password(password)?;
        let password = Zeroizing::new(password.to_string());
        let mnemonic = Zeroizing::new(mnemonic.to_string());
        let codec = Arc::clone(&self.codec);

        let (keyring, record) = tokio::task::spawn_blocking(move || -> Result<(Keyring, WalletRecord), CryptoError> {
            let keyring = Keyring::from_mnemonic(&mnemonic)?;
            let record = codec.encrypt(&keyring, &password)?;
            Ok((keyring, record))
        })
        .await??;

        self.persist_new(keyring, record).await
    }

    /// Write a fresh record, assign its number, and persist the index.
    /// On failure after the record write, both are undone.
    async fn persist_new(&self, keyring: Keyring, mut record: WalletRecord) -> WalletResult<WalletHandle> {
        let address = keyring.address().to_string();
        let _guard = self.locks.acquire(&address).await;
        let mut index = self.index.lock().await;

        let stored = with_io_retry(&self.retry, "check backup", || self.store.exists(&address)).await?;
        if stored || index.resolve_address(&address).is_some() {
            return Err(WalletError::wallet_already_exists(address));
        }

        let previous = index.clone();
        record.sequence = index.next_number();
        with_io_retry(&self.retry, "write backup", || self.store.write(&address, &record)).await?;

        let assigned = match index.assign_next(&address) {
            Ok(number) => self.persist_index(&index).await.map(|_| number),
            Err(e) => Err(e.into()),
        };
        let wallet_number = match assigned {
            Ok(number) => number,
            Err(e) => {
                log::warn!("Rolling back new wallet {}: {}", address, e);
                *index = previous;
                if let Err(cleanup) = with_io_retry(&self.retry, "delete backup", || self.store.delete(&address)).await {
                    log::error!("Rollback could not remove backup for {}: {}", address, cleanup);
                }
                return Err(e);
            }
        };
        drop(index);

        let keyring = Arc::new(keyring);
        self.cache.put(&address, Arc::clone(&keyring), Some(wallet_number)).await;
        log::info!("Created wallet #{} ({})", wallet_number, address);
        Ok(WalletHandle::new(keyring, Some(wallet_number)))
    }

    /// Load by wallet number; a password is needed only on a cache miss
    pub async fn load_by_number(&self, wallet_number: WalletNumber, password: Option<&str>) -> WalletResult<WalletHandle> {
        self.load(WalletRef::Number(wallet_number), password).await
    }

    /// Load by address; a password is needed only on a cache miss
    pub async fn load_by_address(&self, address: &str, password: Option<&str>) -> WalletResult<WalletHandle> {
        self.load(WalletRef::Address(address.to_string()), password).await
    }

    /// Load by number or address. The number wins when both are given.
    pub async fn load_wallet(
        &self,
        wallet_number: Option<WalletNumber>,
        address: Option<&str>,
        password: Option<&str>,
    ) -> WalletResult<WalletHandle> {
        self.load(WalletRef::from_parts(wallet_number, address)?, password).await
    }

    async fn load(&self, wallet_ref: WalletRef, password: Option<&str>) -> WalletResult<WalletHandle> {
        if let Some(password) = password {
            validate_password(password)?;
        }

        let mut guard: Option<OwnedMutexGuard<()>> = None;
        let mut state = LoadState::ResolvingIdentifier(wallet_ref);

        loop {
            log::debug!("Wallet load: {}", state.name());
            state = match state {
                LoadState::ResolvingIdentifier(WalletRef::Number(wallet_number)) => {
                    let address = self.index.lock().await.resolve_number(wallet_number)?;
                    LoadState::CacheLookup { address, wallet_number: Some(wallet_number) }
                }
                LoadState::ResolvingIdentifier(WalletRef::Address(address)) => {
                    let wallet_number = self.index.lock().await.resolve_address(&address);
                    LoadState::CacheLookup { address, wallet_number }
                }
                LoadState::CacheLookup { address, wallet_number } => {
                    if let Some(entry) = self.cache.get(&address).await {
                        let wallet_number = wallet_number.or(entry.wallet_number);
                        LoadState::Done(entry.handle().with_wallet_number(wallet_number))
                    } else if password.is_none() {
                        return Err(WalletError::password_required(address));
                    } else if guard.is_none() {
                        // Another task may have unlocked it while we waited
                        guard = Some(self.locks.acquire(&address).await);
                        LoadState::CacheLookup { address, wallet_number }
                    } else {
                        LoadState::StoreLookup { address, wallet_number }
                    }
                }
                LoadState::StoreLookup { address, wallet_number } => {
                    let record = with_io_retry(&self.retry, "read backup", || self.store.read(&address)).await?;
                    LoadState::Decrypt { record, wallet_number }
                }
                LoadState::Decrypt { record, wallet_number } => {
                    let password = password
                        .ok_or_else(|| WalletError::password_required(record.address.clone()))?;
                    let keyring = self.decrypt_record(record, password).await?;
                    LoadState::CachePopulate { keyring, wallet_number }
                }
                LoadState::CachePopulate { keyring, wallet_number } => {
                    let keyring = Arc::new(keyring);
                    self.cache.put(keyring.address(), Arc::clone(&keyring), wallet_number).await;
                    LoadState::Done(WalletHandle::new(keyring, wallet_number))
                }
                LoadState::Done(handle) => return Ok(handle),
            };
        }
    }

    async fn decrypt_record(&self, record: WalletRecord, password: &str) -> WalletResult<Keyring> {
        let address = record.address.clone();
        let codec = Arc::clone(&self.codec);
        let password = Zeroizing::new(password.to_string());

        let result = tokio::task::spawn_blocking(move || codec.decrypt(&record, &password)).await?;
        if let Err(e) = &result {
            log::warn!("Could not unlock backup for {}: {}", address, e);
        }
        Ok(result?)
    }

    /// Decrypt the stored backup and return its mnemonic. The cache is neither read nor changed.
    pub async fn eject_from_file(&self, address: &str, password: &str) -> WalletResult<SecureSeedPhrase> {
        validate_password(password)?;
        let _guard = self.locks.acquire(address).await;

        let record = with_io_retry(&self.retry, "read backup", || self.store.read(address)).await?;
        let keyring = self.decrypt_record(record, password).await?;
        log::info!("Ejected mnemonic for {}", address);
        Ok(keyring.mnemonic().clone())
    }

    /// Remove a wallet from the session cache; the backup is untouched
    pub async fn clear_from_cache(&self, address: &str) -> bool {
        let removed = self.cache.invalidate(address).await;
        if removed {
            log::debug!("Cleared {} from the session cache", address);
        }
        removed
    }

    /// Put an already unlocked wallet into the session cache
    pub async fn store_in_cache(&self, address: &str, handle: &WalletHandle) -> WalletResult<()> {
        if handle.address() != address {
            return Err(WalletError::validation(format!(
                "handle for {} cannot be cached under {}",
                handle.address(),
                address
            )));
        }
        let wallet_number = match handle.wallet_number() {
            Some(number) => Some(number),
            None => self.index.lock().await.resolve_address(address),
        };
        self.cache.put(address, Arc::clone(handle.keyring()), wallet_number).await;
        Ok(())
    }

    /// Describe a wallet. A given number takes priority over the handle and
    /// resolves to whatever is cached for it.
    pub async fn get_wallet_data(&self, handle: &WalletHandle, wallet_number: Option<WalletNumber>) -> WalletResult<WalletData> {
        if let Some(wallet_number) = wallet_number {
            let address = self.index.lock().await.resolve_number(wallet_number)?;
            let keyring = self.cache.get(&address).await.map(|entry| entry.keyring);
            return Ok(WalletData {
                address,
                wallet_number: Some(wallet_number),
                keyring,
            });
        }

        let mut data = WalletData::from(handle);
        if data.wallet_number.is_none() {
            data.wallet_number = self.index.lock().await.resolve_address(handle.address());
        }
        Ok(data)
    }

    /// Delete a wallet after proving the password. Its number is never reused.
    pub async fn remove_wallet(&self, address: &str, password: &str) -> WalletResult<()> {
        validate_password(password)?;
        let _guard = self.locks.acquire(address).await;

        let record = with_io_retry(&self.retry, "read backup", || self.store.read(address)).await?;
        self.decrypt_record(record.clone(), password).await?;

        let mut index = self.index.lock().await;
        let previous = index.clone();
        with_io_retry(&self.retry, "delete backup", || self.store.delete(address)).await?;

        let retired = index.retire(address);
        if let Err(e) = self.persist_index(&index).await {
            log::warn!("Rolling back removal of {}: {}", address, e);
            *index = previous;
            if let Err(restore) = with_io_retry(&self.retry, "restore backup", || self.store.write(address, &record)).await {
                log::error!("Rollback could not restore backup for {}: {}", address, restore);
            }
            return Err(e);
        }
        drop(index);

        self.cache.invalidate(address).await;
        match retired {
            Some(number) => log::info!("Removed wallet #{} ({})", number, address),
            None => log::info!("Removed unindexed wallet {}", address),
        }
        Ok(())
    }

    /// All indexed wallets, ordered by number
    pub async fn list_wallets(&self) -> Vec<WalletSummary> {
        Self::summaries(&*self.index.lock().await)
    }

    pub async fn wallet_number(&self, address: &str) -> Option<WalletNumber> {
        self.index.lock().await.resolve_address(address)
    }

    fn summaries(index: &WalletNumberIndex) -> Vec<WalletSummary> {
        index
            .entries()
            .map(|(wallet_number, address)| WalletSummary {
                address: address.clone(),
                wallet_number,
            })
            .collect()
    }
}
