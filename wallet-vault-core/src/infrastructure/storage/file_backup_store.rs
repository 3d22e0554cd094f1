//! File-backed backup store
//!
//! One `<address>_wallet_backup.json` per wallet plus `wallet_index.json`, all in
//! a single directory. Every write goes to a unique temp file in the same
//! directory, is fsynced, then renamed over the target.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use crate::domain::entities::{IndexSnapshot, WalletRecord};
use crate::domain::repositories::BackupStore;
use crate::shared::constants::{BACKUP_FILE_SUFFIX, INDEX_FILE_NAME, TEMP_FILE_SUFFIX};
use crate::shared::error::StoreError;
use crate::shared::types::{Address, StoreResult};
use crate::shared::utils::is_file_safe_address;

/// Backup store rooted at a directory on the local file system
#[derive(Debug, Clone)]
pub struct FileBackupStore {
    root: PathBuf,
}

impl FileBackupStore {
    /// Open (and create if needed) the backup directory
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&root, std::fs::Permissions::from_mode(0o700)).await?;
        }

        log::info!("Opened backup store at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, address: &str) -> StoreResult<PathBuf> {
        if !is_file_safe_address(address) {
            return Err(StoreError::invalid_address(address));
        }
        Ok(self.root.join(format!("{}{}", address, BACKUP_FILE_SUFFIX)))
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE_NAME)
    }

    /// Write `bytes` to `target` so that readers see either the old or the new content
    async fn write_atomic(&self, target: &Path, bytes: &[u8]) -> StoreResult<()> {
        let file_name = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| StoreError::io_failure(format!("invalid target path {}", target.display())))?;
        let tmp_path = self.root.join(format!(
            ".{}.{}{}",
            file_name,
            uuid::Uuid::new_v4().simple(),
            TEMP_FILE_SUFFIX
        ));

        let result: std::io::Result<()> = async {
            let mut options = tokio::fs::OpenOptions::new();
            options.write(true).create_new(true);
            #[cfg(unix)]
            options.mode(0o600);

            let mut file = options.open(&tmp_path).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
            drop(file);

            tokio::fs::rename(&tmp_path, target).await
        }
        .await;

        if let Err(e) = result {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to remove temp file {}: {}", tmp_path.display(), cleanup);
                }
            }
            return Err(e.into());
        }

        self.sync_dir().await;
        Ok(())
    }

    /// Best-effort fsync of the directory so the rename itself is durable
    async fn sync_dir(&self) {
        if !cfg!(unix) {
            return;
        }
        match tokio::fs::File::open(&self.root).await {
            Ok(dir) => {
                if let Err(e) = dir.sync_all().await {
                    log::debug!("Directory fsync failed for {}: {}", self.root.display(), e);
                }
            }
            Err(e) => log::debug!("Could not open {} for fsync: {}", self.root.display(), e),
        }
    }

    fn address_from_file_name(file_name: &str) -> Option<&str> {
        if file_name.starts_with('.') {
            return None;
        }
        file_name
            .strip_suffix(BACKUP_FILE_SUFFIX)
            .filter(|address| is_file_safe_address(address))
    }
}

#[async_trait]
impl BackupStore for FileBackupStore {
    async fn write(&self, address: &str, record: &WalletRecord) -> StoreResult<()> {
        if record.address != address {
            return Err(StoreError::invalid_address(format!(
                "record for {} cannot be stored under {}",
                record.address, address
            )));
        }
        let path = self.record_path(address)?;
        let bytes = record.to_json()?;
        self.write_atomic(&path, &bytes).await?;
        log::debug!("Wrote backup for {}", address);
        Ok(())
    }

    async fn read(&self, address: &str) -> StoreResult<WalletRecord> {
        let path = self.record_path(address)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::not_found(address));
            }
            Err(e) => return Err(e.into()),
        };

        let record = WalletRecord::from_json(&bytes)?;
        if record.address != address {
            return Err(StoreError::corrupt(format!(
                "backup file for {} holds address {}",
                address, record.address
            )));
        }
        Ok(record)
    }

    async fn exists(&self, address: &str) -> StoreResult<bool> {
        let path = self.record_path(address)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn delete(&self, address: &str) -> StoreResult<()> {
        let path = self.record_path(address)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                self.sync_dir().await;
                log::debug!("Deleted backup for {}", address);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_addresses(&self) -> StoreResult<Vec<Address>> {
        let mut found = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let address = match Self::address_from_file_name(&file_name) {
                Some(address) => address.to_string(),
                None => continue,
            };

            match self.read(&address).await {
                Ok(record) => found.push((record.sequence, record.created_at, address)),
                Err(StoreError::NotFound(_)) => continue,
                Err(e @ StoreError::IoFailure(_)) => return Err(e),
                Err(e) => log::warn!("Skipping unreadable backup {}: {}", file_name, e),
            }
        }

        found.sort();
        Ok(found.into_iter().map(|(_, _, address)| address).collect())
    }

    async fn read_index(&self) -> StoreResult<Option<IndexSnapshot>> {
        match tokio::fs::read(self.index_path()).await {
            Ok(bytes) => Ok(Some(IndexSnapshot::from_json(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_index(&self, snapshot: &IndexSnapshot) -> StoreResult<()> {
        let bytes = snapshot.to_json()?;
        self.write_atomic(&self.index_path(), &bytes).await
    }
}
