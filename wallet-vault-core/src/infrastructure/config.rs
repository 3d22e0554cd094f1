//! Vault configuration
//!
//! Only the backup location comes from the environment. Security settings
//! (KDF cost, cipher) are set in code so a stray `.env` cannot weaken them.

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use crate::core::crypto::{EncryptionAlgorithm, KdfParams};
use crate::core::wallet::{RetryPolicy, SessionPolicy};
use crate::shared::constants::{BACKUP_DIR_ENV, DEFAULT_APP_DIR_NAME, DEFAULT_BACKUP_DIR_NAME};

/// Configuration for a wallet vault instance
#[derive(Debug, Clone, PartialEq)]
pub struct VaultConfig {
    pub backup_dir: PathBuf,
    pub kdf: KdfParams,
    pub cipher: EncryptionAlgorithm,
    pub session: SessionPolicy,
    pub retry: RetryPolicy,
}

impl VaultConfig {
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
            kdf: KdfParams::default(),
            cipher: EncryptionAlgorithm::default(),
            session: SessionPolicy::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Load from `.env` and the process environment, falling back to safe defaults
    pub fn from_env() -> Self {
        dotenv().ok(); // Load .env if present

        let backup_dir = env::var(BACKUP_DIR_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_backup_dir);

        Self::new(backup_dir)
    }

    /// `<data dir>/wallet-vault/wallet_backups`, or `./wallet_backups` when there is no data dir
    pub fn default_backup_dir() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join(DEFAULT_APP_DIR_NAME).join(DEFAULT_BACKUP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR_NAME))
    }

    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    pub fn with_cipher(mut self, cipher: EncryptionAlgorithm) -> Self {
        self.cipher = cipher;
        self
    }

    pub fn with_session(mut self, session: SessionPolicy) -> Self {
        self.session = session;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self::new(Self::default_backup_dir())
    }
}

impl std::fmt::Display for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  Backup directory: {}", self.backup_dir.display())?;
        writeln!(
            f,
            "  KDF: {} (m_cost={} KiB, t_cost={}, p_cost={})",
            self.kdf.algorithm, self.kdf.m_cost, self.kdf.t_cost, self.kdf.p_cost
        )?;
        writeln!(f, "  Cipher: {}", self.cipher)?;
        match self.session.idle_timeout {
            Some(timeout) => writeln!(f, "  Session idle timeout: {}s", timeout.as_secs())?,
            None => writeln!(f, "  Session idle timeout: (none)")?,
        }
        match self.session.max_entries {
            Some(max) => writeln!(f, "  Session capacity: {}", max)?,
            None => writeln!(f, "  Session capacity: (unbounded)")?,
        }
        write!(
            f,
            "  I/O retries: {} attempts, {}ms apart",
            self.retry.max_attempts,
            self.retry.delay.as_millis()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = VaultConfig::new("/tmp/vault");
        assert_eq!(config.backup_dir, PathBuf::from("/tmp/vault"));
        assert_eq!(config.kdf, KdfParams::default());
        assert_eq!(config.cipher, EncryptionAlgorithm::AES256GCM);
        assert_eq!(config.session, SessionPolicy::default());
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_default_backup_dir_name() {
        let dir = VaultConfig::default_backup_dir();
        assert!(dir.ends_with(DEFAULT_BACKUP_DIR_NAME));
    }

    #[test]
    fn test_builders() {
        let config = VaultConfig::new("/tmp/vault")
            .with_kdf(KdfParams::new(256, 1, 1))
            .with_cipher(EncryptionAlgorithm::ChaCha20Poly1305)
            .with_session(SessionPolicy::new(Some(Duration::from_secs(60)), Some(4)));

        assert_eq!(config.kdf.m_cost, 256);
        assert_eq!(config.cipher, EncryptionAlgorithm::ChaCha20Poly1305);
        assert_eq!(config.session.max_entries, Some(4));

        let printed = config.to_string();
        assert!(printed.contains("chacha20-poly1305"));
        assert!(printed.contains("60s"));
    }
}
