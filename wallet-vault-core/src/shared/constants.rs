//! Constants for the wallet vault
//!
//! This module contains all constants used throughout the wallet vault.

// Persisted format constants
pub const RECORD_FORMAT_VERSION: u32 = 1;
pub const INDEX_FORMAT_VERSION: u32 = 1;
pub const BACKUP_FILE_SUFFIX: &str = "_wallet_backup.json";
pub const INDEX_FILE_NAME: &str = "wallet_index.json";
pub const TEMP_FILE_SUFFIX: &str = ".tmp";

// Security constants
pub const KEY_SIZE: usize = 32;
pub const NONCE_SIZE: usize = 12;
pub const TAG_SIZE: usize = 16;
pub const SALT_SIZE: usize = 32;
pub const PUBLIC_KEY_SIZE: usize = 33;
pub const SIGNATURE_SIZE: usize = 64;

// Argon2id defaults
pub const ARGON2_MEMORY_COST_KIB: u32 = 65536; // 64MB
pub const ARGON2_TIME_COST: u32 = 3;
pub const ARGON2_PARALLELISM: u32 = 1;
/// Records asking for more memory than this are rejected before derivation
pub const ARGON2_MAX_MEMORY_COST_KIB: u32 = 1024 * 1024;

// Key derivation constants
pub const MNEMONIC_ENTROPY_SIZE: usize = 32; // 24 words
pub const MNEMONIC_WORD_COUNT: usize = 24;
pub const DERIVATION_PATH: &str = "m/44'/354'/0'/0'/0'";

// Address constants
pub const SS58_PREFIX: u8 = 42;
pub const SS58_CHECKSUM_PREFIX: &[u8] = b"SS58PRE";
pub const SS58_CHECKSUM_SIZE: usize = 2;

// Retry constants
pub const MAX_RETRY_ATTEMPTS: u32 = 3;
pub const ERROR_RETRY_DELAY_MS: u64 = 50;

// Configuration
pub const BACKUP_DIR_ENV: &str = "WALLET_VAULT_BACKUP_DIR";
pub const DEFAULT_APP_DIR_NAME: &str = "wallet-vault";
pub const DEFAULT_BACKUP_DIR_NAME: &str = "wallet_backups";
