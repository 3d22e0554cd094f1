//! Backup store implementations

pub mod file_backup_store;
pub mod memory_backup_store;

pub use file_backup_store::*;
pub use memory_backup_store::*;
