//! Domain entities and value objects
//!
//! This module contains the core domain entities and value objects
//! that represent the business concepts in the wallet vault.

pub mod wallet;
pub mod wallet_record;
pub mod index_snapshot;

// Re-export entities
pub use wallet::*;
pub use wallet_record::*;
pub use index_snapshot::*;
