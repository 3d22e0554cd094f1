//! Domain layer - entities and repositories
//!
//! This module contains the domain types and the storage seam of the wallet vault.

pub mod entities;
pub mod repositories;

// Re-export domain components
pub use entities::*;
pub use repositories::*;
