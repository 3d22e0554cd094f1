//! Infrastructure layer - storage backends and configuration
//!
//! This module contains the concrete backup stores and the environment-driven
//! configuration for the wallet vault.

pub mod config;
pub mod storage;

// Re-export infrastructure components
pub use config::*;
pub use storage::*;
