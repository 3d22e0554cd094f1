//! Domain repositories
//!
//! This module contains repository traits for data access
//! following Domain-Driven Design principles.

pub mod backup_store;

// Re-export repositories
pub use backup_store::*;
