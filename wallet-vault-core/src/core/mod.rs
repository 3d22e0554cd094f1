//! Core wallet functionality
//!
//! This module contains the wallet resolver and the cryptography behind it.

pub mod wallet;
pub mod crypto;
