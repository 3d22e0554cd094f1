use serde::{Deserialize, Serialize};
use crate::shared::constants::{
    ARGON2_MAX_MEMORY_COST_KIB, ARGON2_MEMORY_COST_KIB, ARGON2_PARALLELISM, ARGON2_TIME_COST,
    KEY_SIZE,
};
use crate::shared::error::CryptoError;
use super::KdfAlgorithm;

/// Key derivation parameters, stored alongside every record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub algorithm: KdfAlgorithm,
    /// Memory cost in KiB
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl KdfParams {
    pub fn new(m_cost: u32, t_cost: u32, p_cost: u32) -> Self {
        Self {
            algorithm: KdfAlgorithm::Argon2id,
            m_cost,
            t_cost,
            p_cost,
        }
    }

    /// Check the parameters against Argon2's limits and our memory ceiling.
    ///
    /// Records are untrusted input, so this runs before every derivation.
    pub fn validate(&self) -> Result<argon2::Params, CryptoError> {
        if self.m_cost > ARGON2_MAX_MEMORY_COST_KIB {
            return Err(CryptoError::key_derivation(format!(
                "memory cost {} KiB exceeds the {} KiB limit",
                self.m_cost, ARGON2_MAX_MEMORY_COST_KIB
            )));
        }
        let params = argon2::Params::new(self.m_cost, self.t_cost, self.p_cost, Some(KEY_SIZE))?;
        Ok(params)
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::new(ARGON2_MEMORY_COST_KIB, ARGON2_TIME_COST, ARGON2_PARALLELISM)
    }
}
