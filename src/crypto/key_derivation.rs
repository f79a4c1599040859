//! Key derivation using Argon2id
//!
//! Derives encryption keys from user passphrases using Argon2id,
//! a memory-hard key derivation function resistant to GPU/ASIC attacks.
//! The cost parameters travel with every container so decryption
//! reproduces the identical key.

use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::secure_memory::Passphrase;
use crate::error::{PadlockError, PadlockResult};

/// Salt length in bytes
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// Cost parameters for key derivation
///
/// Persisted verbatim in the container header. Values outside the
/// floor/ceiling range below are rejected before any work is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Iteration count
    pub time_cost: u32,
    /// Parallelism degree
    pub parallelism: u32,
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            memory_kib: 65536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl CostParams {
    /// Safety floor: below this an offline attack gets too cheap
    pub const MIN_MEMORY_KIB: u32 = 8192;
    /// Resource ceiling for memory
    pub const MAX_MEMORY_KIB: u32 = 2 * 1024 * 1024;
    /// Resource ceiling for iterations
    pub const MAX_TIME_COST: u32 = 1024;
    /// Resource ceiling for parallelism
    pub const MAX_PARALLELISM: u32 = 64;

    /// Reject parameters below the safety floor or above the resource ceiling
    pub fn validate(&self) -> PadlockResult<()> {
        if self.memory_kib < Self::MIN_MEMORY_KIB {
            return Err(PadlockError::InvalidParams(format!(
                "memory cost {} KiB is below the floor of {} KiB",
                self.memory_kib,
                Self::MIN_MEMORY_KIB
            )));
        }
        if self.memory_kib > Self::MAX_MEMORY_KIB {
            return Err(PadlockError::InvalidParams(format!(
                "memory cost {} KiB exceeds the ceiling of {} KiB",
                self.memory_kib,
                Self::MAX_MEMORY_KIB
            )));
        }
        if self.time_cost == 0 || self.time_cost > Self::MAX_TIME_COST {
            return Err(PadlockError::InvalidParams(format!(
                "time cost {} is outside 1..={}",
                self.time_cost,
                Self::MAX_TIME_COST
            )));
        }
        if self.parallelism == 0 || self.parallelism > Self::MAX_PARALLELISM {
            return Err(PadlockError::InvalidParams(format!(
                "parallelism {} is outside 1..={}",
                self.parallelism,
                Self::MAX_PARALLELISM
            )));
        }
        Ok(())
    }
}

/// A derived encryption key, zeroed on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

/// Derive an encryption key from a passphrase and salt
pub fn derive_key(
    passphrase: &Passphrase,
    salt: &[u8; SALT_LEN],
    params: &CostParams,
) -> PadlockResult<DerivedKey> {
    params.validate()?;

    let argon_params = Params::new(
        params.memory_kib,
        params.time_cost,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| PadlockError::InvalidParams(e.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(passphrase.as_str().as_bytes(), salt, &mut key)
        .map_err(|e| PadlockError::InvalidParams(e.to_string()))?;

    Ok(DerivedKey { key })
}
