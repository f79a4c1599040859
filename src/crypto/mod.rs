//! Cryptographic core for padlock
//!
//! Provides AES-256-GCM authenticated encryption with Argon2id key
//! derivation, plus zero-on-drop handling for secret material.

pub mod cipher;
pub mod key_derivation;
pub mod secure_memory;

pub use cipher::{open, open_chunked, seal, seal_chunked};
pub use key_derivation::{derive_key, CostParams, DerivedKey};
pub use secure_memory::Passphrase;
