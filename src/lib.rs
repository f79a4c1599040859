//! padlock - passphrase-based file encryption for the terminal
//!
//! Files are sealed with AES-256-GCM under a key derived from a
//! passphrase with Argon2id. Salt, nonce, and derivation costs travel
//! in a self-describing binary container, so a file plus its passphrase
//! is everything decryption needs.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `crypto`: key derivation, AEAD sealing/opening, secret scrubbing
//! - `container`: the on-disk container layout
//! - `codec`: file encryption/decryption orchestration
//! - `shell`: the interactive menu
//! - `gitignore`: standalone `.gitignore` synchronization helper
//! - `error`: custom error types
//!
//! # Example
//!
//! ```rust,ignore
//! use padlock::codec;
//! use padlock::crypto::{CostParams, Passphrase};
//!
//! let passphrase = Passphrase::new("correct-horse");
//! let out = codec::encrypt_file(path, &passphrase, &CostParams::default(), None, false)?;
//! ```

pub mod codec;
pub mod container;
pub mod crypto;
pub mod error;
pub mod gitignore;
pub mod shell;

pub use error::{FormatError, PadlockError, PadlockResult};
