//! On-disk container layout
//!
//! A container is a fixed-width binary header followed by ciphertext
//! running to the end of the file. All header fields are fixed size, so
//! a container with a recognized version tag is fully parseable without
//! external metadata.
//!
//! Layout:
//!
//! | offset | len | field            |
//! |--------|-----|------------------|
//! | 0      | 1   | version tag      |
//! | 1      | 16  | salt             |
//! | 17     | 12  | nonce            |
//! | 29     | 4   | memory_kib (BE)  |
//! | 33     | 4   | time_cost (BE)   |
//! | 37     | 4   | parallelism (BE) |
//! | 41     | ... | ciphertext       |
//!
//! Version 1 holds a single sealed buffer; version 2 holds a stream of
//! length-prefixed sealed chunks (see [`crate::crypto::cipher`]).

use crate::crypto::cipher::{NONCE_LEN, TAG_LEN};
use crate::crypto::key_derivation::{CostParams, SALT_LEN};
use crate::error::FormatError;

/// Version tag for whole-buffer ciphertext
pub const VERSION_BUFFERED: u8 = 1;

/// Version tag for chunked ciphertext
pub const VERSION_CHUNKED: u8 = 2;

/// Fixed header size in bytes
pub const HEADER_LEN: usize = 1 + SALT_LEN + NONCE_LEN + 12;

/// Suffix appended to encrypted files
pub const SUFFIX: &str = "plk";

/// The fixed container header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub params: CostParams,
}

impl Header {
    /// Serialize the header into its fixed-width byte form
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0] = self.version;
        bytes[1..1 + SALT_LEN].copy_from_slice(&self.salt);
        bytes[17..17 + NONCE_LEN].copy_from_slice(&self.nonce);
        bytes[29..33].copy_from_slice(&self.params.memory_kib.to_be_bytes());
        bytes[33..37].copy_from_slice(&self.params.time_cost.to_be_bytes());
        bytes[37..41].copy_from_slice(&self.params.parallelism.to_be_bytes());
        bytes
    }

    /// Parse a header from the first [`HEADER_LEN`] bytes of a container
    pub fn parse(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() < HEADER_LEN {
            return Err(FormatError::TooShort {
                got: bytes.len(),
                min: HEADER_LEN,
            });
        }

        let version = bytes[0];
        if version != VERSION_BUFFERED && version != VERSION_CHUNKED {
            return Err(FormatError::UnsupportedVersion(version));
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[1..1 + SALT_LEN]);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[17..17 + NONCE_LEN]);

        let read_u32 = |offset: usize| {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&bytes[offset..offset + 4]);
            u32::from_be_bytes(buf)
        };

        Ok(Self {
            version,
            salt,
            nonce,
            params: CostParams {
                memory_kib: read_u32(29),
                time_cost: read_u32(33),
                parallelism: read_u32(37),
            },
        })
    }
}

/// Serialize a complete container
pub fn encode(header: &Header, ciphertext: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(ciphertext);
    bytes
}

/// Parse a complete container into its header and ciphertext segment
pub fn decode(bytes: &[u8]) -> Result<(Header, &[u8]), FormatError> {
    let header = Header::parse(bytes)?;
    let ciphertext = &bytes[HEADER_LEN..];

    if header.version == VERSION_BUFFERED && ciphertext.len() < TAG_LEN {
        return Err(FormatError::Malformed(
            "ciphertext shorter than the authentication tag".to_string(),
        ));
    }

    Ok((header, ciphertext))
}
