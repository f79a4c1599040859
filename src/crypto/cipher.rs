//! AES-256-GCM sealing and opening
//!
//! Authenticated encryption for file contents. Small inputs are sealed
//! as a single buffer; inputs above [`BUFFER_THRESHOLD`] are sealed as a
//! stream of length-prefixed chunks. Every chunk nonce is derived from
//! the base nonce and a strictly increasing counter, with the final
//! chunk marked in the nonce itself so frame-boundary truncation does
//! not verify.
//!
//! Any authentication failure surfaces as [`PadlockError::Forged`];
//! tampered data and a wrong passphrase are indistinguishable by design.

use std::io::{Read, Write};

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};

use crate::crypto::key_derivation::DerivedKey;
use crate::error::{FormatError, PadlockError, PadlockResult};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_LEN: usize = 12;

/// Size of the AES-GCM authentication tag in bytes
pub const TAG_LEN: usize = 16;

/// Inputs larger than this are sealed in chunked mode (64 MiB)
pub const BUFFER_THRESHOLD: u64 = 64 * 1024 * 1024;

/// Plaintext bytes per chunk in chunked mode (4 MiB)
pub const CHUNK_LEN: usize = 4 * 1024 * 1024;

fn cipher(key: &DerivedKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Encrypt a whole buffer, returning ciphertext with the tag appended
pub fn seal(key: &DerivedKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> PadlockResult<Vec<u8>> {
    cipher(key)
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| PadlockError::Io("AEAD encryption failure".to_string()))
}

/// Decrypt a whole buffer, verifying the appended tag
pub fn open(
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> PadlockResult<Vec<u8>> {
    cipher(key)
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| PadlockError::Forged)
}

/// Derive the nonce for one chunk.
///
/// Byte 7 carries the final-chunk flag; bytes 8..12 are XORed with the
/// big-endian counter. Counters strictly increase within one file and the
/// key is fresh per file, so no nonce is ever used twice under one key.
fn chunk_nonce(base: &[u8; NONCE_LEN], counter: u32, last: bool) -> [u8; NONCE_LEN] {
    let mut nonce = *base;
    if last {
        nonce[7] ^= 0x80;
    }
    for (b, c) in nonce[8..].iter_mut().zip(counter.to_be_bytes()) {
        *b ^= c;
    }
    nonce
}

/// Read until the buffer is full or the reader is exhausted
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Seal a stream as length-prefixed chunks of `chunk_len` plaintext bytes.
///
/// One chunk of lookahead decides whether the current chunk is the last,
/// since the final chunk is sealed under a flagged nonce.
pub fn seal_chunked<R: Read, W: Write>(
    key: &DerivedKey,
    base_nonce: &[u8; NONCE_LEN],
    reader: &mut R,
    writer: &mut W,
    chunk_len: usize,
) -> PadlockResult<()> {
    let cipher = cipher(key);
    let mut counter: u32 = 0;

    let mut current = vec![0u8; chunk_len];
    let mut filled = read_full(reader, &mut current)?;

    loop {
        let mut next = vec![0u8; chunk_len];
        let next_filled = read_full(reader, &mut next)?;
        let last = next_filled == 0;

        let nonce = chunk_nonce(base_nonce, counter, last);
        let frame = cipher
            .encrypt(Nonce::from_slice(&nonce), &current[..filled])
            .map_err(|_| PadlockError::Io("AEAD encryption failure".to_string()))?;
        writer.write_all(&(frame.len() as u32).to_be_bytes())?;
        writer.write_all(&frame)?;

        counter = counter
            .checked_add(1)
            .ok_or_else(|| PadlockError::Io("chunk counter overflow".to_string()))?;

        if last {
            return Ok(());
        }
        current = next;
        filled = next_filled;
    }
}

/// Open a stream of length-prefixed chunks written by [`seal_chunked`].
///
/// Framing inconsistencies surface as [`FormatError::Malformed`];
/// any tag mismatch, including a truncation at a frame boundary, as
/// [`PadlockError::Forged`].
pub fn open_chunked<R: Read, W: Write>(
    key: &DerivedKey,
    base_nonce: &[u8; NONCE_LEN],
    reader: &mut R,
    writer: &mut W,
) -> PadlockResult<()> {
    let cipher = cipher(key);
    let mut counter: u32 = 0;

    let mut pending = read_frame(reader)?;
    if pending.is_none() {
        return Err(FormatError::Malformed("no chunk frames present".to_string()).into());
    }

    while let Some(frame) = pending {
        pending = read_frame(reader)?;
        let last = pending.is_none();

        let nonce = chunk_nonce(base_nonce, counter, last);
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&nonce), frame.as_slice())
            .map_err(|_| PadlockError::Forged)?;
        writer.write_all(&plaintext)?;

        counter = counter
            .checked_add(1)
            .ok_or_else(|| PadlockError::Io("chunk counter overflow".to_string()))?;
    }

    Ok(())
}

/// Read one length-prefixed frame; `None` at a clean end of stream
fn read_frame<R: Read>(reader: &mut R) -> PadlockResult<Option<Vec<u8>>> {
    let mut len_buf = [0u8; 4];
    let n = read_full(reader, &mut len_buf)?;
    if n == 0 {
        return Ok(None);
    }
    if n < len_buf.len() {
        return Err(FormatError::Malformed("truncated frame length".to_string()).into());
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len < TAG_LEN {
        return Err(
            FormatError::Malformed("frame shorter than the authentication tag".to_string()).into(),
        );
    }
    if len > CHUNK_LEN + TAG_LEN {
        return Err(FormatError::Malformed("frame length exceeds chunk limit".to_string()).into());
    }

    let mut frame = vec![0u8; len];
    let got = read_full(reader, &mut frame)?;
    if got < len {
        return Err(FormatError::Malformed("frame extends past end of data".to_string()).into());
    }
    Ok(Some(frame))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::io::Cursor;

    use super::*;
    use crate::crypto::key_derivation::{derive_key, CostParams, SALT_LEN};
    use crate::crypto::secure_memory::Passphrase;

    fn test_key(passphrase: &str) -> DerivedKey {
        let params = CostParams {
            memory_kib: CostParams::MIN_MEMORY_KIB,
            time_cost: 1,
            parallelism: 1,
        };
        derive_key(&Passphrase::new(passphrase), &[9u8; SALT_LEN], &params).unwrap()
    }

    #[test]
    fn test_seal_open_round_trip() {
        let key = test_key("test_passphrase");
        let nonce = [3u8; NONCE_LEN];
        let sealed = seal(&key, &nonce, b"Hello, World!").unwrap();
        assert_eq!(sealed.len(), 13 + TAG_LEN);
        let opened = open(&key, &nonce, &sealed).unwrap();
        assert_eq!(opened, b"Hello, World!");
    }

    #[test]
    fn test_empty_plaintext_is_just_a_tag() {
        let key = test_key("test_passphrase");
        let nonce = [3u8; NONCE_LEN];
        let sealed = seal(&key, &nonce, b"").unwrap();
        assert_eq!(sealed.len(), TAG_LEN);
        assert_eq!(open(&key, &nonce, &sealed).unwrap(), b"");
    }

    #[test]
    fn test_wrong_key_fails() {
        let nonce = [3u8; NONCE_LEN];
        let sealed = seal(&test_key("one"), &nonce, b"payload").unwrap();
        let result = open(&test_key("two"), &nonce, &sealed);
        assert!(matches!(result, Err(PadlockError::Forged)));
    }

    #[test]
    fn test_any_flipped_bit_fails() {
        let key = test_key("test_passphrase");
        let nonce = [3u8; NONCE_LEN];
        let sealed = seal(&key, &nonce, b"payload").unwrap();

        for byte in 0..sealed.len() {
            let mut tampered = sealed.clone();
            tampered[byte] ^= 0x01;
            assert!(matches!(
                open(&key, &nonce, &tampered),
                Err(PadlockError::Forged)
            ));
        }
    }

    #[test]
    fn test_chunk_nonces_never_repeat() {
        let base = [0u8; NONCE_LEN];
        let mut seen = HashSet::new();
        for counter in 0..64 {
            assert!(seen.insert(chunk_nonce(&base, counter, false)));
            assert!(seen.insert(chunk_nonce(&base, counter, true)));
        }
    }

    #[test]
    fn test_chunked_round_trip() {
        let key = test_key("test_passphrase");
        let nonce = [5u8; NONCE_LEN];
        let plaintext: Vec<u8> = (0..100u32).map(|i| (i % 251) as u8).collect();

        let mut sealed = Vec::new();
        seal_chunked(&key, &nonce, &mut Cursor::new(&plaintext), &mut sealed, 8).unwrap();

        let mut opened = Vec::new();
        open_chunked(&key, &nonce, &mut Cursor::new(&sealed), &mut opened).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn test_chunked_round_trip_exact_chunk_multiple() {
        let key = test_key("test_passphrase");
        let nonce = [5u8; NONCE_LEN];
        let plaintext = vec![0xAB; 32];

        let mut sealed = Vec::new();
        seal_chunked(&key, &nonce, &mut Cursor::new(&plaintext), &mut sealed, 8).unwrap();

        let mut opened = Vec::new();
        open_chunked(&key, &nonce, &mut Cursor::new(&sealed), &mut opened).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn test_chunked_tamper_fails() {
        let key = test_key("test_passphrase");
        let nonce = [5u8; NONCE_LEN];

        let mut sealed = Vec::new();
        seal_chunked(&key, &nonce, &mut Cursor::new(&[7u8; 40][..]), &mut sealed, 8).unwrap();

        let mid = sealed.len() / 2;
        sealed[mid] ^= 0x01;

        let mut opened = Vec::new();
        let result = open_chunked(&key, &nonce, &mut Cursor::new(&sealed), &mut opened);
        assert!(matches!(
            result,
            Err(PadlockError::Forged) | Err(PadlockError::Format(_))
        ));
    }

    #[test]
    fn test_dropping_final_frame_fails() {
        let key = test_key("test_passphrase");
        let nonce = [5u8; NONCE_LEN];

        let mut sealed = Vec::new();
        seal_chunked(&key, &nonce, &mut Cursor::new(&[7u8; 24][..]), &mut sealed, 8).unwrap();

        // Three frames of 4 + 8 + TAG_LEN bytes each; cut the last one.
        let frame_len = 4 + 8 + TAG_LEN;
        sealed.truncate(sealed.len() - frame_len);

        // The surviving last frame was not sealed under the final-chunk
        // nonce, so authentication must fail.
        let mut opened = Vec::new();
        let result = open_chunked(&key, &nonce, &mut Cursor::new(&sealed), &mut opened);
        assert!(matches!(result, Err(PadlockError::Forged)));
    }

    #[test]
    fn test_truncated_mid_frame_is_malformed() {
        let key = test_key("test_passphrase");
        let nonce = [5u8; NONCE_LEN];

        let mut sealed = Vec::new();
        seal_chunked(&key, &nonce, &mut Cursor::new(&[7u8; 24][..]), &mut sealed, 8).unwrap();
        sealed.truncate(sealed.len() - 3);

        let mut opened = Vec::new();
        let result = open_chunked(&key, &nonce, &mut Cursor::new(&sealed), &mut opened);
        assert!(matches!(
            result,
            Err(PadlockError::Format(FormatError::Malformed(_)))
        ));
    }

    #[test]
    fn test_empty_chunk_stream_is_malformed() {
        let key = test_key("test_passphrase");
        let nonce = [5u8; NONCE_LEN];
        let mut opened = Vec::new();
        let result = open_chunked(&key, &nonce, &mut Cursor::new(&[][..]), &mut opened);
        assert!(matches!(
            result,
            Err(PadlockError::Format(FormatError::Malformed(_)))
        ));
    }

    #[test]
    fn test_oversized_frame_length_is_malformed() {
        let key = test_key("test_passphrase");
        let nonce = [5u8; NONCE_LEN];
        let bogus = u32::MAX.to_be_bytes().to_vec();
        let mut opened = Vec::new();
        let result = open_chunked(&key, &nonce, &mut Cursor::new(&bogus), &mut opened);
        assert!(matches!(
            result,
            Err(PadlockError::Format(FormatError::Malformed(_)))
        ));
    }
}
