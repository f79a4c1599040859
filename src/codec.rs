//! File encryption and decryption orchestration
//!
//! Each operation is a single synchronous pass: read the input, derive
//! the key, seal or open, write the result. Output goes to a temporary
//! file in the target directory and is atomically renamed into place
//! only on full success, so a crash or a write failure never leaves a
//! truncated artifact at the final path.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use aes_gcm::aead::{rand_core::RngCore, OsRng};

use crate::container::{self, Header, HEADER_LEN, SUFFIX, VERSION_BUFFERED, VERSION_CHUNKED};
use crate::crypto::cipher::{self, BUFFER_THRESHOLD, CHUNK_LEN, NONCE_LEN, TAG_LEN};
use crate::crypto::key_derivation::{derive_key, CostParams, SALT_LEN};
use crate::crypto::secure_memory::Passphrase;
use crate::error::{FormatError, PadlockError, PadlockResult};

/// Encrypt a file, returning the container path.
///
/// The output defaults to the input path with the `.plk` suffix
/// appended. An existing output path is a [`PadlockError::Conflict`]
/// unless `overwrite` is set.
pub fn encrypt_file(
    input: &Path,
    passphrase: &Passphrase,
    params: &CostParams,
    output: Option<&Path>,
    overwrite: bool,
) -> PadlockResult<PathBuf> {
    let meta = input_metadata(input)?;
    let out = match output {
        Some(path) => path.to_path_buf(),
        None => encrypted_path(input),
    };
    if out.exists() && !overwrite {
        return Err(PadlockError::Conflict(out));
    }

    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let key = derive_key(passphrase, &salt, params)?;

    let chunked = meta.len() > BUFFER_THRESHOLD;
    let header = Header {
        version: if chunked { VERSION_CHUNKED } else { VERSION_BUFFERED },
        salt,
        nonce,
        params: *params,
    };

    if chunked {
        let file = File::open(input)
            .map_err(|e| PadlockError::Input(format!("Failed to open {}: {}", input.display(), e)))?;
        let mut reader = BufReader::new(file);
        write_atomic(&out, |writer| {
            writer.write_all(&header.to_bytes())?;
            cipher::seal_chunked(&key, &nonce, &mut reader, writer, CHUNK_LEN)
        })?;
    } else {
        let plaintext = fs::read(input)
            .map_err(|e| PadlockError::Input(format!("Failed to read {}: {}", input.display(), e)))?;
        let sealed = cipher::seal(&key, &nonce, &plaintext)?;
        let bytes = container::encode(&header, &sealed);
        write_atomic(&out, |writer| writer.write_all(&bytes).map_err(Into::into))?;
    }

    Ok(out)
}

/// Decrypt a container file, returning the plaintext path.
///
/// The output defaults to the input path with the `.plk` suffix
/// stripped; an input without the suffix gets `.decrypted` appended
/// instead, so the container itself is never overwritten.
pub fn decrypt_file(
    input: &Path,
    passphrase: &Passphrase,
    output: Option<&Path>,
    overwrite: bool,
) -> PadlockResult<PathBuf> {
    input_metadata(input)?;
    let out = match output {
        Some(path) => path.to_path_buf(),
        None => decrypted_path(input),
    };
    if out.exists() && !overwrite {
        return Err(PadlockError::Conflict(out));
    }

    let file = File::open(input)
        .map_err(|e| PadlockError::Input(format!("Failed to open {}: {}", input.display(), e)))?;
    let mut reader = BufReader::new(file);

    let mut head = [0u8; HEADER_LEN];
    let got = cipher::read_full(&mut reader, &mut head)?;
    if got < HEADER_LEN {
        return Err(FormatError::TooShort {
            got,
            min: HEADER_LEN,
        }
        .into());
    }
    let header = Header::parse(&head)?;

    let key = derive_key(passphrase, &header.salt, &header.params)?;

    match header.version {
        VERSION_BUFFERED => {
            let mut body = Vec::new();
            reader.read_to_end(&mut body)?;
            if body.len() < TAG_LEN {
                return Err(FormatError::Malformed(
                    "ciphertext shorter than the authentication tag".to_string(),
                )
                .into());
            }
            let plaintext = cipher::open(&key, &header.nonce, &body)?;
            write_atomic(&out, |writer| writer.write_all(&plaintext).map_err(Into::into))?;
        }
        VERSION_CHUNKED => {
            write_atomic(&out, |writer| {
                cipher::open_chunked(&key, &header.nonce, &mut reader, writer)
            })?;
        }
        other => return Err(FormatError::UnsupportedVersion(other).into()),
    }

    Ok(out)
}

/// Default container path for an input file: the input name + `.plk`
pub fn encrypted_path(input: &Path) -> PathBuf {
    let mut name = input
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".");
    name.push(SUFFIX);
    input.with_file_name(name)
}

/// Default plaintext path for a container file
pub fn decrypted_path(input: &Path) -> PathBuf {
    match input.extension() {
        Some(ext) if ext == SUFFIX => input.with_extension(""),
        _ => {
            let mut name = input
                .file_name()
                .map(OsString::from)
                .unwrap_or_default();
            name.push(".decrypted");
            input.with_file_name(name)
        }
    }
}

fn input_metadata(input: &Path) -> PadlockResult<fs::Metadata> {
    let meta = fs::metadata(input)
        .map_err(|e| PadlockError::Input(format!("{}: {}", input.display(), e)))?;
    if !meta.is_file() {
        return Err(PadlockError::Input(format!(
            "{} is not a regular file",
            input.display()
        )));
    }
    Ok(meta)
}

/// Write a file atomically: temp file in the same directory, flush,
/// sync, then rename. The temp file is removed on every failure path.
fn write_atomic(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> PadlockResult<()>,
) -> PadlockResult<()> {
    let temp = temp_path(path);

    let result = (|| {
        let file = File::create(&temp)
            .map_err(|e| PadlockError::Io(format!("Failed to create {}: {}", temp.display(), e)))?;
        let mut writer = BufWriter::new(file);
        write(&mut writer)?;
        writer
            .flush()
            .map_err(|e| PadlockError::Io(format!("Failed to flush {}: {}", temp.display(), e)))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| PadlockError::Io(format!("Failed to sync {}: {}", temp.display(), e)))?;
        Ok(())
    })();

    if let Err(err) = result {
        let _ = fs::remove_file(&temp);
        return Err(err);
    }

    fs::rename(&temp, path).map_err(|e| {
        let _ = fs::remove_file(&temp);
        PadlockError::Io(format!(
            "Failed to move {} into place: {}",
            path.display(),
            e
        ))
    })?;

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
