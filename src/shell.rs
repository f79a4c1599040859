//! Interactive shell
//!
//! A one-pass menu: choose encrypt or decrypt, name a file, enter a
//! passphrase with echo disabled. Success prints the output path;
//! failure is reported by the caller as a one-line classified error.

use std::io::{self, Write};
use std::path::PathBuf;

use crate::codec;
use crate::crypto::key_derivation::CostParams;
use crate::crypto::secure_memory::Passphrase;
use crate::error::{PadlockError, PadlockResult};

/// Run the interactive menu once
pub fn run() -> PadlockResult<()> {
    println!("padlock - passphrase-based file encryption");
    println!();
    println!("  1. Encrypt a file");
    println!("  2. Decrypt a file");
    println!();

    let choice = prompt_line("What would you like to do? (1/2): ")?;
    let choice = choice.trim();
    if choice != "1" && choice != "2" {
        return Err(PadlockError::Input(format!("invalid choice: {}", choice)));
    }

    let path = prompt_line("File path: ")?;
    let path = PathBuf::from(path.trim());
    if path.as_os_str().is_empty() {
        return Err(PadlockError::Input("no file path given".to_string()));
    }

    if choice == "1" {
        let passphrase = prompt_new_passphrase()?;
        let out = codec::encrypt_file(&path, &passphrase, &CostParams::default(), None, false)?;
        println!("Encrypted file written to {}", out.display());
    } else {
        let passphrase = prompt_passphrase("Passphrase: ")?;
        let out = codec::decrypt_file(&path, &passphrase, None, false)?;
        println!("Decrypted file written to {}", out.display());
    }

    Ok(())
}

/// Prompt for a passphrase without echoing it to the terminal
pub fn prompt_passphrase(prompt: &str) -> PadlockResult<Passphrase> {
    rpassword::prompt_password(prompt)
        .map(Passphrase::new)
        .map_err(|e| PadlockError::Input(format!("Failed to read passphrase: {}", e)))
}

/// Prompt for a new passphrase with confirmation and a minimum length
pub fn prompt_new_passphrase() -> PadlockResult<Passphrase> {
    loop {
        let first = prompt_passphrase("Enter passphrase: ")?;

        if first.len() < 8 {
            println!("Passphrase must be at least 8 characters. Please try again.");
            continue;
        }

        let second = prompt_passphrase("Confirm passphrase: ")?;

        if first.as_str() != second.as_str() {
            println!("Passphrases do not match. Please try again.");
            continue;
        }

        return Ok(first);
    }
}

fn prompt_line(prompt: &str) -> PadlockResult<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}
