use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use padlock::codec;
use padlock::crypto::key_derivation::CostParams;
use padlock::crypto::secure_memory::Passphrase;
use padlock::gitignore::{self, SyncReport};
use padlock::shell;

#[derive(Parser)]
#[command(
    name = "padlock",
    version,
    about = "Passphrase-based file encryption for the terminal",
    long_about = "padlock seals files with AES-256-GCM under a key derived from \
                  your passphrase with Argon2id. A sealed file carries its salt, \
                  nonce, and derivation costs, so the passphrase is all you need \
                  to open it again."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file with a passphrase
    #[command(alias = "enc")]
    Encrypt {
        /// File to encrypt
        file: PathBuf,

        /// Output path (defaults to the input path with a .plk suffix)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the output path if it already exists
        #[arg(short, long)]
        force: bool,

        /// Argon2id memory cost in KiB
        #[arg(long, default_value_t = CostParams::default().memory_kib)]
        memory_cost: u32,

        /// Argon2id iteration count
        #[arg(long, default_value_t = CostParams::default().time_cost)]
        time_cost: u32,

        /// Argon2id parallelism degree
        #[arg(long, default_value_t = CostParams::default().parallelism)]
        parallelism: u32,

        /// Passphrase (prompted with echo disabled when not supplied)
        #[arg(long, env = "PADLOCK_PASSPHRASE", hide_env_values = true)]
        passphrase: Option<String>,
    },

    /// Decrypt a previously encrypted file
    #[command(alias = "dec")]
    Decrypt {
        /// Container file to decrypt
        file: PathBuf,

        /// Output path (defaults to the input path without its .plk suffix)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the output path if it already exists
        #[arg(short, long)]
        force: bool,

        /// Passphrase (prompted with echo disabled when not supplied)
        #[arg(long, env = "PADLOCK_PASSPHRASE", hide_env_values = true)]
        passphrase: Option<String>,
    },

    /// Run the interactive menu
    #[command(alias = "shell")]
    Interactive,

    /// Create a .gitignore from the reference rules, or report missing entries
    Gitignore {
        /// Target file
        #[arg(default_value = ".gitignore")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Encrypt {
            file,
            output,
            force,
            memory_cost,
            time_cost,
            parallelism,
            passphrase,
        }) => {
            let params = CostParams {
                memory_kib: memory_cost,
                time_cost,
                parallelism,
            };
            let passphrase = match passphrase {
                Some(p) => Passphrase::new(p),
                None => shell::prompt_new_passphrase()?,
            };
            let out = codec::encrypt_file(&file, &passphrase, &params, output.as_deref(), force)?;
            println!("Encrypted file written to {}", out.display());
        }
        Some(Commands::Decrypt {
            file,
            output,
            force,
            passphrase,
        }) => {
            let passphrase = match passphrase {
                Some(p) => Passphrase::new(p),
                None => shell::prompt_passphrase("Passphrase: ")?,
            };
            let out = codec::decrypt_file(&file, &passphrase, output.as_deref(), force)?;
            println!("Decrypted file written to {}", out.display());
        }
        Some(Commands::Gitignore { path }) => match gitignore::sync(&path)? {
            SyncReport::Created { entries } => {
                println!("Created {} with {} entries.", path.display(), entries);
            }
            SyncReport::Complete => {
                println!("{} already contains every reference entry.", path.display());
            }
            SyncReport::Missing(missing) => {
                println!("{} is missing {} entries:", path.display(), missing.len());
                for entry in &missing {
                    println!("  - {} (section '{}')", entry.pattern, entry.section);
                }
            }
        },
        Some(Commands::Interactive) | None => {
            shell::run()?;
        }
    }

    Ok(())
}
