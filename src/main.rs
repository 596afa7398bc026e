use anyhow::{Context, Result, bail};
use bcrypt_core::{BcryptParams, DEFAULT_COST, HASH_LEN, SALT_STRING_LEN, Version};
use clap::{Parser, Subcommand};
use log::debug;
use serde::Serialize;
use std::path::PathBuf;
mod auth;

#[derive(Debug, clap::Args)]
struct SaltArgs {
    /// Cost factor, log2 of the key schedule rounds (clamped to 4..=31)
    #[arg(long, env = "BCRYPT_COST", default_value_t = DEFAULT_COST)]
    cost: u32,

    /// Minor version tag of the salt (a or b)
    #[arg(long, default_value_t = Version::B)]
    minor: Version,
}

impl SaltArgs {
    fn generate(&self) -> Result<String> {
        bcrypt_core::generate_salt(self.cost, self.minor).context("failed to generate salt")
    }
}

#[derive(Debug, Parser)]
#[command(name = "bcrypt-core")]
#[command(version, about = "bcrypt password hashing from the command line.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prints a fresh salt string
    Gensalt {
        #[command(flatten)]
        salt: SaltArgs,
    },

    /// Hashes a password read from BCRYPT_PASSWORD, stdin or a prompt
    Hash {
        /// Salt string or stored hash to take parameters from
        #[arg(long)]
        salt: Option<String>,

        #[command(flatten)]
        params: SaltArgs,
    },

    /// Checks a password against a stored hash
    Verify {
        /// Stored hash
        #[arg(required_unless_present = "hash_file")]
        hash: Option<String>,

        /// Read the stored hash from a file
        #[arg(long, value_name = "PATH", conflicts_with = "hash")]
        hash_file: Option<PathBuf>,
    },

    /// Shows the parameters encoded in a hash or salt string
    #[command(arg_required_else_help = true)]
    Inspect {
        hash: String,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
struct HashInfo {
    version: String,
    cost: u32,
    rounds: u32,
    salt: String,
    digest: Option<String>,
}

impl HashInfo {
    fn parse(hash: &str) -> Result<Self> {
        let params = BcryptParams::parse(hash).context("not a bcrypt hash")?;
        let digest = hash
            .get(SALT_STRING_LEN..)
            .filter(|_| hash.len() == HASH_LEN)
            .map(str::to_owned);

        Ok(Self {
            version: format!("2{}", params.version()),
            cost: params.cost().get(),
            rounds: params.cost().rounds(),
            salt: params.encoded_salt(),
            digest,
        })
    }
}

fn read_stored_hash(hash: Option<String>, hash_file: Option<PathBuf>) -> Result<String> {
    match (hash, hash_file) {
        (Some(h), _) => Ok(h),
        (None, Some(path)) => {
            let data = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(data.trim_end().to_string())
        }
        (None, None) => bail!("no stored hash provided"),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();
    match args.command {
        Commands::Gensalt { salt } => {
            println!("{}", salt.generate()?);
        }
        Commands::Hash { salt, params } => {
            let salt = match salt {
                Some(s) => s,
                None => params.generate()?,
            };
            debug!("hashing with salt {salt}");
            let password = auth::read_new_password()?;
            let hashed =
                bcrypt_core::hash(password.as_slice(), &salt).context("failed to hash password")?;
            println!("{hashed}");
        }
        Commands::Verify { hash, hash_file } => {
            let stored = read_stored_hash(hash, hash_file)?;
            let password = auth::read_password()?;
            if !bcrypt_core::verify(password.as_slice(), &stored) {
                bail!("verification failed");
            }
            println!("ok");
        }
        Commands::Inspect { hash, json } => {
            let info = HashInfo::parse(&hash)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("version: {}", info.version);
                println!("cost:    {}", info.cost);
                println!("rounds:  {}", info.rounds);
                println!("salt:    {}", info.salt);
                match &info.digest {
                    Some(d) => println!("digest:  {d}"),
                    None => println!("digest:  -"),
                }
            }
        }
    }

    Ok(())
}
