use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::{Parser, Subcommand};
use kmsenv_client::{EnvelopeCipher, KmsClient, KmsConfig};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "kmsenv",
    version,
    about = "Envelope encryption with a KMS instance or a local development key"
)]
struct Cli {
    /// Path to the JSON client configuration
    #[arg(short, long, env = "KMSENV_CONFIG")]
    config: PathBuf,

    /// Master key ID in the key service
    #[arg(short, long, env = "KMSENV_KEY_ID")]
    key_id: String,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text under a fresh data key and print the envelope string
    Encrypt {
        /// Text to encrypt; read from stdin when omitted
        text: Option<String>,
    },
    /// Decrypt an envelope string and print the plaintext
    Decrypt {
        /// Envelope string; read from stdin when omitted
        envelope: Option<String>,
    },
    /// Issue a data key and print its wrapped form as JSON
    GenerateDataKey {
        /// Data key size in bytes
        #[arg(short, long, default_value_t = 32)]
        bytes: usize,
    },
}

#[derive(Serialize)]
struct WrappedDataKey {
    key_id: String,
    ciphertext_blob: String,
    iv: String,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_input(arg: Option<String>) -> Result<String> {
    match arg {
        Some(value) => Ok(value),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf.trim_end_matches(['\r', '\n']).to_string())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = KmsConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    let client = Arc::new(KmsClient::from_config(&config).context("failed to initialize KMS client")?);
    debug!("using {} key service", client.service_name());

    match cli.command {
        Commands::Encrypt { text } => {
            let text = read_input(text)?;
            let cipher = EnvelopeCipher::new(client);
            let encoded = cipher
                .encrypt_string(&cli.key_id, text.as_bytes())
                .await
                .context("encryption failed")?;
            println!("{encoded}");
        }
        Commands::Decrypt { envelope } => {
            let envelope = read_input(envelope)?;
            let cipher = EnvelopeCipher::new(client);
            let plaintext = cipher
                .decrypt_string(&cli.key_id, envelope.trim())
                .await
                .context("decryption failed")?;
            let Ok(text) = String::from_utf8(plaintext) else {
                bail!("decrypted data is not valid UTF-8");
            };
            println!("{text}");
        }
        Commands::GenerateDataKey { bytes } => {
            let data_key = client
                .generate_data_key(&cli.key_id, bytes)
                .await
                .context("data key generation failed")?;
            let wrapped = WrappedDataKey {
                key_id: data_key.key_id.clone(),
                ciphertext_blob: STANDARD.encode(&data_key.ciphertext_blob),
                iv: STANDARD.encode(&data_key.iv),
            };
            println!("{}", serde_json::to_string_pretty(&wrapped)?);
        }
    }

    Ok(())
}
