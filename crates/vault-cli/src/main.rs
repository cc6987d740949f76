//! Achievement Vault CLI
//!
//! Operator tool for the field encryption codec and the achievement store.
//! The encryption key is read from `ENCRYPTION_KEY`; without one (or with one
//! shorter than 32 characters) everything is stored as plaintext.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use vault_core::{CodecConfig, FieldCodec, ENCRYPTION_KEY_VAR, ENVIRONMENT_VAR};

mod commands;

use commands::Command;

/// Achievement Vault - encrypted-at-rest achievement tracking
#[derive(Parser, Debug)]
#[command(name = "achievement-vault")]
#[command(version)]
#[command(about = "Achievement Vault - encrypted-at-rest achievement tracking")]
struct Args {
    /// Secret the field encryption key is derived from (min. 32 characters)
    #[arg(long, global = true, env = ENCRYPTION_KEY_VAR, hide_env_values = true)]
    encryption_key: Option<String>,

    /// Deployment environment; "production" warns when encryption is disabled.
    /// Falls back to NODE_ENV when unset.
    #[arg(long, global = true, env = ENVIRONMENT_VAR)]
    environment: Option<String>,

    /// Path to the achievement store (defaults to the platform data directory)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = codec_config(&args, |name| std::env::var(name).ok());
    let codec = Arc::new(FieldCodec::new(config));
    codec.validate_startup();

    let output = commands::execute(args.command, codec, args.store).await?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}

/// Command-line values take precedence; anything else comes from `env`
fn codec_config<F>(args: &Args, env: F) -> CodecConfig
where
    F: Fn(&str) -> Option<String>,
{
    CodecConfig::from_lookup(|name| match name {
        ENCRYPTION_KEY_VAR => args.encryption_key.clone(),
        ENVIRONMENT_VAR => args.environment.clone(),
        _ => env(name),
    })
}
