use std::path::PathBuf;

use clap::{Parser, Subcommand};

use alpha_router::config::{load_config, AlphaConfig};
use alpha_router::security::SecurityCodec;

#[derive(Parser)]
#[command(name = "alpha-token")]
#[command(about = "Encode and decode secure URL tokens", long_about = None)]
struct Cli {
    /// Configuration file holding the encryption key and application URL.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a query string into a token
    Encode { query: String },
    /// Decrypt a token and print its parameters
    Decode { token: String },
    /// Build a full secure URL for a query string
    Url { query: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AlphaConfig::default(),
    };
    let codec = SecurityCodec::new(&config.security.encryption_key);

    match cli.command {
        Commands::Encode { query } => {
            println!("{}", codec.encode(&query));
        }
        Commands::Decode { token } => {
            let params = codec.decode_query_params(&token)?;
            println!("{}", serde_json::to_string_pretty(&params)?);
        }
        Commands::Url { query } => {
            println!(
                "{}",
                codec.build_secure_url(&config.app.url, config.app.url_style(), &query)
            );
        }
    }

    Ok(())
}
