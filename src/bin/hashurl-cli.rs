use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hashurl::api::{short_url, validate_url_scheme};
use hashurl::config::Config;
use hashurl::{storage, ShortenStatus, Shortener};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hashurl-cli")]
#[command(about = "Shorten and resolve URLs from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shorten a URL
    Shorten {
        /// URL starting with http:// or https://
        url: String,
    },
    /// Look up the original URL for a short id
    Resolve {
        /// Short id, e.g. 1a2b3c4d
        id: String,
    },
    /// Show how many URLs are stored
    Stats,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let storage = storage::connect(&config.database, 0)
        .await
        .context("Could not open the URL database")?;
    let shortener = Shortener::new(storage, config.key_deriver()?);

    match cli.command {
        Commands::Shorten { url } => {
            let url = url.trim();
            if let Err(msg) = validate_url_scheme(url) {
                eprintln!("✗ {}", msg);
                return Ok(ExitCode::FAILURE);
            }

            let shortened = shortener
                .shorten(url)
                .await
                .context("Could not store the URL")?;

            if let ShortenStatus::Collision { existing_url } = &shortened.status {
                eprintln!(
                    "⚠ Id '{}' is already taken by {}; it resolves there, not to your URL",
                    shortened.id, existing_url
                );
            }

            println!("Original URL: {}", url);
            println!("Short URL:    {}", short_url(&config.public_base_url, &shortened.id));
        }
        Commands::Resolve { id } => {
            match shortener
                .resolve(id.trim())
                .await
                .context("Could not look up the id")?
            {
                Some(original_url) => println!("{}", original_url),
                None => {
                    eprintln!("No URL found for id '{}'", id.trim());
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Stats => {
            let count = shortener.stats().await.context("Could not count URLs")?;
            println!("{} URLs stored", count);
        }
    }

    Ok(ExitCode::SUCCESS)
}
