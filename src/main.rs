//! Command line entry point for czds-dl

use clap::{Parser, Subcommand};
use czds_dl::{Config, Credentials, DownloadRequest, Error, OutputMode, Result, ZoneDownloader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "czds-dl", version, about = "Download zone files from CZDS")]
struct Cli {
    /// JSON configuration file (service URLs, HTTP settings)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download zone files
    ///
    /// Credentials are read from the USERNAME and PASSWORD environment
    /// variables (a .env file in the working directory is honored).
    Download {
        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        /// Zone to download (repeatable; all accessible zones if not given)
        #[arg(short, long, num_args = 1..)]
        zone: Vec<String>,

        /// Keep only the deduplicated delegated domain names
        #[arg(short, long)]
        domains: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), "{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config(path).await?,
        None => Config::default(),
    };

    match cli.command {
        Command::Download { out, zone, domains } => {
            let request = DownloadRequest {
                credentials: credentials_from_env()?,
                output_dir: out,
                zones: zone,
                mode: OutputMode::from_domains_only(domains),
            };
            let downloads = ZoneDownloader::new(config)?.run(&request).await?;
            for download in &downloads {
                println!("{}", download.path.display());
            }
            Ok(())
        }
    }
}

async fn load_config(path: &Path) -> Result<Config> {
    let content = tokio::fs::read(path).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read config file '{}': {}", path.display(), e),
        ))
    })?;
    Ok(serde_json::from_slice(&content)?)
}

fn credentials_from_env() -> Result<Credentials> {
    dotenvy::dotenv().ok();

    let var = |key: &str| {
        std::env::var(key)
            .ok()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::Config {
                message: format!("{key} environment variable is not set"),
                key: Some(key.to_string()),
            })
    };

    Ok(Credentials::new(var("USERNAME")?, var("PASSWORD")?))
}
