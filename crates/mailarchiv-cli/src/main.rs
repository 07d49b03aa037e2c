//! mailarchiv - archives an M365 mailbox as timestamped text files.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use mailarchiv_auth::ClientCredentials;
use mailarchiv_core::{Config, Downloader, DownloadLimits};
use mailarchiv_graph::GraphClient;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "mailarchiv", version, about = "Lädt E-Mails aus einem M365-Postfach herunter und archiviert sie als Textdateien")]
struct Cli {
    /// Mailbox address to archive
    #[arg(long, env = "EMAIL_ADDRESS")]
    mailbox: String,

    /// Directory (tenant) ID of the app registration
    #[arg(long, env = "TENANT_ID")]
    tenant_id: String,

    /// Application (client) ID of the app registration
    #[arg(long, env = "CLIENT_ID")]
    client_id: String,

    /// Client secret of the app registration
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Destination directory for the archive
    #[arg(long, env = "MAIL_DIR", default_value = "mails")]
    mail_dir: PathBuf,

    /// Also drain discovered subfolders
    #[arg(long, env = "INCLUDE_FOLDERS", default_value_t = true, action = clap::ArgAction::Set)]
    include_folders: bool,

    /// Also drain the well-known Archive folder
    #[arg(long, env = "INCLUDE_ARCHIVE", default_value_t = true, action = clap::ArgAction::Set)]
    include_archive: bool,

    /// Messages requested per page
    #[arg(long, env = "CHUNK_SIZE", default_value_t = 50)]
    chunk_size: u32,

    /// Drain folders fully, ignoring --max-emails
    #[arg(long, env = "LOAD_ALL_EMAILS", default_value_t = true, action = clap::ArgAction::Set)]
    load_all: bool,

    /// Global cap across all folders (only without --load-all true)
    #[arg(long, env = "MAX_EMAILS", default_value_t = 100)]
    max_emails: usize,

    /// Per-folder cap, 0 = unlimited
    #[arg(long, env = "MAX_EMAILS_PER_FOLDER", default_value_t = 0)]
    max_emails_per_folder: usize,

    /// Look-back window in days
    #[arg(long, env = "DAYS_BACK", default_value_t = 30)]
    days_back: u32,
}

impl Cli {
    fn into_parts(self) -> (ClientCredentials, Config) {
        let credentials = ClientCredentials {
            tenant_id: self.tenant_id,
            client_id: self.client_id,
            client_secret: self.client_secret,
        };
        let config = Config {
            mailbox: self.mailbox,
            mail_dir: self.mail_dir,
            include_folders: self.include_folders,
            include_archive: self.include_archive,
            limits: DownloadLimits {
                days_back: self.days_back,
                chunk_size: self.chunk_size,
                load_all: self.load_all,
                max_emails_total: self.max_emails,
                max_emails_per_folder: self.max_emails_per_folder,
            },
        };
        (credentials, config)
    }
}

#[tokio::main]
async fn main() {
    // .env first so both the env filter and clap's env fallbacks see it.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("Run failed: {:#}", e);
        eprintln!("❌ Fehler: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (credentials, config) = cli.into_parts();
    config.validate()?;

    let token = credentials
        .acquire_token()
        .await
        .context("OAuth2-Token konnte nicht bezogen werden")?;
    let client = GraphClient::new(token.token);

    let downloader = Downloader::new(&client, &config)?;
    let count = downloader.run().await?;

    println!("\n✅ {} E-Mails erfolgreich archiviert!", count);
    println!("📁 Speicherort: {}", config.mail_dir.display());
    Ok(())
}
