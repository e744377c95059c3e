//! CLI administration tool for shortcode-service.
//!
//! Operates on short URL records directly against the database, without
//! going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL
//! cargo run --bin admin -- create https://example.com/some/long/path
//!
//! # Show a record and its access count
//! cargo run --bin admin -- show Ab3xY9
//!
//! # Point a code at a new destination
//! cargo run --bin admin -- update Ab3xY9 https://example.org
//!
//! # Delete a record
//! cargo run --bin admin -- delete Ab3xY9 --yes
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same database settings as the server: `DATABASE_URL` (or `DB_HOST`,
//! `DB_PORT`, `DB_USER`, `DB_PASSWORD`) and `DB_NAME`.

use shortcode_service::application::services::UrlService;
use shortcode_service::config::Config;
use shortcode_service::domain::entities::UrlRecord;
use shortcode_service::domain::repositories::UrlRepository;
use shortcode_service::infrastructure::persistence::PgUrlRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::mpsc;

/// CLI tool for managing short URLs.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Shorten a URL
    Create {
        /// Destination URL (http or https)
        url: String,
    },

    /// Show a record without counting an access
    Show {
        /// Short code
        code: String,
    },

    /// Change the destination of a short code
    Update {
        /// Short code
        code: String,

        /// New destination URL
        url: String,
    },

    /// Delete a record
    Delete {
        /// Short code
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let options = PgConnectOptions::from_str(&config.database_url)
        .context("Invalid DATABASE_URL")?
        .database(&config.database_name);
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Create { url } => create_url(&url_service(&config, pool), &url).await?,
        Commands::Show { code } => show_url(&url_service(&config, pool), &code).await?,
        Commands::Update { code, url } => {
            update_url(&url_service(&config, pool), &code, &url).await?
        }
        Commands::Delete { code, yes } => {
            delete_url(&url_service(&config, pool), &code, yes).await?
        }
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Builds the same service the server uses, over the given pool.
fn url_service(config: &Config, pool: PgPool) -> UrlService<dyn UrlRepository> {
    let repository: Arc<dyn UrlRepository> = Arc::new(PgUrlRepository::new(Arc::new(pool)));
    // Access counting only happens on resolve, which the CLI never calls.
    let (access_tx, _) = mpsc::channel(1);

    UrlService::new(repository, access_tx)
        .with_max_attempts(config.code_max_attempts)
        .with_store_timeout(config.store_timeout())
}

async fn create_url(service: &UrlService<dyn UrlRepository>, url: &str) -> Result<()> {
    let record = service
        .create(url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create short URL: {}", e))?;

    println!("{}", "✅ Short URL created".green().bold());
    println!();
    print_record(&record);
    println!();

    Ok(())
}

async fn show_url(service: &UrlService<dyn UrlRepository>, code: &str) -> Result<()> {
    let record = service
        .stats(code)
        .await
        .map_err(|e| anyhow::anyhow!("Lookup failed: {}", e))?;

    print_record(&record);
    println!();

    Ok(())
}

async fn update_url(
    service: &UrlService<dyn UrlRepository>,
    code: &str,
    url: &str,
) -> Result<()> {
    let record = service
        .update(code, url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to update short URL: {}", e))?;

    println!("{}", "✅ Short URL updated".green().bold());
    println!();
    print_record(&record);
    println!();

    Ok(())
}

/// Deletes a record after showing it.
///
/// # Safety
///
/// - Requires confirmation (default: No) unless `--yes` is given
async fn delete_url(
    service: &UrlService<dyn UrlRepository>,
    code: &str,
    skip_confirm: bool,
) -> Result<()> {
    let record = service
        .stats(code)
        .await
        .map_err(|e| anyhow::anyhow!("Lookup failed: {}", e))?;

    println!("{}", "🗑  Delete Short URL".bright_blue().bold());
    println!();
    print_record(&record);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this short URL?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete(code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete short URL: {}", e))?;

    println!("{}", "✅ Short URL deleted".green().bold());
    println!();

    Ok(())
}

/// Prints a record as an aligned key/value block.
fn print_record(record: &UrlRecord) {
    println!("  Code:     {}", record.short_code.bright_yellow().bold());
    println!("  URL:      {}", record.original_url.cyan());
    println!(
        "  Accesses: {}",
        record.access_count.to_string().bright_green().bold()
    );
    println!(
        "  Created:  {}",
        record
            .created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .bright_black()
    );
    println!(
        "  Updated:  {}",
        record
            .updated_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .bright_black()
    );
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
                .fetch_one(pool)
                .await
                .context("Connected, but the urls table is missing (run the server once to migrate)")?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!(
                "  Records: {}",
                records.to_string().bright_white().bold()
            );
        }
    }

    Ok(())
}
