use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Load seed data from CSV files, or clear it out.
#[derive(Debug, Parser)]
#[command(name = "yamdb-import", version)]
struct Cli {
    /// Directory holding category.csv, genre.csv, titles.csv and the rest.
    #[arg(short, long, default_value = "static/data")]
    data_dir: PathBuf,

    /// Delete all rows of every imported table instead of importing.
    #[arg(short, long)]
    clear: bool,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yamdb_import=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let pool = yamdb_db::create_pool(&cli.database_url)
        .await
        .context("Failed to connect to database")?;
    yamdb_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    if cli.clear {
        let summary = yamdb_import::clear_all(&pool).await?;
        let total: u64 = summary.iter().map(|(_, n)| n).sum();
        tracing::info!(total, "Database cleared");
    } else {
        let summary = yamdb_import::import_dir(&pool, &cli.data_dir)
            .await
            .with_context(|| format!("Import from {} failed", cli.data_dir.display()))?;
        let total: u64 = summary.iter().map(|(_, n)| n).sum();
        tracing::info!(total, "Import finished");
    }

    Ok(())
}
