use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wishlist_prices::batch::{self, BatchOptions, Selection};
use wishlist_prices::catalog::import_products::import_products;
use wishlist_prices::catalog::SqliteStore;
use wishlist_prices::config::{load_config_from, AppConfig};
use wishlist_prices::scraping::PriceExtractor;
use wishlist_prices::server::{build_app, AppState};
use wishlist_prices::utilities::database;

#[derive(Parser)]
#[command(name = "wishlist_prices", about = "Wish-list price extraction and catalog server")]
struct Cli {
    /// Settings file; environment variables prefixed APP_ override it
    #[arg(global = true, long, default_value = "Settings.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve,
    /// Extract the price of one product page
    Price { url: String },
    /// Refresh stored prices from the retailer pages
    UpdatePrices(UpdatePricesCmd),
    /// Create the database tables
    InitDb,
    /// Seed an empty catalog from a products.json file
    Import { path: PathBuf },
    /// Fill in product images from the retailer pages
    ExtractImages(ExtractImagesCmd),
}

#[derive(Args)]
struct UpdatePricesCmd {
    #[arg(long, conflicts_with_all = ["without_price", "ids"])]
    all: bool,
    #[arg(long, conflicts_with = "ids")]
    without_price: bool,
    #[arg(long, value_delimiter = ',')]
    ids: Option<Vec<String>>,
    #[arg(long)]
    delay_ms: Option<u64>,
    #[arg(long)]
    concurrency: Option<usize>,
    /// Write a CSV report of every outcome
    #[arg(long)]
    report: Option<PathBuf>,
}

impl UpdatePricesCmd {
    fn selection(&self) -> Selection {
        match (&self.ids, self.without_price) {
            _ if self.all => Selection::All,
            (Some(ids), _) => Selection::Selected(ids.clone()),
            (None, true) => Selection::WithoutPrice,
            (None, false) => Selection::All,
        }
    }
}

#[derive(Args)]
struct ExtractImagesCmd {
    #[arg(long, conflicts_with = "without_image")]
    all: bool,
    #[arg(long)]
    without_image: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,wishlist_prices=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config_from(&cli.config).context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve => serve(&config).await,
        Commands::Price { url } => price(&config, &url).await,
        Commands::UpdatePrices(cmd) => update_prices(&config, cmd).await,
        Commands::InitDb => {
            database::init(&config.database.path)?;
            println!("{}", format!("Database ready at {}", config.database.path).green());
            Ok(())
        }
        Commands::Import { path } => {
            let store = open_store(&config)?;
            let inserted = import_products(&store, &path).await?;
            if inserted == 0 {
                println!("{}", "Catalog already has products, nothing imported".yellow());
            } else {
                println!("{}", format!("Imported {} products", inserted).green());
            }
            Ok(())
        }
        Commands::ExtractImages(cmd) => extract_images(&config, cmd).await,
    }
}

fn open_store(config: &AppConfig) -> Result<SqliteStore> {
    Ok(SqliteStore::new(database::init(&config.database.path)?))
}

async fn serve(config: &AppConfig) -> Result<()> {
    let state = AppState::from_config(config)?;
    let app = build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

async fn price(config: &AppConfig, url: &str) -> Result<()> {
    let extractor = PriceExtractor::from_config(&config.scraper)?;

    match extractor.fetch_price(url).await {
        Ok(found) => println!(
            "{} (rule set {}, pattern {})",
            found.normalized_price.green(),
            found.rule_set,
            found.pattern_index
        ),
        Err(failure) => println!("{}", format!("No price: {}", failure).red()),
    }

    Ok(())
}

async fn update_prices(config: &AppConfig, cmd: UpdatePricesCmd) -> Result<()> {
    let store = open_store(config)?;
    let extractor = PriceExtractor::from_config(&config.scraper)?;

    let mut options = BatchOptions::from(&config.batch);
    if let Some(delay_ms) = cmd.delay_ms {
        options.delay_ms = delay_ms;
    }
    if let Some(concurrency) = cmd.concurrency {
        options.concurrency = concurrency.max(1);
    }

    let report = batch::update_prices(Arc::new(store), &extractor, &cmd.selection(), &options).await?;
    batch::print_summary(&report);

    let report_path = cmd
        .report
        .or_else(|| config.batch.report_path.as_ref().map(PathBuf::from));
    if let Some(path) = report_path {
        batch::write_report(&report, &path).await?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

async fn extract_images(config: &AppConfig, cmd: ExtractImagesCmd) -> Result<()> {
    let store = open_store(config)?;
    let extractor = PriceExtractor::from_config(&config.scraper)?;
    let options = BatchOptions::from(&config.batch);

    let only_missing = cmd.without_image && !cmd.all;
    let report = batch::update_images(Arc::new(store), &extractor, only_missing, &options).await?;

    println!("{}", format!("Images found: {}", report.updated).green());
    println!("{}", format!("Without image: {}", report.failed).red());
    Ok(())
}
