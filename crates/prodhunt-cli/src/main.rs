mod query;
mod scrape;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "prodhunt-cli")]
#[command(about = "Crawl marketplaces for products, score reviews, and pick the best buy")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl the configured sources for a keyword and store what is found
    Scrape {
        /// Search term sent to every source
        #[arg(long)]
        keyword: String,

        /// Restrict the crawl to one source (by name, case-insensitive)
        #[arg(long)]
        source: Option<String>,

        /// Override PRODHUNT_SCRAPER_MAX_PAGES for this run
        #[arg(long)]
        max_pages: Option<usize>,

        /// Crawl into memory and print the records instead of writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Search stored products by name and show the best pick
    Search {
        #[arg(long)]
        query: String,

        /// Maximum number of matches to show (1-200)
        #[arg(long)]
        limit: Option<i64>,
    },
    /// List the sources configured in the sources file
    Sources,
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("prodhunt-cli: no command given; run with --help for usage");
        return Ok(());
    };

    let config = prodhunt_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Scrape {
            keyword,
            source,
            max_pages,
            dry_run,
        } => {
            let options = scrape::ScrapeOptions {
                keyword: &keyword,
                source_filter: source.as_deref(),
                max_pages,
                dry_run,
            };
            scrape::run_scrape(&config, options).await?;
        }
        Commands::Search { query, limit } => {
            let pool = connect(&config).await?;
            query::run_search(&pool, &config, &query, limit).await?;
        }
        Commands::Sources => query::run_sources(&config)?,
        Commands::Migrate => {
            let pool = connect(&config).await?;
            let applied = prodhunt_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }

    Ok(())
}

pub(crate) async fn connect(config: &prodhunt_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = prodhunt_db::PoolConfig::from_app_config(config);
    let pool = prodhunt_db::connect_pool(config.database_url()?, pool_config).await?;
    Ok(pool)
}
