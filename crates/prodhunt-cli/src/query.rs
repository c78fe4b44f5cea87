//! Read-only commands: `search` and `sources`.

use prodhunt_core::AppConfig;
use prodhunt_db::ProductRow;

/// Prints products whose name contains `query`, newest first, followed by
/// the best pick among all matches under the configured ranking weights.
///
/// # Errors
///
/// Returns an error if the query is blank or the database query fails.
pub(crate) async fn run_search(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    query: &str,
    limit: Option<i64>,
) -> anyhow::Result<()> {
    let query = query.trim();
    if query.is_empty() {
        anyhow::bail!("--query must not be blank");
    }

    let limit = limit.unwrap_or(50).clamp(1, 200);
    let results =
        prodhunt_db::search_products(pool, query, limit, config.ranking_weights()).await?;

    if results.products.is_empty() {
        println!("No products found for '{query}'");
        return Ok(());
    }

    for row in &results.products {
        println!("{}", format_row(row));
    }

    match &results.best_product {
        Some(winner) => println!("\nbest pick: {}", format_row(winner)),
        None => println!("\nbest pick: none (no parseable prices)"),
    }
    Ok(())
}

/// Prints the sources configured in the sources file.
///
/// # Errors
///
/// Returns an error if the sources file cannot be loaded.
pub(crate) fn run_sources(config: &AppConfig) -> anyhow::Result<()> {
    let file = prodhunt_core::load_sources(&config.sources_path)?;
    for source in &file.sources {
        let state = if source.enabled { "enabled" } else { "disabled" };
        println!("{:<12} {:<9} {}", source.name, state, source.search_url);
    }
    Ok(())
}

fn format_row(row: &ProductRow) -> String {
    format!(
        "[{}] {} | {} | sentiment {:+.2} | {}",
        row.source_name, row.name, row.price, row.sentiment_score, row.product_url
    )
}
