mod api;
mod middleware;

use std::sync::Arc;

use anyhow::Context;
use prodhunt_scraper::{FetchConfig, HttpFetcher};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(prodhunt_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let sources = prodhunt_core::load_sources(&config.sources_path)
        .with_context(|| format!("loading {}", config.sources_path.display()))?
        .select(None);
    if sources.is_empty() {
        tracing::warn!(path = %config.sources_path.display(), "no enabled sources configured");
    }

    let fetcher = HttpFetcher::new(&FetchConfig::from_app_config(&config))?;

    let pool_config = prodhunt_db::PoolConfig::from_app_config(&config);
    let pool = prodhunt_db::connect_pool(config.database_url()?, pool_config).await?;
    let applied = prodhunt_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let app = build_app(AppState {
        pool,
        config: Arc::clone(&config),
        sources: Arc::new(sources),
        fetcher: Arc::new(fetcher),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "prodhunt-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
