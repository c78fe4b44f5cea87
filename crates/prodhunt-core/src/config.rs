use crate::app_config::{AppConfig, Environment, DEFAULT_USER_AGENTS};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let trimmed = |var: &str, default: &str| -> String {
        or_default(var, default).trim().to_string()
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        trimmed(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        trimmed(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        trimmed(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        trimmed(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_weight = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = trimmed(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(
                var,
                format!("must be a finite, non-negative number, got {value}"),
            ));
        }
        Ok(value)
    };

    let database_url = lookup("DATABASE_URL")
        .ok()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());

    let env = parse_environment(&or_default("PRODHUNT_ENV", "development"))?;
    let bind_addr = parse_addr("PRODHUNT_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("PRODHUNT_LOG_LEVEL", "info");
    let sources_path = PathBuf::from(or_default(
        "PRODHUNT_SOURCES_PATH",
        "./config/sources.yaml",
    ));

    let db_max_connections = parse_u32("PRODHUNT_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("PRODHUNT_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(invalid(
            "PRODHUNT_DB_MIN_CONNECTIONS",
            format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        ));
    }
    let db_acquire_timeout_secs = parse_u64("PRODHUNT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("PRODHUNT_SCRAPER_REQUEST_TIMEOUT_SECS", "10")?;
    let scraper_user_agents = lookup("PRODHUNT_SCRAPER_USER_AGENTS")
        .ok()
        .map(|raw| parse_user_agents(&raw))
        .filter(|agents| !agents.is_empty())
        .unwrap_or_else(|| {
            DEFAULT_USER_AGENTS
                .iter()
                .map(|ua| (*ua).to_string())
                .collect()
        });
    let scraper_politeness_gap_ms = parse_u64("PRODHUNT_SCRAPER_POLITENESS_GAP_MS", "1000")?;
    let scraper_max_pages = parse_usize("PRODHUNT_SCRAPER_MAX_PAGES", "5")?;
    if scraper_max_pages == 0 {
        return Err(invalid(
            "PRODHUNT_SCRAPER_MAX_PAGES",
            "page budget must be at least 1".to_string(),
        ));
    }
    let scraper_max_concurrent_sources =
        parse_usize("PRODHUNT_SCRAPER_MAX_CONCURRENT_SOURCES", "3")?;

    let rank_sentiment_weight = parse_weight("PRODHUNT_RANK_SENTIMENT_WEIGHT", "1.0")?;
    let rank_price_weight = parse_weight("PRODHUNT_RANK_PRICE_WEIGHT", "1.0")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        sources_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agents,
        scraper_politeness_gap_ms,
        scraper_max_pages,
        scraper_max_concurrent_sources,
        rank_sentiment_weight,
        rank_price_weight,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim() {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRODHUNT_ENV".to_string(),
            reason: format!(
                "unknown environment '{other}'; expected development, test, or production"
            ),
        }),
    }
}

/// Splits a `|`-separated user-agent list. Commas are legal inside UA strings,
/// so they cannot be the separator.
fn parse_user_agents(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
