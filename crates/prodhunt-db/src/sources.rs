//! Database operations for `sources`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `sources` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SourceRow {
    pub id: i64,
    pub name: String,
    pub base_url: String,
    pub created_at: DateTime<Utc>,
}

/// Returns the id of the source named `name`, inserting it first if needed.
///
/// Safe under concurrent callers: the upsert relies on the `UNIQUE (name)`
/// constraint, so racing calls for one name converge on a single row. The
/// `base_url` of an existing row is left untouched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_or_create_source(
    pool: &PgPool,
    name: &str,
    base_url: &str,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO sources (name, base_url) \
         VALUES ($1, $2) \
         ON CONFLICT (name) DO UPDATE SET name = sources.name \
         RETURNING id",
    )
    .bind(name)
    .bind(base_url)
    .fetch_one(pool)
    .await?;

    tracing::debug!(source = name, id, "resolved source id");
    Ok(id)
}

/// Returns all sources ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sources(pool: &PgPool) -> Result<Vec<SourceRow>, DbError> {
    let rows = sqlx::query_as::<_, SourceRow>(
        "SELECT id, name, base_url, created_at FROM sources ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Looks up a source by exact name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_source_by_name(pool: &PgPool, name: &str) -> Result<Option<SourceRow>, DbError> {
    let row = sqlx::query_as::<_, SourceRow>(
        "SELECT id, name, base_url, created_at FROM sources WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
