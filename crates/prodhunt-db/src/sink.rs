//! Postgres-backed [`ProductSink`].

use prodhunt_core::{ProductRecord, ProductSink, RecordId, SourceId};
use sqlx::PgPool;

use crate::{products, sources, DbError};

/// Persists crawled records into the `sources` and `products` tables.
#[derive(Debug, Clone)]
pub struct PgSink {
    pool: PgPool,
}

impl PgSink {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl ProductSink for PgSink {
    type Error = DbError;

    async fn get_or_create_source(&self, name: &str, base_url: &str) -> Result<SourceId, DbError> {
        sources::get_or_create_source(&self.pool, name, base_url).await
    }

    async fn persist(&self, record: &ProductRecord, source_id: SourceId) -> Result<RecordId, DbError> {
        products::insert_product(&self.pool, record, source_id).await
    }
}
