//! Storage seam between the crawl pipeline and persistence.

use std::convert::Infallible;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use crate::ProductRecord;

pub type SourceId = i64;
pub type RecordId = i64;

/// Where complete, scored records end up.
///
/// `get_or_create_source` must be idempotent by name and safe under
/// concurrent callers: two racing calls for the same name return the same id
/// and leave exactly one stored source.
pub trait ProductSink: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get_or_create_source(
        &self,
        name: &str,
        base_url: &str,
    ) -> impl Future<Output = Result<SourceId, Self::Error>> + Send;

    fn persist(
        &self,
        record: &ProductRecord,
        source_id: SourceId,
    ) -> impl Future<Output = Result<RecordId, Self::Error>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSource {
    pub id: SourceId,
    pub name: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredProduct {
    pub id: RecordId,
    pub source_id: SourceId,
    pub record: ProductRecord,
}

#[derive(Debug, Default)]
struct MemoryState {
    sources: Vec<StoredSource>,
    products: Vec<StoredProduct>,
}

/// Process-local sink used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    state: Mutex<MemoryState>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sources(&self) -> Vec<StoredSource> {
        self.lock().sources.clone()
    }

    #[must_use]
    pub fn products(&self) -> Vec<StoredProduct> {
        self.lock().products.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get_or_create_source_sync(&self, name: &str, base_url: &str) -> SourceId {
        let mut state = self.lock();
        if let Some(existing) = state.sources.iter().find(|s| s.name == name) {
            return existing.id;
        }
        let id = next_id(state.sources.len());
        state.sources.push(StoredSource {
            id,
            name: name.to_string(),
            base_url: base_url.to_string(),
        });
        id
    }

    fn persist_sync(&self, record: &ProductRecord, source_id: SourceId) -> RecordId {
        let mut state = self.lock();
        let id = next_id(state.products.len());
        state.products.push(StoredProduct {
            id,
            source_id,
            record: record.clone(),
        });
        id
    }
}

fn next_id(len: usize) -> i64 {
    i64::try_from(len).map_or(i64::MAX, |n| n.saturating_add(1))
}

impl ProductSink for MemorySink {
    type Error = Infallible;

    async fn get_or_create_source(
        &self,
        name: &str,
        base_url: &str,
    ) -> Result<SourceId, Self::Error> {
        Ok(self.get_or_create_source_sync(name, base_url))
    }

    async fn persist(
        &self,
        record: &ProductRecord,
        source_id: SourceId,
    ) -> Result<RecordId, Self::Error> {
        Ok(self.persist_sync(record, source_id))
    }
}
