//! # Record Store
//!
//! Process-lifetime storage for the records each domain service owns.
//! Services only see the `RecordStore` trait so the in-memory map can be
//! replaced by a database without touching service logic.
//!
//! Read-modify-write sequences go through `RecordStore::update`, which holds
//! the write lock for the whole closure.

use crate::error::PaymentResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A storable record keyed by a string id
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;

    /// Ordering key for listings (newest first)
    fn created_at(&self) -> DateTime<Utc>;
}

/// Predicate used to filter listings
pub type RecordFilter<'a, R> = &'a (dyn Fn(&R) -> bool + Send + Sync);

/// In-place mutation applied under the store's exclusive lock
pub type RecordUpdate<R> = Box<dyn FnOnce(&mut R) + Send>;

/// Storage port for one record kind
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    async fn get(&self, id: &str) -> PaymentResult<Option<R>>;

    /// Insert or replace the record under its own id
    async fn put(&self, record: R) -> PaymentResult<()>;

    /// Mutate a record atomically; returns the updated copy, `None` if absent
    async fn update(&self, id: &str, apply: RecordUpdate<R>) -> PaymentResult<Option<R>>;

    /// All records matching `filter`, newest first (ties broken by id)
    async fn list(&self, filter: RecordFilter<'_, R>) -> PaymentResult<Vec<R>>;
}

/// Shared handle to a record store
pub type SharedStore<R> = Arc<dyn RecordStore<R>>;

/// HashMap-backed store guarded by a tokio `RwLock`
#[derive(Debug)]
pub struct InMemoryStore<R> {
    records: RwLock<HashMap<String, R>>,
}

impl<R: Record> InMemoryStore<R> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Create a shared handle, ready for injection into a service
    pub fn shared() -> SharedStore<R> {
        Arc::new(Self::new())
    }
}

impl<R: Record> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for InMemoryStore<R> {
    async fn get(&self, id: &str) -> PaymentResult<Option<R>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn put(&self, record: R) -> PaymentResult<()> {
        self.records
            .write()
            .await
            .insert(record.id().to_string(), record);
        Ok(())
    }

    async fn update(&self, id: &str, apply: RecordUpdate<R>) -> PaymentResult<Option<R>> {
        let mut records = self.records.write().await;
        Ok(records.get_mut(id).map(|record| {
            apply(record);
            record.clone()
        }))
    }

    async fn list(&self, filter: RecordFilter<'_, R>) -> PaymentResult<Vec<R>> {
        let mut matches: Vec<R> = self
            .records
            .read()
            .await
            .values()
            .filter(|record| filter(record))
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(matches)
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Number of records skipped before this page
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) as usize * self.per_page as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

/// A page of records plus the number of records that matched the filter
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<R> {
    pub items: Vec<R>,
    /// Number of records matching the filter, across all pages (not the store size)
    pub total: usize,
}

/// Slice an already-sorted listing into one page
pub fn paginate<R>(records: Vec<R>, page: PageRequest) -> ListPage<R> {
    let total = records.len();
    let items = records
        .into_iter()
        .skip(page.offset())
        .take(page.per_page as usize)
        .collect();
    ListPage { items, total }
}
