//! Rotating directory listings: consultants and the talent hub.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use db::models::{
    consultant::{Consultant, ConsultantFilter, ConsultantSummary},
    worker::{Worker, WorkerFilter, WorkerSummary},
};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use ts_rs::TS;
use utils::{clock::Clock, rotation::Rotation};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Where a listing gets its candidates and display records from.
#[async_trait]
pub trait ListingSource: Send + Sync {
    type Filter: Send + Sync;
    type Record: Send;

    /// Short label used in logs
    fn name(&self) -> &'static str;

    /// Every id eligible under `filter`, in a stable order.
    async fn candidate_ids(&self, filter: &Self::Filter) -> Result<Vec<Uuid>, DirectoryError>;

    /// Display records for `ids`, in any order.
    async fn fetch_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Self::Record>, DirectoryError>;

    fn record_id(record: &Self::Record) -> Uuid;
}

/// One page of a directory listing, records in rotation order
#[derive(Debug, Clone, Serialize, TS)]
pub struct DirectoryPage<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub has_next: bool,
    pub total: usize,
}

pub struct DirectoryService<S> {
    source: S,
    rotation: Rotation,
    clock: Arc<dyn Clock>,
}

impl<S: ListingSource> DirectoryService<S> {
    pub fn new(source: S, rotation: Rotation, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            rotation,
            clock,
        }
    }

    /// Rotated page `page_number` of everything matching `filter`.
    pub async fn list(
        &self,
        filter: &S::Filter,
        page_number: usize,
    ) -> Result<DirectoryPage<S::Record>, DirectoryError> {
        let ids = self.source.candidate_ids(filter).await?;
        let seed = self.rotation.seed(self.clock.as_ref());
        let page = self.rotation.page_at(&ids, page_number, seed);

        debug!(
            listing = self.source.name(),
            candidates = ids.len(),
            page = page.page_number,
            seed,
            "Rotated directory page"
        );

        let records = self.source.fetch_by_ids(&page.items).await?;
        let items = order_by_ids(self.source.name(), &page.items, records, S::record_id);

        info!(
            listing = self.source.name(),
            page = page.page_number,
            returned = items.len(),
            has_next = page.has_next,
            "Served directory page"
        );

        Ok(DirectoryPage {
            items,
            page: page.page_number,
            page_size: page.page_size,
            has_next: page.has_next,
            total: ids.len(),
        })
    }
}

/// Arrange `records` in `ids` order. Ids without a record (removed since the
/// candidate query) are dropped.
fn order_by_ids<T>(
    listing: &str,
    ids: &[Uuid],
    records: Vec<T>,
    record_id: fn(&T) -> Uuid,
) -> Vec<T> {
    let mut by_id: HashMap<Uuid, T> = records
        .into_iter()
        .map(|record| (record_id(&record), record))
        .collect();

    ids.iter()
        .filter_map(|id| {
            let record = by_id.remove(id);
            if record.is_none() {
                debug!(listing, %id, "Listed record disappeared before fetch");
            }
            record
        })
        .collect()
}

/// Approved consultants
#[derive(Clone)]
pub struct ConsultantListing {
    pool: SqlitePool,
}

impl ConsultantListing {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingSource for ConsultantListing {
    type Filter = ConsultantFilter;
    type Record = ConsultantSummary;

    fn name(&self) -> &'static str {
        "consultants"
    }

    async fn candidate_ids(&self, filter: &ConsultantFilter) -> Result<Vec<Uuid>, DirectoryError> {
        Ok(Consultant::eligible_ids(&self.pool, filter).await?)
    }

    async fn fetch_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ConsultantSummary>, DirectoryError> {
        Ok(ConsultantSummary::find_by_ids(&self.pool, ids).await?)
    }

    fn record_id(record: &ConsultantSummary) -> Uuid {
        record.id
    }
}

/// Visible talent hub workers
#[derive(Clone)]
pub struct WorkerListing {
    pool: SqlitePool,
}

impl WorkerListing {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingSource for WorkerListing {
    type Filter = WorkerFilter;
    type Record = WorkerSummary;

    fn name(&self) -> &'static str {
        "talent_hub"
    }

    async fn candidate_ids(&self, filter: &WorkerFilter) -> Result<Vec<Uuid>, DirectoryError> {
        Ok(Worker::eligible_ids(&self.pool, filter).await?)
    }

    async fn fetch_by_ids(&self, ids: &[Uuid]) -> Result<Vec<WorkerSummary>, DirectoryError> {
        Ok(WorkerSummary::find_by_ids(&self.pool, ids).await?)
    }

    fn record_id(record: &WorkerSummary) -> Uuid {
        record.id
    }
}

pub type ConsultantDirectory = DirectoryService<ConsultantListing>;
pub type TalentDirectory = DirectoryService<WorkerListing>;
