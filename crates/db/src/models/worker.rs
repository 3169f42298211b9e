use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::{filter_value, like_pattern};

/// Talent hub profile for an individual worker
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Worker {
    pub id: Uuid,
    pub full_name: String,
    pub trade: String,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub years_experience: Option<i64>,
    pub available: bool,
    pub visible: bool, // Hidden profiles never appear in the talent hub
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Swipe card shown in the talent hub
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct WorkerSummary {
    pub id: Uuid,
    pub full_name: String,
    pub trade: String,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub years_experience: Option<i64>,
    pub available: bool,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateWorker {
    pub full_name: String,
    pub trade: String,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub years_experience: Option<i64>,
    #[serde(default = "default_true")]
    pub available: bool,
    pub avatar_url: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct WorkerFilter {
    /// Trade name, matched case-insensitively
    pub trade: Option<String>,
    /// Substring of the worker's location
    pub location: Option<String>,
    #[serde(default)]
    pub available_only: bool,
}

impl Worker {
    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateWorker,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Worker>(
            r#"INSERT INTO workers (id, full_name, trade, headline, location, years_experience, available, avatar_url)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING id, full_name, trade, headline, location, years_experience, available,
                         visible, avatar_url, created_at, updated_at"#,
        )
        .bind(id)
        .bind(data.full_name.trim())
        .bind(data.trade.trim())
        .bind(&data.headline)
        .bind(&data.location)
        .bind(data.years_experience)
        .bind(data.available)
        .bind(&data.avatar_url)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Worker>(
            r#"SELECT id, full_name, trade, headline, location, years_experience, available,
                      visible, avatar_url, created_at, updated_at
               FROM workers
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn set_visible(
        pool: &SqlitePool,
        id: Uuid,
        visible: bool,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE workers
               SET visible = $2,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(visible)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Ids of visible workers matching `filter`, in creation order.
    pub async fn eligible_ids(
        pool: &SqlitePool,
        filter: &WorkerFilter,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let mut query =
            QueryBuilder::<Sqlite>::new("SELECT w.id FROM workers w WHERE w.visible = 1");

        if let Some(trade) = filter_value(&filter.trade) {
            query
                .push(" AND w.trade = ")
                .push_bind(trade.to_string())
                .push(" COLLATE NOCASE");
        }
        if let Some(location) = filter_value(&filter.location) {
            query
                .push(" AND w.location LIKE ")
                .push_bind(like_pattern(location))
                .push(" ESCAPE '\\'");
        }
        if filter.available_only {
            query.push(" AND w.available = 1");
        }
        query.push(" ORDER BY w.created_at, w.rowid");

        let rows: Vec<(Uuid,)> = query.build_query_as().fetch_all(pool).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

impl WorkerSummary {
    pub async fn find_by_ids(pool: &SqlitePool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, full_name, trade, headline, location, years_experience, available, avatar_url \
             FROM workers WHERE id IN (",
        );
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        query.build_query_as().fetch_all(pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    fn new_worker(name: &str, trade: &str, location: &str, available: bool) -> CreateWorker {
        CreateWorker {
            full_name: name.to_string(),
            trade: trade.to_string(),
            headline: None,
            location: Some(location.to_string()),
            years_experience: Some(4),
            available,
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_visible() {
        let db = DBService::new_in_memory().await.unwrap();
        let id = Uuid::new_v4();
        let data = new_worker("  Sam Reid ", "Driller", "Kalgoorlie", true);
        let worker = Worker::create(&db.pool, id, &data).await.unwrap();
        assert_eq!(worker.full_name, "Sam Reid");
        assert!(worker.visible);
        assert_eq!(Worker::find_by_id(&db.pool, id).await.unwrap().unwrap().trade, "Driller");
    }

    #[tokio::test]
    async fn test_eligible_ids_filters() {
        let db = DBService::new_in_memory().await.unwrap();
        let driller = Uuid::new_v4();
        let fitter = Uuid::new_v4();
        let hidden = Uuid::new_v4();
        Worker::create(&db.pool, driller, &new_worker("A", "Driller", "Kalgoorlie WA", true))
            .await
            .unwrap();
        Worker::create(&db.pool, fitter, &new_worker("B", "Fitter", "Mount Isa QLD", false))
            .await
            .unwrap();
        Worker::create(&db.pool, hidden, &new_worker("C", "Driller", "Perth WA", true))
            .await
            .unwrap();
        Worker::set_visible(&db.pool, hidden, false).await.unwrap();

        let all = Worker::eligible_ids(&db.pool, &WorkerFilter::default()).await.unwrap();
        assert_eq!(all, vec![driller, fitter]);

        let drillers = Worker::eligible_ids(
            &db.pool,
            &WorkerFilter {
                trade: Some("driller".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(drillers, vec![driller]);

        let qld = Worker::eligible_ids(
            &db.pool,
            &WorkerFilter {
                location: Some("qld".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(qld, vec![fitter]);

        let available = Worker::eligible_ids(
            &db.pool,
            &WorkerFilter {
                available_only: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(available, vec![driller]);
    }

    #[tokio::test]
    async fn test_find_summaries_skips_unknown() {
        let db = DBService::new_in_memory().await.unwrap();
        let id = Uuid::new_v4();
        Worker::create(&db.pool, id, &new_worker("D", "Electrician", "Darwin", true))
            .await
            .unwrap();

        let summaries = WorkerSummary::find_by_ids(&db.pool, &[Uuid::new_v4(), id])
            .await
            .unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].trade, "Electrician");
    }
}
