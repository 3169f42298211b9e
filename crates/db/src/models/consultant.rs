use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::{filter_value, like_pattern};

/// Discipline a consultancy is listed under
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, Hash, TS, EnumString, Display,
)]
#[sqlx(type_name = "consultant_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ConsultantCategory {
    Geology,
    MiningEngineering,
    Metallurgy,
    Environmental,
    HealthAndSafety,
    Surveying,
    Contracting,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Consultant {
    pub id: Uuid,
    pub company_name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: ConsultantCategory,
    pub region: Option<String>,
    pub summary: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub approved: bool,
    #[sqlx(skip)]
    pub services: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Card shown in the consultant directory
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct ConsultantSummary {
    pub id: Uuid,
    pub company_name: String,
    pub category: ConsultantCategory,
    pub region: Option<String>,
    pub summary: Option<String>,
    pub logo_url: Option<String>,
    #[sqlx(skip)]
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateConsultant {
    pub company_name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: ConsultantCategory,
    pub region: Option<String>,
    pub summary: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
}

/// Directory filter. Only approved consultants are ever listed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct ConsultantFilter {
    pub category: Option<ConsultantCategory>,
    /// Exact service name offered by the consultant
    pub service: Option<String>,
    /// Case-insensitive substring of the company name
    pub name: Option<String>,
}

impl Consultant {
    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateConsultant,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO consultants
                (id, company_name, contact_name, email, phone, category, region, summary, website, logo_url)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
        )
        .bind(id)
        .bind(&data.company_name)
        .bind(&data.contact_name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(data.category)
        .bind(&data.region)
        .bind(&data.summary)
        .bind(&data.website)
        .bind(&data.logo_url)
        .execute(&mut *tx)
        .await?;

        for service in data.services.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            sqlx::query(
                "INSERT OR IGNORE INTO consultant_services (consultant_id, service) VALUES ($1, $2)",
            )
            .bind(id)
            .bind(service)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let consultant = sqlx::query_as::<_, Consultant>(
            r#"SELECT id, company_name, contact_name, email, phone, category, region, summary,
                      website, logo_url, approved, created_at, updated_at
               FROM consultants
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        let Some(mut consultant) = consultant else {
            return Ok(None);
        };
        consultant.services = services_for(pool, &[id])
            .await?
            .remove(&id)
            .unwrap_or_default();
        Ok(Some(consultant))
    }

    pub async fn set_approved(
        pool: &SqlitePool,
        id: Uuid,
        approved: bool,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE consultants
               SET approved = $2,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(approved)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Ids of every approved consultant matching `filter`, in creation order.
    ///
    /// The order is stable so the rotation shuffle sees the same input on every
    /// request within a bucket.
    pub async fn eligible_ids(
        pool: &SqlitePool,
        filter: &ConsultantFilter,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let mut query =
            QueryBuilder::<Sqlite>::new("SELECT c.id FROM consultants c WHERE c.approved = 1");

        if let Some(category) = filter.category {
            query.push(" AND c.category = ").push_bind(category);
        }
        if let Some(service) = filter_value(&filter.service) {
            query
                .push(
                    " AND EXISTS (SELECT 1 FROM consultant_services s \
                     WHERE s.consultant_id = c.id AND s.service = ",
                )
                .push_bind(service.to_string())
                .push(" COLLATE NOCASE)");
        }
        if let Some(name) = filter_value(&filter.name) {
            query
                .push(" AND c.company_name LIKE ")
                .push_bind(like_pattern(name))
                .push(" ESCAPE '\\'");
        }
        query.push(" ORDER BY c.created_at, c.rowid");

        let rows: Vec<(Uuid,)> = query.build_query_as().fetch_all(pool).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

impl ConsultantSummary {
    /// Summaries for `ids` in no particular order. Unknown ids are skipped.
    pub async fn find_by_ids(pool: &SqlitePool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, company_name, category, region, summary, logo_url \
             FROM consultants WHERE id IN (",
        );
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let mut summaries: Vec<ConsultantSummary> =
            query.build_query_as().fetch_all(pool).await?;

        let mut services = services_for(pool, ids).await?;
        for summary in &mut summaries {
            summary.services = services.remove(&summary.id).unwrap_or_default();
        }
        Ok(summaries)
    }
}

async fn services_for(
    pool: &SqlitePool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<String>>, sqlx::Error> {
    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT consultant_id, service FROM consultant_services WHERE consultant_id IN (",
    );
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY service");

    let rows: Vec<(Uuid, String)> = query.build_query_as().fetch_all(pool).await?;
    let mut grouped: HashMap<Uuid, Vec<String>> = HashMap::new();
    for (consultant_id, service) in rows {
        grouped.entry(consultant_id).or_default().push(service);
    }
    Ok(grouped)
}
