//! Routes for the talent hub worker directory.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::worker::{Worker, WorkerFilter, WorkerSummary};
use services::services::directory::DirectoryPage;
use utils::{response::ApiResponse, rotation::parse_page_number};
use uuid::Uuid;

use super::{first_value, non_empty};
use crate::{AppState, error::ApiError};

#[derive(Debug, Default)]
pub struct TalentQuery {
    pub page: Option<String>,
    pub trade: Option<String>,
    pub location: Option<String>,
    pub available: Option<String>,
}

impl TalentQuery {
    fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            page: first_value(pairs, "page"),
            trade: first_value(pairs, "trade"),
            location: first_value(pairs, "location"),
            available: first_value(pairs, "available"),
        }
    }

    fn filter(&self) -> WorkerFilter {
        let available_only = non_empty(self.available.clone())
            .map(|raw| matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        WorkerFilter {
            trade: non_empty(self.trade.clone()),
            location: non_empty(self.location.clone()),
            available_only,
        }
    }
}

/// GET /api/talent-hub
/// Rotated page of visible worker cards; the order changes once a day
pub async fn list_workers(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<ResponseJson<ApiResponse<DirectoryPage<WorkerSummary>>>, ApiError> {
    let query = TalentQuery::from_pairs(&pairs);
    let page_number = parse_page_number(query.page.as_deref());
    let page = state.talent.list(&query.filter(), page_number).await?;
    Ok(ResponseJson(ApiResponse::success(page)))
}

/// GET /api/talent-hub/{id}
pub async fn get_worker(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Worker>>, ApiError> {
    let worker = Worker::find_by_id(&state.db.pool, id)
        .await?
        .filter(|w| w.visible)
        .ok_or(ApiError::NotFound("worker"))?;
    Ok(ResponseJson(ApiResponse::success(worker)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/talent-hub", get(list_workers))
        .route("/talent-hub/{id}", get(get_worker))
}
