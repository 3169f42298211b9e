//! Routes for the consultant directory.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::consultant::{Consultant, ConsultantCategory, ConsultantFilter, ConsultantSummary};
use services::services::directory::DirectoryPage;
use utils::{response::ApiResponse, rotation::parse_page_number};
use uuid::Uuid;

use super::{first_value, non_empty};
use crate::{AppState, error::ApiError};

/// Raw query string. Everything is taken as text so a malformed or repeated
/// `page` falls back to page 1 (or the first value) instead of rejecting the
/// request.
#[derive(Debug, Default)]
pub struct ConsultantQuery {
    pub page: Option<String>,
    pub category: Option<String>,
    pub service: Option<String>,
    pub name: Option<String>,
}

impl ConsultantQuery {
    fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            page: first_value(pairs, "page"),
            category: first_value(pairs, "category"),
            service: first_value(pairs, "service"),
            name: first_value(pairs, "name"),
        }
    }

    fn filter(&self) -> Result<ConsultantFilter, ApiError> {
        let category = non_empty(self.category.clone())
            .map(|raw| {
                raw.parse::<ConsultantCategory>()
                    .map_err(|_| ApiError::BadRequest(format!("unknown category '{}'", raw)))
            })
            .transpose()?;

        Ok(ConsultantFilter {
            category,
            service: non_empty(self.service.clone()),
            name: non_empty(self.name.clone()),
        })
    }
}

/// GET /api/consultants
/// Rotated, filtered page of approved consultants
pub async fn list_consultants(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<ResponseJson<ApiResponse<DirectoryPage<ConsultantSummary>>>, ApiError> {
    let query = ConsultantQuery::from_pairs(&pairs);
    let filter = query.filter()?;
    let page_number = parse_page_number(query.page.as_deref());

    let page = state.consultants.list(&filter, page_number).await?;
    Ok(ResponseJson(ApiResponse::success(page)))
}

/// GET /api/consultants/{id}
/// Full profile of an approved consultant
pub async fn get_consultant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Consultant>>, ApiError> {
    let consultant = Consultant::find_by_id(&state.db.pool, id)
        .await?
        .filter(|c| c.approved)
        .ok_or(ApiError::NotFound("consultant"))?;
    Ok(ResponseJson(ApiResponse::success(consultant)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/consultants", get(list_consultants))
        .route("/consultants/{id}", get(get_consultant))
}
