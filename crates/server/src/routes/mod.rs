use axum::Router;

use crate::AppState;

pub mod consultants;
pub mod health;
pub mod talent_hub;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(consultants::router())
        .merge(talent_hub::router())
}

/// Trimmed, non-empty query-string value.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// First value given for `key`. Later repeats of the same key are ignored.
pub(crate) fn first_value(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}


#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use db::DBService;
    use tower::ServiceExt;
    use utils::clock::FixedClock;

    use crate::{AppState, app, config::Config};

    pub const NOW_MS: i64 = 1_717_200_000_000;

    pub async fn test_app() -> (Router, DBService, FixedClock) {
        let db = DBService::new_in_memory().await.unwrap();
        let config = Config::from_lookup(|_| None).unwrap();
        let clock = FixedClock::new(NOW_MS);
        let state = AppState::new(db.clone(), &config, Arc::new(clock.clone()));
        (app(state), db, clock)
    }

    pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
