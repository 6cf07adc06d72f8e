//! Read-only HTTP API over the exchange feed. Every request fetches fresh
//! data; nothing is cached between requests.

use crate::engine::{MatchRecordNormalizer, NormalizedMatch};
use crate::feed::exchange::{ExchangeMode, ExchangeQuery};
use crate::feed::MatchFeed;
use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SportChoice {
    Football,
    Cricket,
    IceHockey,
    PadelTennis,
}

impl SportChoice {
    /// Exchange category id.
    pub fn sport_id(self) -> u32 {
        match self {
            SportChoice::Football => 1,
            SportChoice::Cricket => 45,
            SportChoice::IceHockey => 5,
            SportChoice::PadelTennis => 211,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MatchesQuery {
    pub mode: ExchangeMode,
    #[serde(default)]
    pub sport: Option<SportChoice>,
}

pub struct ApiState<F> {
    pub feed: F,
    pub normalizer: MatchRecordNormalizer,
    pub limit: u32,
}

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Upstream(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "No matches found for the selected criteria.".to_string(),
            ),
            ApiError::Upstream(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Could not fetch data from external API: {}", e),
            ),
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

pub fn router<F>(state: Arc<ApiState<F>>) -> Router
where
    F: MatchFeed<Query = ExchangeQuery> + 'static,
{
    Router::new()
        .route("/", get(root))
        .route("/matches", get(list_matches::<F>))
        .route("/matches/", get(list_matches::<F>))
        .with_state(state)
}

pub async fn serve<F>(bind: &str, state: Arc<ApiState<F>>) -> Result<()>
where
    F: MatchFeed<Query = ExchangeQuery> + 'static,
{
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("bind {}", bind))?;
    tracing::info!(bind = %bind, "api started");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to the Sports Data API. Use /matches?mode=live|sportsbook to query."
    }))
}

pub async fn list_matches<F>(
    State(st): State<Arc<ApiState<F>>>,
    Query(q): Query<MatchesQuery>,
) -> Result<Json<Vec<NormalizedMatch>>, ApiError>
where
    F: MatchFeed<Query = ExchangeQuery>,
{
    let query = ExchangeQuery {
        mode: q.mode,
        sport_id: q.sport.map(SportChoice::sport_id),
        limit: st.limit,
    };
    let page = st.feed.fetch_matches(&query).await.map_err(|e| {
        tracing::warn!(error = %e, "exchange fetch failed");
        ApiError::Upstream(format!("{:#}", e))
    })?;

    let outcome = st.normalizer.normalize_batch(&page.records);
    if outcome.matches.is_empty() {
        return Err(ApiError::NotFound);
    }
    tracing::debug!(
        count = outcome.matches.len(),
        skipped = page.skipped + outcome.skipped,
        "served matches"
    );
    Ok(Json(outcome.matches))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::misc::MiscCodeTable;
    use crate::feed::catalog::{Language, SportsCatalog};
    use crate::feed::exchange::parse_exchange_response;
    use crate::feed::FeedPage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays a canned body and records the last query.
    struct StubFeed {
        body: Option<&'static str>,
        seen: Mutex<Option<ExchangeQuery>>,
    }

    #[async_trait]
    impl MatchFeed for StubFeed {
        type Query = ExchangeQuery;

        async fn fetch_matches(&self, query: &ExchangeQuery) -> Result<FeedPage> {
            *self.seen.lock().unwrap() = Some(*query);
            match self.body {
                Some(body) => parse_exchange_response(body),
                None => anyhow::bail!("connection refused"),
            }
        }
    }

    fn state(body: Option<&'static str>) -> Arc<ApiState<StubFeed>> {
        Arc::new(ApiState {
            feed: StubFeed { body, seen: Mutex::new(None) },
            normalizer: MatchRecordNormalizer::new(
                chrono_tz::UTC,
                Language::English,
                MiscCodeTable::default(),
                SportsCatalog::default(),
            ),
            limit: 50,
        })
    }

    const ONE_MATCH: &str = r#"{"lines_hierarchy": [{"line_type_title": "PREMATCH",
        "line_category_dto_collection": [{"id": 45, "title": "Cricket",
        "line_supercategory_dto_collection": [{"title": "India",
        "line_subcategory_dto_collection": [{"title": "IPL",
        "line_dto_collection": [{"match": {"id": 1, "team1": {"title": "CSK"}, "team2": {"title": "MI"}},
        "outcomes": [{"group_alias": "1x2", "alias": "1", "odd": 1.8}, {"group_alias": "1x2", "alias": "2", "odd": 2.1}]}]}]}]}]}]}"#;

    #[test]
    fn test_query_decoding() {
        let q: MatchesQuery = serde_json::from_value(serde_json::json!({"mode": "live", "sport": "padel_tennis"})).unwrap();
        assert_eq!(q.mode, ExchangeMode::Live);
        assert_eq!(q.sport.map(SportChoice::sport_id), Some(211));
        assert_eq!(SportChoice::IceHockey.sport_id(), 5);
        assert!(serde_json::from_value::<MatchesQuery>(serde_json::json!({"mode": "archive"})).is_err());
    }

    #[tokio::test]
    async fn test_matches_ok() {
        let st = state(Some(ONE_MATCH));
        let q = MatchesQuery { mode: ExchangeMode::Sportsbook, sport: Some(SportChoice::Cricket) };
        let Json(matches) = list_matches(State(st.clone()), Query(q)).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].slug, "csk_vs_mi_cricket");
        assert!(matches[0].win_probability.is_some());

        let seen = st.feed.seen.lock().unwrap().unwrap();
        assert_eq!(seen.sport_id, Some(45));
        assert_eq!(seen.limit, 50);
    }

    #[tokio::test]
    async fn test_matches_empty_is_404() {
        let st = state(Some(r#"{"lines_hierarchy": []}"#));
        let q = MatchesQuery { mode: ExchangeMode::Live, sport: None };
        let err = list_matches(State(st), Query(q)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_503() {
        let st = state(None);
        let q = MatchesQuery { mode: ExchangeMode::Live, sport: None };
        let err = list_matches(State(st), Query(q)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
