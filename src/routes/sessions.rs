use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{AggregationResult, CatalogItem, SortKey},
    routes::AppState,
    services::{
        aggregate, aggregator::is_searchable, sort_by, Handoff, SearchSession, SuggestionState,
    },
};

// Request/Response types

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub suggestion_limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub suggestion_limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct InputRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct ViewAllRequest {
    pub query: String,
    pub page_cap: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ViewAllResponse {
    pub query: String,
    pub total_results: u64,
    pub total_pages: u32,
    pub page_cap: u32,
    pub truncated: bool,
    /// Whether the results page can pick this up without re-fetching
    pub published: bool,
}

#[derive(Debug, Deserialize)]
pub struct ResultsParams {
    #[serde(default)]
    pub q: String,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Handoff,
    Upstream,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub query: String,
    pub sort: SortKey,
    pub source: ResultSource,
    pub total_results: u64,
    pub total_pages: u32,
    pub page_cap: u32,
    pub items: Vec<CatalogItem>,
}

// Handlers

/// Opens a search session
///
/// The body is optional; when present it must be a valid request.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    let request = parse_create_request(&body)?;
    let suggestion_limit = request
        .suggestion_limit
        .unwrap_or(state.settings.suggestion_limit);
    if suggestion_limit == 0 {
        return Err(AppError::InvalidInput(
            "suggestion_limit must be at least 1".to_string(),
        ));
    }

    let session = state.sessions.create(suggestion_limit).await;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id: session.id,
            suggestion_limit: session.suggestions.limit(),
        }),
    ))
}

fn parse_create_request(body: &[u8]) -> AppResult<CreateSessionRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateSessionRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid session request: {}", e)))
}

/// Closes a search session
pub async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.sessions.remove(session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "Search session {} not found",
            session_id
        )))
    }
}

/// Feeds a keystroke to the session's suggestions
///
/// Returns immediately with the state as of this keystroke; the lookup
/// completes in the background.
pub async fn input_change(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<InputRequest>,
) -> AppResult<(StatusCode, Json<SuggestionState>)> {
    let session = state.sessions.get(session_id).await?;
    // Detached: the task applies its result only if still current.
    drop(session.suggestions.on_input_change(&request.query));
    Ok((StatusCode::ACCEPTED, Json(session.suggestions.snapshot())))
}

/// Current suggestions for the session
pub async fn suggestions(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<SuggestionState>> {
    let session = state.sessions.get(session_id).await?;
    Ok(Json(session.suggestions.snapshot()))
}

/// Clears suggestions (click outside or explicit clear)
pub async fn dismiss_suggestions(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<SuggestionState>> {
    let session = state.sessions.get(session_id).await?;
    session.suggestions.dismiss();
    Ok(Json(session.suggestions.snapshot()))
}

/// Aggregates every page for a query and hands it off to the results view
pub async fn view_all(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ViewAllRequest>,
) -> AppResult<Json<ViewAllResponse>> {
    let session = state.sessions.get(session_id).await?;
    let page_cap = request.page_cap.unwrap_or(state.settings.page_cap);

    tracing::info!(
        request_id = %request_id,
        session_id = %session_id,
        query = %request.query.trim(),
        page_cap,
        "Processing view-all request"
    );

    let result = aggregate(state.provider.clone(), &request.query, page_cap).await?;
    let published = publish(&session, &result).await;

    Ok(Json(ViewAllResponse {
        truncated: result.is_truncated(),
        query: result.query,
        total_results: result.total_results,
        total_pages: result.total_pages,
        page_cap: result.page_cap,
        published,
    }))
}

/// Full, sorted results for a query, reusing a published handoff when it matches
pub async fn results(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<ResultsParams>,
) -> AppResult<Json<ResultsResponse>> {
    let sort = params
        .sort
        .as_deref()
        .map(str::parse::<SortKey>)
        .transpose()?
        .unwrap_or_default();
    let session = state.sessions.get(session_id).await?;
    let query = params.q.trim();

    let handoff = session.handoff.consume(query).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, session_id = %session_id, "Handoff lookup failed");
        Handoff::Miss
    });

    let (result, source) = match handoff {
        Handoff::Hit(result) => (result, ResultSource::Handoff),
        Handoff::Miss => {
            let result = aggregate(state.provider.clone(), query, state.settings.page_cap).await?;
            publish(&session, &result).await;
            (result, ResultSource::Upstream)
        }
    };

    tracing::info!(
        request_id = %request_id,
        session_id = %session_id,
        query = %query,
        source = ?source,
        sort = ?sort,
        results = result.total_results,
        "Serving search results"
    );

    let items = sort_by(&result.items, sort);
    let AggregationResult {
        query,
        total_results,
        total_pages,
        page_cap,
        ..
    } = result;

    Ok(Json(ResultsResponse {
        query,
        sort,
        source,
        total_results,
        total_pages,
        page_cap,
        items,
    }))
}

/// Publishes a searchable result; a failed publish only costs a later re-fetch
async fn publish(session: &SearchSession, result: &AggregationResult) -> bool {
    if !is_searchable(&result.query) {
        return false;
    }

    match session.handoff.publish(result).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, session_id = %session.id, "Failed to publish search handoff");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_uses_defaults() {
        assert_eq!(parse_create_request(b"").unwrap().suggestion_limit, None);
        assert_eq!(parse_create_request(b" \n").unwrap().suggestion_limit, None);
    }

    #[test]
    fn test_explicit_limit_parsed() {
        let request = parse_create_request(br#"{"suggestion_limit": 16}"#).unwrap();
        assert_eq!(request.suggestion_limit, Some(16));
    }

    #[test]
    fn test_malformed_body_rejected() {
        assert!(matches!(
            parse_create_request(br#"{"suggestion_limit":"x"}"#),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_create_request(b"{not json"),
            Err(AppError::InvalidInput(_))
        ));
    }
}
