use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::Page,
    routes::AppState,
    services::aggregator::is_searchable,
};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
    page: Option<u32>,
}

/// Handler for single-page catalog search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Page>> {
    let page_number = params.page.unwrap_or(1);
    if page_number == 0 {
        return Err(AppError::InvalidInput(
            "Page numbers start at 1".to_string(),
        ));
    }

    if !is_searchable(&params.q) {
        return Ok(Json(Page::empty()));
    }

    let page = state
        .provider
        .fetch_page(params.q.trim(), page_number)
        .await?;
    Ok(Json(page))
}
