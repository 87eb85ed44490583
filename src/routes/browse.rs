use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{BrowseList, CatalogItem, MovieDetails},
    routes::AppState,
};

#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    pub trending: Vec<CatalogItem>,
    pub top_rated: Vec<CatalogItem>,
    pub popular: Vec<CatalogItem>,
}

/// All browse lists, fetched concurrently
pub async fn browse_all(State(state): State<Arc<AppState>>) -> AppResult<Json<BrowseResponse>> {
    let (trending, top_rated, popular) = tokio::try_join!(
        state.provider.fetch_list(BrowseList::Trending),
        state.provider.fetch_list(BrowseList::TopRated),
        state.provider.fetch_list(BrowseList::Popular),
    )?;

    Ok(Json(BrowseResponse {
        trending,
        top_rated,
        popular,
    }))
}

/// A single browse list
pub async fn browse_list(
    State(state): State<Arc<AppState>>,
    Path(list): Path<BrowseList>,
) -> AppResult<Json<Vec<CatalogItem>>> {
    let items = state.provider.fetch_list(list).await?;
    Ok(Json(items))
}

/// Details for one movie, e.g. after a suggestion is picked
pub async fn movie_details(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<u64>,
) -> AppResult<Json<MovieDetails>> {
    let details = state.provider.fetch_movie(movie_id).await?;
    Ok(Json(details))
}
