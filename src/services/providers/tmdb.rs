//! The Movie Database (TMDB) provider
//!
//! API Flow:
//! 1. Search: /search/movie?query=..&page=n → one page of results plus page totals
//! 2. Browse: /trending/movie/week, /movie/top_rated, /movie/popular
//! 3. Details: /movie/{id}?append_to_response=credits
//!
//! The credential travels as the `api_key` query parameter.

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        movie::ApiMovieDetails, ApiPagedResponse, BrowseList, CatalogItem, MovieDetails, Page,
    },
    services::providers::CatalogProvider,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

const LIST_CACHE_TTL: u64 = 3600; // 1 hour
const DETAILS_CACHE_TTL: u64 = 3600; // 1 hour

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: Option<String>, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// The configured credential, or a `Config` error before any I/O happens
    fn credential(&self) -> AppResult<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config(
                    "Missing TMDB_API_KEY. Set it in the environment or .env and restart."
                        .to_string(),
                )
            })
    }

    /// Issues a GET against the API and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let api_key = self.credential()?;
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", api_key)])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(path = %path, status = status.as_u16(), "TMDB request failed");
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let response_text = response.text().await?;
        decode(&response_text)
    }
}

/// Decodes an upstream body, mapping malformed JSON to `Parse`
fn decode<T: DeserializeOwned>(body: &str) -> AppResult<T> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(error = %e, "Failed to deserialize TMDB response");
        AppError::Parse(e.to_string())
    })
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn fetch_page(&self, query: &str, page_number: u32) -> AppResult<Page> {
        if page_number == 0 {
            return Err(AppError::InvalidInput(
                "Page numbers start at 1".to_string(),
            ));
        }

        let response: ApiPagedResponse = self
            .get_json(
                "/search/movie",
                &[
                    ("query", query.to_string()),
                    ("page", page_number.to_string()),
                ],
            )
            .await?;
        let page = Page::from(response);

        tracing::debug!(
            query = %query,
            page = page.page_number,
            total_pages = page.total_pages,
            results = page.items.len(),
            provider = "tmdb",
            "Search page fetched"
        );

        Ok(page)
    }

    async fn fetch_list(&self, list: BrowseList) -> AppResult<Vec<CatalogItem>> {
        cached!(
            self.cache,
            CacheKey::BrowseList(list),
            LIST_CACHE_TTL,
            async move {
                let response: ApiPagedResponse = self.get_json(list.path(), &[]).await?;

                tracing::info!(
                    list = %list,
                    results = response.results.len(),
                    provider = "tmdb",
                    "Browse list fetched"
                );

                Ok::<_, AppError>(response.results)
            }
        )
    }

    async fn fetch_movie(&self, movie_id: u64) -> AppResult<MovieDetails> {
        cached!(
            self.cache,
            CacheKey::MovieDetails(movie_id),
            DETAILS_CACHE_TTL,
            async move {
                let details: ApiMovieDetails = self
                    .get_json(
                        &format!("/movie/{}", movie_id),
                        &[("append_to_response", "credits".to_string())],
                    )
                    .await
                    .map_err(|e| match e {
                        AppError::Upstream { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
                            AppError::NotFound(format!("Movie {} not found", movie_id))
                        }
                        other => other,
                    })?;

                tracing::info!(movie_id, provider = "tmdb", "Movie details fetched");

                Ok::<_, AppError>(MovieDetails::from(details))
            }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
