//! Upstream catalog abstraction
//!
//! Search aggregation, suggestions and the browse endpoints only ever talk to
//! a `CatalogProvider`, so the concrete REST client can be swapped or faked.

use crate::{
    error::AppResult,
    models::{BrowseList, CatalogItem, MovieDetails, Page},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie catalog providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch one page of search results for `query`
    ///
    /// One outbound call per invocation: no retries, no caching. Fails with
    /// `Config` when no credential is configured and `Upstream` on a
    /// non-success status.
    async fn fetch_page(&self, query: &str, page_number: u32) -> AppResult<Page>;

    /// Fetch one of the curated browse lists
    async fn fetch_list(&self, list: BrowseList) -> AppResult<Vec<CatalogItem>>;

    /// Fetch full details for a single movie
    async fn fetch_movie(&self, movie_id: u64) -> AppResult<MovieDetails>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
