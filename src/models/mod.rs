use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

pub mod movie;

pub use movie::{CastMember, Genre, MovieDetails};

/// A movie as returned by the upstream catalog
///
/// Treated as an opaque value: the service filters, sorts and concatenates
/// these but never edits them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    /// `YYYY-MM-DD`; the upstream sends an empty string for unknown dates
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
}

/// One page of upstream search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub items: Vec<CatalogItem>,
    pub page_number: u32,
    pub total_pages: u32,
    pub total_results: u64,
}

impl Page {
    /// A page with no items, used when the query is too short to search
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            page_number: 1,
            total_pages: 1,
            total_results: 0,
        }
    }
}

/// Terminal output of a full "view all" aggregation
///
/// `total_results` always equals `items.len()`: when the upstream has more
/// pages than `page_cap`, it counts only what was fetched, while
/// `total_pages` keeps the upstream's own page count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregationResult {
    pub query: String,
    pub items: Vec<CatalogItem>,
    pub total_results: u64,
    pub total_pages: u32,
    pub page_cap: u32,
}

impl AggregationResult {
    pub fn empty(query: &str, page_cap: u32) -> Self {
        Self {
            query: query.to_string(),
            items: Vec::new(),
            total_results: 0,
            total_pages: 0,
            page_cap,
        }
    }

    /// Whether the upstream had pages beyond the cap that were not fetched
    pub fn is_truncated(&self) -> bool {
        self.total_pages > self.page_cap
    }
}

/// Ordering applied to an already-fetched result list
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Upstream order, unchanged
    #[default]
    Relevance,
    Popularity,
    Rating,
    Date,
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relevance" => Ok(SortKey::Relevance),
            "popularity" => Ok(SortKey::Popularity),
            "rating" => Ok(SortKey::Rating),
            "date" => Ok(SortKey::Date),
            other => Err(AppError::InvalidInput(format!("Unknown sort key: {}", other))),
        }
    }
}

/// Curated upstream lists shown on the browse page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BrowseList {
    Trending,
    TopRated,
    Popular,
}

impl BrowseList {
    /// Upstream path for this list, relative to the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            BrowseList::Trending => "/trending/movie/week",
            BrowseList::TopRated => "/movie/top_rated",
            BrowseList::Popular => "/movie/popular",
        }
    }
}

impl Display for BrowseList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrowseList::Trending => write!(f, "trending"),
            BrowseList::TopRated => write!(f, "top_rated"),
            BrowseList::Popular => write!(f, "popular"),
        }
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Raw paginated response from `/search/movie` and the list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPagedResponse {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<CatalogItem>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

fn first_page() -> u32 {
    1
}

impl From<ApiPagedResponse> for Page {
    fn from(response: ApiPagedResponse) -> Self {
        // An empty result set reports zero pages; a page always counts itself.
        let page_number = response.page.max(1);
        Page {
            items: response.results,
            page_number,
            total_pages: response.total_pages.max(page_number),
            total_results: response.total_results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_item_deserialization() {
        let json = r#"{
            "adult": false,
            "id": 438631,
            "title": "Dune",
            "poster_path": "/d5NXSklXo0qyIYkgV94XAgMIckC.jpg",
            "release_date": "2021-09-15",
            "vote_average": 7.8,
            "popularity": 143.2,
            "overview": "Paul Atreides, a brilliant and gifted young man"
        }"#;

        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 438631);
        assert_eq!(item.title, "Dune");
        assert_eq!(item.release_date, Some("2021-09-15".to_string()));
        assert_eq!(item.vote_average, Some(7.8));
        assert_eq!(item.popularity, Some(143.2));
    }

    #[test]
    fn test_catalog_item_missing_optional_fields() {
        let item: CatalogItem = serde_json::from_str(r#"{"id": 7, "poster_path": null}"#).unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.title, "");
        assert_eq!(item.poster_path, None);
        assert_eq!(item.release_date, None);
        assert_eq!(item.popularity, None);
    }

    #[test]
    fn test_api_response_to_page() {
        let json = r#"{
            "page": 2,
            "results": [{"id": 1, "title": "A"}, {"id": 2, "title": "B"}],
            "total_pages": 3,
            "total_results": 55
        }"#;

        let page: Page = serde_json::from_str::<ApiPagedResponse>(json).unwrap().into();
        assert_eq!(page.page_number, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_results, 55);
        assert_eq!(page.items.len(), 2);
    }

    #[test]
    fn test_empty_result_page_counts_itself() {
        let json = r#"{"page": 1, "results": [], "total_pages": 0, "total_results": 0}"#;
        let page: Page = serde_json::from_str::<ApiPagedResponse>(json).unwrap().into();
        assert_eq!(page.page_number, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("relevance".parse::<SortKey>().unwrap(), SortKey::Relevance);
        assert_eq!("Popularity".parse::<SortKey>().unwrap(), SortKey::Popularity);
        assert_eq!(" rating ".parse::<SortKey>().unwrap(), SortKey::Rating);
        assert_eq!("date".parse::<SortKey>().unwrap(), SortKey::Date);
        assert!("alphabetical".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_browse_list_paths() {
        assert_eq!(BrowseList::Trending.path(), "/trending/movie/week");
        assert_eq!(BrowseList::TopRated.path(), "/movie/top_rated");
        assert_eq!(BrowseList::Popular.path(), "/movie/popular");
        assert_eq!(format!("{}", BrowseList::TopRated), "top_rated");
    }

    #[test]
    fn test_aggregation_truncation_flag() {
        let mut result = AggregationResult::empty("dune", 2);
        result.total_pages = 3;
        assert!(result.is_truncated());
        result.total_pages = 2;
        assert!(!result.is_truncated());
    }
}
