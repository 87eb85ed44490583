use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    db::KeyValueStore,
    error::{AppError, AppResult},
    models::{AggregationResult, CatalogItem},
};

const QUERY_KEY: &str = "searchQuery";
const RESULTS_KEY: &str = "searchResults";
const TOTAL_KEY: &str = "totalResults";
const PAGES_KEY: &str = "searchPages";

#[derive(Debug, Serialize, Deserialize)]
struct PageInfo {
    total_pages: u32,
    page_cap: u32,
}

/// Outcome of looking up a published aggregation
#[derive(Debug, Clone, PartialEq)]
pub enum Handoff {
    Hit(AggregationResult),
    /// Nothing usable was published for this query; aggregate again
    Miss,
}

/// Short-lived handoff of a finished aggregation to the results view
///
/// Entries live in a session-scoped namespace of a [`KeyValueStore`]. Keys are
/// compared by exact string equality after trimming: no case folding or
/// whitespace collapsing.
#[derive(Clone)]
pub struct ResultHandoff {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    ttl: u64,
}

impl ResultHandoff {
    pub fn new(store: Arc<dyn KeyValueStore>, session: impl std::fmt::Display, ttl: u64) -> Self {
        Self {
            store,
            namespace: format!("handoff:{}", session),
            ttl,
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}:{}", self.namespace, name)
    }

    fn keys(&self) -> Vec<String> {
        [QUERY_KEY, RESULTS_KEY, TOTAL_KEY, PAGES_KEY]
            .iter()
            .map(|name| self.key(name))
            .collect()
    }

    /// Stores `result` under its own query, replacing any previous entry
    pub async fn publish(&self, result: &AggregationResult) -> AppResult<()> {
        let items = serde_json::to_string(&result.items)
            .map_err(|e| AppError::Internal(format!("Handoff serialization error: {}", e)))?;
        let pages = serde_json::to_string(&PageInfo {
            total_pages: result.total_pages,
            page_cap: result.page_cap,
        })
        .map_err(|e| AppError::Internal(format!("Handoff serialization error: {}", e)))?;

        let entries = vec![
            (self.key(QUERY_KEY), result.query.trim().to_string()),
            (self.key(RESULTS_KEY), items),
            (self.key(TOTAL_KEY), result.total_results.to_string()),
            (self.key(PAGES_KEY), pages),
        ];
        self.store.set_many(entries, self.ttl).await?;

        tracing::debug!(
            namespace = %self.namespace,
            query = %result.query,
            results = result.total_results,
            store = self.store.name(),
            "Published search handoff"
        );

        Ok(())
    }

    /// Looks up the published aggregation for `query`
    ///
    /// Non-destructive: the entry stays until it expires or is replaced.
    pub async fn consume(&self, query: &str) -> AppResult<Handoff> {
        let query = query.trim();
        let values = self.store.get_many(&self.keys()).await?;

        let [stored_query, items, total, pages]: [Option<String>; 4] = match values.try_into() {
            Ok(values) => values,
            Err(_) => return Ok(Handoff::Miss),
        };

        if stored_query.as_deref() != Some(query) {
            tracing::debug!(namespace = %self.namespace, query = %query, "Search handoff miss");
            return Ok(Handoff::Miss);
        }

        match decode_entry(query, items, total, pages) {
            Some(result) => {
                tracing::debug!(
                    namespace = %self.namespace,
                    query = %query,
                    results = result.total_results,
                    "Search handoff hit"
                );
                Ok(Handoff::Hit(result))
            }
            None => {
                tracing::warn!(
                    namespace = %self.namespace,
                    query = %query,
                    "Discarding incomplete search handoff"
                );
                Ok(Handoff::Miss)
            }
        }
    }
}

fn decode_entry(
    query: &str,
    items: Option<String>,
    total: Option<String>,
    pages: Option<String>,
) -> Option<AggregationResult> {
    let items: Vec<CatalogItem> = serde_json::from_str(&items?).ok()?;
    let total_results: u64 = total?.parse().ok()?;
    let pages: PageInfo = serde_json::from_str(&pages?).ok()?;

    if total_results != items.len() as u64 {
        return None;
    }

    Some(AggregationResult {
        query: query.to_string(),
        items,
        total_results,
        total_pages: pages.total_pages,
        page_cap: pages.page_cap,
    })
}
