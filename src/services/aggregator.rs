use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::AggregationResult,
    services::{fanout::gather, providers::CatalogProvider},
};

/// Default maximum number of upstream pages fetched by one aggregation
pub const DEFAULT_PAGE_CAP: u32 = 20;

/// Queries shorter than this (after trimming) never reach the upstream
pub const MIN_QUERY_LEN: usize = 2;

/// True when a trimmed query is long enough to trigger network activity
pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_LEN
}

/// Assembles the complete result set for `query`, bounded by `page_cap`
///
/// Page 1 is fetched first to learn the page count; pages `2..=min(total, cap)`
/// are then fetched concurrently and concatenated in ascending page order.
/// Any page failure fails the whole aggregation; no partial result is returned.
pub async fn aggregate(
    provider: Arc<dyn CatalogProvider>,
    query: &str,
    page_cap: u32,
) -> AppResult<AggregationResult> {
    if page_cap == 0 {
        return Err(AppError::InvalidInput(
            "Page cap must be at least 1".to_string(),
        ));
    }

    let query = query.trim();
    if !is_searchable(query) {
        return Ok(AggregationResult::empty(query, page_cap));
    }

    let first_page = provider.fetch_page(query, 1).await?;
    let total_pages = first_page.total_pages;
    let effective_pages = total_pages.min(page_cap);

    tracing::info!(
        query = %query,
        total_pages,
        effective_pages,
        provider = provider.name(),
        "Aggregating search results"
    );

    let remaining = (2..=effective_pages)
        .map(|page_number| {
            let provider = provider.clone();
            let query = query.to_string();
            async move { provider.fetch_page(&query, page_number).await }
        })
        .collect::<Vec<_>>();

    let remaining = gather(remaining).await.map_err(|e| {
        tracing::warn!(error = %e, query = %query, "Aggregation failed");
        e
    })?;

    let mut items = first_page.items;
    for page in remaining {
        items.extend(page.items);
    }

    tracing::info!(
        query = %query,
        results = items.len(),
        truncated = total_pages > page_cap,
        "Aggregation completed"
    );

    Ok(AggregationResult {
        query: query.to_string(),
        total_results: items.len() as u64,
        items,
        total_pages,
        page_cap,
    })
}
