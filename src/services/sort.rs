use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::models::{CatalogItem, SortKey};

/// Returns `items` reordered by `key`, leaving the input untouched
///
/// `Relevance` is the input order itself, so callers must pass the original
/// upstream list (not a previously sorted copy) to get it back. Every other
/// key sorts descending and is stable: equal keys keep their relative order.
pub fn sort_by(items: &[CatalogItem], key: SortKey) -> Vec<CatalogItem> {
    let mut sorted = items.to_vec();

    match key {
        SortKey::Relevance => {}
        SortKey::Popularity => {
            sorted.sort_by(|a, b| descending(a.popularity, b.popularity));
        }
        SortKey::Rating => {
            sorted.sort_by(|a, b| descending(a.vote_average, b.vote_average));
        }
        SortKey::Date => {
            sorted.sort_by(|a, b| release_date(b).cmp(&release_date(a)));
        }
    }

    sorted
}

/// Missing values rank as zero
fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    b.unwrap_or(0.0).total_cmp(&a.unwrap_or(0.0))
}

/// Absent or unparsable dates become `None`, which orders before any date
fn release_date(item: &CatalogItem) -> Option<NaiveDate> {
    item.release_date
        .as_deref()
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
}
