//! Type-ahead suggestions for a single search input.
//!
//! Every keystroke bumps a monotonic request epoch. A response is applied
//! only if its epoch is still the current one when it arrives, so a slow
//! response to an older keystroke can never overwrite a newer one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::{
    models::CatalogItem,
    services::{aggregator::is_searchable, providers::CatalogProvider},
};

/// Display cap for compact suggestion dropdowns
pub const DEFAULT_SUGGESTION_LIMIT: usize = 8;

/// Where the suggestion lifecycle currently stands
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionPhase {
    Idle,
    Pending,
    Applied,
}

/// Visible suggestion state for one input
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SuggestionState {
    pub query: String,
    pub items: Vec<CatalogItem>,
    pub is_pending: bool,
    pub request_epoch: u64,
    pub phase: SuggestionPhase,
}

impl Default for SuggestionState {
    fn default() -> Self {
        Self {
            query: String::new(),
            items: Vec::new(),
            is_pending: false,
            request_epoch: 0,
            phase: SuggestionPhase::Idle,
        }
    }
}

impl SuggestionState {
    fn reset(&mut self) {
        self.items.clear();
        self.is_pending = false;
        self.phase = SuggestionPhase::Idle;
    }
}

/// What to do with a response issued at some epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Apply,
    Discard,
}

/// Latest-request-wins: only the most recently issued request may apply
pub fn resolve(issued_epoch: u64, current_epoch: u64) -> Resolution {
    if issued_epoch == current_epoch {
        Resolution::Apply
    } else {
        Resolution::Discard
    }
}

/// Drives suggestions for one search input
pub struct SuggestionController {
    provider: Arc<dyn CatalogProvider>,
    limit: usize,
    state: Arc<Mutex<SuggestionState>>,
}

impl SuggestionController {
    pub fn new(provider: Arc<dyn CatalogProvider>, limit: usize) -> Self {
        Self {
            provider,
            limit: limit.max(1),
            state: Arc::new(Mutex::new(SuggestionState::default())),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Copy of the current visible state
    pub fn snapshot(&self) -> SuggestionState {
        lock(&self.state).clone()
    }

    /// Handles a keystroke without blocking the caller
    ///
    /// Short queries clear suggestions synchronously and return `None`.
    /// Otherwise the upstream lookup runs on a spawned task whose handle is
    /// returned; awaiting it is optional. Must be called inside a Tokio runtime.
    pub fn on_input_change(&self, query: &str) -> Option<JoinHandle<()>> {
        let query = query.trim().to_string();

        let my_epoch = {
            let mut state = lock(&self.state);
            state.request_epoch += 1;
            state.query = query.clone();

            if !is_searchable(&query) {
                state.reset();
                return None;
            }

            state.is_pending = true;
            state.phase = SuggestionPhase::Pending;
            state.request_epoch
        };

        let provider = self.provider.clone();
        let state = self.state.clone();
        let limit = self.limit;

        Some(tokio::spawn(async move {
            let result = provider.fetch_page(&query, 1).await;

            let mut state = lock(&state);
            if resolve(my_epoch, state.request_epoch) == Resolution::Discard {
                tracing::debug!(
                    query = %query,
                    epoch = my_epoch,
                    current = state.request_epoch,
                    "Discarding stale suggestions"
                );
                return;
            }

            match result {
                Ok(page) => {
                    state.items = page.items.into_iter().take(limit).collect();
                    state.is_pending = false;
                    state.phase = SuggestionPhase::Applied;
                }
                Err(e) => {
                    tracing::warn!(error = %e, query = %query, "Suggestion lookup failed");
                    state.reset();
                }
            }
        }))
    }

    /// Forces the input back to idle (click outside, explicit clear)
    ///
    /// Advances the epoch so responses still in flight are discarded.
    pub fn dismiss(&self) {
        let mut state = lock(&self.state);
        state.request_epoch += 1;
        state.query.clear();
        state.reset();
    }
}

fn lock(state: &Mutex<SuggestionState>) -> MutexGuard<'_, SuggestionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
