//! Movie catalog search service.
//!
//! Turns free-text queries into complete, sortable result sets from a
//! paginated upstream catalog, drives type-ahead suggestions with
//! latest-request-wins semantics, and hands finished searches to a results
//! view through a session-scoped store.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
