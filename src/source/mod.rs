//! Remote store abstraction layer.
//!
//! This module defines the [`EntryStore`] trait, the [`CollectionQuery`] it
//! answers, and the [`Entry`] type every store's rows are normalised into.
//! The concrete store lives in a sub-module (currently only [`supabase`]).
//!
//! A store handle is only ever constructed once its configuration has been
//! checked (see [`crate::config::Config::store_handle`]); an unconfigured
//! reader simply has no handle, and the fetcher reports that as an ordinary
//! error state.
//!
//! ## For contributors: adding a new store
//!
//! 1. Create a new file in this directory (e.g. `sqlite.rs`).
//! 2. Define a struct holding its connection details and implement
//!    [`EntryStore`] for it.
//! 3. Add `mod sqlite;` below and re-export your struct.
//! 4. Build it in `main.rs` instead of [`SupabaseStore`].
//!
//! Merging, filtering and the UI are store-agnostic.

mod entry;
mod supabase;

pub use entry::{parse_date, Entry, RawEntry, RawId, Source};
pub use supabase::SupabaseStore;

use std::future::Future;

/// Columns requested from both collections.
pub const COLUMNS: &[&str] = &["id", "date", "title", "content", "tags", "image_url"];

/// One bounded read against a single collection.
///
/// Every query has the same shape: only publicly visible rows, newest first,
/// at most `limit` of them.
///
/// ```text
/// select id,date,title,content,tags,image_url from <collection>
///   where is_public = true order by date desc limit <limit>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionQuery {
    pub collection: String,
    pub limit: usize,
}

impl CollectionQuery {
    pub fn public_newest_first(collection: impl Into<String>, limit: usize) -> Self {
        Self {
            collection: collection.into(),
            limit,
        }
    }
}

/// Errors a store can report for a single query.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A configured, queryable remote store.
///
/// The fetcher runs two queries concurrently on a tokio runtime, so
/// implementations must be [`Send`] + [`Sync`] and return `Send` futures.
pub trait EntryStore: Send + Sync {
    /// Human-readable label used in logs.
    fn name(&self) -> &str;

    /// Run one collection query and return its rows in store order.
    fn query(
        &self,
        query: &CollectionQuery,
    ) -> impl Future<Output = Result<Vec<RawEntry>, StoreError>> + Send;
}
