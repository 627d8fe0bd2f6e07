//! Supabase (PostgREST) store implementation.
//!
//! Each [`CollectionQuery`] becomes one `GET {base}/rest/v1/{collection}`
//! request authenticated with the project's public (anon) key:
//!
//! ```text
//! GET /rest/v1/novels?select=id,date,title,content,tags,image_url
//!                    &is_public=eq.true&order=date.desc&limit=60
//! apikey: <key>
//! Authorization: Bearer <key>
//! ```
//!
//! Row-level security on the server decides what the anon key can read; the
//! `is_public` filter keeps drafts out even when it is permissive.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{CollectionQuery, EntryStore, RawEntry, StoreError, COLUMNS};

/// A Supabase project reachable over its REST endpoint.
pub struct SupabaseStore {
    base_url: String,
    api_key: String,
    client: Client,
}

impl SupabaseStore {
    /// Build a store for `base_url` (e.g. `https://xyz.supabase.co`).
    ///
    /// Fails only if the HTTP client itself cannot be constructed (TLS
    /// backend initialisation).
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// REST endpoint for a collection.
    pub fn collection_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    /// PostgREST query-string parameters for `query`.
    pub fn query_params(query: &CollectionQuery) -> Vec<(&'static str, String)> {
        vec![
            ("select", COLUMNS.join(",")),
            ("is_public", "eq.true".to_string()),
            ("order", "date.desc".to_string()),
            ("limit", query.limit.to_string()),
        ]
    }

    /// Decode a successful response body.
    ///
    /// Pure, so tests can exercise decoding without the network.
    pub fn parse_rows(body: &[u8]) -> Result<Vec<RawEntry>, StoreError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Pull a readable message out of an error body.
    ///
    /// PostgREST answers errors with `{"message": ..., "code": ...}`; anything
    /// else is passed through verbatim.
    pub fn error_message(body: &str) -> String {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: String,
        }

        match serde_json::from_str::<ErrorBody>(body) {
            Ok(err) => err.message,
            Err(_) if body.trim().is_empty() => "empty response".to_string(),
            Err(_) => body.trim().to_string(),
        }
    }
}

impl EntryStore for SupabaseStore {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn query(&self, query: &CollectionQuery) -> Result<Vec<RawEntry>, StoreError> {
        let url = self.collection_url(&query.collection);
        debug!(%url, limit = query.limit, "querying collection");

        let response = self
            .client
            .get(&url)
            .query(&Self::query_params(query))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: Self::error_message(&String::from_utf8_lossy(&body)),
            });
        }

        Self::parse_rows(&body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
