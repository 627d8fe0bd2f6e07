//! Fetching the two collections.
//!
//! [`fetch_all`] is the whole fetch cycle: both collection queries run
//! concurrently, each result set is tagged with its [`Source`], and only when
//! both have succeeded are they merged into one feed.  If either fails, or
//! the pair does not finish before the deadline, the cycle fails as a whole;
//! a feed holding only one collection is never produced.
//!
//! [`Fetcher`] runs cycles on a tokio runtime and reports each result to the
//! UI thread over an [`mpsc`] channel, stamped with the generation the app
//! issued for it.  The app discards results from superseded generations.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::merge::merge;
use crate::source::{CollectionQuery, Entry, EntryStore, Source};

/// Why a fetch cycle produced no feed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// No store handle: endpoint or key missing.
    #[error("store not configured")]
    NotConfigured,

    /// One of the two collection queries failed.
    #[error("{collection}: {message}")]
    Query { collection: String, message: String },

    #[error("timed out after {}s", .after.as_secs())]
    TimedOut { after: Duration },
}

impl FetchError {
    /// Whether retrying without changing configuration can help.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::NotConfigured)
    }
}

/// Outcome of one fetch cycle.
pub type FetchResult = Result<Vec<Entry>, FetchError>;

/// What to fetch and how long to wait for it.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    pub summaries: String,
    pub novels: String,
    pub limit: usize,
    pub timeout: Duration,
}

/// Run one full fetch cycle.
///
/// With no store, returns [`FetchError::NotConfigured`] without touching
/// the network.
pub async fn fetch_all<S: EntryStore>(store: Option<&S>, plan: &FetchPlan) -> FetchResult {
    let Some(store) = store else {
        return Err(FetchError::NotConfigured);
    };

    let both = async {
        tokio::try_join!(
            fetch_collection(store, &plan.summaries, plan.limit, Source::Summary),
            fetch_collection(store, &plan.novels, plan.limit, Source::Novel),
        )
    };

    let (summaries, novels) = tokio::time::timeout(plan.timeout, both)
        .await
        .map_err(|_| FetchError::TimedOut { after: plan.timeout })??;

    Ok(merge(summaries, novels))
}

/// Query one collection and tag every row with `source`.
async fn fetch_collection<S: EntryStore>(
    store: &S,
    collection: &str,
    limit: usize,
    source: Source,
) -> Result<Vec<Entry>, FetchError> {
    let query = CollectionQuery::public_newest_first(collection, limit);
    let rows = store.query(&query).await.map_err(|e| FetchError::Query {
        collection: collection.to_string(),
        message: e.to_string(),
    })?;

    let mut entries: Vec<Entry> = rows.into_iter().map(|row| row.into_entry(source)).collect();
    // The store orders by its own date type and puts NULLs first on `desc`;
    // re-establish our order so the merge sees sorted input.
    entries.sort_by(Entry::cmp_newest_first);

    info!(collection, count = entries.len(), "collection fetched");
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Background dispatch
// ---------------------------------------------------------------------------

/// A finished fetch cycle, sent from the runtime to the UI thread.
#[derive(Debug)]
pub struct FetchMsg {
    pub generation: u64,
    pub result: FetchResult,
}

/// Runs fetch cycles in the background.
pub struct Fetcher<S> {
    store: Option<Arc<S>>,
    plan: Arc<FetchPlan>,
    runtime: Handle,
    tx: mpsc::Sender<FetchMsg>,
}

impl<S: EntryStore + 'static> Fetcher<S> {
    /// Returns the fetcher and the receiver the main loop drains every tick.
    pub fn new(store: Option<S>, plan: FetchPlan, runtime: Handle) -> (Self, mpsc::Receiver<FetchMsg>) {
        let (tx, rx) = mpsc::channel();
        let fetcher = Self {
            store: store.map(Arc::new),
            plan: Arc::new(plan),
            runtime,
            tx,
        };
        (fetcher, rx)
    }

    /// Start a fetch cycle for `generation`.  Never blocks.
    pub fn spawn(&self, generation: u64) {
        let store = self.store.clone();
        let plan = Arc::clone(&self.plan);
        let tx = self.tx.clone();

        info!(generation, "fetch started");
        self.runtime.spawn(async move {
            let result = fetch_all(store.as_deref(), &plan).await;
            match &result {
                Ok(feed) => info!(generation, count = feed.len(), "fetch finished"),
                Err(e) => warn!(generation, error = %e, "fetch failed"),
            }
            // A closed channel means the UI has exited.
            let _ = tx.send(FetchMsg { generation, result });
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RawEntry, RawId, StoreError};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory store: each collection either returns rows or fails.
    #[derive(Default)]
    struct MemoryStore {
        tables: HashMap<String, Result<Vec<RawEntry>, String>>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl MemoryStore {
        fn with_rows(mut self, collection: &str, rows: Vec<RawEntry>) -> Self {
            self.tables.insert(collection.to_string(), Ok(rows));
            self
        }

        fn with_failure(mut self, collection: &str, message: &str) -> Self {
            self.tables.insert(collection.to_string(), Err(message.to_string()));
            self
        }
    }

    impl EntryStore for MemoryStore {
        fn name(&self) -> &str {
            "memory"
        }

        async fn query(&self, query: &CollectionQuery) -> Result<Vec<RawEntry>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.tables.get(&query.collection) {
                Some(Ok(rows)) => Ok(rows.iter().take(query.limit).cloned().collect()),
                Some(Err(message)) => Err(StoreError::Status {
                    status: 500,
                    message: message.clone(),
                }),
                None => Err(StoreError::Status {
                    status: 404,
                    message: format!("no such collection {}", query.collection),
                }),
            }
        }
    }

    fn row(id: &str, date: Option<&str>) -> RawEntry {
        RawEntry {
            id: RawId::Text(id.to_string()),
            date: date.map(String::from),
            title: Some(id.to_string()),
            ..RawEntry::default()
        }
    }

    fn plan() -> FetchPlan {
        FetchPlan {
            summaries: "daily_entries".into(),
            novels: "novels".into(),
            limit: 60,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn absent_store_is_not_configured() {
        let result = fetch_all::<MemoryStore>(None, &plan()).await;
        assert_eq!(result, Err(FetchError::NotConfigured));
        assert!(!FetchError::NotConfigured.is_retryable());
    }

    #[tokio::test]
    async fn merges_and_tags_both_collections() {
        let store = MemoryStore::default()
            .with_rows(
                "daily_entries",
                vec![row("s2", Some("2024-01-02")), row("s1", Some("2024-01-01"))],
            )
            .with_rows("novels", vec![row("n3", Some("2024-01-03"))]);

        let feed = fetch_all(Some(&store), &plan()).await.unwrap();

        let got: Vec<(&str, Source)> = feed.iter().map(|e| (e.id.as_str(), e.source)).collect();
        assert_eq!(
            got,
            vec![("n3", Source::Novel), ("s2", Source::Summary), ("s1", Source::Summary)]
        );
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failing_second_query_fails_the_cycle() {
        let store = MemoryStore::default()
            .with_rows("daily_entries", vec![row("s1", Some("2024-01-01"))])
            .with_failure("novels", "permission denied for table novels");

        let err = fetch_all(Some(&store), &plan()).await.unwrap_err();

        assert_eq!(
            err,
            FetchError::Query {
                collection: "novels".into(),
                message: "HTTP 500: permission denied for table novels".into(),
            }
        );
        assert!(err.is_retryable());
        assert!(err.to_string().contains("permission denied"));
    }

    #[tokio::test]
    async fn failing_first_query_fails_the_cycle() {
        let store = MemoryStore::default()
            .with_failure("daily_entries", "boom")
            .with_rows("novels", vec![row("n1", Some("2024-01-01"))]);

        let err = fetch_all(Some(&store), &plan()).await.unwrap_err();
        assert!(matches!(err, FetchError::Query { ref collection, .. } if collection == "daily_entries"));
    }

    #[tokio::test]
    async fn hung_store_times_out() {
        let store = MemoryStore {
            delay: Some(Duration::from_secs(30)),
            ..MemoryStore::default()
        }
        .with_rows("daily_entries", Vec::new())
        .with_rows("novels", Vec::new());
        let plan = FetchPlan {
            timeout: Duration::from_millis(20),
            ..plan()
        };

        let err = fetch_all(Some(&store), &plan).await.unwrap_err();
        assert_eq!(err, FetchError::TimedOut { after: Duration::from_millis(20) });
    }

    #[tokio::test]
    async fn unsorted_store_output_is_reordered() {
        let store = MemoryStore::default()
            .with_rows(
                "daily_entries",
                vec![row("undated", None), row("s1", Some("2024-01-01")), row("s5", Some("2024-01-05"))],
            )
            .with_rows("novels", Vec::new());

        let feed = fetch_all(Some(&store), &plan()).await.unwrap();
        let ids: Vec<&str> = feed.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["s5", "s1", "undated"]);
    }

    #[tokio::test]
    async fn respects_limit() {
        let rows = (1..=9)
            .map(|d| row(&format!("s{d}"), Some(format!("2024-01-0{d}").as_str())))
            .collect();
        let store = MemoryStore::default()
            .with_rows("daily_entries", rows)
            .with_rows("novels", Vec::new());
        let plan = FetchPlan { limit: 3, ..plan() };

        let feed = fetch_all(Some(&store), &plan).await.unwrap();
        assert_eq!(feed.len(), 3);
    }

    #[test]
    fn fetcher_reports_generation() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let store = MemoryStore::default()
            .with_rows("daily_entries", vec![row("s1", Some("2024-01-01"))])
            .with_rows("novels", Vec::new());

        let (fetcher, rx) = Fetcher::new(Some(store), plan(), runtime.handle().clone());
        fetcher.spawn(7);

        let msg = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(msg.generation, 7);
        assert_eq!(msg.result.unwrap().len(), 1);
    }

    #[test]
    fn unconfigured_fetcher_reports_error() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (fetcher, rx) = Fetcher::<MemoryStore>::new(None, plan(), runtime.handle().clone());
        fetcher.spawn(1);

        let msg = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(msg.result, Err(FetchError::NotConfigured));
    }
}
