//! Command-line and environment configuration.
//!
//! The store endpoint and key normally come from the environment
//! (`SUPABASE_URL`, `SUPABASE_ANON_KEY`).  Both are optional: without them the
//! reader still starts and shows a "store not configured" banner.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::warn;

use crate::fetch::FetchPlan;
use crate::source::SupabaseStore;

#[derive(Debug, Clone, Parser)]
#[command(name = "diary-reader", version, about)]
pub struct Config {
    /// Store endpoint, e.g. https://xyz.supabase.co
    #[arg(long, env = "SUPABASE_URL")]
    pub url: Option<String>,

    /// Public (anon) API key for the store.
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub anon_key: Option<String>,

    /// Collection holding the daily summaries.
    #[arg(long, default_value = "daily_entries")]
    pub summaries_table: String,

    /// Collection holding the novels.
    #[arg(long, default_value = "novels")]
    pub novels_table: String,

    /// Maximum number of entries fetched from each collection.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u16).range(1..=1000))]
    pub limit: u16,

    /// Give up on a fetch after this many seconds.
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Directory for log files.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Mirror logs to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// The store handle, or `None` if endpoint or key is missing.
    ///
    /// Never fails: an unusable configuration is logged and reported as
    /// absent, and the fetcher turns that into an error state.
    pub fn store_handle(&self) -> Option<SupabaseStore> {
        let url = non_blank(self.url.as_deref())?;
        let key = non_blank(self.anon_key.as_deref())?;

        match SupabaseStore::new(url, key) {
            Ok(store) => Some(store),
            Err(e) => {
                warn!(error = %e, "could not build HTTP client; treating store as unconfigured");
                None
            }
        }
    }

    pub fn fetch_plan(&self) -> FetchPlan {
        FetchPlan {
            summaries: self.summaries_table.clone(),
            novels: self.novels_table.clone(),
            limit: usize::from(self.limit),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// `--log-dir`, or `<local data dir>/diary-reader/logs`.
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("diary-reader")
                .join("logs")
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
