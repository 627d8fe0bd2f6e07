//! Client-side search and source filtering over the merged feed.
//!
//! Everything here is pure and synchronous.  The app re-runs it after every
//! keystroke in the search box or toggle of the source tabs; nothing in this
//! module ever triggers a fetch, and results keep the feed's order.

use crate::source::{Entry, Source};

/// The three-way source toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceFilter {
    #[default]
    All,
    Summary,
    Novel,
}

impl SourceFilter {
    /// Tab order.
    pub const TABS: [SourceFilter; 3] = [SourceFilter::All, SourceFilter::Summary, SourceFilter::Novel];

    pub fn label(self) -> &'static str {
        match self {
            SourceFilter::All => "All",
            SourceFilter::Summary => "Summaries",
            SourceFilter::Novel => "Novels",
        }
    }

    /// Position in [`Self::TABS`].
    pub fn index(self) -> usize {
        match self {
            SourceFilter::All => 0,
            SourceFilter::Summary => 1,
            SourceFilter::Novel => 2,
        }
    }

    /// The next tab, wrapping around.
    pub fn next(self) -> Self {
        Self::TABS[(self.index() + 1) % Self::TABS.len()]
    }

    pub fn accepts(self, source: Source) -> bool {
        match self {
            SourceFilter::All => true,
            SourceFilter::Summary => source == Source::Summary,
            SourceFilter::Novel => source == Source::Novel,
        }
    }
}

/// A lower-cased search needle, built once per filter pass.
struct Needle(String);

impl Needle {
    fn new(query: &str) -> Self {
        Self(query.to_lowercase())
    }

    fn matches(&self, entry: &Entry) -> bool {
        let needle = self.0.as_str();
        needle.is_empty()
            || entry.title.to_lowercase().contains(needle)
            || entry.content.to_lowercase().contains(needle)
            || entry.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
    }
}

/// Entries of `feed` matching `query` and `source`, in feed order.
pub fn filter<'a>(feed: &'a [Entry], query: &str, source: SourceFilter) -> Vec<&'a Entry> {
    visible_indices(feed, query, source)
        .into_iter()
        .map(|i| &feed[i])
        .collect()
}

/// Positions in `feed` of the entries [`filter`] keeps.
///
/// The app keeps these so that both the list cursor and the open entry
/// refer back into the one feed it owns.
pub fn visible_indices(feed: &[Entry], query: &str, source: SourceFilter) -> Vec<usize> {
    let needle = Needle::new(query);
    feed.iter()
        .enumerate()
        .filter(|(_, entry)| source.accepts(entry.source) && needle.matches(entry))
        .map(|(i, _)| i)
        .collect()
}
