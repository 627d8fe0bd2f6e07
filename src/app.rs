//! Application state and the reducer that drives it.
//!
//! [`App`] is the one state snapshot: the fetched feed, the load state, the
//! search query and source tab, the list cursor and the open entry.  All
//! changes go through [`App::update`], which applies one [`Action`] and
//! returns a [`Command`] when the outside world has to do something (start a
//! fetch).  The visible list is derived from `(feed, query, source_filter)`
//! and recomputed whenever any of them changes.
//!
//! ## For contributors
//!
//! To add a new interaction:
//!
//! 1. Add an [`Action`] variant.
//! 2. Handle it in [`App::update`], keeping the handler free of I/O.
//! 3. Map a key to it in [`crate::input`].

use ratatui::widgets::ListState;
use tracing::{debug, info};

use crate::fetch::{FetchError, FetchMsg};
use crate::filter::{visible_indices, SourceFilter};
use crate::source::Entry;

/// Where the current fetch cycle stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Failed(FetchError),
    Loaded,
}

/// Everything that can happen to the app.
#[derive(Debug)]
pub enum Action {
    /// Start a fetch cycle unconditionally (initial load).
    Load,
    /// User asked to retry or refresh.
    Retry,
    /// A fetch cycle finished.
    Fetched(FetchMsg),

    StartSearch,
    StopSearch,
    SearchInput(char),
    SearchBackspace,
    SearchClear,

    SetFilter(SourceFilter),
    CycleFilter,

    SelectNext,
    SelectPrevious,
    SelectFirst,
    SelectLast,

    /// Open the entry under the cursor.
    Open,
    /// Dismiss the detail sheet.
    Close,
    ScrollDetail(i16),

    Quit,
}

/// Side effects requested by [`App::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Fetch { generation: u64 },
}

pub struct App {
    /// Merged, newest-first feed from the latest applied fetch.
    pub feed: Vec<Entry>,
    pub load: LoadState,
    pub query: String,
    /// Whether keystrokes currently go to the search box.
    pub editing_query: bool,
    pub source_filter: SourceFilter,
    /// Feed indices passing the current query and filter, in feed order.
    visible: Vec<usize>,
    /// Cursor within `visible`.
    pub list_state: ListState,
    /// Feed index of the open entry.
    selected: Option<usize>,
    pub detail_scroll: u16,
    /// Largest useful `detail_scroll` for the open entry at the last drawn size.
    detail_scroll_max: u16,
    /// Latest fetch generation issued; only its result is applied.
    generation: u64,
    pub quit: bool,
    /// Last status message.
    pub status: String,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            feed: Vec::new(),
            load: LoadState::Loading,
            query: String::new(),
            editing_query: false,
            source_filter: SourceFilter::All,
            visible: Vec::new(),
            list_state: ListState::default(),
            selected: None,
            detail_scroll: 0,
            detail_scroll_max: 0,
            generation: 0,
            quit: false,
            status: "Starting…".into(),
        }
    }

    // -- derived views -------------------------------------------------------

    /// Entries passing the current query and filter, in feed order.
    pub fn visible(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.visible.iter().map(|&i| &self.feed[i])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// The open entry, if any.
    pub fn selected(&self) -> Option<&Entry> {
        self.selected.map(|i| &self.feed[i])
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // -- reducer -------------------------------------------------------------

    /// Apply one action.
    pub fn update(&mut self, action: Action) -> Option<Command> {
        match action {
            Action::Load => return Some(self.begin_fetch()),
            Action::Retry => {
                if matches!(self.load, LoadState::Failed(FetchError::NotConfigured)) {
                    return None;
                }
                return Some(self.begin_fetch());
            }
            Action::Fetched(msg) => self.apply_fetch(msg),

            Action::StartSearch => self.editing_query = true,
            Action::StopSearch => self.editing_query = false,
            Action::SearchInput(c) => {
                self.query.push(c);
                self.refilter();
            }
            Action::SearchBackspace => {
                if self.query.pop().is_some() {
                    self.refilter();
                }
            }
            Action::SearchClear => {
                if !self.query.is_empty() {
                    self.query.clear();
                    self.refilter();
                }
            }

            Action::SetFilter(filter) => {
                if filter != self.source_filter {
                    self.source_filter = filter;
                    self.refilter();
                }
            }
            Action::CycleFilter => {
                self.source_filter = self.source_filter.next();
                self.refilter();
            }

            Action::SelectNext => self.select_next(),
            Action::SelectPrevious => self.select_previous(),
            Action::SelectFirst => self.select_first(),
            Action::SelectLast => self.select_last(),

            Action::Open => {
                if let Some(&index) = self.list_state.selected().and_then(|row| self.visible.get(row)) {
                    self.open(index);
                }
            }
            Action::Close => self.close(),
            Action::ScrollDetail(delta) => {
                if self.selected.is_some() {
                    self.detail_scroll = self
                        .detail_scroll
                        .saturating_add_signed(delta)
                        .min(self.detail_scroll_max);
                }
            }

            Action::Quit => self.quit = true,
        }
        None
    }

    /// Issue a new generation and reset to `Loading`.
    ///
    /// The old feed, and any selection pointing into it, is discarded.
    fn begin_fetch(&mut self) -> Command {
        self.generation += 1;
        self.load = LoadState::Loading;
        self.feed.clear();
        self.selected = None;
        self.detail_scroll = 0;
        self.refilter();
        self.status = "Loading…".into();
        Command::Fetch {
            generation: self.generation,
        }
    }

    fn apply_fetch(&mut self, msg: FetchMsg) {
        if msg.generation != self.generation {
            debug!(
                stale = msg.generation,
                current = self.generation,
                "discarding superseded fetch result"
            );
            return;
        }

        match msg.result {
            Ok(feed) => {
                info!(generation = msg.generation, count = feed.len(), "feed loaded");
                self.status = format!("Fetched {} entries", feed.len());
                self.feed = feed;
                self.load = LoadState::Loaded;
            }
            Err(e) => {
                self.status = format!("Error: {e}");
                self.feed.clear();
                self.load = LoadState::Failed(e);
            }
        }
        self.selected = None;
        self.refilter();
    }

    /// Recompute the visible list and keep the cursor on a valid row.
    fn refilter(&mut self) {
        self.visible = visible_indices(&self.feed, &self.query, self.source_filter);

        let cursor = match (self.visible.len(), self.list_state.selected()) {
            (0, _) => None,
            (len, Some(i)) => Some(i.min(len - 1)),
            (_, None) => Some(0),
        };
        self.list_state.select(cursor);
    }

    // -- selection -----------------------------------------------------------

    /// Open the feed entry at `index`, replacing any open entry.
    pub fn open(&mut self, index: usize) {
        if index < self.feed.len() {
            self.selected = Some(index);
            self.detail_scroll = 0;
            // Unknown until the sheet is drawn.
            self.detail_scroll_max = u16::MAX;
        }
    }

    /// Bound detail scrolling so the last line of the open entry stays on
    /// screen.  The renderer calls this once it knows the wrapped height.
    pub fn set_detail_scroll_max(&mut self, max: u16) {
        self.detail_scroll_max = max;
        self.detail_scroll = self.detail_scroll.min(max);
    }

    /// Close the detail sheet.  A no-op when nothing is open.
    pub fn close(&mut self) {
        self.selected = None;
        self.detail_scroll = 0;
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.visible.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.visible.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.visible.is_empty() {
            self.list_state.select(Some(self.visible.len() - 1));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
