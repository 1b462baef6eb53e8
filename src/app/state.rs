// AuditSleuth - app/state.rs
//
// Application state management. Holds the loaded audit records, the
// filtered/sorted view, filter state, pagination, and selection.
// Owned by whatever drives the session (the CLI today).
//
// Invariant maintained here, per the view contract: ANY filter-state
// change recomputes the view and resets the page to 1, so a narrowed
// result set can never leave the user stranded on a page that no longer
// exists.

use crate::app::debounce::Debouncer;
use crate::core::classify;
use crate::core::filter::{self, FilterState};
use crate::core::model::{Action, Category, LoadSummary, LogRecord, RawLogRecord};
use crate::core::page::{paginate, Page};
use crate::core::taxonomy::Taxonomy;
use crate::util::error::FilterError;
use std::time::Instant;

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// The active classification taxonomy.
    pub taxonomy: Taxonomy,

    /// All derived records from the current load, in input order.
    pub records: Vec<LogRecord>,

    /// Indices of records matching the current filter, newest first
    /// (into `records`).
    pub filtered: Vec<usize>,

    /// Current filter configuration (ephemeral, never persisted).
    pub filter: FilterState,

    /// Current 1-indexed page of the filtered view.
    pub page: usize,

    /// Events per page.
    pub page_size: usize,

    /// Index of the currently selected entry in `filtered`.
    pub selected: Option<usize>,

    /// Summary of the most recent load.
    pub summary: Option<LoadSummary>,

    /// Non-fatal warnings accumulated during the current session.
    pub warnings: Vec<String>,

    /// Whether debug mode is enabled.
    pub debug_mode: bool,

    /// Debouncer for search keystrokes.
    search_debounce: Debouncer,
}

impl AppState {
    /// Create initial state with the given taxonomy and display settings.
    pub fn new(
        taxonomy: Taxonomy,
        page_size: usize,
        search_debounce: Debouncer,
        debug_mode: bool,
    ) -> Self {
        Self {
            taxonomy,
            records: Vec::new(),
            filtered: Vec::new(),
            filter: FilterState::default(),
            page: 1,
            page_size,
            selected: None,
            summary: None,
            warnings: Vec::new(),
            debug_mode,
            search_debounce,
        }
    }

    /// Ingest a batch of raw events: classify them all, tally the summary,
    /// and recompute the view.
    pub fn load_records(&mut self, raw: &[RawLogRecord]) {
        self.records = classify::classify_all(raw, &self.taxonomy);
        self.summary = Some(LoadSummary::collect(&self.records));
        self.selected = None;
        self.apply_filters();

        tracing::info!(
            records = self.records.len(),
            taxonomy = %self.taxonomy.id,
            "Events loaded and classified"
        );
    }

    /// Recompute the filtered view from current records and filter state.
    /// Resets to page 1 and clears an out-of-range selection.
    pub fn apply_filters(&mut self) {
        self.filtered = filter::apply_filters(&self.records, &self.filter);
        self.page = 1;

        if let Some(idx) = self.selected {
            if idx >= self.filtered.len() {
                self.selected = None;
            }
        }
    }

    // -- Filter mutation (each reapplies and resets the page) --

    /// Select an action, or None for all actions.
    pub fn set_action(&mut self, action: Option<Action>) {
        self.filter.action = action;
        self.apply_filters();
    }

    /// Select an operator, or None for all operators.
    pub fn set_operator(&mut self, operator: Option<String>) {
        self.filter.operator = operator;
        self.apply_filters();
    }

    /// Select a category, or None for all categories.
    pub fn set_category(&mut self, category: Option<Category>) {
        self.filter.category = category;
        self.apply_filters();
    }

    /// Set the message regex filter from a pattern string.
    pub fn set_regex(&mut self, pattern: &str) -> Result<(), FilterError> {
        self.filter.set_regex(pattern)?;
        self.apply_filters();
        Ok(())
    }

    /// Record a search keystroke at `now`. The view does not change until
    /// the term settles (see `tick`).
    pub fn type_search(&mut self, term: &str, now: Instant) {
        self.search_debounce.input(term, now);
    }

    /// Advance the debounce clock. Returns true if a settled search term
    /// was applied (and the view recomputed).
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.search_debounce.poll(now) {
            Some(term) => {
                self.filter.search = term;
                self.apply_filters();
                true
            }
            None => false,
        }
    }

    /// Apply any pending search term immediately.
    pub fn flush_search(&mut self) -> bool {
        match self.search_debounce.flush() {
            Some(term) => {
                self.filter.search = term;
                self.apply_filters();
                true
            }
            None => false,
        }
    }

    /// Reset every filter to its default and recompute.
    pub fn clear_filters(&mut self) {
        self.filter = FilterState::default();
        self.apply_filters();
    }

    // -- Pagination and selection --

    /// Jump to a page, clamped into the valid range for the current view.
    pub fn set_page(&mut self, page: usize) {
        let total = self.total_pages().max(1);
        self.page = page.clamp(1, total);
    }

    /// The current page of the filtered view.
    pub fn current_page(&self) -> Page<'_, usize> {
        paginate(&self.filtered, self.page_size, self.page)
    }

    /// Total pages for the current view (0 when the view is empty).
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.filtered.len().div_ceil(self.page_size)
    }

    /// Get the currently selected record, if any.
    pub fn selected_record(&self) -> Option<&LogRecord> {
        self.selected
            .and_then(|idx| self.filtered.get(idx))
            .and_then(|&record_idx| self.records.get(record_idx))
    }

    /// Look up a record by its human-facing event id, falling back to the
    /// opaque id. Case-insensitive on the event id.
    pub fn find_record(&self, id: &str) -> Option<&LogRecord> {
        let lower = id.to_lowercase();
        self.records
            .iter()
            .find(|r| r.event_id.to_lowercase() == lower)
            .or_else(|| self.records.iter().find(|r| r.id == id))
    }

    /// Clear all loaded data and reset to initial state.
    pub fn clear(&mut self) {
        self.records.clear();
        self.filtered.clear();
        self.filter = FilterState::default();
        self.page = 1;
        self.selected = None;
        self.summary = None;
        self.warnings.clear();
    }
}
