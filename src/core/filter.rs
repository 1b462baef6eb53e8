// AuditSleuth - core/filter.rs
//
// Composable filter engine over derived audit records.
// All active filters are AND-combined; the search term fans out across
// the displayed fields with OR.
// Core layer: pure logic, no I/O or rendering dependencies.

use crate::core::model::{Action, Category, LogRecord};
use crate::util::error::FilterError;
use regex::Regex;
use std::cmp::Ordering;

/// Complete filter state. All fields are AND-combined when applied.
///
/// This is ephemeral view state: it is created with defaults at startup,
/// mutated by user interaction, and never persisted. The `search` field
/// holds the settled term (post-debounce), not the raw keystrokes.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    /// Case-insensitive search term matched against every displayed
    /// field. Empty = no filter.
    pub search: String,

    /// Selected action (exact match). None = all actions.
    pub action: Option<Action>,

    /// Selected operator (case-insensitive equality). None = all operators.
    pub operator: Option<String>,

    /// Selected category (exact match). None = all categories.
    pub category: Option<Category>,

    /// Compiled regex matched against the raw message text.
    /// None = no regex filter.
    pub regex_search: Option<Regex>,
}

impl FilterState {
    /// Returns true if no filters are active.
    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.action.is_none()
            && self.operator.is_none()
            && self.category.is_none()
            && self.regex_search.is_none()
    }

    /// Set the regex search pattern, compiling it.
    /// Returns an error if the pattern is invalid.
    pub fn set_regex(&mut self, pattern: &str) -> Result<(), FilterError> {
        if pattern.is_empty() {
            self.regex_search = None;
            return Ok(());
        }
        let regex = Regex::new(pattern).map_err(|e| FilterError::InvalidRegex {
            pattern: pattern.to_string(),
            source: e,
        })?;
        self.regex_search = Some(regex);
        Ok(())
    }
}

/// Apply filters to a slice of records, returning indices of matching
/// records sorted newest-first.
///
/// Returns a Vec of indices into the original records slice. This avoids
/// copying records and lets pagination and rendering work on a view.
///
/// The sort is stable and descending by timestamp instant: ties keep
/// input order, and records with no parseable timestamp sort after every
/// dated record. Filtering is idempotent: re-applying the same filters to
/// the filtered view changes nothing.
pub fn apply_filters(records: &[LogRecord], filter: &FilterState) -> Vec<usize> {
    let search_lower = filter.search.to_lowercase();
    let operator_lower = filter.operator.as_deref().map(str::to_lowercase);

    let mut indices: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| matches_all(record, filter, &search_lower, operator_lower.as_deref()))
        .map(|(idx, _)| idx)
        .collect();

    sort_newest_first(records, &mut indices);
    indices
}

/// Check if a single record matches all active filters.
fn matches_all(
    record: &LogRecord,
    filter: &FilterState,
    search_lower: &str,
    operator_lower: Option<&str>,
) -> bool {
    // Search: the term must appear in at least one displayed field.
    if !search_lower.is_empty() && !search_matches(record, search_lower) {
        return false;
    }

    // Action filter (exact)
    if let Some(action) = filter.action {
        if record.action != action {
            return false;
        }
    }

    // Operator filter (case-insensitive equality)
    if let Some(operator) = operator_lower {
        if record.operator.to_lowercase() != operator {
            return false;
        }
    }

    // Category filter (exact)
    if let Some(category) = filter.category {
        if record.category != category {
            return false;
        }
    }

    // Regex search against the raw message
    if let Some(ref regex) = filter.regex_search {
        if !regex.is_match(&record.message) {
            return false;
        }
    }

    true
}

/// OR across the seven displayed fields: event id, action, category,
/// operator, date, time, status.
fn search_matches(record: &LogRecord, term_lower: &str) -> bool {
    record.event_id.to_lowercase().contains(term_lower)
        || record.action.label().to_lowercase().contains(term_lower)
        || record.category.label().to_lowercase().contains(term_lower)
        || record.operator.to_lowercase().contains(term_lower)
        || record.date.to_lowercase().contains(term_lower)
        || record.time.to_lowercase().contains(term_lower)
        || record.status.label().to_lowercase().contains(term_lower)
}

/// Stable newest-first ordering of `indices` by record timestamp.
/// Undated records sort to the end; ties keep input order.
fn sort_newest_first(records: &[LogRecord], indices: &mut [usize]) {
    indices.sort_by(|&a, &b| match (records[a].timestamp, records[b].timestamp) {
        (Some(ta), Some(tb)) => tb.cmp(&ta),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Status;

    fn make_record(id: &str, event_id: &str, created_at: &str) -> LogRecord {
        let timestamp = chrono::DateTime::parse_from_rfc3339(created_at)
            .ok()
            .map(|dt| dt.with_timezone(&chrono::Utc));
        LogRecord {
            id: id.to_string(),
            event_id: event_id.to_string(),
            action: Action::Create,
            status: Status::Info,
            category: Category::System,
            operator: "System".to_string(),
            role: None,
            timestamp,
            date: timestamp
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            time: timestamp
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            message: "message".to_string(),
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn test_empty_filter_returns_all_newest_first() {
        let records = vec![
            make_record("1", "EVT-1", "2024-01-01T00:00:00Z"),
            make_record("2", "EVT-2", "2024-01-02T00:00:00Z"),
        ];
        let result = apply_filters(&records, &FilterState::default());
        assert_eq!(result, vec![1, 0]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let records = vec![
            make_record("1", "EVT-1", "2024-01-01T00:00:00Z"),
            make_record("2", "OTHER", "2024-01-02T00:00:00Z"),
        ];
        let filter = FilterState {
            search: "evt-1".to_string(),
            ..Default::default()
        };
        assert_eq!(apply_filters(&records, &filter), vec![0]);
    }

    #[test]
    fn test_search_spans_all_seven_fields() {
        let mut record = make_record("1", "EVT-9", "2024-03-15T08:30:00Z");
        record.action = Action::Delete;
        record.category = Category::TestResult;
        record.operator = "Dr. Chen".to_string();
        record.status = Status::Warning;
        let records = vec![record];

        for term in [
            "evt-9",     // event id
            "delete",    // action label
            "test res",  // category label
            "chen",      // operator
            "2024-03",   // date
            "08:30",     // time
            "warn",      // status label
        ] {
            let filter = FilterState {
                search: term.to_string(),
                ..Default::default()
            };
            assert_eq!(apply_filters(&records, &filter), vec![0], "term: {term}");
        }

        // The message body is deliberately not searched.
        let filter = FilterState {
            search: "message".to_string(),
            ..Default::default()
        };
        assert!(apply_filters(&records, &filter).is_empty());
    }

    #[test]
    fn test_action_filter_is_exact() {
        let mut records = vec![
            make_record("1", "EVT-1", "2024-01-01T00:00:00Z"),
            make_record("2", "EVT-2", "2024-01-02T00:00:00Z"),
        ];
        records[0].action = Action::Delete;
        let filter = FilterState {
            action: Some(Action::Delete),
            ..Default::default()
        };
        assert_eq!(apply_filters(&records, &filter), vec![0]);
    }

    #[test]
    fn test_operator_filter_ignores_case() {
        let mut records = vec![
            make_record("1", "EVT-1", "2024-01-01T00:00:00Z"),
            make_record("2", "EVT-2", "2024-01-02T00:00:00Z"),
        ];
        records[0].operator = "Dr. Chen".to_string();
        let filter = FilterState {
            operator: Some("dr. chen".to_string()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&records, &filter), vec![0]);
    }

    #[test]
    fn test_category_filter_is_exact() {
        let mut records = vec![
            make_record("1", "EVT-1", "2024-01-01T00:00:00Z"),
            make_record("2", "EVT-2", "2024-01-02T00:00:00Z"),
        ];
        records[1].category = Category::Authentication;
        let filter = FilterState {
            category: Some(Category::Authentication),
            ..Default::default()
        };
        assert_eq!(apply_filters(&records, &filter), vec![1]);
    }

    #[test]
    fn test_regex_filter_matches_message() {
        let mut records = vec![
            make_record("1", "EVT-1", "2024-01-01T00:00:00Z"),
            make_record("2", "EVT-2", "2024-01-02T00:00:00Z"),
        ];
        records[0].message = "Error code: 503".to_string();
        records[1].message = "Status OK".to_string();
        let mut filter = FilterState::default();
        filter.set_regex(r"code:\s*5\d{2}").unwrap();
        assert_eq!(apply_filters(&records, &filter), vec![0]);
    }

    #[test]
    fn test_invalid_regex() {
        let mut filter = FilterState::default();
        assert!(filter.set_regex("[invalid").is_err());
    }

    #[test]
    fn test_combined_filters_are_and_combined() {
        let mut records = vec![
            make_record("1", "EVT-1", "2024-01-01T00:00:00Z"),
            make_record("2", "EVT-2", "2024-01-02T00:00:00Z"),
            make_record("3", "EVT-3", "2024-01-03T00:00:00Z"),
        ];
        records[0].action = Action::Delete;
        records[1].action = Action::Delete;
        records[1].operator = "Priya".to_string();
        let filter = FilterState {
            action: Some(Action::Delete),
            operator: Some("priya".to_string()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&records, &filter), vec![1]);
    }

    #[test]
    fn test_sort_is_newest_first_with_undated_last() {
        let records = vec![
            make_record("1", "EVT-1", "2024-01-01T00:00:00Z"),
            make_record("2", "EVT-2", "not a date"),
            make_record("3", "EVT-3", "2024-01-02T00:00:00Z"),
            make_record("4", "EVT-4", "also not a date"),
        ];
        let result = apply_filters(&records, &FilterState::default());
        // Jan 2, Jan 1, then the undated pair in input order.
        assert_eq!(result, vec![2, 0, 1, 3]);
    }

    #[test]
    fn test_timestamp_ties_keep_input_order() {
        let records = vec![
            make_record("1", "EVT-1", "2024-01-01T12:00:00Z"),
            make_record("2", "EVT-2", "2024-01-01T12:00:00Z"),
            make_record("3", "EVT-3", "2024-01-01T12:00:00Z"),
        ];
        let result = apply_filters(&records, &FilterState::default());
        assert_eq!(result, vec![0, 1, 2]);
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let mut records = vec![
            make_record("1", "EVT-1", "2024-01-03T00:00:00Z"),
            make_record("2", "EVT-2", "2024-01-01T00:00:00Z"),
            make_record("3", "EVT-3", "2024-01-02T00:00:00Z"),
        ];
        records[0].action = Action::Delete;
        records[2].action = Action::Delete;
        let filter = FilterState {
            action: Some(Action::Delete),
            ..Default::default()
        };

        let once: Vec<LogRecord> = apply_filters(&records, &filter)
            .into_iter()
            .map(|i| records[i].clone())
            .collect();
        let twice: Vec<LogRecord> = apply_filters(&once, &filter)
            .into_iter()
            .map(|i| once[i].clone())
            .collect();

        let ids = |rs: &[LogRecord]| rs.iter().map(|r| r.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&once), ids(&twice));
        assert_eq!(ids(&once), vec!["1", "3"]);
    }
}
