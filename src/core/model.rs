// AuditSleuth - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no rendering,
// no platform dependencies (Atlas Layer Rule: Core depends on std only).
//
// These types are the shared vocabulary across all layers.

use crate::util::constants;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

// =============================================================================
// Raw event (backend input)
// =============================================================================

/// A raw audit event exactly as the LIS backend emits it.
///
/// Field names follow the backend's camelCase JSON. Every field except the
/// identifiers is optional in practice; absent fields default so a sparse
/// record still classifies rather than failing the whole payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLogRecord {
    /// Opaque unique identifier. Accepted as a JSON string or number.
    #[serde(default, deserialize_with = "opaque_id")]
    pub id: String,

    /// Human-facing event identifier (e.g. "EVT-2041").
    #[serde(default)]
    pub event_id: String,

    /// Free-text description of what happened.
    #[serde(default)]
    pub message: String,

    /// Operator name; `None` means the system itself acted.
    #[serde(default)]
    pub performed_by: Option<String>,

    /// Operator role string (e.g. "doctor", "nurse", "admin").
    #[serde(default)]
    pub role: Option<String>,

    /// ISO-8601 timestamp string, UTC.
    #[serde(default)]
    pub created_at: String,
}

/// Accept an opaque identifier serialised as either a string or a number.
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Text(s) => s,
        IdRepr::Int(n) => n.to_string(),
        IdRepr::Float(n) => n.to_string(),
    })
}

// =============================================================================
// Derived event (normalised output of classification)
// =============================================================================

/// An audit event enriched with classification fields derived from the raw
/// message text and operator role.
///
/// This is the core data unit that flows through filtering, display, and
/// export. Derived once per load, never mutated, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    /// Opaque unique identifier carried through from the raw event.
    pub id: String,

    /// Human-facing event identifier.
    pub event_id: String,

    /// Derived action classification.
    pub action: Action,

    /// Derived status classification.
    pub status: Status,

    /// Derived category classification.
    pub category: Category,

    /// Operator name; `"System"` when the raw event named nobody.
    pub operator: String,

    /// Operator role string, if the raw event carried one.
    pub role: Option<String>,

    /// Parsed timestamp in UTC. `None` if createdAt was unparseable
    /// (sorted to the end of the newest-first view).
    pub timestamp: Option<DateTime<Utc>>,

    /// Calendar-date portion of the UTC instant, or "N/A".
    pub date: String,

    /// Time-of-day portion of the UTC instant, or "N/A".
    pub time: String,

    /// Full original message text.
    pub message: String,

    /// Original createdAt string, kept for the detail view.
    pub created_at: String,
}

// =============================================================================
// Action
// =============================================================================

/// Closed enumeration of audit actions derived from the message text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Action {
    #[default]
    Create,
    Update,
    Delete,
    Add,
    Complete,
    Activate,
    Lock,
    Login,
    Logout,
}

impl Action {
    /// Returns all variants in display order.
    pub fn all() -> &'static [Action] {
        &[
            Action::Create,
            Action::Update,
            Action::Delete,
            Action::Add,
            Action::Complete,
            Action::Activate,
            Action::Lock,
            Action::Login,
            Action::Logout,
        ]
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Action::Create => "Create",
            Action::Update => "Update",
            Action::Delete => "Delete",
            Action::Add => "Add",
            Action::Complete => "Complete",
            Action::Activate => "Activate",
            Action::Lock => "Lock",
            Action::Login => "Login",
            Action::Logout => "Logout",
        }
    }

    /// Stable lowercase identifier used in rule files and on the CLI.
    pub fn slug(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Add => "add",
            Action::Complete => "complete",
            Action::Activate => "activate",
            Action::Lock => "lock",
            Action::Login => "login",
            Action::Logout => "logout",
        }
    }

    /// Parse a label or slug, case-insensitively.
    pub fn parse(input: &str) -> Option<Action> {
        let lower = input.trim().to_lowercase();
        Action::all().iter().copied().find(|a| a.slug() == lower)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Status
// =============================================================================

/// Closed enumeration of event outcomes derived from the message text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Status {
    Success,
    Error,
    #[default]
    Info,
    Warning,
}

impl Status {
    /// Returns all variants in display order.
    pub fn all() -> &'static [Status] {
        &[Status::Success, Status::Error, Status::Info, Status::Warning]
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Success => "Success",
            Status::Error => "Error",
            Status::Info => "Info",
            Status::Warning => "Warning",
        }
    }

    /// Stable lowercase identifier used in rule files and on the CLI.
    pub fn slug(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Error => "error",
            Status::Info => "info",
            Status::Warning => "warning",
        }
    }

    /// Parse a label or slug, case-insensitively.
    pub fn parse(input: &str) -> Option<Status> {
        let lower = input.trim().to_lowercase();
        Status::all().iter().copied().find(|s| s.slug() == lower)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Category
// =============================================================================

/// Closed enumeration of LIS subject areas an event can belong to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Category {
    #[serde(rename = "Test Order")]
    TestOrder,
    #[serde(rename = "Test Result")]
    TestResult,
    Comment,
    Review,
    Instrument,
    User,
    #[default]
    System,
    Authentication,
    Data,
}

impl Category {
    /// Returns all variants in display order.
    pub fn all() -> &'static [Category] {
        &[
            Category::TestOrder,
            Category::TestResult,
            Category::Comment,
            Category::Review,
            Category::Instrument,
            Category::User,
            Category::System,
            Category::Authentication,
            Category::Data,
        ]
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Category::TestOrder => "Test Order",
            Category::TestResult => "Test Result",
            Category::Comment => "Comment",
            Category::Review => "Review",
            Category::Instrument => "Instrument",
            Category::User => "User",
            Category::System => "System",
            Category::Authentication => "Authentication",
            Category::Data => "Data",
        }
    }

    /// Stable lowercase identifier used in rule files and on the CLI.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::TestOrder => "test-order",
            Category::TestResult => "test-result",
            Category::Comment => "comment",
            Category::Review => "review",
            Category::Instrument => "instrument",
            Category::User => "user",
            Category::System => "system",
            Category::Authentication => "authentication",
            Category::Data => "data",
        }
    }

    /// Parse a label or slug, case-insensitively ("Test Order" and
    /// "test-order" both resolve).
    pub fn parse(input: &str) -> Option<Category> {
        let lower = input.trim().to_lowercase();
        Category::all()
            .iter()
            .copied()
            .find(|c| c.slug() == lower || c.label().to_lowercase() == lower)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Load summary
// =============================================================================

/// Summary statistics for a completed load, shown after ingest.
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    /// Total events loaded (after the record cap).
    pub total: usize,

    /// Events by derived status.
    pub by_status: HashMap<Status, usize>,

    /// Events by derived category.
    pub by_category: HashMap<Category, usize>,

    /// Events whose createdAt could not be parsed.
    pub invalid_timestamps: usize,
}

impl LoadSummary {
    /// Tally a batch of derived records.
    pub fn collect(records: &[LogRecord]) -> Self {
        let mut summary = LoadSummary {
            total: records.len(),
            ..Default::default()
        };
        for record in records {
            *summary.by_status.entry(record.status).or_insert(0) += 1;
            *summary.by_category.entry(record.category).or_insert(0) += 1;
            if record.timestamp.is_none() {
                summary.invalid_timestamps += 1;
            }
        }
        summary
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Comma-separated list of valid slugs, for error messages.
pub fn action_slugs() -> String {
    Action::all()
        .iter()
        .map(|a| a.slug())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Comma-separated list of valid category slugs, for error messages.
pub fn category_slugs() -> String {
    Category::all()
        .iter()
        .map(|c| c.slug())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The effective operator name for a raw event.
pub fn operator_name(raw: &RawLogRecord) -> String {
    match raw.performed_by.as_deref() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => constants::DEFAULT_OPERATOR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_defaults_match_classification_fallbacks() {
        assert_eq!(Action::default(), Action::Create);
        assert_eq!(Status::default(), Status::Info);
        assert_eq!(Category::default(), Category::System);
    }

    #[test]
    fn test_category_parse_accepts_label_and_slug() {
        assert_eq!(Category::parse("test-order"), Some(Category::TestOrder));
        assert_eq!(Category::parse("Test Order"), Some(Category::TestOrder));
        assert_eq!(Category::parse("TEST ORDER"), Some(Category::TestOrder));
        assert_eq!(Category::parse("bogus"), None);
    }

    #[test]
    fn test_action_parse_is_case_insensitive() {
        assert_eq!(Action::parse("Delete"), Some(Action::Delete));
        assert_eq!(Action::parse("  login "), Some(Action::Login));
        assert_eq!(Action::parse(""), None);
    }

    #[test]
    fn test_raw_record_accepts_numeric_id() {
        let raw: RawLogRecord = serde_json::from_str(
            r#"{"id": 42, "eventId": "EVT-1", "message": "x", "createdAt": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(raw.id, "42");
        assert_eq!(raw.event_id, "EVT-1");
        assert!(raw.performed_by.is_none());
    }

    #[test]
    fn test_operator_name_defaults_to_system() {
        let raw: RawLogRecord = serde_json::from_str(r#"{"id": "1"}"#).unwrap();
        assert_eq!(operator_name(&raw), "System");

        let named: RawLogRecord =
            serde_json::from_str(r#"{"id": "2", "performedBy": "Dr. Chen"}"#).unwrap();
        assert_eq!(operator_name(&named), "Dr. Chen");

        let blank: RawLogRecord =
            serde_json::from_str(r#"{"id": "3", "performedBy": "  "}"#).unwrap();
        assert_eq!(operator_name(&blank), "System");
    }

    #[test]
    fn test_load_summary_tallies() {
        let records = vec![
            sample_record(Status::Success, Category::Authentication, true),
            sample_record(Status::Error, Category::TestOrder, true),
            sample_record(Status::Error, Category::TestOrder, false),
        ];
        let summary = LoadSummary::collect(&records);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_status[&Status::Error], 2);
        assert_eq!(summary.by_category[&Category::TestOrder], 2);
        assert_eq!(summary.invalid_timestamps, 1);
    }

    fn sample_record(status: Status, category: Category, dated: bool) -> LogRecord {
        LogRecord {
            id: "1".to_string(),
            event_id: "EVT-1".to_string(),
            action: Action::Create,
            status,
            category,
            operator: "System".to_string(),
            role: None,
            timestamp: dated.then(|| "2024-01-01T00:00:00Z".parse().unwrap()),
            date: "2024-01-01".to_string(),
            time: "00:00:00".to_string(),
            message: "test".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }
}
