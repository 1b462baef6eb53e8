// AuditSleuth - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Referenced by DevWorkflow Part A Rule 11 (explicit named-constant limits).

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "AuditSleuth";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "AuditSleuth";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Classification defaults
// =============================================================================

/// Operator name substituted when an event carries no performedBy field.
pub const DEFAULT_OPERATOR: &str = "System";

/// Placeholder rendered for the date/time of an event whose createdAt
/// value is missing or unparseable. A malformed timestamp must never make
/// an audit record invisible.
pub const TIMESTAMP_PLACEHOLDER: &str = "N/A";

/// Record count at or above which `classify_all` switches from a serial
/// iterator to a rayon parallel iterator. Below this the per-record work
/// (a handful of substring scans) is too cheap to amortise the fork-join
/// overhead.
pub const PARALLEL_CLASSIFY_THRESHOLD: usize = 4_096;

// =============================================================================
// Load limits
// =============================================================================

/// Hard upper bound on the total number of audit events held in memory at
/// once. When a payload exceeds the cap the loader truncates it and emits
/// a warning so the user knows data was dropped (Rule 11 -- resource
/// bounds on growing collections). At ~500 bytes per derived record this
/// caps heap usage around 500 MB.
pub const MAX_TOTAL_RECORDS: usize = 1_000_000;

// =============================================================================
// Taxonomy limits
// =============================================================================

/// Maximum number of taxonomies that can be loaded (built-in + user).
pub const MAX_TAXONOMIES: usize = 50;

/// Maximum size of a taxonomy TOML file in bytes.
pub const MAX_TAXONOMY_FILE_SIZE: u64 = 64 * 1024; // 64 KB

/// Maximum number of rules across all tables of a single taxonomy.
pub const MAX_TAXONOMY_RULES: usize = 500;

/// Maximum regex pattern length to prevent ReDoS.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4_096;

// =============================================================================
// Discovery limits
// =============================================================================

/// Maximum directory recursion depth when discovering export batches.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Maximum number of export files to load from a single directory.
pub const DEFAULT_MAX_FILES: usize = 500;

/// Default include glob patterns for export-batch discovery.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["*.json"];

/// Default exclude glob patterns for export-batch discovery.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["*.tmp", "*.bak", "node_modules", ".git"];

// =============================================================================
// Display defaults
// =============================================================================

/// Default number of events per rendered page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Minimum user-configurable page size.
pub const MIN_PAGE_SIZE: usize = 1;

/// Maximum user-configurable page size.
pub const MAX_PAGE_SIZE: usize = 500;

/// Debounce delay in milliseconds for search input. The effective search
/// term lags the last keystroke by this quantum so the view is not
/// re-filtered on every character.
pub const DEFAULT_FILTER_DEBOUNCE_MS: u64 = 300;

/// Minimum user-configurable debounce delay (ms). Zero disables debouncing.
pub const MIN_FILTER_DEBOUNCE_MS: u64 = 0;

/// Maximum user-configurable debounce delay (ms).
pub const MAX_FILTER_DEBOUNCE_MS: u64 = 5_000;

/// Message column width in the rendered table before truncation.
pub const TABLE_MESSAGE_WIDTH: usize = 48;

// =============================================================================
// Fetch limits
// =============================================================================

/// Default HTTP request timeout in seconds for the event endpoint.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Minimum user-configurable fetch timeout (seconds).
pub const MIN_FETCH_TIMEOUT_SECS: u64 = 1;

/// Maximum user-configurable fetch timeout (seconds).
pub const MAX_FETCH_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// Export
// =============================================================================

/// Maximum number of events that can be exported in a single operation.
pub const MAX_EXPORT_ENTRIES: usize = 5_000_000;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// User taxonomy rules subdirectory name.
pub const RULES_DIR_NAME: &str = "rules";
