// AuditSleuth - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation (DevWorkflow Part A Rule 2).
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all AuditSleuth operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum AuditSleuthError {
    /// Taxonomy loading or validation failed.
    Taxonomy(TaxonomyError),

    /// Event payload decoding failed.
    Load(LoadError),

    /// Fetching events from the REST endpoint failed.
    Fetch(FetchError),

    /// Export-batch discovery failed.
    Discovery(DiscoveryError),

    /// Filter operation failed.
    Filter(FilterError),

    /// Export operation failed.
    Export(ExportError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for AuditSleuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Taxonomy(e) => write!(f, "Taxonomy error: {e}"),
            Self::Load(e) => write!(f, "Load error: {e}"),
            Self::Fetch(e) => write!(f, "Fetch error: {e}"),
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Filter(e) => write!(f, "Filter error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for AuditSleuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Taxonomy(e) => Some(e),
            Self::Load(e) => Some(e),
            Self::Fetch(e) => Some(e),
            Self::Discovery(e) => Some(e),
            Self::Filter(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Taxonomy errors
// ---------------------------------------------------------------------------

/// Errors related to taxonomy rule loading and validation.
#[derive(Debug)]
pub enum TaxonomyError {
    /// TOML file could not be parsed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Taxonomy file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// A required field is missing from the taxonomy definition.
    MissingField {
        taxonomy_id: String,
        field: &'static str,
    },

    /// A rule names a value outside the closed enumeration it targets.
    UnknownValue {
        taxonomy_id: String,
        table: &'static str,
        value: String,
    },

    /// A rule has neither keywords nor a pattern, so it can never match.
    EmptyRule {
        taxonomy_id: String,
        table: &'static str,
        index: usize,
    },

    /// A regex pattern in a rule is invalid.
    InvalidRegex {
        taxonomy_id: String,
        table: &'static str,
        pattern: String,
        source: regex::Error,
    },

    /// A regex pattern exceeds the maximum allowed length.
    RegexTooLong {
        taxonomy_id: String,
        table: &'static str,
        length: usize,
        max_length: usize,
    },

    /// A single taxonomy defines more rules than the configured bound.
    TooManyRules { count: usize, max: usize },

    /// Maximum number of loaded taxonomies exceeded.
    TooManyTaxonomies { count: usize, max: usize },

    /// I/O error reading a taxonomy file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for TaxonomyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Failed to parse TOML '{}': {source}", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Taxonomy '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::MissingField { taxonomy_id, field } => {
                write!(
                    f,
                    "Taxonomy '{taxonomy_id}': missing required field '{field}'"
                )
            }
            Self::UnknownValue {
                taxonomy_id,
                table,
                value,
            } => write!(
                f,
                "Taxonomy '{taxonomy_id}': [[{table}]] rule names unknown value '{value}'"
            ),
            Self::EmptyRule {
                taxonomy_id,
                table,
                index,
            } => write!(
                f,
                "Taxonomy '{taxonomy_id}': [[{table}]] rule #{index} has no keywords and no pattern"
            ),
            Self::InvalidRegex {
                taxonomy_id,
                table,
                pattern,
                source,
            } => write!(
                f,
                "Taxonomy '{taxonomy_id}': invalid regex in [[{table}]] ('{pattern}'): {source}"
            ),
            Self::RegexTooLong {
                taxonomy_id,
                table,
                length,
                max_length,
            } => write!(
                f,
                "Taxonomy '{taxonomy_id}': regex in [[{table}]] is {length} chars, \
                 exceeds maximum of {max_length}"
            ),
            Self::TooManyRules { count, max } => {
                write!(f, "Taxonomy defines {count} rules, maximum is {max}")
            }
            Self::TooManyTaxonomies { count, max } => {
                write!(f, "Too many taxonomies loaded ({count}), maximum is {max}")
            }
            Self::Io { path, source } => {
                write!(
                    f,
                    "I/O error reading taxonomy '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for TaxonomyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::InvalidRegex { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<TaxonomyError> for AuditSleuthError {
    fn from(e: TaxonomyError) -> Self {
        Self::Taxonomy(e)
    }
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Errors related to decoding an event payload.
#[derive(Debug)]
pub enum LoadError {
    /// The payload is not valid JSON, or matches neither the bare-array
    /// nor the wrapped `{data: [...]}` shape.
    Json { source: serde_json::Error },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json { source } => {
                write!(f, "Event payload is not a recognised JSON shape: {source}")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json { source } => Some(source),
        }
    }
}

impl From<LoadError> for AuditSleuthError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

// ---------------------------------------------------------------------------
// Fetch errors
// ---------------------------------------------------------------------------

/// Errors related to fetching events from the REST endpoint.
///
/// `user_message()` maps each failure to the single fixed sentence shown to
/// the user; the technical chain stays available for diagnostic logging.
#[derive(Debug)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    ClientBuild { source: reqwest::Error },

    /// The request failed below the HTTP layer (DNS, connect, timeout).
    Transport { url: String, source: reqwest::Error },

    /// The endpoint answered with a non-success status.
    Status { url: String, status: u16 },

    /// The response body could not be read.
    Body { url: String, source: reqwest::Error },
}

impl FetchError {
    /// The human-readable message surfaced to the caller.
    ///
    /// Distinguished by HTTP status where one is available; transport and
    /// body failures share the generic fallback. This is a classification,
    /// not a retry policy: no request is ever re-issued.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Status { status, .. } => match status {
                401 => "Authentication required. Please sign in again.",
                403 => "You do not have permission to view the event log.",
                404 => "The event log endpoint was not found.",
                429 => "Too many requests. Please try again later.",
                500 => "The server encountered an internal error.",
                503 => "The service is temporarily unavailable. Please try again later.",
                _ => "Failed to load the event log. Please try again.",
            },
            _ => "Failed to load the event log. Please try again.",
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientBuild { source } => {
                write!(f, "Failed to build HTTP client: {source}")
            }
            Self::Transport { url, source } => {
                write!(f, "Request to '{url}' failed: {source}")
            }
            Self::Status { url, status } => {
                write!(f, "'{url}' answered with HTTP {status}")
            }
            Self::Body { url, source } => {
                write!(f, "Failed to read response body from '{url}': {source}")
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ClientBuild { source } => Some(source),
            Self::Transport { source, .. } => Some(source),
            Self::Body { source, .. } => Some(source),
            Self::Status { .. } => None,
        }
    }
}

impl From<FetchError> for AuditSleuthError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to export-batch discovery.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The root scan path does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The root path is not a directory.
    NotADirectory { path: PathBuf },

    /// Maximum file count exceeded during the walk.
    MaxFilesExceeded { max: usize },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Export path '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Export path '{}' is not a directory", path.display())
            }
            Self::MaxFilesExceeded { max } => {
                write!(
                    f,
                    "Discovery stopped: exceeded maximum of {max} export files. \
                     Narrow the export directory."
                )
            }
        }
    }
}

impl std::error::Error for DiscoveryError {}

impl From<DiscoveryError> for AuditSleuthError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Filter errors
// ---------------------------------------------------------------------------

/// Errors related to filter operations.
#[derive(Debug)]
pub enum FilterError {
    /// User-provided regex is invalid.
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },

    /// A filter selector names a value outside its closed enumeration.
    UnknownSelector {
        field: &'static str,
        value: String,
        expected: String,
    },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRegex { pattern, source } => {
                write!(f, "Invalid filter regex '{pattern}': {source}")
            }
            Self::UnknownSelector {
                field,
                value,
                expected,
            } => write!(
                f,
                "Unknown {field} '{value}'. Expected one of: {expected}"
            ),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRegex { source, .. } => Some(source),
            Self::UnknownSelector { .. } => None,
        }
    }
}

impl From<FilterError> for AuditSleuthError {
    fn from(e: FilterError) -> Self {
        Self::Filter(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Export would exceed maximum entry count.
    TooManyEntries { count: usize, max: usize },

    /// The export path has no recognised extension.
    UnknownFormat { path: PathBuf },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
            Self::TooManyEntries { count, max } => write!(
                f,
                "Export of {count} events exceeds maximum of {max}. \
                 Apply filters to reduce the result set."
            ),
            Self::UnknownFormat { path } => write!(
                f,
                "Cannot infer export format from '{}'. Use a .csv or .json extension.",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ExportError> for AuditSleuthError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

/// Convenience type alias for AuditSleuth results.
pub type Result<T> = std::result::Result<T, AuditSleuthError>;
