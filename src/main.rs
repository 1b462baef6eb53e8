// AuditSleuth - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration and logging initialisation (debug mode support)
// 3. Taxonomy loading (built-in + user-defined)
// 4. Event ingest (file, stdin, export directory, or REST endpoint)
// 5. Filter/sort/paginate and plain-text rendering

mod render;

// Re-export modules from the library crate so that binary-side code can
// use `crate::app::...`, `crate::core::...` etc.
pub use auditsleuth::app;
pub use auditsleuth::core;
pub use auditsleuth::platform;
pub use auditsleuth::util;

use app::debounce::Debouncer;
use app::state::AppState;
use clap::{ArgGroup, Parser};
use crate::core::discovery::{discover_exports, DiscoveryConfig};
use crate::core::export::ExportFormat;
use crate::core::loader;
use crate::core::model::{action_slugs, category_slugs, Action, Category, LogRecord, RawLogRecord};
use crate::core::taxonomy;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use util::constants;
use util::error::{AuditSleuthError, FilterError};

/// AuditSleuth - Filterable audit-trail viewer for LIS event logs.
///
/// Point AuditSleuth at an event-log export (file, directory, or REST
/// endpoint) to classify, search, filter, and page through the audit
/// trail of a laboratory information system.
#[derive(Parser, Debug)]
#[command(name = "AuditSleuth", version, about)]
#[command(group = ArgGroup::new("source").args(["input", "url", "dir"]).required(true))]
struct Cli {
    /// Path to a JSON event-log export ('-' reads stdin).
    input: Option<PathBuf>,

    /// Fetch events from a REST endpoint instead of a local file.
    #[arg(long = "url")]
    url: Option<String>,

    /// Bearer token sent with --url requests.
    #[arg(long = "token", requires = "url")]
    token: Option<String>,

    /// Load every JSON export batch found under a directory.
    #[arg(long = "dir")]
    dir: Option<PathBuf>,

    /// Additional directory containing user-defined taxonomy rules.
    #[arg(short = 'r', long = "rules-dir")]
    rules_dir: Option<PathBuf>,

    /// Case-insensitive search across the displayed event fields.
    #[arg(short = 's', long = "search")]
    search: Option<String>,

    /// Filter by action (e.g. create, update, delete).
    #[arg(short = 'a', long = "action")]
    action: Option<String>,

    /// Filter by operator name.
    #[arg(short = 'o', long = "operator")]
    operator: Option<String>,

    /// Filter by category (e.g. test-order, authentication).
    #[arg(short = 'c', long = "category")]
    category: Option<String>,

    /// Regular expression applied to the raw message text.
    #[arg(long = "regex")]
    regex: Option<String>,

    /// Page of the filtered view to display (1-based).
    #[arg(long = "page", default_value_t = 1)]
    page: usize,

    /// Events per page (overrides config).
    #[arg(long = "page-size")]
    page_size: Option<usize>,

    /// Export the filtered set to a .csv or .json file.
    #[arg(short = 'e', long = "export")]
    export: Option<PathBuf>,

    /// Print the full detail for a single event id.
    #[arg(long = "detail")]
    detail: Option<String>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Resolve platform paths and load config before logging so the
    // configured level can take effect from the first line.
    let platform_paths = platform::config::PlatformPaths::resolve();
    let (config, config_warnings) = platform::config::load_config(&platform_paths.config_dir);

    util::logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    );

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "AuditSleuth starting"
    );

    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    if let Err(e) = run(&cli, &config, &platform_paths) {
        tracing::error!(error = %e, "Run failed");
        match e {
            // Fetch failures get the fixed user-facing sentence; the
            // technical chain has already been logged.
            AuditSleuthError::Fetch(ref fetch) => eprintln!("Error: {}", fetch.user_message()),
            other => eprintln!("Error: {other}"),
        }
        std::process::exit(1);
    }
}

fn run(
    cli: &Cli,
    config: &platform::config::AppConfig,
    platform_paths: &platform::config::PlatformPaths,
) -> Result<(), AuditSleuthError> {
    // -- Taxonomy loading: CLI override > config > platform default --
    let rules_dir = cli
        .rules_dir
        .clone()
        .or_else(|| config.user_rules_directory.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| platform_paths.user_rules_dir.clone());

    let (taxonomies, taxonomy_errors) = app::taxonomy_mgr::load_all_taxonomies(Some(&rules_dir))?;
    for err in &taxonomy_errors {
        tracing::warn!(error = %err, "Taxonomy loading warning");
    }

    let active_taxonomy = match app::taxonomy_mgr::select_taxonomy(&taxonomies, None) {
        Some(t) => t.clone(),
        // Unreachable in practice (the built-in is always loaded), but a
        // fresh compile of the embedded rules is a safe fallback.
        None => taxonomy::load_builtin_taxonomy()?,
    };

    // -- Event ingest --
    let (raw_records, ingest_warnings) = load_raw_records(cli, config)?;

    // -- State and filters --
    let page_size = cli
        .page_size
        .unwrap_or(config.page_size)
        .clamp(constants::MIN_PAGE_SIZE, constants::MAX_PAGE_SIZE);
    let debouncer = Debouncer::new(Duration::from_millis(config.filter_debounce_ms));
    let mut state = AppState::new(active_taxonomy, page_size, debouncer, cli.debug);
    state.load_records(&raw_records);
    state.warnings.extend(ingest_warnings);

    apply_cli_filters(cli, &mut state)?;
    state.set_page(cli.page);

    if state.debug_mode {
        tracing::debug!(
            filtered = state.filtered.len(),
            total = state.records.len(),
            page = state.page,
            "View state after filters"
        );
    }

    // -- Detail mode --
    if let Some(ref id) = cli.detail {
        match state.find_record(id) {
            Some(record) => {
                print!("{}", render::render_detail(record));
                return Ok(());
            }
            None => {
                eprintln!("No event found with id '{id}'.");
                std::process::exit(1);
            }
        }
    }

    // -- Export --
    if let Some(ref export_path) = cli.export {
        let count = export_filtered(&state, export_path)?;
        println!("Exported {count} events to '{}'.", export_path.display());
    }

    // -- Render --
    if let Some(ref summary) = state.summary {
        print!("{}", render::render_summary(summary));
        println!();
    }
    print!("{}", render::render_table(&state));

    for warning in &state.warnings {
        eprintln!("Warning: {warning}");
    }

    Ok(())
}

/// Gather raw events from whichever source the CLI selected.
/// Returns the records plus any non-fatal ingest warnings.
fn load_raw_records(
    cli: &Cli,
    config: &platform::config::AppConfig,
) -> Result<(Vec<RawLogRecord>, Vec<String>), AuditSleuthError> {
    if let Some(ref url) = cli.url {
        let timeout = Duration::from_secs(config.fetch_timeout_secs);
        let records = app::fetch::fetch_events(url, cli.token.as_deref(), timeout)?;
        return Ok((records, Vec::new()));
    }

    if let Some(ref dir) = cli.dir {
        return load_export_directory(dir);
    }

    // The clap source group guarantees one source; an absent input can
    // only mean an empty view, never a panic.
    let Some(input) = cli.input.as_ref() else {
        return Ok((Vec::new(), Vec::new()));
    };

    let body = if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| AuditSleuthError::Io {
                path: PathBuf::from("<stdin>"),
                operation: "read",
                source: e,
            })?;
        buf
    } else {
        read_file(input)?
    };

    Ok((loader::parse_payload(&body)?, Vec::new()))
}

/// Load and concatenate every export batch under `dir`.
fn load_export_directory(
    dir: &Path,
) -> Result<(Vec<RawLogRecord>, Vec<String>), AuditSleuthError> {
    let (files, mut warnings) = discover_exports(dir, &DiscoveryConfig::default())?;

    let mut records = Vec::new();
    for file in &files {
        let body = read_file(file)?;
        let batch = loader::parse_payload(&body)?;
        tracing::debug!(file = %file.display(), events = batch.len(), "Batch loaded");
        records.extend(batch);
    }

    if records.len() > constants::MAX_TOTAL_RECORDS {
        warnings.push(format!(
            "Combined batches held {} events; truncated to the {} cap.",
            records.len(),
            constants::MAX_TOTAL_RECORDS
        ));
        records.truncate(constants::MAX_TOTAL_RECORDS);
    }

    Ok((records, warnings))
}

fn read_file(path: &Path) -> Result<String, AuditSleuthError> {
    std::fs::read_to_string(path).map_err(|e| AuditSleuthError::Io {
        path: path.to_path_buf(),
        operation: "read",
        source: e,
    })
}

/// Translate CLI filter flags into filter state, failing fast on values
/// outside the closed enumerations.
fn apply_cli_filters(cli: &Cli, state: &mut AppState) -> Result<(), AuditSleuthError> {
    if let Some(ref action) = cli.action {
        let parsed = Action::parse(action).ok_or_else(|| FilterError::UnknownSelector {
            field: "action",
            value: action.clone(),
            expected: action_slugs(),
        })?;
        state.set_action(Some(parsed));
    }

    if let Some(ref category) = cli.category {
        let parsed = Category::parse(category).ok_or_else(|| FilterError::UnknownSelector {
            field: "category",
            value: category.clone(),
            expected: category_slugs(),
        })?;
        state.set_category(Some(parsed));
    }

    if let Some(ref operator) = cli.operator {
        state.set_operator(Some(operator.clone()));
    }

    if let Some(ref pattern) = cli.regex {
        state.set_regex(pattern)?;
    }

    if let Some(ref term) = cli.search {
        // A term given on the command line is already committed, so it
        // goes through the debouncer and is flushed at once.
        state.type_search(term, Instant::now());
        state.flush_search();
    }

    Ok(())
}

/// Write the whole filtered, sorted view to the export path.
fn export_filtered(state: &AppState, export_path: &Path) -> Result<usize, AuditSleuthError> {
    let format = ExportFormat::from_path(export_path)?;
    let records: Vec<&LogRecord> = state
        .filtered
        .iter()
        .map(|&idx| &state.records[idx])
        .collect();

    let file = std::fs::File::create(export_path).map_err(|e| AuditSleuthError::Io {
        path: export_path.to_path_buf(),
        operation: "create",
        source: e,
    })?;
    let writer = std::io::BufWriter::new(file);

    Ok(crate::core::export::export(&records, format, writer, export_path)?)
}
