// AuditSleuth - platform/config.rs
//
// Platform-specific configuration, data directory resolution, and
// config.toml loading with startup validation (DevWorkflow Part A
// Rule 13).
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for AuditSleuth data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/auditsleuth/ or %APPDATA%\AuditSleuth\)
    pub config_dir: PathBuf,

    /// User taxonomy rules directory (e.g. ~/.config/auditsleuth/rules/)
    pub user_rules_dir: PathBuf,

    /// Data directory for logs, caches, etc.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            // Rules live one level above config/ so the user-visible path is
            // %APPDATA%\AuditSleuth\rules\ rather than the deeper
            // %APPDATA%\AuditSleuth\config\rules\.
            let user_rules_dir = config_dir
                .parent()
                .unwrap_or(&config_dir)
                .join(constants::RULES_DIR_NAME);
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                rules = %user_rules_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                user_rules_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                user_rules_dir: fallback.join(constants::RULES_DIR_NAME),
                data_dir: fallback,
            }
        }
    }
}

// =============================================================================
// config.toml loading and validation (Rule 13)
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[display]` section.
    pub display: DisplaySection,
    /// `[fetch]` section.
    pub fetch: FetchSection,
    /// `[rules]` section.
    pub rules: RulesSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[display]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Events per rendered page.
    pub page_size: Option<usize>,
    /// Search debounce in ms.
    pub filter_debounce_ms: Option<u64>,
}

/// `[fetch]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FetchSection {
    /// HTTP request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// `[rules]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RulesSection {
    /// Additional taxonomy rules directory.
    pub user_rules_directory: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// All values are validated against named constants at load time (Rule 13).
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Display --
    /// Events per rendered page.
    pub page_size: usize,
    /// Search debounce in ms.
    pub filter_debounce_ms: u64,

    // -- Fetch --
    /// HTTP request timeout in seconds.
    pub fetch_timeout_secs: u64,

    // -- Rules --
    /// Additional taxonomy rules directory.
    pub user_rules_directory: Option<String>,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page_size: constants::DEFAULT_PAGE_SIZE,
            filter_debounce_ms: constants::DEFAULT_FILTER_DEBOUNCE_MS,
            fetch_timeout_secs: constants::DEFAULT_FETCH_TIMEOUT_SECS,
            user_rules_directory: None,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal
/// warnings. If the file does not exist, returns defaults with no warnings
/// (first-run). If the file is unparseable, returns defaults with an error
/// warning (fail-fast on misconfiguration per Rule 13 -- the application
/// still starts but the user is informed).
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir
        .parent()
        .unwrap_or(config_dir)
        .join(constants::CONFIG_FILE_NAME);

    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    // Validate each field against named constants, accumulating all warnings.
    let mut config = AppConfig::default();

    // -- Display: page_size --
    if let Some(size) = raw.display.page_size {
        if (constants::MIN_PAGE_SIZE..=constants::MAX_PAGE_SIZE).contains(&size) {
            config.page_size = size;
        } else {
            warnings.push(format!(
                "[display] page_size = {size} is out of range ({}-{}). Using default ({}).",
                constants::MIN_PAGE_SIZE,
                constants::MAX_PAGE_SIZE,
                constants::DEFAULT_PAGE_SIZE,
            ));
        }
    }

    // -- Display: filter_debounce_ms --
    if let Some(ms) = raw.display.filter_debounce_ms {
        if (constants::MIN_FILTER_DEBOUNCE_MS..=constants::MAX_FILTER_DEBOUNCE_MS).contains(&ms) {
            config.filter_debounce_ms = ms;
        } else {
            warnings.push(format!(
                "[display] filter_debounce_ms = {ms} is out of range ({}-{}). Using default ({}).",
                constants::MIN_FILTER_DEBOUNCE_MS,
                constants::MAX_FILTER_DEBOUNCE_MS,
                constants::DEFAULT_FILTER_DEBOUNCE_MS,
            ));
        }
    }

    // -- Fetch: timeout_secs --
    if let Some(secs) = raw.fetch.timeout_secs {
        if (constants::MIN_FETCH_TIMEOUT_SECS..=constants::MAX_FETCH_TIMEOUT_SECS).contains(&secs)
        {
            config.fetch_timeout_secs = secs;
        } else {
            warnings.push(format!(
                "[fetch] timeout_secs = {secs} is out of range ({}-{}). Using default ({}).",
                constants::MIN_FETCH_TIMEOUT_SECS,
                constants::MAX_FETCH_TIMEOUT_SECS,
                constants::DEFAULT_FETCH_TIMEOUT_SECS,
            ));
        }
    }

    // -- Rules: user_rules_directory --
    if let Some(ref dir) = raw.rules.user_rules_directory {
        if !dir.is_empty() {
            config.user_rules_directory = Some(dir.clone());
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Write a config.toml next to a pretend config dir, matching the
    /// layout load_config expects (file sits one level above config_dir).
    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join("config");
        fs::create_dir(&config_dir).unwrap();
        fs::write(dir.path().join(constants::CONFIG_FILE_NAME), content).unwrap();
        (dir, config_dir)
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config"));
        assert_eq!(config.page_size, constants::DEFAULT_PAGE_SIZE);
        assert_eq!(config.filter_debounce_ms, constants::DEFAULT_FILTER_DEBOUNCE_MS);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_config_is_applied() {
        let (_dir, config_dir) = write_config(
            r#"
[display]
page_size = 25
filter_debounce_ms = 150

[fetch]
timeout_secs = 10

[logging]
level = "debug"
"#,
        );
        let (config, warnings) = load_config(&config_dir);
        assert!(warnings.is_empty());
        assert_eq!(config.page_size, 25);
        assert_eq!(config.filter_debounce_ms, 150);
        assert_eq!(config.fetch_timeout_secs, 10);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_out_of_range_values_warn_and_fall_back() {
        let (_dir, config_dir) = write_config(
            r#"
[display]
page_size = 100000

[fetch]
timeout_secs = 0
"#,
        );
        let (config, warnings) = load_config(&config_dir);
        assert_eq!(config.page_size, constants::DEFAULT_PAGE_SIZE);
        assert_eq!(config.fetch_timeout_secs, constants::DEFAULT_FETCH_TIMEOUT_SECS);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_unparseable_config_warns_and_uses_defaults() {
        let (_dir, config_dir) = write_config("this is not toml [[[");
        let (config, warnings) = load_config(&config_dir);
        assert_eq!(config.page_size, constants::DEFAULT_PAGE_SIZE);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_unknown_log_level_warns() {
        let (_dir, config_dir) = write_config("[logging]\nlevel = \"verbose\"\n");
        let (config, warnings) = load_config(&config_dir);
        assert!(config.log_level.is_none());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let (_dir, config_dir) = write_config("[future_section]\nshiny = true\n");
        let (_, warnings) = load_config(&config_dir);
        assert!(warnings.is_empty());
    }
}
