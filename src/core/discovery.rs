// AuditSleuth - core/discovery.rs
//
// Export-batch discovery: find event-log JSON exports under a directory.
// LIS deployments drop one export file per day/shift into a spool
// directory; loading a directory concatenates every batch found.
//
// Traversal is bounded by depth and file count so pointing the tool at a
// filesystem root fails fast instead of walking forever.

use crate::util::constants;
use crate::util::error::DiscoveryError;
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Bounds and patterns for a discovery walk.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum directory recursion depth.
    pub max_depth: usize,

    /// Maximum number of export files accepted before erroring.
    pub max_files: usize,

    /// Filename glob patterns to include.
    pub include_patterns: Vec<String>,

    /// File or directory name glob patterns to exclude.
    pub exclude_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            include_patterns: constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_patterns: constants::DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Discover export files under `root`.
///
/// Returns the matching paths in sorted order plus non-fatal warnings for
/// entries that could not be read. Exceeding `max_files` is an error: a
/// truncated audit view would silently hide events.
pub fn discover_exports(
    root: &Path,
    config: &DiscoveryConfig,
) -> Result<(Vec<PathBuf>, Vec<String>), DiscoveryError> {
    if !root.exists() {
        return Err(DiscoveryError::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(DiscoveryError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let include = compile_patterns(&config.include_patterns);
    let exclude = compile_patterns(&config.exclude_patterns);

    let mut files = Vec::new();
    let mut warnings = Vec::new();

    let walker = WalkDir::new(root)
        .max_depth(config.max_depth)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !exclude.iter().any(|p| p.matches(&name))
        });

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                warnings.push(format!("Cannot read '{}': {e}", path.display()));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !include.iter().any(|p| p.matches(&name)) {
            continue;
        }

        if files.len() >= config.max_files {
            return Err(DiscoveryError::MaxFilesExceeded {
                max: config.max_files,
            });
        }
        files.push(entry.into_path());
    }

    // Deterministic load order regardless of filesystem iteration order.
    files.sort();

    tracing::debug!(
        root = %root.display(),
        found = files.len(),
        warnings = warnings.len(),
        "Export discovery complete"
    );

    Ok((files, warnings))
}

/// Compile glob patterns, warning on (and skipping) invalid ones.
fn compile_patterns(patterns: &[String]) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|raw| match Pattern::new(raw) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(pattern = raw, error = %e, "Ignoring invalid glob pattern");
                None
            }
        })
        .collect()
}
