// AuditSleuth - app/taxonomy_mgr.rs
//
// Manages loading of classification taxonomies from both the built-in
// source (embedded in the binary) and user-defined TOML files on disk.
// A user taxonomy with the same ID overrides the built-in.

use crate::core::taxonomy::{self, Taxonomy};
use crate::util::constants;
use crate::util::error::TaxonomyError;
use std::path::Path;

/// Load all available taxonomies: built-in first, then user overrides.
///
/// Invalid user files are logged and skipped (non-fatal); a broken rule
/// file must not take the audit viewer down. Only a failure to compile
/// the embedded built-in taxonomy is fatal.
///
/// Returns the merged list and any non-fatal errors encountered.
pub fn load_all_taxonomies(
    user_rules_dir: Option<&Path>,
) -> Result<(Vec<Taxonomy>, Vec<TaxonomyError>), TaxonomyError> {
    let mut taxonomies = vec![taxonomy::load_builtin_taxonomy()?];
    let mut errors = Vec::new();

    if let Some(dir) = user_rules_dir {
        if dir.is_dir() {
            let (user_taxonomies, user_errors) = load_user_taxonomies(dir);
            errors.extend(user_errors);

            for user_taxonomy in user_taxonomies {
                if let Some(pos) = taxonomies.iter().position(|t| t.id == user_taxonomy.id) {
                    tracing::info!(
                        taxonomy_id = %user_taxonomy.id,
                        "User taxonomy overrides built-in"
                    );
                    taxonomies[pos] = user_taxonomy;
                } else {
                    tracing::info!(
                        taxonomy_id = %user_taxonomy.id,
                        "Loaded user-defined taxonomy"
                    );
                    taxonomies.push(user_taxonomy);
                }
            }
        } else {
            tracing::debug!(
                dir = %dir.display(),
                "User rules directory does not exist (skipping)"
            );
        }
    }

    if taxonomies.len() > constants::MAX_TAXONOMIES {
        tracing::warn!(
            count = taxonomies.len(),
            max = constants::MAX_TAXONOMIES,
            "Too many taxonomies loaded, truncating"
        );
        errors.push(TaxonomyError::TooManyTaxonomies {
            count: taxonomies.len(),
            max: constants::MAX_TAXONOMIES,
        });
        taxonomies.truncate(constants::MAX_TAXONOMIES);
    }

    tracing::debug!(total = taxonomies.len(), "Taxonomy loading complete");

    Ok((taxonomies, errors))
}

/// Load user-defined taxonomies from a directory.
fn load_user_taxonomies(dir: &Path) -> (Vec<Taxonomy>, Vec<TaxonomyError>) {
    let mut taxonomies = Vec::new();
    let mut errors = Vec::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            errors.push(TaxonomyError::Io {
                path: dir.to_path_buf(),
                source: e,
            });
            return (taxonomies, errors);
        }
    };

    for entry_result in entries {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                errors.push(TaxonomyError::Io {
                    path: dir.to_path_buf(),
                    source: e,
                });
                continue;
            }
        };

        let path = entry.path();

        // Only process .toml files
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            continue;
        }

        // Check file size before reading
        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                errors.push(TaxonomyError::Io {
                    path: path.clone(),
                    source: e,
                });
                continue;
            }
        };

        if metadata.len() > constants::MAX_TAXONOMY_FILE_SIZE {
            errors.push(TaxonomyError::FileTooLarge {
                path: path.clone(),
                size: metadata.len(),
                max_size: constants::MAX_TAXONOMY_FILE_SIZE,
            });
            continue;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                errors.push(TaxonomyError::Io {
                    path: path.clone(),
                    source: e,
                });
                continue;
            }
        };

        match taxonomy::parse_taxonomy_toml(&content, &path)
            .and_then(|def| taxonomy::validate_and_compile(def, false))
        {
            Ok(t) => taxonomies.push(t),
            Err(e) => errors.push(e),
        }
    }

    (taxonomies, errors)
}

/// Pick the taxonomy to classify with: a requested id if present,
/// otherwise the built-in default.
pub fn select_taxonomy<'a>(
    taxonomies: &'a [Taxonomy],
    requested_id: Option<&str>,
) -> Option<&'a Taxonomy> {
    match requested_id {
        Some(id) => taxonomies.iter().find(|t| t.id == id),
        None => taxonomies
            .iter()
            .find(|t| t.is_builtin)
            .or_else(|| taxonomies.first()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const USER_OVERRIDE_TOML: &str = r#"
[taxonomy]
id = "lis-default"
name = "Site Override"

[[action]]
value = "delete"
keywords = ["discard"]
"#;

    const USER_EXTRA_TOML: &str = r#"
[taxonomy]
id = "site-extra"
name = "Site Extra"

[[status]]
value = "warning"
keywords = ["deviation"]
"#;

    #[test]
    fn test_builtin_only_when_no_user_dir() {
        let (taxonomies, errors) = load_all_taxonomies(None).unwrap();
        assert_eq!(taxonomies.len(), 1);
        assert!(taxonomies[0].is_builtin);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_user_taxonomy_overrides_builtin_by_id() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("override.toml"), USER_OVERRIDE_TOML).unwrap();

        let (taxonomies, errors) = load_all_taxonomies(Some(dir.path())).unwrap();
        assert!(errors.is_empty());
        assert_eq!(taxonomies.len(), 1);
        assert_eq!(taxonomies[0].name, "Site Override");
        assert!(!taxonomies[0].is_builtin);
    }

    #[test]
    fn test_additional_user_taxonomy_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("extra.toml"), USER_EXTRA_TOML).unwrap();

        let (taxonomies, _) = load_all_taxonomies(Some(dir.path())).unwrap();
        assert_eq!(taxonomies.len(), 2);
        assert!(taxonomies.iter().any(|t| t.id == "site-extra"));
    }

    #[test]
    fn test_invalid_user_file_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.toml"), "not [ valid toml").unwrap();
        fs::write(dir.path().join("extra.toml"), USER_EXTRA_TOML).unwrap();

        let (taxonomies, errors) = load_all_taxonomies(Some(dir.path())).unwrap();
        assert_eq!(taxonomies.len(), 2);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], TaxonomyError::TomlParse { .. }));
    }

    #[test]
    fn test_non_toml_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.txt"), "hello").unwrap();

        let (taxonomies, errors) = load_all_taxonomies(Some(dir.path())).unwrap();
        assert_eq!(taxonomies.len(), 1);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_oversized_user_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let big = format!(
            "{USER_EXTRA_TOML}\n# {}",
            "x".repeat(constants::MAX_TAXONOMY_FILE_SIZE as usize)
        );
        fs::write(dir.path().join("big.toml"), big).unwrap();

        let (taxonomies, errors) = load_all_taxonomies(Some(dir.path())).unwrap();
        assert_eq!(taxonomies.len(), 1);
        assert!(matches!(errors[0], TaxonomyError::FileTooLarge { .. }));
    }

    #[test]
    fn test_select_taxonomy() {
        let (taxonomies, _) = load_all_taxonomies(None).unwrap();
        assert!(select_taxonomy(&taxonomies, None).is_some());
        assert!(select_taxonomy(&taxonomies, Some("lis-default")).is_some());
        assert!(select_taxonomy(&taxonomies, Some("missing")).is_none());
    }
}
