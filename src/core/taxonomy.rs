// AuditSleuth - core/taxonomy.rs
//
// Taxonomy rule loading, validation, and first-match-wins lookup.
// Core layer: accepts TOML strings, never touches the filesystem.
// I/O is handled by app::taxonomy_mgr which feeds content here.
//
// A taxonomy is three priority-ordered rule tables (action, status,
// category) plus a list of role overrides. Making the order explicit in
// data keeps rule precedence auditable instead of buried in a chain of
// conditionals.

use crate::core::model::{Action, Category, Status};
use crate::util::constants;
use crate::util::error::TaxonomyError;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// TOML deserialization structures (raw input)
// =============================================================================

/// Raw TOML taxonomy definition as deserialized from a .toml file.
/// This is validated and compiled into a `Taxonomy` for runtime use.
#[derive(Debug, Deserialize)]
pub struct TaxonomyDefinition {
    pub taxonomy: TaxonomyMeta,
    #[serde(default)]
    pub action: Vec<RuleDef>,
    #[serde(default)]
    pub status: Vec<RuleDef>,
    #[serde(default)]
    pub category: Vec<RuleDef>,
    #[serde(default)]
    pub role_override: Vec<RoleOverrideDef>,
}

#[derive(Debug, Deserialize)]
pub struct TaxonomyMeta {
    pub id: String,
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// One `[[action]]` / `[[status]]` / `[[category]]` rule: the target value
/// plus the keywords (and optional regex) that select it.
#[derive(Debug, Deserialize)]
pub struct RuleDef {
    pub value: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub pattern: Option<String>,
}

/// One `[[role_override]]` entry: events from this role category
/// unconditionally, before any message inspection.
#[derive(Debug, Deserialize)]
pub struct RoleOverrideDef {
    pub role: String,
    pub category: String,
}

// =============================================================================
// Runtime representation
// =============================================================================

/// A compiled classification rule. Keywords are stored lowercased; the
/// optional pattern runs against the original message text.
#[derive(Debug, Clone)]
pub struct Rule<T> {
    /// The enumeration member this rule selects.
    pub value: T,

    /// Case-insensitive substring predicates (pre-lowered).
    pub keywords: Vec<String>,

    /// Optional compiled regex predicate.
    pub pattern: Option<Regex>,
}

impl<T: Copy> Rule<T> {
    /// True when any keyword is a substring of the lowered message, or the
    /// pattern matches the raw message.
    fn matches(&self, message_lower: &str, message_raw: &str) -> bool {
        if self.keywords.iter().any(|k| message_lower.contains(k)) {
            return true;
        }
        if let Some(ref pattern) = self.pattern {
            return pattern.is_match(message_raw);
        }
        false
    }
}

/// A compiled role override. Role comparison is case-insensitive.
#[derive(Debug, Clone)]
pub struct RoleOverride {
    /// Pre-lowered role string.
    pub role: String,

    /// Category assigned to every event from this role.
    pub category: Category,
}

/// Runtime representation of a taxonomy after TOML parsing, validation,
/// and regex compilation.
///
/// Built from `TaxonomyDefinition` via `validate_and_compile`.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    /// Unique taxonomy identifier (e.g. "lis-default").
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Taxonomy schema version.
    pub version: String,

    /// Description of what this taxonomy covers.
    pub description: String,

    /// Action rules, evaluated in file order; first match wins.
    pub action_rules: Vec<Rule<Action>>,

    /// Status rules, evaluated in file order; first match wins.
    pub status_rules: Vec<Rule<Status>>,

    /// Category rules, evaluated in file order; first match wins.
    pub category_rules: Vec<Rule<Category>>,

    /// Role overrides, checked before any category rule.
    pub role_overrides: Vec<RoleOverride>,

    /// Whether this is the built-in taxonomy (true) or user-defined (false).
    pub is_builtin: bool,
}

impl Taxonomy {
    /// Derive the action for a message. Falls through to `Action::Create`
    /// when no rule matches.
    pub fn action_for(&self, message: &str) -> Action {
        let lower = message.to_lowercase();
        first_match(&self.action_rules, &lower, message).unwrap_or_default()
    }

    /// Derive the status for a message. Falls through to `Status::Info`
    /// when no rule matches. Status and action are independent passes over
    /// the same message; both may fire.
    pub fn status_for(&self, message: &str) -> Status {
        let lower = message.to_lowercase();
        first_match(&self.status_rules, &lower, message).unwrap_or_default()
    }

    /// Derive the category for an event.
    ///
    /// A matching role override short-circuits message inspection entirely;
    /// otherwise category rules run in order and an unmatched message falls
    /// through to `Category::System`.
    pub fn category_for(&self, role: Option<&str>, message: &str) -> Category {
        if let Some(role) = role {
            let role_lower = role.trim().to_lowercase();
            if let Some(ov) = self.role_overrides.iter().find(|o| o.role == role_lower) {
                return ov.category;
            }
        }
        let lower = message.to_lowercase();
        first_match(&self.category_rules, &lower, message).unwrap_or_default()
    }
}

/// First rule (in table order) that matches the message, if any.
fn first_match<T: Copy>(rules: &[Rule<T>], message_lower: &str, message_raw: &str) -> Option<T> {
    rules
        .iter()
        .find(|rule| rule.matches(message_lower, message_raw))
        .map(|rule| rule.value)
}

// =============================================================================
// Parsing, validation, and compilation
// =============================================================================

/// Parse a TOML string into a `TaxonomyDefinition`.
///
/// `source_path` is used for error messages only (not for I/O).
pub fn parse_taxonomy_toml(
    toml_content: &str,
    source_path: &Path,
) -> Result<TaxonomyDefinition, TaxonomyError> {
    toml::from_str(toml_content).map_err(|e| TaxonomyError::TomlParse {
        path: source_path.to_path_buf(),
        source: e,
    })
}

/// Validate a `TaxonomyDefinition` and compile it into a runtime `Taxonomy`.
///
/// Validates:
/// - Required meta fields are present and non-empty
/// - Every rule names a member of its closed enumeration
/// - Every rule has at least one predicate (keyword or pattern)
/// - Regex patterns are valid and within size limits
/// - The total rule count is bounded
pub fn validate_and_compile(
    def: TaxonomyDefinition,
    is_builtin: bool,
) -> Result<Taxonomy, TaxonomyError> {
    let id = &def.taxonomy.id;

    if id.is_empty() {
        return Err(TaxonomyError::MissingField {
            taxonomy_id: "(empty)".to_string(),
            field: "taxonomy.id",
        });
    }
    if def.taxonomy.name.is_empty() {
        return Err(TaxonomyError::MissingField {
            taxonomy_id: id.clone(),
            field: "taxonomy.name",
        });
    }

    let rule_count = def.action.len() + def.status.len() + def.category.len();
    if rule_count > constants::MAX_TAXONOMY_RULES {
        return Err(TaxonomyError::TooManyRules {
            count: rule_count,
            max: constants::MAX_TAXONOMY_RULES,
        });
    }

    let action_rules = compile_rules(id, "action", &def.action, |v| {
        Action::parse(v)
    })?;
    let status_rules = compile_rules(id, "status", &def.status, |v| {
        Status::parse(v)
    })?;
    let category_rules = compile_rules(id, "category", &def.category, |v| {
        Category::parse(v)
    })?;

    let mut role_overrides = Vec::with_capacity(def.role_override.len());
    for ov in &def.role_override {
        if ov.role.trim().is_empty() {
            return Err(TaxonomyError::MissingField {
                taxonomy_id: id.clone(),
                field: "role_override.role",
            });
        }
        let category =
            Category::parse(&ov.category).ok_or_else(|| TaxonomyError::UnknownValue {
                taxonomy_id: id.clone(),
                table: "role_override",
                value: ov.category.clone(),
            })?;
        role_overrides.push(RoleOverride {
            role: ov.role.trim().to_lowercase(),
            category,
        });
    }

    Ok(Taxonomy {
        id: id.clone(),
        name: def.taxonomy.name,
        version: def.taxonomy.version,
        description: def.taxonomy.description,
        action_rules,
        status_rules,
        category_rules,
        role_overrides,
        is_builtin,
    })
}

/// Compile one rule table, preserving file order.
fn compile_rules<T: Copy>(
    taxonomy_id: &str,
    table: &'static str,
    defs: &[RuleDef],
    parse_value: impl Fn(&str) -> Option<T>,
) -> Result<Vec<Rule<T>>, TaxonomyError> {
    let mut rules = Vec::with_capacity(defs.len());

    for (index, def) in defs.iter().enumerate() {
        let value = parse_value(&def.value).ok_or_else(|| TaxonomyError::UnknownValue {
            taxonomy_id: taxonomy_id.to_string(),
            table,
            value: def.value.clone(),
        })?;

        let keywords: Vec<String> = def
            .keywords
            .iter()
            .map(|k| k.to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let pattern = match def.pattern.as_deref() {
            Some(p) => Some(compile_pattern(taxonomy_id, table, p)?),
            None => None,
        };

        if keywords.is_empty() && pattern.is_none() {
            return Err(TaxonomyError::EmptyRule {
                taxonomy_id: taxonomy_id.to_string(),
                table,
                index,
            });
        }

        rules.push(Rule {
            value,
            keywords,
            pattern,
        });
    }

    Ok(rules)
}

/// Compile a regex pattern with length validation to prevent ReDoS.
fn compile_pattern(
    taxonomy_id: &str,
    table: &'static str,
    pattern: &str,
) -> Result<Regex, TaxonomyError> {
    if pattern.len() > constants::MAX_REGEX_PATTERN_LENGTH {
        return Err(TaxonomyError::RegexTooLong {
            taxonomy_id: taxonomy_id.to_string(),
            table,
            length: pattern.len(),
            max_length: constants::MAX_REGEX_PATTERN_LENGTH,
        });
    }

    Regex::new(pattern).map_err(|e| TaxonomyError::InvalidRegex {
        taxonomy_id: taxonomy_id.to_string(),
        table,
        pattern: pattern.to_string(),
        source: e,
    })
}

// =============================================================================
// Built-in taxonomy (embedded at compile time)
// =============================================================================

/// Embedded TOML content for the built-in LIS taxonomy.
pub const BUILTIN_TAXONOMY_TOML: &str = include_str!("../../rules/default_taxonomy.toml");

/// Load and compile the built-in taxonomy.
///
/// A failure here is a packaging bug, not a runtime condition, but it is
/// still propagated rather than panicking so the caller can fail cleanly.
pub fn load_builtin_taxonomy() -> Result<Taxonomy, TaxonomyError> {
    let path = PathBuf::from("<builtin>/default_taxonomy.toml");
    let def = parse_taxonomy_toml(BUILTIN_TAXONOMY_TOML, &path)?;
    let taxonomy = validate_and_compile(def, true)?;
    tracing::debug!(taxonomy_id = %taxonomy.id, "Loaded built-in taxonomy");
    Ok(taxonomy)
}

// =============================================================================
// Tests
// =============================================================================
