// AuditSleuth - core/classify.rs
//
// Derivation of classified audit records from raw backend events.
// Core layer: pure logic, no I/O.
//
// classify() is total: any raw event, however sparse or malformed, yields
// a fully populated LogRecord. Unmatched messages fall through to the enum
// defaults and unparseable timestamps degrade to the "N/A" placeholder.

use crate::core::model::{operator_name, LogRecord, RawLogRecord};
use crate::core::taxonomy::Taxonomy;
use crate::util::constants;
use chrono::{DateTime, Utc};
use rayon::prelude::*;

/// Derive a classified record from a raw event under the given taxonomy.
///
/// Classification is a pure function of `(message, role)`: the same input
/// always yields the same action/status/category. Action and status are
/// independent passes over the message; the category pass consults the
/// role overrides first.
pub fn classify(raw: &RawLogRecord, taxonomy: &Taxonomy) -> LogRecord {
    let timestamp = parse_instant(&raw.created_at);
    let (date, time) = match timestamp {
        Some(ts) => (
            ts.format("%Y-%m-%d").to_string(),
            ts.format("%H:%M:%S").to_string(),
        ),
        None => (
            constants::TIMESTAMP_PLACEHOLDER.to_string(),
            constants::TIMESTAMP_PLACEHOLDER.to_string(),
        ),
    };

    LogRecord {
        id: raw.id.clone(),
        event_id: raw.event_id.clone(),
        action: taxonomy.action_for(&raw.message),
        status: taxonomy.status_for(&raw.message),
        category: taxonomy.category_for(raw.role.as_deref(), &raw.message),
        operator: operator_name(raw),
        role: raw.role.clone(),
        timestamp,
        date,
        time,
        message: raw.message.clone(),
        created_at: raw.created_at.clone(),
    }
}

/// Derive a whole batch, preserving input order.
///
/// Batches at or above `PARALLEL_CLASSIFY_THRESHOLD` are classified on the
/// rayon pool; order is still preserved by the indexed collect.
pub fn classify_all(records: &[RawLogRecord], taxonomy: &Taxonomy) -> Vec<LogRecord> {
    if records.len() >= constants::PARALLEL_CLASSIFY_THRESHOLD {
        records
            .par_iter()
            .map(|raw| classify(raw, taxonomy))
            .collect()
    } else {
        records.iter().map(|raw| classify(raw, taxonomy)).collect()
    }
}

/// Parse createdAt as an absolute instant.
///
/// Accepts RFC 3339 / ISO-8601 with any offset; the result is normalised
/// to UTC. Returns `None` rather than raising on malformed input.
fn parse_instant(created_at: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(created_at.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
