// AuditSleuth - core/loader.rs
//
// Event payload decoding. Core layer: accepts JSON text, never touches
// the filesystem or the network; file and HTTP I/O live in main and
// app::fetch respectively.
//
// The backend is inconsistent about its envelope: some endpoints answer
// with a bare array, others wrap it as {"data": [...]} or
// {"total": n, "data": [...]}. All three shapes are accepted, preferring
// the data field when present.

use crate::core::model::RawLogRecord;
use crate::util::constants;
use crate::util::error::LoadError;
use serde::Deserialize;

/// An event payload in any of the accepted envelope shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    /// `{"data": [...]}` or `{"total": n, "data": [...]}`. Unknown
    /// wrapper fields are ignored.
    Wrapped {
        #[serde(default)]
        total: Option<u64>,
        data: Vec<RawLogRecord>,
    },

    /// A bare JSON array of events.
    Bare(Vec<RawLogRecord>),
}

/// Decode an event payload into raw records.
///
/// Applies the `MAX_TOTAL_RECORDS` cap: oversized payloads are truncated
/// with a warning rather than rejected, so a runaway export never makes
/// the audit trail unviewable.
pub fn parse_payload(body: &str) -> Result<Vec<RawLogRecord>, LoadError> {
    let payload: Payload =
        serde_json::from_str(body).map_err(|e| LoadError::Json { source: e })?;

    let mut records = match payload {
        Payload::Wrapped { total, data } => {
            if let Some(total) = total {
                if total as usize != data.len() {
                    tracing::debug!(
                        declared = total,
                        received = data.len(),
                        "Payload 'total' disagrees with data length"
                    );
                }
            }
            data
        }
        Payload::Bare(data) => data,
    };

    if records.len() > constants::MAX_TOTAL_RECORDS {
        tracing::warn!(
            received = records.len(),
            max = constants::MAX_TOTAL_RECORDS,
            "Payload exceeds record cap, truncating"
        );
        records.truncate(constants::MAX_TOTAL_RECORDS);
    }

    tracing::debug!(records = records.len(), "Payload decoded");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_array_payload() {
        let body = r#"[
            {"id": "1", "eventId": "EVT-1", "message": "a", "createdAt": "2024-01-01T00:00:00Z"},
            {"id": "2", "eventId": "EVT-2", "message": "b", "createdAt": "2024-01-02T00:00:00Z"}
        ]"#;
        let records = parse_payload(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event_id, "EVT-1");
    }

    #[test]
    fn test_wrapped_payload_prefers_data() {
        let body = r#"{"total": 1, "data": [
            {"id": "1", "eventId": "EVT-1", "message": "a", "createdAt": "2024-01-01T00:00:00Z"}
        ]}"#;
        let records = parse_payload(body).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_wrapped_payload_without_total() {
        let body = r#"{"data": []}"#;
        let records = parse_payload(body).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_wrapper_with_extra_fields_is_tolerated() {
        let body = r#"{"total": 1, "page": 3, "data": [
            {"id": 7, "eventId": "EVT-7", "message": "a", "createdAt": "2024-01-01T00:00:00Z"}
        ]}"#;
        let records = parse_payload(body).unwrap();
        assert_eq!(records[0].id, "7");
    }

    #[test]
    fn test_sparse_records_are_accepted() {
        // Absent performedBy/role/createdAt must not fail the payload.
        let body = r#"[{"id": "1", "eventId": "EVT-1", "message": "a"}]"#;
        let records = parse_payload(body).unwrap();
        assert!(records[0].performed_by.is_none());
        assert!(records[0].created_at.is_empty());
    }

    #[test]
    fn test_invalid_json_is_a_load_error() {
        let result = parse_payload("not json {{{");
        assert!(matches!(result, Err(LoadError::Json { .. })));
    }

    #[test]
    fn test_non_array_shape_is_a_load_error() {
        let result = parse_payload(r#"{"events": []}"#);
        assert!(matches!(result, Err(LoadError::Json { .. })));
    }
}
