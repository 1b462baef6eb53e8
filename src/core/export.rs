// AuditSleuth - core/export.rs
//
// CSV and JSON export of the filtered audit view.
// Core layer: writes to any Write trait object; path resolution and file
// creation are the caller's concern.

use crate::core::model::LogRecord;
use crate::util::constants;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Export format, inferred from the target file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Infer the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(ExportError::UnknownFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Export records in the given format, returning the number written.
///
/// Rejects sets above `MAX_EXPORT_ENTRIES` so a misfiltered export cannot
/// run away; the caller is told to narrow the filter instead.
pub fn export<W: Write>(
    records: &[&LogRecord],
    format: ExportFormat,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    if records.len() > constants::MAX_EXPORT_ENTRIES {
        return Err(ExportError::TooManyEntries {
            count: records.len(),
            max: constants::MAX_EXPORT_ENTRIES,
        });
    }

    match format {
        ExportFormat::Csv => export_csv(records, writer, export_path),
        ExportFormat::Json => export_json(records, writer, export_path),
    }
}

/// Export records to CSV.
///
/// Columns: event_id, date, time, action, status, category, operator, message
fn export_csv<W: Write>(
    records: &[&LogRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "event_id", "date", "time", "action", "status", "category", "operator", "message",
        ])
        .map_err(|e| ExportError::Csv {
            path: export_path.to_path_buf(),
            source: e,
        })?;

    let mut count = 0;
    for record in records {
        csv_writer
            .write_record([
                record.event_id.as_str(),
                record.date.as_str(),
                record.time.as_str(),
                record.action.label(),
                record.status.label(),
                record.category.label(),
                record.operator.as_str(),
                record.message.as_str(),
            ])
            .map_err(|e| ExportError::Csv {
                path: export_path.to_path_buf(),
                source: e,
            })?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Export records to JSON (pretty-printed array of derived objects).
fn export_json<W: Write>(
    records: &[&LogRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, records).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Action, Category, Status};
    use std::path::PathBuf;

    fn make_record(event_id: &str, message: &str) -> LogRecord {
        LogRecord {
            id: event_id.to_string(),
            event_id: event_id.to_string(),
            action: Action::Delete,
            status: Status::Error,
            category: Category::TestOrder,
            operator: "Dr. Chen".to_string(),
            role: Some("doctor".to_string()),
            timestamp: None,
            date: "N/A".to_string(),
            time: "N/A".to_string(),
            message: message.to_string(),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_csv_export() {
        let a = make_record("EVT-1", "Order deleted");
        let b = make_record("EVT-2", "Sample removed, see note");
        let records = vec![&a, &b];

        let mut buf = Vec::new();
        let count = export(
            &records,
            ExportFormat::Csv,
            &mut buf,
            &PathBuf::from("out.csv"),
        )
        .unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("event_id,date,time,action,status,category,operator,message"));
        assert!(output.contains("Order deleted"));
        // Embedded comma must be quoted, not split.
        assert!(output.contains("\"Sample removed, see note\""));
    }

    #[test]
    fn test_json_export() {
        let a = make_record("EVT-1", "Order deleted");
        let records = vec![&a];

        let mut buf = Vec::new();
        let count = export(
            &records,
            ExportFormat::Json,
            &mut buf,
            &PathBuf::from("out.json"),
        )
        .unwrap();
        assert_eq!(count, 1);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("\"Test Order\""));
        assert!(output.contains("Order deleted"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ExportFormat::from_path(&PathBuf::from("a.csv")).unwrap(),
            ExportFormat::Csv
        );
        assert_eq!(
            ExportFormat::from_path(&PathBuf::from("a.JSON")).unwrap(),
            ExportFormat::Json
        );
        assert!(matches!(
            ExportFormat::from_path(&PathBuf::from("a.xlsx")),
            Err(ExportError::UnknownFormat { .. })
        ));
    }
}
