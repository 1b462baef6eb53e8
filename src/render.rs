// AuditSleuth - render.rs
//
// Plain-text rendering of the audit view: summary line, table of the
// current page, and the single-event detail block.
// Binary-side module; the library knows nothing about presentation.

use auditsleuth::app::state::AppState;
use auditsleuth::core::model::{Category, LoadSummary, LogRecord, Status};
use auditsleuth::util::constants;

/// Render the load summary as a short block.
pub fn render_summary(summary: &LoadSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} events loaded", summary.total));
    if summary.invalid_timestamps > 0 {
        out.push_str(&format!(
            " ({} with unparseable timestamps)",
            summary.invalid_timestamps
        ));
    }
    out.push('\n');

    let statuses: Vec<String> = Status::all()
        .iter()
        .filter_map(|s| {
            summary
                .by_status
                .get(s)
                .map(|count| format!("{}: {count}", s.label()))
        })
        .collect();
    if !statuses.is_empty() {
        out.push_str(&format!("  Status     {}\n", statuses.join("  ")));
    }

    let categories: Vec<String> = Category::all()
        .iter()
        .filter_map(|c| {
            summary
                .by_category
                .get(c)
                .map(|count| format!("{}: {count}", c.label()))
        })
        .collect();
    if !categories.is_empty() {
        out.push_str(&format!("  Category   {}\n", categories.join("  ")));
    }

    out
}

/// Render the current page of the filtered view as a fixed-width table.
pub fn render_table(state: &AppState) -> String {
    let page = state.current_page();
    let mut out = String::new();

    out.push_str(&format!(
        "{:<14} {:<10} {:<8} {:<9} {:<8} {:<15} {:<18} {}\n",
        "EVENT ID", "DATE", "TIME", "ACTION", "STATUS", "CATEGORY", "OPERATOR", "MESSAGE"
    ));

    for &record_idx in page.items {
        let record = &state.records[record_idx];
        out.push_str(&format!(
            "{:<14} {:<10} {:<8} {:<9} {:<8} {:<15} {:<18} {}\n",
            truncate(&record.event_id, 14),
            record.date,
            record.time,
            record.action.label(),
            record.status.label(),
            record.category.label(),
            truncate(&record.operator, 18),
            truncate(&record.message, constants::TABLE_MESSAGE_WIDTH),
        ));
    }

    if page.items.is_empty() {
        out.push_str("  (no events match the current filters)\n");
    }

    out.push_str(&format!(
        "\nPage {} of {}  |  {} of {} events shown\n",
        page.page.min(page.total_pages.max(1)),
        page.total_pages.max(1),
        page.items.len(),
        state.filtered.len(),
    ));

    out
}

/// Render every derived field of one event, plus the full original message.
pub fn render_detail(record: &LogRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("Event     {}\n", record.event_id));
    out.push_str(&format!("Id        {}\n", record.id));
    out.push_str(&format!("Action    {}\n", record.action.label()));
    out.push_str(&format!("Status    {}\n", record.status.label()));
    out.push_str(&format!("Category  {}\n", record.category.label()));
    out.push_str(&format!("Operator  {}\n", record.operator));
    if let Some(ref role) = record.role {
        out.push_str(&format!("Role      {role}\n"));
    }
    out.push_str(&format!("Date      {} {}\n", record.date, record.time));
    if !record.created_at.is_empty() {
        out.push_str(&format!("Recorded  {}\n", record.created_at));
    }
    out.push_str(&format!("Message   {}\n", record.message));
    out
}

/// Truncate to `width` characters, marking the cut with an ellipsis.
/// Character-based so multi-byte text is never split mid-codepoint.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_is_unchanged() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_text_gets_ellipsis() {
        let out = truncate("a very long audit message indeed", 10);
        assert_eq!(out, "a very ...");
        assert_eq!(out.chars().count(), 10);
    }

    #[test]
    fn test_truncate_multibyte_is_safe() {
        let out = truncate("ωωωωωωωωωωωω", 8);
        assert_eq!(out.chars().count(), 8);
        assert!(out.ends_with("..."));
    }
}
