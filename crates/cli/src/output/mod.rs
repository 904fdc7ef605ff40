//! Output formatting module for calsort
//!
//! Provides table formatting and JSON rendering for CLI output.

use crate::commands::list::ListedTask;
use crate::commands::show::TaskDetail;
use crate::commands::tagged::TaggedTask;
use calsort_db::{CaldavFilter, DbError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Maximum width for the title column before truncation
const MAX_TITLE_WIDTH: usize = 30;

/// Maximum width for the tags column before truncation
const MAX_TAGS_WIDTH: usize = 20;

/// Message shown for an empty task listing
const NO_TASKS: &str = "No tasks found.";

/// Truncate a string to the specified maximum width, adding ellipsis if needed.
fn truncate(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{}...", kept)
    }
}

/// Render a value as pretty-printed JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, DbError> {
    serde_json::to_string_pretty(value).map_err(|e| DbError::ValidationError {
        message: format!("failed to encode JSON: {}", e),
    })
}

/// Lay out `rows` under `headers` with two spaces between left-aligned columns.
///
/// Produces output in the format:
/// ```text
/// #  ID  Title
/// -  --  -----------
/// 1  3   Buy milk
/// ```
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.chars().count())
        })
        .collect();

    let line = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(line(headers.iter().map(|h| h.to_string()).collect()));
    lines.push(line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    for row in rows {
        lines.push(line(row.clone()));
    }
    lines.join("\n")
}

fn format_instant(instant: Option<DateTime<Utc>>) -> String {
    instant
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| "-".to_string())
}

/// Format tags as a comma-separated string.
fn format_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        "-".to_string()
    } else {
        tags.join(", ")
    }
}

/// Format a calendar listing into an aligned table.
///
/// Columns are display position, task id, stored key (`-` when unordered),
/// creation instant and title.
pub fn format_entry_table(tasks: &[ListedTask]) -> String {
    if tasks.is_empty() {
        return NO_TASKS.to_string();
    }

    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|t| {
            vec![
                t.position.to_string(),
                t.task.to_string(),
                t.order.to_string(),
                format_instant(t.created),
                truncate(&t.title, MAX_TITLE_WIDTH),
            ]
        })
        .collect();

    render_table(&["#", "ID", "Order", "Created", "Title"], &rows)
}

/// Format the tag-filtered listing into an aligned table.
pub fn format_tagged_table(tasks: &[TaggedTask]) -> String {
    if tasks.is_empty() {
        return NO_TASKS.to_string();
    }

    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                truncate(&t.title, MAX_TITLE_WIDTH),
                truncate(&format_tags(&t.tags), MAX_TAGS_WIDTH),
            ]
        })
        .collect();

    render_table(&["ID", "Title", "Tags"], &rows)
}

/// Format an account's filters into an aligned table.
pub fn format_filter_table(filters: &[CaldavFilter]) -> String {
    if filters.is_empty() {
        return "No calendars found.".to_string();
    }

    let rows: Vec<Vec<String>> = filters
        .iter()
        .map(|f| {
            vec![
                truncate(&f.calendar.name, MAX_TITLE_WIDTH),
                f.calendar.uuid.clone(),
                f.count.to_string(),
            ]
        })
        .collect();

    render_table(&["Calendar", "UUID", "Tasks"], &rows)
}

/// Format a task detail view.
pub fn format_task_detail(detail: &TaskDetail) -> String {
    let mut output = vec![
        format!("Task {}: {}", detail.id, detail.title),
        format!("Created:  {}", format_instant(Some(detail.created))),
        format!("Modified: {}", format_instant(Some(detail.modified))),
        format!("Tags:     {}", format_tags(&detail.tags)),
    ];

    match &detail.entry {
        Some(entry) => {
            output.push(format!("Calendar: {}", entry.calendar));
            output.push(format!(
                "Remote:   {}",
                entry.remote_id.as_deref().unwrap_or("-")
            ));
            output.push(format!("Order:    {}", entry.order));
            output.push(format!(
                "Position: {} ({})",
                entry.position,
                format_instant(entry.position_at)
            ));
        }
        None => output.push("Calendar: -".to_string()),
    }

    output.join("\n")
}
