//! Export serialization
//!
//! Turns completed task records into CSV, Markdown, or a tab-delimited
//! spreadsheet encoding. Serialization is total over well-formed records:
//! missing optional sub-fields degrade to empty cells, list-valued fields
//! are flattened with `"; "`.

use anyhow::{Context, Result};
use chrono::Utc;

use crate::api::models::{ExtractedContent, TaskRecord, TaskStatus};

/// Joins list-valued sub-fields (image lists, tags) into one cell.
pub const LIST_SEPARATOR: &str = "; ";

/// UTF-8 byte order mark, prepended to CSV and delimited-text exports so
/// spreadsheet applications pick up the encoding.
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Comma-separated, quoted text fields.
    Csv,
    /// Heading-per-record document.
    Markdown,
    /// Tab-separated text, no quoting.
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "md",
            ExportFormat::Text => "txt",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Text => "text",
        };
        f.write_str(name)
    }
}

/// A serialized export: raw bytes plus a date-stamped filename.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
}

const COLUMNS: &[&str] = &[
    "task_id",
    "url",
    "kind",
    "status",
    "created_at",
    "updated_at",
    "title",
    "author",
    "content",
    "images",
    "tags",
    "likes",
    "comments",
    "collects",
    "shares",
    "error",
];

/// Statuses worth exporting: terminal rows, which are the only ones whose
/// payload is settled.
pub fn exportable(records: &[TaskRecord]) -> Vec<TaskRecord> {
    records
        .iter()
        .filter(|r| r.status.is_terminal() || r.status == TaskStatus::Failed)
        .cloned()
        .collect()
}

/// One record flattened into cells, in `COLUMNS` order.
fn row_cells(record: &TaskRecord) -> Vec<String> {
    let content = record.extracted_content().unwrap_or_default();
    let ExtractedContent {
        title,
        content: body,
        author,
        images,
        tags,
        like_count,
        comment_count,
        collect_count,
        share_count,
    } = content;

    vec![
        record.id.clone(),
        record.url.clone(),
        record.kind.to_string(),
        record.status.to_string(),
        record.created_at.to_rfc3339(),
        record.updated_at.to_rfc3339(),
        title,
        author.map(|a| a.name).unwrap_or_default(),
        body,
        images.join(LIST_SEPARATOR),
        tags.join(LIST_SEPARATOR),
        like_count.to_string(),
        comment_count.to_string(),
        collect_count.to_string(),
        share_count.to_string(),
        record.error.clone().unwrap_or_default(),
    ]
}

/// Serialize records into the requested format. The filename embeds the
/// current ISO date.
pub fn export(records: &[TaskRecord], format: ExportFormat) -> Result<ExportArtifact> {
    let bytes = match format {
        ExportFormat::Csv => to_csv(records)?,
        ExportFormat::Markdown => to_markdown(records).into_bytes(),
        ExportFormat::Text => to_delimited_text(records).into_bytes(),
    };
    let filename = format!(
        "watchdesk-export-{}.{}",
        Utc::now().format("%Y-%m-%d"),
        format.extension()
    );
    Ok(ExportArtifact { filename, bytes })
}

fn to_csv(records: &[TaskRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(COLUMNS)
        .context("Failed to write CSV header")?;
    for record in records {
        writer
            .write_record(row_cells(record))
            .with_context(|| format!("Failed to write CSV row for task {}", record.id))?;
    }
    let inner = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e))?;

    let mut bytes = Vec::with_capacity(inner.len() + UTF8_BOM.len());
    bytes.extend_from_slice(UTF8_BOM);
    bytes.extend_from_slice(&inner);
    Ok(bytes)
}

fn to_markdown(records: &[TaskRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# Watchdesk export ({} records)\n",
        records.len()
    ));
    for record in records {
        let content = record.extracted_content().unwrap_or_default();
        let heading = if content.title.is_empty() {
            record.id.clone()
        } else {
            content.title.clone()
        };
        out.push('\n');
        out.push_str(&format!("## {}\n\n", heading));
        out.push_str(&format!("- URL: {}\n", record.url));
        out.push_str(&format!("- Kind: {}\n", record.kind));
        out.push_str(&format!("- Status: {}\n", record.status));
        if let Some(author) = &content.author {
            out.push_str(&format!("- Author: {}\n", author.name));
        }
        if !content.tags.is_empty() {
            out.push_str(&format!("- Tags: {}\n", content.tags.join(LIST_SEPARATOR)));
        }
        if !content.images.is_empty() {
            out.push_str(&format!(
                "- Images: {}\n",
                content.images.join(LIST_SEPARATOR)
            ));
        }
        if let Some(error) = &record.error {
            out.push_str(&format!("- Error: {}\n", error));
        }
        if !content.content.is_empty() {
            out.push('\n');
            out.push_str(&content.content);
            out.push('\n');
        }
    }
    out
}

/// Tab-separated cells carry no quoting, so embedded tabs and line breaks
/// are collapsed to single spaces.
fn sanitize_cell(cell: &str) -> String {
    cell.replace(['\t', '\n', '\r'], " ")
}

fn to_delimited_text(records: &[TaskRecord]) -> String {
    let mut out = String::from("\u{feff}");
    out.push_str(&COLUMNS.join("\t"));
    out.push('\n');
    for record in records {
        let cells: Vec<String> = row_cells(record).iter().map(|c| sanitize_cell(c)).collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    use crate::api::models::TaskKind;

    fn completed_record(id: &str, result: serde_json::Value) -> TaskRecord {
        TaskRecord {
            id: id.to_string(),
            kind: TaskKind::ContentExtract,
            url: format!("https://www.xiaohongshu.com/explore/{}", id),
            status: TaskStatus::Completed,
            monitor_interval: None,
            progress: 100,
            error: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            result: Some(result),
        }
    }

    #[test]
    fn csv_round_trips_field_values() {
        let record = completed_record(
            "t-1",
            json!({
                "title": "Quote \"test\", with comma",
                "content": "line one\nline two",
                "author": { "id": "a-1", "name": "小红" },
                "images": ["a.jpg", "b.jpg"]
            }),
        );
        let artifact = export(&[record], ExportFormat::Csv).unwrap();
        assert!(artifact.bytes.starts_with(b"\xef\xbb\xbf"));

        let mut reader = csv::Reader::from_reader(&artifact.bytes[3..]);
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "task_id");

        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[0], "t-1");
        assert_eq!(&row[6], "Quote \"test\", with comma");
        assert_eq!(&row[7], "小红");
        assert_eq!(&row[8], "line one\nline two");
        assert_eq!(&row[9], "a.jpg; b.jpg");
    }

    #[test]
    fn missing_author_degrades_to_empty_cell() {
        let record = completed_record("t-2", json!({ "title": "No author" }));
        let artifact = export(&[record], ExportFormat::Csv).unwrap();
        let mut reader = csv::Reader::from_reader(&artifact.bytes[3..]);
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[7], "");
        assert_eq!(&row[9], "");
    }

    #[test]
    fn delimited_text_collapses_tabs_and_newlines() {
        let record = completed_record(
            "t-3",
            json!({ "title": "Tab\there", "content": "first\nsecond" }),
        );
        let artifact = export(&[record], ExportFormat::Text).unwrap();
        let text = String::from_utf8(artifact.bytes).unwrap();
        let data_line = text.lines().nth(1).unwrap();
        assert!(data_line.contains("Tab here"));
        assert!(data_line.contains("first second"));
    }

    #[test]
    fn markdown_has_heading_per_record() {
        let records = vec![
            completed_record("t-4", json!({ "title": "First" })),
            completed_record("t-5", json!({})),
        ];
        let artifact = export(&records, ExportFormat::Markdown).unwrap();
        let text = String::from_utf8(artifact.bytes).unwrap();
        assert!(text.contains("## First"));
        // Untitled records fall back to the task id.
        assert!(text.contains("## t-5"));
    }

    #[test]
    fn filename_embeds_current_date() {
        let artifact = export(&[], ExportFormat::Csv).unwrap();
        let date = Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(artifact.filename, format!("watchdesk-export-{}.csv", date));
    }

    #[test]
    fn exportable_filters_to_settled_rows() {
        let mut processing = completed_record("t-6", json!({}));
        processing.status = TaskStatus::Processing;
        let completed = completed_record("t-7", json!({}));
        let rows = exportable(&[processing, completed]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "t-7");
    }
}
