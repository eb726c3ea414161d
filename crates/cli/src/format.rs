//! Output formatting for CLI results.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use distlog::{CompactionStats, LogEntry, LogStats, Value};
use serde_json::{json, Map, Value as Json};

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One line per entry
    Human,
    /// Machine-readable JSON
    Json,
}

/// Result of one command.
#[derive(Debug)]
pub enum Output {
    /// Zero or more entries
    Entries(Vec<LogEntry>),
    /// A single optional entry
    Entry(Option<LogEntry>),
    /// Acknowledgement of a mutation
    Done(String),
    /// Row counts
    Stats(LogStats),
    /// Compaction summary
    Compacted(CompactionStats),
}

/// Render an output in the requested mode.
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => format_human(output),
        OutputMode::Json => format_json(output).to_string(),
    }
}

/// Render an error in the requested mode.
pub fn format_error(message: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => format!("(error) {}", message),
        OutputMode::Json => json!({ "error": message }).to_string(),
    }
}

// =========================================================================
// Human
// =========================================================================

fn format_human(output: &Output) -> String {
    match output {
        Output::Entries(entries) if entries.is_empty() => "(empty)".to_string(),
        Output::Entries(entries) => entries
            .iter()
            .map(entry_line)
            .collect::<Vec<_>>()
            .join("\n"),
        Output::Entry(Some(entry)) => entry_line(entry),
        Output::Entry(None) => "(nil)".to_string(),
        Output::Done(message) => message.clone(),
        Output::Stats(stats) => format!(
            "entries: {}\npending (all): {}\npending (source): {}\nerrored (all): {}\nerrored (source): {}",
            stats.entries,
            stats.pending_all,
            stats.pending_source,
            stats.errored_all,
            stats.errored_source
        ),
        Output::Compacted(stats) => format!(
            "compacted {} entries: {} -> {} bytes",
            stats.entries, stats.bytes_before, stats.bytes_after
        ),
    }
}

fn entry_line(entry: &LogEntry) -> String {
    let changes = entry
        .changes
        .iter()
        .map(|(field, value)| format!("{}={}", field, value))
        .collect::<Vec<_>>()
        .join(" ");
    let mut line = format!(
        "{} {} {} {}#{} [{}]",
        entry.id,
        entry.created_at.to_rfc3339(),
        entry.action,
        entry.subject_type,
        entry.subject_id,
        changes
    );
    if !entry.messages.is_empty() {
        line.push_str(&format!(" messages={:?}", entry.messages.as_str()));
    }
    if entry.error {
        line.push_str(" ERRORED");
        if let Some(at) = entry.processed_at {
            line.push_str(&format!(" at {}", at.to_rfc3339()));
        }
    }
    line
}

// =========================================================================
// JSON
// =========================================================================

fn format_json(output: &Output) -> Json {
    match output {
        Output::Entries(entries) => Json::Array(entries.iter().map(entry_json).collect()),
        Output::Entry(Some(entry)) => entry_json(entry),
        Output::Entry(None) => Json::Null,
        Output::Done(message) => json!({ "ok": message }),
        Output::Stats(stats) => json!({
            "entries": stats.entries,
            "pending_all": stats.pending_all,
            "pending_source": stats.pending_source,
            "errored_all": stats.errored_all,
            "errored_source": stats.errored_source,
        }),
        Output::Compacted(stats) => json!({
            "entries": stats.entries,
            "bytes_before": stats.bytes_before,
            "bytes_after": stats.bytes_after,
        }),
    }
}

fn entry_json(entry: &LogEntry) -> Json {
    let changes: Map<String, Json> = entry
        .changes
        .iter()
        .map(|(field, value)| (field.clone(), value_json(value)))
        .collect();
    json!({
        "id": entry.id.as_u64(),
        "subject_type": entry.subject_type.as_str(),
        "subject_id": entry.subject_id.as_str(),
        "client_id": entry.client_id,
        "action": entry.action.as_str(),
        "changes": changes,
        "messages": entry.messages.as_str(),
        "error": entry.error,
        "processed_at": entry.processed_at.map(|at| at.to_rfc3339()),
        "created_at": entry.created_at.to_rfc3339(),
    })
}

/// Attribute value as plain JSON; bytes become base64 strings
fn value_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::String(s) => Json::String(s.clone()),
        Value::Bytes(bytes) => Json::String(STANDARD.encode(bytes)),
        Value::Array(items) => Json::Array(items.iter().map(value_json).collect()),
        Value::Object(map) => Json::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), value_json(v)))
                .collect(),
        ),
    }
}
