//! Output formatting helpers for CLI commands

use crate::debug::{DebugEntry, DebugFilter, DebugPreferences};
use crate::entities::Entity;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// Format the debug call log as a table, newest first.
pub fn format_debug_table(entries: &[DebugEntry], filter: DebugFilter) -> String {
    if entries.is_empty() {
        return format!("No recorded calls (filter: {})", filter);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Method", "Status", "Duration", "URL", "Error"]);

    for e in entries {
        let status = match e.status {
            Some(s) if e.is_success() => s.to_string().green().to_string(),
            Some(s) => s.to_string().red().to_string(),
            None => "-".yellow().to_string(),
        };
        let duration = e
            .duration_ms
            .map(|d| format!("{}ms", d))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(e.timestamp.format("%H:%M:%S%.3f")),
            Cell::new(e.method),
            Cell::new(status),
            Cell::new(duration),
            Cell::new(&e.url),
            Cell::new(e.error.as_deref().unwrap_or("")),
        ]);
    }

    format!("{}\nFilter: {} ({} shown)", table, filter, entries.len())
}

/// Format the debug call log as JSON
pub fn format_debug_json(entries: &[DebugEntry]) -> String {
    serde_json::to_string_pretty(&json!({ "entries": entries }))
        .unwrap_or_else(|_| "{}".to_string())
}

/// Format entities as a table
pub fn format_entities_table(entities: &[Entity]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Type", "Name", "Properties"]);

    for entity in entities {
        table.add_row(vec![
            Cell::new(&entity.id),
            Cell::new(&entity.entity_type),
            Cell::new(&entity.name),
            Cell::new(entity.properties.len()),
        ]);
    }

    table.to_string()
}

/// Format entities as JSON
pub fn format_entities_json(entities: &[Entity]) -> String {
    serde_json::to_string_pretty(&json!({ "entities": entities }))
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn format_preferences(prefs: &DebugPreferences) -> String {
    let state = if prefs.is_open {
        "open".green()
    } else {
        "closed".yellow()
    };
    format!("Debug panel: {}\nFilter: {}", state, prefs.filter)
}
