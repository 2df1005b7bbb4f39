//! Rendering of application rows for the terminal.

use netapp_core::lifecycle::LifecycleFlags;
use netapp_core::{ApplicationRecord, PlatformResolver};
use serde_json::{json, Value};

pub struct Row {
    pub id: String,
    pub name: String,
    pub phase: String,
    pub version: String,
    pub action: &'static str,
    pub enabled: bool,
    pub status: Option<String>,
    pub flags: LifecycleFlags,
}

pub fn rows(resolver: &PlatformResolver, records: &[ApplicationRecord]) -> Vec<Row> {
    records
        .iter()
        .map(|record| {
            let action = record.primary_action(true);
            Row {
                id: record.id.clone(),
                name: resolver.display_name(record),
                phase: record.phase.kind().to_string(),
                version: record.current_version.clone().unwrap_or_else(|| "-".to_string()),
                action: action.action.label(),
                enabled: action.enabled,
                status: action.status_message,
                flags: record.flags(),
            }
        })
        .collect()
}

pub fn to_table(rows: &[Row]) -> String {
    let name_width = rows
        .iter()
        .map(|row| row.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut out = format!(
        "{:<name_width$}  {:<14}  {:<14}  {}\n",
        "NAME", "STATE", "VERSION", "ACTION"
    );
    for row in rows {
        let action = if row.enabled {
            row.action.to_string()
        } else {
            format!("({})", row.action)
        };
        out.push_str(&format!(
            "{:<name_width$}  {:<14}  {:<14}  {}",
            row.name, row.phase, row.version, action
        ));
        if let Some(status) = &row.status {
            out.push_str(&format!("  {}", status));
        }
        out.push('\n');
    }
    out
}

pub fn to_json(rows: &[Row]) -> Value {
    Value::Array(
        rows.iter()
            .map(|row| {
                json!({
                    "id": row.id,
                    "name": row.name,
                    "phase": row.phase,
                    "currentVersion": row.version,
                    "action": row.action,
                    "enabled": row.enabled,
                    "status": row.status,
                    "flags": row.flags,
                })
            })
            .collect(),
    )
}
