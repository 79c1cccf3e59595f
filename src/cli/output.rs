//! Output formatting utilities for the CLI.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use serde::Serialize;

use crate::domain::models::ServiceHealth;

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// One row of the probe table.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeRow {
    pub service: String,
    pub url: String,
    pub health: ServiceHealth,
}

/// Render probe results as a table.
pub fn probe_table(rows: &[ProbeRow]) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Service").add_attribute(Attribute::Bold),
            Cell::new("URL").add_attribute(Attribute::Bold),
            Cell::new("Health").add_attribute(Attribute::Bold),
        ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(&row.service),
            Cell::new(&row.url),
            Cell::new(row.health.to_string()).fg(health_color(row.health)),
        ]);
    }

    table.to_string()
}

const fn health_color(health: ServiceHealth) -> Color {
    match health {
        ServiceHealth::Ok => Color::Green,
        ServiceHealth::Timeout => Color::Yellow,
        ServiceHealth::Fail => Color::Red,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_table_lists_every_service() {
        let rows = vec![
            ProbeRow {
                service: "leonardo".to_string(),
                url: "http://localhost:3003".to_string(),
                health: ServiceHealth::Ok,
            },
            ProbeRow {
                service: "risk".to_string(),
                url: "http://localhost:14501".to_string(),
                health: ServiceHealth::Timeout,
            },
        ];

        let rendered = probe_table(&rows);
        assert!(rendered.contains("leonardo"));
        assert!(rendered.contains("risk"));
        assert!(rendered.contains("TIMEOUT"));
    }
}
