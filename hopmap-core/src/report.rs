// Report generation from resolved routes.

use crate::map::{MapDocument, MapOptions};
use hopmap_resolver::Location;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Html,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "html" | "map" => Some(ReportFormat::Html),
            _ => None,
        }
    }
}

/// One pipeline run: how many addresses the table yielded, and the subset
/// that resolved to plottable locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteReport {
    pub discovered: usize,
    pub locations: Vec<Location>,
}

impl RouteReport {
    pub fn new(discovered: usize, locations: Vec<Location>) -> Self {
        Self {
            discovered,
            locations,
        }
    }

    pub fn resolved(&self) -> usize {
        self.locations.len()
    }

    pub fn unresolved(&self) -> usize {
        self.discovered.saturating_sub(self.locations.len())
    }
}

pub fn generate_text_report(data: &RouteReport) -> String {
    let mut report = String::new();

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Addresses discovered: {}\n", data.discovered));
    report.push_str(&format!("  Addresses resolved:   {}\n", data.resolved()));
    report.push_str(&format!("  Addresses excluded:   {}\n", data.unresolved()));
    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    if data.locations.is_empty() {
        report.push_str("No hops resolved to a location.\n");
        return report;
    }

    report.push_str("# Route:\n");
    for (index, location) in data.locations.iter().enumerate() {
        report.push_str(&format!(
            "  [{}] {}  ({}, {})\n",
            index + 1,
            location.ip,
            location.latitude,
            location.longitude
        ));
    }

    report
}

pub fn generate_json_report(data: &RouteReport) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "hopmap",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": {
                "discovered": data.discovered,
                "resolved": data.resolved(),
                "excluded": data.unresolved()
            },
            "locations": data.locations
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_html_report(data: &RouteReport, options: MapOptions) -> String {
    MapDocument::new(options)
        .with_locations(data.locations.clone())
        .render()
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
