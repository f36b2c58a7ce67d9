//! Text and JSON rendering of resolution results.

use crate::export::ExportReport;
use crate::resolve::{Diagnostic, Resolution};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Registry table followed by a diagnostics table when there are any.
pub fn format_resolution_text(resolution: &Resolution) -> String {
    let registry = &resolution.registry;
    let mut out = format!("{}\n\n", format_section_heading("Agent SOPs"));

    if registry.is_empty() {
        out.push_str("No SOPs resolved.\n");
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Name", "Source", "Description"]);
        for doc in registry.all() {
            table.add_row(vec![
                doc.name.clone(),
                doc.provenance.to_string(),
                doc.description.clone().unwrap_or_else(|| "-".to_string()),
            ]);
        }
        out.push_str(&format!("{}\n\nTotal: {} SOP(s)\n", table, registry.len()));
    }

    if !resolution.diagnostics.is_empty() {
        out.push_str(&format!("\n{}\n\n", format_section_heading("Diagnostics")));
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Severity", "Kind", "Source", "Name", "Message"]);
        for d in &resolution.diagnostics {
            table.add_row(vec![
                d.severity.to_string(),
                d.kind.as_str().to_string(),
                d.source.to_string(),
                d.name.clone().unwrap_or_else(|| "-".to_string()),
                d.message.clone(),
            ]);
        }
        out.push_str(&format!("{}\n", table));
    }

    out
}

pub fn format_resolution_json(resolution: &Resolution) -> String {
    let sops: Vec<_> = resolution
        .registry
        .all()
        .iter()
        .map(|doc| {
            json!({
                "name": doc.name,
                "description": doc.description,
                "source": doc.provenance.to_string(),
                "location": doc.location,
            })
        })
        .collect();
    let out = json!({
        "sops": sops,
        "total": resolution.registry.len(),
        "diagnostics": resolution.diagnostics,
    });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_export_report(report: &ExportReport) -> String {
    let mut out = String::new();
    for path in &report.written {
        out.push_str(&format!("Created skill: {}\n", path.display()));
    }
    out.push_str(&format!(
        "\n{} skill(s) generated in: {}",
        report.written.len(),
        report.output_dir.display()
    ));
    out
}

/// One line per diagnostic, for stderr.
pub fn format_diagnostic_line(diagnostic: &Diagnostic) -> String {
    if diagnostic.is_error() {
        format!("{} {}", "error:".red().bold(), diagnostic)
    } else {
        format!("{} {}", "warning:".yellow().bold(), diagnostic)
    }
}
