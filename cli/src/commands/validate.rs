//! Scene validation command.

use crate::commands::load_registry;
use crate::{CliResult, ReportFormat};
use diorama_constraint::{load_constraints, Diagnostics, Severity, Validator};
use diorama_scene::Scene;
use std::path::Path;

/// Run validation. Returns the process exit code: 0 when no
/// error-severity diagnostic fired, 1 otherwise.
pub fn run(
    scene_path: &str,
    schemas: &str,
    constraints_dir: &str,
    format: ReportFormat,
) -> CliResult<i32> {
    let registry = load_registry(schemas)?;
    let scene = Scene::load(scene_path, &registry)?;

    if !Path::new(constraints_dir).exists() {
        println!("no constraints found in {}", constraints_dir);
        println!("create constraint files there to enable validation");
        return Ok(0);
    }
    let constraints = load_constraints(constraints_dir)?;

    let diagnostics = Validator::new(&scene, &constraints).validate();

    match format {
        ReportFormat::Text => print_report_text(&diagnostics),
        ReportFormat::Json => print_report_json(&diagnostics),
    }

    Ok(if diagnostics.has_errors() { 1 } else { 0 })
}

fn print_report_text(diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        println!("all constraints passed");
        return;
    }

    println!("{}", diagnostics.summary());
    println!();

    for diagnostic in diagnostics {
        let severity = match diagnostic.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        println!(
            "  [{}] {}: {}",
            severity, diagnostic.entity_name, diagnostic.message
        );
    }
}

fn print_report_json(diagnostics: &Diagnostics) {
    let entries: Vec<serde_json::Value> = diagnostics
        .all()
        .iter()
        .map(|d| {
            serde_json::json!({
                "severity": match d.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                },
                "constraint": d.constraint_name,
                "entity": d.entity_name,
                "message": d.message,
            })
        })
        .collect();

    let report = serde_json::json!({
        "valid": !diagnostics.has_errors(),
        "summary": diagnostics.summary(),
        "errors": diagnostics.error_count(),
        "warnings": diagnostics.warning_count(),
        "diagnostics": entries,
    });

    println!(
        "{}",
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".into())
    );
}
