// src/report.rs

//! Rendering of scan findings

use crate::error::Result;
use crate::scanner::Finding;
use std::fmt::Write;
use std::str::FromStr;

/// Output format for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format '{other}' (expected text or json)")),
        }
    }
}

/// Render findings in the requested format
pub fn render(findings: &[Finding], format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(findings)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(findings)? + "\n"),
    }
}

/// Diff-style text: a header per subject, then a -/+ pair per finding
pub fn render_text(findings: &[Finding]) -> String {
    let mut out = String::new();
    let mut current: Option<(&str, bool)> = None;

    for finding in findings {
        let subject = (finding.subject.as_str(), finding.is_source);
        if current != Some(subject) {
            if current.is_some() {
                out.push('\n');
            }
            let label = if finding.is_source { "Source" } else { "Package" };
            let _ = writeln!(out, "{label}: {}", finding.subject);
            current = Some(subject);
        }

        let _ = writeln!(
            out,
            "- {}: {} ({} {})",
            finding.field, finding.package, finding.operator, finding.original_version
        );
        let _ = writeln!(
            out,
            "+ {}: {} ({} {})",
            finding.field, finding.package, finding.operator, finding.suggested_version
        );
    }

    out
}
