// src/scanner.rs

//! Control file scanning
//!
//! Walks control paragraphs, picks the relation fields that apply to the
//! paragraph kind, and runs every lower-bound relation through the
//! reconciler against the referenced package's stored summary.

use crate::control::{Operator, Paragraph, parse_relations};
use crate::db::SummaryLookup;
use crate::error::{Error, Result};
use crate::reconcile::fix_version;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Build-time relation fields of a source package, in declaration order
pub const SOURCE_FIELDS: &[&str] = &[
    "Build-Depends",
    "Build-Depends-Indep",
    "Build-Depends-Arch",
    "Build-Conflicts",
    "Build-Conflicts-Indep",
    "Build-Conflicts-Arch",
];

/// Runtime relation fields of a binary package, in declaration order
pub const BINARY_FIELDS: &[&str] = &[
    "Pre-Depends",
    "Depends",
    "Recommends",
    "Suggests",
    "Enhances",
    "Breaks",
    "Conflicts",
    "Replaces",
];

/// What a paragraph describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphKind {
    Source,
    Binary,
}

impl ParagraphKind {
    /// Classify a paragraph
    ///
    /// `Package` without `Binary` is a binary package stanza. A `Source`
    /// stanza, or a `Sources` index entry (`Package` plus `Binary`), is a
    /// source package.
    pub fn detect(paragraph: &Paragraph) -> Option<Self> {
        let has_package = paragraph.contains("Package");
        if has_package && !paragraph.contains("Binary") {
            Some(ParagraphKind::Binary)
        } else if has_package || paragraph.contains("Source") {
            Some(ParagraphKind::Source)
        } else {
            None
        }
    }

    /// Relation fields checked for this kind
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            ParagraphKind::Source => SOURCE_FIELDS,
            ParagraphKind::Binary => BINARY_FIELDS,
        }
    }
}

/// A constraint that should carry a newer epoch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Source or binary package the paragraph describes
    pub subject: String,
    pub is_source: bool,
    pub field: String,
    /// Package the relation refers to
    pub package: String,
    pub operator: Operator,
    pub original_version: String,
    pub suggested_version: String,
}

/// Scans paragraphs against a read-only summary lookup
pub struct Scanner<'a, S: SummaryLookup> {
    summaries: &'a S,
}

impl<'a, S: SummaryLookup> Scanner<'a, S> {
    pub fn new(summaries: &'a S) -> Self {
        Self { summaries }
    }

    /// Findings for one paragraph, in field then relation order
    pub fn scan_paragraph(&self, paragraph: &Paragraph) -> Result<Vec<Finding>> {
        let Some(kind) = ParagraphKind::detect(paragraph) else {
            debug!("Skipping paragraph with neither Package nor Source field");
            return Ok(Vec::new());
        };

        let subject = match kind {
            ParagraphKind::Source => paragraph.get("Source").or_else(|| paragraph.get("Package")),
            ParagraphKind::Binary => paragraph.get("Package"),
        }
        .unwrap_or_default()
        .to_string();

        let mut findings = Vec::new();

        for field in kind.fields() {
            let Some(value) = paragraph.get(field) else {
                continue;
            };

            let groups = parse_relations(value)
                .map_err(|e| Error::ParseError(format!("{subject}: {field}: {e}")))?;

            for relation in groups.iter().flatten() {
                let Some(constraint) = relation.constraint.as_ref() else {
                    continue;
                };
                if !constraint.operator.is_lower_bound() || constraint.is_substvar() {
                    continue;
                }
                let Some(summary) = self.summaries.summary(&relation.name)? else {
                    continue;
                };

                let suggested = fix_version(&constraint.version, &summary)?;
                if suggested != constraint.version {
                    debug!(
                        "{}: {} on {} {} {} should be {}",
                        subject, field, relation.name, constraint.operator, constraint.version, suggested
                    );
                    findings.push(Finding {
                        subject: subject.clone(),
                        is_source: kind == ParagraphKind::Source,
                        field: field.to_string(),
                        package: relation.name.clone(),
                        operator: constraint.operator,
                        original_version: constraint.version.clone(),
                        suggested_version: suggested,
                    });
                }
            }
        }

        Ok(findings)
    }

    /// Findings for a sequence of paragraphs, in input order
    pub fn scan(&self, paragraphs: &[Paragraph]) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for paragraph in paragraphs {
            findings.extend(self.scan_paragraph(paragraph)?);
        }
        Ok(findings)
    }

    /// Same as [`Scanner::scan`], spreading paragraphs across threads
    pub fn scan_parallel(&self, paragraphs: &[Paragraph]) -> Result<Vec<Finding>> {
        let per_paragraph = paragraphs
            .par_iter()
            .map(|p| self.scan_paragraph(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(per_paragraph.into_iter().flatten().collect())
    }
}
