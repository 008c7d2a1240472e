// src/control/mod.rs

//! Debian control file paragraphs
//!
//! Control files (`debian/control`, `Packages`, `Sources`) are sequences of
//! RFC 822 style paragraphs separated by blank lines. Field names are
//! case-insensitive.

mod relations;

pub use relations::{Constraint, Operator, Relation, parse_relations};

use crate::error::{Error, Result};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// One control file paragraph: ordered field/value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    fields: Vec<(String, String)>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a paragraph from field/value pairs
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut paragraph = Self::new();
        for (field, value) in fields {
            paragraph.insert(field, value);
        }
        paragraph
    }

    /// Set a field, replacing any existing value with the same name
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self
            .fields
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&field))
        {
            Some(existing) => existing.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    /// Look up a field value (case-insensitive)
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(field))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Iterate fields in stored order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'de> Deserialize<'de> for Paragraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ParagraphVisitor;

        impl<'de> Visitor<'de> for ParagraphVisitor {
            type Value = Paragraph;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a control file paragraph")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Paragraph, A::Error> {
                let mut paragraph = Paragraph::new();
                while let Some((field, value)) = map.next_entry::<String, String>()? {
                    paragraph.insert(field, normalize_value(&value));
                }
                Ok(paragraph)
            }
        }

        deserializer.deserialize_map(ParagraphVisitor)
    }
}

/// Parse control file text into paragraphs
pub fn parse_control(text: &str) -> Result<Vec<Paragraph>> {
    // Comment lines are allowed in debian/control but not by the RFC 822 parser
    let cleaned: String = text
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(|line| format!("{line}\n"))
        .collect();

    let mut paragraphs: Vec<Paragraph> = rfc822_like::from_str(&cleaned)
        .map_err(|e| Error::ParseError(format!("Invalid control file: {e}")))?;
    paragraphs.retain(|p| !p.is_empty());

    debug!("Parsed {} control paragraphs", paragraphs.len());
    Ok(paragraphs)
}

/// Read and parse a control file from disk
pub fn read_control_file(path: &Path) -> Result<Vec<Paragraph>> {
    let text = fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read {}: {e}", path.display())))?;
    parse_control(&text)
}

/// Fold continuation lines into a single line
fn normalize_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
