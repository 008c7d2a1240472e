// src/control/relations.rs

//! Dependency relation field grammar
//!
//! Format: `alt | alt, alt, ...` where each alternative is
//! `name[:arch] [(op version)] [[arch list]] [<profiles>]`.
//! Architecture lists and build profiles are accepted but ignored.

use crate::error::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

static RELATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<name>[A-Za-z0-9][A-Za-z0-9+.\-]*)(?::(?P<arch>[A-Za-z0-9\-]+))?\s*(?:\(\s*(?P<op><<|<=|>=|>>|=|<|>)\s*(?P<version>[0-9A-Za-z$][^\s)]*)\s*\))?\s*(?:\[[^\]]*\])?\s*(?:<.*>)?$",
    )
    .expect("relation regex is valid")
});

/// Relational operator of a versioned dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    #[serde(rename = "<<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = ">>")]
    Gt,
}

impl Operator {
    /// Parse an operator, normalizing the loose `<` and `>` to `<<` and `>>`
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "<<" | "<" => Some(Operator::Lt),
            "<=" => Some(Operator::Le),
            "=" => Some(Operator::Eq),
            ">=" => Some(Operator::Ge),
            ">>" | ">" => Some(Operator::Gt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Lt => "<<",
            Operator::Le => "<=",
            Operator::Eq => "=",
            Operator::Ge => ">=",
            Operator::Gt => ">>",
        }
    }

    /// True for operators that express "at least this version"
    pub fn is_lower_bound(&self) -> bool {
        self.as_str().starts_with('>')
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Version restriction attached to a relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub operator: Operator,
    pub version: String,
}

impl Constraint {
    /// True when the version is a substitution variable such as `${binary:Version}`
    pub fn is_substvar(&self) -> bool {
        self.version.starts_with("${")
    }
}

/// A single alternative in a dependency field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// The alternative as written, trimmed
    pub raw: String,
    pub name: String,
    pub arch_qualifier: Option<String>,
    pub constraint: Option<Constraint>,
}

impl Relation {
    /// Parse one alternative; `Ok(None)` for substitution variables
    pub fn parse(s: &str) -> Result<Option<Self>> {
        let s = s.trim();
        if s.starts_with("${") {
            return Ok(None);
        }

        let caps = RELATION_RE
            .captures(s)
            .ok_or_else(|| Error::ParseError(format!("Invalid dependency relation '{s}'")))?;

        let constraint = match (caps.name("op"), caps.name("version")) {
            (Some(op), Some(version)) => Some(Constraint {
                operator: Operator::parse(op.as_str()).ok_or_else(|| {
                    Error::ParseError(format!("Unknown operator '{}' in '{s}'", op.as_str()))
                })?,
                version: version.as_str().to_string(),
            }),
            _ => None,
        };

        Ok(Some(Self {
            raw: s.to_string(),
            name: caps["name"].to_string(),
            arch_qualifier: caps.name("arch").map(|m| m.as_str().to_string()),
            constraint,
        }))
    }

    /// Operator, if versioned
    pub fn operator(&self) -> Option<Operator> {
        self.constraint.as_ref().map(|c| c.operator)
    }

    /// Version, if versioned
    pub fn version(&self) -> Option<&str> {
        self.constraint.as_ref().map(|c| c.version.as_str())
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(ref arch) = self.arch_qualifier {
            write!(f, ":{arch}")?;
        }
        if let Some(ref c) = self.constraint {
            write!(f, " ({} {})", c.operator, c.version)?;
        }
        Ok(())
    }
}

/// Parse a relation field into alternative groups
///
/// Empty groups and substitution variables are dropped.
pub fn parse_relations(field: &str) -> Result<Vec<Vec<Relation>>> {
    let mut groups = Vec::new();

    for group in field.split(',') {
        if group.trim().is_empty() {
            continue;
        }
        let mut alternatives = Vec::new();
        for alternative in group.split('|') {
            if let Some(relation) = Relation::parse(alternative)? {
                alternatives.push(relation);
            }
        }
        if !alternatives.is_empty() {
            groups.push(alternatives);
        }
    }

    Ok(groups)
}
