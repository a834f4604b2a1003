//! Symbol Label Resolution
//!
//! Maps raw block/symbol names from the drawing to semantic labels such as
//! `GROUND` or `CT`. Graph construction only depends on the
//! [`SymbolResolver`] trait; [`PatternResolver`] is the regex-driven
//! implementation configured from `symbols` in the audit config.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Semantic label of a symbol node.
///
/// Serialized as the upper-case label string; labels the resolver returns
/// that are not one of the known ones are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SymbolLabel {
    Ground,
    Ct,
    Breaker,
    TerminalBox,
    Bus,
    /// Fallback for symbols the resolver does not recognise
    Block,
    Other(String),
}

impl SymbolLabel {
    pub fn as_str(&self) -> &str {
        match self {
            SymbolLabel::Ground => "GROUND",
            SymbolLabel::Ct => "CT",
            SymbolLabel::Breaker => "BREAKER",
            SymbolLabel::TerminalBox => "TERMINAL_BOX",
            SymbolLabel::Bus => "BUS",
            SymbolLabel::Block => "BLOCK",
            SymbolLabel::Other(label) => label,
        }
    }
}

impl From<String> for SymbolLabel {
    fn from(label: String) -> Self {
        match label.as_str() {
            "GROUND" => SymbolLabel::Ground,
            "CT" => SymbolLabel::Ct,
            "BREAKER" => SymbolLabel::Breaker,
            "TERMINAL_BOX" => SymbolLabel::TerminalBox,
            "BUS" => SymbolLabel::Bus,
            "BLOCK" => SymbolLabel::Block,
            _ => SymbolLabel::Other(label),
        }
    }
}

impl From<&str> for SymbolLabel {
    fn from(label: &str) -> Self {
        SymbolLabel::from(label.to_string())
    }
}

impl From<SymbolLabel> for String {
    fn from(label: SymbolLabel) -> Self {
        match label {
            SymbolLabel::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SymbolLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves a raw symbol name to a label.
///
/// Evaluated once per symbol instance during graph construction.
pub trait SymbolResolver {
    fn resolve(&self, name: &str) -> Option<String>;
}

impl<F> SymbolResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// One label and the regular expressions that select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolPatterns {
    pub label: String,
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl SymbolPatterns {
    pub fn new(label: impl Into<String>, patterns: &[&str]) -> Self {
        Self {
            label: label.into(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid pattern {pattern:?} for label {label}: {source}")]
pub struct PatternError {
    pub label: String,
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Ordered, case-insensitive regex resolver.
///
/// Groups are tried in order and the first label with a pattern found
/// anywhere in the name wins.
#[derive(Debug, Clone, Default)]
pub struct PatternResolver {
    groups: Vec<(String, Vec<Regex>)>,
}

impl PatternResolver {
    pub fn new(groups: &[SymbolPatterns]) -> Result<Self, PatternError> {
        let mut compiled = Vec::with_capacity(groups.len());
        for group in groups {
            let mut regexes = Vec::with_capacity(group.patterns.len());
            for pattern in &group.patterns {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| PatternError {
                        label: group.label.clone(),
                        pattern: pattern.clone(),
                        source,
                    })?;
                regexes.push(regex);
            }
            compiled.push((group.label.clone(), regexes));
        }
        Ok(Self { groups: compiled })
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(label, _)| label.as_str())
    }
}

impl SymbolResolver for PatternResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        self.groups
            .iter()
            .find(|(_, regexes)| regexes.iter().any(|r| r.is_match(name)))
            .map(|(label, _)| label.clone())
    }
}
