//! Citation style identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Citation style
///
/// Parsing is lenient: any unrecognized identifier falls back to APA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CitationStyle {
    /// APA 7th edition
    #[default]
    Apa,
    /// MLA 9th edition
    Mla,
    /// Chicago style
    Chicago,
}

impl CitationStyle {
    /// All supported styles
    pub const ALL: [CitationStyle; 3] = [
        CitationStyle::Apa,
        CitationStyle::Mla,
        CitationStyle::Chicago,
    ];

    /// Parse a style identifier, falling back to APA
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "mla" => CitationStyle::Mla,
            "chicago" => CitationStyle::Chicago,
            "apa" => CitationStyle::Apa,
            other => {
                if !other.is_empty() {
                    tracing::debug!("Unknown citation style '{}', using APA", other);
                }
                CitationStyle::Apa
            }
        }
    }

    /// Short identifier ("apa", "mla", "chicago")
    pub fn id(&self) -> &'static str {
        match self {
            CitationStyle::Apa => "apa",
            CitationStyle::Mla => "mla",
            CitationStyle::Chicago => "chicago",
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            CitationStyle::Apa => "APA 7th Edition",
            CitationStyle::Mla => "MLA 9th Edition",
            CitationStyle::Chicago => "Chicago Style",
        }
    }

    /// Issuing body
    pub fn description(&self) -> &'static str {
        match self {
            CitationStyle::Apa => "American Psychological Association",
            CitationStyle::Mla => "Modern Language Association",
            CitationStyle::Chicago => "Chicago Manual of Style",
        }
    }
}

impl From<String> for CitationStyle {
    fn from(value: String) -> Self {
        CitationStyle::parse(&value)
    }
}

impl From<&str> for CitationStyle {
    fn from(value: &str) -> Self {
        CitationStyle::parse(value)
    }
}

impl From<CitationStyle> for String {
    fn from(style: CitationStyle) -> Self {
        style.id().to_string()
    }
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
