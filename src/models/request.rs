//! Inbound request shapes and the paper type / length catalogs.

use serde::{Deserialize, Serialize};

use crate::models::CitationStyle;
use crate::utils::{require_text, ValidationError};

/// Kind of document to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaperType {
    Research,
    Review,
    Essay,
    Thesis,
    Report,
}

impl PaperType {
    /// All known paper types
    pub const ALL: [PaperType; 5] = [
        PaperType::Research,
        PaperType::Review,
        PaperType::Essay,
        PaperType::Thesis,
        PaperType::Report,
    ];

    /// Look up a known paper type
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(id.trim()))
    }

    pub fn id(&self) -> &'static str {
        match self {
            PaperType::Research => "research",
            PaperType::Review => "review",
            PaperType::Essay => "essay",
            PaperType::Thesis => "thesis",
            PaperType::Report => "report",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PaperType::Research => "Research Paper",
            PaperType::Review => "Literature Review",
            PaperType::Essay => "Academic Essay",
            PaperType::Thesis => "Thesis Chapter",
            PaperType::Report => "Technical Report",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PaperType::Research => "Academic research paper with methodology",
            PaperType::Review => "Comprehensive literature review",
            PaperType::Essay => "Structured academic essay",
            PaperType::Thesis => "Thesis or dissertation chapter",
            PaperType::Report => "Technical analysis report",
        }
    }

    /// Opening instruction used in generation prompts
    pub fn instruction(&self) -> &'static str {
        match self {
            PaperType::Research => "Write a comprehensive research paper",
            PaperType::Review => "Write a detailed literature review",
            PaperType::Essay => "Write an academic essay",
            PaperType::Thesis => "Write a thesis chapter",
            PaperType::Report => "Write a technical report",
        }
    }
}

/// Opening instruction for an arbitrary paper type string
pub fn paper_instruction(paper_type: &str) -> &'static str {
    PaperType::from_id(paper_type)
        .map(|t| t.instruction())
        .unwrap_or("Write a research paper")
}

/// Requested document length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LengthTier {
    Short,
    #[default]
    Medium,
    Long,
    Extended,
}

impl LengthTier {
    /// All tiers, shortest first
    pub const ALL: [LengthTier; 4] = [
        LengthTier::Short,
        LengthTier::Medium,
        LengthTier::Long,
        LengthTier::Extended,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            LengthTier::Short => "short",
            LengthTier::Medium => "medium",
            LengthTier::Long => "long",
            LengthTier::Extended => "extended",
        }
    }

    /// Parse a tier, falling back to medium
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "short" => LengthTier::Short,
            "long" => LengthTier::Long,
            "extended" => LengthTier::Extended,
            _ => LengthTier::Medium,
        }
    }

    /// Target word range used in prompts
    pub fn word_range(&self) -> &'static str {
        match self {
            LengthTier::Short => "800-1200 words",
            LengthTier::Medium => "1500-2500 words",
            LengthTier::Long => "3000-5000 words",
            LengthTier::Extended => "5000+ words",
        }
    }
}

/// Capitalize each word the way a title-cased label reads ("thesis-chapter" -> "Thesis-Chapter")
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

fn default_paper_type() -> String {
    PaperType::Research.id().to_string()
}

fn default_length() -> String {
    "medium".to_string()
}

fn default_true() -> bool {
    true
}

/// Request to generate one paper
///
/// `paper_type` and `length` are kept as given so they can be echoed back;
/// unknown values only affect prompt wording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub topic: String,

    #[serde(default = "default_paper_type")]
    pub paper_type: String,

    #[serde(default = "default_length")]
    pub length: String,

    #[serde(default)]
    pub citation_style: CitationStyle,

    #[serde(default = "default_true")]
    pub include_references: bool,
}

impl GenerateRequest {
    /// Create a request with defaults for everything but the topic
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            paper_type: default_paper_type(),
            length: default_length(),
            citation_style: CitationStyle::Apa,
            include_references: true,
        }
    }

    pub fn paper_type(mut self, paper_type: impl Into<String>) -> Self {
        self.paper_type = paper_type.into();
        self
    }

    pub fn length(mut self, length: impl Into<String>) -> Self {
        self.length = length.into();
        self
    }

    pub fn citation_style(mut self, style: CitationStyle) -> Self {
        self.citation_style = style;
        self
    }

    pub fn include_references(mut self, include: bool) -> Self {
        self.include_references = include;
        self
    }

    /// Reject the request before any work starts
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("Topic", Some(&self.topic))?;
        Ok(())
    }

    pub fn length_tier(&self) -> LengthTier {
        LengthTier::parse(&self.length)
    }

    /// Title used when none can be read from the generated body
    pub fn fallback_title(&self) -> String {
        format!("{} on {}", title_case(&self.paper_type), self.topic.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_from_json() {
        let request: GenerateRequest =
            serde_json::from_str(r#"{"topic": "quantum computing"}"#).unwrap();

        assert_eq!(request.paper_type, "research");
        assert_eq!(request.length, "medium");
        assert_eq!(request.citation_style, CitationStyle::Apa);
        assert!(request.include_references);
    }

    #[test]
    fn test_missing_topic_is_rejected() {
        let request: GenerateRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(
            request.validate(),
            Err(ValidationError::MissingField("Topic"))
        );
    }

    #[test]
    fn test_fallback_title() {
        let request = GenerateRequest::new("quantum computing");
        assert_eq!(request.fallback_title(), "Research on quantum computing");

        let request = GenerateRequest::new("soil").paper_type("literature review");
        assert_eq!(request.fallback_title(), "Literature Review on soil");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("research"), "Research");
        assert_eq!(title_case("thesis-chapter"), "Thesis-Chapter");
        assert_eq!(title_case("REPORT"), "Report");
    }

    #[test]
    fn test_catalog_fallbacks() {
        assert_eq!(paper_instruction("essay"), "Write an academic essay");
        assert_eq!(paper_instruction("poem"), "Write a research paper");
        assert_eq!(LengthTier::parse("epic").word_range(), "1500-2500 words");
        assert_eq!(LengthTier::parse("Short").word_range(), "800-1200 words");
    }
}
