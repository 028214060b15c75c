//! Research extras built on the generator.
//!
//! Gap analysis, counterarguments and funding proposals stand alone; the
//! enhanced paper bundles a full document with all of them plus its
//! quality score.

use serde::Serialize;

use crate::generation::prompts::{
    counterarguments_prompt, impact_prompt, methodology_prompt, peer_review_prompt,
    proposal_outline_prompt, research_gaps_prompt,
};
use crate::generation::GenerationError;
use crate::models::{DocumentAggregate, GenerateRequest};
use crate::utils::{require_text, ValidationError};

use super::analytics::{improvement_suggestions, quality_score, QualityScore};
use super::assembler::Assembler;

/// Funding type used when the caller provides none
pub const DEFAULT_FUNDING_TYPE: &str = "academic";

/// Field named in the enhanced paper's methodology request
const METHODOLOGY_FIELD: &str = "academic";

/// Findings named in the enhanced paper's impact request
const PAPER_FINDINGS: &str = "preliminary findings";

/// Field named in the proposal's methodology request
const PROPOSAL_FIELD: &str = "research";

/// Findings named in the proposal's impact request
const PROPOSAL_FINDINGS: &str = "proposed research";

/// Field named in the peer review checklist request
const REVIEW_FIELD: &str = "general";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearchGaps {
    pub success: bool,
    pub topic: String,
    pub research_gaps: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Counterarguments {
    pub success: bool,
    pub main_argument: String,
    pub topic: String,
    pub counterarguments: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outline, methodology and impact sections for a funding application
///
/// All three sections come from one run; if any request fails the proposal
/// carries only the error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResearchProposal {
    pub success: bool,
    pub research_idea: String,
    pub funding_type: String,
    pub proposal_outline: String,
    pub methodology: String,
    pub impact_assessment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A full document plus research extras and its quality score
///
/// Serializes as the document's own fields followed by the extras.
#[derive(Debug, Clone, Serialize)]
pub struct EnhancedPaper {
    #[serde(flatten)]
    pub document: DocumentAggregate,
    pub research_gaps: String,
    pub methodology_suggestions: String,
    pub impact_assessment: String,
    pub quality_score: QualityScore,
    pub improvement_suggestions: Vec<String>,
    pub peer_review_checklist: String,
}

impl Assembler {
    /// Generate one section, embedding a failure as text
    async fn section(&self, label: &str, prompt: &str) -> String {
        match self.generator().complete(prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Generating {} failed: {}", label, e);
                format!("Error generating {}: {}", label, e)
            }
        }
    }

    /// Gaps, trends and future directions for a topic
    pub async fn research_gaps(&self, topic: &str) -> Result<ResearchGaps, ValidationError> {
        let topic = require_text("Topic", Some(topic))?;
        tracing::info!("Finding research gaps for '{}'", topic);

        let result = match self.generator().complete(&research_gaps_prompt(&topic)).await {
            Ok(text) => ResearchGaps {
                success: true,
                topic,
                research_gaps: text,
                error: None,
            },
            Err(e) => {
                tracing::warn!("Research gap generation failed: {}", e);
                ResearchGaps {
                    success: false,
                    topic,
                    research_gaps: String::new(),
                    error: Some(e.to_string()),
                }
            }
        };
        Ok(result)
    }

    /// Counterarguments and rebuttals for a claim within a topic
    pub async fn counterarguments(
        &self,
        main_argument: &str,
        topic: &str,
    ) -> Result<Counterarguments, ValidationError> {
        let main_argument = require_text("Main argument", Some(main_argument))?;
        let topic = require_text("Topic", Some(topic))?;
        tracing::info!("Generating counterarguments on '{}'", topic);

        let prompt = counterarguments_prompt(&main_argument, &topic);
        let (counterarguments, error) = match self.generator().complete(&prompt).await {
            Ok(text) => (text, None),
            Err(e) => {
                tracing::warn!("Counterargument generation failed: {}", e);
                (String::new(), Some(e.to_string()))
            }
        };

        Ok(Counterarguments {
            success: error.is_none(),
            main_argument,
            topic,
            counterarguments,
            error,
        })
    }

    /// Proposal outline, methodology and impact for a research idea
    ///
    /// A blank `funding_type` falls back to [`DEFAULT_FUNDING_TYPE`].
    pub async fn research_proposal(
        &self,
        research_idea: &str,
        funding_type: &str,
    ) -> Result<ResearchProposal, ValidationError> {
        let research_idea = require_text("Research idea", Some(research_idea))?;
        let funding_type = match funding_type.trim() {
            "" => DEFAULT_FUNDING_TYPE.to_string(),
            other => other.to_string(),
        };
        tracing::info!("Drafting {} proposal for '{}'", funding_type, research_idea);

        let sections = self.proposal_sections(&research_idea, &funding_type).await;
        let mut proposal = ResearchProposal {
            research_idea,
            funding_type,
            ..Default::default()
        };

        match sections {
            Ok((outline, methodology, impact)) => {
                proposal.success = true;
                proposal.proposal_outline = outline;
                proposal.methodology = methodology;
                proposal.impact_assessment = impact;
            }
            Err(e) => {
                tracing::warn!("Proposal generation failed: {}", e);
                proposal.error = Some(e.to_string());
            }
        }
        Ok(proposal)
    }

    async fn proposal_sections(
        &self,
        research_idea: &str,
        funding_type: &str,
    ) -> Result<(String, String, String), GenerationError> {
        let generator = self.generator();
        let outline = generator
            .complete(&proposal_outline_prompt(research_idea, funding_type))
            .await?;
        let methodology = generator
            .complete(&methodology_prompt(research_idea, PROPOSAL_FIELD))
            .await?;
        let impact = generator
            .complete(&impact_prompt(research_idea, PROPOSAL_FINDINGS))
            .await?;
        Ok((outline, methodology, impact))
    }

    /// Assemble a document, then add research extras and its quality score
    ///
    /// Extras that fail to generate hold an inline error message; the
    /// document itself is kept either way.
    pub async fn enhanced_paper(
        &self,
        request: &GenerateRequest,
    ) -> Result<EnhancedPaper, ValidationError> {
        let document = self.assemble(request).await?;
        let topic = request.topic.trim();

        let research_gaps = self
            .section("research gaps", &research_gaps_prompt(topic))
            .await;
        let methodology_suggestions = self
            .section(
                "methodology suggestions",
                &methodology_prompt(&format!("Research on {}", topic), METHODOLOGY_FIELD),
            )
            .await;
        let impact_assessment = self
            .section("impact assessment", &impact_prompt(topic, PAPER_FINDINGS))
            .await;
        let peer_review_checklist = self
            .section(
                "peer review checklist",
                &peer_review_prompt(&request.paper_type, REVIEW_FIELD),
            )
            .await;

        let content = &document.paper.content;
        Ok(EnhancedPaper {
            quality_score: quality_score(content),
            improvement_suggestions: improvement_suggestions(content),
            document,
            research_gaps,
            methodology_suggestions,
            impact_assessment,
            peer_review_checklist,
        })
    }
}
