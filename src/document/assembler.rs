//! Orchestrates outline, body, citations and references into one document.

use std::sync::Arc;

use crate::citation::{append_references, interleave_with_references, BibliographicLookup};
use crate::generation::prompts::{cited_paper_prompt, outline_prompt, paper_prompt};
use crate::generation::{GenerationError, Generator};
use crate::models::{
    word_count, BibliographicRecord, CitationStyle, DocumentAggregate, EnhancedDocument,
    GenerateRequest, PaperSection, ReferenceList, SearchQuery,
};
use crate::utils::{require_text, validate_max_results, ValidationError};

/// Lines scanned when looking for a title
const TITLE_SCAN_LINES: usize = 5;

/// Longest line accepted as a title, in characters
const TITLE_MAX_CHARS: usize = 100;

/// Record counts used by the assembler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblySettings {
    /// Records fetched as generation context
    pub context_results: usize,
    /// Context records listed in the prompt
    pub prompt_citations: usize,
    /// Records fetched for the displayed bibliography and for enhancement
    pub display_results: usize,
}

impl Default for AssemblySettings {
    fn default() -> Self {
        Self {
            context_results: 15,
            prompt_citations: 10,
            display_results: 10,
        }
    }
}

/// First short, non-heading line among the first few lines
pub fn extract_title(content: &str) -> Option<String> {
    content
        .split('\n')
        .take(TITLE_SCAN_LINES)
        .map(str::trim)
        .find(|line| {
            !line.is_empty() && !line.starts_with('#') && line.chars().count() < TITLE_MAX_CHARS
        })
        .map(str::to_string)
}

/// Document assembler
///
/// Holds its backends; every call builds its own state, so one assembler can
/// serve concurrent requests.
#[derive(Debug, Clone)]
pub struct Assembler {
    generator: Arc<dyn Generator>,
    lookup: BibliographicLookup,
    settings: AssemblySettings,
}

impl Assembler {
    pub fn new(generator: Arc<dyn Generator>, lookup: BibliographicLookup) -> Self {
        Self {
            generator,
            lookup,
            settings: AssemblySettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: AssemblySettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn lookup(&self) -> &BibliographicLookup {
        &self.lookup
    }

    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }

    pub fn settings(&self) -> AssemblySettings {
        self.settings
    }

    /// Generate a full document
    ///
    /// Only validation failures are returned as `Err`. Backend failures are
    /// written into the aggregate: generation errors become inline text and
    /// lookup errors become missing references.
    pub async fn assemble(
        &self,
        request: &GenerateRequest,
    ) -> Result<DocumentAggregate, ValidationError> {
        request.validate()?;
        let topic = request.topic.trim();

        tracing::info!(
            "Assembling {} on '{}' ({}, {})",
            request.paper_type,
            topic,
            request.length,
            request.citation_style
        );

        let mut aggregate = DocumentAggregate {
            paper: PaperSection {
                topic: topic.to_string(),
                paper_type: request.paper_type.clone(),
                length: request.length.clone(),
                citation_style: request.citation_style,
                ..Default::default()
            },
            ..Default::default()
        };

        let outline = self
            .generator
            .complete(&outline_prompt(topic, &request.paper_type))
            .await;
        let outline_text = outline.as_ref().ok().cloned();
        aggregate.outline = match outline {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Outline generation failed: {}", e);
                format!("Error generating outline: {}", e)
            }
        };

        let content = if request.include_references {
            match self.generate_with_citations(request, topic).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Cited content generation failed: {}", e);
                    format!("Error generating content with citations: {}", e)
                }
            }
        } else {
            let body = self
                .generator
                .complete(&paper_prompt(
                    topic,
                    &request.paper_type,
                    request.length_tier(),
                    outline_text.as_deref(),
                ))
                .await;
            match body {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Content generation failed: {}", e);
                    format!("Error generating content: {}", e)
                }
            }
        };

        if content.trim().is_empty() {
            tracing::warn!("Generator returned no content for '{}'", topic);
        }

        aggregate.paper.title = extract_title(&content).unwrap_or_else(|| request.fallback_title());
        aggregate.paper.content = content;

        // Fetched separately from the generation context; the two lists may differ.
        if request.include_references {
            aggregate.references = self
                .lookup
                .search(topic, self.settings.display_results)
                .await
                .into_iter()
                .collect();
        }

        aggregate.success = true;
        tracing::info!(
            "Assembled '{}' ({} words, {} references)",
            aggregate.paper.title,
            aggregate.word_count(),
            aggregate.references.len()
        );
        Ok(aggregate)
    }

    /// Body grounded in looked-up sources, or plain generation when none exist
    async fn generate_with_citations(
        &self,
        request: &GenerateRequest,
        topic: &str,
    ) -> Result<String, GenerationError> {
        let records = self.lookup.search(topic, self.settings.context_results).await;

        if records.is_empty() {
            tracing::info!("No sources found for '{}', generating without citations", topic);
            return self
                .generator
                .complete(&paper_prompt(
                    topic,
                    &request.paper_type,
                    request.length_tier(),
                    None,
                ))
                .await;
        }

        let cited: ReferenceList = records
            .into_iter()
            .take(self.settings.prompt_citations)
            .collect();
        let numbered = cited.numbered(request.citation_style);

        let mut content = self
            .generator
            .complete(&cited_paper_prompt(
                topic,
                &request.paper_type,
                request.length_tier(),
                &numbered,
                request.citation_style,
            ))
            .await?;

        append_references(&mut content, &numbered);
        Ok(content)
    }

    /// Number the placeholder citations of existing content
    pub async fn enhance(
        &self,
        content: &str,
        topic: &str,
        style: CitationStyle,
    ) -> Result<EnhancedDocument, ValidationError> {
        require_text("Content", Some(content))?;
        let topic = require_text("Topic", Some(topic))?;

        let records = self.lookup.search(&topic, self.settings.display_results).await;
        if records.is_empty() {
            tracing::info!("No sources found for '{}', content left unchanged", topic);
        }

        let interleaved = interleave_with_references(content, &records, style);
        Ok(EnhancedDocument {
            success: true,
            word_count: word_count(&interleaved.text),
            references: interleaved.references.numbered(style),
            content: interleaved.text,
            error: None,
        })
    }

    /// Look up records for a caller-supplied query
    ///
    /// `year` is passed through as a filter ("2020" or "2018-2022").
    pub async fn search_citations(
        &self,
        query: &str,
        max_results: usize,
        year: Option<&str>,
    ) -> Result<Vec<BibliographicRecord>, ValidationError> {
        let query = require_text("Query", Some(query))?;
        let max_results = validate_max_results(max_results)?;

        let mut request = SearchQuery::new(query).max_results(max_results);
        if let Some(year) = year.map(str::trim).filter(|y| !y.is_empty()) {
            request = request.year(year);
        }
        Ok(self.lookup.search_query(&request).await)
    }
}
