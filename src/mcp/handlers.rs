//! Tool handlers over the document pipeline.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::citation::structured_citation;
use crate::document::{
    analyze, export_pdf, extract_title, to_typeset, Assembler, DEFAULT_AUTHOR,
    DEFAULT_FUNDING_TYPE,
};
use crate::models::{CitationStyle, GenerateRequest, LengthTier, PaperType, DEFAULT_MAX_RESULTS};
use crate::utils::require_text;

use super::tools::ToolHandler;

fn str_arg<'a>(args: &'a Value, name: &str) -> Option<&'a str> {
    args.get(name).and_then(|v| v.as_str())
}

fn style_arg(args: &Value) -> CitationStyle {
    str_arg(args, "citation_style")
        .map(CitationStyle::parse)
        .unwrap_or_default()
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| format!("Failed to serialize result: {}", e))
}

/// Handler for full paper generation
#[derive(Debug)]
pub struct GeneratePaperHandler {
    pub assembler: Arc<Assembler>,
}

#[async_trait::async_trait]
impl ToolHandler for GeneratePaperHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let request: GenerateRequest =
            serde_json::from_value(args).map_err(|e| format!("Invalid arguments: {}", e))?;

        let aggregate = self
            .assembler
            .assemble(&request)
            .await
            .map_err(|e| e.to_string())?;

        to_json(&aggregate)
    }
}

/// Handler for a paper with research gaps, methodology, impact and review checklist
#[derive(Debug)]
pub struct GenerateEnhancedPaperHandler {
    pub assembler: Arc<Assembler>,
}

#[async_trait::async_trait]
impl ToolHandler for GenerateEnhancedPaperHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let request: GenerateRequest =
            serde_json::from_value(args).map_err(|e| format!("Invalid arguments: {}", e))?;

        let paper = self
            .assembler
            .enhanced_paper(&request)
            .await
            .map_err(|e| e.to_string())?;

        to_json(&paper)
    }
}

/// Handler for funding proposal drafts
#[derive(Debug)]
pub struct ResearchProposalHandler {
    pub assembler: Arc<Assembler>,
}

#[async_trait::async_trait]
impl ToolHandler for ResearchProposalHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let idea = str_arg(&args, "research_idea").unwrap_or_default();
        let funding_type = str_arg(&args, "funding_type").unwrap_or(DEFAULT_FUNDING_TYPE);

        let proposal = self
            .assembler
            .research_proposal(idea, funding_type)
            .await
            .map_err(|e| e.to_string())?;

        to_json(&proposal)
    }
}

/// Handler for research gap analysis
#[derive(Debug)]
pub struct ResearchGapsHandler {
    pub assembler: Arc<Assembler>,
}

#[async_trait::async_trait]
impl ToolHandler for ResearchGapsHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let topic = str_arg(&args, "topic").unwrap_or_default();

        let gaps = self
            .assembler
            .research_gaps(topic)
            .await
            .map_err(|e| e.to_string())?;

        to_json(&gaps)
    }
}

/// Handler for counterarguments to a claim
#[derive(Debug)]
pub struct CounterargumentsHandler {
    pub assembler: Arc<Assembler>,
}

#[async_trait::async_trait]
impl ToolHandler for CounterargumentsHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let main_argument = str_arg(&args, "main_argument").unwrap_or_default();
        let topic = str_arg(&args, "topic").unwrap_or_default();

        let result = self
            .assembler
            .counterarguments(main_argument, topic)
            .await
            .map_err(|e| e.to_string())?;

        to_json(&result)
    }
}

/// Handler for numbering placeholder citations in existing content
#[derive(Debug)]
pub struct EnhanceCitationsHandler {
    pub assembler: Arc<Assembler>,
}

#[async_trait::async_trait]
impl ToolHandler for EnhanceCitationsHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let content = str_arg(&args, "content").unwrap_or_default();
        let topic = str_arg(&args, "topic").unwrap_or_default();

        let enhanced = self
            .assembler
            .enhance(content, topic, style_arg(&args))
            .await
            .map_err(|e| e.to_string())?;

        to_json(&enhanced)
    }
}

/// Handler for direct bibliographic search
#[derive(Debug)]
pub struct SearchCitationsHandler {
    pub assembler: Arc<Assembler>,
}

#[async_trait::async_trait]
impl ToolHandler for SearchCitationsHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let query = str_arg(&args, "query").ok_or("Missing 'query' parameter")?;

        let max_results = args
            .get("max_results")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_RESULTS);

        let style = style_arg(&args);

        let records = self
            .assembler
            .search_citations(query, max_results, str_arg(&args, "year"))
            .await
            .map_err(|e| e.to_string())?;

        let citations: Vec<_> = records
            .iter()
            .map(|record| structured_citation(record, style))
            .collect();

        Ok(json!({
            "success": true,
            "query": query.trim(),
            "source": self.assembler.lookup().source_name(),
            "total": citations.len(),
            "citations": citations,
        }))
    }
}

/// Handler for LaTeX output
#[derive(Debug)]
pub struct GenerateLatexHandler;

#[async_trait::async_trait]
impl ToolHandler for GenerateLatexHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let content = str_arg(&args, "content");
        require_text("Paper content", content).map_err(|e| e.to_string())?;
        let content = content.unwrap_or_default();

        let title = match str_arg(&args, "title") {
            Some(title) => title.to_string(),
            None => extract_title(content).unwrap_or_default(),
        };
        let author = str_arg(&args, "author").unwrap_or(DEFAULT_AUTHOR);

        Ok(json!({
            "success": true,
            "latex_content": to_typeset(content, &title, author),
        }))
    }
}

/// Handler for the PDF export placeholder
#[derive(Debug)]
pub struct ExportPdfHandler;

#[async_trait::async_trait]
impl ToolHandler for ExportPdfHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let content = str_arg(&args, "content").unwrap_or_default();
        let title = str_arg(&args, "title").unwrap_or("Research Paper");

        to_json(&export_pdf(content, title))
    }
}

/// Handler for readability and argument analysis
#[derive(Debug)]
pub struct AnalyzePaperHandler;

#[async_trait::async_trait]
impl ToolHandler for AnalyzePaperHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let content = str_arg(&args, "content");
        require_text("Paper content", content).map_err(|e| e.to_string())?;

        let mut result = to_json(&analyze(content.unwrap_or_default()))?;
        if let Some(map) = result.as_object_mut() {
            map.insert("success".to_string(), Value::Bool(true));
        }
        Ok(result)
    }
}

/// Handler listing paper types and length tiers
#[derive(Debug)]
pub struct ListPaperTypesHandler;

#[async_trait::async_trait]
impl ToolHandler for ListPaperTypesHandler {
    async fn execute(&self, _args: Value) -> Result<Value, String> {
        let paper_types: Vec<Value> = PaperType::ALL
            .iter()
            .map(|t| {
                json!({
                    "id": t.id(),
                    "name": t.name(),
                    "description": t.description(),
                })
            })
            .collect();

        let lengths: Vec<Value> = LengthTier::ALL
            .iter()
            .map(|tier| json!({ "id": tier.id(), "words": tier.word_range() }))
            .collect();

        Ok(json!({
            "paper_types": paper_types,
            "lengths": lengths,
        }))
    }
}

/// Handler listing citation styles
#[derive(Debug)]
pub struct ListCitationStylesHandler;

#[async_trait::async_trait]
impl ToolHandler for ListCitationStylesHandler {
    async fn execute(&self, _args: Value) -> Result<Value, String> {
        let styles: Vec<Value> = CitationStyle::ALL
            .iter()
            .map(|s| {
                json!({
                    "id": s.id(),
                    "name": s.name(),
                    "description": s.description(),
                })
            })
            .collect();

        Ok(json!({ "citation_styles": styles }))
    }
}
