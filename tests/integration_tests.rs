//! Integration tests for paper-forge
//!
//! These tests drive the assembler, typesetter and MCP tools through the
//! public API, with scripted backends or local HTTP mocks.

use mockito::Matcher;
use paper_forge::citation::{format_citation, interleave, BibliographicLookup};
use paper_forge::config::Config;
use paper_forge::document::{to_typeset, Assembler};
use paper_forge::generation::MockGenerator;
use paper_forge::mcp::ToolRegistry;
use paper_forge::models::{word_count, CitationStyle, GenerateRequest, RecordBuilder};
use paper_forge::sources::mock::make_record;
use paper_forge::sources::MockSource;
use serde_json::json;
use std::sync::Arc;

fn three_records() -> Vec<paper_forge::BibliographicRecord> {
    vec![
        make_record("Quantum Error Correction", "Peter Shor", 1995),
        make_record("Quantum Supremacy", "Frank Arute", 2019),
        make_record("Noisy Intermediate-Scale Quantum", "John Preskill", 2018),
    ]
}

fn assembler(generator: Arc<MockGenerator>, source: Arc<MockSource>) -> Assembler {
    Assembler::new(generator, BibliographicLookup::new(source))
}

#[tokio::test]
async fn test_end_to_end_with_stub_sources() {
    let generator = Arc::new(MockGenerator::default());
    generator
        .push_text("1. Introduction\n2. Methods")
        .push_text("Quantum Computing Today\n\n## Introduction\n\nQubits [1] scale poorly [2].");
    let source = Arc::new(MockSource::with_records(three_records()));
    let assembler = assembler(generator, source);

    let request = GenerateRequest::new("quantum computing").paper_type("research");
    let aggregate = assembler.assemble(&request).await.unwrap();

    assert!(aggregate.success);
    assert!(aggregate.error.is_none());
    assert!(aggregate.references.len() <= 3);
    assert_eq!(aggregate.word_count(), word_count(&aggregate.paper.content));

    let title = &aggregate.paper.title;
    assert!(
        aggregate.paper.content.contains(title.as_str()) || title == "Research on quantum computing"
    );

    let json = serde_json::to_value(&aggregate).unwrap();
    assert_eq!(json["paper"]["type"], "research");
    assert_eq!(json["paper"]["citation_style"], "apa");
    assert_eq!(json["outline"], "1. Introduction\n2. Methods");
    assert_eq!(json["references"].as_array().unwrap().len(), 3);
    assert_eq!(json["word_count"], aggregate.word_count());
}

#[tokio::test]
async fn test_empty_search_keeps_placeholders() {
    let body = "Prior work [Smith, 2020] disagrees with [Jones, 2019].";
    let generator = Arc::new(MockGenerator::new(body));
    let source = Arc::new(MockSource::new());
    let assembler = assembler(generator, source);

    let aggregate = assembler
        .assemble(&GenerateRequest::new("quantum computing"))
        .await
        .unwrap();

    assert!(aggregate.success);
    assert!(aggregate.references.is_empty());
    assert_eq!(aggregate.paper.content, body);
    assert_eq!(aggregate.paper.title, body);
}

#[tokio::test]
async fn test_validation_rejects_before_backends() {
    let generator = Arc::new(MockGenerator::default());
    let source = Arc::new(MockSource::with_records(three_records()));
    let assembler = assembler(generator.clone(), source.clone());

    let err = assembler
        .assemble(&GenerateRequest::new("   "))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Topic is required");
    assert!(generator.prompts().is_empty());
    assert!(source.queries().is_empty());
}

#[tokio::test]
async fn test_lookup_failure_degrades_to_plain_generation() {
    let generator = Arc::new(MockGenerator::new("Plain Title\n\nNo sources here."));
    let source = Arc::new(MockSource::new());
    source.set_failure("connection reset");
    let assembler = assembler(generator.clone(), source);

    let aggregate = assembler
        .assemble(&GenerateRequest::new("soil carbon"))
        .await
        .unwrap();

    assert!(aggregate.success);
    assert!(aggregate.references.is_empty());
    assert_eq!(aggregate.paper.title, "Plain Title");
    assert!(!generator.prompts()[1].contains("real academic sources"));
}

#[test]
fn test_interleave_numbers_and_is_idempotent() {
    let records = vec![
        RecordBuilder::new("First").author("Ada Lovelace").year(1843).build(),
        RecordBuilder::new("Second").author("Alan Turing").year(1936).build(),
    ];
    let raw = "A [X, 2001]. B [Y, 2002]. C [Z, 2003].";

    let once = interleave(raw, &records, CitationStyle::Apa);
    assert!(once.starts_with("A [1]. B [2]. C [Z, 2003]."));
    assert_eq!(once.matches("## References").count(), 1);
    assert!(once.contains(&format!("[2] {}", format_citation(&records[1], CitationStyle::Apa))));

    let twice = interleave(&once, &records, CitationStyle::Apa);
    assert_eq!(twice.matches("## References").count(), 1);
}

#[test]
fn test_typeset_properties() {
    let doc = to_typeset("# Results\n\n**bold *and italic***\n\n100%", "A & B", "");

    assert!(doc.contains(r"\section{Results}"));
    assert!(doc.contains(r"\textbf{bold \textit{and italic}}"));
    assert!(doc.contains(r"100\%"));
    assert!(doc.contains(r"\title{A \& B}"));
    assert!(doc.contains(r"\author{Research Assistant}"));
    assert!(!doc.contains("**"));
}

#[tokio::test]
async fn test_mcp_tools_end_to_end() {
    let generator = Arc::new(MockGenerator::new("Tool Paper\n\nBody [Author, 2020]."));
    let source = Arc::new(MockSource::with_records(three_records()));
    let registry = ToolRegistry::from_assembler(Arc::new(assembler(generator, source)));

    let enhanced = registry
        .execute(
            "enhance_citations",
            json!({
                "content": "Body [Author, 2020].",
                "topic": "quantum",
                "citation_style": "chicago"
            }),
        )
        .await
        .unwrap();
    assert_eq!(enhanced["success"], true);
    assert!(enhanced["content"].as_str().unwrap().starts_with("Body [1]."));
    assert_eq!(enhanced["references"].as_array().unwrap().len(), 1);

    let err = registry
        .execute("generate_paper", json!({"paper_type": "review"}))
        .await
        .unwrap_err();
    assert_eq!(err, "Topic is required");

    let pdf = registry
        .execute("export_pdf", json!({"content": "x", "title": "T"}))
        .await
        .unwrap();
    assert_eq!(pdf["message"], "PDF export feature coming soon!");
    assert!(pdf["download_url"].is_null());
}

#[tokio::test]
async fn test_research_tools_end_to_end() {
    let generator = Arc::new(MockGenerator::default());
    generator
        .push_text("1. Few long-term studies")
        .push_text("Outline")
        .push_text("Methods")
        .push_text("Impact");
    let source = Arc::new(MockSource::new());
    let registry = ToolRegistry::from_assembler(Arc::new(assembler(generator, source.clone())));

    let gaps = registry
        .execute("find_research_gaps", json!({"topic": "soil carbon"}))
        .await
        .unwrap();
    assert_eq!(gaps["research_gaps"], "1. Few long-term studies");

    let proposal = registry
        .execute(
            "generate_research_proposal",
            json!({"research_idea": "Biochar trials", "funding_type": "industry"}),
        )
        .await
        .unwrap();
    assert_eq!(proposal["success"], true);
    assert_eq!(proposal["funding_type"], "industry");
    assert_eq!(proposal["methodology"], "Methods");

    let err = registry
        .execute("generate_counterarguments", json!({"main_argument": "x"}))
        .await
        .unwrap_err();
    assert_eq!(err, "Topic is required");
    assert!(source.queries().is_empty());
}

#[tokio::test]
async fn test_configured_backends_over_http() {
    let mut crossref = mockito::Server::new_async().await;
    let works = crossref
        .mock("GET", "/works")
        .match_query(Matcher::UrlEncoded("query".into(), "soil carbon".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "status": "ok",
                "message": {
                    "total-results": 1,
                    "items": [{
                        "title": ["Soil carbon sequestration"],
                        "DOI": "10.1126/science.1097396",
                        "author": [{"given": "Rattan", "family": "Lal"}],
                        "container-title": ["Science"],
                        "published-print": {"date-parts": [[2004, 6]]}
                    }]
                }
            })
            .to_string(),
        )
        .expect_at_least(2)
        .create_async()
        .await;

    let mut gemini = mockito::Server::new_async().await;
    gemini
        .mock("POST", "/models/gemini-1.5-flash:generateContent")
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"candidates": [{"content": {"parts": [{
                "text": "Soil Carbon\n\nCarbon is stored in soil [1]."
            }]}}]})
            .to_string(),
        )
        .create_async()
        .await;

    let mut config = Config::default();
    config.bibliography.base_url = crossref.url();
    config.generation.base_url = gemini.url();
    config.generation.api_key = Some("test-key".to_string());
    config.validate().unwrap();

    let aggregate = config
        .assembler()
        .unwrap()
        .assemble(&GenerateRequest::new("soil carbon").citation_style(CitationStyle::Mla))
        .await
        .unwrap();

    works.assert_async().await;
    assert!(aggregate.success);
    assert_eq!(aggregate.paper.title, "Soil Carbon");
    assert_eq!(
        aggregate.formatted_references(),
        vec![r#"Rattan Lal. "Soil carbon sequestration." *Science*, 2004."#.to_string()]
    );
    assert!(aggregate.paper.content.contains("## References"));
}
