//! Tool registry for MCP tools.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::document::{Assembler, DEFAULT_AUTHOR, DEFAULT_FUNDING_TYPE};
use crate::models::{DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT};

use super::handlers::{
    AnalyzePaperHandler, CounterargumentsHandler, EnhanceCitationsHandler, ExportPdfHandler,
    GenerateEnhancedPaperHandler, GenerateLatexHandler, GeneratePaperHandler,
    ListCitationStylesHandler, ListPaperTypesHandler, ResearchGapsHandler,
    ResearchProposalHandler, SearchCitationsHandler,
};

/// An MCP tool that can be called by the client
#[derive(Clone)]
pub struct Tool {
    /// Tool name (e.g., "generate_paper")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: Value,

    /// Handler function to execute the tool
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish()
    }
}

/// Handler for executing a tool
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync + std::fmt::Debug {
    /// Execute the tool with the given arguments
    async fn execute(&self, args: Value) -> Result<Value, String>;
}

fn style_property() -> Value {
    json!({
        "type": "string",
        "description": "Citation style",
        "enum": ["apa", "mla", "chicago"],
        "default": "apa"
    })
}

/// Registry for all MCP tools
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
}

impl ToolRegistry {
    /// Create a registry with every pipeline tool bound to `assembler`
    pub fn from_assembler(assembler: Arc<Assembler>) -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
        };
        registry.register_pipeline_tools(&assembler);
        registry.register_research_tools(&assembler);
        registry
    }

    fn register_research_tools(&mut self, assembler: &Arc<Assembler>) {
        // 9. generate_enhanced_paper - Paper plus research extras
        self.register(Tool {
            name: "generate_enhanced_paper".to_string(),
            description: "Generate a paper together with research gaps, methodology suggestions, \
                          an impact assessment, a quality score and a peer review checklist."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "topic": {
                        "type": "string",
                        "description": "Research topic or question"
                    },
                    "paper_type": {
                        "type": "string",
                        "description": "Type of paper",
                        "enum": ["research", "review", "essay", "thesis", "report"],
                        "default": "research"
                    },
                    "length": {
                        "type": "string",
                        "description": "Target length",
                        "enum": ["short", "medium", "long", "extended"],
                        "default": "medium"
                    },
                    "citation_style": style_property()
                },
                "required": ["topic"]
            }),
            handler: Arc::new(GenerateEnhancedPaperHandler {
                assembler: assembler.clone(),
            }),
        });

        // 10. generate_research_proposal
        self.register(Tool {
            name: "generate_research_proposal".to_string(),
            description: "Draft a funding proposal outline with methodology and impact sections."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "research_idea": {
                        "type": "string",
                        "description": "The research idea to propose"
                    },
                    "funding_type": {
                        "type": "string",
                        "description": "Kind of funding sought (e.g., academic, industry)",
                        "default": DEFAULT_FUNDING_TYPE
                    }
                },
                "required": ["research_idea"]
            }),
            handler: Arc::new(ResearchProposalHandler {
                assembler: assembler.clone(),
            }),
        });

        // 11. find_research_gaps
        self.register(Tool {
            name: "find_research_gaps".to_string(),
            description: "Identify research gaps, emerging trends and future directions for a \
                          topic."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "topic": {
                        "type": "string",
                        "description": "Research topic"
                    }
                },
                "required": ["topic"]
            }),
            handler: Arc::new(ResearchGapsHandler {
                assembler: assembler.clone(),
            }),
        });

        // 12. generate_counterarguments
        self.register(Tool {
            name: "generate_counterarguments".to_string(),
            description: "Generate counterarguments and rebuttals for a claim within a topic."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "main_argument": {
                        "type": "string",
                        "description": "The claim to argue against"
                    },
                    "topic": {
                        "type": "string",
                        "description": "Context of the claim"
                    }
                },
                "required": ["main_argument", "topic"]
            }),
            handler: Arc::new(CounterargumentsHandler {
                assembler: assembler.clone(),
            }),
        });
    }

    fn register_pipeline_tools(&mut self, assembler: &Arc<Assembler>) {
        // 1. generate_paper - Full pipeline
        self.register(Tool {
            name: "generate_paper".to_string(),
            description: format!(
                "Generate a complete academic paper with real citations from {}",
                assembler.lookup().source_name()
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "topic": {
                        "type": "string",
                        "description": "Research topic or question"
                    },
                    "paper_type": {
                        "type": "string",
                        "description": "Type of paper",
                        "enum": ["research", "review", "essay", "thesis", "report"],
                        "default": "research"
                    },
                    "length": {
                        "type": "string",
                        "description": "Target length",
                        "enum": ["short", "medium", "long", "extended"],
                        "default": "medium"
                    },
                    "citation_style": style_property(),
                    "include_references": {
                        "type": "boolean",
                        "description":
                            "Ground the paper in looked-up sources and append a reference list",
                        "default": true
                    }
                },
                "required": ["topic"]
            }),
            handler: Arc::new(GeneratePaperHandler {
                assembler: assembler.clone(),
            }),
        });

        // 2. enhance_citations - Number placeholders in existing content
        self.register(Tool {
            name: "enhance_citations".to_string(),
            description: "Replace [Author, Year] placeholders in existing content with numbered \
                          citations to real sources and append a reference list."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "content": {
                        "type": "string",
                        "description": "Paper content containing [Author, Year] placeholders"
                    },
                    "topic": {
                        "type": "string",
                        "description": "Topic used to look up sources"
                    },
                    "citation_style": style_property()
                },
                "required": ["content", "topic"]
            }),
            handler: Arc::new(EnhanceCitationsHandler {
                assembler: assembler.clone(),
            }),
        });

        // 3. search_citations - Direct bibliographic lookup
        self.register(Tool {
            name: "search_citations".to_string(),
            description: "Search the bibliographic index and return normalized records with \
                          formatted citations."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query string"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of records",
                        "minimum": 1,
                        "maximum": MAX_RESULTS_LIMIT,
                        "default": DEFAULT_MAX_RESULTS
                    },
                    "year": {
                        "type": "string",
                        "description": "Year filter (e.g., '2020', '2018-2022')"
                    },
                    "citation_style": style_property()
                },
                "required": ["query"]
            }),
            handler: Arc::new(SearchCitationsHandler {
                assembler: assembler.clone(),
            }),
        });

        // 4. generate_latex - Typeset a body
        self.register(Tool {
            name: "generate_latex".to_string(),
            description: "Convert Markdown-style paper content into a complete LaTeX document."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "content": {
                        "type": "string",
                        "description": "Paper content"
                    },
                    "title": {
                        "type": "string",
                        "description":
                            "Document title (defaults to the first short line of the content)"
                    },
                    "author": {
                        "type": "string",
                        "description": "Author name",
                        "default": DEFAULT_AUTHOR
                    }
                },
                "required": ["content"]
            }),
            handler: Arc::new(GenerateLatexHandler),
        });

        // 5. export_pdf
        self.register(Tool {
            name: "export_pdf".to_string(),
            description: "Export paper content to PDF (not yet available).".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "content": {
                        "type": "string",
                        "description": "Paper content"
                    },
                    "title": {
                        "type": "string",
                        "description": "Document title"
                    }
                },
                "required": ["content"]
            }),
            handler: Arc::new(ExportPdfHandler),
        });

        // 6. analyze_paper
        self.register(Tool {
            name: "analyze_paper".to_string(),
            description: "Score readability and argument structure of paper content and suggest \
                          improvements."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "content": {
                        "type": "string",
                        "description": "Paper content"
                    }
                },
                "required": ["content"]
            }),
            handler: Arc::new(AnalyzePaperHandler),
        });

        // 7-8. Catalogs
        self.register(Tool {
            name: "list_paper_types".to_string(),
            description: "List supported paper types and length tiers.".to_string(),
            input_schema: json!({ "type": "object", "properties": {} }),
            handler: Arc::new(ListPaperTypesHandler),
        });

        self.register(Tool {
            name: "list_citation_styles".to_string(),
            description: "List supported citation styles.".to_string(),
            input_schema: json!({ "type": "object", "properties": {} }),
            handler: Arc::new(ListCitationStylesHandler),
        });
    }

    /// Register a tool
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get all tools
    pub fn all(&self) -> Vec<&Tool> {
        self.tools.values().collect()
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, String> {
        let tool = self
            .get(name)
            .ok_or_else(|| format!("Tool '{}' not found", name))?;

        tool.handler.execute(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::BibliographicLookup;
    use crate::generation::MockGenerator;
    use crate::sources::MockSource;

    fn registry() -> ToolRegistry {
        let assembler = Assembler::new(
            Arc::new(MockGenerator::default()),
            BibliographicLookup::new(Arc::new(MockSource::new())),
        );
        ToolRegistry::from_assembler(Arc::new(assembler))
    }

    #[test]
    fn test_all_tools_registered() {
        let registry = registry();
        let mut names: Vec<&str> = registry.all().iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();

        assert_eq!(
            names,
            vec![
                "analyze_paper",
                "enhance_citations",
                "export_pdf",
                "find_research_gaps",
                "generate_counterarguments",
                "generate_enhanced_paper",
                "generate_latex",
                "generate_paper",
                "generate_research_proposal",
                "list_citation_styles",
                "list_paper_types",
                "search_citations",
            ]
        );
    }

    #[test]
    fn test_schemas_declare_required_fields() {
        let registry = registry();
        let tool = registry.get("generate_paper").unwrap();
        assert_eq!(tool.input_schema["required"], json!(["topic"]));
        assert!(tool.description.contains("Mock"));

        let tool = registry.get("generate_counterarguments").unwrap();
        assert_eq!(
            tool.input_schema["required"],
            json!(["main_argument", "topic"])
        );
        let tool = registry.get("generate_research_proposal").unwrap();
        assert_eq!(
            tool.input_schema["properties"]["funding_type"]["default"],
            "academic"
        );
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = registry().execute("missing", json!({})).await.unwrap_err();
        assert_eq!(err, "Tool 'missing' not found");
    }
}
