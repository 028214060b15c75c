use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use paper_forge::citation::{format_citation, structured_citation};
use paper_forge::config::{default_config_path, load_config, Config, LogFormat};
use paper_forge::document::{
    analyze, extract_title, to_typeset, Assembler, EnhancedPaper, PaperAnalysis, DEFAULT_AUTHOR,
    DEFAULT_FUNDING_TYPE, DEFAULT_TEX_FILENAME,
};
use paper_forge::mcp::McpServer;
use paper_forge::models::{
    BibliographicRecord, CitationStyle, DocumentAggregate, GenerateRequest, LengthTier, PaperType,
    DEFAULT_MAX_RESULTS,
};
use paper_forge::utils::sanitize_filename;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// paper-forge - Generate academic papers grounded in real bibliographic records
#[derive(Parser, Debug)]
#[command(name = "paper-forge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "hongkongkiwi")]
#[command(
    about = "Generate academic papers with real citations and LaTeX output",
    long_about = None
)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if std::io::stdout().is_terminal() => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

/// Citation styles
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Style {
    #[value(name = "apa")]
    Apa,
    #[value(name = "mla")]
    Mla,
    #[value(name = "chicago")]
    Chicago,
}

impl From<Style> for CitationStyle {
    fn from(style: Style) -> Self {
        match style {
            Style::Apa => CitationStyle::Apa,
            Style::Mla => CitationStyle::Mla,
            Style::Chicago => CitationStyle::Chicago,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a paper on a topic
    #[command(alias = "g")]
    Generate {
        /// Research topic or question
        topic: String,

        /// Paper type (research, review, essay, thesis, report)
        #[arg(long, short = 't', default_value = "research")]
        paper_type: String,

        /// Target length (short, medium, long, extended)
        #[arg(long, short, default_value = "medium")]
        length: String,

        /// Citation style
        #[arg(long, short, value_enum, default_value_t = Style::Apa)]
        style: Style,

        /// Skip source lookup and the reference list
        #[arg(long)]
        no_references: bool,
    },

    /// Generate a paper with research gaps, methodology, impact and a review checklist
    GenerateEnhanced {
        /// Research topic or question
        topic: String,

        /// Paper type (research, review, essay, thesis, report)
        #[arg(long, short = 't', default_value = "research")]
        paper_type: String,

        /// Target length (short, medium, long, extended)
        #[arg(long, short, default_value = "medium")]
        length: String,

        /// Citation style
        #[arg(long, short, value_enum, default_value_t = Style::Apa)]
        style: Style,
    },

    /// Draft a funding proposal outline for a research idea
    Proposal {
        /// The research idea
        research_idea: String,

        /// Kind of funding sought (e.g., academic, industry)
        #[arg(long, default_value = DEFAULT_FUNDING_TYPE)]
        funding_type: String,
    },

    /// Identify research gaps and future directions for a topic
    Gaps {
        /// Research topic
        topic: String,
    },

    /// Generate counterarguments and rebuttals for a claim
    #[command(alias = "counter")]
    Counterarguments {
        /// The claim to argue against
        main_argument: String,

        /// Context of the claim
        #[arg(long)]
        topic: String,
    },

    /// Replace [Author, Year] placeholders in a file with numbered citations
    Enhance {
        /// File containing the paper content
        file: PathBuf,

        /// Topic used to look up sources
        #[arg(long)]
        topic: String,

        /// Citation style
        #[arg(long, short, value_enum, default_value_t = Style::Apa)]
        style: Style,
    },

    /// Search the bibliographic index
    #[command(alias = "s")]
    Search {
        /// Search query string
        query: String,

        /// Maximum number of results
        #[arg(long, short, default_value_t = DEFAULT_MAX_RESULTS)]
        max_results: usize,

        /// Year filter (e.g., "2020", "2018-2022")
        #[arg(long)]
        year: Option<String>,

        /// Citation style for formatted output
        #[arg(long, short, value_enum, default_value_t = Style::Apa)]
        style: Style,
    },

    /// Format records from a JSON file as citations
    Cite {
        /// JSON file with a record or an array of records
        file: PathBuf,

        /// Citation style
        #[arg(long, short, value_enum, default_value_t = Style::Apa)]
        style: Style,
    },

    /// Convert a paper to a LaTeX document
    Latex {
        /// File containing the paper content
        file: PathBuf,

        /// Document title (default: first short line of the content)
        #[arg(long)]
        title: Option<String>,

        /// Author name
        #[arg(long, default_value = DEFAULT_AUTHOR)]
        author: String,

        /// Write to this .tex file instead of stdout
        #[arg(
            long = "out",
            short = 'O',
            num_args = 0..=1,
            default_missing_value = DEFAULT_TEX_FILENAME
        )]
        out: Option<String>,
    },

    /// Score readability and argument structure of a paper
    Analyze {
        /// File containing the paper content
        file: PathBuf,
    },

    /// List paper types and lengths
    Templates,

    /// List citation styles
    Styles,

    /// Run the MCP server
    Serve {
        /// Run in streamable HTTP mode instead of stdio
        #[arg(long)]
        http: bool,

        /// Port for HTTP mode
        #[arg(long, short, default_value_t = 3000)]
        port: u16,

        /// Host to bind to for HTTP mode
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write the default configuration
    Init {
        /// Destination (default: user config directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("paper_forge={}", level)),
    );

    // stdout carries results and the MCP stdio transport
    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn read_content(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn build_assembler(config: &Config) -> Result<Assembler> {
    config.validate()?;
    Ok(config.assembler()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&cli, &config);

    let format = cli.output.resolve();

    match cli.command {
        Some(Commands::Generate {
            topic,
            paper_type,
            length,
            style,
            no_references,
        }) => {
            let request = GenerateRequest::new(topic)
                .paper_type(paper_type)
                .length(length)
                .citation_style(style.into())
                .include_references(!no_references);
            request.validate()?;

            let assembler = build_assembler(&config)?;
            if !cli.quiet {
                eprintln!(
                    "Generating {} on '{}' with sources from {}",
                    request.paper_type,
                    request.topic.trim(),
                    assembler.lookup().source_name()
                );
            }

            let aggregate = assembler.assemble(&request).await?;
            output_document(&aggregate, format)?;

            if let Some(ref error) = aggregate.error {
                anyhow::bail!("Generation failed: {}", error);
            }
        }

        Some(Commands::GenerateEnhanced {
            topic,
            paper_type,
            length,
            style,
        }) => {
            let request = GenerateRequest::new(topic)
                .paper_type(paper_type)
                .length(length)
                .citation_style(style.into());
            request.validate()?;

            let assembler = build_assembler(&config)?;
            if !cli.quiet {
                eprintln!(
                    "Generating enhanced {} on '{}'",
                    request.paper_type,
                    request.topic.trim()
                );
            }

            let paper = assembler.enhanced_paper(&request).await?;
            output_enhanced(&paper, format)?;
        }

        Some(Commands::Proposal {
            research_idea,
            funding_type,
        }) => {
            let assembler = build_assembler(&config)?;
            let proposal = assembler
                .research_proposal(&research_idea, &funding_type)
                .await?;

            output_sections(
                &proposal,
                &[
                    ("Proposal Outline", &proposal.proposal_outline),
                    ("Methodology", &proposal.methodology),
                    ("Impact Assessment", &proposal.impact_assessment),
                ],
                format,
            )?;
            if let Some(ref error) = proposal.error {
                anyhow::bail!("Proposal generation failed: {}", error);
            }
        }

        Some(Commands::Gaps { topic }) => {
            let assembler = build_assembler(&config)?;
            let gaps = assembler.research_gaps(&topic).await?;

            output_sections(&gaps, &[("Research Gaps", &gaps.research_gaps)], format)?;
            if let Some(ref error) = gaps.error {
                anyhow::bail!("Research gap generation failed: {}", error);
            }
        }

        Some(Commands::Counterarguments {
            main_argument,
            topic,
        }) => {
            let assembler = build_assembler(&config)?;
            let result = assembler.counterarguments(&main_argument, &topic).await?;

            output_sections(
                &result,
                &[("Counterarguments", &result.counterarguments)],
                format,
            )?;
            if let Some(ref error) = result.error {
                anyhow::bail!("Counterargument generation failed: {}", error);
            }
        }

        Some(Commands::Enhance { file, topic, style }) => {
            let content = read_content(&file)?;
            let assembler = build_assembler(&config)?;

            let enhanced = assembler.enhance(&content, &topic, style.into()).await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&enhanced)?),
                _ => {
                    println!("{}", enhanced.content);
                    if !cli.quiet {
                        eprintln!(
                            "{} words, {} references",
                            enhanced.word_count,
                            enhanced.references.len()
                        );
                    }
                }
            }
        }

        Some(Commands::Search {
            query,
            max_results,
            year,
            style,
        }) => {
            let assembler = build_assembler(&config)?;
            let records = assembler
                .search_citations(&query, max_results, year.as_deref())
                .await?;

            if !cli.quiet {
                eprintln!(
                    "Found {} records from {}",
                    records.len(),
                    assembler.lookup().source_name()
                );
            }
            output_records(&records, style.into(), format)?;
        }

        Some(Commands::Cite { file, style }) => {
            let json = read_content(&file)?;
            let records: Vec<BibliographicRecord> = match serde_json::from_str(&json) {
                Ok(records) => records,
                Err(_) => vec![serde_json::from_str(&json).with_context(|| {
                    format!("{} is not a record or record array", file.display())
                })?],
            };
            output_records(&records, style.into(), format)?;
        }

        Some(Commands::Latex {
            file,
            title,
            author,
            out,
        }) => {
            let content = read_content(&file)?;
            let title = title
                .or_else(|| extract_title(&content))
                .unwrap_or_default();
            let latex = to_typeset(&content, &title, &author);

            match out {
                Some(name) => {
                    let filename = sanitize_filename(&name)?;
                    std::fs::write(&filename, latex)
                        .with_context(|| format!("Failed to write {}", filename))?;
                    if !cli.quiet {
                        eprintln!("Wrote {}", filename);
                    }
                }
                None => println!("{}", latex),
            }
        }

        Some(Commands::Analyze { file }) => {
            let content = read_content(&file)?;
            output_analysis(&analyze(&content), format)?;
        }

        Some(Commands::Templates) => output_templates(format)?,

        Some(Commands::Styles) => output_styles(format)?,

        Some(Commands::Serve { http, port, host }) => {
            let server = McpServer::new(Arc::new(build_assembler(&config)?))?;

            if http {
                let addr = format!("{}:{}", host, port);
                let (bound_addr, handle) = server.run_http(&addr).await?;
                tracing::info!("MCP server listening on {}", bound_addr);

                handle
                    .await
                    .map_err(|e| anyhow::anyhow!("Server task failed: {}", e))?;
            } else {
                server.run().await?;
            }
        }

        Some(Commands::Config {
            action: ConfigAction::Init { path, force },
        }) => {
            let path = path
                .or_else(default_config_path)
                .context("Could not determine a configuration directory; use --path")?;

            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }

            Config::default().save(&path)?;
            if !cli.quiet {
                eprintln!("Wrote default configuration to {}", path.display());
            }
        }

        None => {
            println!("No command provided. Use --help for usage information.");
            println!("Common commands:");
            println!("  generate <topic>   - Generate a paper with real citations");
            println!("  gaps <topic>       - Find research gaps");
            println!("  search <query>     - Search for citable sources");
            println!("  latex <file>       - Convert a paper to LaTeX");
            println!("  analyze <file>     - Score a paper");
            println!("  serve              - Run MCP server");
        }
    }

    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn output_document(aggregate: &DocumentAggregate, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json | OutputFormat::Auto => {
            println!("{}", serde_json::to_string_pretty(aggregate)?);
        }
        OutputFormat::Plain => {
            println!("{}", aggregate.paper.content);
        }
        OutputFormat::Table => {
            use comfy_table::{Attribute, Cell, Table};
            println!("{}\n", aggregate.paper.content);

            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Title", "Type", "Length", "Style", "Words", "References"]);
            table.add_row(vec![
                Cell::new(truncate(&aggregate.paper.title, 50)).add_attribute(Attribute::Bold),
                Cell::new(&aggregate.paper.paper_type),
                Cell::new(&aggregate.paper.length),
                Cell::new(aggregate.paper.citation_style.name()),
                Cell::new(aggregate.word_count()),
                Cell::new(aggregate.references.len()),
            ]);
            println!("{table}");
        }
    }
    Ok(())
}

fn output_enhanced(paper: &EnhancedPaper, format: OutputFormat) -> Result<()> {
    if matches!(format, OutputFormat::Json | OutputFormat::Auto) {
        println!("{}", serde_json::to_string_pretty(paper)?);
        return Ok(());
    }

    output_document(&paper.document, format)?;
    for (heading, body) in [
        ("Research Gaps", &paper.research_gaps),
        ("Methodology Suggestions", &paper.methodology_suggestions),
        ("Impact Assessment", &paper.impact_assessment),
        ("Peer Review Checklist", &paper.peer_review_checklist),
    ] {
        println!("\n## {}\n\n{}", heading, body.trim());
    }

    let quality = &paper.quality_score;
    println!("\nGrade: {} ({})", quality.grade, quality.overall_score);
    for suggestion in &paper.improvement_suggestions {
        println!("- {}", suggestion);
    }
    Ok(())
}

/// JSON for machines, headed text sections otherwise
fn output_sections<T: serde::Serialize>(
    value: &T,
    sections: &[(&str, &String)],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json | OutputFormat::Auto => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Plain | OutputFormat::Table => {
            for (heading, body) in sections {
                if !body.trim().is_empty() {
                    println!("## {}\n\n{}\n", heading, body.trim());
                }
            }
        }
    }
    Ok(())
}

fn output_records(
    records: &[BibliographicRecord],
    style: CitationStyle,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json | OutputFormat::Auto => {
            let citations: Vec<_> = records
                .iter()
                .map(|record| structured_citation(record, style))
                .collect();
            println!("{}", serde_json::to_string_pretty(&citations)?);
        }
        OutputFormat::Plain => {
            for (i, record) in records.iter().enumerate() {
                println!("[{}] {}", i + 1, format_citation(record, style));
            }
        }
        OutputFormat::Table => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["#", "Title", "Authors", "Year", "DOI"]);

            for (i, record) in records.iter().enumerate() {
                table.add_row(vec![
                    Cell::new(i + 1),
                    Cell::new(truncate(&record.title, 50)).add_attribute(Attribute::Bold),
                    Cell::new(truncate(&record.authors.join(", "), 30)),
                    Cell::new(record.year.map(|y| y.to_string()).unwrap_or_default()),
                    Cell::new(record.identifier.clone().unwrap_or_default()),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

fn output_analysis(analysis: &PaperAnalysis, format: OutputFormat) -> Result<()> {
    let readability = &analysis.readability;
    let argument = &analysis.argument_structure;
    let quality = &analysis.quality_score;

    match format {
        OutputFormat::Json | OutputFormat::Auto => {
            println!("{}", serde_json::to_string_pretty(analysis)?);
        }
        OutputFormat::Plain => {
            println!("Grade: {} ({})", quality.grade, quality.overall_score);
            println!("Readability: {}", readability.readability_level.label());
            println!("Words: {}", readability.word_count);
            println!("Sentences: {}", readability.sentence_count);
            for suggestion in &analysis.suggestions {
                println!("- {}", suggestion);
            }
        }
        OutputFormat::Table => {
            use comfy_table::{Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Metric", "Value"]);

            let rows: Vec<(&str, String)> = vec![
                ("Grade", quality.grade.to_string()),
                ("Overall score", quality.overall_score.to_string()),
                ("Readability score", quality.readability_score.to_string()),
                ("Argument score", quality.argument_score.to_string()),
                ("Level", readability.readability_level.label().to_string()),
                ("Words", readability.word_count.to_string()),
                ("Sentences", readability.sentence_count.to_string()),
                ("Avg words/sentence", readability.avg_words_per_sentence.to_string()),
                ("Complex word ratio", readability.complex_word_ratio.to_string()),
                ("Claims", argument.claim_density.to_string()),
                ("Evidence", argument.evidence_density.to_string()),
                ("Transitions", argument.transition_density.to_string()),
            ];
            for (metric, value) in rows {
                table.add_row(vec![Cell::new(metric), Cell::new(value)]);
            }
            println!("{table}");

            for suggestion in &analysis.suggestions {
                println!("- {}", suggestion);
            }
        }
    }
    Ok(())
}

fn output_templates(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json | OutputFormat::Auto => {
            let paper_types: Vec<_> = PaperType::ALL
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "id": t.id(),
                        "name": t.name(),
                        "description": t.description(),
                    })
                })
                .collect();
            let lengths: Vec<_> = LengthTier::ALL
                .iter()
                .map(|l| serde_json::json!({"id": l.id(), "words": l.word_range()}))
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(
                    &serde_json::json!({"paper_types": paper_types, "lengths": lengths})
                )?
            );
        }
        OutputFormat::Plain => {
            for t in PaperType::ALL {
                println!("{} - {}: {}", t.id(), t.name(), t.description());
            }
            for l in LengthTier::ALL {
                println!("{} - {}", l.id(), l.word_range());
            }
        }
        OutputFormat::Table => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Type", "Name", "Description"]);
            for t in PaperType::ALL {
                table.add_row(vec![
                    Cell::new(t.id()).add_attribute(Attribute::Bold),
                    Cell::new(t.name()),
                    Cell::new(t.description()),
                ]);
            }
            println!("{table}");

            let mut lengths = Table::new();
            lengths.load_preset(comfy_table::presets::UTF8_FULL);
            lengths.set_header(vec!["Length", "Words"]);
            for l in LengthTier::ALL {
                lengths.add_row(vec![
                    Cell::new(l.id()),
                    Cell::new(l.word_range()),
                ]);
            }
            println!("{lengths}");
        }
    }
    Ok(())
}

fn output_styles(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json | OutputFormat::Auto => {
            let styles: Vec<_> = CitationStyle::ALL
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "id": s.id(),
                        "name": s.name(),
                        "description": s.description(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&styles)?);
        }
        OutputFormat::Plain => {
            for s in CitationStyle::ALL {
                println!("{} - {} ({})", s.id(), s.name(), s.description());
            }
        }
        OutputFormat::Table => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Style", "Name", "Description"]);
            for s in CitationStyle::ALL {
                table.add_row(vec![
                    Cell::new(s.id()).add_attribute(Attribute::Bold),
                    Cell::new(s.name()),
                    Cell::new(s.description()),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}
