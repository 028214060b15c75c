//! # paper-forge
//!
//! Generates academic papers grounded in real bibliographic records, with
//! citations formatted in APA, MLA or Chicago style and LaTeX output.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (BibliographicRecord, GenerateRequest, DocumentAggregate)
//! - [`sources`]: Bibliographic backends behind the [`Source`] trait (CrossRef)
//! - [`citation`]: Lookup, style formatting and placeholder interleaving
//! - [`generation`]: Text generation backends behind the [`Generator`] trait (Gemini)
//! - [`document`]: Document assembly, research extras, LaTeX typesetting and analytics
//! - [`mcp`]: MCP protocol implementation and server
//! - [`utils`]: HTTP client, retry and input validation
//! - [`config`]: Configuration management

pub mod citation;
pub mod config;
pub mod document;
pub mod generation;
pub mod mcp;
pub mod models;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use citation::BibliographicLookup;
pub use document::Assembler;
pub use generation::Generator;
pub use models::{BibliographicRecord, CitationStyle, DocumentAggregate, GenerateRequest};
pub use sources::Source;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
