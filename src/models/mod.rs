//! Core data models for records, requests and assembled documents.

mod document;
mod record;
mod request;
mod search;
mod style;

pub use document::{
    word_count, DocumentAggregate, EnhancedDocument, PaperSection, Reference, ReferenceList,
};
pub use record::{BibliographicRecord, RecordBuilder, DOI_RESOLVER, UNTITLED};
pub use request::{paper_instruction, title_case, GenerateRequest, LengthTier, PaperType};
pub use search::{SearchQuery, SearchResponse, DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT};
pub use style::CitationStyle;
