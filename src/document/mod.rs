//! Document assembly and the forms a finished document can take.
//!
//! - [`Assembler`]: outline, body, citations and references for one request
//! - [`EnhancedPaper`]: a document plus research gaps, methodology, impact
//!   and a peer review checklist
//! - [`to_typeset`]: LaTeX rendering of a body
//! - [`analyze`]: readability and argument scoring
//! - [`export_pdf`]: placeholder for PDF output

mod analytics;
mod assembler;
mod insights;
mod pdf;
mod typeset;

pub use analytics::{
    analyze, analyze_argument_structure, analyze_readability, improvement_suggestions,
    quality_score, ArgumentStructure, PaperAnalysis, QualityScore, Readability, ReadabilityLevel,
};
pub use assembler::{extract_title, Assembler, AssemblySettings};
pub use insights::{
    Counterarguments, EnhancedPaper, ResearchGaps, ResearchProposal, DEFAULT_FUNDING_TYPE,
};
pub use pdf::{export_pdf, PdfExport, PDF_UNAVAILABLE};
pub use typeset::{
    escape_latex, render_document, to_typeset, typeset_body, DEFAULT_AUTHOR, DEFAULT_TEX_FILENAME,
};
