//! Citation lookup, formatting and interleaving.
//!
//! Data flows one way: [`BibliographicLookup`] finds records, [`format_citation`]
//! renders them, and [`interleave`] numbers them into prose.

mod format;
mod interleave;
mod lookup;

pub use format::{
    format_citation, structured_citation, StructuredCitation, NO_DATE, UNKNOWN_AUTHOR,
};
pub use interleave::{
    append_references, has_bibliography_heading, interleave, interleave_with_references,
    placeholder_regex, Interleaved, REFERENCES_HEADING,
};
pub use lookup::BibliographicLookup;
