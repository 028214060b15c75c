//! Citation formatting in APA, MLA and Chicago styles.
//!
//! Formatting is total: every record renders to a non-empty string, with
//! missing fields degrading to sentinel text. Venue emphasis uses `*…*` and is
//! left unescaped here.

use serde::Serialize;

use crate::models::{BibliographicRecord, CitationStyle};

/// Author text when a record lists nobody
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Year text for undated records (APA)
pub const NO_DATE: &str = "n.d.";

/// Format a record in the given style
pub fn format_citation(record: &BibliographicRecord, style: CitationStyle) -> String {
    match style {
        CitationStyle::Apa => format_apa(record),
        CitationStyle::Mla => format_mla(record),
        CitationStyle::Chicago => format_chicago(record),
    }
}

/// "A", "A & B", or "A et al."
fn apa_authors(authors: &[String]) -> String {
    match authors {
        [] => UNKNOWN_AUTHOR.to_string(),
        [only] => only.clone(),
        [first, second] => format!("{} & {}", first, second),
        [first, ..] => format!("{} et al.", first),
    }
}

/// MLA and Chicago list the first author only
fn lead_author(authors: &[String]) -> &str {
    authors.first().map(|s| s.as_str()).unwrap_or(UNKNOWN_AUTHOR)
}

/// Author (Year). Title. *Venue*. url
fn format_apa(record: &BibliographicRecord) -> String {
    let year = record
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| NO_DATE.to_string());

    let mut citation = format!("{} ({}). {}.", apa_authors(&record.authors), year, record.title);

    if let Some(ref venue) = record.venue {
        citation.push_str(&format!(" *{}*.", venue));
    }

    if let Some(url) = record.url() {
        citation.push(' ');
        citation.push_str(&url);
    }

    citation
}

/// Author. "Title." *Venue*, Year.
fn format_mla(record: &BibliographicRecord) -> String {
    let mut citation = format!("{}. \"{}.\"", lead_author(&record.authors), record.title);

    if let Some(ref venue) = record.venue {
        citation.push_str(&format!(" *{}*", venue));
    }
    if let Some(year) = record.year {
        citation.push_str(&format!(", {}", year));
    }
    citation.push('.');

    citation
}

/// Author. "Title." *Venue* (Year).
fn format_chicago(record: &BibliographicRecord) -> String {
    let mut citation = format!("{}. \"{}.\"", lead_author(&record.authors), record.title);

    if let Some(ref venue) = record.venue {
        citation.push_str(&format!(" *{}*", venue));
    }
    if let Some(year) = record.year {
        citation.push_str(&format!(" ({})", year));
    }
    citation.push('.');

    citation
}

/// Structured citation data for JSON output
#[derive(Debug, Serialize)]
pub struct StructuredCitation {
    pub style: CitationStyle,
    pub formatted: String,
    #[serde(flatten)]
    pub record: BibliographicRecord,
}

/// Get structured citation data
pub fn structured_citation(
    record: &BibliographicRecord,
    style: CitationStyle,
) -> StructuredCitation {
    StructuredCitation {
        style,
        formatted: format_citation(record, style),
        record: record.clone(),
    }
}
