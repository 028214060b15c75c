//! Replacing placeholder citations with numbered markers.
//!
//! Generated prose cites sources as `[Author, 2020]`. Interleaving swaps each
//! placeholder, left to right, for `[1]`, `[2]`, ... while records remain and
//! appends a matching "References" section.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::models::{BibliographicRecord, CitationStyle, ReferenceList};

/// Heading appended ahead of the reference entries
pub const REFERENCES_HEADING: &str = "## References";

/// `[Author-fragment, YYYY]`
pub fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]+), (\d{4})\]").expect("valid placeholder pattern"))
}

/// Whether the text already carries a bibliography
///
/// This is a substring check, so prose that merely mentions "References"
/// also counts.
pub fn has_bibliography_heading(text: &str) -> bool {
    text.contains("References") || text.contains("Bibliography")
}

/// Interleaved text plus the references its markers point at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interleaved {
    pub text: String,
    pub references: ReferenceList,
}

/// Replace placeholders and append a bibliography
///
/// A placeholder is only consumed while an unassigned record remains; later
/// ones are left as written. When the text has no placeholders at all, every
/// record is listed. Nothing changes when `records` is empty.
pub fn interleave_with_references(
    raw_text: &str,
    records: &[BibliographicRecord],
    style: CitationStyle,
) -> Interleaved {
    if records.is_empty() {
        return Interleaved {
            text: raw_text.to_string(),
            references: ReferenceList::new(),
        };
    }

    let mut references = ReferenceList::new();
    let mut remaining = records.iter();
    let mut saw_placeholder = false;

    let mut text = placeholder_regex()
        .replace_all(raw_text, |caps: &Captures| {
            saw_placeholder = true;
            match remaining.next() {
                Some(record) => format!("[{}]", references.push(record.clone())),
                None => caps[0].to_string(),
            }
        })
        .into_owned();

    if !saw_placeholder {
        references = records.iter().cloned().collect();
    }

    append_references(&mut text, &references.numbered(style));

    Interleaved { text, references }
}

/// Append a References section of already numbered entries
///
/// Nothing is appended when there are no entries or the text already has a
/// bibliography. Returns whether a section was written.
pub fn append_references(text: &mut String, numbered: &[String]) -> bool {
    if numbered.is_empty() || has_bibliography_heading(text) {
        return false;
    }

    text.push_str("\n\n");
    text.push_str(REFERENCES_HEADING);
    text.push_str("\n\n");
    for entry in numbered {
        text.push_str(entry);
        text.push_str("\n\n");
    }
    true
}

/// Text-only form of [`interleave_with_references`]
pub fn interleave(raw_text: &str, records: &[BibliographicRecord], style: CitationStyle) -> String {
    interleave_with_references(raw_text, records, style).text
}
