//! Markdown-ish body text to LaTeX.
//!
//! The body is scanned line by line into blocks (headings, text lines) whose
//! inline content is a small tree of text runs, bold and italic spans, and
//! citation brackets. Emission walks that tree, so markup commands are written
//! once and only free text goes through [`escape_latex`].

use std::sync::OnceLock;

use regex::Regex;

/// Author used when the caller provides none
pub const DEFAULT_AUTHOR: &str = "Research Assistant";

/// File name used when the caller provides none
pub const DEFAULT_TEX_FILENAME: &str = "research_paper.tex";

const PREAMBLE: &str = r"\documentclass[12pt,a4paper]{article}
\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage{amsmath}
\usepackage{amsfonts}
\usepackage{amssymb}
\usepackage{graphicx}
\usepackage{natbib}
\usepackage{url}
\usepackage{hyperref}
\usepackage{geometry}
\usepackage{setspace}

\geometry{margin=1in}
\doublespacing
";

const ABSTRACT: &str = "This research paper was generated using an AI-powered research \
    assistant. The content provides a comprehensive analysis of the given topic with proper \
    academic structure and formatting.";

/// Deepest emphasis nesting the scanner will try to open
const MAX_NESTING: usize = 4;

/// Escape LaTeX control characters in one pass
///
/// Every character is looked at once, so a backslash already in the input
/// becomes `\textbackslash{}` and is never re-escaped by a later rule.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str(r"\&"),
            '%' => out.push_str(r"\%"),
            '$' => out.push_str(r"\$"),
            '#' => out.push_str(r"\#"),
            '^' => out.push_str(r"\textasciicircum{}"),
            '_' => out.push_str(r"\_"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '\\' => out.push_str(r"\textbackslash{}"),
            other => out.push(other),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delim {
    Bold,
    Italic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Inline {
    Text(String),
    Bold(Vec<Inline>),
    Italic(Vec<Inline>),
    Cite(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    Heading(usize, Vec<Inline>),
    Line(Vec<Inline>),
}

fn scan_blocks(body: &str) -> Vec<Block> {
    body.split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            match heading_level(line) {
                Some((level, rest)) => Block::Heading(level, scan_inline(rest)),
                None => Block::Line(scan_inline(line)),
            }
        })
        .collect()
}

/// `# `, `## ` or `### ` at line start
fn heading_level(line: &str) -> Option<(usize, &str)> {
    ["### ", "## ", "# "]
        .iter()
        .find_map(|marker| line.strip_prefix(marker).map(|rest| (marker.len() - 1, rest)))
}

fn scan_inline(line: &str) -> Vec<Inline> {
    InlineScanner::new(line).build(0, None, 0).0
}

/// Scanner states: no closer, bold closer or italic closer, at each depth
const STATES: usize = 3 * (MAX_NESTING + 1);

fn state(closer: Option<Delim>, depth: usize) -> usize {
    let kind = match closer {
        None => 0,
        Some(Delim::Bold) => 1,
        Some(Delim::Italic) => 2,
    };
    kind * (MAX_NESTING + 1) + depth
}

/// What the scanner does at one position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// The expected closer; scanning resumes at the given position
    Close(usize),
    /// An emphasis span with its inner start and the position after its closer
    Span(Delim, usize, usize),
    /// A citation ending before the given position
    Cite(usize),
    /// A literal character
    Char,
}

/// Inline scanner for one line
///
/// `ends[pos][state]` is where a scan starting at `pos` in `state` stops, or
/// `None` when its closer never comes. The table is filled from the end of
/// the line backwards, so an unclosed opener is rejected by lookup instead of
/// by rescanning the rest of the line.
struct InlineScanner {
    chars: Vec<char>,
    next_close: Vec<Option<usize>>,
    ends: Vec<[Option<usize>; STATES]>,
}

impl InlineScanner {
    fn new(line: &str) -> Self {
        let chars: Vec<char> = line.chars().collect();
        let len = chars.len();

        let mut next_close = vec![None; len + 1];
        for pos in (0..len).rev() {
            next_close[pos] = if chars[pos] == ']' {
                Some(pos)
            } else {
                next_close[pos + 1]
            };
        }

        let mut scanner = Self {
            chars,
            next_close,
            ends: vec![[None; STATES]; len + 1],
        };

        for pos in (0..=len).rev() {
            for closer in [None, Some(Delim::Bold), Some(Delim::Italic)] {
                for depth in 0..=MAX_NESTING {
                    let idx = state(closer, depth);
                    let end = if pos == len {
                        closer.is_none().then_some(len)
                    } else {
                        match scanner.step(pos, closer, depth) {
                            Step::Close(end) => Some(end),
                            Step::Span(_, _, end) | Step::Cite(end) => scanner.ends[end][idx],
                            Step::Char => scanner.ends[pos + 1][idx],
                        }
                    };
                    scanner.ends[pos][idx] = end;
                }
            }
        }

        scanner
    }

    /// Where a nested scan from `pos` closes, if it does
    fn end(&self, pos: usize, closer: Delim, depth: usize) -> Option<usize> {
        self.ends
            .get(pos)
            .and_then(|row| row[state(Some(closer), depth)])
    }

    /// Decide the step at `pos`; only reads table rows after `pos`
    fn step(&self, pos: usize, closer: Option<Delim>, depth: usize) -> Step {
        match self.chars[pos] {
            '*' => {
                if self.chars.get(pos + 1) == Some(&'*') {
                    if closer == Some(Delim::Bold) {
                        return Step::Close(pos + 2);
                    }
                    if depth < MAX_NESTING {
                        // An empty span closes right after its opener
                        if let Some(end) = self.end(pos + 2, Delim::Bold, depth + 1) {
                            if end > pos + 4 {
                                return Step::Span(Delim::Bold, pos + 2, end);
                            }
                        }
                    }
                }

                if closer == Some(Delim::Italic) {
                    return Step::Close(pos + 1);
                }
                if depth < MAX_NESTING {
                    if let Some(end) = self.end(pos + 1, Delim::Italic, depth + 1) {
                        if end > pos + 2 {
                            return Step::Span(Delim::Italic, pos + 1, end);
                        }
                    }
                }
                Step::Char
            }
            '[' => match self.citation_end(pos) {
                Some(end) => Step::Cite(end),
                None => Step::Char,
            },
            _ => Step::Char,
        }
    }

    /// `[Author, YYYY]` starting at `pos`, returning the position after `]`
    fn citation_end(&self, pos: usize) -> Option<usize> {
        let close = self.next_close[pos + 1]?;
        // At least one author character, then ", " and four digits
        if close < pos + 8 {
            return None;
        }
        let separator = &self.chars[close - 6..close - 4];
        let year = &self.chars[close - 4..close];
        (separator == &[',', ' '] && year.iter().all(|c| c.is_ascii_digit())).then_some(close + 1)
    }

    fn citation_key_at(&self, pos: usize, end: usize) -> String {
        let close = end - 1;
        let author: String = self.chars[pos + 1..close - 6].iter().collect();
        let year: String = self.chars[close - 4..close].iter().collect();
        citation_key(&author, &year)
    }

    /// Build nodes from `pos`; only called where the table says the scan closes
    fn build(&self, mut pos: usize, closer: Option<Delim>, depth: usize) -> (Vec<Inline>, usize) {
        let mut nodes = Vec::new();
        let mut text = String::new();

        fn flush(text: &mut String, nodes: &mut Vec<Inline>) {
            if !text.is_empty() {
                nodes.push(Inline::Text(std::mem::take(text)));
            }
        }

        while pos < self.chars.len() {
            match self.step(pos, closer, depth) {
                Step::Close(end) => {
                    flush(&mut text, &mut nodes);
                    return (nodes, end);
                }
                Step::Span(delim, start, end) => {
                    flush(&mut text, &mut nodes);
                    let (inner, _) = self.build(start, Some(delim), depth + 1);
                    nodes.push(match delim {
                        Delim::Bold => Inline::Bold(inner),
                        Delim::Italic => Inline::Italic(inner),
                    });
                    pos = end;
                }
                Step::Cite(end) => {
                    flush(&mut text, &mut nodes);
                    nodes.push(Inline::Cite(self.citation_key_at(pos, end)));
                    pos = end;
                }
                Step::Char => {
                    text.push(self.chars[pos]);
                    pos += 1;
                }
            }
        }

        flush(&mut text, &mut nodes);
        (nodes, pos)
    }
}

/// Alphanumeric author fragment followed by the year
fn citation_key(author: &str, year: &str) -> String {
    let fragment: String = author.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if fragment.is_empty() {
        format!("ref{}", year)
    } else {
        format!("{}{}", fragment, year)
    }
}

fn emit_inline(nodes: &[Inline], out: &mut String) {
    for node in nodes {
        match node {
            Inline::Text(text) => out.push_str(&escape_latex(text)),
            Inline::Bold(inner) => {
                out.push_str(r"\textbf{");
                emit_inline(inner, out);
                out.push('}');
            }
            Inline::Italic(inner) => {
                out.push_str(r"\textit{");
                emit_inline(inner, out);
                out.push('}');
            }
            Inline::Cite(key) => {
                out.push_str(r"\citep{");
                out.push_str(key);
                out.push('}');
            }
        }
    }
}

fn paragraph_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid paragraph pattern"))
}

/// Convert body text to LaTeX without the document shell
///
/// Headings become `\section`/`\subsection`/`\subsubsection`, emphasis
/// becomes `\textbf`/`\textit`, `[Author, YYYY]` becomes `\citep{...}`, all
/// other text is escaped and runs of blank lines collapse to one.
pub fn typeset_body(body: &str) -> String {
    let mut out = String::with_capacity(body.len() + body.len() / 4);

    for (i, block) in scan_blocks(body).iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match block {
            Block::Heading(level, inline) => {
                let command = match level {
                    1 => "section",
                    2 => "subsection",
                    _ => "subsubsection",
                };
                out.push('\\');
                out.push_str(command);
                out.push('{');
                emit_inline(inline, &mut out);
                out.push('}');
            }
            Block::Line(inline) => emit_inline(inline, &mut out),
        }
    }

    paragraph_break().replace_all(&out, "\n\n").into_owned()
}

/// Full LaTeX document for the given date string
pub fn render_document(body: &str, title: &str, author: &str, date: &str) -> String {
    let author = if author.trim().is_empty() {
        DEFAULT_AUTHOR
    } else {
        author
    };

    format!(
        "{PREAMBLE}
\\title{{{}}}
\\author{{{}}}
\\date{{{}}}

\\begin{{document}}

\\maketitle

\\begin{{abstract}}
{ABSTRACT}
\\end{{abstract}}

{}

\\end{{document}}
",
        escape_latex(title),
        escape_latex(author),
        escape_latex(date),
        typeset_body(body),
    )
}

/// Full LaTeX document dated today
pub fn to_typeset(body: &str, title: &str, author: &str) -> String {
    let date = chrono::Local::now().format("%B %d, %Y").to_string();
    render_document(body, title, author, &date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_is_escaped() {
        assert_eq!(typeset_body("Accuracy rose to 100%."), r"Accuracy rose to 100\%.");
    }

    #[test]
    fn test_escape_every_control_character_once() {
        assert_eq!(
            escape_latex(r"& % $ # ^ _ { } ~ \"),
            r"\& \% \$ \# \textasciicircum{} \_ \{ \} \textasciitilde{} \textbackslash{}"
        );
    }

    #[test]
    fn test_retypesetting_double_escapes() {
        let once = typeset_body("100%");
        let twice = typeset_body(&once);

        assert_eq!(once, r"100\%");
        assert!(twice.contains(r"\textbackslash{}\%"));
    }

    #[test]
    fn test_headings() {
        assert_eq!(
            typeset_body("# Intro\n## Background\n### Detail\n#### Deep"),
            "\\section{Intro}\n\\subsection{Background}\n\\subsubsection{Detail}\n\\#\\#\\#\\# Deep"
        );
        assert_eq!(typeset_body("#hashtag"), r"\#hashtag");
    }

    #[test]
    fn test_bold_wraps_italic() {
        assert_eq!(
            typeset_body("**bold *and italic***"),
            r"\textbf{bold \textit{and italic}}"
        );
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(
            typeset_body("a **b** and *c* here"),
            r"a \textbf{b} and \textit{c} here"
        );
        assert_eq!(typeset_body("2 * 3 = 6"), "2 * 3 = 6");
        assert_eq!(typeset_body("*open only"), "*open only");
    }

    #[test]
    fn test_long_line_of_unclosed_openers() {
        let line = "*aaaa**".repeat(1600);
        let out = typeset_body(&line);

        assert_eq!(out.matches('a').count(), 6400);
        assert_eq!(out.matches('{').count(), out.matches('}').count());
    }

    #[test]
    fn test_long_run_of_open_brackets() {
        let line = format!("{}a, 2020]", "[".repeat(5000));
        assert_eq!(typeset_body(&line), r"\citep{a2020}");
        assert_eq!(typeset_body(&"[".repeat(5000)), "[".repeat(5000));
    }

    #[test]
    fn test_emphasis_does_not_span_lines() {
        assert_eq!(typeset_body("*start\nend*"), "*start\nend*");
    }

    #[test]
    fn test_citations() {
        assert_eq!(
            typeset_body("As shown [Smith et al., 2020]."),
            r"As shown \citep{Smithetal2020}."
        );
        assert_eq!(typeset_body("[__, 1999]"), r"\citep{ref1999}");
        assert_eq!(typeset_body("[1] Smith"), r"[1] Smith");
    }

    #[test]
    fn test_markup_inside_headings() {
        assert_eq!(
            typeset_body("## Cost of *R&D*"),
            r"\subsection{Cost of \textit{R\&D}}"
        );
    }

    #[test]
    fn test_blank_line_runs_collapse() {
        assert_eq!(typeset_body("one\n\n\n  \n\ntwo"), "one\n\ntwo");
    }

    #[test]
    fn test_document_shell() {
        let doc = render_document("Body", "Costs & Benefits", "", "January 02, 2024");

        assert!(doc.starts_with(r"\documentclass[12pt,a4paper]{article}"));
        assert!(doc.contains(r"\title{Costs \& Benefits}"));
        assert!(doc.contains(r"\author{Research Assistant}"));
        assert!(doc.contains(r"\date{January 02, 2024}"));
        assert!(doc.contains("\\begin{abstract}\nThis research paper was generated"));
        assert!(doc.contains("\n\nBody\n\n\\end{document}"));
    }

    #[test]
    fn test_title_is_not_parsed_as_markup() {
        let doc = render_document("", "# *Not* a heading", "A_B", "today");
        assert!(doc.contains(r"\title{\# *Not* a heading}"));
        assert!(doc.contains(r"\author{A\_B}"));
    }
}
