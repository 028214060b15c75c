//! Readability and argument-structure scoring for finished text.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

const ACADEMIC_TERMS: [&str; 6] = [
    "however",
    "furthermore",
    "consequently",
    "nevertheless",
    "therefore",
    "moreover",
];
const CLAIM_TERMS: [&str; 5] = ["argue", "claim", "assert", "propose", "suggest"];
const EVIDENCE_TERMS: [&str; 5] = ["evidence", "data", "research", "study", "findings"];
const TRANSITION_TERMS: [&str; 4] = ["however", "furthermore", "similarly", "therefore"];

/// Words longer than this count as complex
const COMPLEX_WORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReadabilityLevel {
    #[serde(rename = "Graduate")]
    Graduate,
    #[serde(rename = "Undergraduate")]
    Undergraduate,
    #[serde(rename = "High School")]
    HighSchool,
    #[serde(rename = "General Public")]
    GeneralPublic,
}

impl ReadabilityLevel {
    fn classify(avg_words: f64, complex_ratio: f64) -> Self {
        if avg_words > 20.0 && complex_ratio > 0.3 {
            ReadabilityLevel::Graduate
        } else if avg_words > 15.0 && complex_ratio > 0.2 {
            ReadabilityLevel::Undergraduate
        } else if avg_words > 12.0 {
            ReadabilityLevel::HighSchool
        } else {
            ReadabilityLevel::GeneralPublic
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReadabilityLevel::Graduate => "Graduate",
            ReadabilityLevel::Undergraduate => "Undergraduate",
            ReadabilityLevel::HighSchool => "High School",
            ReadabilityLevel::GeneralPublic => "General Public",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readability {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_words_per_sentence: f64,
    pub complex_word_ratio: f64,
    pub academic_score: usize,
    pub readability_level: ReadabilityLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgumentStructure {
    pub claim_density: usize,
    pub evidence_density: usize,
    pub transition_density: usize,
    pub argument_balance: f64,
    pub flow_score: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityScore {
    pub overall_score: f64,
    pub readability_score: f64,
    pub argument_score: f64,
    pub grade: char,
}

/// Full analysis of one text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaperAnalysis {
    pub readability: Readability,
    pub argument_structure: ArgumentStructure,
    pub quality_score: QualityScore,
    pub suggestions: Vec<String>,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn sentence_split() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+").expect("valid sentence pattern"))
}

pub fn analyze_readability(content: &str) -> Readability {
    let words: Vec<&str> = content.split_whitespace().collect();
    let word_count = words.len();
    let sentence_count = sentence_split()
        .split(content)
        .filter(|s| !s.trim().is_empty())
        .count();

    let avg_words = word_count as f64 / sentence_count.max(1) as f64;
    let complex = words
        .iter()
        .filter(|w| w.chars().count() > COMPLEX_WORD_LEN)
        .count();
    let complex_ratio = complex as f64 / word_count.max(1) as f64;
    let academic_score = words
        .iter()
        .filter(|w| ACADEMIC_TERMS.contains(&w.to_lowercase().as_str()))
        .count();

    Readability {
        word_count,
        sentence_count,
        avg_words_per_sentence: round_to(avg_words, 2),
        complex_word_ratio: round_to(complex_ratio, 3),
        academic_score,
        readability_level: ReadabilityLevel::classify(avg_words, complex_ratio),
    }
}

pub fn analyze_argument_structure(content: &str) -> ArgumentStructure {
    let lowered = content.to_lowercase();
    let count = |terms: &[&str]| {
        lowered
            .split_whitespace()
            .filter(|w| terms.contains(w))
            .count()
    };

    let claims = count(&CLAIM_TERMS);
    let evidence = count(&EVIDENCE_TERMS);
    let transitions = count(&TRANSITION_TERMS);

    ArgumentStructure {
        claim_density: claims,
        evidence_density: evidence,
        transition_density: transitions,
        argument_balance: round_to(evidence as f64 / claims.max(1) as f64, 2),
        flow_score: transitions,
    }
}

fn grade(score: f64) -> char {
    if score >= 90.0 {
        'A'
    } else if score >= 80.0 {
        'B'
    } else if score >= 70.0 {
        'C'
    } else if score >= 60.0 {
        'D'
    } else {
        'F'
    }
}

fn quality_from(readability: &Readability, argument: &ArgumentStructure) -> QualityScore {
    let readability_score = (readability.academic_score as f64 * 5.0 + 50.0).min(100.0);
    let argument_score =
        (argument.argument_balance * 30.0 + argument.flow_score as f64 * 5.0).min(100.0);
    let overall = (readability_score + argument_score) / 2.0;

    QualityScore {
        overall_score: round_to(overall, 1),
        readability_score: round_to(readability_score, 1),
        argument_score: round_to(argument_score, 1),
        grade: grade(overall),
    }
}

fn suggestions_from(readability: &Readability, argument: &ArgumentStructure) -> Vec<String> {
    let mut suggestions = Vec::new();

    if readability.avg_words_per_sentence > 25.0 {
        suggestions
            .push("Consider breaking down long sentences for better readability".to_string());
    }
    if readability.complex_word_ratio > 0.4 {
        suggestions.push("Balance complex terminology with clearer explanations".to_string());
    }
    if argument.argument_balance < 0.5 {
        suggestions.push("Strengthen arguments with more evidence and supporting data".to_string());
    }
    if argument.flow_score < 5 {
        suggestions.push("Add more transitional phrases to improve logical flow".to_string());
    }

    suggestions
}

pub fn quality_score(content: &str) -> QualityScore {
    quality_from(&analyze_readability(content), &analyze_argument_structure(content))
}

pub fn improvement_suggestions(content: &str) -> Vec<String> {
    suggestions_from(&analyze_readability(content), &analyze_argument_structure(content))
}

/// Score a text on every axis at once
pub fn analyze(content: &str) -> PaperAnalysis {
    let readability = analyze_readability(content);
    let argument_structure = analyze_argument_structure(content);

    PaperAnalysis {
        quality_score: quality_from(&readability, &argument_structure),
        suggestions: suggestions_from(&readability, &argument_structure),
        readability,
        argument_structure,
    }
}
