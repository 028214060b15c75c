//! Prompt templates for outline and body generation.

use crate::models::{paper_instruction, CitationStyle, LengthTier};

/// Outline request
pub fn outline_prompt(topic: &str, paper_type: &str) -> String {
    format!(
        "Create a detailed outline for a {paper_type} on the topic: {topic}

Include:
- Main sections and subsections
- Key points to cover in each section
- Logical flow of arguments
- Suggested research areas

Format as a structured outline with Roman numerals, letters, and numbers.
"
    )
}

/// Body request without external sources
///
/// The model is asked for `[Author, Year]` placeholders so they can be
/// numbered later.
pub fn paper_prompt(
    topic: &str,
    paper_type: &str,
    length: LengthTier,
    outline: Option<&str>,
) -> String {
    let mut prompt = format!(
        "{} on the topic: {topic}

Requirements:
- Length: {}
- Include proper academic structure with introduction, body, and conclusion
- Use formal academic writing style
- Include placeholder citations in the format [Author, Year]
- Ensure logical flow and coherent arguments
- Include specific examples and evidence where relevant

Structure the paper with clear headings and subheadings.
Make it comprehensive, well-researched, and academically rigorous.
",
        paper_instruction(paper_type),
        length.word_range(),
    );

    if let Some(outline) = outline.map(str::trim).filter(|o| !o.is_empty()) {
        prompt.push_str("\nFollow this outline:\n");
        prompt.push_str(outline);
        prompt.push('\n');
    }

    prompt
}

/// Body request grounded in numbered, already formatted sources
pub fn cited_paper_prompt(
    topic: &str,
    paper_type: &str,
    length: LengthTier,
    numbered_citations: &[String],
    style: CitationStyle,
) -> String {
    format!(
        "{} on the topic: {topic}

Use these real academic sources and cite them appropriately:
{}

Requirements:
- Length: {}
- Include proper academic structure with introduction, body, and conclusion
- Use formal academic writing style
- Cite the provided sources using [1], [2], etc. format throughout the text
- Include a complete bibliography at the end in {} format
- Ensure logical flow and coherent arguments
- Reference specific findings and concepts from the provided sources

Structure the paper with clear headings and subheadings.
Make it comprehensive, well-researched, and academically rigorous.
End with a \"References\" section listing all cited sources.
",
        paper_instruction(paper_type),
        numbered_citations.join("\n"),
        length.word_range(),
        style.id().to_uppercase(),
    )
}

/// Gaps, trends and future directions for a topic
pub fn research_gaps_prompt(topic: &str) -> String {
    format!(
        "Analyze the current state of research on \"{topic}\" and identify:
1. Key research gaps that need addressing
2. Emerging trends and opportunities
3. Methodological limitations in current studies
4. Future research directions
5. Interdisciplinary connections

Format as structured sections with specific, actionable insights.
"
    )
}

/// Counterarguments and rebuttals for one claim
pub fn counterarguments_prompt(main_argument: &str, topic: &str) -> String {
    format!(
        "For the argument: \"{main_argument}\" in the context of \"{topic}\"

Provide:
1. Three strong counterarguments with evidence
2. Potential rebuttals to each counterargument
3. Areas of nuance and complexity
4. Synthesis opportunities

Maintain academic objectivity and intellectual rigor.
"
    )
}

pub fn methodology_prompt(research_question: &str, field: &str) -> String {
    format!(
        "For research question: \"{research_question}\" in {field}

Suggest:
1. Traditional methodological approaches
2. Innovative/emerging methodologies
3. Mixed-methods approaches
4. Digital/computational methods
5. Ethical considerations
6. Potential limitations and mitigation strategies

Include specific tools, techniques, and frameworks.
"
    )
}

pub fn impact_prompt(topic: &str, findings: &str) -> String {
    format!(
        "For research on \"{topic}\" with findings: \"{findings}\"

Analyze:
1. Academic impact potential
2. Industry/practical applications
3. Policy implications
4. Social impact
5. Economic considerations
6. Long-term significance
7. Stakeholder benefits

Provide specific examples and metrics where possible.
"
    )
}

pub fn peer_review_prompt(paper_type: &str, field: &str) -> String {
    format!(
        "Create a detailed peer review checklist for a {paper_type} in {field}:

Include sections for:
1. Content quality and originality
2. Methodology rigor
3. Literature review completeness
4. Data analysis and interpretation
5. Writing clarity and structure
6. Ethical considerations
7. Reproducibility factors
8. Significance and impact

Provide specific criteria and rating scales.
"
    )
}

/// Section plan for a funding application
pub fn proposal_outline_prompt(research_idea: &str, funding_type: &str) -> String {
    format!(
        "For research idea: \"{research_idea}\" seeking {funding_type} funding

Create proposal outline with:
1. Executive summary structure
2. Problem statement framework
3. Literature review approach
4. Methodology and timeline
5. Budget considerations
6. Impact and dissemination plan
7. Team qualifications
8. Risk assessment

Include specific sections and word count suggestions.
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_prompt_mentions_length_and_placeholders() {
        let prompt = paper_prompt("soil", "essay", LengthTier::Short, None);

        assert!(prompt.starts_with("Write an academic essay on the topic: soil"));
        assert!(prompt.contains("800-1200 words"));
        assert!(prompt.contains("[Author, Year]"));
        assert!(!prompt.contains("Follow this outline"));
    }

    #[test]
    fn test_outline_is_appended_when_present() {
        let prompt = paper_prompt("soil", "research", LengthTier::Medium, Some("I. Intro"));
        assert!(prompt.ends_with("Follow this outline:\nI. Intro\n"));

        let prompt = paper_prompt("soil", "research", LengthTier::Medium, Some("  "));
        assert!(!prompt.contains("Follow this outline"));
    }

    #[test]
    fn test_cited_prompt_lists_sources() {
        let citations = vec!["[1] A (2001). X.".to_string(), "[2] B (2002). Y.".to_string()];
        let prompt =
            cited_paper_prompt("soil", "review", LengthTier::Long, &citations, CitationStyle::Mla);

        assert!(prompt.starts_with("Write a detailed literature review"));
        assert!(prompt.contains("[1] A (2001). X.\n[2] B (2002). Y."));
        assert!(prompt.contains("in MLA format"));
        assert!(prompt.contains("3000-5000 words"));
    }

    #[test]
    fn test_insight_prompts_quote_their_inputs() {
        assert!(research_gaps_prompt("soil carbon")
            .starts_with("Analyze the current state of research on \"soil carbon\""));

        let prompt = counterarguments_prompt("Tillage releases carbon", "soil");
        assert!(prompt.contains("\"Tillage releases carbon\" in the context of \"soil\""));
        assert!(prompt.contains("Three strong counterarguments"));

        assert!(proposal_outline_prompt("Biochar trials", "industry")
            .contains("seeking industry funding"));
        assert!(peer_review_prompt("review", "general")
            .starts_with("Create a detailed peer review checklist for a review in general"));
        assert!(methodology_prompt("Research on soil", "academic")
            .contains("\"Research on soil\" in academic"));
        assert!(impact_prompt("soil", "preliminary findings")
            .contains("with findings: \"preliminary findings\""));
    }
}
