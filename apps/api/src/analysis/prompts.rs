// Prompt builder for resume analysis.
// Inputs are inserted verbatim: the prompt is plain text, not a serialization format.

use crate::analysis::models::{AnalysisMode, AnalysisRequest, SchemaProfile};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, PLAIN_PROSE_SYSTEM};

const ANALYSIS_HEADER: &str = "Analyze the following resume against the job description.";

const STRUCTURED_INSTRUCTIONS: &str = "\
Provide a detailed analysis including:
1. Key strengths and matches
2. Missing skills or qualifications
3. Specific suggestions for improvement
4. Overall match score (percentage)";

const FREEFORM_INSTRUCTIONS: &str = "\
Please provide, in this exact order, one section per paragraph:
1. Key strengths matching the job requirements
2. Areas of improvement or missing skills
3. Specific suggestions to improve the resume
4. Overall match percentage, written as a number followed by %
5. Recommendations for better alignment with the role

Separate the five sections with a single blank line and do not use blank lines inside a section.";

const MINIMAL_SCHEMA: &str = r#"{
  "strengths": ["strength1", "strength2", ...],
  "weaknesses": ["weakness1", "weakness2", ...],
  "suggestions": ["suggestion1", "suggestion2", ...],
  "match_score": integer 0-100,
  "skill_matches": {"skill1": integer 0-100, "skill2": integer 0-100, ...}
}"#;

const EXTENDED_SCHEMA: &str = r#"{
  "strengths": ["strength1", "strength2", ...],
  "weaknesses": ["weakness1", "weakness2", ...],
  "suggestions": ["suggestion1", "suggestion2", ...],
  "match_score": integer 0-100,
  "skill_matches": {"skill1": integer 0-100, "skill2": integer 0-100, ...},
  "ats_compatibility": integer 0-100,
  "missing_keywords": ["keyword1", "keyword2", ...],
  "action_verbs": {
    "used": ["verb1", "verb2", ...],
    "recommended": ["verb1", "verb2", ...]
  },
  "education_alignment": {"score": integer 0-100, "feedback": "string"},
  "experience_alignment": {"score": integer 0-100, "feedback": "string"},
  "format_score": {
    "score": integer 0-100,
    "issues": ["issue1", "issue2", ...],
    "positives": ["positive1", "positive2", ...]
  }
}"#;

/// Renders the user prompt for `request` in `mode`. Pure and deterministic.
pub fn build(request: &AnalysisRequest, mode: AnalysisMode) -> String {
    let instructions = match mode {
        AnalysisMode::StructuredJson { .. } => STRUCTURED_INSTRUCTIONS,
        AnalysisMode::FreeformText => FREEFORM_INSTRUCTIONS,
    };

    let mut prompt = String::with_capacity(
        request.resume_text.len() + request.job_description.len() + EXTENDED_SCHEMA.len() + 512,
    );
    prompt.push_str(ANALYSIS_HEADER);
    prompt.push('\n');
    prompt.push_str(instructions);
    prompt.push_str("\n\nResume:\n");
    prompt.push_str(&request.resume_text);
    prompt.push_str("\n\nJob Description:\n");
    prompt.push_str(&request.job_description);

    if let AnalysisMode::StructuredJson { profile } = mode {
        prompt.push_str("\n\nFormat the response as a JSON object with the following structure:\n");
        prompt.push_str(schema_template(profile));
        prompt.push_str("\n\nReturn ONLY the JSON object. Every score is an integer from 0 to 100.");
    }

    prompt
}

/// System prompt paired with `build` for the same mode.
pub fn system_prompt(mode: AnalysisMode) -> &'static str {
    match mode {
        AnalysisMode::StructuredJson { .. } => JSON_ONLY_SYSTEM,
        AnalysisMode::FreeformText => PLAIN_PROSE_SYSTEM,
    }
}

pub fn schema_template(profile: SchemaProfile) -> &'static str {
    match profile {
        SchemaProfile::Minimal => MINIMAL_SCHEMA,
        SchemaProfile::Extended => EXTENDED_SCHEMA,
    }
}
