//! Rendering: chart input, Markdown report, and user-facing error text.

use std::fmt::Write;

use indexmap::IndexMap;
use serde::Serialize;

use crate::analysis::models::{AnalysisOutcome, FreeformResult, Score, StructuredResult};
use crate::errors::AnalysisError;

const BAR_WIDTH: usize = 20;
const NOT_PROVIDED: &str = "_Not provided by the model._";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadarPoint {
    pub axis: String,
    pub value: Score,
}

/// Input for a radial skill chart: one spoke per skill, fixed 0–100 scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadarChart {
    pub title: &'static str,
    pub scale_min: Score,
    pub scale_max: Score,
    pub points: Vec<RadarPoint>,
}

impl RadarChart {
    /// Axis order is the insertion order of `skill_matches`.
    pub fn from_skill_matches(skill_matches: &IndexMap<String, Score>) -> Self {
        Self {
            title: "Skills Match Analysis",
            scale_min: 0,
            scale_max: 100,
            points: skill_matches
                .iter()
                .map(|(skill, score)| RadarPoint {
                    axis: skill.clone(),
                    value: *score,
                })
                .collect(),
        }
    }
}

/// Text progress bar, e.g. `[██████████░░░░░░░░░░] 50%`.
pub fn progress_bar(score: Score) -> String {
    let score = score.min(100);
    let filled = (score as usize * BAR_WIDTH + 50) / 100;
    format!(
        "[{}{}] {}%",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        score
    )
}

pub fn render_markdown(outcome: &AnalysisOutcome) -> String {
    match outcome {
        AnalysisOutcome::Structured(result) => render_structured(result),
        AnalysisOutcome::Freeform(result) => render_freeform(result),
    }
}

// `write!` into a String cannot fail, so results below are discarded.
fn render_structured(result: &StructuredResult) -> String {
    let mut out = String::from("# Analysis Results\n\n");
    let _ = writeln!(out, "## Overall Match Score\n\n{}\n", progress_bar(result.match_score));

    push_list(&mut out, "Strengths", &result.strengths);
    push_list(&mut out, "Areas for Improvement", &result.weaknesses);
    push_list(&mut out, "Suggestions", &result.suggestions);

    out.push_str("## Skills Match Analysis\n\n");
    if result.skill_matches.is_empty() {
        out.push_str("_No skills reported._\n\n");
    } else {
        out.push_str("| Skill | Match |\n|---|---|\n");
        for (skill, score) in &result.skill_matches {
            let _ = writeln!(out, "| {} | {} |", escape_cell(skill), progress_bar(*score));
        }
        out.push('\n');
    }

    if let Some(score) = result.ats_compatibility {
        let _ = writeln!(out, "## ATS Compatibility\n\n{}\n", progress_bar(score));
    }
    if let Some(keywords) = &result.missing_keywords {
        push_list(&mut out, "Missing Keywords", keywords);
    }
    if let Some(verbs) = &result.action_verbs {
        push_list(&mut out, "Action Verbs Used", &verbs.used);
        push_list(&mut out, "Recommended Action Verbs", &verbs.recommended);
    }
    for (title, alignment) in [
        ("Education Alignment", &result.education_alignment),
        ("Experience Alignment", &result.experience_alignment),
    ] {
        if let Some(alignment) = alignment {
            let _ = writeln!(
                out,
                "## {title}\n\n{}\n\n{}\n",
                progress_bar(alignment.score),
                alignment.feedback
            );
        }
    }
    if let Some(format) = &result.format_score {
        let _ = writeln!(out, "## Format Score\n\n{}\n", progress_bar(format.score));
        push_list(&mut out, "Format Issues", &format.issues);
        push_list(&mut out, "Format Positives", &format.positives);
    }

    out.trim_end().to_string() + "\n"
}

fn render_freeform(result: &FreeformResult) -> String {
    let mut out = String::from("# Analysis Results\n\n");

    if let Some(pct) = result.match_percentage {
        let score = (pct * 100.0).round() as Score;
        let _ = writeln!(out, "## Overall Match\n\n{}\n", progress_bar(score));
    }

    for (title, section) in [
        ("Strengths", &result.strengths),
        ("Areas for Improvement", &result.improvements),
        ("Suggestions", &result.suggestions),
        ("Recommendations", &result.recommendations),
    ] {
        let _ = writeln!(
            out,
            "## {title}\n\n{}\n",
            section.as_deref().unwrap_or(NOT_PROVIDED)
        );
    }

    out.trim_end().to_string() + "\n"
}

fn push_list(out: &mut String, title: &str, items: &[String]) {
    let _ = writeln!(out, "## {title}\n");
    if items.is_empty() {
        out.push_str("_None._\n");
    }
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
    out.push('\n');
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Message shown to the user for a failed analysis.
pub fn render_error(err: &AnalysisError) -> String {
    match err {
        AnalysisError::EmptyInput("job_description") => {
            "Please provide a job description.".to_string()
        }
        AnalysisError::EmptyInput("resume_text") => {
            "No text could be read from the resume. Please upload a text-based PDF.".to_string()
        }
        AnalysisError::EmptyInput(_) => "Please upload a resume first.".to_string(),
        AnalysisError::ExtractionFailed(e) => {
            format!("Error extracting text from PDF: {e}")
        }
        AnalysisError::MissingCredential(provider) => format!(
            "The {provider} API key is not configured. Set {} and try again.",
            provider.api_key_var()
        ),
        AnalysisError::TransportFailed(e) => {
            format!("The analysis service could not be reached: {e}. Please try again.")
        }
        AnalysisError::MalformedResponse { .. } => {
            "Error parsing the analysis response. Please try again.".to_string()
        }
    }
}
