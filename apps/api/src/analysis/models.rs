//! Value types that flow through one analysis request.
//!
//! Everything here is created fresh per request and never mutated after
//! normalization.

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;

// ────────────────────────────────────────────────────────────────────────────
// Input
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub resume_text: String,
    pub job_description: String,
}

impl AnalysisRequest {
    pub fn new(resume_text: impl Into<String>, job_description: impl Into<String>) -> Self {
        Self {
            resume_text: resume_text.into(),
            job_description: job_description.into(),
        }
    }

    /// Rejects whitespace-only fields. Must run before any network call.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.resume_text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput("resume_text"));
        }
        if self.job_description.trim().is_empty() {
            return Err(AnalysisError::EmptyInput("job_description"));
        }
        Ok(())
    }
}

/// Which JSON schema the model is asked for in structured mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaProfile {
    /// match_score, strengths, weaknesses, suggestions, skill_matches.
    #[default]
    Minimal,
    /// Minimal plus the ATS-style sections.
    Extended,
}

impl FromStr for SchemaProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(SchemaProfile::Minimal),
            "extended" | "ats" => Ok(SchemaProfile::Extended),
            other => Err(format!(
                "unknown schema profile '{other}' (expected 'minimal' or 'extended')"
            )),
        }
    }
}

/// How the model is asked to answer. Fixed per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisMode {
    StructuredJson { profile: SchemaProfile },
    FreeformText,
}

impl Default for AnalysisMode {
    fn default() -> Self {
        AnalysisMode::StructuredJson {
            profile: SchemaProfile::default(),
        }
    }
}

impl AnalysisMode {
    /// Parses `structured` / `freeform`; `profile` only applies to structured.
    pub fn parse(mode: &str, profile: SchemaProfile) -> Result<Self, String> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "structured" | "json" => Ok(AnalysisMode::StructuredJson { profile }),
            "freeform" | "text" => Ok(AnalysisMode::FreeformText),
            other => Err(format!(
                "unknown analysis mode '{other}' (expected 'structured' or 'freeform')"
            )),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Structured output
// ────────────────────────────────────────────────────────────────────────────

/// A 0–100 score after clamping.
pub type Score = u8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionVerbs {
    pub used: Vec<String>,
    pub recommended: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alignment {
    pub score: Score,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatScore {
    pub score: Score,
    pub issues: Vec<String>,
    pub positives: Vec<String>,
}

/// Normalized reply for `AnalysisMode::StructuredJson`.
///
/// Extended sections are `None` when the model omitted them (or the
/// `Minimal` profile is active); `Some(vec![])` means the model reported zero
/// items. Field names match the JSON schema, so serializing this struct
/// yields a reply the normalizer accepts unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredResult {
    pub match_score: Score,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    /// Insertion order is the model's order; chart axes follow it.
    pub skill_matches: IndexMap<String, Score>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ats_compatibility: Option<Score>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_verbs: Option<ActionVerbs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education_alignment: Option<Alignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_alignment: Option<Alignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_score: Option<FormatScore>,
}

// ────────────────────────────────────────────────────────────────────────────
// Freeform output
// ────────────────────────────────────────────────────────────────────────────

/// Normalized reply for `AnalysisMode::FreeformText`. Best-effort by nature:
/// sections are positional and any of them may be absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeformResult {
    pub segments: Vec<String>,
    pub strengths: Option<String>,
    pub improvements: Option<String>,
    pub suggestions: Option<String>,
    /// 0.0 – 1.0
    pub match_percentage: Option<f64>,
    pub recommendations: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "analysis", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Structured(StructuredResult),
    Freeform(FreeformResult),
}
