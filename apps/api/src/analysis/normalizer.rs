//! Response normalizer: turns the model's raw reply into an `AnalysisOutcome`.
//!
//! Structured mode is strict: the reply must be a JSON object carrying every
//! required key with the right type, otherwise the whole reply is rejected as
//! `MalformedResponse` with the raw text attached. Scores are clamped, never
//! rejected.
//!
//! Freeform mode is best-effort and never fails: the reply is split on blank
//! lines and sections are read positionally.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::analysis::models::{
    ActionVerbs, Alignment, AnalysisMode, AnalysisOutcome, FormatScore, FreeformResult,
    SchemaProfile, Score, StructuredResult,
};
use crate::errors::AnalysisError;
use crate::llm_client::strip_json_fences;

const STRENGTHS_SEGMENT: usize = 0;
const IMPROVEMENTS_SEGMENT: usize = 1;
const SUGGESTIONS_SEGMENT: usize = 2;
const PERCENTAGE_SEGMENT: usize = 3;
const RECOMMENDATIONS_SEGMENT: usize = 4;

pub fn normalize(raw: &str, mode: AnalysisMode) -> Result<AnalysisOutcome, AnalysisError> {
    match mode {
        AnalysisMode::StructuredJson { profile } => {
            normalize_structured(raw, profile).map(AnalysisOutcome::Structured)
        }
        AnalysisMode::FreeformText => Ok(AnalysisOutcome::Freeform(normalize_freeform(raw))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Structured
// ────────────────────────────────────────────────────────────────────────────

/// Wire shape of a structured reply. Scores arrive as arbitrary JSON numbers;
/// extended sections stay untyped until the profile asks for them.
#[derive(Debug, Deserialize)]
struct RawStructured {
    match_score: f64,
    strengths: Vec<String>,
    weaknesses: Vec<String>,
    suggestions: Vec<String>,
    skill_matches: IndexMap<String, f64>,
    #[serde(default)]
    ats_compatibility: Option<Value>,
    #[serde(default)]
    missing_keywords: Option<Value>,
    #[serde(default)]
    action_verbs: Option<Value>,
    #[serde(default)]
    education_alignment: Option<Value>,
    #[serde(default)]
    experience_alignment: Option<Value>,
    #[serde(default)]
    format_score: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawAlignment {
    score: f64,
    feedback: String,
}

#[derive(Debug, Deserialize)]
struct RawFormatScore {
    score: f64,
    issues: Vec<String>,
    positives: Vec<String>,
}

fn normalize_structured(raw: &str, profile: SchemaProfile) -> Result<StructuredResult, AnalysisError> {
    let body = strip_json_fences(raw);

    // Parse to a Value first so a non-object reply is reported as such.
    let value: Value = serde_json::from_str(body)
        .map_err(|e| AnalysisError::malformed(raw, format!("reply is not valid JSON: {e}")))?;
    if !value.is_object() {
        return Err(AnalysisError::malformed(raw, "reply is not a JSON object"));
    }

    // Re-parse from text rather than from `value` so skill_matches keeps the model's key order.
    let parsed: RawStructured = serde_json::from_str(body)
        .map_err(|e| AnalysisError::malformed(raw, format!("reply does not match schema: {e}")))?;

    let mut result = StructuredResult {
        match_score: clamp_score(parsed.match_score),
        strengths: parsed.strengths,
        weaknesses: parsed.weaknesses,
        suggestions: parsed.suggestions,
        skill_matches: parsed
            .skill_matches
            .into_iter()
            .map(|(skill, score)| (skill, clamp_score(score)))
            .collect(),
        ats_compatibility: None,
        missing_keywords: None,
        action_verbs: None,
        education_alignment: None,
        experience_alignment: None,
        format_score: None,
    };

    if profile == SchemaProfile::Extended {
        result.ats_compatibility =
            optional::<f64>(raw, "ats_compatibility", parsed.ats_compatibility)?.map(clamp_score);
        result.missing_keywords =
            optional::<Vec<String>>(raw, "missing_keywords", parsed.missing_keywords)?;
        result.action_verbs = optional::<ActionVerbs>(raw, "action_verbs", parsed.action_verbs)?;
        result.education_alignment =
            optional::<RawAlignment>(raw, "education_alignment", parsed.education_alignment)?
                .map(into_alignment);
        result.experience_alignment =
            optional::<RawAlignment>(raw, "experience_alignment", parsed.experience_alignment)?
                .map(into_alignment);
        result.format_score = optional::<RawFormatScore>(raw, "format_score", parsed.format_score)?
            .map(|f| FormatScore {
                score: clamp_score(f.score),
                issues: f.issues,
                positives: f.positives,
            });
    }

    Ok(result)
}

/// Type-checks an optional extended section. Missing or `null` is `None`.
fn optional<T: DeserializeOwned>(
    raw: &str,
    key: &str,
    value: Option<Value>,
) -> Result<Option<T>, AnalysisError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v)
            .map(Some)
            .map_err(|e| AnalysisError::malformed(raw, format!("`{key}` has the wrong shape: {e}"))),
    }
}

fn into_alignment(raw: RawAlignment) -> Alignment {
    Alignment {
        score: clamp_score(raw.score),
        feedback: raw.feedback,
    }
}

/// Rounds to the nearest integer and clamps into 0–100.
fn clamp_score(value: f64) -> Score {
    value.round().clamp(0.0, 100.0) as Score
}

// ────────────────────────────────────────────────────────────────────────────
// Freeform
// ────────────────────────────────────────────────────────────────────────────

fn percent_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)%").expect("valid percent regex"))
}

fn normalize_freeform(raw: &str) -> FreeformResult {
    let text = raw.replace("\r\n", "\n");
    let segments: Vec<String> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    let segment = |i: usize| segments.get(i).cloned();

    FreeformResult {
        strengths: segment(STRENGTHS_SEGMENT),
        improvements: segment(IMPROVEMENTS_SEGMENT),
        suggestions: segment(SUGGESTIONS_SEGMENT),
        match_percentage: segments
            .get(PERCENTAGE_SEGMENT)
            .and_then(|s| extract_percentage(s)),
        recommendations: segment(RECOMMENDATIONS_SEGMENT),
        segments,
    }
}

/// First `N%` / `N.N%` in `text`, as a fraction clamped into 0.0–1.0.
fn extract_percentage(text: &str) -> Option<f64> {
    let captures = percent_pattern().captures(text)?;
    let value: f64 = captures.get(1)?.as_str().parse().ok()?;
    Some((value / 100.0).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MINIMAL: AnalysisMode = AnalysisMode::StructuredJson {
        profile: SchemaProfile::Minimal,
    };
    const EXTENDED: AnalysisMode = AnalysisMode::StructuredJson {
        profile: SchemaProfile::Extended,
    };

    fn valid_reply() -> Value {
        json!({
            "match_score": 78,
            "strengths": ["Six years of Rust", "Led axum migration", "Strong async background"],
            "weaknesses": ["No Kubernetes"],
            "suggestions": ["Quantify latency wins", "Mention PostgreSQL tuning"],
            "skill_matches": {"Rust": 95, "PostgreSQL": 60, "Kubernetes": 10}
        })
    }

    fn structured(raw: &str, mode: AnalysisMode) -> StructuredResult {
        match normalize(raw, mode).unwrap() {
            AnalysisOutcome::Structured(r) => r,
            other => panic!("expected structured, got {other:?}"),
        }
    }

    fn freeform(raw: &str) -> FreeformResult {
        match normalize(raw, AnalysisMode::FreeformText).unwrap() {
            AnalysisOutcome::Freeform(r) => r,
            other => panic!("expected freeform, got {other:?}"),
        }
    }

    fn assert_malformed(raw: &str, mode: AnalysisMode) {
        match normalize(raw, mode) {
            Err(AnalysisError::MalformedResponse { raw: kept, .. }) => assert_eq!(kept, raw),
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_reply_is_malformed() {
        assert_malformed("", MINIMAL);
    }

    #[test]
    fn test_prose_reply_is_malformed_in_structured_mode() {
        assert_malformed("Here is my analysis: the candidate is strong.", MINIMAL);
    }

    #[test]
    fn test_non_object_json_is_malformed() {
        assert_malformed("[1, 2, 3]", MINIMAL);
        assert_malformed("\"just a string\"", MINIMAL);
    }

    #[test]
    fn test_valid_reply_preserves_strengths_order() {
        let result = structured(&valid_reply().to_string(), MINIMAL);
        assert_eq!(
            result.strengths,
            vec!["Six years of Rust", "Led axum migration", "Strong async background"]
        );
        assert_eq!(result.match_score, 78);
        assert_eq!(result.weaknesses, vec!["No Kubernetes"]);
    }

    #[test]
    fn test_skill_matches_keep_reply_order() {
        let raw = r#"{"match_score": 50, "strengths": [], "weaknesses": [], "suggestions": [],
            "skill_matches": {"Zig": 10, "Ada": 20, "Rust": 90}}"#;
        let result = structured(raw, MINIMAL);
        let keys: Vec<&str> = result.skill_matches.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Zig", "Ada", "Rust"]);
    }

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        let mut reply = valid_reply();
        reply["match_score"] = json!(150);
        reply["skill_matches"] = json!({"Rust": 120.4, "Go": -3, "C": 49.6});
        let result = structured(&reply.to_string(), MINIMAL);
        assert_eq!(result.match_score, 100);
        assert_eq!(result.skill_matches["Rust"], 100);
        assert_eq!(result.skill_matches["Go"], 0);
        assert_eq!(result.skill_matches["C"], 50);
    }

    #[test]
    fn test_missing_match_score_is_malformed() {
        let mut reply = valid_reply();
        reply.as_object_mut().unwrap().remove("match_score");
        assert_malformed(&reply.to_string(), MINIMAL);
    }

    #[test]
    fn test_wrongly_typed_required_keys_are_malformed() {
        let mut reply = valid_reply();
        reply["match_score"] = json!("78%");
        assert_malformed(&reply.to_string(), MINIMAL);

        let mut reply = valid_reply();
        reply["strengths"] = json!("Rust");
        assert_malformed(&reply.to_string(), MINIMAL);

        let mut reply = valid_reply();
        reply["skill_matches"] = json!({"Rust": "high"});
        assert_malformed(&reply.to_string(), MINIMAL);
    }

    #[test]
    fn test_code_fenced_reply_is_accepted() {
        let raw = format!("```json\n{}\n```", valid_reply());
        assert_eq!(structured(&raw, MINIMAL).match_score, 78);
    }

    #[test]
    fn test_minimal_profile_ignores_extended_keys() {
        let mut reply = valid_reply();
        reply["ats_compatibility"] = json!("not even a number");
        let result = structured(&reply.to_string(), MINIMAL);
        assert!(result.ats_compatibility.is_none());
    }

    #[test]
    fn test_extended_sections_absent_when_omitted() {
        let result = structured(&valid_reply().to_string(), EXTENDED);
        assert!(result.ats_compatibility.is_none());
        assert!(result.missing_keywords.is_none());
        assert!(result.action_verbs.is_none());
        assert!(result.education_alignment.is_none());
        assert!(result.experience_alignment.is_none());
        assert!(result.format_score.is_none());
    }

    #[test]
    fn test_extended_sections_parsed_and_clamped() {
        let mut reply = valid_reply();
        let obj = reply.as_object_mut().unwrap();
        obj.insert("ats_compatibility".into(), json!(240));
        obj.insert("missing_keywords".into(), json!([]));
        obj.insert(
            "action_verbs".into(),
            json!({"used": ["built"], "recommended": ["architected", "shipped"]}),
        );
        obj.insert(
            "education_alignment".into(),
            json!({"score": 64.5, "feedback": "CS degree matches"}),
        );
        obj.insert("experience_alignment".into(), Value::Null);
        obj.insert(
            "format_score".into(),
            json!({"score": -10, "issues": ["Two columns"], "positives": []}),
        );

        let result = structured(&reply.to_string(), EXTENDED);
        assert_eq!(result.ats_compatibility, Some(100));
        assert_eq!(result.missing_keywords, Some(vec![]));
        assert_eq!(
            result.action_verbs.unwrap().recommended,
            vec!["architected", "shipped"]
        );
        assert_eq!(result.education_alignment.unwrap().score, 65);
        assert!(result.experience_alignment.is_none());
        let format = result.format_score.unwrap();
        assert_eq!(format.score, 0);
        assert_eq!(format.issues, vec!["Two columns"]);
    }

    #[test]
    fn test_extended_section_with_wrong_shape_is_malformed() {
        let mut reply = valid_reply();
        reply["action_verbs"] = json!(["built", "led"]);
        assert_malformed(&reply.to_string(), EXTENDED);
    }

    #[test]
    fn test_serialized_result_round_trips() {
        let mut reply = valid_reply();
        let obj = reply.as_object_mut().unwrap();
        obj.insert("ats_compatibility".into(), json!(71));
        obj.insert("missing_keywords".into(), json!(["Kubernetes", "Terraform"]));
        obj.insert(
            "format_score".into(),
            json!({"score": 80, "issues": [], "positives": ["Single column"]}),
        );
        let first = structured(&reply.to_string(), EXTENDED);

        let serialized = serde_json::to_string(&first).unwrap();
        let second = structured(&serialized, EXTENDED);
        assert_eq!(first, second);
        assert!(first.skill_matches.keys().eq(second.skill_matches.keys()));

        let minimal = structured(&valid_reply().to_string(), MINIMAL);
        let again = structured(&serde_json::to_string(&minimal).unwrap(), MINIMAL);
        assert_eq!(minimal, again);
    }

    #[test]
    fn test_freeform_four_segments_with_percentage() {
        let result = freeform("A\n\nB\n\nC\n\n42%");
        assert_eq!(result.segments, vec!["A", "B", "C", "42%"]);
        assert_eq!(result.match_percentage, Some(0.42));
        assert_eq!(result.strengths.as_deref(), Some("A"));
        assert_eq!(result.improvements.as_deref(), Some("B"));
        assert_eq!(result.suggestions.as_deref(), Some("C"));
        assert!(result.recommendations.is_none());
    }

    #[test]
    fn test_freeform_single_segment() {
        let result = freeform("OnlyOneSegment");
        assert_eq!(result.segments, vec!["OnlyOneSegment"]);
        assert_eq!(result.strengths.as_deref(), Some("OnlyOneSegment"));
        assert!(result.improvements.is_none());
        assert!(result.suggestions.is_none());
        assert!(result.match_percentage.is_none());
    }

    #[test]
    fn test_freeform_percentage_absent_without_numeral() {
        let result = freeform("A\n\nB\n\nC\n\nOverall a good match.");
        assert_eq!(result.segments.len(), 4);
        assert!(result.match_percentage.is_none());
    }

    #[test]
    fn test_freeform_percentage_only_read_from_fourth_segment() {
        let result = freeform("Matches 90% of skills\n\nB\n\nC");
        assert!(result.match_percentage.is_none());
    }

    #[test]
    fn test_freeform_decimal_and_clamped_percentages() {
        assert_eq!(
            freeform("A\n\nB\n\nC\n\nOverall match: 72.5% overall").match_percentage,
            Some(0.725)
        );
        assert_eq!(freeform("A\n\nB\n\nC\n\n130%").match_percentage, Some(1.0));
    }

    #[test]
    fn test_freeform_trims_and_drops_blank_segments() {
        let result = freeform("\r\n  Strengths: Rust  \r\n\r\n\n\n\n Gaps: K8s \n\n   \n\nTips\n\n65%\n\nRecs");
        assert_eq!(
            result.segments,
            vec!["Strengths: Rust", "Gaps: K8s", "Tips", "65%", "Recs"]
        );
        assert_eq!(result.match_percentage, Some(0.65));
        assert_eq!(result.recommendations.as_deref(), Some("Recs"));
    }

    #[test]
    fn test_freeform_empty_reply_never_fails() {
        let result = freeform("");
        assert!(result.segments.is_empty());
        assert!(result.strengths.is_none());
        assert!(result.match_percentage.is_none());
    }
}
