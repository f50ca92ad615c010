use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// One answer in a submitted section. `candidate_answer` arrives as raw
/// text, a structured transcript object, or a JSON-encoded string; the
/// frontends also disagree on the field name, hence the aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResponse {
    pub question_id: Uuid,
    pub question_type: String,
    pub question_text: Option<String>,
    #[serde(default)]
    pub correct_answer: JsonValue,
    #[serde(
        default,
        alias = "answer",
        alias = "response",
        alias = "candidate_response",
        alias = "transcript"
    )]
    pub candidate_answer: JsonValue,
}

/// Decoded form of `candidate_answer`. Structured decode is attempted
/// first; anything unrecognized is treated as literal transcript text.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateAnswer {
    PlainText(String),
    Structured {
        transcript: String,
        duration: Option<f64>,
    },
}

impl CandidateAnswer {
    pub fn parse(value: &JsonValue) -> Self {
        match value {
            JsonValue::Object(_) => Self::from_object(value),
            JsonValue::String(raw) => match serde_json::from_str::<JsonValue>(raw) {
                Ok(inner @ JsonValue::Object(_)) => Self::from_object(&inner),
                _ => CandidateAnswer::PlainText(raw.clone()),
            },
            JsonValue::Null => CandidateAnswer::PlainText(String::new()),
            other => CandidateAnswer::PlainText(other.to_string()),
        }
    }

    fn from_object(value: &JsonValue) -> Self {
        let transcript = value
            .get("transcript")
            .and_then(JsonValue::as_str)
            .or_else(|| value.get("text").and_then(JsonValue::as_str))
            .unwrap_or_default()
            .to_string();
        let duration = value
            .get("duration_seconds")
            .and_then(JsonValue::as_f64)
            .or_else(|| value.get("duration").and_then(JsonValue::as_f64));
        CandidateAnswer::Structured {
            transcript,
            duration,
        }
    }

    pub fn transcript(&self) -> &str {
        match self {
            CandidateAnswer::PlainText(text) => text,
            CandidateAnswer::Structured { transcript, .. } => transcript,
        }
    }

    pub fn duration(&self) -> Option<f64> {
        match self {
            CandidateAnswer::PlainText(_) => None,
            CandidateAnswer::Structured { duration, .. } => *duration,
        }
    }
}

/// An evaluator's native-range output before mark normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvaluation {
    pub score: Option<f64>,
    pub is_correct: Option<bool>,
    pub feedback: String,
}

impl RawEvaluation {
    pub fn failed(feedback: &str) -> Self {
        Self {
            score: Some(0.0),
            is_correct: Some(false),
            feedback: feedback.to_string(),
        }
    }

    pub fn not_evaluated() -> Self {
        Self {
            score: None,
            is_correct: None,
            feedback: "Not evaluated".to_string(),
        }
    }
}

/// Final per-response record. Emitted once per submission and never
/// mutated; resubmissions append new records downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub question_id: Uuid,
    pub candidate_answer: JsonValue,
    pub correct_answer: JsonValue,
    pub section_name: Option<String>,
    pub score: Option<f64>,
    pub is_correct: Option<bool>,
    pub feedback: String,
}
