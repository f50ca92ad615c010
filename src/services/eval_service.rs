use crate::error::{Error, Result};
use crate::models::answer::RawEvaluation;
use crate::services::llm_service::{CompletionRequest, ModelClient};
use crate::utils::text::extract_json_object;
use serde_json::Value as JsonValue;
use std::sync::Arc;

const EVALUATOR_SYSTEM_PROMPT: &str =
    "You are a strict and fair evaluator for technical questions.";

#[derive(Clone)]
pub struct EvalService {
    model: Arc<dyn ModelClient>,
}

impl EvalService {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    /// Grades one mcq or coding answer remotely. The raw score stays in
    /// the evaluator's native range (0/1 for mcq, 0-10 for coding);
    /// scaling happens in the grading step.
    pub async fn evaluate(
        &self,
        question_type: &str,
        question_text: &str,
        correct_answer: &JsonValue,
        candidate_answer: &JsonValue,
    ) -> Result<RawEvaluation> {
        let instruction = match question_type {
            "mcq" => format!(
                "You are an evaluator for multiple-choice questions.\n\
                 Question: {}\n\
                 Correct Answer: {}\n\
                 Candidate Answer: {}\n\
                 Evaluate if the candidate's answer is correct.\n\
                 Return JSON ONLY with keys: is_correct (true/false), score (0 or 1), feedback (short sentence).",
                question_text,
                render(correct_answer),
                render(candidate_answer)
            ),
            "coding" => format!(
                "You are an evaluator for coding questions.\n\
                 Question: {}\n\
                 Expected Solution Description: {}\n\
                 Candidate Code:\n{}\n\
                 Evaluate correctness and efficiency. \
                 Return JSON ONLY with keys: score (0-10), feedback (short explanation).",
                question_text,
                render(correct_answer),
                render(candidate_answer)
            ),
            other => return Err(Error::UnsupportedQuestionType(other.to_string())),
        };

        let text = self
            .model
            .complete(CompletionRequest {
                system: EVALUATOR_SYSTEM_PROMPT.to_string(),
                user: instruction,
                temperature: 0.2,
                max_tokens: 400,
            })
            .await?;

        let parsed = extract_json_object(&text).ok_or_else(|| {
            Error::MalformedResponse(format!(
                "no JSON object in {} evaluation output",
                question_type
            ))
        })?;

        Ok(RawEvaluation {
            score: parsed.get("score").and_then(score_as_f64),
            is_correct: parsed.get("is_correct").and_then(JsonValue::as_bool),
            feedback: parsed
                .get("feedback")
                .and_then(JsonValue::as_str)
                .unwrap_or("")
                .to_string(),
        })
    }
}

fn render(value: &JsonValue) -> String {
    match value {
        JsonValue::String(text) => text.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// Some models quote numbers; accept both.
fn score_as_f64(value: &JsonValue) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}
