use crate::dto::submission_dto::SubmitSectionRequest;
use crate::error::Result;
use crate::models::answer::{CandidateAnswer, CandidateResponse, EvaluationResult, RawEvaluation};
use crate::models::question::QuestionMeta;
use crate::services::eval_service::EvalService;
use crate::services::grading_service::{round3, GradingService};
use crate::store::QuestionStore;
use serde_json::Value as JsonValue;
use std::sync::Arc;

const CORRECT_THRESHOLD: f64 = 0.6;
const KEYWORD_WEIGHT: f64 = 0.8;
const TIME_WEIGHT: f64 = 0.2;

#[derive(Clone)]
pub struct ScoringService {
    eval_service: EvalService,
    store: Arc<dyn QuestionStore>,
}

impl ScoringService {
    pub fn new(eval_service: EvalService, store: Arc<dyn QuestionStore>) -> Self {
        Self {
            eval_service,
            store,
        }
    }

    /// Scores one submitted section. Responses are evaluated sequentially
    /// in source order; a failure on one response degrades that response
    /// to a zero score and never aborts the rest.
    pub async fn evaluate_submission(
        &self,
        request: &SubmitSectionRequest,
    ) -> Result<Vec<EvaluationResult>> {
        let meta = self.store.question_meta(request.question_set_id).await?;

        let mut results = Vec::with_capacity(request.responses.len());
        for response in &request.responses {
            let question_meta = meta.get(&response.question_id);
            let evaluation = self.evaluate_response(response, question_meta).await;
            let final_score = GradingService::finalize(
                &response.question_type,
                &evaluation,
                question_meta.and_then(|m| m.positive_marking),
            );

            tracing::info!(
                candidate_id = %request.candidate_id,
                question_id = %response.question_id,
                question_type = %response.question_type,
                raw_score = ?evaluation.score,
                final_score = ?final_score,
                is_correct = ?evaluation.is_correct,
                "Response scored"
            );

            results.push(EvaluationResult {
                question_id: response.question_id,
                candidate_answer: response.candidate_answer.clone(),
                correct_answer: response.correct_answer.clone(),
                section_name: request.section_name.clone(),
                score: final_score,
                is_correct: evaluation.is_correct,
                feedback: evaluation.feedback,
            });
        }

        self.store
            .append_results(request.candidate_id, request.question_set_id, &results)
            .await?;

        Ok(results)
    }

    async fn evaluate_response(
        &self,
        response: &CandidateResponse,
        meta: Option<&QuestionMeta>,
    ) -> RawEvaluation {
        match response.question_type.as_str() {
            "mcq" | "coding" => {
                let question_text = response.question_text.as_deref().unwrap_or("");
                match self
                    .eval_service
                    .evaluate(
                        &response.question_type,
                        question_text,
                        &response.correct_answer,
                        &response.candidate_answer,
                    )
                    .await
                {
                    Ok(evaluation) => evaluation,
                    Err(e) => {
                        tracing::warn!(
                            question_id = %response.question_id,
                            "Remote evaluation failed: {}",
                            e
                        );
                        RawEvaluation::failed("Evaluation failed")
                    }
                }
            }
            "audio" | "video" => Self::score_recorded(response, meta),
            other => {
                tracing::warn!(
                    question_id = %response.question_id,
                    question_type = other,
                    "No evaluator for question type"
                );
                RawEvaluation::not_evaluated()
            }
        }
    }

    /// Local keyword/time heuristic for audio and video answers. Never
    /// calls the remote service and always produces a result.
    pub fn score_recorded(
        response: &CandidateResponse,
        meta: Option<&QuestionMeta>,
    ) -> RawEvaluation {
        let answer = CandidateAnswer::parse(&response.candidate_answer);
        let transcript = answer.transcript().to_lowercase();

        let (mut expected_keywords, mut suggested_time) =
            expected_from_answer_key(&response.correct_answer);

        // Empty or "N/A" keyword sets defer to the stored question metadata.
        let placeholder = expected_keywords.is_empty()
            || expected_keywords
                .iter()
                .all(|k| k.trim().eq_ignore_ascii_case("n/a"));
        if placeholder {
            if let Some(meta) = meta {
                if !meta.expected_keywords.is_empty() {
                    expected_keywords = meta.expected_keywords.clone();
                }
            }
        }
        if suggested_time.is_none() {
            suggested_time = meta.and_then(|m| m.suggested_time_seconds);
        }

        expected_keywords.retain(|k| !k.trim().is_empty());

        let total = expected_keywords.len();
        let mut matches = 0usize;
        let mut missing = Vec::new();
        for keyword in &expected_keywords {
            if transcript.contains(&keyword.to_lowercase()) {
                matches += 1;
            } else {
                missing.push(keyword.clone());
            }
        }
        let keyword_score = matches as f64 / total.max(1) as f64;

        let time_score = if response.question_type == "video" {
            compute_time_score(answer.duration(), suggested_time)
        } else {
            None
        };

        let combined = match response.question_type.as_str() {
            "audio" => keyword_score,
            _ => match time_score {
                Some(time_score) => KEYWORD_WEIGHT * keyword_score + TIME_WEIGHT * time_score,
                // Missing time data must not inflate the keyword weight.
                None => KEYWORD_WEIGHT * keyword_score,
            },
        };

        let feedback = if total > 0 && matches == total {
            "All expected keywords present".to_string()
        } else {
            format!(
                "Found {}/{} keywords. Missing: {}",
                matches,
                total.max(1),
                missing.join(", ")
            )
        };

        RawEvaluation {
            score: Some(round3(combined)),
            is_correct: Some(combined >= CORRECT_THRESHOLD),
            feedback,
        }
    }
}

// Accepted window is half to one-and-a-half times the suggested length;
// outside it the score decays linearly with relative distance.
fn compute_time_score(duration: Option<f64>, suggested: Option<f64>) -> Option<f64> {
    let duration = duration?;
    let suggested = suggested?;
    if suggested <= 0.0 {
        return None;
    }
    if duration >= 0.5 * suggested && duration <= 1.5 * suggested {
        Some(1.0)
    } else {
        Some((1.0 - (duration - suggested).abs() / suggested).max(0.0))
    }
}

/// `correct_answer` on a recorded response may carry the generation
/// parameters as an object, a JSON-encoded string, or a bare
/// comma-separated keyword list.
fn expected_from_answer_key(correct: &JsonValue) -> (Vec<String>, Option<f64>) {
    match correct {
        JsonValue::Object(_) => from_params_object(correct),
        JsonValue::String(raw) => match serde_json::from_str::<JsonValue>(raw) {
            Ok(inner @ JsonValue::Object(_)) => from_params_object(&inner),
            Ok(JsonValue::Array(items)) => (
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
                None,
            ),
            _ => (
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
                None,
            ),
        },
        _ => (Vec::new(), None),
    }
}

fn from_params_object(value: &JsonValue) -> (Vec<String>, Option<f64>) {
    let keywords = value
        .get("expected_keywords")
        .or_else(|| value.get("keywords"))
        .and_then(JsonValue::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    let suggested = value
        .get("suggested_time_seconds")
        .or_else(|| value.get("suggested_time"))
        .and_then(JsonValue::as_f64);
    (keywords, suggested)
}
