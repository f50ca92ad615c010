use crate::error::{Error, Result};
use crate::models::question::{
    CodingContent, McqContent, PromptContent, QuestionContent, QuestionType, SpokenContent,
};
use crate::services::generation_service::GenerationTask;
use crate::services::llm_service::{CompletionRequest, ModelClient};
use crate::utils::text::extract_json_object;
use serde_json::Value as JsonValue;
use std::sync::Arc;

const GENERATOR_SYSTEM_PROMPT: &str = "You are a helpful interview question generator.";

pub struct GeneratorService {
    model: Arc<dyn ModelClient>,
}

impl GeneratorService {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    /// One remote generation call for one task. Retry policy lives in the
    /// generation engine, not here.
    pub async fn generate(&self, task: &GenerationTask) -> Result<QuestionContent> {
        let request = CompletionRequest {
            system: GENERATOR_SYSTEM_PROMPT.to_string(),
            user: Self::instruction(task),
            temperature: 0.3,
            max_tokens: 600,
        };

        let text = self.model.complete(request).await?;
        let parsed = extract_json_object(&text).ok_or_else(|| {
            Error::MalformedResponse(format!(
                "no JSON object in {} generation output",
                task.question_type
            ))
        })?;

        Ok(Self::coerce_content(task.question_type, &parsed))
    }

    fn instruction(task: &GenerationTask) -> String {
        match task.question_type {
            QuestionType::Mcq => format!(
                "Generate ONE multiple-choice question for skill '{}' with difficulty '{}'. \
                 Provide {} answer options labeled A, B, C, D. \
                 Return JSON ONLY with keys: prompt, options (list), answer (single letter).",
                task.skill, task.difficulty, task.option_count
            ),
            QuestionType::Coding => format!(
                "Generate ONE coding question for skill '{}' with difficulty '{}'. \
                 Return JSON ONLY with keys: prompt, input_spec, output_spec, examples (list).",
                task.skill, task.difficulty
            ),
            QuestionType::Audio => format!(
                "Generate ONE interview question for skill '{}' with difficulty '{}'. \
                 The question should be short and clear. \
                 Return JSON ONLY with keys: prompt_text, expected_keywords (list), rubric (short).",
                task.skill, task.difficulty
            ),
            QuestionType::Video => format!(
                "Generate ONE interview question for skill '{}' with difficulty '{}'. \
                 The question should be short and clear. \
                 Return JSON ONLY with keys: prompt_text, rubric (short), suggested_time_seconds.",
                task.skill, task.difficulty
            ),
        }
    }

    // The prompt variants disagree on field names; everything lands in the
    // typed shape with the stem under `question`.
    fn coerce_content(question_type: QuestionType, parsed: &JsonValue) -> QuestionContent {
        let question = string_field(parsed, &["prompt", "question", "prompt_text"]);

        match question_type {
            QuestionType::Mcq => QuestionContent::Mcq(McqContent {
                question,
                options: string_list(parsed, "options"),
                correct_answer: parsed
                    .get("answer")
                    .or_else(|| parsed.get("correct_answer"))
                    .and_then(JsonValue::as_str)
                    .map(str::to_string),
            }),
            QuestionType::Coding => QuestionContent::Coding(CodingContent {
                question,
                input_spec: opt_string(parsed, "input_spec"),
                output_spec: opt_string(parsed, "output_spec"),
                examples: parsed
                    .get("examples")
                    .and_then(JsonValue::as_array)
                    .cloned()
                    .unwrap_or_default(),
            }),
            QuestionType::Audio => QuestionContent::Spoken(SpokenContent {
                question,
                expected_keywords: string_list(parsed, "expected_keywords"),
                rubric: opt_string(parsed, "rubric"),
                suggested_time_seconds: None,
            }),
            QuestionType::Video => QuestionContent::Spoken(SpokenContent {
                question,
                expected_keywords: string_list(parsed, "expected_keywords"),
                rubric: opt_string(parsed, "rubric"),
                suggested_time_seconds: parsed
                    .get("suggested_time_seconds")
                    .and_then(JsonValue::as_f64)
                    .or(Some(60.0)),
            }),
        }
    }

    /// Deterministic content used when the remote call fails. Still runs
    /// through the same dedup check as generated content.
    pub fn fallback_content(task: &GenerationTask) -> QuestionContent {
        match task.question_type {
            QuestionType::Audio => QuestionContent::Spoken(SpokenContent {
                question: format!(
                    "Describe a situation where you used {} effectively.",
                    task.skill
                ),
                expected_keywords: Vec::new(),
                rubric: None,
                suggested_time_seconds: None,
            }),
            QuestionType::Video => QuestionContent::Spoken(SpokenContent {
                question: format!(
                    "Record a short video explaining a {}-related challenge you solved.",
                    task.skill
                ),
                expected_keywords: Vec::new(),
                rubric: None,
                suggested_time_seconds: None,
            }),
            _ => QuestionContent::Prompt(PromptContent {
                prompt: format!("Generate a question for {}", task.skill),
                question_type: task.question_type.to_string(),
            }),
        }
    }
}

fn string_field(value: &JsonValue, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| value.get(key).and_then(JsonValue::as_str))
        .unwrap_or_default()
        .to_string()
}

fn opt_string(value: &JsonValue, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(JsonValue::as_str)
        .map(str::to_string)
}

fn string_list(value: &JsonValue, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(JsonValue::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
