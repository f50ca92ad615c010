use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Mcq,
    Coding,
    Audio,
    Video,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::Coding => "coding",
            QuestionType::Audio => "audio",
            QuestionType::Video => "video",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Question body, shaped by question type. Field names coming back from
/// the remote generator are already normalized (`prompt`/`prompt_text`
/// variants land in `question`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionContent {
    Mcq(McqContent),
    Coding(CodingContent),
    Spoken(SpokenContent),
    Prompt(PromptContent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqContent {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodingContent {
    pub question: String,
    pub input_spec: Option<String>,
    pub output_spec: Option<String>,
    pub examples: Vec<JsonValue>,
}

/// Shared shape for audio and video prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpokenContent {
    pub question: String,
    #[serde(default)]
    pub expected_keywords: Vec<String>,
    pub rubric: Option<String>,
    pub suggested_time_seconds: Option<f64>,
}

/// Fallback and forced-variant content carries a bare prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptContent {
    pub prompt: String,
    #[serde(rename = "type")]
    pub question_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question_id: Uuid,
    pub skill: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: String,
    pub content: QuestionContent,
}

/// Output of one generation run. `question_set_id` is the key the
/// persistence collaborator stores the questions under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    pub question_set_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub questions: Vec<GeneratedQuestion>,
}

/// Per-question metadata the scoring engine reads back from the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionMeta {
    #[serde(default)]
    pub expected_keywords: Vec<String>,
    pub suggested_time_seconds: Option<f64>,
    pub positive_marking: Option<f64>,
}
