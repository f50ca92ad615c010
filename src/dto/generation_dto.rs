use crate::models::question::QuestionType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateTestRequest {
    #[validate(length(min = 1, message = "at least one skill is required"))]
    pub skills: Vec<SkillSpec>,
    #[serde(default)]
    #[validate(nested)]
    pub global_settings: GlobalSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default)]
    pub counts: HashMap<QuestionType, u32>,
}

fn default_difficulty() -> String {
    "medium".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GlobalSettings {
    #[serde(default = "default_mcq_options")]
    #[validate(range(min = 2, max = 10))]
    pub mcq_options: u32,
}

fn default_mcq_options() -> u32 {
    4
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            mcq_options: default_mcq_options(),
        }
    }
}
