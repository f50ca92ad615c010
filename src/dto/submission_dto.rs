use crate::models::answer::{CandidateResponse, EvaluationResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitSectionRequest {
    pub question_set_id: Uuid,
    pub candidate_id: Uuid,
    pub section_name: Option<String>,
    #[validate(length(min = 1, message = "responses must not be empty"))]
    pub responses: Vec<CandidateResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitSectionResponse {
    pub message: String,
    pub evaluations: Vec<EvaluationResult>,
}
