use crate::error::Result;
use crate::models::answer::EvaluationResult;
use crate::models::question::QuestionMeta;
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// Persistence collaborator seam. The pipeline reads question metadata
/// for a generation run and appends evaluation records; it never owns
/// connections or schema.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn question_meta(&self, question_set_id: Uuid) -> Result<HashMap<Uuid, QuestionMeta>>;

    async fn append_results(
        &self,
        candidate_id: Uuid,
        question_set_id: Uuid,
        results: &[EvaluationResult],
    ) -> Result<()>;
}
