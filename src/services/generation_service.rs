use crate::dto::generation_dto::GenerateTestRequest;
use crate::models::question::{
    GeneratedQuestion, PromptContent, QuestionContent, QuestionSet, QuestionType,
};
use crate::services::generator_service::GeneratorService;
use crate::utils::text::normalize_text;
use chrono::Utc;
use rand::Rng;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

const MAX_ATTEMPTS: u32 = 5;
const MAX_PARALLEL_GENERATIONS: usize = 8;

/// One unit of work producing exactly one question instance.
#[derive(Debug, Clone)]
pub struct GenerationTask {
    pub skill: String,
    pub difficulty: String,
    pub question_type: QuestionType,
    pub option_count: u32,
}

#[derive(Clone)]
pub struct GenerationService {
    generator: Arc<GeneratorService>,
}

impl GenerationService {
    pub fn new(generator: Arc<GeneratorService>) -> Self {
        Self { generator }
    }

    /// Runs one generation request to completion. Always returns exactly
    /// one question per requested instance; remote failures degrade to
    /// fallback content and persistent duplicates to forced variants, so
    /// the run itself never fails.
    pub async fn generate_set(&self, request: &GenerateTestRequest) -> QuestionSet {
        let tasks = Self::flatten_tasks(request);
        let question_set_id = Uuid::new_v4();
        let created_at = Utc::now();

        if tasks.is_empty() {
            return QuestionSet {
                question_set_id,
                created_at,
                questions: Vec::new(),
            };
        }

        let seen: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
        let limit = tasks.len().min(MAX_PARALLEL_GENERATIONS);
        let semaphore = Arc::new(Semaphore::new(limit));
        let mut workers = JoinSet::new();

        for task in tasks {
            let generator = self.generator.clone();
            let seen = seen.clone();
            let semaphore = semaphore.clone();
            workers.spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                create_one(generator, task, seen).await
            });
        }

        let mut questions = Vec::new();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(question) => questions.push(question),
                Err(e) => tracing::error!("Generation worker panicked: {:?}", e),
            }
        }

        tracing::info!(
            %question_set_id,
            count = questions.len(),
            "Generation run complete"
        );

        QuestionSet {
            question_set_id,
            created_at,
            questions,
        }
    }

    fn flatten_tasks(request: &GenerateTestRequest) -> Vec<GenerationTask> {
        let mut tasks = Vec::new();
        for skill in &request.skills {
            if skill.name.trim().is_empty() {
                tracing::debug!("Skipping skill spec without a name");
                continue;
            }
            for (&question_type, &count) in &skill.counts {
                for _ in 0..count {
                    tasks.push(GenerationTask {
                        skill: skill.name.clone(),
                        difficulty: skill.difficulty.clone(),
                        question_type,
                        option_count: request.global_settings.mcq_options,
                    });
                }
            }
        }
        tasks
    }
}

async fn create_one(
    generator: Arc<GeneratorService>,
    task: GenerationTask,
    seen: Arc<Mutex<HashSet<String>>>,
) -> GeneratedQuestion {
    let mut last_representative: Option<String> = None;

    for attempt in 1..=MAX_ATTEMPTS {
        let content = match generator.generate(&task).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    skill = %task.skill,
                    question_type = %task.question_type,
                    attempt,
                    "Generation call failed, substituting fallback content: {}",
                    e
                );
                GeneratorService::fallback_content(&task)
            }
        };

        let representative = representative_text(&content);
        let normalized = normalize_text(&representative);
        last_representative = Some(representative);

        if normalized.is_empty() {
            continue;
        }

        // Check-and-insert is one critical section; two workers holding
        // the same text must not both get through.
        let accepted = {
            let mut seen = seen.lock().expect("dedup set poisoned");
            seen.insert(normalized)
        };
        if accepted {
            return build_question(&task, content);
        }
    }

    // Every attempt collided or normalized to nothing; tag a variant so
    // the run still yields one question for this task.
    let base = last_representative
        .filter(|rep| !rep.trim().is_empty())
        .unwrap_or_else(|| format!("{} question about {}", task.question_type, task.skill));

    let prompt = {
        let mut seen = seen.lock().expect("dedup set poisoned");
        let mut rng = rand::thread_rng();
        loop {
            let candidate = format!("{} (variant {:06x})", base, rng.gen_range(0..0x0100_0000));
            if seen.insert(normalize_text(&candidate)) {
                break candidate;
            }
        }
    };

    tracing::warn!(
        skill = %task.skill,
        question_type = %task.question_type,
        "Exhausted {} attempts, forcing uniqueness-tagged variant",
        MAX_ATTEMPTS
    );

    build_question(
        &task,
        QuestionContent::Prompt(PromptContent {
            prompt,
            question_type: task.question_type.to_string(),
        }),
    )
}

fn build_question(task: &GenerationTask, content: QuestionContent) -> GeneratedQuestion {
    GeneratedQuestion {
        question_id: Uuid::new_v4(),
        skill: task.skill.clone(),
        question_type: task.question_type,
        difficulty: task.difficulty.clone(),
        content,
    }
}

/// Text standing in for a question when deciding whether two questions
/// are the same. MCQ options and coding I/O specs are part of it, so
/// identical stems with different options are distinct questions.
pub fn representative_text(content: &QuestionContent) -> String {
    match content {
        QuestionContent::Mcq(mcq) => {
            let mut parts = vec![mcq.question.clone()];
            parts.extend(mcq.options.iter().cloned());
            parts.join(" ").trim().to_string()
        }
        QuestionContent::Coding(coding) => format!(
            "{} {} {}",
            coding.question,
            coding.input_spec.as_deref().unwrap_or(""),
            coding.output_spec.as_deref().unwrap_or("")
        )
        .trim()
        .to_string(),
        QuestionContent::Spoken(spoken) => spoken.question.clone(),
        QuestionContent::Prompt(prompt) => prompt.prompt.clone(),
    }
}
