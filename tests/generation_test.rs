use assessment_pipeline::dto::generation_dto::{GenerateTestRequest, GlobalSettings, SkillSpec};
use assessment_pipeline::error::{Error, Result};
use assessment_pipeline::models::question::{QuestionContent, QuestionSet, QuestionType};
use assessment_pipeline::services::generation_service::{representative_text, GenerationService};
use assessment_pipeline::services::generator_service::GeneratorService;
use assessment_pipeline::services::llm_service::{CompletionRequest, ModelClient};
use assessment_pipeline::utils::text::normalize_text;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn request(skills: Vec<SkillSpec>) -> GenerateTestRequest {
    GenerateTestRequest {
        skills,
        global_settings: GlobalSettings::default(),
    }
}

fn skill(name: &str, difficulty: &str, counts: &[(QuestionType, u32)]) -> SkillSpec {
    SkillSpec {
        name: name.to_string(),
        difficulty: difficulty.to_string(),
        counts: counts.iter().copied().collect::<HashMap<_, _>>(),
    }
}

fn service(model: Arc<dyn ModelClient>) -> GenerationService {
    GenerationService::new(Arc::new(GeneratorService::new(model)))
}

fn normalized_texts(set: &QuestionSet) -> HashSet<String> {
    set.questions
        .iter()
        .map(|q| normalize_text(&representative_text(&q.content)))
        .collect()
}

/// Produces a distinct question on every call.
struct UniqueClient {
    calls: AtomicUsize,
}

#[async_trait]
impl ModelClient for UniqueClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "Here you go:\n{{\"prompt\": \"Question number {} about the topic?\", \
             \"options\": [\"opt a {}\", \"opt b {}\"], \"answer\": \"A\"}}",
            n, n, n
        ))
    }
}

/// Always produces the same question, forcing the dedup path.
struct DuplicateClient;

#[async_trait]
impl ModelClient for DuplicateClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<String> {
        Ok("{\"prompt\": \"What does ACID stand for?\", \
            \"options\": [\"a\", \"b\"], \"answer\": \"A\"}"
            .to_string())
    }
}

/// Same stem every time, different option sets.
struct OptionVaryingClient {
    calls: AtomicUsize,
}

#[async_trait]
impl ModelClient for OptionVaryingClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "{{\"prompt\": \"Which join returns all rows from the left table?\", \
             \"options\": [\"LEFT JOIN v{}\", \"RIGHT JOIN v{}\"], \"answer\": \"A\"}}",
            n, n
        ))
    }
}

/// Simulates an unreachable remote service.
struct FailingClient;

#[async_trait]
impl ModelClient for FailingClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<String> {
        Err(Error::Remote("connection timed out".to_string()))
    }
}

/// Tracks how many completions are in flight at once.
struct GaugeClient {
    calls: AtomicUsize,
    current: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[async_trait]
impl ModelClient for GaugeClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<String> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(25)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);

        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "{{\"prompt\": \"Gauge question {} on throughput?\", \
             \"options\": [\"x{}\", \"y{}\"], \"answer\": \"A\"}}",
            n, n, n
        ))
    }
}

#[tokio::test]
async fn returns_exactly_one_question_per_requested_instance() {
    let model = Arc::new(UniqueClient {
        calls: AtomicUsize::new(0),
    });
    let service = service(model);

    let req = request(vec![
        skill(
            "SQL",
            "easy",
            &[(QuestionType::Mcq, 3), (QuestionType::Audio, 2)],
        ),
        skill("Rust", "medium", &[(QuestionType::Coding, 2)]),
        // Nameless specs contribute no tasks.
        skill("", "hard", &[(QuestionType::Mcq, 5)]),
    ]);

    let set = service.generate_set(&req).await;

    assert_eq!(set.questions.len(), 7);
    let sql_mcq = set
        .questions
        .iter()
        .filter(|q| q.skill == "SQL" && q.question_type == QuestionType::Mcq)
        .count();
    assert_eq!(sql_mcq, 3);
    let rust_coding = set
        .questions
        .iter()
        .filter(|q| q.skill == "Rust" && q.question_type == QuestionType::Coding)
        .count();
    assert_eq!(rust_coding, 2);
    assert_eq!(normalized_texts(&set).len(), 7);
}

#[tokio::test]
async fn empty_request_yields_empty_set() {
    let service = service(Arc::new(UniqueClient {
        calls: AtomicUsize::new(0),
    }));
    let set = service.generate_set(&request(vec![])).await;
    assert!(set.questions.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn duplicate_prone_generation_never_yields_equal_normalized_texts() {
    let service = service(Arc::new(DuplicateClient));
    let req = request(vec![skill("Databases", "medium", &[(QuestionType::Mcq, 32)])]);

    let set = service.generate_set(&req).await;

    assert_eq!(set.questions.len(), 32);
    assert_eq!(normalized_texts(&set).len(), 32);

    // Only one task can win the original text; the rest are tagged variants.
    let originals = set
        .questions
        .iter()
        .filter(|q| matches!(q.content, QuestionContent::Mcq(_)))
        .count();
    assert_eq!(originals, 1);
}

#[tokio::test]
async fn same_stem_with_different_options_is_not_a_duplicate() {
    let service = service(Arc::new(OptionVaryingClient {
        calls: AtomicUsize::new(0),
    }));
    let req = request(vec![skill("SQL", "easy", &[(QuestionType::Mcq, 3)])]);

    let set = service.generate_set(&req).await;

    assert_eq!(set.questions.len(), 3);
    assert!(set
        .questions
        .iter()
        .all(|q| matches!(q.content, QuestionContent::Mcq(_))));
    assert_eq!(normalized_texts(&set).len(), 3);
}

#[tokio::test]
async fn remote_failure_degrades_to_fallback_content() {
    let service = service(Arc::new(FailingClient));
    let req = request(vec![skill("SQL", "easy", &[(QuestionType::Audio, 1)])]);

    let set = service.generate_set(&req).await;

    assert_eq!(set.questions.len(), 1);
    match &set.questions[0].content {
        QuestionContent::Spoken(spoken) => {
            assert_eq!(
                spoken.question,
                "Describe a situation where you used SQL effectively."
            );
        }
        other => panic!("expected spoken fallback content, got {:?}", other),
    }
}

#[tokio::test]
async fn identical_fallbacks_are_forced_unique() {
    let service = service(Arc::new(FailingClient));
    let req = request(vec![skill("SQL", "easy", &[(QuestionType::Mcq, 3)])]);

    let set = service.generate_set(&req).await;

    assert_eq!(set.questions.len(), 3);
    assert_eq!(normalized_texts(&set).len(), 3);

    let variants = set
        .questions
        .iter()
        .filter(|q| match &q.content {
            QuestionContent::Prompt(p) => p.prompt.contains("(variant "),
            _ => false,
        })
        .count();
    assert_eq!(variants, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_flight_generations_stay_bounded() {
    let gauge = Arc::new(GaugeClient {
        calls: AtomicUsize::new(0),
        current: AtomicUsize::new(0),
        max_in_flight: AtomicUsize::new(0),
    });
    let service = service(gauge.clone());
    let req = request(vec![skill("Networking", "hard", &[(QuestionType::Mcq, 20)])]);

    let set = service.generate_set(&req).await;

    assert_eq!(set.questions.len(), 20);
    assert!(gauge.max_in_flight.load(Ordering::SeqCst) <= 8);
}
