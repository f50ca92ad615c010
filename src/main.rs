use assessment_pipeline::config::{get_config, init_config};
use assessment_pipeline::dto::generation_dto::GenerateTestRequest;
use assessment_pipeline::services::generation_service::GenerationService;
use assessment_pipeline::services::generator_service::GeneratorService;
use assessment_pipeline::services::llm_service::OpenRouterClient;
use assessment_pipeline::utils::validation::validate;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

// Diagnostic runner: executes one generation request against the real
// remote service and prints the resulting question set.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let request: GenerateTestRequest = match std::env::args().nth(1) {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => serde_json::from_value(serde_json::json!({
            "skills": [
                { "name": "SQL", "difficulty": "easy", "counts": { "mcq": 2, "audio": 1 } }
            ],
            "global_settings": { "mcq_options": 4 }
        }))?,
    };
    validate(&request)?;

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;
    let model = Arc::new(OpenRouterClient::from_config(config, http_client));
    let service = GenerationService::new(Arc::new(GeneratorService::new(model)));

    info!(model = %config.openrouter_model, "Running generation request");
    let set = service.generate_set(&request).await;
    println!("{}", serde_json::to_string_pretty(&set)?);

    Ok(())
}
