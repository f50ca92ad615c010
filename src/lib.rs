pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use crate::services::{
    eval_service::EvalService,
    generation_service::GenerationService,
    generator_service::GeneratorService,
    llm_service::{ModelClient, OpenRouterClient},
    scoring_service::ScoringService,
};
use crate::store::QuestionStore;
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub generation_service: GenerationService,
    pub scoring_service: ScoringService,
}

impl AppState {
    pub fn new(store: Arc<dyn QuestionStore>) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap();

        let model: Arc<dyn ModelClient> =
            Arc::new(OpenRouterClient::from_config(config, http_client));

        let generation_service = GenerationService::new(Arc::new(GeneratorService::new(
            model.clone(),
        )));
        let eval_service = EvalService::new(model);
        let scoring_service = ScoringService::new(eval_service, store);

        Self {
            generation_service,
            scoring_service,
        }
    }
}
