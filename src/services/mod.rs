pub mod eval_service;
pub mod generation_service;
pub mod generator_service;
pub mod grading_service;
pub mod llm_service;
pub mod scoring_service;
