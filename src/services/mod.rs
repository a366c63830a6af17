pub mod llm_service;
pub mod scoring_client;
pub mod text_extractor;

pub use llm_service::LlmService;
pub use scoring_client::ScoringClient;
pub use text_extractor::{FileTextExtractor, TextExtractor};
