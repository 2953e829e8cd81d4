//! Inference adapters

mod openai;

pub use openai::OpenAiCompatibleGateway;
