//! Judge Gateway: the text and structured generation capability used by the engines.

mod ollama;
mod provider;
mod structured;

pub use ollama::OllamaGateway;
pub use provider::*;
pub use structured::{
    parse_structured, PersonaDraft, StructuredOutput, StructuredOutputError, VoteChoice,
};

use arena_common_config::BackendConfig;

/// Builds the gateway described by the backend configuration.
pub struct GatewayFactory;

impl GatewayFactory {
    pub fn create(config: &BackendConfig) -> Result<Box<dyn JudgeGateway>, LlmError> {
        let gateway = OllamaGateway::from_config(config)?;
        Ok(Box::new(gateway))
    }
}
