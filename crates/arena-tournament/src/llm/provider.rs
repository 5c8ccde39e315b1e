use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use arena_common_core::PersonaId;

/// Why a generation call is made. Used for tracing and by scripted gateways.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPurpose {
    Response,
    Vote,
    Persona,
}

impl RequestPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Response => "response",
            Self::Vote => "vote",
            Self::Persona => "persona",
        }
    }
}

impl fmt::Display for RequestPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    /// JSON schema the reply must follow. `None` asks for free text.
    pub schema: Option<Value>,
    pub purpose: RequestPurpose,
    /// Contestant the call is made on behalf of, if any.
    pub contestant_id: Option<PersonaId>,
}

impl GenerationRequest {
    pub fn new(
        model: impl Into<String>,
        user_prompt: impl Into<String>,
        purpose: RequestPurpose,
    ) -> Self {
        Self {
            model: model.into(),
            system_prompt: None,
            user_prompt: user_prompt.into(),
            schema: None,
            purpose,
            contestant_id: None,
        }
    }

    pub fn with_system(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn on_behalf_of(mut self, id: &PersonaId) -> Self {
        self.contestant_id = Some(id.clone());
        self
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Opaque generation capability: produce text given a prompt, optionally
/// constrained to a JSON schema.
///
/// Implementations only report transport and backend failures. Semantic
/// validation of the returned text is the caller's job.
#[async_trait]
pub trait JudgeGateway: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError>;
}

#[async_trait]
impl<G: JudgeGateway + ?Sized> JudgeGateway for Box<G> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError> {
        (**self).generate(request).await
    }
}

#[async_trait]
impl<G: JudgeGateway + ?Sized> JudgeGateway for std::sync::Arc<G> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError> {
        (**self).generate(request).await
    }
}
