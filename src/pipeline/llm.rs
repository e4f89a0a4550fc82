//! Model interaction: send the quiz photo and instruction, get reply text.
//!
//! [`InferenceClient`] is the seam between the analysis logic and the
//! third-party API. The production implementation, [`LlmInferenceClient`],
//! wraps an `edgequake_llm` provider that the caller constructs explicitly
//! and passes in; tests substitute a canned client.
//!
//! There is no retry here. A failed call surfaces immediately and the user
//! decides whether to try again.

use crate::config::WorksheetConfig;
use crate::error::InferenceError;
use crate::pipeline::encode::EncodedImage;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// One multimodal request.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub system_prompt: String,
    pub instruction: String,
    pub image: EncodedImage,
}

/// Raw reply text plus token accounting.
#[derive(Debug, Clone, Default)]
pub struct InferenceReply {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Anything that can answer an [`InferenceRequest`].
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn generate(&self, request: &InferenceRequest) -> Result<InferenceReply, InferenceError>;
}

/// [`InferenceClient`] backed by an edgequake-llm provider.
pub struct LlmInferenceClient {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    timeout: Duration,
}

impl LlmInferenceClient {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &WorksheetConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
            timeout: Duration::from_secs(config.api_timeout_secs),
        }
    }
}

#[async_trait]
impl InferenceClient for LlmInferenceClient {
    /// Message layout:
    /// 1. system message with the teacher persona
    /// 2. user message with the instruction text and the photo attached
    async fn generate(&self, request: &InferenceRequest) -> Result<InferenceReply, InferenceError> {
        let messages = vec![
            ChatMessage::system(request.system_prompt.as_str()),
            ChatMessage::user_with_images(
                request.instruction.as_str(),
                vec![request.image.to_image_data()],
            ),
        ];

        let start = Instant::now();
        let response = tokio::time::timeout(
            self.timeout,
            self.provider.chat(&messages, Some(&self.options)),
        )
        .await
        .map_err(|_| InferenceError::Timeout {
            secs: self.timeout.as_secs(),
        })?
        .map_err(|e| InferenceError::ApiError {
            message: e.to_string(),
        })?;

        debug!(
            "{} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        Ok(InferenceReply {
            text: response.content,
            input_tokens: response.prompt_tokens as u64,
            output_tokens: response.completion_tokens as u64,
        })
    }
}

/// Build `CompletionOptions` from the config.
///
/// JSON mode is always on; Gemini maps it to `responseMimeType:
/// application/json`. The schema itself travels in the instruction text.
fn build_options(config: &WorksheetConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        response_format: Some("json_object".to_string()),
        ..Default::default()
    }
}
