//! Analysis entry points: quiz photo → [`AnalysisOutput`].
//!
//! [`analyze`] is the core: it takes an already-encoded image and an
//! explicit [`InferenceClient`], builds the deterministic instruction, and
//! parses the reply. [`analyze_image`] adds input resolution and provider
//! construction for callers that just have a path or URL.

use crate::config::WorksheetConfig;
use crate::error::InferenceError;
use crate::language::Language;
use crate::output::{AnalysisOutput, AnalysisStats};
use crate::pipeline::encode::{self, EncodedImage};
use crate::pipeline::input;
use crate::pipeline::llm::{InferenceClient, InferenceRequest, LlmInferenceClient};
use crate::pipeline::parse;
use crate::prompts::{analysis_instruction, DEFAULT_SYSTEM_PROMPT};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

const GEMINI_DEFAULT_MODEL: &str = "gemini-2.5-flash";
const OPENAI_DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Analyse an encoded quiz photo with the given client.
///
/// # Errors
/// [`InferenceError`] if the call fails or times out, returns no text, or
/// returns text that does not parse as the worksheet schema.
pub async fn analyze(
    client: &dyn InferenceClient,
    image: &EncodedImage,
    language: Language,
    config: &WorksheetConfig,
) -> Result<AnalysisOutput, InferenceError> {
    let start = Instant::now();
    info!("Analysing quiz photo ({} bytes, {})", image.byte_len, language);

    let request = InferenceRequest {
        system_prompt: config
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        instruction: analysis_instruction(language, config.problem_count),
        image: image.clone(),
    };

    let reply = client.generate(&request).await?;
    debug!("Reply: {} chars", reply.text.len());

    let result = parse::parse_reply(&reply.text)?;

    if result.practice_problems.len() != config.problem_count {
        warn!(
            "Asked for {} practice problems, model returned {}",
            config.problem_count,
            result.practice_problems.len()
        );
    }
    if result.has_answer_key() && !result.answer_key_matches() {
        warn!(
            "Answer key has {} entries for {} problems",
            result.answer_key.len(),
            result.practice_problems.len()
        );
    }

    let stats = AnalysisStats {
        input_tokens: reply.input_tokens,
        output_tokens: reply.output_tokens,
        duration_ms: start.elapsed().as_millis() as u64,
        image_bytes: image.byte_len,
    };
    info!(
        "Analysis complete: {} problems, {}ms",
        result.practice_problems.len(),
        stats.duration_ms
    );

    Ok(AnalysisOutput {
        result,
        language,
        stats,
    })
}

/// Resolve a photo path, URL or data URL, then analyse it.
///
/// The provider is taken from `config` or auto-detected (see
/// [`resolve_provider`]).
pub async fn analyze_image(
    input_str: impl AsRef<str>,
    language: Language,
    config: &WorksheetConfig,
) -> Result<AnalysisOutput, InferenceError> {
    let input_str = input_str.as_ref();
    let source = input::resolve_image(input_str, config.download_timeout_secs).await?;
    let image = encode::encode_image(&source, config.max_image_dimension)?;

    let provider = resolve_provider(config)?;
    let client = LlmInferenceClient::new(provider, config);

    analyze(&client, &image, language, config).await
}

/// Synchronous wrapper around [`analyze_image`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    input_str: impl AsRef<str>,
    language: Language,
    config: &WorksheetConfig,
) -> Result<AnalysisOutput, InferenceError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| InferenceError::ApiError {
            message: format!("Failed to create tokio runtime: {e}"),
        })?
        .block_on(analyze_image(input_str, language, config))
}

// ── Provider resolution ──────────────────────────────────────────────────

fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, InferenceError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        InferenceError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

fn default_model_for(provider_name: &str) -> &'static str {
    match provider_name {
        "gemini" | "google" => GEMINI_DEFAULT_MODEL,
        _ => OPENAI_DEFAULT_MODEL,
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Resolve the LLM provider, from most-specific to least-specific:
///
/// 1. `config.provider`: a pre-built provider, used as-is
/// 2. `config.provider_name` (+ `config.model`)
/// 3. `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`, both set
/// 4. `GEMINI_API_KEY` → gemini, then `OPENAI_API_KEY` → openai
/// 5. `ProviderFactory::from_env()` auto-detection
pub fn resolve_provider(config: &WorksheetConfig) -> Result<Arc<dyn LLMProvider>, InferenceError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(default_model_for(name));
        return create_vision_provider(name, model);
    }

    if let (Some(prov), Some(model)) = (
        env_non_empty("EDGEQUAKE_LLM_PROVIDER"),
        env_non_empty("EDGEQUAKE_MODEL"),
    ) {
        return create_vision_provider(&prov, &model);
    }

    for (key, name) in [("GEMINI_API_KEY", "gemini"), ("OPENAI_API_KEY", "openai")] {
        if env_non_empty(key).is_some() {
            let model = config.model.as_deref().unwrap_or(default_model_for(name));
            return create_vision_provider(name, model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| InferenceError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY or OPENAI_API_KEY, or pass --provider.\n\
                Error: {e}"
            ),
        })?;

    Ok(llm_provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::llm::InferenceReply;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Canned {
        reply: Result<String, ()>,
        seen: Mutex<Option<InferenceRequest>>,
    }

    #[async_trait]
    impl InferenceClient for Canned {
        async fn generate(
            &self,
            request: &InferenceRequest,
        ) -> Result<InferenceReply, InferenceError> {
            *self.seen.lock().unwrap() = Some(request.clone());
            match &self.reply {
                Ok(text) => Ok(InferenceReply {
                    text: text.clone(),
                    input_tokens: 1200,
                    output_tokens: 300,
                }),
                Err(()) => Err(InferenceError::ApiError {
                    message: "503 overloaded".into(),
                }),
            }
        }
    }

    fn canned(reply: Result<&str, ()>) -> Canned {
        Canned {
            reply: reply.map(str::to_string),
            seen: Mutex::new(None),
        }
    }

    fn image() -> EncodedImage {
        EncodedImage::from_base64("data:image/jpeg;base64,/9j/AAAA", "image/jpeg")
    }

    #[tokio::test]
    async fn analyze_builds_request_and_parses_reply() {
        let client = canned(Ok(
            r#"{"conceptReview":"Explain X.","practiceProblems":["2+2=___"],"answerKey":["4"]}"#,
        ));
        let config = WorksheetConfig::default();

        let out = analyze(&client, &image(), Language::Tagalog, &config)
            .await
            .expect("analysis succeeds");

        assert_eq!(out.result.practice_problems, vec!["2+2=___"]);
        assert_eq!(out.language, Language::Tagalog);
        assert_eq!(out.stats.input_tokens, 1200);

        let seen = client.seen.lock().unwrap().clone().expect("request sent");
        assert_eq!(seen.image.data, "/9j/AAAA");
        assert!(seen.instruction.contains("strictly in Tagalog"));
        assert_eq!(seen.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn custom_system_prompt_is_used() {
        let client = canned(Ok(r#"{"conceptReview":"x","practiceProblems":[]}"#));
        let config = WorksheetConfig::builder()
            .system_prompt("Be brief.")
            .build()
            .expect("valid");
        analyze(&client, &image(), Language::English, &config)
            .await
            .expect("ok");
        let seen = client.seen.lock().unwrap().clone().expect("request sent");
        assert_eq!(seen.system_prompt, "Be brief.");
    }

    #[tokio::test]
    async fn client_failure_propagates() {
        let client = canned(Err(()));
        let err = analyze(&client, &image(), Language::English, &WorksheetConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn malformed_reply_is_error() {
        let client = canned(Ok("```json\n{\"conceptReview\": 3}\n```"));
        let err = analyze(&client, &image(), Language::Cebuano, &WorksheetConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::SchemaMismatch { .. }));
    }

    #[test]
    fn default_models() {
        assert_eq!(default_model_for("gemini"), "gemini-2.5-flash");
        assert_eq!(default_model_for("openai"), "gpt-4.1-mini");
    }
}
