//! Generation capability: text from a (prompt, slide image) pair.
//!
//! The slide pipeline is written against [`GenerationClient`] only. Vendors
//! (OpenAI, Anthropic, Gemini, Vertex AI, Azure, Bedrock, Ollama, …) are
//! interchangeable implementations; [`LlmGenerationClient`] covers all of
//! them through `edgequake-llm`'s provider factory, and tests plug in stubs.
//!
//! A generation call is a single attempt. Any error or timeout is returned as
//! a [`GenerationError`] and the pipeline records the slide as failed.

use crate::config::DescribeConfig;
use crate::error::{GenerationError, Ppt2DescError};
use crate::pipeline::encode::encode_image_file;
use async_trait::async_trait;
use crate::config::DEFAULT_MODEL;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory, ProviderType};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::debug;

/// Anything that can describe a slide image given a prompt.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Identifier of the model behind this client, recorded in deck documents.
    fn model_id(&self) -> &str;

    /// Generate text for `image` following `prompt`.
    async fn generate(&self, prompt: &str, image: &Path) -> Result<String, GenerationError>;
}

/// [`GenerationClient`] backed by an `edgequake-llm` provider.
pub struct LlmGenerationClient {
    provider: Arc<dyn LLMProvider>,
    model: String,
    options: CompletionOptions,
    call_timeout: Duration,
}

impl LlmGenerationClient {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            options: CompletionOptions::default(),
            call_timeout: Duration::from_secs(60),
        }
    }

    /// Resolve the provider named by `config` and apply its sampling options.
    ///
    /// The recorded model id is the one the resolved provider calls, which
    /// is not always `config.model` (injected or auto-detected providers).
    pub fn from_config(config: &DescribeConfig) -> Result<Self, Ppt2DescError> {
        let provider = resolve_provider(config)?;
        let model = provider.model().to_string();
        debug!("Resolved provider {} with model {}", provider.name(), model);
        Ok(Self {
            provider,
            model,
            options: build_options(config),
            call_timeout: Duration::from_secs(config.api_timeout_secs),
        })
    }
}

#[async_trait]
impl GenerationClient for LlmGenerationClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, image: &Path) -> Result<String, GenerationError> {
        let start = Instant::now();
        let image_data = encode_image_file(image).await?;
        let messages = vec![ChatMessage::user_with_images(prompt, vec![image_data])];

        let response = timeout(self.call_timeout, self.provider.chat(&messages, Some(&self.options)))
            .await
            .map_err(|_| GenerationError::Timeout {
                secs: self.call_timeout.as_secs(),
            })?
            .map_err(|e| GenerationError::Provider(e.to_string()))?;

        debug!(
            "{}: {} input tokens, {} output tokens, {:?}",
            image.display(),
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );
        Ok(response.content)
    }
}

/// Build `CompletionOptions` from the describe config.
fn build_options(config: &DescribeConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Instantiate a named provider with the given model.
fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, Ppt2DescError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        Ppt2DescError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Instantiate a named provider with its own default model.
fn create_default_provider(provider_name: &str) -> Result<Arc<dyn LLMProvider>, Ppt2DescError> {
    let not_configured = |hint: String| Ppt2DescError::ProviderNotConfigured {
        provider: provider_name.to_string(),
        hint,
    };
    let provider_type = ProviderType::from_str(provider_name)
        .ok_or_else(|| not_configured(format!("Unknown LLM provider: {provider_name}")))?;
    let (llm_provider, _embedding) = ProviderFactory::create_with_model(provider_type, None)
        .map_err(|e| not_configured(format!("{e}")))?;
    Ok(llm_provider)
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — used as-is.
/// 2. **Named provider** (`config.provider_name`) with the configured model,
///    or the provider's own default model when none is configured.
/// 3. **Environment pair** (`PPT2DESC_PROVIDER` + `PPT2DESC_MODEL`).
/// 4. **OpenAI key present** — OpenAI with the configured model.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
fn resolve_provider(config: &DescribeConfig) -> Result<Arc<dyn LLMProvider>, Ppt2DescError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        return match config.model.as_deref() {
            Some(model) => create_vision_provider(name, model),
            None => create_default_provider(name),
        };
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("PPT2DESC_PROVIDER"),
        std::env::var("PPT2DESC_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_vision_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_vision_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| Ppt2DescError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY or GEMINI_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
