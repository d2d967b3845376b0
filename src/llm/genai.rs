//! GenAI-based completion client
//!
//! Supports the providers the `genai` crate knows (Ollama, OpenAI, Anthropic,
//! Gemini, xAI, Groq). Provider credentials come from the provider's standard
//! environment variable; `NIXPACK_API_BASE_URL` redirects every request to a
//! custom endpoint.

use super::client::LLMClient;
use super::error::BackendError;
use async_trait::async_trait;
use genai::adapter::AdapterKind;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use genai::resolver::{AuthData, Endpoint, ServiceTargetResolver};
use genai::{Client, ModelIden, ServiceTarget};
use std::time::{Duration, Instant};
use tracing::{debug, error};

const API_BASE_URL_ENV: &str = "NIXPACK_API_BASE_URL";
const TEMPERATURE: f64 = 0.1;

/// Provider name as accepted on the command line and in configuration
pub fn parse_provider(name: &str) -> Option<AdapterKind> {
    let kind = match name.trim().to_lowercase().as_str() {
        "ollama" => AdapterKind::Ollama,
        "openai" => AdapterKind::OpenAI,
        "anthropic" | "claude" => AdapterKind::Anthropic,
        "gemini" => AdapterKind::Gemini,
        "xai" | "grok" => AdapterKind::Xai,
        "groq" => AdapterKind::Groq,
        _ => return None,
    };
    Some(kind)
}

pub struct GenAIClient {
    client: Client,
    model: String,
    provider: AdapterKind,
    timeout: Duration,
}

impl GenAIClient {
    /// Creates a client for `model` served by `provider`. Requests that take
    /// longer than `timeout` fail with [`BackendError::TimeoutError`].
    pub async fn new(
        provider: AdapterKind,
        model: String,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        if model.trim().is_empty() {
            return Err(BackendError::ConfigurationError {
                message: format!("No model configured for {}", provider.as_str()),
            });
        }

        let client = match std::env::var(API_BASE_URL_ENV).ok() {
            Some(endpoint_url) => {
                debug!(
                    provider = provider.as_str(),
                    endpoint = %endpoint_url,
                    "Using custom completion endpoint"
                );

                let model_name = model.clone();
                let resolver = ServiceTargetResolver::from_resolver_fn(
                    move |_target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
                        let auth = match provider.default_key_env_name() {
                            Some(key_var) => AuthData::from_env(key_var),
                            None => AuthData::from_single(""),
                        };

                        Ok(ServiceTarget {
                            endpoint: Endpoint::from_owned(endpoint_url.clone()),
                            auth,
                            model: ModelIden::new(provider, &model_name),
                        })
                    },
                );

                Client::builder()
                    .with_service_target_resolver(resolver)
                    .build()
            }
            None => Client::default(),
        };

        debug!(provider = provider.as_str(), model = %model, "Creating GenAI client");

        Ok(Self {
            client,
            model,
            provider,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl LLMClient for GenAIClient {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let start = Instant::now();
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
        let options = ChatOptions::default().with_temperature(TEMPERATURE);

        let response = match tokio::time::timeout(
            self.timeout,
            self.client.exec_chat(&self.model, request, Some(&options)),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!(provider = self.provider.as_str(), error = %e, "Completion request failed");
                return Err(BackendError::ApiError {
                    message: format!("{} request failed: {}", self.provider.as_str(), e),
                    status_code: None,
                });
            }
            Err(_) => {
                error!(
                    provider = self.provider.as_str(),
                    timeout_secs = self.timeout.as_secs(),
                    "Completion request timed out"
                );
                return Err(BackendError::TimeoutError {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let content = response.first_text().unwrap_or_default().to_string();
        debug!(
            provider = self.provider.as_str(),
            chars = content.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Completion received"
        );

        Ok(content)
    }

    fn name(&self) -> &str {
        self.provider.as_str()
    }

    fn model_info(&self) -> Option<String> {
        Some(self.model.clone())
    }
}

impl std::fmt::Debug for GenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAIClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}
