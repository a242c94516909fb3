mod convert;
mod types;

use std::sync::Arc;

use async_trait::async_trait;
use sana_model::request::CompletionRequest;
use sana_model::response::Completion;
use sana_model::{Error, TextModel, TextModelBackend, TextModelProvider, TextModelProviderBackend};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Configuration for the Gemini provider.
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
        }
    }
}

/// Create a Gemini provider with the given config.
pub fn provider(config: GeminiConfig) -> TextModelProvider {
    TextModelProvider::new(GeminiProvider {
        state: Arc::new(ProviderState {
            client: reqwest::Client::new(),
            config,
        }),
    })
}

/// Create a Gemini provider reading `GEMINI_API_KEY` from the environment.
pub fn from_env() -> TextModelProvider {
    provider(GeminiConfig {
        api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
        ..Default::default()
    })
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

struct ProviderState {
    client: reqwest::Client,
    config: GeminiConfig,
}

struct GeminiProvider {
    state: Arc<ProviderState>,
}

impl TextModelProviderBackend for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self, model_id: &str) -> TextModel {
        TextModel::new(GeminiModel {
            model_id: model_id.to_string(),
            state: Arc::clone(&self.state),
        })
    }
}

struct GeminiModel {
    model_id: String,
    state: Arc<ProviderState>,
}

#[async_trait]
impl TextModelBackend for GeminiModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn provider(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, Error> {
        let body = convert::to_generate_content(&request);
        let url = format!(
            "{}/models/{}:generateContent",
            self.state.config.base_url, self.model_id
        );

        let resp = self
            .state
            .client
            .post(&url)
            .header("x-goog-api-key", &self.state.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Http(Box::new(e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                code: status.as_str().to_string(),
                message: body_text,
            });
        }

        let parsed = resp
            .json::<types::GenerateContentResponse>()
            .await
            .map_err(|e| Error::Http(Box::new(e)))?;

        convert::from_response(parsed)
    }
}
