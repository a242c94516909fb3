use async_trait::async_trait;

use crate::error::Error;
use crate::request::CompletionRequest;
use crate::response::Completion;

/// A concrete, type-erased text model handle.
///
/// Wraps a [`TextModelBackend`] so callers never need generics.
pub struct TextModel {
    inner: Box<dyn TextModelBackend>,
}

impl TextModel {
    /// Wrap any backend implementation into a model.
    pub fn new(backend: impl TextModelBackend + 'static) -> Self {
        Self {
            inner: Box::new(backend),
        }
    }

    /// The model identifier (e.g. `"gemini-2.0-flash"`).
    pub fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    /// The provider name this model belongs to.
    pub fn provider(&self) -> &str {
        self.inner.provider()
    }

    /// Run one request/response completion. No retries, no streaming.
    pub async fn complete(
        &self,
        request: impl Into<CompletionRequest> + Send,
    ) -> Result<Completion, Error> {
        self.inner.complete(request.into()).await
    }
}

/// Trait that provider crates implement for a specific model.
#[async_trait]
pub trait TextModelBackend: Send + Sync {
    fn model_id(&self) -> &str;
    fn provider(&self) -> &str;
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, Error>;
}
