use crate::model::TextModel;

/// A concrete, type-erased text model provider.
///
/// Wraps a [`TextModelProviderBackend`] behind a `Box<dyn ...>` so that
/// callers never need generic parameters — you can swap providers freely.
pub struct TextModelProvider {
    inner: Box<dyn TextModelProviderBackend>,
}

impl TextModelProvider {
    /// Wrap any backend implementation into a provider.
    pub fn new(backend: impl TextModelProviderBackend + 'static) -> Self {
        Self {
            inner: Box::new(backend),
        }
    }

    /// The provider name (e.g. `"gemini"`).
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Create a model handle for the given model ID.
    pub fn model(&self, model_id: &str) -> TextModel {
        self.inner.model(model_id)
    }
}

/// Trait that provider crates implement.
pub trait TextModelProviderBackend: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self, model_id: &str) -> TextModel;
}
