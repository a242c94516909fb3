pub mod error;
pub mod model;
pub mod provider;
pub mod request;
pub mod response;

pub use error::Error;
pub use model::{TextModel, TextModelBackend};
pub use provider::{TextModelProvider, TextModelProviderBackend};
pub use request::{
    CompletionOptions, CompletionRequest, Message, RequestBuilder, completion,
};
pub use response::{Completion, Usage};
