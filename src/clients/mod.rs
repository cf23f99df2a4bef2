pub mod openai;
pub mod scripted;
pub mod traits;

pub use openai::OpenAIChatClient;
pub use scripted::ScriptedModel;
pub use traits::{ChatMessage, CompletionRequest, CompletionResponse, LanguageModel, ModelError};
