//! LLM provider client for chat completions.

mod error;
mod openai;
mod provider;
mod registry;
mod types;

pub use error::LLMError;
pub use openai::OpenAIProvider;
pub use provider::LLMProvider;
pub use registry::{ModelConstructor, ModelRegistry, OPENAI_MODELS, register_openai_models};
pub use types::{ChatChoice, ChatMessage, ChatResponse, ChatStructure};
