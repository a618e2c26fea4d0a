//! LLM provider trait.

use async_trait::async_trait;

use super::error::LLMError;
use super::types::{ChatResponse, ChatStructure};

/// A backend that turns a conversation into a single model reply.
///
/// Implementations must reject an empty conversation with
/// [`LLMError::EmptyInput`] before touching the network, and must report a
/// reply without text as [`LLMError::EmptyResponse`] instead of returning a
/// blank [`ChatResponse`].
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Model identifier this instance was built for.
    fn model(&self) -> &str;

    /// Make a chat completion request.
    async fn chat(&self, structure: &ChatStructure) -> Result<ChatResponse, LLMError>;
}
