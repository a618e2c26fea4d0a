//! Chatbridge - A minimal uniform interface over chat-completion LLM providers.

pub mod config;
pub mod llm;
