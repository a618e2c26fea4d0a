//! Model registry mapping model names to provider constructors.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use reqwest::Client;
use tracing::{debug, warn};

use super::error::LLMError;
use super::openai::OpenAIProvider;
use super::provider::LLMProvider;

/// Builds a provider from `(model_name, api_key, api_url)`.
///
/// `api_url` is `None` when the caller did not ask for a specific endpoint;
/// the constructor is expected to apply its own default.
pub type ModelConstructor = Arc<
    dyn Fn(&str, &str, Option<&str>) -> Result<Box<dyn LLMProvider>, LLMError> + Send + Sync,
>;

/// Models served by [`OpenAIProvider`] in [`ModelRegistry::with_builtin_models`].
pub const OPENAI_MODELS: &[&str] = &["gpt-4o", "gpt-4", "gpt-3.5-turbo", "gpt-4o-mini"];

/// Registry of provider constructors, keyed by model name.
///
/// Lookups share a read lock; registrations take the write lock. Constructors
/// run after the lock is released, so a slow constructor never blocks writers.
#[derive(Default)]
pub struct ModelRegistry {
    constructors: RwLock<HashMap<String, ModelConstructor>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the OpenAI models registered.
    pub fn with_builtin_models() -> Self {
        let registry = Self::new();
        register_openai_models(&registry, Client::new());
        registry
    }

    /// Register a constructor for `name`, replacing any existing one.
    pub fn register<F>(&self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&str, &str, Option<&str>) -> Result<Box<dyn LLMProvider>, LLMError>
            + Send
            + Sync
            + 'static,
    {
        self.register_shared(name, Arc::new(constructor));
    }

    /// Register an already shared constructor, e.g. one used for several models.
    pub fn register_shared(&self, name: impl Into<String>, constructor: ModelConstructor) {
        let name = name.into();
        let mut constructors = self
            .constructors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if constructors.insert(name.clone(), constructor).is_some() {
            warn!(model = %name, "overriding registered model constructor");
        }
    }

    /// Build a provider for `name`, letting the constructor pick its endpoint.
    pub fn resolve(&self, name: &str, api_key: &str) -> Result<Box<dyn LLMProvider>, LLMError> {
        self.resolve_with_url(name, api_key, None)
    }

    /// Build a provider for `name` against an explicit endpoint.
    pub fn resolve_with_url(
        &self,
        name: &str,
        api_key: &str,
        api_url: Option<&str>,
    ) -> Result<Box<dyn LLMProvider>, LLMError> {
        let constructor = self
            .constructors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| LLMError::UnregisteredModel(name.to_string()))?;

        debug!(model = %name, custom_url = api_url.is_some(), "resolving model");
        constructor(name, api_key, api_url)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.constructors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered model names, sorted.
    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .constructors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

/// Register [`OPENAI_MODELS`] with constructors sharing `client`.
pub fn register_openai_models(registry: &ModelRegistry, client: Client) {
    let constructor: ModelConstructor = Arc::new(
        move |model: &str,
              api_key: &str,
              api_url: Option<&str>|
              -> Result<Box<dyn LLMProvider>, LLMError> {
            let provider = OpenAIProvider::with_client(client.clone(), model, api_key, api_url)?;
            Ok(Box::new(provider))
        },
    );

    for model in OPENAI_MODELS {
        registry.register_shared(*model, Arc::clone(&constructor));
    }
}
