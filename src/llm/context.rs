//! Process-wide route generation context.
//!
//! Holds the resolved settings together with the completion client and the
//! pipeline, each built at most once on first use. Construct one context at
//! startup and pass it by reference.

use std::sync::Arc;

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::data::schema::format_instructions;
use crate::llm::ai::openai::OpenAiAiClient;
use crate::llm::ai::AiClient;
use crate::llm::error::RouteError;
use crate::llm::pipeline::RoutePipeline;
use crate::llm::prompts::PromptTemplate;
use crate::utils::settings::RouteSettings;

/// Construct-once holder for the completion client and the pipeline.
pub struct RouteContext {
    settings: RouteSettings,
    client: OnceCell<Arc<dyn AiClient>>,
    prompt: OnceCell<PromptTemplate>,
    pipeline: OnceCell<RoutePipeline>,
}

impl RouteContext {
    /// Creates a context that builds the OpenAI client lazily from `settings`.
    pub fn new(settings: RouteSettings) -> Self {
        Self {
            settings,
            client: OnceCell::new(),
            prompt: OnceCell::new(),
            pipeline: OnceCell::new(),
        }
    }

    /// Creates a context around an already-built client.
    pub fn with_client(settings: RouteSettings, client: Arc<dyn AiClient>) -> Self {
        let context = Self::new(settings);
        // A fresh cell cannot be occupied.
        let _ = context.client.set(client);
        context
    }

    /// Resolved settings.
    pub fn settings(&self) -> &RouteSettings {
        &self.settings
    }

    /// Returns the shared completion client, building it on first use.
    ///
    /// Fails with [`RouteError::ApiKeyNotFound`] before any network I/O when
    /// no API key is configured. Concurrent first callers share a single
    /// construction.
    pub fn client(&self) -> Result<&Arc<dyn AiClient>> {
        self.client.get_or_try_init(|| {
            let api_key = self
                .settings
                .api_key
                .clone()
                .ok_or(RouteError::ApiKeyNotFound)?;

            let client = OpenAiAiClient::new(
                self.settings.model.clone(),
                api_key,
                self.settings.base_url.clone(),
                self.settings.request_timeout,
            )?;

            let metadata = client.get_metadata();
            info!(
                provider = %metadata.provider,
                model = %metadata.model,
                temperature = metadata.temperature,
                base_url = %self.settings.base_url,
                "Initialized completion client"
            );

            Ok(Arc::new(client) as Arc<dyn AiClient>)
        })
    }

    /// Returns the prompt template bound to the cached format instructions.
    pub fn prompt(&self) -> Result<&PromptTemplate> {
        self.prompt
            .get_or_try_init(|| Ok(PromptTemplate::route_analysis(format_instructions()?)))
    }

    /// Returns the shared pipeline, building it (and its client) on first use.
    pub fn pipeline(&self) -> Result<&RoutePipeline> {
        self.pipeline.get_or_try_init(|| {
            let prompt = self.prompt()?.clone();
            let client = self.client()?.clone();

            debug!(
                concurrency = self.settings.concurrency,
                tracing = self.settings.tracing.enabled,
                "Composing route pipeline"
            );

            Ok(
                RoutePipeline::new(prompt, client, self.settings.concurrency)
                    .with_tracing(self.settings.tracing.clone()),
            )
        })
    }
}
