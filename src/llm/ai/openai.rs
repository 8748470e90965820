//! OpenAI chat-completions client.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{AiClient, AiClientMetadata};
use crate::llm::error::RouteError;

/// Model used when no override is configured.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Public OpenAI endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Route profiles are generated with fully deterministic sampling.
pub const ROUTE_TEMPERATURE: f32 = 0.0;

/// OpenAI API request message.
#[derive(Serialize, Debug)]
struct Message {
    role: &'static str,
    content: String,
}

/// OpenAI API request body.
#[derive(Serialize, Debug)]
struct OpenAiRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    stream: bool,
}

/// OpenAI API response choice.
#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

/// OpenAI API response message.
#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenAI API response.
#[derive(Deserialize, Debug)]
struct OpenAiResponse {
    choices: Vec<Choice>,
    model: Option<String>,
    usage: Option<Usage>,
}

/// OpenAI API usage statistics.
#[derive(Deserialize, Debug)]
#[allow(dead_code)]
struct Usage {
    prompt_tokens: Option<i32>,
    completion_tokens: Option<i32>,
    total_tokens: Option<i32>,
}

/// OpenAI chat-completions client with fixed sampling parameters.
pub struct OpenAiAiClient {
    /// HTTP client for API requests.
    client: Client,
    /// API key for authentication.
    api_key: String,
    /// Model identifier.
    model: String,
    /// Base URL for the API (e.g., "https://api.openai.com").
    base_url: String,
    /// Temperature for response generation.
    temperature: f32,
}

impl OpenAiAiClient {
    /// Creates a client; fails if the API key is empty.
    pub fn new(
        model: String,
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(RouteError::ApiKeyNotFound.into());
        }

        Ok(Self {
            client: super::build_http_client(timeout)?,
            api_key,
            model,
            base_url,
            temperature: ROUTE_TEMPERATURE,
        })
    }

    /// Builds the full API URL.
    fn get_api_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let url = format!("{base}/v1/chat/completions");

        debug!(base_url = %self.base_url, full_url = %url, "Constructed OpenAI API URL");

        url
    }
}

impl AiClient for OpenAiAiClient {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            debug!(
                system_prompt_len = system_prompt.len(),
                user_prompt_len = user_prompt.len(),
                model = %self.model,
                "Preparing OpenAI API request"
            );

            let request = OpenAiRequest {
                model: self.model.clone(),
                messages: vec![
                    Message {
                        role: "system",
                        content: system_prompt.to_string(),
                    },
                    Message {
                        role: "user",
                        content: user_prompt.to_string(),
                    },
                ],
                temperature: self.temperature,
                stream: false,
            };

            let api_url = self.get_api_url();
            info!(url = %api_url, model = %self.model, "Sending request to OpenAI API");

            let response = self
                .client
                .post(&api_url)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&request)
                .send()
                .await
                .map_err(|e| RouteError::NetworkError(e.to_string()))?;

            let response = super::check_error_response(response).await?;

            let openai_response: OpenAiResponse = response
                .json()
                .await
                .map_err(|e| RouteError::InvalidResponseFormat(e.to_string()))?;

            debug!(
                choice_count = openai_response.choices.len(),
                model = ?openai_response.model,
                usage = ?openai_response.usage,
                "Received OpenAI API response"
            );

            let result: Result<String> = openai_response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| {
                    RouteError::InvalidResponseFormat("No message content in response".to_string())
                        .into()
                });

            super::log_response_success("OpenAI", &result);

            result
        })
    }

    fn get_metadata(&self) -> AiClientMetadata {
        AiClientMetadata {
            provider: "OpenAI".to_string(),
            model: self.model.clone(),
            temperature: self.temperature,
        }
    }
}
