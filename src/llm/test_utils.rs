//! Shared test utilities for the `llm` module.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;

use crate::llm::ai::{AiClient, AiClientMetadata};

fn mock_metadata() -> AiClientMetadata {
    AiClientMetadata {
        provider: "Mock".to_string(),
        model: "mock-model".to_string(),
        temperature: 0.0,
    }
}

/// Mock completion client with a pre-programmed queue of responses.
///
/// Responses are returned in FIFO order. When the queue is exhausted,
/// subsequent calls return `Err("no more mock responses")`.
///
/// Every call records the `(system_prompt, user_prompt)` pair; use
/// [`prompt_handle`](Self::prompt_handle) to read them after the client has
/// been moved into a pipeline.
pub(crate) struct ConfigurableMockAiClient {
    responses: Arc<Mutex<VecDeque<Result<String>>>>,
    recorded_prompts: Arc<Mutex<Vec<(String, String)>>>,
}

impl ConfigurableMockAiClient {
    /// Creates a new mock client that will return the given responses in order.
    pub(crate) fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            recorded_prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a handle for inspecting which prompts were sent.
    pub(crate) fn prompt_handle(&self) -> PromptRecordHandle {
        PromptRecordHandle {
            recorded_prompts: self.recorded_prompts.clone(),
        }
    }
}

/// Shared handle to a mock client's recorded prompts.
pub(crate) struct PromptRecordHandle {
    recorded_prompts: Arc<Mutex<Vec<(String, String)>>>,
}

impl PromptRecordHandle {
    /// Returns all recorded `(system_prompt, user_prompt)` pairs.
    pub(crate) fn prompts(&self) -> Vec<(String, String)> {
        self.recorded_prompts.lock().unwrap().clone()
    }

    /// Returns the number of requests that were made.
    pub(crate) fn request_count(&self) -> usize {
        self.recorded_prompts.lock().unwrap().len()
    }
}

impl AiClient for ConfigurableMockAiClient {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        let responses = self.responses.clone();
        let recorded = self.recorded_prompts.clone();
        let sys = system_prompt.to_string();
        let usr = user_prompt.to_string();
        Box::pin(async move {
            recorded.lock().unwrap().push((sys, usr));
            responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no more mock responses")))
        })
    }

    fn get_metadata(&self) -> AiClientMetadata {
        mock_metadata()
    }
}

/// Mock client that answers by destination, after a per-destination delay.
///
/// Lets tests make later requests finish first, to prove that batch
/// results keep input order regardless of completion order.
pub(crate) struct RoutedMockAiClient {
    routes: HashMap<String, (Duration, String)>,
    in_flight: Arc<Mutex<(usize, usize)>>,
}

impl RoutedMockAiClient {
    /// Creates an empty routed mock.
    pub(crate) fn new() -> Self {
        Self {
            routes: HashMap::new(),
            in_flight: Arc::new(Mutex::new((0, 0))),
        }
    }

    /// Answers any user prompt mentioning `destination` with `response`.
    pub(crate) fn route(mut self, destination: &str, delay_ms: u64, response: String) -> Self {
        self.routes.insert(
            destination.to_string(),
            (Duration::from_millis(delay_ms), response),
        );
        self
    }

    /// Returns a handle to the `(current, peak)` in-flight request counters.
    pub(crate) fn peak_handle(&self) -> Arc<Mutex<(usize, usize)>> {
        self.in_flight.clone()
    }
}

impl AiClient for RoutedMockAiClient {
    fn send_request<'a>(
        &'a self,
        _system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let (delay, response) = self
                .routes
                .iter()
                .find(|(destination, _)| {
                    user_prompt.contains(&format!("cidade de destino '{destination}'"))
                })
                .map(|(_, route)| route.clone())
                .ok_or_else(|| anyhow::anyhow!("no mock route for prompt: {user_prompt}"))?;

            {
                let mut guard = self.in_flight.lock().unwrap();
                guard.0 += 1;
                guard.1 = guard.1.max(guard.0);
            }
            tokio::time::sleep(delay).await;
            self.in_flight.lock().unwrap().0 -= 1;

            Ok(response)
        })
    }

    fn get_metadata(&self) -> AiClientMetadata {
        mock_metadata()
    }
}

/// A conforming model reply for tests.
pub(crate) fn route_json(distance: f64, region: &str, year: i32, days: u32) -> String {
    serde_json::json!({
        "distance_km_from_home": distance,
        "region_type": region,
        "climate_summary": ["Quente no verão", "Ameno no inverno", "Úmido o ano todo"],
        "rain_days_year": {"year": year, "days": days},
    })
    .to_string()
}
