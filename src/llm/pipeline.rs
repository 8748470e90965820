//! Prompt → completion → parser pipeline.

use std::sync::Arc;

use anyhow::Result;
use futures::future::{join_all, try_join_all};
use tokio::sync::Semaphore;
use tracing::{debug, info_span, Instrument};

use crate::data::route::{RouteAnalysis, RouteRequest};
use crate::llm::ai::AiClient;
use crate::llm::error::RouteError;
use crate::llm::parser::parse_route_analysis;
use crate::llm::prompts::PromptTemplate;
use crate::utils::settings::TracingSettings;

/// Composed route profile pipeline.
///
/// One instance serves any number of concurrent invocations; it holds no
/// mutable state.
pub struct RoutePipeline {
    prompt: PromptTemplate,
    client: Arc<dyn AiClient>,
    concurrency: usize,
    tracing: TracingSettings,
}

impl RoutePipeline {
    /// Composes a pipeline. `concurrency` is clamped to at least one.
    pub fn new(prompt: PromptTemplate, client: Arc<dyn AiClient>, concurrency: usize) -> Self {
        Self {
            prompt,
            client,
            concurrency: concurrency.max(1),
            tracing: TracingSettings::default(),
        }
    }

    /// Enables call tracing spans.
    #[must_use]
    pub fn with_tracing(mut self, tracing: TracingSettings) -> Self {
        self.tracing = tracing;
        self
    }

    /// Maximum completion calls in flight during a batch.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Produces one route profile.
    ///
    /// Errors from any stage propagate unchanged; validation failures are
    /// wrapped as [`RouteError::Validation`].
    pub async fn invoke(&self, request: &RouteRequest) -> Result<RouteAnalysis> {
        let span = if self.tracing.enabled {
            info_span!(
                "route_pipeline",
                project = self.tracing.project.as_deref().unwrap_or("default"),
                origin = %request.origin,
                destination = %request.destination,
            )
        } else {
            tracing::Span::none()
        };

        self.run(request).instrument(span).await
    }

    async fn run(&self, request: &RouteRequest) -> Result<RouteAnalysis> {
        let prompt = self.prompt.render(request);
        let content = self
            .client
            .send_request(&prompt.system, &prompt.user)
            .await?;

        let analysis = parse_route_analysis(&content).map_err(RouteError::from)?;
        debug!(
            origin = %request.origin,
            destination = %request.destination,
            distance_km = analysis.distance_km_from_home(),
            "Parsed route analysis"
        );
        Ok(analysis)
    }

    /// Produces one route profile per request, in input order.
    ///
    /// Calls run concurrently, bounded by [`concurrency`](Self::concurrency).
    /// The first failure aborts the whole batch: pending calls are dropped
    /// and that error is returned.
    pub async fn invoke_many(&self, requests: &[RouteRequest]) -> Result<Vec<RouteAnalysis>> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let futs = requests.iter().map(|request| {
            let sem = semaphore.clone();
            async move {
                let _permit = sem
                    .acquire()
                    .await
                    .map_err(|e| anyhow::anyhow!("semaphore closed: {e}"))?;
                self.invoke(request).await
            }
        });

        try_join_all(futs).await
    }

    /// Like [`invoke_many`](Self::invoke_many), but every request runs to
    /// completion and gets its own result.
    pub async fn invoke_each(&self, requests: &[RouteRequest]) -> Vec<Result<RouteAnalysis>> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let futs = requests.iter().map(|request| {
            let sem = semaphore.clone();
            async move {
                let _permit = sem
                    .acquire()
                    .await
                    .map_err(|e| anyhow::anyhow!("semaphore closed: {e}"))?;
                self.invoke(request).await
            }
        });

        join_all(futs).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::llm::error::{error_kind, RouteErrorKind, ValidationError};
    use crate::llm::test_utils::{route_json, ConfigurableMockAiClient, RoutedMockAiClient};

    fn pipeline(client: impl AiClient + 'static, concurrency: usize) -> RoutePipeline {
        RoutePipeline::new(
            PromptTemplate::route_analysis("FORMAT"),
            Arc::new(client),
            concurrency,
        )
    }

    #[tokio::test]
    async fn invoke_renders_prompt_and_parses_reply() {
        let mock = ConfigurableMockAiClient::new(vec![Ok(route_json(290.0, "litoral", 2023, 130))]);
        let prompts = mock.prompt_handle();
        let pipeline = pipeline(mock, 1);

        let analysis = pipeline
            .invoke(&RouteRequest::new("Criciúma", "Florianópolis"))
            .await
            .unwrap();

        assert_eq!(analysis.region_type(), "litoral");
        let recorded = prompts.prompts();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].0.ends_with("FORMAT"));
        assert!(recorded[0].1.contains("'Criciúma'"));
        assert!(recorded[0].1.contains("'Florianópolis'"));
    }

    #[tokio::test]
    async fn invoke_surfaces_validation_error() {
        let mock = ConfigurableMockAiClient::new(vec![Ok(r#"{"region_type": "serra"}"#.to_string())]);
        let err = pipeline(mock, 1)
            .invoke(&RouteRequest::new("A", "B"))
            .await
            .unwrap_err();

        assert_eq!(error_kind(&err), Some(RouteErrorKind::Validation));
        match err.downcast_ref::<RouteError>() {
            Some(RouteError::Validation(ValidationError::MissingField(field))) => {
                assert_eq!(field, "distance_km_from_home");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn invoke_propagates_transport_error_unchanged() {
        let mock = ConfigurableMockAiClient::new(vec![Err(RouteError::NetworkError(
            "connection reset".to_string(),
        )
        .into())]);
        let err = pipeline(mock, 1)
            .invoke(&RouteRequest::new("A", "B"))
            .await
            .unwrap_err();
        assert_eq!(error_kind(&err), Some(RouteErrorKind::Transport));
        assert_eq!(err.to_string(), "Network error: connection reset");
    }

    #[tokio::test]
    async fn invoke_many_keeps_input_order_when_completion_order_differs() {
        // The first request is the slowest, the last the fastest.
        let mock = RoutedMockAiClient::new()
            .route("Lages", 60, route_json(1.0, "serra", 2023, 1))
            .route("Tubarão", 30, route_json(2.0, "vale", 2023, 2))
            .route("Laguna", 0, route_json(3.0, "litoral", 2023, 3));
        let pipeline = pipeline(mock, 3);

        let requests = vec![
            RouteRequest::new("Criciúma", "Lages"),
            RouteRequest::new("Criciúma", "Tubarão"),
            RouteRequest::new("Criciúma", "Laguna"),
        ];
        let results = pipeline.invoke_many(&requests).await.unwrap();

        let regions: Vec<&str> = results.iter().map(RouteAnalysis::region_type).collect();
        assert_eq!(regions, vec!["serra", "vale", "litoral"]);
    }

    #[tokio::test]
    async fn invoke_many_respects_concurrency_limit() {
        let mut mock = RoutedMockAiClient::new();
        let mut requests = Vec::new();
        for i in 0..6 {
            let destination = format!("Cidade {i}");
            mock = mock.route(&destination, 20, route_json(f64::from(i), "x", 2023, 1));
            requests.push(RouteRequest::new("Origem", destination));
        }
        let counters = mock.peak_handle();
        let pipeline = pipeline(mock, 2);

        let results = pipeline.invoke_many(&requests).await.unwrap();

        assert_eq!(results.len(), 6);
        let peak = counters.lock().unwrap().1;
        assert!(peak <= 2, "peak concurrency {peak} exceeded limit");
    }

    #[tokio::test]
    async fn invoke_many_empty_input() {
        let mock = ConfigurableMockAiClient::new(vec![]);
        let prompts = mock.prompt_handle();
        let results = pipeline(mock, 4).invoke_many(&[]).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(prompts.request_count(), 0);
    }

    #[tokio::test]
    async fn invoke_many_aborts_on_first_failure() {
        let mock = ConfigurableMockAiClient::new(vec![
            Ok(route_json(1.0, "a", 2023, 1)),
            Ok(r#"{"distance_km_from_home": "far"}"#.to_string()),
            Ok(route_json(3.0, "c", 2023, 3)),
        ]);
        let requests = vec![
            RouteRequest::new("O", "A"),
            RouteRequest::new("O", "B"),
            RouteRequest::new("O", "C"),
        ];

        let err = pipeline(mock, 1).invoke_many(&requests).await.unwrap_err();
        assert_eq!(error_kind(&err), Some(RouteErrorKind::Validation));
        assert!(err.to_string().contains("distance_km_from_home"));
    }

    #[tokio::test]
    async fn invoke_each_keeps_valid_items() {
        let mock = ConfigurableMockAiClient::new(vec![
            Ok(route_json(1.0, "a", 2023, 1)),
            Ok(r#"{"climate_summary": []}"#.to_string()),
            Ok(route_json(3.0, "c", 2023, 3)),
        ]);
        let requests = vec![
            RouteRequest::new("O", "A"),
            RouteRequest::new("O", "B"),
            RouteRequest::new("O", "C"),
        ];

        let results = pipeline(mock, 1).invoke_each(&requests).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().region_type(), "a");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().region_type(), "c");
    }

    #[test]
    fn concurrency_is_at_least_one() {
        let pipeline = pipeline(ConfigurableMockAiClient::new(vec![]), 0);
        assert_eq!(pipeline.concurrency(), 1);
    }

    #[tokio::test]
    async fn tracing_enabled_still_invokes() {
        let mock = ConfigurableMockAiClient::new(vec![Ok(route_json(5.0, "serra", 2022, 90))]);
        let pipeline = pipeline(mock, 1).with_tracing(TracingSettings {
            enabled: true,
            project: Some("rotas".to_string()),
        });
        assert!(pipeline.invoke(&RouteRequest::new("A", "B")).await.is_ok());
    }
}
