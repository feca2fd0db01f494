//! Insight Request Pipeline: the retry controller around client → sanitize → validate.
//!
//! Flow: normalize (caller) → compose_prompt → attempt loop.
//!
//! Each attempt yields a tagged `Result<InsightsReport, AttemptError>`; `advance` turns
//! that into the next `ControllerState`. There is no fallback content: exhaustion is
//! always surfaced as `InsightGenerationFailed`.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::insights::composer::compose_prompt;
use crate::insights::errors::{AttemptError, InsightGenerationFailed};
use crate::insights::normalizer::NormalizedResultSet;
use crate::insights::prompts::{INSIGHTS_INSTRUCTIONS, PROMPT_VERSION};
use crate::insights::sanitize::sanitize_response;
use crate::insights::validator::{validate_insights, InsightsReport};
use crate::llm_client::GenerationClient;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Per-invocation pipeline settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    /// Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Applied to each model call separately.
    pub attempt_timeout: Duration,
    /// Fixed pause before every attempt after the first.
    pub backoff: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            backoff: Duration::ZERO,
        }
    }
}

impl PipelineOptions {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Retry controller states.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerState {
    Attempting(u32),
    Succeeded(InsightsReport),
    Exhausted { attempts: u32, last_error: AttemptError },
}

/// One request → sanitize → validate cycle.
#[derive(Debug, Clone)]
pub struct GenerationAttempt {
    pub index: u32,
    pub raw_response: Option<String>,
    pub outcome: Result<InsightsReport, AttemptError>,
}

/// Transition after attempt `attempt` of `max_attempts` finished with `outcome`.
pub fn advance(
    attempt: u32,
    max_attempts: u32,
    outcome: Result<InsightsReport, AttemptError>,
) -> ControllerState {
    match outcome {
        Ok(report) => ControllerState::Succeeded(report),
        Err(_) if attempt < max_attempts => ControllerState::Attempting(attempt + 1),
        Err(last_error) => ControllerState::Exhausted {
            attempts: attempt,
            last_error,
        },
    }
}

/// Runs a single attempt. Never retries.
pub async fn run_attempt(
    client: &dyn GenerationClient,
    prompt: &str,
    timeout: Duration,
    index: u32,
) -> GenerationAttempt {
    let raw = match tokio::time::timeout(timeout, client.generate(prompt)).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            return GenerationAttempt {
                index,
                raw_response: None,
                outcome: Err(AttemptError::from(e)),
            }
        }
        Err(_) => {
            return GenerationAttempt {
                index,
                raw_response: None,
                outcome: Err(AttemptError::Transport(format!(
                    "model call timed out after {}ms",
                    timeout.as_millis()
                ))),
            }
        }
    };

    debug!("Attempt {index}: received {} bytes from model", raw.len());
    let outcome = validate_insights(sanitize_response(&raw));

    GenerationAttempt {
        index,
        raw_response: Some(raw),
        outcome,
    }
}

const PREVIEW_CHARS: usize = 200;

/// First `PREVIEW_CHARS` characters of a model response, for logs.
fn preview(raw: &str) -> String {
    match raw.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &raw[..cut]),
        None => raw.to_string(),
    }
}

/// Drives the attempt loop over an already-composed prompt.
pub async fn run_pipeline(
    client: &dyn GenerationClient,
    prompt: &str,
    options: &PipelineOptions,
) -> Result<InsightsReport, InsightGenerationFailed> {
    let max_attempts = options.max_attempts.max(1);
    let mut state = ControllerState::Attempting(1);

    loop {
        state = match state {
            ControllerState::Attempting(n) => {
                if n > 1 && !options.backoff.is_zero() {
                    tokio::time::sleep(options.backoff).await;
                }
                info!("Generating AI insights (attempt {n}/{max_attempts})");

                let attempt = run_attempt(client, prompt, options.attempt_timeout, n).await;
                if let Err(e) = &attempt.outcome {
                    warn!(
                        "Attempt {}/{} failed [{}]: {}",
                        attempt.index,
                        max_attempts,
                        e.kind(),
                        e
                    );
                    if let Some(raw) = &attempt.raw_response {
                        debug!("Attempt {} rejected response: {}", attempt.index, preview(raw));
                    }
                }
                advance(attempt.index, max_attempts, attempt.outcome)
            }
            ControllerState::Succeeded(report) => {
                info!("AI insights generated successfully");
                return Ok(report);
            }
            ControllerState::Exhausted {
                attempts,
                last_error,
            } => {
                return Err(InsightGenerationFailed {
                    attempts,
                    last_error,
                });
            }
        };
    }
}

/// Entry point: composes the prompt for `results` and runs the attempt loop.
pub async fn generate_insights(
    client: &dyn GenerationClient,
    results: &NormalizedResultSet,
    options: &PipelineOptions,
) -> Result<InsightsReport, InsightGenerationFailed> {
    let prompt = compose_prompt(INSIGHTS_INSTRUCTIONS, results);
    debug!(
        "Composed prompt {} for {} tests ({} bytes, model {})",
        PROMPT_VERSION,
        results.len(),
        prompt.len(),
        client.model()
    );
    run_pipeline(client, &prompt, options).await
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::insights::normalizer::normalize_results;
    use crate::llm_client::LlmError;

    pub(crate) const VALID_MINIMAL: &str =
        "{\"best_field\":{},\"roadmap\":{},\"result_analysis\":{},\"career_recommendations\":[]}";

    /// Replies from a script; once the script runs out every call fails with `Api 503`.
    pub(crate) struct ScriptedClient {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        pub calls: AtomicU32,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        pub(crate) fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicU32::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn always_failing() -> Self {
            Self::new(vec![])
        }

        pub(crate) fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationClient for ScriptedClient {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(LlmError::Api {
                        status: 503,
                        message: "unavailable".to_string(),
                    })
                })
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    struct SlowClient {
        delay: Duration,
        completed: AtomicU32,
    }

    #[async_trait]
    impl GenerationClient for SlowClient {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            tokio::time::sleep(self.delay).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(VALID_MINIMAL.to_string())
        }

        fn model(&self) -> &str {
            "slow"
        }
    }

    fn transport() -> Result<String, LlmError> {
        Err(LlmError::Api {
            status: 500,
            message: "boom".to_string(),
        })
    }

    fn sample_results() -> NormalizedResultSet {
        let raw = json!({"mbti_test": {"personality_type": "INTJ"}});
        normalize_results(raw.as_object().unwrap())
    }

    #[test]
    fn test_advance_success_is_terminal() {
        let report = validate_insights(VALID_MINIMAL).unwrap();
        assert!(matches!(
            advance(1, 3, Ok(report)),
            ControllerState::Succeeded(_)
        ));
    }

    #[test]
    fn test_advance_failure_below_bound_retries() {
        assert_eq!(
            advance(2, 3, Err(AttemptError::EmptyResponse)),
            ControllerState::Attempting(3)
        );
    }

    #[test]
    fn test_advance_failure_at_bound_exhausts() {
        assert_eq!(
            advance(3, 3, Err(AttemptError::EmptyResponse)),
            ControllerState::Exhausted {
                attempts: 3,
                last_error: AttemptError::EmptyResponse
            }
        );
    }

    #[tokio::test]
    async fn test_retry_bound_with_always_failing_client() {
        let client = ScriptedClient::always_failing();
        let options = PipelineOptions::default().with_max_attempts(4);
        let err = generate_insights(&client, &sample_results(), &options)
            .await
            .unwrap_err();
        assert_eq!(client.calls(), 4);
        assert_eq!(err.attempts, 4);
        assert_eq!(err.last_error.kind(), "TransportError");
    }

    #[tokio::test]
    async fn test_default_max_attempts_is_three() {
        let client = ScriptedClient::always_failing();
        let err = generate_insights(&client, &sample_results(), &PipelineOptions::default())
            .await
            .unwrap_err();
        assert_eq!(client.calls(), 3);
        assert_eq!(err.attempts, 3);
    }

    #[tokio::test]
    async fn test_zero_max_attempts_still_makes_one_attempt() {
        let client = ScriptedClient::always_failing();
        let options = PipelineOptions::default().with_max_attempts(0);
        let err = generate_insights(&client, &sample_results(), &options)
            .await
            .unwrap_err();
        assert_eq!(client.calls(), 1);
        assert_eq!(err.attempts, 1);
    }

    #[tokio::test]
    async fn test_success_short_circuits_after_second_attempt() {
        let client = ScriptedClient::new(vec![transport(), Ok(VALID_MINIMAL.to_string())]);
        let report = generate_insights(&client, &sample_results(), &PipelineOptions::default())
            .await
            .unwrap();
        assert_eq!(client.calls(), 2);
        assert!(report.get("best_field").is_some());
    }

    #[tokio::test]
    async fn test_last_error_reflects_final_attempt() {
        let client = ScriptedClient::new(vec![
            Err(LlmError::EmptyResponse),
            Ok("not json at all".to_string()),
            Ok("{\"best_field\": {}}".to_string()),
        ]);
        let err = generate_insights(&client, &sample_results(), &PipelineOptions::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.last_error,
            AttemptError::SchemaViolation {
                missing_key: "roadmap"
            }
        );
    }

    #[tokio::test]
    async fn test_fenced_response_is_accepted() {
        let fenced = format!("```json\n{VALID_MINIMAL}\n```");
        let client = ScriptedClient::new(vec![Ok(fenced)]);
        let options = PipelineOptions::default().with_max_attempts(1);
        assert!(generate_insights(&client, &sample_results(), &options)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_exhaustion_never_yields_a_report() {
        let client = ScriptedClient::new(vec![
            Ok("{}".to_string()),
            Ok("```json\n{\"roadmap\": {}}\n```".to_string()),
        ]);
        let options = PipelineOptions::default().with_max_attempts(2);
        let result = generate_insights(&client, &sample_results(), &options).await;
        match result {
            Err(InsightGenerationFailed { attempts, .. }) => assert_eq!(attempts, 2),
            Ok(report) => panic!("exhaustion must fail, got report {report:?}"),
        }
    }

    #[tokio::test]
    async fn test_end_to_end_single_attempt() {
        let client = ScriptedClient::new(vec![Ok(VALID_MINIMAL.to_string())]);
        let options = PipelineOptions::default().with_max_attempts(1);
        let report = generate_insights(&client, &sample_results(), &options)
            .await
            .unwrap();
        assert_eq!(
            report.into_value(),
            json!({
                "best_field": {},
                "roadmap": {},
                "result_analysis": {},
                "career_recommendations": []
            })
        );

        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0].starts_with(INSIGHTS_INSTRUCTIONS));
        assert!(prompts[0].contains("=== MBTI_TEST ===\npersonality_type: INTJ\n"));
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("short"), "short");
        let long = "é".repeat(PREVIEW_CHARS + 5);
        let cut = preview(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), PREVIEW_CHARS + 3);
    }

    #[tokio::test]
    async fn test_attempt_records_raw_response() {
        let client = ScriptedClient::new(vec![Ok("garbage".to_string())]);
        let attempt = run_attempt(&client, "p", Duration::from_secs(1), 1).await;
        assert_eq!(attempt.raw_response.as_deref(), Some("garbage"));
        assert_eq!(attempt.outcome.unwrap_err().kind(), "MalformedPayload");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_transport_error() {
        let client = SlowClient {
            delay: Duration::from_secs(30),
            completed: AtomicU32::new(0),
        };
        let options = PipelineOptions {
            max_attempts: 2,
            attempt_timeout: Duration::from_secs(1),
            backoff: Duration::from_millis(50),
        };
        let err = generate_insights(&client, &sample_results(), &options)
            .await
            .unwrap_err();
        assert_eq!(err.attempts, 2);
        assert_eq!(err.last_error.kind(), "TransportError");
        assert_eq!(client.completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_pipeline_abandons_in_flight_call() {
        let client = SlowClient {
            delay: Duration::from_secs(30),
            completed: AtomicU32::new(0),
        };
        let results = sample_results();
        let options = PipelineOptions::default();
        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            generate_insights(&client, &results, &options),
        )
        .await;
        assert!(outcome.is_err());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(client.completed.load(Ordering::SeqCst), 0);
    }
}
