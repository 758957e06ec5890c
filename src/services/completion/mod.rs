mod http;
mod sse;
mod traits;

pub use traits::{CompletionBoxFuture, Summarizer};

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

/// Label stored in each record's `model` column.
pub const PROVIDER_NAME: &str = "groq";

/// Immutable per-process settings for the completion client, built from
/// [`crate::config::Config`] at startup and passed to the constructor.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub attempt_timeout: Duration,
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

/// Raised once every configured attempt has failed. The only failure callers
/// of [`Summarizer::summarize`] can observe; the per-attempt causes stay in
/// the logs.
#[derive(Debug, thiserror::Error)]
#[error("completion provider unavailable after {attempts} attempts")]
pub struct ServiceUnavailable {
    pub attempts: u32,
}

/// Failure cause of a single attempt. Internal only: recorded per attempt,
/// never distinguished across the client boundary.
#[derive(Debug, thiserror::Error)]
pub(crate) enum AttemptError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("stream read failed: {0}")]
    Stream(String),
    #[error("attempt timed out after {0:?}")]
    TimedOut(Duration),
}

/// One full attempt: open the streaming call and consume it to completion.
/// Separated from the retry loop so the loop is testable with an injected
/// fake.
pub(crate) trait CompletionTransport: Send + Sync {
    fn complete<'a>(
        &'a self,
        text: &'a str,
    ) -> CompletionBoxFuture<'a, Result<String, AttemptError>>;
}

/// Resilient client for the remote summarization provider. Holds no per-call
/// mutable state: concurrent `summarize` calls proceed independently.
pub struct CompletionClient {
    transport: Arc<dyn CompletionTransport>,
    attempt_timeout: Duration,
    max_attempts: u32,
    base_backoff: Duration,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> CompletionClient {
        let attempt_timeout = config.attempt_timeout;
        let max_attempts = config.max_attempts;
        let base_backoff = config.base_backoff;
        CompletionClient {
            transport: Arc::new(http::HttpTransport::new(config)),
            attempt_timeout,
            max_attempts,
            base_backoff,
        }
    }

    #[cfg(test)]
    fn with_transport(
        transport: Arc<dyn CompletionTransport>,
        attempt_timeout: Duration,
        max_attempts: u32,
        base_backoff: Duration,
    ) -> CompletionClient {
        CompletionClient {
            transport,
            attempt_timeout,
            max_attempts,
            base_backoff,
        }
    }

    /// The attempt loop. Each attempt is bounded by `attempt_timeout`
    /// (connection plus full stream consumption); a timed-out attempt is
    /// handled exactly like a transport failure. Failed attempts back off
    /// `base_backoff * 2^(attempt - 1)` before the next try; the last
    /// failure terminates with [`ServiceUnavailable`].
    async fn summarize_with_retry(&self, text: &str) -> Result<String, ServiceUnavailable> {
        let max_attempts = self.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let outcome =
                match tokio::time::timeout(self.attempt_timeout, self.transport.complete(text))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(AttemptError::TimedOut(self.attempt_timeout)),
                };

            match outcome {
                Ok(summary) => {
                    debug!(attempt, "completion succeeded");
                    return Ok(summary);
                }
                Err(err) => {
                    warn!(attempt, max_attempts, error = %err, "completion attempt failed");
                }
            }

            if attempt < max_attempts {
                let delay = self.base_backoff * 2u32.saturating_pow(attempt - 1);
                tokio::time::sleep(delay).await;
            }
        }

        error!(attempts = max_attempts, "completion attempts exhausted");
        Err(ServiceUnavailable {
            attempts: max_attempts,
        })
    }
}

impl Summarizer for CompletionClient {
    fn summarize<'a>(
        &'a self,
        text: &'a str,
    ) -> CompletionBoxFuture<'a, Result<String, ServiceUnavailable>> {
        Box::pin(self.summarize_with_retry(text))
    }

    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::{
        AttemptError, CompletionBoxFuture, CompletionClient, CompletionTransport, Summarizer,
    };

    /// Fails the first `fail_first` calls, then succeeds.
    struct ScriptedTransport {
        fail_first: usize,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedTransport {
        fn new(fail_first: usize) -> Arc<ScriptedTransport> {
            Arc::new(ScriptedTransport {
                fail_first,
                calls: Arc::new(Mutex::new(Vec::new())),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl CompletionTransport for ScriptedTransport {
        fn complete<'a>(
            &'a self,
            text: &'a str,
        ) -> CompletionBoxFuture<'a, Result<String, AttemptError>> {
            Box::pin(async move {
                let attempt = {
                    let mut calls = self.calls.lock().unwrap();
                    calls.push(text.to_string());
                    calls.len()
                };
                if attempt <= self.fail_first {
                    Err(AttemptError::Request("connection reset".to_string()))
                } else {
                    Ok(format!("summary from attempt {attempt}"))
                }
            })
        }
    }

    /// Never resolves; only the per-attempt timeout can end a call.
    struct HangingTransport {
        calls: Arc<Mutex<usize>>,
    }

    impl HangingTransport {
        fn new() -> Arc<HangingTransport> {
            Arc::new(HangingTransport {
                calls: Arc::new(Mutex::new(0)),
            })
        }

        fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl CompletionTransport for HangingTransport {
        fn complete<'a>(
            &'a self,
            _text: &'a str,
        ) -> CompletionBoxFuture<'a, Result<String, AttemptError>> {
            Box::pin(async move {
                *self.calls.lock().unwrap() += 1;
                futures::future::pending().await
            })
        }
    }

    fn client_with(transport: Arc<dyn CompletionTransport>) -> CompletionClient {
        CompletionClient::with_transport(
            transport,
            Duration::from_secs(30),
            3,
            Duration::from_secs(1),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn first_attempt_success_returns_immediately() {
        let transport = ScriptedTransport::new(0);
        let client = client_with(transport.clone());
        let started = tokio::time::Instant::now();

        let summary = client.summarize("input").await.expect("should succeed");

        assert_eq!(summary, "summary from attempt 1");
        assert_eq!(transport.call_count(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_with_exponential_backoff_until_success() {
        let transport = ScriptedTransport::new(2);
        let client = client_with(transport.clone());
        let started = tokio::time::Instant::now();

        let summary = client.summarize("input").await.expect("should succeed");

        assert_eq!(summary, "summary from attempt 3");
        assert_eq!(transport.call_count(), 3);
        // 1s after attempt 1, 2s after attempt 2
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_attempts_fail_terminally_without_trailing_backoff() {
        let transport = ScriptedTransport::new(usize::MAX);
        let client = client_with(transport.clone());
        let started = tokio::time::Instant::now();

        let err = client.summarize("input").await.expect_err("should exhaust");

        assert_eq!(err.attempts, 3);
        assert_eq!(transport.call_count(), 3);
        // no sleep after the final failure
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_attempts_count_like_transport_failures() {
        let transport = HangingTransport::new();
        let client = CompletionClient::with_transport(
            transport.clone(),
            Duration::from_secs(5),
            2,
            Duration::from_secs(1),
        );
        let started = tokio::time::Instant::now();

        let err = client.summarize("input").await.expect_err("should exhaust");

        assert_eq!(err.attempts, 2);
        assert_eq!(transport.call_count(), 2);
        // two 5s timeouts separated by the single 1s backoff
        assert_eq!(started.elapsed(), Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_configured_attempts_still_run_once() {
        let transport = ScriptedTransport::new(usize::MAX);
        let client = CompletionClient::with_transport(
            transport.clone(),
            Duration::from_secs(5),
            0,
            Duration::from_secs(1),
        );

        let err = client.summarize("input").await.expect_err("should fail");

        assert_eq!(err.attempts, 1);
        assert_eq!(transport.call_count(), 1);
    }
}
