//! Bounded retries with exponential backoff and jitter.
//!
//! [`RetryPolicy`] is the only place retry behavior is defined. Text
//! generation goes through [`RetryableCaller`]; the evidence collector drives
//! its searches through the same [`retry`] loop.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::{CallError, GenerationError};
use crate::traits::generator::{GenerationRequest, TextGenerator};

/// Retry configuration shared by every remote call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 behave as 1.
    pub max_attempts: u32,

    /// Delay after the first failure; doubles after each further failure.
    pub initial_backoff_ms: u64,

    /// Upper bound (exclusive) of the uniform jitter added to each delay.
    pub jitter_ms: Option<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_backoff_ms: 1000,
            jitter_ms: Some(250),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff_ms: initial_backoff.as_millis() as u64,
            jitter_ms: None,
        }
    }

    /// Set the jitter range. A zero range disables jitter.
    pub fn with_jitter(mut self, range: Duration) -> Self {
        let ms = range.as_millis() as u64;
        self.jitter_ms = (ms > 0).then_some(ms);
        self
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn jitter(&self) -> Option<Duration> {
        self.jitter_ms.map(Duration::from_millis)
    }

    /// Attempts actually made before giving up.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay after the failed attempt with 0-based index `attempt`:
    /// `initial_backoff * 2^attempt + jitter`.
    pub fn delay_for(&self, attempt: u32, jitter: &dyn JitterSource) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let base = Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor));
        match self.jitter() {
            Some(range) => base.saturating_add(jitter.sample(range)),
            None => base,
        }
    }
}

/// Source of the random component of a backoff delay.
pub trait JitterSource: Send + Sync {
    /// A duration in `[0, range)`.
    fn sample(&self, range: Duration) -> Duration;
}

/// Uniform jitter from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl JitterSource for RandomJitter {
    fn sample(&self, range: Duration) -> Duration {
        let ms = range.as_millis() as u64;
        if ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..ms))
    }
}

/// No jitter at all. Makes delays exact.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn sample(&self, _range: Duration) -> Duration {
        Duration::ZERO
    }
}

/// Run `op` until it succeeds or `policy` runs out of attempts.
///
/// `op` receives the 0-based attempt index. No delay follows the final
/// attempt; its error is returned as [`CallError::last`].
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    jitter: &dyn JitterSource,
    label: &str,
    mut op: F,
) -> Result<T, CallError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.attempts();
    let mut attempt = 0u32;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let made = attempt + 1;
                if made >= max_attempts {
                    error!(call = label, attempts = made, error = %e, "Giving up");
                    return Err(CallError {
                        attempts: made,
                        last: e,
                    });
                }

                let delay = policy.delay_for(attempt, jitter);
                warn!(
                    call = label,
                    attempt = made,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Call failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// A [`TextGenerator`] behind the shared [`RetryPolicy`].
#[derive(Clone)]
pub struct RetryableCaller {
    generator: Arc<dyn TextGenerator>,
    policy: RetryPolicy,
    jitter: Arc<dyn JitterSource>,
}

impl RetryableCaller {
    pub fn new(generator: Arc<dyn TextGenerator>, policy: RetryPolicy) -> Self {
        Self {
            generator,
            policy,
            jitter: Arc::new(RandomJitter),
        }
    }

    pub fn with_jitter_source(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn jitter_source(&self) -> &dyn JitterSource {
        self.jitter.as_ref()
    }

    /// Issue `request`, retrying every [`GenerationError`].
    pub async fn call(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, CallError<GenerationError>> {
        retry(
            &self.policy,
            self.jitter.as_ref(),
            request.role.as_str(),
            |_| self.generator.generate(request),
        )
        .await
    }
}

impl std::fmt::Debug for RetryableCaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryableCaller")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::generator::AgentRole;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Fails `failures` times, then answers "ok". Records when each call started.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
        started: Mutex<Vec<Instant>>,
    }

    impl Flaky {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                started: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for Flaky {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            self.started.lock().unwrap().push(Instant::now());
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(GenerationError::Api {
                    status: 500,
                    message: format!("failure {}", n + 1),
                })
            } else {
                Ok("ok".into())
            }
        }
    }

    struct FixedJitter(Duration);

    impl JitterSource for FixedJitter {
        fn sample(&self, _range: Duration) -> Duration {
            self.0
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(AgentRole::Answerer, "gpt-4o")
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100));
        assert_eq!(policy.delay_for(0, &NoJitter), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1, &NoJitter), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3, &NoJitter), Duration::from_millis(800));
    }

    #[test]
    fn test_delay_adds_jitter_only_when_configured() {
        let fixed = FixedJitter(Duration::from_millis(7));
        let plain = RetryPolicy::new(3, Duration::from_millis(100));
        assert_eq!(plain.delay_for(0, &fixed), Duration::from_millis(100));

        let jittered = plain.with_jitter(Duration::from_millis(50));
        assert_eq!(jittered.delay_for(1, &fixed), Duration::from_millis(207));
    }

    #[test]
    fn test_delay_saturates() {
        let policy = RetryPolicy::new(100, Duration::from_millis(1000));
        let delay = policy.delay_for(90, &NoJitter);
        assert_eq!(delay, Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_random_jitter_in_range() {
        let range = Duration::from_millis(10);
        for _ in 0..200 {
            assert!(RandomJitter.sample(range) < range);
        }
        assert_eq!(RandomJitter.sample(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.initial_backoff(), Duration::from_secs(1));
        assert_eq!(policy.jitter(), Some(Duration::from_millis(250)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_exactly_max_attempts() {
        let flaky = Arc::new(Flaky::new(u32::MAX));
        let caller = RetryableCaller::new(flaky.clone(), RetryPolicy::new(3, Duration::from_millis(100)))
            .with_jitter_source(Arc::new(NoJitter));

        let err = caller.call(&request()).await.unwrap_err();

        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
        assert_eq!(err.attempts, 3);
        assert_eq!(
            err.last,
            GenerationError::Api {
                status: 500,
                message: "failure 3".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_between_attempts() {
        let flaky = Arc::new(Flaky::new(u32::MAX));
        let caller = RetryableCaller::new(flaky.clone(), RetryPolicy::new(4, Duration::from_millis(100)))
            .with_jitter_source(Arc::new(NoJitter));

        let _ = caller.call(&request()).await;

        let started = flaky.started.lock().unwrap().clone();
        assert_eq!(started.len(), 4);
        for i in 1..started.len() {
            let gap = started[i] - started[i - 1];
            let floor = Duration::from_millis(100 * (1 << (i - 1)));
            assert!(gap >= floor, "gap before attempt {i} was {gap:?}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failure() {
        let flaky = Arc::new(Flaky::new(1));
        let caller = RetryableCaller::new(flaky.clone(), RetryPolicy::new(2, Duration::from_millis(10)));

        assert_eq!(caller.call(&request()).await.unwrap(), "ok");
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_calls_once() {
        let flaky = Arc::new(Flaky::new(u32::MAX));
        let caller = RetryableCaller::new(flaky.clone(), RetryPolicy::new(0, Duration::from_millis(10)));

        let err = caller.call(&request()).await.unwrap_err();
        assert_eq!(err.attempts, 1);
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generic_retry_passes_attempt_index() {
        let seen = Mutex::new(Vec::new());
        let result: Result<(), CallError<String>> =
            retry(&RetryPolicy::new(3, Duration::from_millis(1)), &NoJitter, "test", |attempt| {
                seen.lock().unwrap().push(attempt);
                async move { Err(format!("attempt {attempt}")) }
            })
            .await;

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(result.unwrap_err().last, "attempt 2");
    }
}
