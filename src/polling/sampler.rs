// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{ResourceError, Result};
use crate::polling::retry::{ErrorClass, RetryTable};
use crate::polling::watch::TimeoutWatch;
use futures::{Stream, TryStreamExt};
use std::future::Future;
use std::pin::pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Repeatedly calls `func` every `sleep` until `wait_timeout` is spent.
///
/// Each call's value is yielded from [`TimeoutSampler::samples`]; the consumer decides
/// when it has seen enough and stops reading. Errors listed in the [`RetryTable`] are
/// swallowed, anything else ends the stream on its first occurrence. Running out of
/// time yields a final `TimeoutExpired` carrying the last swallowed error.
pub struct TimeoutSampler<F> {
    wait_timeout: Duration,
    sleep: Duration,
    func: F,
    retry: RetryTable,
    description: String,
}

struct SamplerState<F> {
    func: F,
    watch: TimeoutWatch,
    sleep: Duration,
    retry: RetryTable,
    description: String,
    last_error: Option<ResourceError>,
    started: bool,
    finished: bool,
}

impl<F, Fut, T> TimeoutSampler<F>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    /// New sampler that retries every error, matching a bare `{Exception: []}` table
    pub fn new(wait_timeout: Duration, sleep: Duration, func: F) -> Self {
        Self {
            wait_timeout,
            sleep,
            func,
            retry: RetryTable::any(),
            description: "sample".to_string(),
        }
    }

    pub fn retry_on(mut self, retry: RetryTable) -> Self {
        self.retry = retry;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Lazy stream of samples. Finite: ends after a fatal error or the timeout item.
    pub fn samples(self) -> impl Stream<Item = Result<T>> {
        let state = SamplerState {
            func: self.func,
            watch: TimeoutWatch::new(self.wait_timeout),
            sleep: self.sleep,
            retry: self.retry,
            description: self.description,
            last_error: None,
            started: false,
            finished: false,
        };

        futures::stream::unfold(state, |mut state| async move {
            if state.finished {
                return None;
            }

            loop {
                if state.started {
                    sleep(state.sleep.min(state.watch.remaining_time())).await;
                } else {
                    state.started = true;
                    info!(
                        "Waiting for {:?}, retry every {:?} ({})",
                        state.watch.timeout(),
                        state.sleep,
                        state.description
                    );
                }

                if state.watch.is_expired() {
                    state.finished = true;
                    let err = ResourceError::TimeoutExpired {
                        message: format!(
                            "{} after {:?}",
                            state.description,
                            state.watch.timeout()
                        ),
                        last_error: state.last_error.take().map(Box::new),
                    };
                    return Some((Err(err), state));
                }

                match (state.func)().await {
                    Ok(value) => return Some((Ok(value), state)),
                    Err(err) if state.retry.is_retryable(&err) => {
                        debug!(
                            "{}: retrying after {}: {}",
                            state.description,
                            ErrorClass::of(&err),
                            err
                        );
                        state.last_error = Some(err);
                    }
                    Err(err) => {
                        state.finished = true;
                        return Some((Err(err), state));
                    }
                }
            }
        })
    }

    /// Poll until `predicate` accepts a sample and return that sample
    pub async fn wait_until(self, mut predicate: impl FnMut(&T) -> bool) -> Result<T> {
        let mut samples = pin!(self.samples());
        while let Some(sample) = samples.try_next().await? {
            if predicate(&sample) {
                return Ok(sample);
            }
        }
        // The stream only ends after yielding an error, which `?` already returned.
        Err(ResourceError::timeout("sampler ended without a result"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::api_error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_always_false_times_out_after_budget() {
        let start = Instant::now();
        let sampler = TimeoutSampler::new(Duration::from_secs(2), Duration::from_secs(1), || async {
            Ok(false)
        });

        let mut samples = pin!(sampler.samples());
        let mut falsy = 0;
        let err = loop {
            match samples.try_next().await {
                Ok(Some(false)) => falsy += 1,
                Ok(Some(true)) => panic!("sample should never be true"),
                Ok(None) => panic!("stream ended without timeout"),
                Err(e) => break e,
            }
        };

        assert!(matches!(err, ResourceError::TimeoutExpired { .. }));
        assert!(falsy >= 2);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed <= Duration::from_secs(3));
        assert!(samples.try_next().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_truthy_value_stops_without_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let sampler = TimeoutSampler::new(Duration::from_secs(10), Duration::from_secs(1), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok(n >= 3) }
        });

        let value = sampler.wait_until(|ready| *ready).await.unwrap();

        assert!(value);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_registered_class_without_messages_is_always_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let sampler = TimeoutSampler::new(Duration::from_secs(5), Duration::from_secs(1), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 3 {
                    Err(api_error(404, &format!("message number {n}")))
                } else {
                    Ok("found")
                }
            }
        })
        .retry_on(RetryTable::not_found());

        let value = sampler.wait_until(|_| true).await.unwrap();

        assert_eq!(value, "found");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unregistered_error_propagates_immediately() {
        let start = Instant::now();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let sampler = TimeoutSampler::new(Duration::from_secs(60), Duration::from_secs(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<bool, _>(api_error(403, "forbidden")) }
        })
        .retry_on(RetryTable::not_found());

        let err = sampler.wait_until(|v| *v).await.unwrap_err();

        assert_eq!(ErrorClass::of(&err), ErrorClass::Forbidden);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_filter_controls_retry() {
        let sampler = TimeoutSampler::new(Duration::from_secs(5), Duration::from_secs(1), || async {
            Err::<bool, _>(api_error(409, "already exists"))
        })
        .retry_on(RetryTable::none().on_messages(ErrorClass::Conflict, ["has been modified"]));

        let err = sampler.wait_until(|v| *v).await.unwrap_err();
        assert_eq!(ErrorClass::of(&err), ErrorClass::Conflict);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_carries_last_error() {
        let sampler = TimeoutSampler::new(Duration::from_secs(3), Duration::from_secs(1), || async {
            Err::<bool, _>(api_error(404, "pods \"web\" not found"))
        })
        .retry_on(RetryTable::not_found())
        .describe("pod web");

        let err = sampler.wait_until(|v| *v).await.unwrap_err();

        match &err {
            ResourceError::TimeoutExpired {
                message,
                last_error,
            } => {
                assert!(message.contains("pod web"));
                let last = last_error.as_ref().expect("last error recorded");
                assert!(last.is_not_found());
            }
            other => panic!("unexpected error: {other}"),
        }
        let rendered = err.to_string();
        assert!(rendered.contains("NotFoundError"));
        assert!(rendered.contains("not found"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_table_retries_everything() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let sampler = TimeoutSampler::new(Duration::from_secs(5), Duration::from_secs(1), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(ResourceError::InvalidResource("flaky".to_string()))
                } else {
                    Ok(true)
                }
            }
        });

        assert!(sampler.wait_until(|v| *v).await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_the_stream_stops_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let sampler = TimeoutSampler::new(Duration::from_secs(30), Duration::from_secs(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(1) }
        });

        {
            let mut samples = pin!(sampler.samples());
            assert_eq!(samples.try_next().await.unwrap(), Some(1));
        }
        tokio::time::advance(Duration::from_secs(10)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
