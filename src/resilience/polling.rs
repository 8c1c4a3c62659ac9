//! Cooperative polling loops.
//!
//! # Responsibilities
//! - Invoke an async producer, test its result, sleep, repeat
//! - Enforce optional attempt caps and deadlines
//! - Observe cancellation while sleeping

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::{sleep, timeout_at, Instant};

use crate::lifecycle::shutdown::is_cancelled;

/// Bounds applied by [`poll_bounded`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollLimits {
    /// Maximum producer invocations.
    pub max_attempts: Option<u32>,
    /// Maximum wall time for the whole loop.
    pub deadline: Option<Duration>,
}

impl PollLimits {
    /// No bounds at all.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Reasons a bounded poll stops without a final result.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError<E> {
    #[error("producer failed: {0}")]
    Producer(E),

    #[error("condition still pending after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("deadline exceeded after {attempts} attempts")]
    DeadlineExceeded { attempts: u32 },

    #[error("polling cancelled")]
    Cancelled,
}

/// Repeatedly invoke `producer` until `continue_condition` returns false.
///
/// The first result for which the condition is false is returned without any
/// delay. There is no attempt cap; producer errors propagate immediately.
pub async fn poll<T, E, F, Fut, C>(
    mut producer: F,
    mut continue_condition: C,
    delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: FnMut(&T) -> bool,
{
    loop {
        let result = producer().await?;
        if !continue_condition(&result) {
            return Ok(result);
        }
        sleep(delay).await;
    }
}

/// [`poll`] with an attempt cap, a deadline and an optional cancellation signal.
pub async fn poll_bounded<T, E, F, Fut, C>(
    mut producer: F,
    mut continue_condition: C,
    delay: Duration,
    limits: PollLimits,
    mut cancel: Option<&mut broadcast::Receiver<()>>,
) -> Result<T, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: FnMut(&T) -> bool,
{
    let deadline = limits.deadline.map(|d| Instant::now() + d);
    let mut attempts = 0u32;

    loop {
        if let Some(rx) = cancel.as_deref_mut() {
            if is_cancelled(rx) {
                return Err(PollError::Cancelled);
            }
        }

        attempts += 1;
        let result = match deadline {
            Some(at) => match timeout_at(at, producer()).await {
                Ok(result) => result,
                Err(_) => return Err(PollError::DeadlineExceeded { attempts }),
            },
            None => producer().await,
        }
        .map_err(PollError::Producer)?;

        if !continue_condition(&result) {
            return Ok(result);
        }

        if limits.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(PollError::Exhausted { attempts });
        }
        if deadline.is_some_and(|at| Instant::now() + delay > at) {
            return Err(PollError::DeadlineExceeded { attempts });
        }

        match cancel.as_deref_mut() {
            Some(rx) => {
                tokio::select! {
                    _ = sleep(delay) => {}
                    _ = rx.recv() => return Err(PollError::Cancelled),
                }
            }
            None => sleep(delay).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counter_producer(
        calls: Arc<AtomicU32>,
    ) -> impl FnMut() -> std::future::Ready<Result<u32, String>> {
        move || std::future::ready(Ok(calls.fetch_add(1, Ordering::SeqCst) + 1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_first_result_without_delay() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let result = poll(counter_producer(calls.clone()), |_| false, Duration::from_secs(3))
            .await
            .unwrap();

        assert_eq!(result, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeats_until_condition_clears() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let result = poll(counter_producer(calls.clone()), |n| *n < 4, Duration::from_secs(3))
            .await
            .unwrap();

        assert_eq!(result, 4);
        assert_eq!(started.elapsed(), Duration::from_secs(9));
    }

    #[tokio::test]
    async fn test_producer_error_propagates() {
        let result: Result<u32, String> = poll(
            || std::future::ready(Err("boom".to_string())),
            |_| true,
            Duration::from_millis(1),
        )
        .await;
        assert_eq!(result.unwrap_err(), "boom");
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_exhausts() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = poll_bounded(
            counter_producer(calls.clone()),
            |_| true,
            Duration::from_secs(1),
            PollLimits::attempts(5),
            None,
        )
        .await;

        assert_eq!(result, Err(PollError::Exhausted { attempts: 5 }));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_deadline() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = poll_bounded(
            counter_producer(calls.clone()),
            |_| true,
            Duration::from_secs(3),
            PollLimits::unbounded().with_deadline(Duration::from_secs(10)),
            None,
        )
        .await;

        assert!(matches!(result, Err(PollError::DeadlineExceeded { attempts: 4 })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_cancellation() {
        let shutdown = Arc::new(Shutdown::new());
        let mut rx = shutdown.subscribe();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(5)).await;
            trigger.trigger();
        });

        let calls = Arc::new(AtomicU32::new(0));
        let result = poll_bounded(
            counter_producer(calls.clone()),
            |_| true,
            Duration::from_secs(3),
            PollLimits::unbounded(),
            Some(&mut rx),
        )
        .await;

        assert_eq!(result, Err(PollError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
