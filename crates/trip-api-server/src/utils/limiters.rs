use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::LimitsConfig;

/// Local saturation, never a provider failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LimitError {
    #[error("No {op} slot free within {waited:?}")]
    Timeout { op: &'static str, waited: Duration },

    #[error("{op} limiter is closed")]
    Closed { op: &'static str },
}

#[derive(Clone)]
pub struct Limiters {
    pub llm: Arc<Semaphore>,
    pub flight_search: Arc<Semaphore>,
    pub acquire_timeout: Duration,
}

impl Limiters {
    pub fn new(cfg: &LimitsConfig) -> Self {
        Self {
            llm: Arc::new(Semaphore::new(cfg.llm_concurrency.max(1))),
            flight_search: Arc::new(Semaphore::new(cfg.flight_search_concurrency.max(1))),
            acquire_timeout: Duration::from_millis(cfg.acquire_timeout_ms.max(1)),
        }
    }

    /// Waits up to `acquire_timeout` for a permit, returning it with the time spent waiting
    pub async fn acquire_timed(
        sem: Arc<Semaphore>,
        acquire_timeout: Duration,
        op: &'static str,
    ) -> Result<(OwnedSemaphorePermit, Duration), LimitError> {
        let start = Instant::now();

        match tokio::time::timeout(acquire_timeout, sem.acquire_owned()).await {
            Ok(Ok(permit)) => Ok((permit, start.elapsed())),
            Ok(Err(_)) => Err(LimitError::Closed { op }),
            Err(_) => Err(LimitError::Timeout { op, waited: start.elapsed() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_times_out_when_exhausted() {
        let limiters = Limiters::new(&LimitsConfig {
            llm_concurrency: 1,
            flight_search_concurrency: 1,
            acquire_timeout_ms: 20,
        });

        let (_held, _) = Limiters::acquire_timed(limiters.llm.clone(), limiters.acquire_timeout, "llm")
            .await
            .unwrap();

        let second = Limiters::acquire_timed(limiters.llm.clone(), limiters.acquire_timeout, "llm").await;
        assert!(matches!(second, Err(LimitError::Timeout { op: "llm", .. })));
    }

    #[tokio::test]
    async fn test_closed_semaphore_is_reported() {
        let sem = Arc::new(Semaphore::new(1));
        sem.close();

        let result = Limiters::acquire_timed(sem, Duration::from_millis(20), "flight_search").await;
        assert_eq!(result.unwrap_err(), LimitError::Closed { op: "flight_search" });
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let limiters = Limiters::new(&LimitsConfig {
            llm_concurrency: 0,
            flight_search_concurrency: 0,
            acquire_timeout_ms: 0,
        });
        assert_eq!(limiters.llm.available_permits(), 1);
        assert_eq!(limiters.acquire_timeout, Duration::from_millis(1));
    }
}
