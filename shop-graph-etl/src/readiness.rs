//! Bounded-retry readiness check for the two stores.

use std::fmt::Display;
use std::future::Future;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::ReadinessConfig;
use crate::errors::EtlError;

/// Polls a dependency until a trivial round-trip succeeds or the attempt
/// budget runs out.
#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    config: ReadinessConfig,
}

impl ReadinessProbe {
    pub fn new(config: ReadinessConfig) -> Self {
        Self { config }
    }

    /// Run `check` up to `attempts` times, sleeping `interval` between failures.
    ///
    /// `check` must release whatever connection it opens before its future
    /// resolves. There is no sleep after the final failed attempt.
    pub async fn wait_until_ready<F, Fut, E>(
        &self,
        dependency: &str,
        mut check: F,
    ) -> Result<(), EtlError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let attempts = self.config.attempts;
        info!(dependency, attempts, "Waiting for dependency to be ready");

        let mut last_error = String::from("no attempt made");
        for attempt in 1..=attempts {
            match check().await {
                Ok(()) => {
                    info!(dependency, attempt, "✓ Dependency is ready");
                    return Ok(());
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!(
                        dependency,
                        attempt,
                        attempts,
                        error = %last_error,
                        "Dependency not ready"
                    );
                    if attempt < attempts {
                        sleep(self.config.interval).await;
                    }
                }
            }
        }

        Err(EtlError::dependency_unavailable(dependency, attempts, last_error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    fn probe(attempts: u32) -> ReadinessProbe {
        ReadinessProbe::new(ReadinessConfig {
            attempts,
            interval: Duration::from_secs(3),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = probe(10)
            .wait_until_ready("postgres", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<(), &str>(()) }
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_ready() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = probe(10)
            .wait_until_ready("neo4j", || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err("connection refused")
                    } else {
                        Ok(())
                    }
                }
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(6) && elapsed < Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_exhausted() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = probe(4)
            .wait_until_ready("postgres", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>("connection refused") }
            })
            .await;

        match result {
            Err(EtlError::DependencyUnavailable {
                dependency,
                attempts,
                last_error,
            }) => {
                assert_eq!(dependency, "postgres");
                assert_eq!(attempts, 4);
                assert_eq!(last_error, "connection refused");
            }
            other => panic!("expected DependencyUnavailable, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // Three sleeps between four attempts
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(9) && elapsed < Duration::from_secs(10));
    }
}
