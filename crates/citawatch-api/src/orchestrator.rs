//! Bounded fan-out over the configured `(health centre, specialty)` pairs.
//!
//! One login gates the whole run; each pair then becomes an independent job
//! with its own timeout. Job failures are logged and counted without
//! touching sibling jobs, and results are pushed to the notifier as each
//! job completes, not batched.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::watch;

use citawatch_core::ApiConfig;
use citawatch_notify::Notifier;

use crate::client::AvailabilityClient;
use crate::error::ApiError;
use crate::message::availability_message;
use crate::types::JobKey;

/// Outcome of one availability job. `Failed` wraps the job's own error;
/// `Skipped` marks a job that observed the cancellation signal before
/// issuing its request.
enum JobOutcome {
    Delivered,
    Skipped,
    Failed(ApiError),
}

/// Runs every item through `run`, at most `limit` concurrently, and
/// collects the results in completion order.
async fn fan_out<T, R, F, Fut>(items: Vec<T>, limit: usize, run: F) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: std::future::Future<Output = R>,
{
    stream::iter(items)
        .map(run)
        .buffer_unordered(limit.max(1))
        .collect()
        .await
}

/// Resolves once the run-level cancellation signal fires. If the sender is
/// gone cancellation can no longer happen, so the future never resolves.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    while !*cancel.borrow() {
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Fan-out controller for the REST pipeline.
pub struct Orchestrator {
    client: AvailabilityClient,
    config: ApiConfig,
    notifier: Arc<dyn Notifier>,
}

impl Orchestrator {
    /// Builds the orchestrator and its HTTP client from the pipeline
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] or [`ApiError::Http`] if the
    /// client cannot be constructed.
    pub fn new(config: ApiConfig, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        let client = AvailabilityClient::new(&config)?;
        Ok(Self {
            client,
            config,
            notifier,
        })
    }

    /// Executes one sweep: login once, then query every configured
    /// `(health centre, specialty)` pair exactly once under the concurrency
    /// limit.
    ///
    /// The returned error is for visibility only: the first per-job error
    /// encountered, after every sibling job has run to completion. A login
    /// failure is the one case where no jobs are scheduled at all.
    ///
    /// # Errors
    ///
    /// Returns the login error, or the first job error of the run.
    pub async fn run(&self, cancel: watch::Receiver<bool>) -> Result<(), ApiError> {
        if *cancel.borrow() {
            tracing::info!("run cancelled before login; no availability jobs scheduled");
            return Ok(());
        }

        let token = match self.client.login().await {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(error = %e, "login failed; no availability jobs scheduled");
                return Err(e);
            }
        };

        // Run-start date; every job of the sweep queries the same window.
        let initial_date = chrono::Local::now().format("%Y/%m/%d").to_string();

        let jobs: Vec<JobKey> = self
            .config
            .health_centre_ids
            .iter()
            .flat_map(|&health_centre_id| {
                self.config.specialty_ids.iter().map(move |&specialty_id| JobKey {
                    health_centre_id,
                    specialty_id,
                })
            })
            .collect();
        let job_count = jobs.len();

        let outcomes = fan_out(jobs, self.config.max_concurrent_jobs, |job| {
            let cancel = cancel.clone();
            let token = token.as_str();
            let initial_date = initial_date.as_str();
            async move { self.run_job(token, job, initial_date, cancel).await }
        })
        .await;

        let mut failed = 0usize;
        let mut first_error = None;
        for outcome in outcomes {
            if let JobOutcome::Failed(e) = outcome {
                failed += 1;
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        if failed > 0 {
            tracing::warn!(failed, total = job_count, "some availability jobs failed");
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn run_job(
        &self,
        token: &str,
        job: JobKey,
        initial_date: &str,
        mut cancel: watch::Receiver<bool>,
    ) -> JobOutcome {
        if *cancel.borrow() {
            tracing::info!(
                centre = job.health_centre_id,
                specialty = job.specialty_id,
                "run cancelled; availability job skipped"
            );
            return JobOutcome::Skipped;
        }

        let deadline = Duration::from_secs(self.config.job_timeout_secs);
        let query = async {
            match tokio::time::timeout(
                deadline,
                self.client.availability(token, job, initial_date),
            )
            .await
            {
                Ok(Ok(slots)) => {
                    let message = availability_message(job.specialty_id, &slots);
                    self.notifier.notify(&message).await;
                    JobOutcome::Delivered
                }
                Ok(Err(e)) => {
                    tracing::error!(
                        centre = job.health_centre_id,
                        specialty = job.specialty_id,
                        error = %e,
                        "availability job failed"
                    );
                    JobOutcome::Failed(e)
                }
                Err(_elapsed) => {
                    tracing::error!(
                        centre = job.health_centre_id,
                        specialty = job.specialty_id,
                        secs = self.config.job_timeout_secs,
                        "availability job abandoned after its timeout"
                    );
                    JobOutcome::Failed(ApiError::JobTimeout {
                        secs: self.config.job_timeout_secs,
                    })
                }
            }
        };

        // Dropping the query future aborts the in-flight request.
        tokio::select! {
            () = cancelled(&mut cancel) => {
                tracing::info!(
                    centre = job.health_centre_id,
                    specialty = job.specialty_id,
                    "run cancelled; in-flight availability job abandoned"
                );
                JobOutcome::Skipped
            }
            outcome = query => outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::fan_out;

    #[tokio::test]
    async fn fan_out_never_exceeds_the_concurrency_limit() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let items: Vec<usize> = (0..20).collect();
        let results = fan_out(items, 5, |i| {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                i
            }
        })
        .await;

        assert_eq!(results.len(), 20, "every job must run exactly once");
        let peak = peak.load(Ordering::SeqCst);
        assert!(peak <= 5, "peak concurrency {peak} exceeded the limit");
    }

    #[tokio::test]
    async fn fan_out_treats_zero_limit_as_one() {
        let results = fan_out(vec![1, 2, 3], 0, |i| async move { i * 2 }).await;
        let mut results = results;
        results.sort_unstable();
        assert_eq!(results, vec![2, 4, 6]);
    }
}
