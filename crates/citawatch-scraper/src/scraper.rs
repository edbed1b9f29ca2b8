//! Sequential job runner for the portal pipeline.
//!
//! Browser sessions are the expensive resource here, so jobs run one at a
//! time, each owning one isolated session for its lifetime. The scrape
//! itself is a strict forward-only pipeline: fill the form, extract doctor
//! candidates, probe the date picker, compose the message.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use citawatch_core::PortalConfig;
use citawatch_notify::Notifier;

use crate::driver::FormDriver;
use crate::error::ScrapeError;
use crate::extract::extract_doctors;
use crate::form::{fill_form, FormPlan, DATE_FIELD};
use crate::outcome::ScrapeOutcome;
use crate::session::BrowserSession;

/// One `(health centre, specialty)` pair, as the form's option values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobKey {
    pub health_centre_id: String,
    pub specialty_id: String,
}

/// Runs the full scrape state machine for one job against an already
/// established driver.
///
/// Steps are strictly ordered with no backward transitions; an empty merged
/// doctor set short-circuits past the date probe.
///
/// # Errors
///
/// Any unrecovered step fault: navigation failure, a non-timeout DOM fault,
/// an element missing where the form contract promises one.
pub async fn scrape_job<D: FormDriver + ?Sized>(
    driver: &D,
    config: &PortalConfig,
    job: &JobKey,
) -> Result<ScrapeOutcome, ScrapeError> {
    let plan = FormPlan::new(config, job);

    let form = fill_form(driver, &plan).await?;
    let extracted = extract_doctors(driver, form, plan.control_wait).await?;

    if extracted.doctors.is_empty() {
        // No doctors: probing dates would be pointless.
        return Ok(ScrapeOutcome::NoDoctorsAvailable);
    }

    let read_only = driver.is_read_only(DATE_FIELD).await?;
    if read_only {
        Ok(ScrapeOutcome::DoctorsAvailableNoDates)
    } else {
        Ok(ScrapeOutcome::DoctorsAvailableWithDates(extracted.doctors))
    }
}

/// Sequential runner over the configured job set.
pub struct PortalScraper {
    config: PortalConfig,
    notifier: Arc<dyn Notifier>,
}

impl PortalScraper {
    #[must_use]
    pub fn new(config: PortalConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self { config, notifier }
    }

    /// Attempts every `(health centre, specialty)` pair exactly once, one
    /// session per job, notifying as each job completes.
    ///
    /// Per-job errors are logged and do not stop the remaining jobs; the
    /// first error is returned for visibility once the sweep is done.
    /// Cancellation stops jobs that have not started yet.
    ///
    /// # Errors
    ///
    /// Returns the first job error of the run.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) -> Result<(), ScrapeError> {
        let mut failed = 0usize;
        let mut first_error = None;

        'sweep: for health_centre_id in &self.config.health_centre_ids {
            for specialty_id in &self.config.specialty_ids {
                if *cancel.borrow() {
                    tracing::info!("run cancelled; remaining scrape jobs not scheduled");
                    break 'sweep;
                }

                let job = JobKey {
                    health_centre_id: health_centre_id.clone(),
                    specialty_id: specialty_id.clone(),
                };

                match self.run_job(&job, &mut cancel).await {
                    Ok(Some(message)) => self.notifier.notify(&message).await,
                    // Cancelled mid-job; the loop exits on its next check.
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!(
                            centre = %job.health_centre_id,
                            specialty = %job.specialty_id,
                            error = %e,
                            "scrape job failed"
                        );
                        failed += 1;
                        if first_error.is_none() {
                            first_error = Some(e);
                        }
                    }
                }
            }
        }

        if failed > 0 {
            tracing::warn!(failed, "some scrape jobs failed");
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// One job: launch an isolated session, scrape under the job deadline,
    /// and release the session on every exit path. `Ok(None)` means the job
    /// was abandoned by run-level cancellation; no notification is sent.
    async fn run_job(
        &self,
        job: &JobKey,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<Option<String>, ScrapeError> {
        let session = BrowserSession::launch(&self.config).await?;
        let deadline = Duration::from_secs(self.config.job_timeout_secs);

        let outcome = tokio::select! {
            () = cancelled(cancel) => {
                tracing::info!(
                    centre = %job.health_centre_id,
                    specialty = %job.specialty_id,
                    "run cancelled; in-flight scrape job abandoned"
                );
                None
            }
            result = tokio::time::timeout(deadline, scrape_job(&session, &self.config, job)) => {
                Some(result)
            }
        };

        // The session is released whether the scrape succeeded, failed,
        // timed out mid-step, or was cancelled.
        session.close().await;

        match outcome {
            None => Ok(None),
            Some(Ok(Ok(outcome))) => Ok(Some(outcome.message(job))),
            Some(Ok(Err(e))) => Err(e),
            Some(Err(_elapsed)) => Err(ScrapeError::JobTimeout {
                secs: self.config.job_timeout_secs,
            }),
        }
    }
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
