//! The five-step dependent form fill.
//!
//! Selections must be applied strictly in order; each one triggers an
//! asynchronous reload of the controls that depend on it, so a fixed settle
//! delay follows every write before the next control is touched.

use std::time::Duration;

use citawatch_core::PortalConfig;

use crate::driver::FormDriver;
use crate::error::ScrapeError;
use crate::scraper::JobKey;

pub(crate) const CENTRE_SELECT: &str = "#centro";
pub(crate) const INSURER_SELECT: &str = "#aseguradora";
pub(crate) const GROUP_SELECT: &str = "#colectivo";
pub(crate) const SPECIALTY_SELECT: &str = "#especialidad";
pub(crate) const CONCEPT_SELECT: &str = "#concepto";
pub(crate) const DOCTOR_LIST: &str = "#profesional";
pub(crate) const DOCTOR_INPUT: &str = "#profesionaloTX";
pub(crate) const DATE_FIELD: &str = "#dia";

/// Everything one job needs to fill the form: target URL, the ordered
/// selections, and the wait/settle policy.
pub(crate) struct FormPlan {
    pub url: String,
    pub selections: [(&'static str, String); 5],
    pub control_wait: Duration,
    pub settle_delay: Duration,
}

impl FormPlan {
    pub(crate) fn new(config: &PortalConfig, job: &JobKey) -> Self {
        Self {
            url: config.url.clone(),
            selections: [
                (CENTRE_SELECT, job.health_centre_id.clone()),
                (INSURER_SELECT, config.insurer_id.clone()),
                (GROUP_SELECT, config.group_id.clone()),
                (SPECIALTY_SELECT, job.specialty_id.clone()),
                (CONCEPT_SELECT, config.concept_id.clone()),
            ],
            control_wait: Duration::from_secs(config.control_wait_secs),
            settle_delay: Duration::from_secs(config.settle_delay_secs),
        }
    }
}

/// Proof that the form was filled; consumed by the extraction step.
pub(crate) struct FormFilled(pub(crate) ());

/// Navigates to the form and applies the five selections in order.
///
/// Selections are never retried individually; any fault here fails the
/// whole job.
pub(crate) async fn fill_form<D: FormDriver + ?Sized>(
    driver: &D,
    plan: &FormPlan,
) -> Result<FormFilled, ScrapeError> {
    driver.navigate(&plan.url).await?;

    for (selector, value) in &plan.selections {
        driver.wait_visible(selector, plan.control_wait).await?;
        driver.set_value(selector, value).await?;
        // Dependent controls reload asynchronously after each write; reading
        // or writing before the page settles yields stale state.
        tokio::time::sleep(plan.settle_delay).await;
    }

    Ok(FormFilled(()))
}
