//! Result of one portal scrape and its notification text.

use crate::scraper::JobKey;

/// What one scrape of the booking form found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    /// The merged doctor set was empty; the date probe was skipped.
    NoDoctorsAvailable,
    /// Doctors exist but the date field is read-only, so nothing is bookable.
    DoctorsAvailableNoDates,
    /// Doctors exist and the date field accepts input.
    DoctorsAvailableWithDates(Vec<String>),
}

impl ScrapeOutcome {
    /// Renders the notification, always tagging the centre and specialty so
    /// results stay traceable to their job.
    #[must_use]
    pub fn message(&self, job: &JobKey) -> String {
        let centre = &job.health_centre_id;
        let specialty = &job.specialty_id;
        match self {
            ScrapeOutcome::NoDoctorsAvailable => format!(
                "🔴 Portal: No doctors available for centre {centre} - specialty {specialty}"
            ),
            ScrapeOutcome::DoctorsAvailableNoDates => format!(
                "🔴 Portal: No dates available for centre {centre} - specialty {specialty}"
            ),
            ScrapeOutcome::DoctorsAvailableWithDates(doctors) => {
                let mut message = format!(
                    "🎉 Portal: Doctors available for centre {centre} - specialty {specialty}"
                );
                for doctor in doctors {
                    message.push_str(&format!("\n >> {doctor}"));
                }
                message
            }
        }
    }
}
